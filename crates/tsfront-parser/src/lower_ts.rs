//! Namespace and enum lowering.
//!
//! Each block becomes a call of an arrow whose parameter is the block's
//! closure argument:
//!
//! ```text
//! var N;
//! ((N) => {
//!   N.x = 1;
//! })(N || (N = {}));
//! ```
//!
//! Exported members are tracked per canonical symbol so that a later block
//! of a merged namespace can still read them as `N.x`. Exported children of
//! a namespace share one table across all blocks of the parent.

use crate::ast::*;
use crate::error::Result;
use crate::span::Span;
use crate::symbols::{Ref, ScopeId, ScopeTree, SymbolKind};
use crate::visit::{MemberValue, NamespaceMember, Visitor};
use std::mem;
use tracing::debug;

impl Visitor<'_> {
    pub(crate) fn lower_namespace(
        &mut self,
        ns: Namespace,
        span: Span,
        out: &mut Vec<Stmt>,
    ) -> Result<()> {
        let canonical = self.members_key(ns.name.symbol, ns.is_export);
        self.arg_owner.insert(ns.arg, canonical);
        self.entry_scopes.insert(ns.scope, (canonical, ns.arg));
        self.collect_exported_members(canonical, ns.arg, &ns.stmts);

        let old_scope = mem::replace(&mut self.current_scope, ns.scope);
        let old_ns = mem::replace(&mut self.enclosing_ns, Some(ns.arg));
        let body = self.visit_stmts(ns.stmts)?;
        self.current_scope = old_scope;
        self.enclosing_ns = old_ns;

        self.generate_closure(ns.name, ns.arg, ns.scope, body, ns.is_export, span, out);
        Ok(())
    }

    /// Key for the exported-members table. Every block of a parent namespace
    /// declares a fresh symbol for an exported child, so exported children
    /// are keyed by parent and name instead.
    fn members_key(&mut self, symbol: Ref, is_export: bool) -> Ref {
        let canonical = self.ctx.symbols.follow(symbol);
        let Some(enclosing) = self.enclosing_ns.filter(|_| is_export) else {
            return canonical;
        };
        let parent = self.arg_owner.get(&enclosing).copied().unwrap_or(enclosing);
        let name = self.ctx.symbols.name(canonical).to_string();
        *self
            .nested_members
            .entry((parent, name))
            .or_insert(canonical)
    }

    /// Record what a namespace block exports before visiting it, so that
    /// references anywhere in the block go through the namespace object.
    fn collect_exported_members(&mut self, ns: Ref, arg: Ref, stmts: &[Stmt]) {
        let mut names = Vec::new();
        for stmt in stmts {
            match &stmt.kind {
                StmtKind::Local(local) if local.is_export => {
                    for decl in &local.decls {
                        decl.binding.for_each_identifier(&mut |symbol, _| {
                            let name = self.ctx.symbols.name(symbol).to_string();
                            self.member_refs.insert(
                                symbol,
                                NamespaceMember {
                                    ns,
                                    arg,
                                    name: name.clone(),
                                },
                            );
                            names.push(name);
                        });
                    }
                }
                StmtKind::Function {
                    func: Function { name: Some(name), .. },
                    is_export: true,
                }
                | StmtKind::Class {
                    class: Class { name: Some(name), .. },
                    is_export: true,
                } => names.push(self.ctx.symbols.name(name.symbol).to_string()),
                StmtKind::Namespace(Namespace {
                    name,
                    is_export: true,
                    ..
                })
                | StmtKind::Enum(Enum {
                    name,
                    is_export: true,
                    ..
                }) => names.push(self.ctx.symbols.name(name.symbol).to_string()),
                _ => {}
            }
        }
        let members = self.ns_members.entry(ns).or_default();
        for name in names {
            members.entry(name).or_insert(MemberValue::Property);
        }
    }

    /// `export var a = 1, { b } = c` inside a namespace assigns to the
    /// namespace object instead of declaring locals.
    pub(crate) fn lower_exported_local(&mut self, local: Local, arg: Ref, out: &mut Vec<Stmt>) {
        for decl in local.decls {
            let Some(value) = decl.value else {
                continue;
            };
            let target = self.binding_to_target(decl.binding, arg);
            out.push(Stmt::expr(Expr::assign(target, value)));
        }
    }

    fn binding_to_target(&mut self, binding: Binding, arg: Ref) -> Expr {
        let span = binding.span;
        let kind = match binding.kind {
            BindingKind::Ident(symbol) => {
                let name = self.ctx.symbols.name(symbol).to_string();
                let object = self.symbol_ref(arg, span);
                return Expr::dot(object, name, span);
            }
            BindingKind::Missing => ExprKind::Missing,
            BindingKind::Array { items, has_spread } => {
                let count = items.len();
                let items = items
                    .into_iter()
                    .enumerate()
                    .map(|(i, item)| {
                        let item_span = item.binding.span;
                        let target = self.binding_to_target(item.binding, arg);
                        let target = match item.default {
                            Some(default) => Expr::assign(target, default),
                            None => target,
                        };
                        if has_spread && i + 1 == count {
                            Expr::new(ExprKind::Spread(Box::new(target)), item_span)
                        } else {
                            target
                        }
                    })
                    .collect();
                ExprKind::Array(items)
            }
            BindingKind::Object { props } => {
                let props = props
                    .into_iter()
                    .map(|prop| {
                        let prop_span = prop.value.span;
                        let target = self.binding_to_target(prop.value, arg);
                        let value = match prop.default {
                            Some(default) => Expr::assign(target, default),
                            None => target,
                        };
                        Property {
                            kind: if prop.is_spread {
                                PropertyKind::Spread
                            } else {
                                PropertyKind::Init
                            },
                            key: prop.key,
                            value,
                            initializer: None,
                            is_method: false,
                            is_shorthand: false,
                            span: prop_span,
                        }
                    })
                    .collect();
                ExprKind::Object(props)
            }
        };
        Expr::new(kind, span)
    }

    /// `ns.f = f;` after an exported function or class.
    pub(crate) fn export_to_namespace(
        &mut self,
        name: Option<LocRef>,
        arg: Ref,
        span: Span,
        out: &mut Vec<Stmt>,
    ) {
        let Some(name) = name else {
            return;
        };
        let text = self.ctx.symbols.name(name.symbol).to_string();
        let object = self.symbol_ref(arg, span);
        let value = self.symbol_ref(name.symbol, name.span);
        out.push(Stmt::new(
            StmtKind::Expr(Expr::assign(Expr::dot(object, text, span), value)),
            span,
        ));
    }

    pub(crate) fn lower_enum(&mut self, e: Enum, span: Span, out: &mut Vec<Stmt>) -> Result<()> {
        let canonical = self.members_key(e.name.symbol, e.is_export);
        self.arg_owner.insert(e.arg, canonical);
        self.entry_scopes.insert(e.scope, (canonical, e.arg));
        for value in &e.values {
            if let Some(symbol) = value.symbol {
                self.member_refs.insert(
                    symbol,
                    NamespaceMember {
                        ns: canonical,
                        arg: e.arg,
                        name: value.name.clone(),
                    },
                );
            }
        }

        let old_scope = mem::replace(&mut self.current_scope, e.scope);
        let mut next = Some(0.0);
        let mut body = Vec::with_capacity(e.values.len());
        for value in e.values {
            let init = match value.value {
                Some(mut init) => {
                    self.visit_enum_initializer(&mut init)?;
                    init
                }
                None => {
                    let kind = match next {
                        Some(n) => ExprKind::Number(n),
                        None => ExprKind::Undefined,
                    };
                    Expr::new(kind, value.span)
                }
            };

            let member = match &init.kind {
                ExprKind::Number(n) => {
                    next = Some(n + 1.0);
                    MemberValue::Number(*n)
                }
                ExprKind::String(s) => {
                    next = None;
                    MemberValue::String(s.clone())
                }
                _ => {
                    next = None;
                    MemberValue::Property
                }
            };
            let is_string = matches!(member, MemberValue::String(_));
            self.ns_members
                .entry(canonical)
                .or_default()
                .insert(value.name.clone(), member);

            // E["A"] = init, wrapped as E[E["A"] = init] = "A" unless a string
            let key = Expr::new(ExprKind::String(value.name.clone()), value.span);
            let object = self.symbol_ref(e.arg, value.span);
            let assign = Expr::assign(Expr::index(object, key, value.span), init);
            let stmt = if is_string {
                assign
            } else {
                let object = self.symbol_ref(e.arg, value.span);
                let name = Expr::new(ExprKind::String(value.name), value.span);
                Expr::assign(Expr::index(object, assign, value.span), name)
            };
            body.push(Stmt::expr(stmt));
        }
        self.current_scope = old_scope;

        self.generate_closure(e.name, e.arg, e.scope, body, e.is_export, span, out);
        Ok(())
    }

    /// Emit the binding (once per canonical symbol) and the closure call.
    #[allow(clippy::too_many_arguments)]
    fn generate_closure(
        &mut self,
        name: LocRef,
        arg: Ref,
        scope: ScopeId,
        body: Vec<Stmt>,
        is_export: bool,
        span: Span,
        out: &mut Vec<Stmt>,
    ) {
        let canonical = self.ctx.symbols.follow(name.symbol);
        let text = self.ctx.symbols.name(canonical).to_string();
        let is_top_level = self.current_scope == ScopeTree::MODULE;

        // A function or class of the same name already provides the binding
        let kind = self.ctx.symbols.get(canonical).kind;
        if matches!(kind, SymbolKind::TsNamespace | SymbolKind::TsEnum)
            && self.emitted_vars.insert(canonical)
        {
            out.push(Stmt::new(
                StmtKind::Local(Local {
                    kind: if is_top_level {
                        LocalKind::Var
                    } else {
                        LocalKind::Let
                    },
                    decls: vec![Decl {
                        binding: Binding {
                            kind: BindingKind::Ident(canonical),
                            span: name.span,
                        },
                        value: None,
                    }],
                    is_export: is_export && is_top_level,
                    was_import_equals: false,
                }),
                name.span,
            ));
        }

        let empty_object = || Expr::new(ExprKind::Object(Vec::new()), name.span);
        let arg_expr = match (is_export, self.enclosing_ns) {
            (true, Some(enclosing)) => {
                // name = enclosing.name || (enclosing.name = {})
                let read = self.symbol_ref(enclosing, name.span);
                let write = self.symbol_ref(enclosing, name.span);
                let fallback =
                    Expr::assign(Expr::dot(write, text.clone(), name.span), empty_object());
                let value = Expr::binary(
                    BinaryOp::LogicalOr,
                    Expr::dot(read, text.clone(), name.span),
                    fallback,
                );
                Expr::assign(self.symbol_ref(canonical, name.span), value)
            }
            _ => {
                // name || (name = {})
                let read = self.symbol_ref(canonical, name.span);
                let write = self.symbol_ref(canonical, name.span);
                Expr::binary(
                    BinaryOp::LogicalOr,
                    read,
                    Expr::assign(write, empty_object()),
                )
            }
        };

        let closure = Expr::new(
            ExprKind::Arrow(Box::new(Arrow {
                params: vec![Param::simple(Binding {
                    kind: BindingKind::Ident(arg),
                    span: name.span,
                })],
                body: FnBody { stmts: body, scope },
                is_async: false,
                prefer_expr: false,
                args_scope: scope,
            })),
            span,
        );
        let call = Expr::new(
            ExprKind::Call {
                target: Box::new(closure),
                args: vec![arg_expr],
                optional_chain: OptionalChain::None,
            },
            span,
        );
        debug!(name = %text, exported = is_export, "generated closure");
        out.push(Stmt::new(StmtKind::Expr(call), span));
    }
}

#[cfg(test)]
mod tests {
    use crate::ast::*;
    use crate::error::{ErrorKind, Result};
    use crate::options::ParserOptions;
    use crate::parser::Parser;
    use crate::symbols::SymbolTable;
    use crate::visit::visit_program;

    fn lower(source: &str) -> Result<(Vec<Stmt>, SymbolTable)> {
        let mut parser = Parser::new(source, ParserOptions::default())?;
        let stmts = parser.parse_program()?;
        let mut ctx = parser.into_context();
        let stmts = visit_program(stmts, &mut ctx, true)?;
        Ok((stmts, ctx.symbols))
    }

    fn closure_body(stmt: &Stmt) -> &[Stmt] {
        let StmtKind::Expr(Expr {
            kind: ExprKind::Call { target, .. },
            ..
        }) = &stmt.kind
        else {
            panic!("expected closure call, got {:?}", stmt.kind);
        };
        let ExprKind::Arrow(arrow) = &target.kind else {
            panic!("expected arrow");
        };
        &arrow.body.stmts
    }

    fn enum_values(body: &[Stmt]) -> Vec<ExprKind> {
        body.iter()
            .map(|stmt| {
                let StmtKind::Expr(expr) = &stmt.kind else {
                    panic!("expected expression");
                };
                // E[E["A"] = v] = "A" or E["A"] = v
                let ExprKind::Binary { left, right, .. } = &expr.kind else {
                    panic!("expected assignment");
                };
                match &left.kind {
                    ExprKind::Index { index, .. } => match &index.kind {
                        ExprKind::Binary { right, .. } => right.kind.clone(),
                        _ => right.kind.clone(),
                    },
                    _ => panic!("expected index"),
                }
            })
            .collect()
    }

    #[test]
    fn test_namespace_emits_var_and_closure() {
        let (stmts, symbols) = lower("namespace N { export const a = 1; const b = 2; }").unwrap();
        assert_eq!(stmts.len(), 2);
        let StmtKind::Local(local) = &stmts[0].kind else {
            panic!("expected var");
        };
        assert_eq!(local.kind, LocalKind::Var);
        let BindingKind::Ident(symbol) = local.decls[0].binding.kind else {
            panic!("expected identifier");
        };
        assert_eq!(symbols.name(symbol), "N");

        let body = closure_body(&stmts[1]);
        assert_eq!(body.len(), 2);
        let StmtKind::Expr(assign) = &body[0].kind else {
            panic!("expected assignment");
        };
        assert!(matches!(&assign.kind, ExprKind::Binary { left, .. }
            if matches!(&left.kind, ExprKind::Dot { name, .. } if name == "a")));
    }

    #[test]
    fn test_merged_blocks_emit_one_var() {
        let (stmts, _) = lower("namespace N { export let x = 1 }\nnamespace N { x }").unwrap();
        assert_eq!(stmts.len(), 3);
        let body = closure_body(&stmts[2]);
        let StmtKind::Expr(expr) = &body[0].kind else {
            panic!("expected expression");
        };
        assert!(matches!(&expr.kind, ExprKind::Dot { name, .. } if name == "x"));
    }

    #[test]
    fn test_namespace_merges_with_function() {
        let (stmts, _) = lower("function foo() {}\nnamespace foo { 0 }").unwrap();
        assert_eq!(stmts.len(), 2);
        assert!(matches!(stmts[0].kind, StmtKind::Function { .. }));
        closure_body(&stmts[1]);
    }

    #[test]
    fn test_namespace_conflicts_with_let() {
        let err = lower("let foo;\nnamespace foo { 0 }").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Declaration);
        assert!(err.message.contains("foo"));
    }

    #[test]
    fn test_exported_function_is_assigned_after() {
        let (stmts, _) = lower("namespace N { export function f() {} }").unwrap();
        let body = closure_body(&stmts[1]);
        assert_eq!(body.len(), 2);
        assert!(matches!(body[0].kind, StmtKind::Function { is_export: false, .. }));
        assert!(matches!(body[1].kind, StmtKind::Expr(_)));
    }

    #[test]
    fn test_nested_exported_namespace_uses_let_and_parent() {
        let (stmts, _) = lower("namespace A.B { export const x = 1 }").unwrap();
        let body = closure_body(&stmts[1]);
        let StmtKind::Local(local) = &body[0].kind else {
            panic!("expected let");
        };
        assert_eq!(local.kind, LocalKind::Let);
        let StmtKind::Expr(Expr {
            kind: ExprKind::Call { args, .. },
            ..
        }) = &body[1].kind
        else {
            panic!("expected call");
        };
        // B = A.B || (A.B = {})
        assert!(matches!(&args[0].kind, ExprKind::Binary { op: BinaryOp::Assign, .. }));
    }

    #[test]
    fn test_enum_auto_increment_and_folding() {
        let (stmts, _) = lower("enum E { A, B, C = 1 << 4, D, S = 'x', U, V = 2.5 }").unwrap();
        let values = enum_values(closure_body(&stmts[1]));
        assert_eq!(
            values,
            vec![
                ExprKind::Number(0.0),
                ExprKind::Number(1.0),
                ExprKind::Number(16.0),
                ExprKind::Number(17.0),
                ExprKind::String("x".into()),
                ExprKind::Undefined,
                ExprKind::Number(2.5),
            ]
        );
    }

    #[test]
    fn test_enum_member_references_are_inlined() {
        let (stmts, _) =
            lower("enum E { A = 2, B = A * 3, C = E.B + 1 }\nlet x = E.C, y = E['A'];").unwrap();
        let values = enum_values(closure_body(&stmts[1]));
        assert_eq!(values[1], ExprKind::Number(6.0));
        assert_eq!(values[2], ExprKind::Number(7.0));

        let StmtKind::Local(local) = &stmts[2].kind else {
            panic!("expected local");
        };
        assert_eq!(local.decls[0].value.as_ref().unwrap().kind, ExprKind::Number(7.0));
        assert_eq!(local.decls[1].value.as_ref().unwrap().kind, ExprKind::Number(2.0));
    }

    #[test]
    fn test_enum_unknown_initializer_reads_through_arg() {
        let (stmts, _) = lower("enum E { A = f(), B = A, C }").unwrap();
        let values = enum_values(closure_body(&stmts[1]));
        assert!(matches!(&values[1], ExprKind::Dot { name, .. } if name == "A"));
        assert_eq!(values[2], ExprKind::Undefined);
    }

    #[test]
    fn test_enum_blocks_merge() {
        let (stmts, _) = lower("enum E { A = 1 }\nenum E { B = A + 1 }").unwrap();
        assert_eq!(stmts.len(), 3);
        let values = enum_values(closure_body(&stmts[2]));
        assert_eq!(values[0], ExprKind::Number(2.0));
    }
}
