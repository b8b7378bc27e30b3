//! TypeScript-only declarations.
//!
//! `type` and `interface` are skipped. `enum` and `namespace` become real
//! AST nodes whose closure argument symbol is chosen here, since that needs
//! the body scope's members. `declare` forms are parsed for their shape and
//! then thrown away together with everything they declared.

use crate::ast::*;
use crate::error::Result;
use crate::lexer::is_identifier;
use crate::parser::{Parser, StmtOpts};
use crate::span::Span;
use crate::symbols::{ScopeKind, SymbolKind};
use crate::token::{keyword_from_str, TokenKind};
use tracing::debug;

impl<'a> Parser<'a> {
    /// Statements introduced by a TypeScript contextual keyword. The current
    /// token is the identifier `word`. Returns `None` when it is just the
    /// start of an expression.
    pub(crate) fn parse_ts_contextual_stmt(
        &mut self,
        word: &str,
        start: u32,
        opts: StmtOpts,
    ) -> Result<Option<Stmt>> {
        let next = self.lookahead()?;
        if next.had_newline_before {
            return Ok(None);
        }
        let stmt = match (word, &next.kind) {
            ("type", TokenKind::Identifier(_)) => self.parse_type_alias(start, opts)?,
            ("interface", TokenKind::Identifier(_)) => self.parse_interface(start, opts)?,
            ("namespace", TokenKind::Identifier(_))
            | ("module", TokenKind::Identifier(_) | TokenKind::String(_)) => {
                self.parse_namespace_stmt(start, opts)?
            }
            ("abstract", TokenKind::Class) => {
                self.next()?;
                self.parse_class_stmt(start, opts, Vec::new())?
            }
            (
                "declare",
                TokenKind::Identifier(_)
                | TokenKind::Var
                | TokenKind::Const
                | TokenKind::Function
                | TokenKind::Class
                | TokenKind::Enum,
            ) => self.parse_declare_stmt(start, opts)?,
            _ => return Ok(None),
        };
        Ok(Some(stmt))
    }

    /// `type Name<T> = ...;`
    fn parse_type_alias(&mut self, start: u32, opts: StmtOpts) -> Result<Stmt> {
        self.next()?;
        let (name, _) = self.expect_identifier()?;
        if opts.is_module_scope {
            self.ctx.local_type_names.insert(name);
        }
        if self.check(&TokenKind::Lt) {
            self.skip_type_parameters(true)?;
        }
        self.expect(&TokenKind::Eq)?;
        self.skip_type(Level::Lowest)?;
        self.expect_semicolon()?;
        Ok(Stmt::new(StmtKind::TypeScript, self.span_from(start)))
    }

    /// `interface Name<T> extends A, B { ... }`
    fn parse_interface(&mut self, start: u32, opts: StmtOpts) -> Result<Stmt> {
        self.next()?;
        let (name, _) = self.expect_identifier()?;
        if opts.is_module_scope {
            self.ctx.local_type_names.insert(name);
        }
        if self.check(&TokenKind::Lt) {
            self.skip_type_parameters(true)?;
        }
        if self.eat(&TokenKind::Extends)? {
            loop {
                self.skip_type(Level::Lowest)?;
                if !self.eat(&TokenKind::Comma)? {
                    break;
                }
            }
        }
        self.skip_object_type()?;
        Ok(Stmt::new(StmtKind::TypeScript, self.span_from(start)))
    }

    // =========================================================================
    // declare
    // =========================================================================

    /// `declare ...`. The current token is `declare`.
    fn parse_declare_stmt(&mut self, start: u32, opts: StmtOpts) -> Result<Stmt> {
        self.next()?;
        let opts = StmtOpts {
            is_declare: true,
            ..opts
        };

        // "declare global { ... }"
        if self.is_ident("global") && matches!(self.lookahead()?.kind, TokenKind::LBrace) {
            self.next()?;
            self.skip_declared_block()?;
            return Ok(Stmt::new(StmtKind::TypeScript, self.span_from(start)));
        }

        // "export declare var x" inside a namespace still binds a name in it,
        // so variables are parsed in place. Everything else is parsed in a
        // scope that is then discarded.
        let is_variable = matches!(self.peek(), TokenKind::Var | TokenKind::Const)
            || self.is_ident("let");
        if is_variable {
            let stmt = self.parse_stmt(opts)?;
            return Ok(Stmt::new(stmt.kind, self.span_from(start)));
        }

        let scope = self.push_scope(ScopeKind::Block);
        self.parse_stmt(opts)?;
        self.pop_and_discard_scope(scope);
        Ok(Stmt::new(StmtKind::TypeScript, self.span_from(start)))
    }

    /// `{ ... }` whose contents are all ambient declarations.
    fn skip_declared_block(&mut self) -> Result<()> {
        self.expect(&TokenKind::LBrace)?;
        let scope = self.push_scope(ScopeKind::Entry);
        self.parse_stmts_until_rbrace(StmtOpts {
            is_module_scope: false,
            is_namespace_scope: true,
            is_export: false,
            is_declare: true,
        })?;
        self.pop_and_discard_scope(scope);
        self.expect(&TokenKind::RBrace)?;
        Ok(())
    }

    // =========================================================================
    // Namespaces
    // =========================================================================

    /// `namespace A.B { ... }` or `module "m" { ... }`. The current token is
    /// `namespace` or `module`.
    fn parse_namespace_stmt(&mut self, start: u32, opts: StmtOpts) -> Result<Stmt> {
        self.next()?;

        // "declare module 'm' { ... }" only describes another module
        if let TokenKind::String(_) = self.peek() {
            self.next()?;
            if self.check(&TokenKind::LBrace) {
                self.skip_declared_block()?;
            } else {
                self.expect_semicolon()?;
            }
            return Ok(Stmt::new(StmtKind::TypeScript, self.span_from(start)));
        }

        let (name, name_span) = self.expect_identifier()?;
        self.parse_namespace_rest(start, name, name_span, opts)
    }

    fn parse_namespace_rest(
        &mut self,
        start: u32,
        name: String,
        name_span: Span,
        opts: StmtOpts,
    ) -> Result<Stmt> {
        let scope = self.push_scope(ScopeKind::Entry);
        let body_opts = StmtOpts {
            is_module_scope: false,
            is_namespace_scope: true,
            is_export: false,
            is_declare: opts.is_declare,
        };

        let stmts = if self.eat(&TokenKind::Dot)? {
            // "namespace A.B {}" is "namespace A { export namespace B {} }"
            let inner_start = self.current.span.start;
            let (inner, inner_span) = self.expect_identifier()?;
            let inner_opts = StmtOpts {
                is_export: true,
                ..body_opts
            };
            vec![self.parse_namespace_rest(inner_start, inner, inner_span, inner_opts)?]
        } else {
            self.expect(&TokenKind::LBrace)?;
            let stmts = self.parse_stmts_until_rbrace(body_opts)?;
            self.expect(&TokenKind::RBrace)?;
            stmts
        };

        // A namespace with nothing but types (and unexported "import =")
        // has no runtime value
        let has_value = !opts.is_declare
            && stmts.iter().any(|stmt| match &stmt.kind {
                StmtKind::TypeScript => false,
                StmtKind::Local(local) => !local.was_import_equals || local.is_export,
                _ => true,
            });
        if !has_value {
            self.pop_and_discard_scope(scope);
            if opts.is_module_scope {
                self.ctx.local_type_names.insert(name.clone());
            }
            debug!(namespace = %name, "dropping namespace without values");
            return Ok(Stmt::new(StmtKind::TypeScript, self.span_from(start)));
        }

        let arg = if self.ctx.scopes.get(scope).members.contains_key(&name) {
            self.new_generated_symbol(SymbolKind::Hoisted, &format!("_{name}"))
        } else {
            self.declare_symbol(SymbolKind::Hoisted, name_span, &name)?
        };
        self.pop_scope();

        let symbol = self.declare_symbol(SymbolKind::TsNamespace, name_span, &name)?;
        Ok(Stmt::new(
            StmtKind::Namespace(Namespace {
                name: LocRef {
                    span: name_span,
                    symbol,
                },
                arg,
                stmts,
                is_export: opts.is_export,
                scope,
            }),
            self.span_from(start),
        ))
    }

    // =========================================================================
    // Enums
    // =========================================================================

    /// `[const] enum E { ... }`. The current token is `enum`.
    pub(crate) fn parse_enum_stmt(
        &mut self,
        start: u32,
        opts: StmtOpts,
        is_const: bool,
    ) -> Result<Stmt> {
        self.expect(&TokenKind::Enum)?;
        let (name, name_span) = self.expect_identifier()?;
        let symbol = if opts.is_declare {
            self.ctx.symbols.new_symbol(SymbolKind::Other, name.as_str())
        } else {
            self.declare_symbol(SymbolKind::TsEnum, name_span, &name)?
        };

        let scope = self.push_scope(ScopeKind::Entry);
        let old_watch = self.enum_self_ref.replace((name.clone(), false));
        self.expect(&TokenKind::LBrace)?;
        let mut values = Vec::new();
        while !self.check(&TokenKind::RBrace) {
            values.push(self.parse_enum_value()?);
            if !self.eat(&TokenKind::Comma)? {
                break;
            }
        }
        self.expect(&TokenKind::RBrace)?;
        let self_referenced = std::mem::replace(&mut self.enum_self_ref, old_watch)
            .is_some_and(|(_, seen)| seen);

        if opts.is_declare {
            self.pop_and_discard_scope(scope);
            return Ok(Stmt::new(StmtKind::TypeScript, self.span_from(start)));
        }

        let shadowed = self.ctx.scopes.get(scope).members.contains_key(&name);
        let arg = if shadowed || self_referenced {
            self.new_generated_symbol(SymbolKind::Hoisted, &format!("_{name}"))
        } else {
            self.declare_symbol(SymbolKind::Hoisted, name_span, &name)?
        };
        self.pop_scope();

        Ok(Stmt::new(
            StmtKind::Enum(Enum {
                name: LocRef {
                    span: name_span,
                    symbol,
                },
                arg,
                values,
                is_export: opts.is_export,
                is_const,
                scope,
            }),
            self.span_from(start),
        ))
    }

    fn parse_enum_value(&mut self) -> Result<EnumValue> {
        let span = self.current.span;
        let name = match self.peek() {
            TokenKind::String(value) => value.clone(),
            kind => match kind.identifier_or_keyword() {
                Some(name) => name.to_string(),
                None => return self.expected("identifier"),
            },
        };
        self.next()?;

        // Only names usable as identifiers can be referenced bare
        let symbol = if is_identifier(&name) && keyword_from_str(&name).is_none() {
            Some(self.declare_symbol(SymbolKind::Other, span, &name)?)
        } else {
            None
        };

        let value = if self.eat(&TokenKind::Eq)? {
            Some(self.parse_expr(Level::Comma)?)
        } else {
            None
        };
        Ok(EnumValue {
            name,
            span,
            value,
            symbol,
        })
    }

    // =========================================================================
    // import =
    // =========================================================================

    /// `import x = require("m")` or `import x = a.b.c`. The current token is
    /// the binding name.
    pub(crate) fn parse_import_equals_stmt(&mut self, start: u32, opts: StmtOpts) -> Result<Stmt> {
        let (name, span) = self.expect_identifier()?;
        self.expect(&TokenKind::Eq)?;
        let value = self.parse_import_equals_value()?;
        self.expect_semicolon()?;

        let symbol = self.declare_symbol(SymbolKind::Const, span, &name)?;
        self.ctx.symbols.get_mut(symbol).is_import_equals = true;
        Ok(Stmt::new(
            StmtKind::Local(Local {
                kind: LocalKind::Const,
                decls: vec![Decl {
                    binding: Binding {
                        kind: BindingKind::Ident(symbol),
                        span,
                    },
                    value: Some(value),
                }],
                is_export: opts.is_export,
                was_import_equals: true,
            }),
            self.span_from(start),
        ))
    }

    /// The right-hand side of `import x = ...`.
    pub(crate) fn parse_import_equals_value(&mut self) -> Result<Expr> {
        let start = self.current.span.start;
        let (name, name_span) = self.expect_identifier()?;

        if name == "require" && self.check(&TokenKind::LParen) {
            self.next()?;
            let arg_span = self.current.span;
            let specifier = self.expect_string()?;
            self.expect(&TokenKind::RParen)?;
            let target = self.ident_expr(name, name_span);
            return Ok(Expr::new(
                ExprKind::Call {
                    target: Box::new(target),
                    args: vec![Expr::new(ExprKind::String(specifier), arg_span)],
                    optional_chain: OptionalChain::None,
                },
                self.span_from(start),
            ));
        }

        let mut value = self.ident_expr(name, name_span);
        while self.eat(&TokenKind::Dot)? {
            let (member, _) = self.expect_identifier_or_keyword()?;
            value = Expr::dot(value, member, self.span_from(start));
        }
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use crate::ast::*;
    use crate::error::{ErrorKind, Result};
    use crate::options::ParserOptions;
    use crate::parser::{ParseContext, Parser};
    use crate::symbols::ScopeTree;

    fn parse(source: &str) -> Result<(Vec<Stmt>, ParseContext)> {
        let mut parser = Parser::new(source, ParserOptions::default())?;
        let stmts = parser.parse_program()?;
        Ok((stmts, parser.into_context()))
    }

    fn is_erased(stmt: &Stmt) -> bool {
        matches!(stmt.kind, StmtKind::TypeScript)
    }

    #[test]
    fn test_type_declarations_are_erased() {
        let (stmts, ctx) = parse(
            "type A<T = string> = T | null;\n\
             interface B extends C<D>, E { x: number; m(): void }\n\
             export type F = { [K in keyof G]?: G[K] };",
        )
        .unwrap();
        assert!(stmts.iter().all(is_erased));
        for name in ["A", "B", "F"] {
            assert!(ctx.local_type_names.contains(name), "{name}");
        }
        assert!(ctx.scopes.get(ScopeTree::MODULE).members.is_empty());
    }

    #[test]
    fn test_contextual_words_stay_identifiers() {
        let (stmts, _) = parse("type = 1;\nnamespace\nfoo\ndeclare;").unwrap();
        assert_eq!(stmts.len(), 4);
        assert!(stmts.iter().all(|s| matches!(s.kind, StmtKind::Expr(_))));
    }

    #[test]
    fn test_type_only_namespace_is_dropped() {
        let (stmts, ctx) = parse(
            "namespace N { export type T = number; interface I {} import x = M.y; }",
        )
        .unwrap();
        assert!(is_erased(&stmts[0]));
        assert!(ctx.local_type_names.contains("N"));
        let module = ctx.scopes.get(ScopeTree::MODULE);
        assert!(!module.members.contains_key("N"));
        assert!(module.children.is_empty());
    }

    #[test]
    fn test_namespace_with_values() {
        let (stmts, ctx) = parse("namespace N { export const a = 1 }").unwrap();
        let StmtKind::Namespace(ns) = &stmts[0].kind else {
            panic!("expected namespace");
        };
        assert_eq!(ctx.symbols.name(ns.arg), "N");
        assert_eq!(ctx.symbols.get(ns.name.symbol).kind, crate::symbols::SymbolKind::TsNamespace);
        assert!(ctx.scopes.get(ns.scope).members.contains_key("a"));
    }

    #[test]
    fn test_namespace_exporting_own_name_gets_generated_arg() {
        let (stmts, ctx) = parse("namespace N { export let N = 1 }").unwrap();
        let StmtKind::Namespace(ns) = &stmts[0].kind else {
            panic!("expected namespace");
        };
        assert_eq!(ctx.symbols.name(ns.arg), "_N");
        assert!(ctx.scopes.get(ns.scope).generated.contains(&ns.arg));
    }

    #[test]
    fn test_dotted_namespace_nests() {
        let (stmts, _) = parse("namespace A.B.C { export function f() {} }").unwrap();
        let StmtKind::Namespace(a) = &stmts[0].kind else {
            panic!("expected namespace");
        };
        let StmtKind::Namespace(b) = &a.stmts[0].kind else {
            panic!("expected nested namespace");
        };
        assert!(b.is_export);
        assert!(matches!(b.stmts[0].kind, StmtKind::Namespace(ref c) if c.is_export));
    }

    #[test]
    fn test_enum_values_and_symbols() {
        let (stmts, ctx) = parse("enum E { A, B = 2, 'c-d', 'e' = A }").unwrap();
        let StmtKind::Enum(e) = &stmts[0].kind else {
            panic!("expected enum");
        };
        assert_eq!(e.values.len(), 4);
        assert!(e.values[0].symbol.is_some());
        assert!(e.values[2].symbol.is_none());
        assert!(e.values[3].symbol.is_some());
        assert_eq!(ctx.symbols.name(e.arg), "E");
    }

    #[test]
    fn test_enum_self_reference_gets_generated_arg() {
        let (stmts, ctx) = parse("enum E { A = 1, B = E.A }\nenum F { F }\nenum G { X = 'G' }")
            .unwrap();
        let names: Vec<&str> = stmts
            .iter()
            .map(|s| match &s.kind {
                StmtKind::Enum(e) => ctx.symbols.name(e.arg),
                _ => panic!("expected enum"),
            })
            .collect();
        assert_eq!(names, vec!["_E", "_F", "G"]);
    }

    #[test]
    fn test_declare_forms_are_erased() {
        let (stmts, ctx) = parse(
            "declare const a: number;\n\
             declare function f(): void;\n\
             declare class C { m(): void }\n\
             declare enum E { A }\n\
             declare const enum CE { A }\n\
             declare namespace N { const x: number }\n\
             declare module 'm' { export function g(): void }\n\
             declare global { interface Window { x: 1 } }\n\
             export declare let b: string;\n\
             export as namespace Lib;",
        )
        .unwrap();
        assert!(stmts.iter().all(is_erased));
        let module = ctx.scopes.get(ScopeTree::MODULE);
        for name in ["a", "f", "C", "E", "CE", "b"] {
            assert!(!module.members.contains_key(name), "{name}");
        }
    }

    #[test]
    fn test_export_declare_in_namespace_keeps_binding() {
        let (stmts, ctx) = parse("namespace N { export declare const x: number; }").unwrap();
        let StmtKind::Namespace(ns) = &stmts[0].kind else {
            panic!("expected namespace");
        };
        assert!(matches!(ns.stmts[0].kind, StmtKind::Local(_)));
        assert!(ctx.scopes.get(ns.scope).members.contains_key("x"));
    }

    #[test]
    fn test_import_equals() {
        let (stmts, ctx) = parse("import fs = require('fs');\nimport y = a.b.c;").unwrap();
        for stmt in &stmts {
            let StmtKind::Local(local) = &stmt.kind else {
                panic!("expected local");
            };
            assert!(local.was_import_equals);
            let BindingKind::Ident(symbol) = local.decls[0].binding.kind else {
                panic!("expected identifier");
            };
            assert!(ctx.symbols.get(symbol).is_import_equals);
        }
        let StmtKind::Local(local) = &stmts[0].kind else {
            unreachable!();
        };
        assert!(matches!(
            local.decls[0].value.as_ref().map(|v| &v.kind),
            Some(ExprKind::Call { .. })
        ));
    }

    #[test]
    fn test_duplicate_enum_member() {
        let err = parse("enum E { A, A }").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Declaration);
    }
}
