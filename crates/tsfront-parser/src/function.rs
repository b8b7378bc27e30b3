//! Function declarations, expressions and methods.

use crate::ast::*;
use crate::error::Result;
use crate::parser::{FnFlags, Parser, StmtOpts};
use crate::span::Span;
use crate::symbols::{ScopeId, ScopeKind, ScopeMember, SymbolKind};
use crate::token::TokenKind;

/// How the part of a function after its name is parsed.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct FnOpts {
    pub is_async: bool,
    pub is_generator: bool,
    /// TypeScript overload signatures and abstract methods end in `;`.
    pub allow_missing_body: bool,
    /// Parameter properties are only allowed here.
    pub is_constructor: bool,
}

impl<'a> Parser<'a> {
    /// `function name() {}` with the `function` keyword already consumed.
    pub(crate) fn parse_function_stmt(
        &mut self,
        start: u32,
        is_async: bool,
        opts: StmtOpts,
    ) -> Result<Stmt> {
        let is_generator = self.eat(&TokenKind::Star)?;
        let (name, name_span) = self.expect_identifier()?;
        let fn_opts = FnOpts {
            is_async,
            is_generator,
            allow_missing_body: self.options.typescript,
            is_constructor: false,
        };
        let func = self.parse_fn_rest(start, fn_opts, None)?;

        // Overload signatures and "declare function" declare nothing, so
        // "function f(): void; function f() {}" is not a redeclaration
        let Some(mut func) = func.filter(|_| !opts.is_declare) else {
            return Ok(Stmt::new(StmtKind::TypeScript, self.span_from(start)));
        };
        let kind = function_symbol_kind(is_async, is_generator);
        let symbol = self.declare_symbol(kind, name_span, &name)?;
        func.name = Some(LocRef {
            span: name_span,
            symbol,
        });
        Ok(Stmt::new(
            StmtKind::Function {
                func,
                is_export: opts.is_export,
            },
            self.span_from(start),
        ))
    }

    /// `export default function [name]() {}` with `function` consumed.
    /// Returns `None` for an overload signature.
    pub(crate) fn parse_function_decl_for_default(
        &mut self,
        start: u32,
        is_async: bool,
    ) -> Result<Option<Function>> {
        let is_generator = self.eat(&TokenKind::Star)?;
        let name = match self.peek() {
            TokenKind::Identifier(_) => Some(self.expect_identifier()?),
            _ => None,
        };
        let fn_opts = FnOpts {
            is_async,
            is_generator,
            allow_missing_body: self.options.typescript,
            is_constructor: false,
        };
        let Some(mut func) = self.parse_fn_rest(start, fn_opts, None)? else {
            return Ok(None);
        };
        if let Some((name, span)) = name {
            let kind = function_symbol_kind(is_async, is_generator);
            let symbol = self.declare_symbol(kind, span, &name)?;
            func.name = Some(LocRef { span, symbol });
        }
        Ok(Some(func))
    }

    /// A function expression. The current token is `function`.
    pub(crate) fn parse_function_expr(&mut self, start: u32, is_async: bool) -> Result<Expr> {
        self.expect(&TokenKind::Function)?;
        let is_generator = self.eat(&TokenKind::Star)?;
        let name = match self.peek() {
            TokenKind::Identifier(_) => Some(self.expect_identifier()?),
            _ => None,
        };
        let fn_opts = FnOpts {
            is_async,
            is_generator,
            ..Default::default()
        };
        match self.parse_fn_rest(start, fn_opts, name)? {
            Some(func) => Ok(Expr::new(
                ExprKind::Function(Box::new(func)),
                self.span_from(start),
            )),
            None => self.expected("\"{\""),
        }
    }

    /// Object literal methods and accessors. The current token is `(` or
    /// the `<` of type parameters.
    pub(crate) fn parse_method_function(
        &mut self,
        start: u32,
        is_async: bool,
        is_generator: bool,
    ) -> Result<Function> {
        let fn_opts = FnOpts {
            is_async,
            is_generator,
            ..Default::default()
        };
        match self.parse_fn_rest(start, fn_opts, None)? {
            Some(func) => Ok(func),
            None => self.expected("\"{\""),
        }
    }

    /// Type parameters, parameters, return type and body. A name given here
    /// is declared inside the function, as function expression names are.
    /// Returns `None` for a bodiless signature.
    pub(crate) fn parse_fn_rest(
        &mut self,
        start: u32,
        opts: FnOpts,
        inner_name: Option<(String, Span)>,
    ) -> Result<Option<Function>> {
        let args_scope = self.push_scope(ScopeKind::FunctionArgs);
        let name = match inner_name {
            Some((name, span)) => Some(LocRef {
                span,
                symbol: self.declare_symbol(SymbolKind::HoistedFunction, span, &name)?,
            }),
            None => None,
        };

        if self.options.typescript && self.check(&TokenKind::Lt) {
            self.skip_type_parameters(false)?;
        }

        let old_flags = std::mem::replace(
            &mut self.fn_flags,
            FnFlags {
                allow_await: opts.is_async,
                allow_yield: opts.is_generator,
            },
        );
        let old_allow_in = std::mem::replace(&mut self.allow_in, true);
        let old_in_decorator = std::mem::replace(&mut self.in_decorator, false);

        let params = self.parse_fn_params(opts.is_constructor)?;
        if self.options.typescript && self.eat(&TokenKind::Colon)? {
            self.skip_return_type()?;
        }

        let body = if self.check(&TokenKind::LBrace) {
            Some(self.parse_fn_body(true)?)
        } else if self.options.typescript && opts.allow_missing_body {
            self.expect_semicolon()?;
            None
        } else {
            return self.expected("\"{\"");
        };

        self.fn_flags = old_flags;
        self.allow_in = old_allow_in;
        self.in_decorator = old_in_decorator;

        let Some(body) = body else {
            self.pop_and_discard_scope(args_scope);
            return Ok(None);
        };
        self.pop_scope();
        Ok(Some(Function {
            name,
            params,
            body,
            is_async: opts.is_async,
            is_generator: opts.is_generator,
            args_scope,
            span: self.span_from(start),
        }))
    }

    fn parse_fn_params(&mut self, is_constructor: bool) -> Result<Vec<Param>> {
        self.expect(&TokenKind::LParen)?;
        let mut params = Vec::new();
        while !self.check(&TokenKind::RParen) {
            let decorators = if self.check(&TokenKind::At) {
                self.parse_decorators()?
            } else {
                Vec::new()
            };

            let mut is_parameter_property = false;
            if self.options.typescript {
                while self.at_parameter_modifier()? {
                    let span = self.current.span;
                    if !is_constructor {
                        return self.syntax_error(
                            "A parameter property is only allowed in a constructor implementation",
                            span,
                        );
                    }
                    is_parameter_property = true;
                    self.next()?;
                }
            }

            let is_rest = self.eat(&TokenKind::DotDotDot)?;

            // "function f(this: Window) {}"
            if self.options.typescript && !is_rest && self.check(&TokenKind::This) {
                self.next()?;
                if self.eat(&TokenKind::Colon)? {
                    self.skip_type(Level::Lowest)?;
                }
                if !self.eat(&TokenKind::Comma)? {
                    break;
                }
                continue;
            }

            let binding = self.parse_binding(Some(SymbolKind::Hoisted))?;
            if is_parameter_property && !matches!(binding.kind, BindingKind::Ident(_)) {
                return self.syntax_error(
                    "A parameter property may not be declared using a binding pattern",
                    binding.span,
                );
            }
            if self.options.typescript {
                self.eat(&TokenKind::Question)?;
                if self.eat(&TokenKind::Colon)? {
                    self.skip_type(Level::Lowest)?;
                }
            }
            let default = if !is_rest && self.eat(&TokenKind::Eq)? {
                Some(self.parse_expr(Level::Comma)?)
            } else {
                None
            };

            params.push(Param {
                binding,
                default,
                is_rest,
                decorators,
                is_parameter_property,
            });
            if is_rest || !self.eat(&TokenKind::Comma)? {
                break;
            }
        }
        self.expect(&TokenKind::RParen)?;
        Ok(params)
    }

    /// `public`, `private`, `protected`, `readonly` or `override` used as a
    /// modifier rather than as the parameter name.
    fn at_parameter_modifier(&mut self) -> Result<bool> {
        let is_modifier_word = matches!(
            self.peek(),
            TokenKind::Identifier(word) if matches!(
                word.as_str(),
                "public" | "private" | "protected" | "readonly" | "override"
            )
        );
        if !is_modifier_word {
            return Ok(false);
        }
        let next = self.lookahead()?;
        Ok(matches!(
            next.kind,
            TokenKind::Identifier(_)
                | TokenKind::LBrace
                | TokenKind::LBracket
                | TokenKind::DotDotDot
        ))
    }

    /// `{ body }` of a function or a block-bodied arrow. The function's
    /// `FunctionArgs` scope must be current.
    pub(crate) fn parse_fn_body(&mut self, is_fn: bool) -> Result<FnBody> {
        self.expect(&TokenKind::LBrace)?;
        let scope = self.push_function_body_scope(is_fn)?;
        let old_allow_in = std::mem::replace(&mut self.allow_in, true);
        let stmts = self.parse_stmts_until_rbrace(StmtOpts::default())?;
        self.allow_in = old_allow_in;
        self.pop_scope();
        self.expect(&TokenKind::RBrace)?;
        Ok(FnBody { stmts, scope })
    }

    /// Push the body scope of a function. Parameters are visible in it
    /// directly so `var x` merges with a parameter `x` and `let x` clashes
    /// with it; non-arrow functions also get an implicit `arguments`.
    pub(crate) fn push_function_body_scope(&mut self, is_fn: bool) -> Result<ScopeId> {
        let args_scope = self.current_scope;
        let inherited: Vec<(String, ScopeMember)> = self
            .ctx
            .scopes
            .get(args_scope)
            .members
            .iter()
            .filter(|(_, member)| {
                self.ctx.symbols.get(member.symbol).kind != SymbolKind::HoistedFunction
            })
            .map(|(name, member)| (name.clone(), *member))
            .collect();

        let scope = self.push_scope(ScopeKind::FunctionBody);
        let members = &mut self.ctx.scopes.get_mut(scope).members;
        for (name, member) in inherited {
            members.insert(name, member);
        }
        if is_fn && !members.contains_key("arguments") {
            let span = Span::empty(self.prev_end);
            self.declare_symbol(SymbolKind::Arguments, span, "arguments")?;
        }
        Ok(scope)
    }
}

fn function_symbol_kind(is_async: bool, is_generator: bool) -> SymbolKind {
    if is_async || is_generator {
        SymbolKind::GeneratorOrAsyncFunction
    } else {
        SymbolKind::HoistedFunction
    }
}

#[cfg(test)]
mod tests {
    use crate::ast::*;
    use crate::error::{ErrorKind, Result};
    use crate::options::ParserOptions;
    use crate::parser::{ParseContext, Parser};
    use crate::symbols::{ScopeTree, SymbolKind};

    fn parse(source: &str) -> Result<(Vec<Stmt>, ParseContext)> {
        let mut parser = Parser::new(source, ParserOptions::default())?;
        let stmts = parser.parse_program()?;
        Ok((stmts, parser.into_context()))
    }

    fn function(stmt: &Stmt) -> &Function {
        match &stmt.kind {
            StmtKind::Function { func, .. } => func,
            other => panic!("expected function, got {other:?}"),
        }
    }

    #[test]
    fn test_declaration_binds_in_enclosing_scope() {
        let (stmts, ctx) = parse("function* gen(a, b = 1, ...rest) { yield a }").unwrap();
        let func = function(&stmts[0]);
        assert_eq!(func.params.len(), 3);
        assert!(func.params[2].is_rest);
        assert!(func.is_generator);
        let member = ctx.scopes.get(ScopeTree::MODULE).members["gen"];
        assert_eq!(
            ctx.symbols.get(member.symbol).kind,
            SymbolKind::GeneratorOrAsyncFunction
        );
    }

    #[test]
    fn test_overloads_are_erased() {
        let (stmts, ctx) = parse(
            "function f(a: string): void;\nfunction f(a: number): void;\nfunction f(a: any) {}",
        )
        .unwrap();
        assert!(matches!(stmts[0].kind, StmtKind::TypeScript));
        assert!(matches!(stmts[1].kind, StmtKind::TypeScript));
        assert!(matches!(stmts[2].kind, StmtKind::Function { .. }));
        assert!(ctx.scopes.get(ScopeTree::MODULE).members.contains_key("f"));
    }

    #[test]
    fn test_missing_body_is_error_in_javascript() {
        let mut parser = Parser::new("function f();", ParserOptions::javascript()).unwrap();
        assert!(parser.parse_program().is_err());
    }

    #[test]
    fn test_this_parameter_is_erased() {
        let (stmts, _) = parse("function f(this: Window, a?: number): string { return '' }")
            .unwrap();
        assert_eq!(function(&stmts[0]).params.len(), 1);
    }

    #[test]
    fn test_parameter_property_outside_constructor() {
        let err = parse("function f(public x) {}").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Syntax);
        assert_eq!(
            err.message,
            "A parameter property is only allowed in a constructor implementation"
        );
    }

    #[test]
    fn test_modifier_names_are_plain_parameters() {
        let (stmts, _) = parse("function f(readonly, public: number) {}").unwrap();
        let func = function(&stmts[0]);
        assert_eq!(func.params.len(), 2);
        assert!(!func.params[0].is_parameter_property);
    }

    #[test]
    fn test_body_sees_parameters_and_arguments() {
        let (stmts, ctx) = parse("function f(x) { var x; }").unwrap();
        let body = ctx.scopes.get(function(&stmts[0]).body.scope);
        assert!(body.members.contains_key("x"));
        assert!(body.members.contains_key("arguments"));

        let err = parse("function f(x) { let x; }").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Declaration);
    }

    #[test]
    fn test_function_expression_name_is_local() {
        let (stmts, ctx) = parse("(function inner() { return inner })").unwrap();
        let StmtKind::Expr(expr) = &stmts[0].kind else {
            panic!("expected expression");
        };
        let ExprKind::Function(func) = &expr.kind else {
            panic!("expected function");
        };
        assert!(func.name.is_some());
        assert!(!ctx.scopes.get(ScopeTree::MODULE).members.contains_key("inner"));
        assert!(ctx.scopes.get(func.args_scope).members.contains_key("inner"));
        assert!(!ctx.scopes.get(func.body.scope).members.contains_key("inner"));
    }

    #[test]
    fn test_await_and_yield_are_scoped() {
        assert!(parse("async function f() { await g() }").is_ok());
        let (stmts, _) = parse("function f() { yield }").unwrap();
        assert!(matches!(stmts[0].kind, StmtKind::Function { .. }));
    }
}
