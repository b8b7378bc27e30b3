//! Expression parsing.
//!
//! Precedence climbing over `Level`: `parse_prefix` reads one operand and
//! `parse_suffix` extends it with every operator that binds tighter than the
//! caller's level. Parenthesized lists are parsed as expressions first and
//! reinterpreted as arrow parameters once a `=>` (or a TypeScript return
//! type followed by `=>`) shows up.

use crate::ast::*;
use crate::backtrack::Attempt;
use crate::class::ClassContext;
use crate::error::Result;
use crate::parser::{FnFlags, Parser};
use crate::span::Span;
use crate::symbols::{ScopeId, ScopeKind, SymbolKind};
use crate::token::TokenKind;

impl<'a> Parser<'a> {
    /// Parse an expression whose operators all bind tighter than `level`.
    pub(crate) fn parse_expr(&mut self, level: Level) -> Result<Expr> {
        let left = self.parse_prefix(level)?;
        self.parse_suffix(left, level)
    }

    // =========================================================================
    // Rescanning
    // =========================================================================

    /// Re-read the current `}` as the continuation of a template literal.
    pub(crate) fn rescan_template_continuation(&mut self) -> Result<()> {
        if !self.check(&TokenKind::RBrace) {
            return self.expected("\"}\"");
        }
        let start = self.current.span.start as usize;
        let had_newline = self.current.had_newline_before;
        self.current = self
            .lexer
            .rescan_template_continuation(start, had_newline)
            .map_err(|e| self.ctx.log.report(e))?;
        Ok(())
    }

    /// Re-read the current `/` or `/=` as a regular expression literal.
    fn rescan_regex(&mut self) -> Result<()> {
        let start = self.current.span.start as usize;
        let had_newline = self.current.had_newline_before;
        self.current = self
            .lexer
            .rescan_regex(start, had_newline)
            .map_err(|e| self.ctx.log.report(e))?;
        Ok(())
    }

    /// An identifier reference. Also feeds the enum self-reference watch.
    pub(crate) fn ident_expr(&mut self, name: String, span: Span) -> Expr {
        if let Some((watched, seen)) = &mut self.enum_self_ref {
            if *watched == name {
                *seen = true;
            }
        }
        Expr::new(ExprKind::Ident(Ident { name, symbol: None }), span)
    }

    // =========================================================================
    // Prefix
    // =========================================================================

    fn parse_prefix(&mut self, level: Level) -> Result<Expr> {
        let start = self.current.span.start;
        let token_span = self.current.span;
        let kind = match self.peek() {
            TokenKind::Super => {
                self.next()?;
                ExprKind::Super
            }
            TokenKind::This => {
                self.next()?;
                ExprKind::This
            }
            TokenKind::Null => {
                self.next()?;
                ExprKind::Null
            }
            TokenKind::True | TokenKind::False => {
                let value = self.check(&TokenKind::True);
                self.next()?;
                ExprKind::Bool(value)
            }
            TokenKind::Number(value) => {
                let value = *value;
                self.next()?;
                ExprKind::Number(value)
            }
            TokenKind::BigInt(value) => {
                let value = value.clone();
                self.next()?;
                ExprKind::BigInt(value)
            }
            TokenKind::String(value) => {
                let value = value.clone();
                self.next()?;
                ExprKind::String(value)
            }
            // "#x in obj"
            TokenKind::PrivateName(name) => {
                let name = name.clone();
                self.next()?;
                if !self.check(&TokenKind::In) {
                    return self.syntax_error(format!("Unexpected \"#{name}\""), token_span);
                }
                ExprKind::PrivateName(name)
            }
            TokenKind::TemplateNoSub(_) | TokenKind::TemplateHead(_) => {
                return self.parse_template(None, start);
            }
            TokenKind::Slash | TokenKind::SlashEq => {
                self.rescan_regex()?;
                let TokenKind::Regex { pattern, flags } = self.peek().clone() else {
                    return self.unexpected();
                };
                self.next()?;
                ExprKind::Regex { pattern, flags }
            }
            TokenKind::LParen => return self.parse_paren_or_arrow(start, level, None),
            TokenKind::LBracket => return self.parse_array_literal(),
            TokenKind::LBrace => return self.parse_object_literal(),
            TokenKind::Function => return self.parse_function_expr(start, false),
            TokenKind::Class => {
                let class = self.parse_class(start, Vec::new(), ClassContext::Expr)?;
                ExprKind::Class(Box::new(class))
            }
            TokenKind::At => {
                let decorators = self.parse_decorators()?;
                if !self.check(&TokenKind::Class) {
                    return self.expected("\"class\"");
                }
                let class = self.parse_class(start, decorators, ClassContext::Expr)?;
                ExprKind::Class(Box::new(class))
            }
            TokenKind::New => return self.parse_new_expr(start),
            TokenKind::Import => return self.parse_import_expr(start),
            TokenKind::Plus
            | TokenKind::Minus
            | TokenKind::Tilde
            | TokenKind::Bang
            | TokenKind::Void
            | TokenKind::Typeof
            | TokenKind::Delete => {
                let op = match self.peek() {
                    TokenKind::Plus => UnaryOp::Pos,
                    TokenKind::Minus => UnaryOp::Neg,
                    TokenKind::Tilde => UnaryOp::Cpl,
                    TokenKind::Bang => UnaryOp::Not,
                    TokenKind::Void => UnaryOp::Void,
                    TokenKind::Typeof => UnaryOp::Typeof,
                    _ => UnaryOp::Delete,
                };
                self.next()?;
                let arg = self.parse_expr(Level::Prefix)?;
                ExprKind::Unary {
                    op,
                    arg: Box::new(arg),
                }
            }
            TokenKind::PlusPlus | TokenKind::MinusMinus => {
                let op = if self.check(&TokenKind::PlusPlus) {
                    UnaryOp::PreInc
                } else {
                    UnaryOp::PreDec
                };
                self.next()?;
                let arg = self.parse_expr(Level::Prefix)?;
                self.check_assign_target(&arg, false)?;
                ExprKind::Unary {
                    op,
                    arg: Box::new(arg),
                }
            }
            TokenKind::Lt if self.options.typescript => {
                return self.parse_angle_bracket_prefix(start, level);
            }
            TokenKind::Identifier(name) => {
                let name = name.clone();
                return self.parse_identifier_prefix(name, start, level);
            }
            _ => return self.unexpected(),
        };
        Ok(Expr::new(kind, self.span_from(start)))
    }

    fn parse_identifier_prefix(&mut self, name: String, start: u32, level: Level) -> Result<Expr> {
        let span = self.current.span;
        match name.as_str() {
            "async" => return self.parse_async_prefix(start, level),
            "await" if self.fn_flags.allow_await => {
                self.next()?;
                let arg = self.parse_expr(Level::Prefix)?;
                return Ok(Expr::new(
                    ExprKind::Await(Box::new(arg)),
                    self.span_from(start),
                ));
            }
            "yield" if self.fn_flags.allow_yield => return self.parse_yield_expr(start, level),
            _ => {}
        }
        self.next()?;

        // "x => x"
        if self.check(&TokenKind::Arrow) && level <= Level::Assign {
            let args_scope = self.push_scope(ScopeKind::FunctionArgs);
            let symbol = self.declare_symbol(SymbolKind::Hoisted, span, &name)?;
            let params = vec![Param::simple(Binding {
                kind: BindingKind::Ident(symbol),
                span,
            })];
            return self.parse_arrow_body(start, params, false, args_scope);
        }

        Ok(self.ident_expr(name, span))
    }

    fn parse_yield_expr(&mut self, start: u32, level: Level) -> Result<Expr> {
        let span = self.current.span;
        if level > Level::Assign {
            return self.syntax_error(
                "Cannot use a \"yield\" expression here without parentheses",
                span,
            );
        }
        self.next()?;
        let mut delegate = false;
        let mut arg = None;
        if !self.current.had_newline_before {
            if self.eat(&TokenKind::Star)? {
                delegate = true;
                arg = Some(Box::new(self.parse_expr(Level::Yield)?));
            } else if self.peek().can_start_expr() && !self.check(&TokenKind::DotDotDot) {
                arg = Some(Box::new(self.parse_expr(Level::Yield)?));
            }
        }
        Ok(Expr::new(
            ExprKind::Yield { arg, delegate },
            self.span_from(start),
        ))
    }

    /// Everything that can start with the contextual word `async`.
    fn parse_async_prefix(&mut self, start: u32, level: Level) -> Result<Expr> {
        let async_span = self.current.span;
        self.next()?;
        let same_line = !self.current.had_newline_before;

        match self.peek() {
            // "async function() {}"
            TokenKind::Function if same_line => return self.parse_function_expr(start, true),

            // "async x => x"
            TokenKind::Identifier(_) if same_line && level <= Level::Assign => {
                let (name, span) = self.expect_identifier()?;
                if !self.check(&TokenKind::Arrow) {
                    return self.expected("\"=>\"");
                }
                let args_scope = self.push_scope(ScopeKind::FunctionArgs);
                let symbol = self.declare_symbol(SymbolKind::Hoisted, span, &name)?;
                let params = vec![Param::simple(Binding {
                    kind: BindingKind::Ident(symbol),
                    span,
                })];
                return self.parse_arrow_body(start, params, true, args_scope);
            }

            // "async (x) => x" or a call to a function named "async"
            TokenKind::LParen if same_line => {
                return self.parse_paren_or_arrow(start, level, Some(async_span));
            }

            // "async <T>(x: T) => x"
            TokenKind::Lt if same_line && self.options.typescript => {
                if self
                    .try_skip_type_parameters_then_open_paren_with_backtracking()
                    .is_committed()
                {
                    return self.parse_paren_or_arrow(start, level, Some(async_span));
                }
            }

            _ => {}
        }

        Ok(self.ident_expr("async".to_string(), async_span))
    }

    /// `<T>(x: T) => x` or the `<T>expr` type assertion.
    fn parse_angle_bracket_prefix(&mut self, start: u32, level: Level) -> Result<Expr> {
        if let Attempt::Committed(_) =
            self.try_skip_type_parameters_then_open_paren_with_backtracking()
        {
            return self.parse_paren_or_arrow(start, level, None);
        }
        self.next()?;
        self.skip_type(Level::Lowest)?;
        self.expect_greater_than()?;
        self.parse_prefix(level)
    }

    // =========================================================================
    // Parentheses and Arrows
    // =========================================================================

    /// `(a, b)` or `(a, b) => body`. With `async_span` set this is also
    /// `async(a, b)`, a call to a function named `async`.
    fn parse_paren_or_arrow(
        &mut self,
        start: u32,
        level: Level,
        async_span: Option<Span>,
    ) -> Result<Expr> {
        let paren_start = self.current.span.start;
        self.expect(&TokenKind::LParen)?;
        let args_scope = self.push_scope(ScopeKind::FunctionArgs);
        let old_allow_in = std::mem::replace(&mut self.allow_in, true);
        let old_in_decorator = std::mem::replace(&mut self.in_decorator, false);
        let old_optional_arg = self.optional_arrow_arg.take();

        let mut items = Vec::new();
        let mut spread_span = None;
        let mut type_colon_span = None;
        while !self.check(&TokenKind::RParen) {
            let item_start = self.current.span.start;
            let is_spread = self.eat(&TokenKind::DotDotDot)?;
            if is_spread && spread_span.is_none() {
                spread_span = Some(self.span_from(item_start));
            }
            self.latest_arrow_arg = Some(self.current.span);
            let mut item = self.parse_expr(Level::Comma)?;

            // "(a: T) => a", "(a: T = 1) => a"
            if self.options.typescript && self.check(&TokenKind::Colon) {
                if type_colon_span.is_none() {
                    type_colon_span = Some(self.current.span);
                }
                self.next()?;
                self.skip_type(Level::Lowest)?;
                if self.eat(&TokenKind::Eq)? {
                    let value = self.parse_expr(Level::Comma)?;
                    item = Expr::assign(item, value);
                }
            }

            if is_spread {
                item = Expr::new(ExprKind::Spread(Box::new(item)), self.span_from(item_start));
            }
            items.push(item);
            if !self.eat(&TokenKind::Comma)? {
                break;
            }
        }
        self.expect(&TokenKind::RParen)?;
        let paren_span = self.span_from(paren_start);
        self.allow_in = old_allow_in;
        self.in_decorator = old_in_decorator;
        let optional_arg = std::mem::replace(&mut self.optional_arrow_arg, old_optional_arg);

        let mut is_arrow = level <= Level::Assign && self.check(&TokenKind::Arrow);
        if !is_arrow
            && level <= Level::Assign
            && self.options.typescript
            && self.check(&TokenKind::Colon)
        {
            if self.conditional_consequent == Some(start) {
                // "a ? (b) : c => d" is a conditional
                let attempt = self.try_parse_arrow_before_colon_with_backtracking(
                    start,
                    items.clone(),
                    async_span.is_some(),
                    args_scope,
                );
                if let Attempt::Committed(arrow) = attempt {
                    return Ok(arrow);
                }
            } else {
                is_arrow = self.try_skip_arrow_return_type_with_backtracking();
            }
        }

        if is_arrow {
            let params = self.items_to_params(items)?;
            return self.parse_arrow_body(start, params, async_span.is_some(), args_scope);
        }

        self.pop_and_flatten_scope(args_scope);

        if let Some(span) = type_colon_span {
            return self.syntax_error("Unexpected \":\"", span);
        }
        if let Some(span) = optional_arg {
            return self.syntax_error("Unexpected \"?\"", span);
        }

        // "async(a, b)"
        if let Some(async_span) = async_span {
            let target = self.ident_expr("async".to_string(), async_span);
            return Ok(Expr::new(
                ExprKind::Call {
                    target: Box::new(target),
                    args: items,
                    optional_chain: OptionalChain::None,
                },
                self.span_from(start),
            ));
        }

        if let Some(span) = spread_span {
            return self.syntax_error("Unexpected \"...\"", span);
        }
        match Expr::join_with_comma(items) {
            // The span covers the parentheses so later checks can tell
            // "(-a) ** b" from "-a ** b".
            Some(expr) => Ok(Expr::new(expr.kind, paren_span)),
            None => self.expected("\"=>\""),
        }
    }

    /// Parse `=> body` after the parameters. The `FunctionArgs` scope holding
    /// the parameters must be current; it is popped here.
    pub(crate) fn parse_arrow_body(
        &mut self,
        start: u32,
        params: Vec<Param>,
        is_async: bool,
        args_scope: ScopeId,
    ) -> Result<Expr> {
        if self.current.had_newline_before {
            let span = self.current.span;
            return self.syntax_error("Unexpected newline before \"=>\"", span);
        }
        self.expect(&TokenKind::Arrow)?;
        let old_flags = std::mem::replace(
            &mut self.fn_flags,
            FnFlags {
                allow_await: is_async,
                allow_yield: false,
            },
        );

        let (body, prefer_expr) = if self.check(&TokenKind::LBrace) {
            (self.parse_fn_body(false)?, false)
        } else {
            let scope = self.push_function_body_scope(false)?;
            let old_in_decorator = std::mem::replace(&mut self.in_decorator, false);
            let expr = self.parse_expr(Level::Comma)?;
            self.in_decorator = old_in_decorator;
            self.pop_scope();
            let span = expr.span;
            (
                FnBody {
                    stmts: vec![Stmt::new(StmtKind::Return(Some(expr)), span)],
                    scope,
                },
                true,
            )
        };

        self.fn_flags = old_flags;
        self.pop_scope();
        self.after_arrow_body = Some(self.current.span.start);
        Ok(Expr::new(
            ExprKind::Arrow(Box::new(Arrow {
                params,
                body,
                is_async,
                prefer_expr,
                args_scope,
            })),
            self.span_from(start),
        ))
    }

    pub(crate) fn items_to_params(&mut self, items: Vec<Expr>) -> Result<Vec<Param>> {
        let count = items.len();
        let mut params = Vec::with_capacity(count);
        for (i, item) in items.into_iter().enumerate() {
            let (item, is_rest) = match item.kind {
                ExprKind::Spread(inner) => {
                    if i + 1 != count {
                        return self.syntax_error("A rest parameter must be last", item.span);
                    }
                    (*inner, true)
                }
                kind => (Expr::new(kind, item.span), false),
            };
            let (binding, default) = self.expr_to_binding_with_default(item)?;
            params.push(Param {
                binding,
                default,
                is_rest,
                decorators: Vec::new(),
                is_parameter_property: false,
            });
        }
        Ok(params)
    }

    /// Reinterpret `pattern = default` parsed as an expression.
    fn expr_to_binding_with_default(&mut self, expr: Expr) -> Result<(Binding, Option<Expr>)> {
        match expr.kind {
            ExprKind::Binary {
                op: BinaryOp::Assign,
                left,
                right,
            } => Ok((self.expr_to_binding(*left)?, Some(*right))),
            kind => Ok((self.expr_to_binding(Expr::new(kind, expr.span))?, None)),
        }
    }

    /// Reinterpret an expression as a binding pattern, declaring each name
    /// as a parameter in the current scope.
    fn expr_to_binding(&mut self, expr: Expr) -> Result<Binding> {
        let span = expr.span;
        let kind = match expr.kind {
            ExprKind::Ident(ident) => {
                BindingKind::Ident(self.declare_symbol(SymbolKind::Hoisted, span, &ident.name)?)
            }
            ExprKind::Array(items) => {
                let count = items.len();
                let mut out = Vec::with_capacity(count);
                let mut has_spread = false;
                for (i, item) in items.into_iter().enumerate() {
                    let item_span = item.span;
                    match item.kind {
                        ExprKind::Missing => out.push(ArrayBindingItem {
                            binding: Binding {
                                kind: BindingKind::Missing,
                                span: item_span,
                            },
                            default: None,
                        }),
                        ExprKind::Spread(inner) if i + 1 == count => {
                            has_spread = true;
                            out.push(ArrayBindingItem {
                                binding: self.expr_to_binding(*inner)?,
                                default: None,
                            });
                        }
                        kind => {
                            let (binding, default) =
                                self.expr_to_binding_with_default(Expr::new(kind, item_span))?;
                            out.push(ArrayBindingItem { binding, default });
                        }
                    }
                }
                BindingKind::Array {
                    items: out,
                    has_spread,
                }
            }
            ExprKind::Object(props) => {
                let mut out = Vec::with_capacity(props.len());
                for prop in props {
                    if prop.is_method || matches!(prop.kind, PropertyKind::Get | PropertyKind::Set)
                    {
                        return self.syntax_error("Invalid binding pattern", prop.span);
                    }
                    if prop.kind == PropertyKind::Spread {
                        out.push(PropertyBinding {
                            key: prop.key,
                            value: self.expr_to_binding(prop.value)?,
                            default: None,
                            is_spread: true,
                            is_shorthand: false,
                        });
                        continue;
                    }
                    let (value, default) = match prop.initializer {
                        Some(init) => (self.expr_to_binding(prop.value)?, Some(init)),
                        None => self.expr_to_binding_with_default(prop.value)?,
                    };
                    out.push(PropertyBinding {
                        key: prop.key,
                        value,
                        default,
                        is_spread: false,
                        is_shorthand: prop.is_shorthand,
                    });
                }
                BindingKind::Object { props: out }
            }
            _ => return self.syntax_error("Invalid binding pattern", span),
        };
        Ok(Binding { kind, span })
    }

    // =========================================================================
    // Literals
    // =========================================================================

    fn parse_template(&mut self, tag: Option<Box<Expr>>, start: u32) -> Result<Expr> {
        let head = match self.peek() {
            TokenKind::TemplateNoSub(text) => {
                let head = text.clone();
                self.next()?;
                return Ok(Expr::new(
                    ExprKind::Template {
                        tag,
                        head,
                        parts: Vec::new(),
                    },
                    self.span_from(start),
                ));
            }
            TokenKind::TemplateHead(text) => text.clone(),
            _ => return self.unexpected(),
        };
        self.next()?;

        let old_allow_in = std::mem::replace(&mut self.allow_in, true);
        let old_in_decorator = std::mem::replace(&mut self.in_decorator, false);
        let mut parts = Vec::new();
        loop {
            let expr = self.parse_expr(Level::Lowest)?;
            self.rescan_template_continuation()?;
            match self.peek() {
                TokenKind::TemplateMiddle(text) => {
                    let tail = text.clone();
                    self.next()?;
                    parts.push(TemplatePart { expr, tail });
                }
                TokenKind::TemplateTail(text) => {
                    let tail = text.clone();
                    self.next()?;
                    parts.push(TemplatePart { expr, tail });
                    break;
                }
                _ => return self.unexpected(),
            }
        }
        self.allow_in = old_allow_in;
        self.in_decorator = old_in_decorator;

        Ok(Expr::new(
            ExprKind::Template { tag, head, parts },
            self.span_from(start),
        ))
    }

    fn parse_array_literal(&mut self) -> Result<Expr> {
        let start = self.current.span.start;
        self.expect(&TokenKind::LBracket)?;
        let old_allow_in = std::mem::replace(&mut self.allow_in, true);
        let old_in_decorator = std::mem::replace(&mut self.in_decorator, false);

        let mut items = Vec::new();
        while !self.check(&TokenKind::RBracket) {
            if self.check(&TokenKind::Comma) {
                let span = Span::empty(self.current.span.start);
                self.next()?;
                items.push(Expr::new(ExprKind::Missing, span));
                continue;
            }
            let item_start = self.current.span.start;
            let item = if self.eat(&TokenKind::DotDotDot)? {
                let arg = self.parse_expr(Level::Comma)?;
                Expr::new(ExprKind::Spread(Box::new(arg)), self.span_from(item_start))
            } else {
                self.parse_expr(Level::Comma)?
            };
            items.push(item);
            if !self.eat(&TokenKind::Comma)? {
                break;
            }
        }
        self.expect(&TokenKind::RBracket)?;
        self.allow_in = old_allow_in;
        self.in_decorator = old_in_decorator;
        Ok(Expr::new(ExprKind::Array(items), self.span_from(start)))
    }

    fn parse_object_literal(&mut self) -> Result<Expr> {
        let start = self.current.span.start;
        self.expect(&TokenKind::LBrace)?;
        let old_allow_in = std::mem::replace(&mut self.allow_in, true);
        let old_in_decorator = std::mem::replace(&mut self.in_decorator, false);

        let mut props = Vec::new();
        while !self.check(&TokenKind::RBrace) {
            props.push(self.parse_object_property()?);
            if !self.eat(&TokenKind::Comma)? {
                break;
            }
        }
        self.expect(&TokenKind::RBrace)?;
        self.allow_in = old_allow_in;
        self.in_decorator = old_in_decorator;
        Ok(Expr::new(ExprKind::Object(props), self.span_from(start)))
    }

    fn parse_object_property(&mut self) -> Result<Property> {
        let start = self.current.span.start;

        // "{ ...rest }"
        if self.eat(&TokenKind::DotDotDot)? {
            let value = self.parse_expr(Level::Comma)?;
            return Ok(Property {
                kind: PropertyKind::Spread,
                key: PropertyKey::Name(String::new()),
                value,
                initializer: None,
                is_method: false,
                is_shorthand: false,
                span: self.span_from(start),
            });
        }

        let mut kind = PropertyKind::Init;
        let mut is_async = false;
        if let TokenKind::Identifier(word) = self.peek() {
            if matches!(word.as_str(), "get" | "set" | "async") {
                let word = word.clone();
                let next = self.lookahead()?;
                let is_name = matches!(
                    next.kind,
                    TokenKind::Comma
                        | TokenKind::Colon
                        | TokenKind::LParen
                        | TokenKind::RBrace
                        | TokenKind::Eq
                        | TokenKind::Lt
                ) || (word == "async" && next.had_newline_before);
                if !is_name {
                    self.next()?;
                    match word.as_str() {
                        "get" => kind = PropertyKind::Get,
                        "set" => kind = PropertyKind::Set,
                        _ => is_async = true,
                    }
                }
            }
        }
        let is_generator = self.eat(&TokenKind::Star)?;

        let key_token = self.current.clone();
        let key = self.parse_property_key()?;

        // Methods and accessors
        let starts_method = self.check(&TokenKind::LParen)
            || (self.options.typescript && self.check(&TokenKind::Lt));
        if starts_method || is_async || is_generator || kind != PropertyKind::Init {
            let func_start = self.current.span.start;
            let func = self.parse_method_function(func_start, is_async, is_generator)?;
            let span = func.span;
            return Ok(Property {
                kind,
                key,
                value: Expr::new(ExprKind::Function(Box::new(func)), span),
                initializer: None,
                is_method: kind == PropertyKind::Init,
                is_shorthand: false,
                span: self.span_from(start),
            });
        }

        if self.eat(&TokenKind::Colon)? {
            let value = self.parse_expr(Level::Comma)?;
            return Ok(Property {
                kind,
                key,
                value,
                initializer: None,
                is_method: false,
                is_shorthand: false,
                span: self.span_from(start),
            });
        }

        // "{ x }" and "{ x = 1 }" (the latter only valid as a pattern)
        let TokenKind::Identifier(name) = key_token.kind else {
            return self.expected("\":\"");
        };
        let value = self.ident_expr(name, key_token.span);
        let initializer = if self.eat(&TokenKind::Eq)? {
            Some(self.parse_expr(Level::Comma)?)
        } else {
            None
        };
        Ok(Property {
            kind,
            key,
            value,
            initializer,
            is_method: false,
            is_shorthand: true,
            span: self.span_from(start),
        })
    }

    // =========================================================================
    // new / import
    // =========================================================================

    fn parse_new_expr(&mut self, start: u32) -> Result<Expr> {
        self.next()?;

        // "new.target"
        if self.eat(&TokenKind::Dot)? {
            self.expect_ident_text("target")?;
            return Ok(Expr::new(ExprKind::NewTarget, self.span_from(start)));
        }

        let target = self.parse_expr(Level::Member)?;

        // "new Foo<T>()"
        if self.options.typescript {
            self.try_skip_type_arguments_with_backtracking();
        }

        let args = if self.check(&TokenKind::LParen) {
            self.parse_call_args()?
        } else {
            Vec::new()
        };
        Ok(Expr::new(
            ExprKind::New {
                target: Box::new(target),
                args,
            },
            self.span_from(start),
        ))
    }

    fn parse_import_expr(&mut self, start: u32) -> Result<Expr> {
        self.next()?;

        // "import.meta"
        if self.eat(&TokenKind::Dot)? {
            self.expect_ident_text("meta")?;
            return Ok(Expr::new(ExprKind::ImportMeta, self.span_from(start)));
        }

        self.expect(&TokenKind::LParen)?;
        let old_allow_in = std::mem::replace(&mut self.allow_in, true);
        let arg = self.parse_expr(Level::Comma)?;
        let mut options = None;
        if self.eat(&TokenKind::Comma)? && !self.check(&TokenKind::RParen) {
            options = Some(Box::new(self.parse_expr(Level::Comma)?));
            self.eat(&TokenKind::Comma)?;
        }
        self.expect(&TokenKind::RParen)?;
        self.allow_in = old_allow_in;
        Ok(Expr::new(
            ExprKind::ImportCall {
                arg: Box::new(arg),
                options,
            },
            self.span_from(start),
        ))
    }

    /// `(a, ...b)`
    pub(crate) fn parse_call_args(&mut self) -> Result<Vec<Expr>> {
        self.expect(&TokenKind::LParen)?;
        let old_allow_in = std::mem::replace(&mut self.allow_in, true);
        let old_in_decorator = std::mem::replace(&mut self.in_decorator, false);
        let mut args = Vec::new();
        while !self.check(&TokenKind::RParen) {
            let arg_start = self.current.span.start;
            let arg = if self.eat(&TokenKind::DotDotDot)? {
                let value = self.parse_expr(Level::Comma)?;
                Expr::new(ExprKind::Spread(Box::new(value)), self.span_from(arg_start))
            } else {
                self.parse_expr(Level::Comma)?
            };
            args.push(arg);
            if !self.eat(&TokenKind::Comma)? {
                break;
            }
        }
        self.expect(&TokenKind::RParen)?;
        self.allow_in = old_allow_in;
        self.in_decorator = old_in_decorator;
        Ok(args)
    }

    // =========================================================================
    // Suffix
    // =========================================================================

    fn parse_suffix(&mut self, mut left: Expr, level: Level) -> Result<Expr> {
        // An arrow function may only be followed by a comma here
        if matches!(left.kind, ExprKind::Arrow(_))
            && self.after_arrow_body == Some(self.current.span.start)
            && !(self.check(&TokenKind::Comma) && level < Level::Comma)
        {
            return Ok(left);
        }

        let start = left.span.start;
        let mut in_chain = false;
        loop {
            let link = if in_chain {
                OptionalChain::Continue
            } else {
                OptionalChain::None
            };

            // "f<T>(x)", "f<T>`...`", instantiation expressions
            if self.options.typescript
                && matches!(self.peek(), TokenKind::Lt | TokenKind::LtLt)
                && self.try_skip_type_arguments_with_backtracking()
            {
                continue;
            }

            match self.peek() {
                TokenKind::Dot => {
                    self.next()?;
                    left = self.parse_member_name(left, start, link)?;
                }

                TokenKind::QuestionDot => {
                    if level >= Level::Call {
                        return Ok(left);
                    }
                    self.next()?;
                    left = match self.peek() {
                        TokenKind::LBracket => {
                            self.next()?;
                            let old_allow_in = std::mem::replace(&mut self.allow_in, true);
                            let index = self.parse_expr(Level::Lowest)?;
                            self.allow_in = old_allow_in;
                            self.expect(&TokenKind::RBracket)?;
                            Expr::new(
                                ExprKind::Index {
                                    target: Box::new(left),
                                    index: Box::new(index),
                                    optional_chain: OptionalChain::Start,
                                },
                                self.span_from(start),
                            )
                        }
                        TokenKind::LParen => self.finish_call(left, start, OptionalChain::Start)?,
                        // "a?.<T>()"
                        TokenKind::Lt if self.options.typescript => {
                            if !self.try_skip_type_arguments_with_backtracking() {
                                return self.unexpected();
                            }
                            if !self.check(&TokenKind::LParen) {
                                return self.expected("\"(\"");
                            }
                            self.finish_call(left, start, OptionalChain::Start)?
                        }
                        _ => self.parse_member_name(left, start, OptionalChain::Start)?,
                    };
                    in_chain = true;
                }

                TokenKind::TemplateNoSub(_) | TokenKind::TemplateHead(_) => {
                    if in_chain {
                        let span = self.current.span;
                        return self.syntax_error(
                            "Template literals cannot have an optional chain as a tag",
                            span,
                        );
                    }
                    left = self.parse_template(Some(Box::new(left)), start)?;
                }

                TokenKind::LBracket => {
                    // "@dec [key]() {}" belongs to the class member
                    if self.in_decorator {
                        return Ok(left);
                    }
                    self.next()?;
                    let old_allow_in = std::mem::replace(&mut self.allow_in, true);
                    let index = self.parse_expr(Level::Lowest)?;
                    self.allow_in = old_allow_in;
                    self.expect(&TokenKind::RBracket)?;
                    left = Expr::new(
                        ExprKind::Index {
                            target: Box::new(left),
                            index: Box::new(index),
                            optional_chain: link,
                        },
                        self.span_from(start),
                    );
                }

                TokenKind::LParen => {
                    if level >= Level::Call {
                        return Ok(left);
                    }
                    left = self.finish_call(left, start, link)?;
                }

                // "x!" is erased
                TokenKind::Bang if self.options.typescript && !self.current.had_newline_before => {
                    if level >= Level::Postfix {
                        return Ok(left);
                    }
                    self.next()?;
                }

                TokenKind::PlusPlus | TokenKind::MinusMinus => {
                    if self.current.had_newline_before || level >= Level::Postfix {
                        return Ok(left);
                    }
                    let op = if self.check(&TokenKind::PlusPlus) {
                        UnaryOp::PostInc
                    } else {
                        UnaryOp::PostDec
                    };
                    self.check_assign_target(&left, false)?;
                    self.next()?;
                    left = Expr::new(
                        ExprKind::Unary {
                            op,
                            arg: Box::new(left),
                        },
                        self.span_from(start),
                    );
                    in_chain = false;
                }

                TokenKind::Question => {
                    if level >= Level::Conditional {
                        return Ok(left);
                    }
                    let question_span = self.current.span;
                    self.next()?;

                    // "(a?) => a", "(a?: T) => a", "(a?, b) => a"
                    if self.options.typescript
                        && self
                            .latest_arrow_arg
                            .is_some_and(|arg| arg.start == left.span.start)
                        && matches!(
                            self.peek(),
                            TokenKind::Colon | TokenKind::RParen | TokenKind::Comma
                        )
                    {
                        self.optional_arrow_arg = Some(question_span);
                        return Ok(left);
                    }

                    let old_allow_in = std::mem::replace(&mut self.allow_in, true);
                    let old_consequent =
                        self.conditional_consequent.replace(self.current.span.start);
                    let consequent = self.parse_expr(Level::Comma)?;
                    self.conditional_consequent = old_consequent;
                    self.allow_in = old_allow_in;
                    self.expect(&TokenKind::Colon)?;
                    let alternate = self.parse_expr(Level::Comma)?;
                    left = Expr::new(
                        ExprKind::Conditional {
                            test: Box::new(left),
                            consequent: Box::new(consequent),
                            alternate: Box::new(alternate),
                        },
                        self.span_from(start),
                    );
                    in_chain = false;
                }

                // "x as T", "x satisfies T"
                TokenKind::Identifier(word)
                    if self.options.typescript
                        && (word == "as" || word == "satisfies")
                        && !self.current.had_newline_before =>
                {
                    if level >= Level::Compare {
                        return Ok(left);
                    }
                    self.next()?;
                    self.skip_type(Level::Lowest)?;

                    // "x as T\n(y)" starts a new statement; on one line it is an error
                    let forbidden = matches!(
                        self.peek(),
                        TokenKind::PlusPlus
                            | TokenKind::MinusMinus
                            | TokenKind::TemplateNoSub(_)
                            | TokenKind::TemplateHead(_)
                            | TokenKind::LParen
                            | TokenKind::LBracket
                            | TokenKind::QuestionDot
                    ) || self.peek().is_assignment();
                    if forbidden {
                        if self.current.had_newline_before {
                            return Ok(left);
                        }
                        return self.unexpected();
                    }
                    in_chain = false;
                }

                kind => {
                    let Some(op) = self.binary_op(kind) else {
                        return Ok(left);
                    };
                    if op.is_assign() {
                        if level > Level::Assign {
                            return Ok(left);
                        }
                        self.check_assign_target(&left, op == BinaryOp::Assign)?;
                        self.next()?;
                        let right = self.parse_expr(Level::Assign.lower())?;
                        left = Expr::binary(op, left, right);
                    } else if op == BinaryOp::Pow {
                        if level >= Level::Exponentiation {
                            return Ok(left);
                        }
                        // "-a ** b" is ambiguous and not allowed
                        if self.is_unparenthesized_unary(&left) {
                            return self.unexpected();
                        }
                        self.next()?;
                        let right = self.parse_expr(Level::Exponentiation.lower())?;
                        left = Expr::binary(op, left, right);
                    } else {
                        let op_level = op.level();
                        if level >= op_level {
                            return Ok(left);
                        }
                        self.next()?;
                        let right = self.parse_expr(op_level)?;
                        left = Expr::binary(op, left, right);
                    }
                    in_chain = false;
                }
            }
        }
    }

    /// The name after `.` or `?.`.
    fn parse_member_name(&mut self, target: Expr, start: u32, link: OptionalChain) -> Result<Expr> {
        if let TokenKind::PrivateName(name) = self.peek() {
            let name = name.clone();
            let span = self.current.span;
            self.next()?;
            return Ok(Expr::new(
                ExprKind::Index {
                    target: Box::new(target),
                    index: Box::new(Expr::new(ExprKind::PrivateName(name), span)),
                    optional_chain: link,
                },
                self.span_from(start),
            ));
        }
        let (name, _) = self.expect_identifier_or_keyword()?;
        Ok(Expr::new(
            ExprKind::Dot {
                target: Box::new(target),
                name,
                optional_chain: link,
            },
            self.span_from(start),
        ))
    }

    fn finish_call(&mut self, target: Expr, start: u32, link: OptionalChain) -> Result<Expr> {
        let args = self.parse_call_args()?;
        Ok(Expr::new(
            ExprKind::Call {
                target: Box::new(target),
                args,
                optional_chain: link,
            },
            self.span_from(start),
        ))
    }

    fn binary_op(&self, kind: &TokenKind) -> Option<BinaryOp> {
        Some(match kind {
            TokenKind::Plus => BinaryOp::Add,
            TokenKind::Minus => BinaryOp::Sub,
            TokenKind::Star => BinaryOp::Mul,
            TokenKind::Slash => BinaryOp::Div,
            TokenKind::Percent => BinaryOp::Rem,
            TokenKind::StarStar => BinaryOp::Pow,
            TokenKind::Lt => BinaryOp::Lt,
            TokenKind::LtEq => BinaryOp::Le,
            TokenKind::Gt => BinaryOp::Gt,
            TokenKind::GtEq => BinaryOp::Ge,
            TokenKind::In if self.allow_in => BinaryOp::In,
            TokenKind::Instanceof => BinaryOp::Instanceof,
            TokenKind::LtLt => BinaryOp::Shl,
            TokenKind::GtGt => BinaryOp::Shr,
            TokenKind::GtGtGt => BinaryOp::UShr,
            TokenKind::EqEq => BinaryOp::LooseEq,
            TokenKind::BangEq => BinaryOp::LooseNe,
            TokenKind::EqEqEq => BinaryOp::StrictEq,
            TokenKind::BangEqEq => BinaryOp::StrictNe,
            TokenKind::QuestionQuestion => BinaryOp::NullishCoalescing,
            TokenKind::PipePipe => BinaryOp::LogicalOr,
            TokenKind::AmpAmp => BinaryOp::LogicalAnd,
            TokenKind::Pipe => BinaryOp::BitwiseOr,
            TokenKind::Amp => BinaryOp::BitwiseAnd,
            TokenKind::Caret => BinaryOp::BitwiseXor,
            TokenKind::Comma => BinaryOp::Comma,
            TokenKind::Eq => BinaryOp::Assign,
            TokenKind::PlusEq => BinaryOp::AddAssign,
            TokenKind::MinusEq => BinaryOp::SubAssign,
            TokenKind::StarEq => BinaryOp::MulAssign,
            TokenKind::SlashEq => BinaryOp::DivAssign,
            TokenKind::PercentEq => BinaryOp::RemAssign,
            TokenKind::StarStarEq => BinaryOp::PowAssign,
            TokenKind::LtLtEq => BinaryOp::ShlAssign,
            TokenKind::GtGtEq => BinaryOp::ShrAssign,
            TokenKind::GtGtGtEq => BinaryOp::UShrAssign,
            TokenKind::PipeEq => BinaryOp::BitwiseOrAssign,
            TokenKind::AmpEq => BinaryOp::BitwiseAndAssign,
            TokenKind::CaretEq => BinaryOp::BitwiseXorAssign,
            TokenKind::QuestionQuestionEq => BinaryOp::NullishCoalescingAssign,
            TokenKind::PipePipeEq => BinaryOp::LogicalOrAssign,
            TokenKind::AmpAmpEq => BinaryOp::LogicalAndAssign,
            _ => return None,
        })
    }

    fn check_assign_target(&mut self, target: &Expr, allow_pattern: bool) -> Result<()> {
        let valid = match &target.kind {
            ExprKind::Ident(_) | ExprKind::Dot { .. } | ExprKind::Index { .. } => true,
            ExprKind::Array(_) | ExprKind::Object(_) => allow_pattern,
            _ => false,
        };
        if valid {
            Ok(())
        } else {
            self.syntax_error("Invalid assignment target", target.span)
        }
    }

    fn is_unparenthesized_unary(&self, expr: &Expr) -> bool {
        let is_unary = match &expr.kind {
            ExprKind::Unary { op, .. } => {
                op.is_prefix() && !matches!(op, UnaryOp::PreInc | UnaryOp::PreDec)
            }
            ExprKind::Await(_) => true,
            _ => false,
        };
        is_unary && self.source.as_bytes().get(expr.span.start as usize) != Some(&b'(')
    }
}

impl Param {
    /// A plain parameter without default, rest or decorators.
    pub(crate) fn simple(binding: Binding) -> Self {
        Self {
            binding,
            default: None,
            is_rest: false,
            decorators: Vec::new(),
            is_parameter_property: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::ast::*;
    use crate::error::Result;
    use crate::options::ParserOptions;
    use crate::parser::Parser;

    fn expr(source: &str) -> Result<Expr> {
        expr_with(source, ParserOptions::default())
    }

    fn expr_with(source: &str, options: ParserOptions) -> Result<Expr> {
        let mut parser = Parser::new(source, options)?;
        let stmts = parser.parse_program()?;
        match stmts.into_iter().next().map(|s| s.kind) {
            Some(StmtKind::Expr(expr)) => Ok(expr),
            other => panic!("expected expression statement, got {other:?}"),
        }
    }

    fn binary_op(expr: &Expr) -> BinaryOp {
        match &expr.kind {
            ExprKind::Binary { op, .. } => *op,
            other => panic!("expected binary, got {other:?}"),
        }
    }

    #[test]
    fn test_precedence() {
        let e = expr("a + b * c").unwrap();
        let ExprKind::Binary { op, right, .. } = &e.kind else {
            panic!("expected binary");
        };
        assert_eq!(*op, BinaryOp::Add);
        assert_eq!(binary_op(right), BinaryOp::Mul);

        let e = expr("a = b = c").unwrap();
        let ExprKind::Binary { right, .. } = &e.kind else {
            panic!("expected binary");
        };
        assert_eq!(binary_op(right), BinaryOp::Assign);
    }

    #[test]
    fn test_exponent_after_unary_is_rejected() {
        assert!(expr("-a ** 2").is_err());
        assert!(expr("(-a) ** 2").is_ok());
    }

    #[test]
    fn test_arrow_functions() {
        for source in [
            "x => x",
            "(a, b) => a + b",
            "({ a, b: [c] }, ...rest) => a",
            "(a = 1) => a",
            "async x => x",
            "async (x) => await x",
            "() => ({})",
        ] {
            let e = expr(source).unwrap();
            assert!(matches!(e.kind, ExprKind::Arrow(_)), "{source}");
        }
    }

    #[test]
    fn test_parenthesized_arrow_takes_suffixes() {
        for source in ["(() => {})()", "(async () => {})()", "((x) => x)(1)"] {
            let e = expr(source).unwrap();
            let ExprKind::Call { target, .. } = &e.kind else {
                panic!("expected call for {source}");
            };
            assert!(matches!(target.kind, ExprKind::Arrow(_)), "{source}");
        }
        let e = expr("(x => x).call(y)").unwrap();
        assert!(matches!(e.kind, ExprKind::Call { .. }));

        // A bare arrow body still ends the expression
        assert!(expr("x => {}\n(y)").is_ok());
        assert!(expr("x => {} + 1").is_err());
    }

    #[test]
    fn test_async_as_identifier() {
        let e = expr("async(a, b)").unwrap();
        assert!(matches!(e.kind, ExprKind::Call { .. }));
        let e = expr("async").unwrap();
        assert!(matches!(e.kind, ExprKind::Ident(_)));
    }

    #[test]
    fn test_typed_arrows() {
        for source in [
            "(a: number, b?: string): void => {}",
            "(a?) => a",
            "<T>(x: T): T => x",
            "<T,>(x: T) => x",
            "async <T>(x: T) => x",
            "(x): asserts x is string => {}",
        ] {
            let e = expr(source).unwrap();
            assert!(matches!(e.kind, ExprKind::Arrow(_)), "{source}");
        }
    }

    #[test]
    fn test_conditional_is_not_optional_parameter() {
        let e = expr("(a ? b : c)").unwrap();
        assert!(matches!(e.kind, ExprKind::Conditional { .. }));
    }

    #[test]
    fn test_type_annotation_outside_arrow_is_error() {
        let err = expr("(a: number)").unwrap_err();
        assert_eq!(err.message, "Unexpected \":\"");
    }

    #[test]
    fn test_generic_call_vs_comparison() {
        let e = expr("f<T>(x);").unwrap();
        let ExprKind::Call { args, .. } = &e.kind else {
            panic!("expected call");
        };
        assert_eq!(args.len(), 1);

        let e = expr("f(a < b, c > d)").unwrap();
        let ExprKind::Call { args, .. } = &e.kind else {
            panic!("expected call");
        };
        assert_eq!(args.len(), 2);
        assert_eq!(binary_op(&args[0]), BinaryOp::Lt);
        assert_eq!(binary_op(&args[1]), BinaryOp::Gt);
    }

    #[test]
    fn test_generic_comparison_followed_by_comma() {
        let e = expr("f < T > x, y").unwrap();
        assert_eq!(binary_op(&e), BinaryOp::Comma);

        // "," is not in the follow set, and "f < T >" then lacks an operand
        let err = expr("f<T>, x;").unwrap_err();
        assert_eq!(err.message, "Unexpected \",\"");
    }

    #[test]
    fn test_type_casts_are_erased() {
        let e = expr("<any>x").unwrap();
        assert!(matches!(e.kind, ExprKind::Ident(_)));
        let e = expr("x as unknown as string[]").unwrap();
        assert!(matches!(e.kind, ExprKind::Ident(_)));
        let e = expr("x! + y satisfies number").unwrap();
        assert_eq!(binary_op(&e), BinaryOp::Add);
        let e = expr("[1, 2] as const").unwrap();
        assert!(matches!(e.kind, ExprKind::Array(_)));
    }

    #[test]
    fn test_new_with_type_arguments() {
        let e = expr("new Map<string, number>()").unwrap();
        let ExprKind::New { target, args } = &e.kind else {
            panic!("expected new");
        };
        assert!(matches!(target.kind, ExprKind::Ident(_)));
        assert!(args.is_empty());
    }

    #[test]
    fn test_optional_chain_links() {
        let e = expr("a?.b.c()").unwrap();
        let ExprKind::Call {
            target,
            optional_chain,
            ..
        } = &e.kind
        else {
            panic!("expected call");
        };
        assert_eq!(*optional_chain, OptionalChain::Continue);
        let ExprKind::Dot { target, .. } = &target.kind else {
            panic!("expected dot");
        };
        assert!(matches!(
            target.kind,
            ExprKind::Dot {
                optional_chain: OptionalChain::Start,
                ..
            }
        ));
    }

    #[test]
    fn test_templates_and_regex() {
        let e = expr("tag`a${b}c${d}e`").unwrap();
        let ExprKind::Template { tag, head, parts } = &e.kind else {
            panic!("expected template");
        };
        assert!(tag.is_some());
        assert_eq!(head, "a");
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[1].tail, "e");

        let e = expr("x = /a+/g").unwrap();
        let ExprKind::Binary { right, .. } = &e.kind else {
            panic!("expected assignment");
        };
        assert!(matches!(right.kind, ExprKind::Regex { .. }));
    }

    #[test]
    fn test_javascript_mode_has_no_type_syntax() {
        let e = expr_with("a < b > c", ParserOptions::javascript()).unwrap();
        assert_eq!(binary_op(&e), BinaryOp::Gt);
        assert!(expr_with("(a: number) => a", ParserOptions::javascript()).is_err());
    }

    #[test]
    fn test_invalid_assignment_target() {
        let err = expr("1 = 2").unwrap_err();
        assert_eq!(err.message, "Invalid assignment target");
    }

    #[test]
    fn test_object_literal_forms() {
        let e = expr("({ a, b: 1, [c]: 2, get d() { return 1 }, async *e() {}, ...f, get: 3 })")
            .unwrap();
        let ExprKind::Object(props) = &e.kind else {
            panic!("expected object");
        };
        assert_eq!(props.len(), 7);
        assert!(props[0].is_shorthand);
        assert_eq!(props[3].kind, PropertyKind::Get);
        assert!(props[4].is_method);
        assert_eq!(props[5].kind, PropertyKind::Spread);
        assert!(matches!(&props[6].key, PropertyKey::Name(n) if n == "get"));
    }
}
