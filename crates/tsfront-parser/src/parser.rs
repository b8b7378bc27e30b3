//! JavaScript/TypeScript parser.
//!
//! Recursive descent for statements, Pratt-style precedence climbing for
//! expressions (see `expr.rs`). The parser declares every binding into the
//! scope tree as it goes and stores the `ScopeId` of each scoped node in the
//! AST; identifier references are left unresolved for the visit pass.
//!
//! TypeScript support is layered on at fixed grammar positions: the type
//! skipper (`ts_types.rs`) consumes annotations, the backtracking helpers
//! (`backtrack.rs`) resolve ambiguous prefixes, and `typescript.rs` handles
//! the TypeScript-only declarations.

use crate::ast::*;
use crate::class::ClassContext;
use crate::error::{Log, ParseError, Result};
use crate::lexer::Lexer;
use crate::options::ParserOptions;
use crate::span::Span;
use crate::symbols::{
    can_merge_symbols, MergeResult, Ref, ScopeId, ScopeKind, ScopeMember, ScopeTree,
    SymbolKind, SymbolTable,
};
use crate::token::{Token, TokenKind};
use rustc_hash::FxHashSet;

/// Per-file state shared by the parser and the visit pass.
#[derive(Debug, Default)]
pub struct ParseContext {
    pub symbols: SymbolTable,
    pub scopes: ScopeTree,
    /// Names declared at module scope by `type`, `interface` or a
    /// namespace without runtime value.
    pub local_type_names: FxHashSet<String>,
    pub log: Log,
}

/// Statement-level context flags.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct StmtOpts {
    pub is_module_scope: bool,
    pub is_namespace_scope: bool,
    pub is_export: bool,
    /// Inside `declare ...`: nothing is declared and no AST is kept.
    pub is_declare: bool,
}

/// Which function-level keywords are expressions here.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct FnFlags {
    pub allow_await: bool,
    pub allow_yield: bool,
}

/// The parser.
pub struct Parser<'a> {
    /// The lexer.
    pub(crate) lexer: Lexer<'a>,
    /// Current token.
    pub(crate) current: Token,
    /// End offset of the previously consumed token.
    pub(crate) prev_end: u32,
    /// Number of tokens consumed so far.
    pub(crate) token_count: usize,
    pub(crate) options: ParserOptions,
    pub(crate) source: &'a str,
    pub(crate) ctx: ParseContext,
    pub(crate) current_scope: ScopeId,
    /// When false, `in` is not parsed as a binary operator (for-in init).
    pub(crate) allow_in: bool,
    pub(crate) fn_flags: FnFlags,
    /// Parsing a decorator expression: `[` ends it.
    pub(crate) in_decorator: bool,
    /// First token of the item being parsed in a parenthesized list, so
    /// `(a?: T) => a` does not start a conditional.
    pub(crate) latest_arrow_arg: Option<Span>,
    /// The `?` of an optional arrow parameter seen in the current list.
    pub(crate) optional_arrow_arg: Option<Span>,
    /// Enum name being watched for bare references, and whether one was seen.
    pub(crate) enum_self_ref: Option<(String, bool)>,
    /// Start of the token right after the latest arrow body. Only a comma
    /// may follow an arrow there; `(() => {})()` is fine.
    pub(crate) after_arrow_body: Option<u32>,
    /// Start of the consequent of the conditional being parsed.
    pub(crate) conditional_consequent: Option<u32>,
}

impl<'a> Parser<'a> {
    /// Create a new parser positioned at the first token.
    pub fn new(source: &'a str, options: ParserOptions) -> Result<Self> {
        let mut parser = Self {
            lexer: Lexer::new(source),
            current: Token::new(TokenKind::Eof, Span::empty(0), false),
            prev_end: 0,
            token_count: 0,
            options,
            source,
            ctx: ParseContext::default(),
            current_scope: ScopeTree::MODULE,
            allow_in: true,
            fn_flags: FnFlags {
                allow_await: true,
                allow_yield: false,
            },
            in_decorator: false,
            latest_arrow_arg: None,
            optional_arrow_arg: None,
            enum_self_ref: None,
            after_arrow_body: None,
            conditional_consequent: None,
        };
        parser.next()?;
        parser.token_count = 0;
        Ok(parser)
    }

    /// Parse the whole source as a module.
    pub fn parse_program(&mut self) -> Result<Vec<Stmt>> {
        let opts = StmtOpts {
            is_module_scope: true,
            ..Default::default()
        };
        let mut stmts = Vec::new();
        while !self.is_eof() {
            stmts.push(self.parse_stmt(opts)?);
        }
        Ok(stmts)
    }

    /// Hand the symbol table, scopes and log over to a later pass.
    pub fn into_context(self) -> ParseContext {
        self.ctx
    }

    pub fn context(&self) -> &ParseContext {
        &self.ctx
    }

    // =========================================================================
    // Token Handling
    // =========================================================================

    /// Get the current token kind.
    #[inline]
    pub(crate) fn peek(&self) -> &TokenKind {
        &self.current.kind
    }

    /// Check if the current token matches the given kind.
    #[inline]
    pub(crate) fn check(&self, kind: &TokenKind) -> bool {
        std::mem::discriminant(self.peek()) == std::mem::discriminant(kind)
    }

    #[inline]
    pub(crate) fn is_eof(&self) -> bool {
        matches!(self.peek(), TokenKind::Eof)
    }

    /// Check for a contextual keyword.
    pub(crate) fn is_ident(&self, text: &str) -> bool {
        matches!(self.peek(), TokenKind::Identifier(name) if name == text)
    }

    /// Advance to the next token and return the previous one.
    pub(crate) fn next(&mut self) -> Result<Token> {
        let token = self
            .lexer
            .next_token()
            .map_err(|e| self.ctx.log.report(e))?;
        self.prev_end = self.current.span.end;
        self.token_count += 1;
        Ok(std::mem::replace(&mut self.current, token))
    }

    /// Consume a token if it matches, returning true if consumed.
    pub(crate) fn eat(&mut self, kind: &TokenKind) -> Result<bool> {
        if self.check(kind) {
            self.next()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Consume a contextual keyword if present.
    pub(crate) fn eat_ident(&mut self, text: &str) -> Result<bool> {
        if self.is_ident(text) {
            self.next()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Consume a token if it matches, otherwise fail.
    pub(crate) fn expect(&mut self, kind: &TokenKind) -> Result<Token> {
        if self.check(kind) {
            return self.next();
        }
        let expected = kind.fixed_text().unwrap_or("token");
        self.expected(&format!("\"{expected}\""))
    }

    /// Consume a semicolon (with ASI support).
    pub(crate) fn expect_semicolon(&mut self) -> Result<()> {
        if self.eat(&TokenKind::Semicolon)? {
            return Ok(());
        }
        if self.check(&TokenKind::RBrace) || self.is_eof() || self.current.had_newline_before {
            return Ok(());
        }
        self.expected("\";\"")
    }

    /// Consume a `>`, splitting `>>`, `>=` and friends so the rest is
    /// re-lexed as the next token.
    pub(crate) fn expect_greater_than(&mut self) -> Result<()> {
        match self.peek() {
            TokenKind::Gt => {
                self.next()?;
                Ok(())
            }
            TokenKind::GtGt
            | TokenKind::GtGtGt
            | TokenKind::GtEq
            | TokenKind::GtGtEq
            | TokenKind::GtGtGtEq => {
                self.split_current_token()?;
                Ok(())
            }
            _ => self.expected("\">\""),
        }
    }

    /// Consume a `<`, splitting `<<` and `<=`.
    pub(crate) fn expect_less_than(&mut self) -> Result<()> {
        match self.peek() {
            TokenKind::Lt => {
                self.next()?;
                Ok(())
            }
            TokenKind::LtLt | TokenKind::LtEq | TokenKind::LtLtEq => {
                self.split_current_token()?;
                Ok(())
            }
            _ => self.expected("\"<\""),
        }
    }

    /// Consume the first character of the current token and re-lex the rest.
    fn split_current_token(&mut self) -> Result<()> {
        let split = self.current.span.start + 1;
        self.lexer.reset_to(split as usize);
        let token = self
            .lexer
            .next_token()
            .map_err(|e| self.ctx.log.report(e))?;
        self.prev_end = split;
        self.token_count += 1;
        self.current = Token::new(token.kind, token.span, false);
        Ok(())
    }

    /// The next token after the current one.
    pub(crate) fn lookahead(&mut self) -> Result<Token> {
        self.lexer.peek().map_err(|e| self.ctx.log.report(e))
    }

    /// Source text of the current token, for diagnostics.
    pub(crate) fn current_text(&self) -> &'a str {
        self.current.span.text(self.source)
    }

    fn describe_current(&self) -> String {
        if self.is_eof() {
            "end of file".to_string()
        } else {
            format!("\"{}\"", self.current_text())
        }
    }

    /// Fail with `Expected X but found Y` at the current token.
    pub(crate) fn expected<T>(&mut self, what: &str) -> Result<T> {
        let message = format!("Expected {what} but found {}", self.describe_current());
        self.syntax_error(message, self.current.span)
    }

    /// Fail with `Unexpected X` at the current token.
    pub(crate) fn unexpected<T>(&mut self) -> Result<T> {
        let message = format!("Unexpected {}", self.describe_current());
        self.syntax_error(message, self.current.span)
    }

    pub(crate) fn syntax_error<T>(&mut self, message: impl Into<String>, span: Span) -> Result<T> {
        Err(self.ctx.log.report(ParseError::syntax(message, span)))
    }

    pub(crate) fn declaration_error<T>(
        &mut self,
        message: impl Into<String>,
        span: Span,
    ) -> Result<T> {
        Err(self.ctx.log.report(ParseError::declaration(message, span)))
    }

    /// Span from `start` to the end of the last consumed token.
    #[inline]
    pub(crate) fn span_from(&self, start: u32) -> Span {
        Span::new(start, self.prev_end.max(start))
    }

    /// Consume an identifier usable as a binding name.
    pub(crate) fn expect_identifier(&mut self) -> Result<(String, Span)> {
        match self.peek() {
            TokenKind::Identifier(name) => {
                let name = name.clone();
                let span = self.current.span;
                self.next()?;
                Ok((name, span))
            }
            _ => self.expected("identifier"),
        }
    }

    /// Consume an identifier or reserved word (property names).
    pub(crate) fn expect_identifier_or_keyword(&mut self) -> Result<(String, Span)> {
        match self.peek().identifier_or_keyword() {
            Some(name) => {
                let name = name.to_string();
                let span = self.current.span;
                self.next()?;
                Ok((name, span))
            }
            None => self.expected("identifier"),
        }
    }

    /// Consume a string literal.
    pub(crate) fn expect_string(&mut self) -> Result<String> {
        match self.peek() {
            TokenKind::String(value) => {
                let value = value.clone();
                self.next()?;
                Ok(value)
            }
            _ => self.expected("string"),
        }
    }

    // =========================================================================
    // Scopes and Symbols
    // =========================================================================

    pub(crate) fn push_scope(&mut self, kind: ScopeKind) -> ScopeId {
        let id = self.ctx.scopes.push(kind, self.current_scope);
        self.current_scope = id;
        id
    }

    pub(crate) fn pop_scope(&mut self) {
        if let Some(parent) = self.ctx.scopes.get(self.current_scope).parent {
            self.current_scope = parent;
        }
    }

    /// Pop a scope whose contents must not be visible anywhere.
    pub(crate) fn pop_and_discard_scope(&mut self, id: ScopeId) {
        self.pop_scope();
        self.ctx.scopes.discard(id);
    }

    /// Pop a scope that turned out to be unnecessary, merging it into its
    /// parent.
    pub(crate) fn pop_and_flatten_scope(&mut self, id: ScopeId) {
        self.pop_scope();
        self.ctx.scopes.flatten(id);
    }

    /// Allocate a compiler-generated symbol owned by the current scope.
    pub(crate) fn new_generated_symbol(&mut self, kind: SymbolKind, name: &str) -> Ref {
        let r = self.ctx.symbols.new_symbol(kind, name);
        self.ctx.scopes.get_mut(self.current_scope).generated.push(r);
        r
    }

    /// Declare a name in the current scope, applying the merge rules and
    /// hoisting `var` bindings.
    pub(crate) fn declare_symbol(
        &mut self,
        kind: SymbolKind,
        span: Span,
        name: &str,
    ) -> Result<Ref> {
        let r = self.ctx.symbols.new_symbol(kind, name);
        let scope = self.current_scope;
        let r = self.declare_in_scope(scope, kind, r, span, name)?;
        let scope_kind = self.ctx.scopes.get(scope).kind;
        if kind == SymbolKind::Hoisted
            && !scope_kind.stops_hoisting()
            && scope_kind != ScopeKind::FunctionArgs
        {
            self.hoist_symbol(scope, r, span, name)?;
        }
        Ok(r)
    }

    fn declare_in_scope(
        &mut self,
        scope: ScopeId,
        kind: SymbolKind,
        r: Ref,
        span: Span,
        name: &str,
    ) -> Result<Ref> {
        let mut r = r;
        let existing = self.ctx.scopes.get(scope).members.get(name).copied();
        if let Some(existing) = existing {
            let scope_kind = self.ctx.scopes.get(scope).kind;
            let existing_kind = self.ctx.symbols.get(existing.symbol).kind;
            match can_merge_symbols(scope_kind, existing_kind, kind, self.options.typescript) {
                MergeResult::Forbidden => {
                    return self.declaration_error(
                        format!("The symbol \"{name}\" has already been declared"),
                        span,
                    );
                }
                MergeResult::KeepExisting => r = existing.symbol,
                MergeResult::ReplaceWithNew => self.ctx.symbols.merge(existing.symbol, r),
                MergeResult::OverwriteWithNew => {}
            }
        }
        self.ctx
            .scopes
            .get_mut(scope)
            .members
            .insert(name.to_string(), ScopeMember { symbol: r, span });
        Ok(r)
    }

    /// Move a `var` declared in a nested block up to its function, namespace
    /// or module scope.
    fn hoist_symbol(&mut self, from: ScopeId, r: Ref, span: Span, name: &str) -> Result<()> {
        let target = self.ctx.scopes.hoist_target(from);
        let mut cur = self.ctx.scopes.get(from).parent;
        while let Some(id) = cur {
            let existing = self.ctx.scopes.get(id).members.get(name).copied();
            if let Some(existing) = existing {
                let existing_kind = self.ctx.symbols.get(existing.symbol).kind;
                if id == target {
                    if existing_kind.is_hoisted_or_function()
                        || existing_kind == SymbolKind::Arguments
                    {
                        self.ctx.symbols.merge(r, existing.symbol);
                        return Ok(());
                    }
                    if existing_kind != SymbolKind::Unbound {
                        return self.declaration_error(
                            format!("The symbol \"{name}\" has already been declared"),
                            span,
                        );
                    }
                } else if existing_kind != SymbolKind::CatchIdentifier
                    && !existing_kind.is_hoisted()
                {
                    // "let x; { var x }"
                    return self.declaration_error(
                        format!("The symbol \"{name}\" has already been declared"),
                        span,
                    );
                }
            }
            if id == target {
                break;
            }
            cur = self.ctx.scopes.get(id).parent;
        }
        self.ctx
            .scopes
            .get_mut(target)
            .members
            .insert(name.to_string(), ScopeMember { symbol: r, span });
        Ok(())
    }

    // =========================================================================
    // Statement Parsing
    // =========================================================================

    /// Parse statements up to (not including) the closing `}`.
    pub(crate) fn parse_stmts_until_rbrace(&mut self, opts: StmtOpts) -> Result<Vec<Stmt>> {
        let mut stmts = Vec::new();
        while !self.check(&TokenKind::RBrace) {
            if self.is_eof() {
                return self.expected("\"}\"");
            }
            stmts.push(self.parse_stmt(opts)?);
        }
        Ok(stmts)
    }

    /// Parse `{ ... }` in a fresh scope of the given kind.
    pub(crate) fn parse_block_body(&mut self, kind: ScopeKind) -> Result<FnBody> {
        self.expect(&TokenKind::LBrace)?;
        let scope = self.push_scope(kind);
        let stmts = self.parse_stmts_until_rbrace(StmtOpts::default())?;
        self.pop_scope();
        self.expect(&TokenKind::RBrace)?;
        Ok(FnBody { stmts, scope })
    }

    /// Parse a statement.
    pub(crate) fn parse_stmt(&mut self, opts: StmtOpts) -> Result<Stmt> {
        let start = self.current.span.start;
        let kind = match self.peek() {
            TokenKind::Semicolon => {
                self.next()?;
                StmtKind::Empty
            }
            TokenKind::LBrace => StmtKind::Block(self.parse_block_body(ScopeKind::Block)?),
            TokenKind::Var => {
                self.next()?;
                return self.parse_local_stmt(LocalKind::Var, start, opts);
            }
            TokenKind::Const => {
                if self.options.typescript && matches!(self.lookahead()?.kind, TokenKind::Enum) {
                    self.next()?;
                    return self.parse_enum_stmt(start, opts, true);
                }
                self.next()?;
                return self.parse_local_stmt(LocalKind::Const, start, opts);
            }
            TokenKind::Enum if self.options.typescript => {
                return self.parse_enum_stmt(start, opts, false);
            }
            TokenKind::Function => {
                self.next()?;
                return self.parse_function_stmt(start, false, opts);
            }
            TokenKind::Class => return self.parse_class_stmt(start, opts, Vec::new()),
            TokenKind::At => {
                let decorators = self.parse_decorators()?;
                return self.parse_decorated_stmt(start, opts, decorators);
            }
            TokenKind::If => self.parse_if_stmt()?,
            TokenKind::For => self.parse_for_stmt()?,
            TokenKind::While => {
                self.next()?;
                let test = self.parse_paren_expr()?;
                let body = Box::new(self.parse_stmt(StmtOpts::default())?);
                StmtKind::While { test, body }
            }
            TokenKind::Do => {
                self.next()?;
                let body = Box::new(self.parse_stmt(StmtOpts::default())?);
                self.expect(&TokenKind::While)?;
                let test = self.parse_paren_expr()?;
                // "do x; while (y) z" needs no semicolon after ")"
                self.eat(&TokenKind::Semicolon)?;
                StmtKind::DoWhile { body, test }
            }
            TokenKind::Return => {
                self.next()?;
                let value = if self.at_stmt_end() {
                    None
                } else {
                    Some(self.parse_expr(Level::Lowest)?)
                };
                self.expect_semicolon()?;
                StmtKind::Return(value)
            }
            TokenKind::Throw => {
                self.next()?;
                if self.current.had_newline_before {
                    let span = self.current.span;
                    return self.syntax_error("Unexpected newline after \"throw\"", span);
                }
                let value = self.parse_expr(Level::Lowest)?;
                self.expect_semicolon()?;
                StmtKind::Throw(value)
            }
            TokenKind::Break | TokenKind::Continue => {
                let is_break = matches!(self.peek(), TokenKind::Break);
                self.next()?;
                let label = match self.peek() {
                    TokenKind::Identifier(name) if !self.current.had_newline_before => {
                        let name = name.clone();
                        self.next()?;
                        Some(name)
                    }
                    _ => None,
                };
                self.expect_semicolon()?;
                if is_break {
                    StmtKind::Break(label)
                } else {
                    StmtKind::Continue(label)
                }
            }
            TokenKind::Try => self.parse_try_stmt()?,
            TokenKind::Switch => self.parse_switch_stmt()?,
            TokenKind::With => {
                self.next()?;
                let object = self.parse_paren_expr()?;
                let scope = self.push_scope(ScopeKind::With);
                let body = Box::new(self.parse_stmt(StmtOpts::default())?);
                self.pop_scope();
                StmtKind::With {
                    object,
                    body,
                    scope,
                }
            }
            TokenKind::Debugger => {
                self.next()?;
                self.expect_semicolon()?;
                StmtKind::Debugger
            }
            TokenKind::Import => {
                let next = self.lookahead()?;
                if matches!(next.kind, TokenKind::LParen | TokenKind::Dot) {
                    return self.parse_expr_or_label_stmt(start, opts);
                }
                return self.parse_import_stmt(start, opts);
            }
            TokenKind::Export => return self.parse_export_stmt(start, opts),
            TokenKind::Identifier(name) => {
                let name = name.clone();
                if let Some(stmt) = self.parse_contextual_stmt(&name, start, opts)? {
                    return Ok(stmt);
                }
                return self.parse_expr_or_label_stmt(start, opts);
            }
            _ => return self.parse_expr_or_label_stmt(start, opts),
        };
        Ok(Stmt::new(kind, self.span_from(start)))
    }

    /// Statements introduced by a contextual keyword. Returns `None` when the
    /// identifier is just the start of an expression.
    fn parse_contextual_stmt(
        &mut self,
        name: &str,
        start: u32,
        opts: StmtOpts,
    ) -> Result<Option<Stmt>> {
        match name {
            "let" => {
                let next = self.lookahead()?;
                if matches!(
                    next.kind,
                    TokenKind::Identifier(_) | TokenKind::LBracket | TokenKind::LBrace
                ) {
                    self.next()?;
                    return self.parse_local_stmt(LocalKind::Let, start, opts).map(Some);
                }
                Ok(None)
            }
            "async" => {
                let next = self.lookahead()?;
                if matches!(next.kind, TokenKind::Function) && !next.had_newline_before {
                    self.next()?;
                    self.next()?;
                    return self.parse_function_stmt(start, true, opts).map(Some);
                }
                Ok(None)
            }
            _ if self.options.typescript => self.parse_ts_contextual_stmt(name, start, opts),
            _ => Ok(None),
        }
    }

    fn parse_expr_or_label_stmt(&mut self, start: u32, opts: StmtOpts) -> Result<Stmt> {
        let expr = self.parse_expr(Level::Lowest)?;
        if let ExprKind::Ident(ident) = &expr.kind {
            if self.check(&TokenKind::Colon) && expr.span.len() as usize == ident.name.len() {
                let label = ident.name.clone();
                self.next()?;
                let body = Box::new(self.parse_stmt(StmtOpts {
                    is_export: false,
                    ..opts
                })?);
                return Ok(Stmt::new(
                    StmtKind::Labeled { label, body },
                    self.span_from(start),
                ));
            }
        }
        self.expect_semicolon()?;
        Ok(Stmt::new(StmtKind::Expr(expr), self.span_from(start)))
    }

    fn at_stmt_end(&self) -> bool {
        matches!(
            self.peek(),
            TokenKind::Semicolon | TokenKind::RBrace | TokenKind::Eof
        ) || self.current.had_newline_before
    }

    /// `(expr)` as used by `if`, `while` and friends.
    pub(crate) fn parse_paren_expr(&mut self) -> Result<Expr> {
        self.expect(&TokenKind::LParen)?;
        let expr = self.parse_expr(Level::Lowest)?;
        self.expect(&TokenKind::RParen)?;
        Ok(expr)
    }

    fn parse_if_stmt(&mut self) -> Result<StmtKind> {
        self.next()?;
        let test = self.parse_paren_expr()?;
        let consequent = Box::new(self.parse_stmt(StmtOpts::default())?);
        let alternate = if self.eat(&TokenKind::Else)? {
            Some(Box::new(self.parse_stmt(StmtOpts::default())?))
        } else {
            None
        };
        Ok(StmtKind::If {
            test,
            consequent,
            alternate,
        })
    }

    fn parse_for_stmt(&mut self) -> Result<StmtKind> {
        self.next()?;
        let is_await = if self.is_ident("await") {
            self.next()?;
            true
        } else {
            false
        };
        self.expect(&TokenKind::LParen)?;
        let scope = self.push_scope(ScopeKind::Block);

        let old_allow_in = self.allow_in;
        self.allow_in = false;
        let init_start = self.current.span.start;
        let is_let_decl = self.is_ident("let")
            && matches!(
                self.lookahead()?.kind,
                TokenKind::Identifier(_) | TokenKind::LBracket | TokenKind::LBrace
            );
        let init = match self.peek() {
            TokenKind::Semicolon => None,
            TokenKind::Var => {
                self.next()?;
                Some(self.parse_for_init_local(LocalKind::Var, init_start)?)
            }
            TokenKind::Const => {
                self.next()?;
                Some(self.parse_for_init_local(LocalKind::Const, init_start)?)
            }
            _ if is_let_decl => {
                self.next()?;
                Some(self.parse_for_init_local(LocalKind::Let, init_start)?)
            }
            _ => {
                let expr = self.parse_expr(Level::Lowest)?;
                Some(Stmt::expr(expr))
            }
        };
        self.allow_in = old_allow_in;

        let is_of = self.is_ident("of");
        let is_in = self.check(&TokenKind::In);
        let kind = match init {
            Some(left) if is_of || is_in => {
                self.next()?;
                let right = if is_of {
                    self.parse_expr(Level::Comma)?
                } else {
                    self.parse_expr(Level::Lowest)?
                };
                self.expect(&TokenKind::RParen)?;
                let body = Box::new(self.parse_stmt(StmtOpts::default())?);
                if is_of {
                    StmtKind::ForOf {
                        left: Box::new(left),
                        right,
                        body,
                        is_await,
                        scope,
                    }
                } else {
                    StmtKind::ForIn {
                        left: Box::new(left),
                        right,
                        body,
                        scope,
                    }
                }
            }
            init => {
                if is_await {
                    return self.expected("\"of\"");
                }
                self.expect(&TokenKind::Semicolon)?;
                let test = if self.check(&TokenKind::Semicolon) {
                    None
                } else {
                    Some(self.parse_expr(Level::Lowest)?)
                };
                self.expect(&TokenKind::Semicolon)?;
                let update = if self.check(&TokenKind::RParen) {
                    None
                } else {
                    Some(self.parse_expr(Level::Lowest)?)
                };
                self.expect(&TokenKind::RParen)?;
                let body = Box::new(self.parse_stmt(StmtOpts::default())?);
                StmtKind::For {
                    init: init.map(Box::new),
                    test,
                    update,
                    body,
                    scope,
                }
            }
        };
        self.pop_scope();
        Ok(kind)
    }

    fn parse_for_init_local(&mut self, kind: LocalKind, start: u32) -> Result<Stmt> {
        let local = self.parse_local_decls(kind, StmtOpts::default())?;
        Ok(Stmt::new(StmtKind::Local(local), self.span_from(start)))
    }

    fn parse_try_stmt(&mut self) -> Result<StmtKind> {
        self.next()?;
        let block = self.parse_block_body(ScopeKind::Block)?;
        let handler = if self.eat(&TokenKind::Catch)? {
            let scope = self.push_scope(ScopeKind::Catch);
            let param = if self.eat(&TokenKind::LParen)? {
                let binding = self.parse_binding(Some(SymbolKind::CatchIdentifier))?;
                if self.options.typescript && self.eat(&TokenKind::Colon)? {
                    self.skip_type(Level::Lowest)?;
                }
                self.expect(&TokenKind::RParen)?;
                Some(binding)
            } else {
                None
            };
            self.expect(&TokenKind::LBrace)?;
            let stmts = self.parse_stmts_until_rbrace(StmtOpts::default())?;
            self.expect(&TokenKind::RBrace)?;
            self.pop_scope();
            Some(CatchClause {
                param,
                body: FnBody { stmts, scope },
            })
        } else {
            None
        };
        let finalizer = if self.eat(&TokenKind::Finally)? {
            Some(self.parse_block_body(ScopeKind::Block)?)
        } else {
            None
        };
        if handler.is_none() && finalizer.is_none() {
            return self.expected("\"finally\"");
        }
        Ok(StmtKind::Try {
            block,
            handler,
            finalizer,
        })
    }

    fn parse_switch_stmt(&mut self) -> Result<StmtKind> {
        self.next()?;
        let discriminant = self.parse_paren_expr()?;
        self.expect(&TokenKind::LBrace)?;
        let scope = self.push_scope(ScopeKind::Block);
        let mut cases = Vec::new();
        let mut seen_default = false;
        while !self.check(&TokenKind::RBrace) {
            let test = if self.eat(&TokenKind::Default)? {
                if seen_default {
                    let span = self.current.span;
                    return self.syntax_error("Multiple default clauses are not allowed", span);
                }
                seen_default = true;
                None
            } else {
                self.expect(&TokenKind::Case)?;
                Some(self.parse_expr(Level::Lowest)?)
            };
            self.expect(&TokenKind::Colon)?;
            let mut body = Vec::new();
            while !matches!(
                self.peek(),
                TokenKind::Case | TokenKind::Default | TokenKind::RBrace | TokenKind::Eof
            ) {
                body.push(self.parse_stmt(StmtOpts::default())?);
            }
            if self.is_eof() {
                return self.expected("\"}\"");
            }
            cases.push(SwitchCase { test, body });
        }
        self.pop_scope();
        self.expect(&TokenKind::RBrace)?;
        Ok(StmtKind::Switch {
            discriminant,
            cases,
            scope,
        })
    }

    // =========================================================================
    // Variable Declarations
    // =========================================================================

    fn parse_local_stmt(&mut self, kind: LocalKind, start: u32, opts: StmtOpts) -> Result<Stmt> {
        let local = self.parse_local_decls(kind, opts)?;
        self.expect_semicolon()?;
        if opts.is_declare && !(opts.is_namespace_scope && opts.is_export) {
            return Ok(Stmt::new(StmtKind::TypeScript, self.span_from(start)));
        }
        Ok(Stmt::new(StmtKind::Local(local), self.span_from(start)))
    }

    /// Parse the declarators after `var`/`let`/`const`.
    pub(crate) fn parse_local_decls(&mut self, kind: LocalKind, opts: StmtOpts) -> Result<Local> {
        let symbol_kind = match kind {
            LocalKind::Var => SymbolKind::Hoisted,
            LocalKind::Let => SymbolKind::BlockScoped,
            LocalKind::Const => SymbolKind::Const,
        };
        // "export declare var x" inside a namespace still exports a name
        let declare_kind = if opts.is_declare && !(opts.is_namespace_scope && opts.is_export) {
            None
        } else {
            Some(symbol_kind)
        };
        let mut decls = Vec::new();
        loop {
            let binding = self.parse_binding(declare_kind)?;
            if self.options.typescript {
                // "let x!: number"
                if matches!(binding.kind, BindingKind::Ident(_))
                    && self.check(&TokenKind::Bang)
                    && !self.current.had_newline_before
                {
                    self.next()?;
                }
                if self.eat(&TokenKind::Colon)? {
                    self.skip_type(Level::Lowest)?;
                }
            }
            let value = if self.eat(&TokenKind::Eq)? {
                Some(self.parse_expr(Level::Comma)?)
            } else {
                None
            };
            if opts.is_declare && opts.is_namespace_scope && opts.is_export {
                decls.push(Decl {
                    binding,
                    value: None,
                });
            } else {
                decls.push(Decl { binding, value });
            }
            if !self.eat(&TokenKind::Comma)? {
                break;
            }
        }
        Ok(Local {
            kind,
            decls,
            is_export: opts.is_export,
            was_import_equals: false,
        })
    }

    // =========================================================================
    // Bindings
    // =========================================================================

    /// Parse a binding pattern, declaring every name with `kind`. With
    /// `None` the names get fresh symbols that live in no scope.
    pub(crate) fn parse_binding(&mut self, kind: Option<SymbolKind>) -> Result<Binding> {
        let start = self.current.span.start;
        let binding_kind = match self.peek() {
            TokenKind::Identifier(_) => {
                let (name, span) = self.expect_identifier()?;
                BindingKind::Ident(self.declare_binding_name(kind, span, &name)?)
            }
            TokenKind::LBracket => {
                self.next()?;
                let mut items = Vec::new();
                let mut has_spread = false;
                while !self.check(&TokenKind::RBracket) {
                    if self.check(&TokenKind::Comma) {
                        let span = self.current.span;
                        self.next()?;
                        items.push(ArrayBindingItem {
                            binding: Binding {
                                kind: BindingKind::Missing,
                                span: Span::empty(span.start),
                            },
                            default: None,
                        });
                        continue;
                    }
                    if self.eat(&TokenKind::DotDotDot)? {
                        has_spread = true;
                    }
                    let binding = self.parse_binding(kind)?;
                    let default = if !has_spread && self.eat(&TokenKind::Eq)? {
                        Some(self.parse_expr(Level::Comma)?)
                    } else {
                        None
                    };
                    items.push(ArrayBindingItem { binding, default });
                    if has_spread || !self.eat(&TokenKind::Comma)? {
                        break;
                    }
                }
                self.expect(&TokenKind::RBracket)?;
                BindingKind::Array { items, has_spread }
            }
            TokenKind::LBrace => {
                self.next()?;
                let mut props = Vec::new();
                while !self.check(&TokenKind::RBrace) {
                    props.push(self.parse_property_binding(kind)?);
                    if !self.eat(&TokenKind::Comma)? {
                        break;
                    }
                }
                self.expect(&TokenKind::RBrace)?;
                BindingKind::Object { props }
            }
            _ => return self.expected("identifier"),
        };
        Ok(Binding {
            kind: binding_kind,
            span: self.span_from(start),
        })
    }

    fn parse_property_binding(&mut self, kind: Option<SymbolKind>) -> Result<PropertyBinding> {
        if self.eat(&TokenKind::DotDotDot)? {
            let (name, span) = self.expect_identifier()?;
            let r = self.declare_binding_name(kind, span, &name)?;
            return Ok(PropertyBinding {
                key: PropertyKey::Name(name),
                value: Binding {
                    kind: BindingKind::Ident(r),
                    span,
                },
                default: None,
                is_spread: true,
                is_shorthand: false,
            });
        }

        // "{ x }" and "{ x = 1 }"
        if let TokenKind::Identifier(name) = self.peek() {
            let name = name.clone();
            let next = self.lookahead()?;
            if !matches!(next.kind, TokenKind::Colon | TokenKind::LParen) {
                let span = self.current.span;
                self.next()?;
                let r = self.declare_binding_name(kind, span, &name)?;
                let default = if self.eat(&TokenKind::Eq)? {
                    Some(self.parse_expr(Level::Comma)?)
                } else {
                    None
                };
                return Ok(PropertyBinding {
                    key: PropertyKey::Name(name),
                    value: Binding {
                        kind: BindingKind::Ident(r),
                        span,
                    },
                    default,
                    is_spread: false,
                    is_shorthand: true,
                });
            }
        }

        let key = self.parse_property_key()?;
        self.expect(&TokenKind::Colon)?;
        let value = self.parse_binding(kind)?;
        let default = if self.eat(&TokenKind::Eq)? {
            Some(self.parse_expr(Level::Comma)?)
        } else {
            None
        };
        Ok(PropertyBinding {
            key,
            value,
            default,
            is_spread: false,
            is_shorthand: false,
        })
    }

    fn declare_binding_name(
        &mut self,
        kind: Option<SymbolKind>,
        span: Span,
        name: &str,
    ) -> Result<Ref> {
        match kind {
            Some(kind) => self.declare_symbol(kind, span, name),
            None => Ok(self.ctx.symbols.new_symbol(SymbolKind::Other, name)),
        }
    }

    /// Property name in objects, classes and destructuring.
    pub(crate) fn parse_property_key(&mut self) -> Result<PropertyKey> {
        let key = match self.peek() {
            TokenKind::String(value) => PropertyKey::String(value.clone()),
            TokenKind::Number(value) => PropertyKey::Number(*value),
            TokenKind::BigInt(value) => PropertyKey::BigInt(value.clone()),
            TokenKind::PrivateName(name) => PropertyKey::Private(name.clone()),
            TokenKind::LBracket => {
                self.next()?;
                let old_allow_in = std::mem::replace(&mut self.allow_in, true);
                let expr = self.parse_expr(Level::Comma)?;
                self.allow_in = old_allow_in;
                self.expect(&TokenKind::RBracket)?;
                return Ok(PropertyKey::Computed(Box::new(expr)));
            }
            kind => match kind.identifier_or_keyword() {
                Some(name) => PropertyKey::Name(name.to_string()),
                None => return self.expected("property name"),
            },
        };
        self.next()?;
        Ok(key)
    }

    // =========================================================================
    // Modules
    // =========================================================================

    fn parse_import_stmt(&mut self, start: u32, opts: StmtOpts) -> Result<Stmt> {
        let import_span = self.current.span;
        self.next()?;
        let ts = self.options.typescript;

        // "import type ..." is erased entirely
        if ts && self.is_ident("type") {
            let next = self.lookahead()?;
            let is_type_only = match &next.kind {
                TokenKind::LBrace | TokenKind::Star => true,
                TokenKind::Identifier(name) if name == "from" => self.lookahead_is_from_from()?,
                TokenKind::Identifier(_) => true,
                _ => false,
            };
            if is_type_only {
                self.next()?;
                if let TokenKind::Identifier(_) = self.peek() {
                    if matches!(self.lookahead()?.kind, TokenKind::Eq) {
                        // "import type x = require('y')"
                        self.next()?;
                        self.next()?;
                        self.parse_import_equals_value()?;
                        self.expect_semicolon()?;
                        return Ok(Stmt::new(StmtKind::TypeScript, self.span_from(start)));
                    }
                }
                self.skip_import_clause()?;
                self.expect_ident_text("from")?;
                self.expect_string()?;
                self.skip_import_attributes()?;
                self.expect_semicolon()?;
                return Ok(Stmt::new(StmtKind::TypeScript, self.span_from(start)));
            }
        }

        // "import x = ..."
        if ts {
            if let TokenKind::Identifier(_) = self.peek() {
                if matches!(self.lookahead()?.kind, TokenKind::Eq) {
                    return self.parse_import_equals_stmt(start, opts);
                }
            }
        }

        if !opts.is_module_scope {
            return self.syntax_error("Unexpected \"import\"", import_span);
        }

        let mut import = Import {
            default: None,
            namespace: None,
            items: None,
            source: String::new(),
        };

        if let TokenKind::String(source) = self.peek() {
            import.source = source.clone();
            self.next()?;
            self.skip_import_attributes()?;
            self.expect_semicolon()?;
            return Ok(Stmt::new(StmtKind::Import(import), self.span_from(start)));
        }

        if let TokenKind::Identifier(_) = self.peek() {
            let (name, span) = self.expect_identifier()?;
            let symbol = self.declare_symbol(SymbolKind::Import, span, &name)?;
            import.default = Some(LocRef { span, symbol });
            if !self.eat(&TokenKind::Comma)? {
                return self.finish_import(import, start);
            }
        }

        match self.peek() {
            TokenKind::Star => {
                self.next()?;
                self.expect_ident_text("as")?;
                let (name, span) = self.expect_identifier()?;
                let symbol = self.declare_symbol(SymbolKind::Import, span, &name)?;
                import.namespace = Some(LocRef { span, symbol });
            }
            TokenKind::LBrace => {
                self.next()?;
                let mut items = Vec::new();
                while !self.check(&TokenKind::RBrace) {
                    if let Some(item) = self.parse_import_item()? {
                        items.push(item);
                    }
                    if !self.eat(&TokenKind::Comma)? {
                        break;
                    }
                }
                self.expect(&TokenKind::RBrace)?;
                import.items = Some(items);
            }
            _ => return self.expected("\"{\""),
        }
        self.finish_import(import, start)
    }

    fn finish_import(&mut self, mut import: Import, start: u32) -> Result<Stmt> {
        self.expect_ident_text("from")?;
        import.source = self.expect_string()?;
        self.skip_import_attributes()?;
        self.expect_semicolon()?;
        Ok(Stmt::new(StmtKind::Import(import), self.span_from(start)))
    }

    /// One `{ ... }` import specifier. Inline `type` specifiers yield `None`.
    fn parse_import_item(&mut self) -> Result<Option<ImportItem>> {
        let mut is_type = false;
        if self.options.typescript && self.is_ident("type") {
            let next = self.lookahead()?;
            // "{ type }", "{ type as x }" and "{ type, ... }" import a value named "type"
            let names_type_itself = matches!(next.kind, TokenKind::Comma | TokenKind::RBrace)
                || (matches!(&next.kind, TokenKind::Identifier(n) if n == "as"));
            if !names_type_itself {
                self.next()?;
                is_type = true;
            }
        }

        let (imported, imported_span, is_string) = match self.peek() {
            TokenKind::String(value) => {
                let value = value.clone();
                let span = self.current.span;
                self.next()?;
                (value, span, true)
            }
            _ => {
                let (name, span) = self.expect_identifier_or_keyword()?;
                (name, span, false)
            }
        };

        let (local, span) = if self.eat_ident("as")? {
            self.expect_identifier()?
        } else {
            if is_string || crate::token::keyword_from_str(&imported).is_some() {
                return self.expected("\"as\"");
            }
            (imported.clone(), imported_span)
        };

        if is_type {
            return Ok(None);
        }
        let symbol = self.declare_symbol(SymbolKind::Import, span, &local)?;
        Ok(Some(ImportItem {
            imported,
            local: LocRef { span, symbol },
        }))
    }

    /// `import type from from "m"` imports a default binding named `from`.
    fn lookahead_is_from_from(&mut self) -> Result<bool> {
        let mut lexer = self.lexer.clone();
        let first = lexer.next_token().map_err(|e| self.ctx.log.report(e))?;
        let second = lexer.next_token().map_err(|e| self.ctx.log.report(e))?;
        Ok(matches!(first.kind, TokenKind::Identifier(ref n) if n == "from")
            && matches!(second.kind, TokenKind::Identifier(ref n) if n == "from"))
    }

    /// Skip the bindings of an erased `import type` clause.
    fn skip_import_clause(&mut self) -> Result<()> {
        if let TokenKind::Identifier(name) = self.peek() {
            let is_from = name == "from";
            let is_default_binding = !is_from
                || matches!(&self.lookahead()?.kind, TokenKind::Identifier(n) if n == "from");
            if is_default_binding {
                self.next()?;
                if !self.eat(&TokenKind::Comma)? {
                    return Ok(());
                }
            }
        }
        if self.eat(&TokenKind::Star)? {
            self.expect_ident_text("as")?;
            self.expect_identifier()?;
        } else if self.eat(&TokenKind::LBrace)? {
            while !self.check(&TokenKind::RBrace) {
                if self.is_eof() {
                    return self.expected("\"}\"");
                }
                self.next()?;
            }
            self.next()?;
        }
        Ok(())
    }

    /// Skip `with { type: "json" }` / `assert { ... }` after a module specifier.
    fn skip_import_attributes(&mut self) -> Result<()> {
        let is_attributes = matches!(self.peek(), TokenKind::With) || self.is_ident("assert");
        if !is_attributes || self.current.had_newline_before {
            return Ok(());
        }
        self.next()?;
        self.expect(&TokenKind::LBrace)?;
        while !self.check(&TokenKind::RBrace) {
            if self.is_eof() {
                return self.expected("\"}\"");
            }
            self.next()?;
        }
        self.next()?;
        Ok(())
    }

    pub(crate) fn expect_ident_text(&mut self, text: &str) -> Result<()> {
        if self.eat_ident(text)? {
            Ok(())
        } else {
            self.expected(&format!("\"{text}\""))
        }
    }

    fn parse_export_stmt(&mut self, start: u32, opts: StmtOpts) -> Result<Stmt> {
        let export_span = self.current.span;
        self.next()?;
        let ts = self.options.typescript;
        let export_opts = StmtOpts {
            is_export: true,
            ..opts
        };

        if !opts.is_module_scope && !(opts.is_namespace_scope && ts) {
            return self.syntax_error("Unexpected \"export\"", export_span);
        }

        match self.peek() {
            TokenKind::Var | TokenKind::Const | TokenKind::Function | TokenKind::Class
            | TokenKind::Enum | TokenKind::At => self.parse_stmt(export_opts),
            TokenKind::Import if ts => {
                // "export import x = a.b"
                self.next()?;
                self.parse_import_equals_stmt(start, export_opts)
            }
            TokenKind::Eq if ts => {
                // "export = value"
                self.next()?;
                let value = self.parse_expr(Level::Lowest)?;
                self.expect_semicolon()?;
                Ok(Stmt::new(StmtKind::ExportEquals(value), self.span_from(start)))
            }
            TokenKind::Default if opts.is_module_scope => self.parse_export_default(start),
            TokenKind::Star if opts.is_module_scope => {
                self.next()?;
                let alias = if self.eat_ident("as")? {
                    Some(self.parse_module_export_name()?)
                } else {
                    None
                };
                self.expect_ident_text("from")?;
                let source = self.expect_string()?;
                self.skip_import_attributes()?;
                self.expect_semicolon()?;
                Ok(Stmt::new(
                    StmtKind::ExportStar { alias, source },
                    self.span_from(start),
                ))
            }
            TokenKind::LBrace if opts.is_module_scope => {
                let (items, source) = self.parse_export_clause()?;
                self.expect_semicolon()?;
                Ok(Stmt::new(
                    StmtKind::ExportClause { items, source },
                    self.span_from(start),
                ))
            }
            TokenKind::Identifier(name) => {
                let name = name.clone();
                match name.as_str() {
                    "let" | "async" => self.parse_stmt(export_opts),
                    "as" if ts => {
                        // "export as namespace Foo;"
                        self.next()?;
                        self.expect_ident_text("namespace")?;
                        self.expect_identifier()?;
                        self.expect_semicolon()?;
                        Ok(Stmt::new(StmtKind::TypeScript, self.span_from(start)))
                    }
                    "type" if ts => {
                        let next = self.lookahead()?;
                        if matches!(next.kind, TokenKind::LBrace | TokenKind::Star) {
                            // "export type { T } from 'm'" / "export type * from 'm'"
                            self.next()?;
                            if self.eat(&TokenKind::Star)? {
                                if self.eat_ident("as")? {
                                    self.parse_module_export_name()?;
                                }
                                self.expect_ident_text("from")?;
                                self.expect_string()?;
                            } else {
                                self.parse_export_clause()?;
                            }
                            self.expect_semicolon()?;
                            return Ok(Stmt::new(StmtKind::TypeScript, self.span_from(start)));
                        }
                        self.parse_stmt(export_opts)
                    }
                    _ if ts => match self.parse_ts_contextual_stmt(&name, start, export_opts)? {
                        Some(stmt) => Ok(stmt),
                        None => self.unexpected(),
                    },
                    _ => self.unexpected(),
                }
            }
            _ => self.unexpected(),
        }
    }

    fn parse_export_default(&mut self, start: u32) -> Result<Stmt> {
        self.next()?;
        let decl_start = self.current.span.start;
        let opts = StmtOpts {
            is_module_scope: true,
            ..Default::default()
        };

        let is_async_fn = self.is_ident("async") && {
            let next = self.lookahead()?;
            matches!(next.kind, TokenKind::Function) && !next.had_newline_before
        };
        if is_async_fn || self.check(&TokenKind::Function) {
            if is_async_fn {
                self.next()?;
            }
            self.next()?;
            let func = self.parse_function_decl_for_default(decl_start, is_async_fn)?;
            return Ok(match func {
                Some(func) => Stmt::new(
                    StmtKind::ExportDefault(ExportDefault::Function(func)),
                    self.span_from(start),
                ),
                None => Stmt::new(StmtKind::TypeScript, self.span_from(start)),
            });
        }

        let decorators = if self.check(&TokenKind::At) {
            self.parse_decorators()?
        } else {
            Vec::new()
        };
        let is_abstract = self.options.typescript && self.is_ident("abstract") && {
            let next = self.lookahead()?;
            matches!(next.kind, TokenKind::Class) && !next.had_newline_before
        };
        if is_abstract {
            self.next()?;
        }
        if self.check(&TokenKind::Class) {
            let class = self.parse_class(decl_start, decorators, ClassContext::DefaultExport)?;
            return Ok(Stmt::new(
                StmtKind::ExportDefault(ExportDefault::Class(class)),
                self.span_from(start),
            ));
        }
        if !decorators.is_empty() {
            return self.expected("\"class\"");
        }

        if self.options.typescript && self.is_ident("interface") {
            if let Some(stmt) = self.parse_ts_contextual_stmt("interface", decl_start, opts)? {
                return Ok(Stmt::new(stmt.kind, self.span_from(start)));
            }
        }

        let value = self.parse_expr(Level::Comma)?;
        self.expect_semicolon()?;
        Ok(Stmt::new(
            StmtKind::ExportDefault(ExportDefault::Expr(value)),
            self.span_from(start),
        ))
    }

    /// `{ a, b as c, type T }` with an optional `from "m"`.
    fn parse_export_clause(&mut self) -> Result<(Vec<ExportItem>, Option<String>)> {
        self.expect(&TokenKind::LBrace)?;
        let mut items = Vec::new();
        while !self.check(&TokenKind::RBrace) {
            let item_start = self.current.span.start;
            let mut is_type = false;
            if self.options.typescript && self.is_ident("type") {
                let next = self.lookahead()?;
                let names_type_itself = matches!(next.kind, TokenKind::Comma | TokenKind::RBrace)
                    || matches!(&next.kind, TokenKind::Identifier(n) if n == "as");
                if !names_type_itself {
                    self.next()?;
                    is_type = true;
                }
            }
            let local = self.parse_module_export_name()?;
            let exported = if self.eat_ident("as")? {
                self.parse_module_export_name()?
            } else {
                local.clone()
            };
            if !is_type {
                items.push(ExportItem {
                    local: Ident {
                        name: local,
                        symbol: None,
                    },
                    exported,
                    span: self.span_from(item_start),
                });
            }
            if !self.eat(&TokenKind::Comma)? {
                break;
            }
        }
        self.expect(&TokenKind::RBrace)?;
        let source = if self.eat_ident("from")? {
            let source = self.expect_string()?;
            self.skip_import_attributes()?;
            Some(source)
        } else {
            None
        };
        Ok((items, source))
    }

    fn parse_module_export_name(&mut self) -> Result<String> {
        if let TokenKind::String(value) = self.peek() {
            let value = value.clone();
            self.next()?;
            return Ok(value);
        }
        Ok(self.expect_identifier_or_keyword()?.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn parse(source: &str) -> Result<(Vec<Stmt>, ParseContext)> {
        let mut parser = Parser::new(source, ParserOptions::default())?;
        let stmts = parser.parse_program()?;
        Ok((stmts, parser.into_context()))
    }

    #[test]
    fn test_variable_declaration() {
        let (stmts, _) = parse("let x = 1, y;").unwrap();
        assert_eq!(stmts.len(), 1);
        let StmtKind::Local(local) = &stmts[0].kind else {
            panic!("expected local");
        };
        assert_eq!(local.kind, LocalKind::Let);
        assert_eq!(local.decls.len(), 2);
    }

    #[test]
    fn test_asi() {
        let (stmts, _) = parse("a\nb\n++c").unwrap();
        assert_eq!(stmts.len(), 3);
    }

    #[test]
    fn test_missing_semicolon() {
        let err = parse("a b").unwrap_err();
        assert_eq!(err.message, "Expected \";\" but found \"b\"");
        assert_eq!(err.kind, ErrorKind::Syntax);
    }

    #[test]
    fn test_duplicate_let_is_declaration_error() {
        let err = parse("let a; let a;").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Declaration);
        assert_eq!(err.message, "The symbol \"a\" has already been declared");
    }

    #[test]
    fn test_var_hoists_to_function_scope() {
        let (stmts, ctx) = parse("function f() { { var x; } }").unwrap();
        let module = ctx.scopes.get(ScopeTree::MODULE);
        assert!(module.members.contains_key("f"));
        assert!(!module.members.contains_key("x"));
        let StmtKind::Function { func, .. } = &stmts[0].kind else {
            panic!("expected function");
        };
        assert!(ctx.scopes.get(func.body.scope).members.contains_key("x"));
    }

    #[test]
    fn test_var_conflicts_with_outer_let() {
        let err = parse("let x; { var x; }").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Declaration);
    }

    #[test]
    fn test_catch_param_allows_var() {
        assert!(parse("try {} catch (e) { var e; }").is_ok());
    }

    #[test]
    fn test_labels() {
        let (stmts, _) = parse("outer: for (;;) { break outer; }").unwrap();
        assert!(matches!(stmts[0].kind, StmtKind::Labeled { .. }));
    }

    #[test]
    fn test_for_variants() {
        let (stmts, _) = parse("for (const x of y) {} for (k in o); for (let i = 0; i < 3; i++) {}")
            .unwrap();
        assert!(matches!(stmts[0].kind, StmtKind::ForOf { .. }));
        assert!(matches!(stmts[1].kind, StmtKind::ForIn { .. }));
        assert!(matches!(stmts[2].kind, StmtKind::For { .. }));
    }

    #[test]
    fn test_import_declares_symbols() {
        let (stmts, ctx) = parse("import a, { b as c, type T } from 'm';").unwrap();
        let StmtKind::Import(import) = &stmts[0].kind else {
            panic!("expected import");
        };
        assert!(import.default.is_some());
        assert_eq!(import.items.as_ref().map(Vec::len), Some(1));
        let module = ctx.scopes.get(ScopeTree::MODULE);
        assert!(module.members.contains_key("c"));
        assert!(!module.members.contains_key("T"));
    }

    #[test]
    fn test_import_type_is_erased() {
        let (stmts, _) = parse("import type { A } from 'm'; import type B from 'n';").unwrap();
        assert!(stmts.iter().all(|s| matches!(s.kind, StmtKind::TypeScript)));
    }

    #[test]
    fn test_export_forms() {
        let (stmts, _) = parse(
            "export * from 'a'; export * as ns from 'b'; export { x as y } from 'c'; \
             export default 1; export type { T } from 'd';",
        )
        .unwrap();
        assert!(matches!(stmts[0].kind, StmtKind::ExportStar { alias: None, .. }));
        assert!(matches!(stmts[1].kind, StmtKind::ExportStar { alias: Some(_), .. }));
        assert!(matches!(stmts[2].kind, StmtKind::ExportClause { source: Some(_), .. }));
        assert!(matches!(stmts[3].kind, StmtKind::ExportDefault(ExportDefault::Expr(_))));
        assert!(matches!(stmts[4].kind, StmtKind::TypeScript));
    }

    #[test]
    fn test_expect_greater_than_splits_token() {
        let mut parser = Parser::new(">>= 1", ParserOptions::default()).unwrap();
        parser.expect_greater_than().unwrap();
        assert_eq!(parser.peek(), &TokenKind::GtEq);
        parser.expect_greater_than().unwrap();
        assert_eq!(parser.peek(), &TokenKind::Eq);
    }
}
