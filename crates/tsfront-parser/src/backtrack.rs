//! Speculative parsing for ambiguous TypeScript prefixes.
//!
//! Some constructs cannot be classified from a bounded lookahead: `a < b`
//! versus `a<T>()`, `(x: T) => y` versus `(x)`, a function type head versus
//! a parenthesized type. For those the parser saves a `Checkpoint`, runs a
//! skip-only candidate with error reporting suppressed, and either commits
//! to the advanced position or rewinds exactly to the checkpoint.
//!
//! Most candidates only skip types, so a rejected attempt leaves no symbols
//! or scopes behind. The one candidate that parses a whole arrow function
//! also saves a `DeclCheckpoint` and rolls the declarations back.

use crate::ast::{Expr, Level};
use crate::error::Result;
use crate::lexer::Lexer;
use crate::parser::{FnFlags, Parser};
use crate::span::Span;
use crate::symbols::{ScopeId, ScopeMember};
use crate::token::{Token, TokenKind};
use crate::ts_types::{TypeOpts, TypeParams};
use rustc_hash::FxHashMap;
use tracing::trace;

/// Everything needed to put the token cursor back where it was.
#[derive(Clone)]
pub(crate) struct Checkpoint<'a> {
    lexer: Lexer<'a>,
    current: Token,
    prev_end: u32,
    token_count: usize,
    log_suppressed: bool,
}

/// Declarations and parser flags a speculative arrow may change. Scopes
/// and symbols created after the checkpoint are dropped on restore.
struct DeclCheckpoint {
    symbols: usize,
    scopes: usize,
    current_scope: ScopeId,
    members: FxHashMap<String, ScopeMember>,
    generated: usize,
    allow_in: bool,
    fn_flags: FnFlags,
    in_decorator: bool,
    latest_arrow_arg: Option<Span>,
    optional_arrow_arg: Option<Span>,
    enum_self_ref: Option<(String, bool)>,
    after_arrow_body: Option<u32>,
    conditional_consequent: Option<u32>,
}

/// Outcome of a speculative parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Attempt<T> {
    /// The candidate and validator succeeded; the cursor stays advanced.
    Committed(T),
    /// The cursor was rewound to the checkpoint.
    Rejected,
}

impl<T> Attempt<T> {
    pub(crate) fn is_committed(&self) -> bool {
        matches!(self, Self::Committed(_))
    }
}

impl<'a> Parser<'a> {
    pub(crate) fn checkpoint(&self) -> Checkpoint<'a> {
        Checkpoint {
            lexer: self.lexer.clone(),
            current: self.current.clone(),
            prev_end: self.prev_end,
            token_count: self.token_count,
            log_suppressed: self.ctx.log.is_suppressed(),
        }
    }

    pub(crate) fn restore(&mut self, checkpoint: Checkpoint<'a>) {
        self.lexer = checkpoint.lexer;
        self.current = checkpoint.current;
        self.prev_end = checkpoint.prev_end;
        self.token_count = checkpoint.token_count;
        self.ctx.log.set_suppressed(checkpoint.log_suppressed);
    }

    fn decl_checkpoint(&self) -> DeclCheckpoint {
        let scope = self.ctx.scopes.get(self.current_scope);
        DeclCheckpoint {
            symbols: self.ctx.symbols.len(),
            scopes: self.ctx.scopes.len(),
            current_scope: self.current_scope,
            members: scope.members.clone(),
            generated: scope.generated.len(),
            allow_in: self.allow_in,
            fn_flags: self.fn_flags,
            in_decorator: self.in_decorator,
            latest_arrow_arg: self.latest_arrow_arg,
            optional_arrow_arg: self.optional_arrow_arg,
            enum_self_ref: self.enum_self_ref.clone(),
            after_arrow_body: self.after_arrow_body,
            conditional_consequent: self.conditional_consequent,
        }
    }

    fn restore_decls(&mut self, checkpoint: DeclCheckpoint) {
        self.ctx.symbols.truncate(checkpoint.symbols);
        self.ctx.scopes.truncate(checkpoint.scopes);
        self.current_scope = checkpoint.current_scope;
        let scope = self.ctx.scopes.get_mut(checkpoint.current_scope);
        scope.members = checkpoint.members;
        scope.generated.truncate(checkpoint.generated);
        self.allow_in = checkpoint.allow_in;
        self.fn_flags = checkpoint.fn_flags;
        self.in_decorator = checkpoint.in_decorator;
        self.latest_arrow_arg = checkpoint.latest_arrow_arg;
        self.optional_arrow_arg = checkpoint.optional_arrow_arg;
        self.enum_self_ref = checkpoint.enum_self_ref;
        self.after_arrow_body = checkpoint.after_arrow_body;
        self.conditional_consequent = checkpoint.conditional_consequent;
    }

    /// Run `candidate` then `validator` without reporting errors. On any
    /// failure the cursor returns to where it was; on success it stays put
    /// and error reporting goes back to its previous state.
    pub(crate) fn try_with_backtracking<T>(
        &mut self,
        what: &'static str,
        candidate: impl FnOnce(&mut Self) -> Result<T>,
        validator: impl FnOnce(&mut Self) -> Result<()>,
    ) -> Attempt<T> {
        let checkpoint = self.checkpoint();
        self.ctx.log.set_suppressed(true);
        let result = match candidate(self) {
            Ok(value) => validator(self).map(|()| value),
            Err(err) => Err(err),
        };
        match result {
            Ok(value) => {
                self.ctx.log.set_suppressed(checkpoint.log_suppressed);
                Attempt::Committed(value)
            }
            Err(err) => {
                trace!(
                    attempt = what,
                    at = checkpoint.current.span.start,
                    reason = %err.message,
                    "backtracking"
                );
                self.restore(checkpoint);
                Attempt::Rejected
            }
        }
    }

    /// Function type parameters: `(a: T, b?) =>` as opposed to a
    /// parenthesized type. On success the cursor is past the `=>`.
    pub(crate) fn try_skip_arrow_args_with_backtracking(&mut self) -> bool {
        self.try_with_backtracking(
            "arrow arguments",
            |p| p.skip_fn_args(),
            |p| p.expect(&TokenKind::Arrow).map(|_| ()),
        )
        .is_committed()
    }

    /// Type arguments in an expression: `f<T>(x)`, `new C<T>`, `a?.b<T>()`.
    /// Rejected unless the token after `>` may legally follow them, so
    /// `f(a < b, c > d)` stays two comparisons.
    pub(crate) fn try_skip_type_arguments_with_backtracking(&mut self) -> bool {
        self.try_with_backtracking(
            "type arguments",
            |p| p.skip_type_arguments(true),
            |p| {
                if p.can_follow_type_arguments_in_expression() {
                    Ok(())
                } else {
                    p.unexpected()
                }
            },
        )
        .is_committed()
    }

    /// Arrow return type: `(x): T => ...`. The cursor must be on `:`; on
    /// success it is left on the `=>`.
    pub(crate) fn try_skip_arrow_return_type_with_backtracking(&mut self) -> bool {
        self.try_with_backtracking(
            "arrow return type",
            |p| {
                p.expect(&TokenKind::Colon)?;
                p.skip_return_type()
            },
            |p| {
                if p.check(&TokenKind::Arrow) {
                    Ok(())
                } else {
                    p.expected("\"=>\"")
                }
            },
        )
        .is_committed()
    }

    /// `(b): T => c` at the start of a conditional's consequent is an arrow
    /// only when the `:` of the conditional follows it; otherwise `(b)` is
    /// the whole consequent. The cursor must be on the return type's `:`
    /// with the `FunctionArgs` scope of `items` current.
    pub(crate) fn try_parse_arrow_before_colon_with_backtracking(
        &mut self,
        start: u32,
        items: Vec<Expr>,
        is_async: bool,
        args_scope: ScopeId,
    ) -> Attempt<Expr> {
        let decls = self.decl_checkpoint();
        let attempt = self.try_with_backtracking(
            "arrow in conditional",
            |p| {
                p.expect(&TokenKind::Colon)?;
                p.skip_return_type()?;
                if !p.check(&TokenKind::Arrow) {
                    return p.expected("\"=>\"");
                }
                let params = p.items_to_params(items)?;
                p.parse_arrow_body(start, params, is_async, args_scope)
            },
            |p| {
                if p.check(&TokenKind::Colon) {
                    Ok(())
                } else {
                    p.expected("\":\"")
                }
            },
        );
        if matches!(attempt, Attempt::Rejected) {
            self.restore_decls(decls);
        }
        attempt
    }

    /// Generic arrow prefix: `<T>(x: T) => x` as opposed to the `<T>x` cast.
    /// On success the cursor is on the `(`.
    pub(crate) fn try_skip_type_parameters_then_open_paren_with_backtracking(
        &mut self,
    ) -> Attempt<TypeParams> {
        self.try_with_backtracking(
            "type parameters",
            |p| p.skip_type_parameters(true),
            |p| {
                if p.check(&TokenKind::LParen) {
                    Ok(())
                } else {
                    p.expected("\"(\"")
                }
            },
        )
    }

    /// `infer U extends X` inside a conditional type's checked operand:
    /// the constraint is dropped when a `?` follows, since then `extends`
    /// began a nested conditional type instead.
    pub(crate) fn try_skip_infer_constraint_with_backtracking(&mut self, opts: TypeOpts) {
        self.try_with_backtracking(
            "infer constraint",
            |p| {
                p.expect(&TokenKind::Extends)?;
                p.skip_type_with_opts(
                    Level::Prefix,
                    TypeOpts {
                        disallow_conditional_types: true,
                        ..Default::default()
                    },
                )
            },
            |p| {
                if !opts.disallow_conditional_types && p.check(&TokenKind::Question) {
                    p.unexpected()
                } else {
                    Ok(())
                }
            },
        );
    }

    /// Tokens that may directly follow a type argument list in an
    /// expression.
    fn can_follow_type_arguments_in_expression(&self) -> bool {
        matches!(
            self.peek(),
            // foo<x>(
            TokenKind::LParen
                // foo<T> `...`
                | TokenKind::TemplateNoSub(_)
                | TokenKind::TemplateHead(_)
                // foo<x>.  foo<x>?.
                | TokenKind::Dot
                | TokenKind::QuestionDot
                // foo<x>)  foo<x>]  foo<x>:  foo<x>;  foo<x>?
                | TokenKind::RParen
                | TokenKind::RBracket
                | TokenKind::Colon
                | TokenKind::Semicolon
                | TokenKind::Question
                // foo<x> == ...
                | TokenKind::EqEq
                | TokenKind::EqEqEq
                | TokenKind::BangEq
                | TokenKind::BangEqEq
                // foo<x> && ...
                | TokenKind::AmpAmp
                | TokenKind::PipePipe
                | TokenKind::QuestionQuestion
                | TokenKind::Caret
                | TokenKind::Amp
                | TokenKind::Pipe
                // foo<x> }
                | TokenKind::RBrace
                | TokenKind::Eof
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::ParserOptions;

    fn parser(source: &str) -> Parser<'_> {
        Parser::new(source, ParserOptions::default()).unwrap()
    }

    #[test]
    fn test_rejected_attempt_rewinds_exactly() {
        let mut p = parser("<a, b> c");
        let before = p.current.clone();
        assert!(!p.try_skip_type_arguments_with_backtracking());
        assert_eq!(p.current, before);
        assert_eq!(p.token_count, 0);
        assert!(!p.ctx.log.is_suppressed());
        assert!(p.ctx.log.messages().is_empty());
    }

    #[test]
    fn test_committed_type_arguments() {
        let mut p = parser("<string, number>(x)");
        assert!(p.try_skip_type_arguments_with_backtracking());
        assert_eq!(p.peek(), &TokenKind::LParen);
    }

    #[test]
    fn test_type_arguments_rejected_before_comma_or_brace() {
        let mut p = parser("<b, c>d");
        assert!(!p.try_skip_type_arguments_with_backtracking());
        let mut p = parser("<T> {}");
        assert!(!p.try_skip_type_arguments_with_backtracking());
        let mut p = parser("<T> , x");
        assert!(!p.try_skip_type_arguments_with_backtracking());
    }

    #[test]
    fn test_type_arguments_require_plain_greater_than() {
        let mut p = parser("<y >= z");
        assert!(!p.try_skip_type_arguments_with_backtracking());
        assert_eq!(p.peek(), &TokenKind::Lt);
    }

    #[test]
    fn test_arrow_return_type() {
        let mut p = parser(": Promise<void> => x");
        assert!(p.try_skip_arrow_return_type_with_backtracking());
        assert_eq!(p.peek(), &TokenKind::Arrow);

        let mut p = parser(": b");
        assert!(!p.try_skip_arrow_return_type_with_backtracking());
        assert_eq!(p.peek(), &TokenKind::Colon);
    }

    #[test]
    fn test_arrow_args() {
        let mut p = parser("(a: number, b?) => void");
        assert!(p.try_skip_arrow_args_with_backtracking());
        assert!(matches!(p.peek(), TokenKind::Void));

        let mut p = parser("(string | number)");
        assert!(!p.try_skip_arrow_args_with_backtracking());
        assert_eq!(p.peek(), &TokenKind::LParen);
    }

    #[test]
    fn test_type_parameters_then_paren() {
        let mut p = parser("<T extends object>(x: T) => x");
        assert_eq!(
            p.try_skip_type_parameters_then_open_paren_with_backtracking(),
            Attempt::Committed(TypeParams::Definite)
        );
        assert_eq!(p.peek(), &TokenKind::LParen);

        let mut p = parser("<T>x");
        assert_eq!(
            p.try_skip_type_parameters_then_open_paren_with_backtracking(),
            Attempt::Rejected
        );
        assert_eq!(p.peek(), &TokenKind::Lt);
    }

    fn conditional(source: &str) -> (crate::ast::Expr, crate::parser::ParseContext) {
        use crate::ast::{ExprKind, StmtKind};
        let mut p = parser(source);
        let mut stmts = p.parse_program().unwrap();
        let StmtKind::Expr(expr) = stmts.remove(0).kind else {
            panic!("expected expression statement");
        };
        let ExprKind::Binary { right, .. } = expr.kind else {
            panic!("expected assignment");
        };
        let ExprKind::Conditional { consequent, .. } = right.kind else {
            panic!("expected conditional");
        };
        (*consequent, p.into_context())
    }

    #[test]
    fn test_arrow_in_conditional_needs_trailing_colon() {
        use crate::ast::ExprKind;
        use crate::symbols::ScopeTree;

        let (consequent, ctx) = conditional("x = c ? (d) : e => f;");
        assert!(matches!(consequent.kind, ExprKind::Ident(_)));
        assert!(!ctx.scopes.get(ScopeTree::MODULE).members.contains_key("d"));
        assert!(ctx.log.messages().is_empty());

        let (consequent, _) = conditional("x = c ? (d): T => d : g;");
        assert!(matches!(consequent.kind, ExprKind::Arrow(_)));
    }

    #[test]
    fn test_nested_attempt_restores_outer_suppression() {
        let mut p = parser("<T>(x)");
        p.ctx.log.set_suppressed(true);
        assert!(p.try_skip_type_arguments_with_backtracking());
        assert!(p.ctx.log.is_suppressed());
        p.ctx.log.set_suppressed(false);
        let mut q = parser("<T> y");
        assert!(!q.try_skip_type_arguments_with_backtracking());
        assert!(!q.ctx.log.is_suppressed());
    }
}
