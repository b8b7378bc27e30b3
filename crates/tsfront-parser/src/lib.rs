//! tsfront-parser: TypeScript-aware JavaScript front end
//!
//! Parses JavaScript or TypeScript, erases types, lowers TypeScript-only
//! declarations (`namespace`, `enum`, `import x = ...`, parameter
//! properties) and prints plain JavaScript.
//!
//! # Design Principles
//!
//! 1. **Everything is an Expression, Binding, or Statement**
//!    - Expressions: `foo(1)`, `a + b`, `x.y`
//!    - Bindings: `a`, `[a, b]`, `{x: y}`
//!    - Statements: `let a = 1;`, `if (x) {}`, `return x;`
//!
//! 2. **Lexing on-demand**
//!    - The lexer is driven by the parser, so regex vs division and `>>`
//!      inside type arguments are decided in context
//!
//! 3. **Types are skipped, not parsed**
//!    - Type annotations are consumed without building nodes
//!    - Ambiguous `<`, `(` and `?` are resolved by speculative parsing
//!
//! 4. **Two-pass parsing**
//!    - Pass 1: Parse, declare symbols, build the scope tree
//!    - Pass 2: Bind identifiers, lower TypeScript, fold enum values
//!
//! # Example
//!
//! ```
//! use tsfront_parser::{transform, TransformOptions};
//!
//! let js = transform("enum E { A, B }", &TransformOptions::default()).unwrap();
//! assert!(js.contains("E[E[\"B\"] = 1] = \"B\""));
//! ```

mod ast;
mod backtrack;
mod class;
mod codegen;
mod const_fold;
mod error;
mod expr;
mod function;
mod lexer;
mod lower_ts;
mod options;
mod parser;
mod span;
mod symbols;
mod token;
mod ts_types;
mod typescript;
mod visit;

// Re-exports
pub use ast::*;
pub use codegen::{quote_string, Codegen};
pub use const_fold::number_to_string;
pub use error::{ErrorKind, Log, ParseError, Result};
pub use lexer::{is_identifier, Lexer};
pub use options::{ParserOptions, PrintOptions, TransformOptions};
pub use parser::{ParseContext, Parser};
pub use span::{LineIndex, Span};
pub use symbols::{Ref, ScopeId, ScopeKind, Symbol, SymbolKind, SymbolTable};
pub use token::{Token, TokenKind};
pub use visit::visit_program;

/// Parse source code and run the visit pass, producing a lowered AST whose
/// identifiers are bound to symbols.
pub fn parse(source: &str, options: &ParserOptions) -> Result<Ast> {
    let mut parser = Parser::new(source, options.clone())?;
    let stmts = parser.parse_program()?;
    let mut ctx = parser.into_context();
    let stmts = visit_program(stmts, &mut ctx, options.typescript)?;
    Ok(Ast {
        stmts,
        symbols: ctx.symbols,
    })
}

/// Parse, lower and print JavaScript output.
pub fn transform(source: &str, options: &TransformOptions) -> Result<String> {
    let ast = parse(source, &options.parser)?;
    Ok(Codegen::new(&ast, &options.print).generate())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_binds_identifiers() {
        let ast = parse("let a = 1; a;", &ParserOptions::default()).unwrap();
        let StmtKind::Expr(Expr {
            kind: ExprKind::Ident(ident),
            ..
        }) = &ast.stmts[1].kind
        else {
            panic!("expected identifier statement");
        };
        let symbol = ident.symbol.expect("bound");
        assert_eq!(ast.symbols.name(symbol), "a");
        assert_eq!(ast.symbols.get(symbol).kind, SymbolKind::BlockScoped);
    }

    #[test]
    fn test_transform_erases_types() {
        let js = transform("let x: number = 1;", &TransformOptions::default()).unwrap();
        assert_eq!(js, "let x = 1;\n");
    }

    #[test]
    fn test_javascript_mode_rejects_types() {
        let options = TransformOptions::default().with_parser(ParserOptions::javascript());
        assert!(transform("let x: number = 1;", &options).is_err());
    }
}
