//! TypeScript type grammar skipper.
//!
//! Types never reach the AST: every function here only advances the token
//! cursor past a type, type parameter list, type argument list or function
//! parameter list. Line-break sensitivity follows the TypeScript compiler so
//! that `let x: any \n <T>y` and similar inputs split exactly where `tsc`
//! splits them.

use crate::ast::Level;
use crate::error::Result;
use crate::parser::Parser;
use crate::token::TokenKind;

/// Context flags for `skip_type_with_opts`.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct TypeOpts {
    /// `asserts x is T` is only valid in return position.
    pub is_return_type: bool,
    /// `{ [keyof: string]: T }` names a key rather than applying `keyof`.
    pub is_index_signature: bool,
    /// `[first: number, rest: string]`
    pub allow_tuple_labels: bool,
    /// The operand of `extends` in a conditional type.
    pub disallow_conditional_types: bool,
}

/// How a `<...>` list was classified while skipping it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TypeParams {
    /// No `<` at the cursor.
    None,
    /// Could also be read as `<T>expr`.
    CouldBeTypeCast,
    /// Had `extends`, a default, a modifier or a trailing comma.
    Definite,
}

/// What a contextual identifier means at the start of a type.
enum TypeIdent {
    Normal,
    /// Built-in keyword types such as `number`; never take type arguments.
    Primitive,
    /// `keyof T`, `readonly T[]`
    Prefix,
    Infer,
    Unique,
    Abstract,
    Asserts,
}

fn classify_type_ident(name: &str) -> TypeIdent {
    match name {
        "any" | "never" | "unknown" | "undefined" | "object" | "number" | "string"
        | "boolean" | "bigint" | "symbol" => TypeIdent::Primitive,
        "keyof" | "readonly" => TypeIdent::Prefix,
        "infer" => TypeIdent::Infer,
        "unique" => TypeIdent::Unique,
        "abstract" => TypeIdent::Abstract,
        "asserts" => TypeIdent::Asserts,
        _ => TypeIdent::Normal,
    }
}

impl<'a> Parser<'a> {
    /// Skip one type at the given binding power.
    pub(crate) fn skip_type(&mut self, level: Level) -> Result<()> {
        self.skip_type_with_opts(level, TypeOpts::default())
    }

    /// Skip a return type annotation (allows `asserts x is T`).
    pub(crate) fn skip_return_type(&mut self) -> Result<()> {
        self.skip_type_with_opts(
            Level::Lowest,
            TypeOpts {
                is_return_type: true,
                ..Default::default()
            },
        )
    }

    pub(crate) fn skip_type_with_opts(&mut self, level: Level, opts: TypeOpts) -> Result<()> {
        if self.skip_type_prefix(opts)? {
            return Ok(());
        }
        self.skip_type_suffix(level, opts)
    }

    /// Skip the leading part of a type. Returns true when the type is already
    /// complete and no suffix may follow (type predicates, tuple labels).
    fn skip_type_prefix(&mut self, opts: TypeOpts) -> Result<bool> {
        loop {
            match self.peek() {
                TokenKind::Number(_)
                | TokenKind::BigInt(_)
                | TokenKind::String(_)
                | TokenKind::TemplateNoSub(_)
                | TokenKind::True
                | TokenKind::False
                | TokenKind::Null
                | TokenKind::Void => {
                    self.next()?;
                }

                // "as const", "<const T>"
                TokenKind::Const => {
                    let span = self.current.span;
                    self.next()?;
                    // "[const: number]"
                    if opts.allow_tuple_labels && self.check(&TokenKind::Colon) {
                        return self.syntax_error("Unexpected \"const\"", span);
                    }
                }

                TokenKind::This => {
                    self.next()?;
                    // "function check(): this is boolean"
                    if self.is_ident("is") && !self.current.had_newline_before {
                        self.next()?;
                        self.skip_type(Level::Lowest)?;
                        return Ok(true);
                    }
                }

                // "-123", "-123n"
                TokenKind::Minus => {
                    self.next()?;
                    if matches!(self.peek(), TokenKind::BigInt(_)) {
                        self.next()?;
                    } else if matches!(self.peek(), TokenKind::Number(_)) {
                        self.next()?;
                    } else {
                        return self.expected("number");
                    }
                }

                // Leading separators: "type A = | B | C", "type A = & B & C"
                TokenKind::Amp | TokenKind::Pipe => {
                    self.next()?;
                    continue;
                }

                // "import('fs')"
                TokenKind::Import => {
                    self.next()?;
                    // "[import: number]"
                    if opts.allow_tuple_labels && self.check(&TokenKind::Colon) {
                        return Ok(true);
                    }
                    self.expect(&TokenKind::LParen)?;
                    self.expect_string()?;
                    // "import('./foo.json', { with: { type: 'json' } })"
                    if self.eat(&TokenKind::Comma)? {
                        self.skip_object_type()?;
                        self.eat(&TokenKind::Comma)?;
                    }
                    self.expect(&TokenKind::RParen)?;
                }

                // "new () => Foo", "new <T>() => Foo<T>"
                TokenKind::New => {
                    self.next()?;
                    // "[new: number]"
                    if opts.allow_tuple_labels && self.check(&TokenKind::Colon) {
                        return Ok(true);
                    }
                    self.skip_type_parameters(true)?;
                    self.skip_paren_or_fn_type()?;
                }

                // "<T>() => Foo<T>"
                TokenKind::Lt => {
                    self.skip_type_parameters(true)?;
                    self.skip_paren_or_fn_type()?;
                }

                // "(number | string)", "(x: number) => string"
                TokenKind::LParen => self.skip_paren_or_fn_type()?,

                TokenKind::Identifier(name) => {
                    let mut check_type_arguments = true;
                    match classify_type_ident(name) {
                        TypeIdent::Prefix => {
                            self.next()?;
                            // "[keyof: string]", "{ [keyof in string]: number }"
                            let is_key = matches!(self.peek(), TokenKind::Colon | TokenKind::In)
                                && (opts.is_index_signature || opts.allow_tuple_labels);
                            if !is_key {
                                self.skip_type(Level::Prefix)?;
                            }
                            return Ok(false);
                        }
                        TypeIdent::Infer => {
                            self.next()?;
                            // "Bar extends [infer T] ? T : null"
                            // "Bar extends [infer T extends string] ? T : null"
                            let is_key = matches!(self.peek(), TokenKind::Colon | TokenKind::In)
                                && (opts.is_index_signature || opts.allow_tuple_labels);
                            if !is_key {
                                self.expect_identifier()?;
                                if self.check(&TokenKind::Extends) {
                                    self.try_skip_infer_constraint_with_backtracking(opts);
                                }
                            }
                            return Ok(false);
                        }
                        TypeIdent::Unique => {
                            self.next()?;
                            // "let foo: unique symbol"
                            if self.is_ident("symbol") {
                                self.next()?;
                                return Ok(false);
                            }
                        }
                        TypeIdent::Abstract => {
                            self.next()?;
                            // "let foo: abstract new () => {}"
                            if self.check(&TokenKind::New) {
                                continue;
                            }
                        }
                        TypeIdent::Asserts => {
                            self.next()?;
                            // "function assert(x: boolean): asserts x"
                            // "function assert(x: boolean): asserts x is boolean"
                            if opts.is_return_type
                                && !self.current.had_newline_before
                                && matches!(self.peek(), TokenKind::Identifier(_) | TokenKind::This)
                            {
                                self.next()?;
                            }
                        }
                        TypeIdent::Primitive => {
                            self.next()?;
                            check_type_arguments = false;
                        }
                        TypeIdent::Normal => {
                            self.next()?;
                        }
                    }

                    // "function check(x: any): x is string"
                    if self.is_ident("is") && !self.current.had_newline_before {
                        self.next()?;
                        self.skip_type(Level::Lowest)?;
                        return Ok(true);
                    }

                    // "let foo: any \n <number>foo" must not become a single type
                    if check_type_arguments && !self.current.had_newline_before {
                        self.skip_type_arguments(false)?;
                    }
                }

                TokenKind::Typeof => {
                    self.next()?;
                    // "[typeof: number]"
                    if opts.allow_tuple_labels && self.check(&TokenKind::Colon) {
                        return Ok(true);
                    }
                    // "typeof import('fs')"
                    if self.check(&TokenKind::Import) {
                        continue;
                    }
                    // "typeof x", "typeof x.y", "typeof x.#y"
                    self.expect_identifier_or_keyword()?;
                    while self.eat(&TokenKind::Dot)? {
                        if matches!(self.peek(), TokenKind::PrivateName(_)) {
                            self.next()?;
                        } else {
                            self.expect_identifier_or_keyword()?;
                        }
                    }
                    if !self.current.had_newline_before {
                        self.skip_type_arguments(false)?;
                    }
                }

                // "[number, string]", "[first: number, ...rest: string[]]"
                TokenKind::LBracket => {
                    self.next()?;
                    while !self.check(&TokenKind::RBracket) {
                        self.eat(&TokenKind::DotDotDot)?;
                        self.skip_type_with_opts(
                            Level::Lowest,
                            TypeOpts {
                                allow_tuple_labels: true,
                                ..Default::default()
                            },
                        )?;
                        self.eat(&TokenKind::Question)?;
                        if self.eat(&TokenKind::Colon)? {
                            self.skip_type(Level::Lowest)?;
                        }
                        if !self.eat(&TokenKind::Comma)? {
                            break;
                        }
                    }
                    self.expect(&TokenKind::RBracket)?;
                }

                TokenKind::LBrace => self.skip_object_type()?,

                // "`${'a' | 'b'}-${'c' | 'd'}`"
                TokenKind::TemplateHead(_) => loop {
                    self.next()?;
                    self.skip_type(Level::Lowest)?;
                    self.rescan_template_continuation()?;
                    if matches!(self.peek(), TokenKind::TemplateTail(_)) {
                        self.next()?;
                        break;
                    }
                },

                kind => {
                    // "[function: number]"
                    if opts.allow_tuple_labels && kind.identifier_or_keyword().is_some() {
                        if !matches!(kind, TokenKind::Function) {
                            return self.unexpected();
                        }
                        self.next()?;
                        if !self.check(&TokenKind::Colon) {
                            self.expect(&TokenKind::Colon)?;
                        }
                        return Ok(true);
                    }
                    return self.unexpected();
                }
            }
            return Ok(false);
        }
    }

    /// Extend a type through union, intersection, member access, indexed
    /// access and conditional operators.
    fn skip_type_suffix(&mut self, level: Level, opts: TypeOpts) -> Result<()> {
        loop {
            match self.peek() {
                TokenKind::Pipe => {
                    if level >= Level::BitwiseOr {
                        return Ok(());
                    }
                    self.next()?;
                    self.skip_type_with_opts(Level::BitwiseOr, opts)?;
                }

                TokenKind::Amp => {
                    if level >= Level::BitwiseAnd {
                        return Ok(());
                    }
                    self.next()?;
                    self.skip_type_with_opts(Level::BitwiseAnd, opts)?;
                }

                // JSDoc-style postfix "!". Consumed so "x as T!" stays in sync.
                TokenKind::Bang => {
                    if self.current.had_newline_before {
                        return Ok(());
                    }
                    self.next()?;
                }

                TokenKind::Dot => {
                    self.next()?;
                    self.expect_identifier_or_keyword()?;
                    if !self.current.had_newline_before {
                        self.skip_type_arguments(false)?;
                    }
                }

                // "{ ['x']: string \n ['y']: string }" must not become a single type
                TokenKind::LBracket => {
                    if self.current.had_newline_before {
                        return Ok(());
                    }
                    self.next()?;
                    if !self.check(&TokenKind::RBracket) {
                        self.skip_type(Level::Lowest)?;
                    }
                    self.expect(&TokenKind::RBracket)?;
                }

                // "{ x: number \n extends: boolean }" must not become a single type
                TokenKind::Extends => {
                    if opts.disallow_conditional_types
                        || self.current.had_newline_before
                        || level >= Level::Conditional
                    {
                        return Ok(());
                    }
                    self.next()?;
                    // The checked type may not itself be a conditional type
                    self.skip_type_with_opts(
                        Level::Yield,
                        TypeOpts {
                            disallow_conditional_types: true,
                            ..Default::default()
                        },
                    )?;
                    self.expect(&TokenKind::Question)?;
                    self.skip_type(Level::Lowest)?;
                    self.expect(&TokenKind::Colon)?;
                    self.skip_type(Level::Lowest)?;
                }

                _ => return Ok(()),
            }
        }
    }

    /// Skip `{ ... }` object and mapped types.
    pub(crate) fn skip_object_type(&mut self) -> Result<()> {
        self.expect(&TokenKind::LBrace)?;
        while !self.check(&TokenKind::RBrace) {
            // "{ -readonly [K in keyof T]: T[K] }"
            if matches!(self.peek(), TokenKind::Plus | TokenKind::Minus) {
                self.next()?;
            }

            // Modifiers and the property name
            let mut found_key = false;
            while self.peek().identifier_or_keyword().is_some()
                || matches!(self.peek(), TokenKind::String(_) | TokenKind::Number(_))
            {
                self.next()?;
                found_key = true;
            }

            if self.eat(&TokenKind::LBracket)? {
                // "{ [key: string]: number }"
                // "{ readonly [K in keyof T]: T[K] }"
                self.skip_type_with_opts(
                    Level::Lowest,
                    TypeOpts {
                        is_index_signature: true,
                        ..Default::default()
                    },
                )?;
                if self.eat(&TokenKind::Colon)? {
                    self.skip_type(Level::Lowest)?;
                } else if self.eat(&TokenKind::In)? {
                    self.skip_type(Level::Lowest)?;
                    // "{ [K in keyof T as `get-${K}`]: T[K] }"
                    if self.eat_ident("as")? {
                        self.skip_type(Level::Lowest)?;
                    }
                }
                self.expect(&TokenKind::RBracket)?;
                // "{ [K in keyof T]+?: T[K] }"
                if matches!(self.peek(), TokenKind::Plus | TokenKind::Minus) {
                    self.next()?;
                }
                found_key = true;
            }

            // Optional property, definite assignment
            if found_key && matches!(self.peek(), TokenKind::Question | TokenKind::Bang) {
                self.next()?;
            }

            self.skip_type_parameters(true)?;

            match self.peek() {
                TokenKind::Colon => {
                    if !found_key {
                        return self.expected("identifier");
                    }
                    self.next()?;
                    self.skip_type(Level::Lowest)?;
                }
                // Method, call or construct signature
                TokenKind::LParen => {
                    self.skip_fn_args()?;
                    if self.eat(&TokenKind::Colon)? {
                        self.skip_return_type()?;
                    }
                }
                _ => {
                    if !found_key {
                        return self.unexpected();
                    }
                }
            }

            match self.peek() {
                TokenKind::RBrace => {}
                TokenKind::Comma | TokenKind::Semicolon => {
                    self.next()?;
                }
                _ => {
                    if !self.current.had_newline_before {
                        return self.unexpected();
                    }
                }
            }
        }
        self.expect(&TokenKind::RBrace)?;
        Ok(())
    }

    /// Skip `<T, U extends X = Y>`. `in`, `out` and `const` modifiers are
    /// accepted on every parameter.
    pub(crate) fn skip_type_parameters(&mut self, allow_empty: bool) -> Result<TypeParams> {
        if !self.check(&TokenKind::Lt) {
            return Ok(TypeParams::None);
        }
        self.next()?;
        let mut result = TypeParams::CouldBeTypeCast;
        if allow_empty && self.check(&TokenKind::Gt) {
            self.next()?;
            return Ok(TypeParams::Definite);
        }

        loop {
            let mut expect_identifier = true;
            loop {
                match self.peek() {
                    TokenKind::Const => {
                        result = TypeParams::Definite;
                        self.next()?;
                        expect_identifier = true;
                    }
                    TokenKind::In => {
                        self.next()?;
                        expect_identifier = true;
                    }
                    // "out" may also be the parameter name itself
                    TokenKind::Identifier(name) if name == "out" => {
                        self.next()?;
                        expect_identifier = false;
                    }
                    _ => break,
                }
            }
            if expect_identifier || matches!(self.peek(), TokenKind::Identifier(_)) {
                self.expect_identifier()?;
            }

            // "class Foo<T extends number> {}"
            if self.eat(&TokenKind::Extends)? {
                result = TypeParams::Definite;
                self.skip_type(Level::Lowest)?;
            }

            // "class Foo<T = void> {}"
            if self.eat(&TokenKind::Eq)? {
                result = TypeParams::Definite;
                self.skip_type(Level::Lowest)?;
            }

            if !self.eat(&TokenKind::Comma)? {
                break;
            }
            if self.check(&TokenKind::Gt) {
                result = TypeParams::Definite;
                break;
            }
        }

        self.expect_greater_than()?;
        Ok(result)
    }

    /// Skip `<A, B>`. Inside expressions only a plain `>` may close the list,
    /// so `x < y >= z` is never read as type arguments.
    pub(crate) fn skip_type_arguments(&mut self, in_expression: bool) -> Result<bool> {
        if !matches!(
            self.peek(),
            TokenKind::Lt | TokenKind::LtEq | TokenKind::LtLt | TokenKind::LtLtEq
        ) {
            return Ok(false);
        }
        self.expect_less_than()?;
        loop {
            self.skip_type(Level::Lowest)?;
            if !self.eat(&TokenKind::Comma)? {
                break;
            }
        }
        if in_expression {
            if !self.check(&TokenKind::Gt) {
                return self.expected("\">\"");
            }
            self.next()?;
        } else {
            self.expect_greater_than()?;
        }
        Ok(true)
    }

    /// Skip a binding pattern used as a function type parameter name.
    pub(crate) fn skip_binding(&mut self) -> Result<()> {
        match self.peek() {
            TokenKind::Identifier(_) | TokenKind::This => {
                self.next()?;
            }
            TokenKind::LBracket => {
                self.next()?;
                // "[, , a]"
                while self.eat(&TokenKind::Comma)? {}
                while !self.check(&TokenKind::RBracket) {
                    self.eat(&TokenKind::DotDotDot)?;
                    self.skip_binding()?;
                    if !self.eat(&TokenKind::Comma)? {
                        break;
                    }
                }
                self.expect(&TokenKind::RBracket)?;
            }
            TokenKind::LBrace => {
                self.next()?;
                while !self.check(&TokenKind::RBrace) {
                    let mut found_identifier = false;
                    match self.peek() {
                        TokenKind::DotDotDot => {
                            // "{...x}"
                            self.next()?;
                            self.expect_identifier()?;
                            found_identifier = true;
                        }
                        // "{x}", "{x: y}"
                        TokenKind::Identifier(_) => {
                            self.next()?;
                            found_identifier = true;
                        }
                        // "{1: y}", "{'x': y}"
                        TokenKind::String(_) | TokenKind::Number(_) => {
                            self.next()?;
                        }
                        kind => {
                            // "{if: x}"
                            if kind.identifier_or_keyword().is_none() {
                                return self.unexpected();
                            }
                            self.next()?;
                        }
                    }
                    if self.check(&TokenKind::Colon) || !found_identifier {
                        self.expect(&TokenKind::Colon)?;
                        self.skip_binding()?;
                    }
                    if !self.eat(&TokenKind::Comma)? {
                        break;
                    }
                }
                self.expect(&TokenKind::RBrace)?;
            }
            _ => return self.unexpected(),
        }
        Ok(())
    }

    /// Skip `(a?: T, ...rest: U[])` of a function type.
    pub(crate) fn skip_fn_args(&mut self) -> Result<()> {
        self.expect(&TokenKind::LParen)?;
        while !self.check(&TokenKind::RParen) {
            // "(...a)"
            self.eat(&TokenKind::DotDotDot)?;
            self.skip_binding()?;
            // "(a?)"
            self.eat(&TokenKind::Question)?;
            // "(a: any)"
            if self.eat(&TokenKind::Colon)? {
                self.skip_type(Level::Lowest)?;
            }
            // "(a, b)"
            if !self.eat(&TokenKind::Comma)? {
                break;
            }
        }
        self.expect(&TokenKind::RParen)?;
        Ok(())
    }

    /// A parenthesized type or a function type head.
    fn skip_paren_or_fn_type(&mut self) -> Result<()> {
        if self.try_skip_arrow_args_with_backtracking() {
            self.skip_return_type()
        } else {
            self.expect(&TokenKind::LParen)?;
            self.skip_type(Level::Lowest)?;
            self.expect(&TokenKind::RParen)?;
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::ast::Level;
    use crate::options::ParserOptions;
    use crate::parser::Parser;
    use crate::token::TokenKind;

    /// Skip one type from the start of `source` and return the tokens consumed
    /// plus the token the cursor stopped at.
    fn skip(source: &str) -> (usize, TokenKind) {
        let mut parser = Parser::new(source, ParserOptions::default()).unwrap();
        parser.skip_type(Level::Lowest).unwrap();
        (parser.token_count, parser.current.kind.clone())
    }

    fn skips_all(source: &str) {
        let (_, rest) = skip(source);
        assert_eq!(rest, TokenKind::Eof, "did not consume all of {source:?}");
    }

    #[test]
    fn test_simple_types() {
        skips_all("number");
        skips_all("string[]");
        skips_all("Array<Map<string, number>>");
        skips_all("A.B.C<D>");
        skips_all("'a' | 'b' | -1 | 2n");
        skips_all("| A | B");
        skips_all("A & B | C");
        skips_all("unique symbol");
        skips_all("keyof typeof obj");
        skips_all("readonly string[]");
    }

    #[test]
    fn test_function_and_constructor_types() {
        skips_all("(a: number, b?: string) => void");
        skips_all("(...rest: any[]) => Promise<void>");
        skips_all("<T>(x: T) => T");
        skips_all("new () => Foo");
        skips_all("abstract new (x: number) => Foo");
        skips_all("({ a, b: [c] }: Props) => void");
    }

    #[test]
    fn test_parenthesized_type_is_not_a_function_type() {
        let (count, rest) = skip("(string | number)[] ;");
        assert_eq!(rest, TokenKind::Semicolon);
        assert_eq!(count, 7);
    }

    #[test]
    fn test_object_and_mapped_types() {
        skips_all("{ a: string; b?: number, readonly c: boolean }");
        skips_all("{ [key: string]: number }");
        skips_all("{ -readonly [K in keyof T]-?: T[K] }");
        skips_all("{ [K in keyof T as `get${K}`]: () => T[K] }");
        skips_all("{ method<T>(x: T): void; new (x: number): Foo; (): void }");
        skips_all("{ get x(): number; set x(v: number) }");
    }

    #[test]
    fn test_tuples() {
        skips_all("[number, string?]");
        skips_all("[first: number, ...rest: string[]]");
        skips_all("[a?: number]");
        skips_all("[]");
    }

    #[test]
    fn test_conditional_and_infer() {
        skips_all("T extends string ? 'yes' : 'no'");
        skips_all("T extends [infer U] ? U : never");
        skips_all("T extends [infer U extends string] ? U : never");
        skips_all("T extends (infer U extends string ? 1 : 2) ? U : never");
    }

    #[test]
    fn test_template_literal_types() {
        skips_all("`prefix-${string}`");
        skips_all("`${'a' | 'b'}-${Uppercase<T>}-end`");
    }

    #[test]
    fn test_import_and_typeof_types() {
        skips_all("import('fs').Stats");
        skips_all("typeof import('./mod')");
        skips_all("typeof a.b.#c");
        skips_all("import('./x.json', { with: { type: 'json' } })");
    }

    #[test]
    fn test_return_type_predicates() {
        let mut parser = Parser::new("asserts x is string", ParserOptions::default()).unwrap();
        parser.skip_return_type().unwrap();
        assert_eq!(parser.current.kind, TokenKind::Eof);

        skips_all("x is string");
        skips_all("this is Foo");
    }

    #[test]
    fn test_newline_stops_type() {
        let (_, rest) = skip("any\n<T>x");
        assert_eq!(rest, TokenKind::Lt);
        let (_, rest) = skip("Foo\n[0]");
        assert_eq!(rest, TokenKind::LBracket);
        let (_, rest) = skip("Foo\n!x");
        assert_eq!(rest, TokenKind::Bang);
    }

    #[test]
    fn test_postfix_bang_is_consumed() {
        skips_all("Foo!");
    }

    #[test]
    fn test_nested_generics_split_shift_tokens() {
        skips_all("A<B<C<D>>>");
        let (_, rest) = skip("A<B<C>>= x");
        assert_eq!(rest, TokenKind::Eq);
    }

    #[test]
    fn test_type_parameters() {
        use super::TypeParams;
        let mut parser =
            Parser::new("<const T extends object = {}, in out U,>", ParserOptions::default())
                .unwrap();
        assert_eq!(parser.skip_type_parameters(true).unwrap(), TypeParams::Definite);
        assert_eq!(parser.current.kind, TokenKind::Eof);

        let mut parser = Parser::new("<T>", ParserOptions::default()).unwrap();
        assert_eq!(
            parser.skip_type_parameters(true).unwrap(),
            TypeParams::CouldBeTypeCast
        );
    }

    #[test]
    fn test_unexpected_token_is_syntax_error() {
        let mut parser = Parser::new("= 1", ParserOptions::default()).unwrap();
        let err = parser.skip_type(Level::Lowest).unwrap_err();
        assert_eq!(err.message, "Unexpected \"=\"");
    }

    #[test]
    fn test_reskip_from_checkpoint_consumes_same_tokens() {
        let source = "{ [K in keyof T]: (x: T[K]) => Promise<K> } | undefined; rest";
        let mut parser = Parser::new(source, ParserOptions::default()).unwrap();
        let checkpoint = parser.checkpoint();
        parser.skip_type(Level::Lowest).unwrap();
        let first = parser.token_count;
        let first_end = parser.current.span;
        parser.restore(checkpoint);
        assert_eq!(parser.token_count, 0);
        parser.skip_type(Level::Lowest).unwrap();
        assert_eq!(parser.token_count, first);
        assert_eq!(parser.current.span, first_end);
    }
}
