//! Classes and decorators.

use crate::ast::*;
use crate::error::Result;
use crate::function::FnOpts;
use crate::parser::{FnFlags, Parser, StmtOpts};
use crate::symbols::{ScopeKind, SymbolKind};
use crate::token::TokenKind;

/// Where a class appears, which decides how its name is bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ClassContext {
    /// A declaration. Its name is required and binds in the enclosing scope.
    Stmt { is_declare: bool },
    /// `export default class [name]`
    DefaultExport,
    /// A class expression. Its name is only visible inside the class.
    Expr,
}

/// Modifiers seen before a class member's key.
#[derive(Debug, Clone, Copy, Default)]
struct MemberModifiers {
    is_static: bool,
    is_async: bool,
    is_generator: bool,
    is_accessor: bool,
    /// `abstract` and `declare` members have no runtime presence.
    is_erased: bool,
    kind: Option<MethodKind>,
}

impl<'a> Parser<'a> {
    /// A class declaration. The current token is `class`.
    pub(crate) fn parse_class_stmt(
        &mut self,
        start: u32,
        opts: StmtOpts,
        decorators: Vec<Expr>,
    ) -> Result<Stmt> {
        let context = ClassContext::Stmt {
            is_declare: opts.is_declare,
        };
        let class = self.parse_class(start, decorators, context)?;
        if opts.is_declare {
            return Ok(Stmt::new(StmtKind::TypeScript, self.span_from(start)));
        }
        Ok(Stmt::new(
            StmtKind::Class {
                class,
                is_export: opts.is_export,
            },
            self.span_from(start),
        ))
    }

    /// Parse a class. The current token is `class`.
    pub(crate) fn parse_class(
        &mut self,
        start: u32,
        decorators: Vec<Expr>,
        context: ClassContext,
    ) -> Result<Class> {
        self.expect(&TokenKind::Class)?;

        // "class implements I {}" has no name
        let has_name = matches!(self.peek(), TokenKind::Identifier(_))
            && !(self.options.typescript && self.is_ident("implements"));
        let name = if has_name {
            let (name, span) = self.expect_identifier()?;
            Some((name, span))
        } else {
            if let ClassContext::Stmt { .. } = context {
                return self.expected("identifier");
            }
            None
        };

        let mut name_ref = None;
        if let Some((name, span)) = &name {
            let symbol = match context {
                ClassContext::Stmt { is_declare: false } | ClassContext::DefaultExport => {
                    Some(self.declare_symbol(SymbolKind::Class, *span, name)?)
                }
                ClassContext::Stmt { is_declare: true } => {
                    Some(self.ctx.symbols.new_symbol(SymbolKind::Other, name.as_str()))
                }
                ClassContext::Expr => None,
            };
            name_ref = symbol.map(|symbol| LocRef {
                span: *span,
                symbol,
            });
        }

        let scope = self.push_scope(ScopeKind::Class);
        if let (ClassContext::Expr, Some((name, span))) = (context, &name) {
            let symbol = self.declare_symbol(SymbolKind::Other, *span, name)?;
            name_ref = Some(LocRef {
                span: *span,
                symbol,
            });
        }

        if self.options.typescript && self.check(&TokenKind::Lt) {
            self.skip_type_parameters(true)?;
        }

        let extends = if self.eat(&TokenKind::Extends)? {
            let value = self.parse_expr(Level::New)?;
            if self.options.typescript && matches!(self.peek(), TokenKind::Lt | TokenKind::LtLt) {
                self.skip_type_arguments(false)?;
            }
            Some(Box::new(value))
        } else {
            None
        };

        if self.options.typescript && self.eat_ident("implements")? {
            loop {
                self.skip_type(Level::Lowest)?;
                if !self.eat(&TokenKind::Comma)? {
                    break;
                }
            }
        }

        self.expect(&TokenKind::LBrace)?;
        let old_allow_in = std::mem::replace(&mut self.allow_in, true);
        let old_in_decorator = std::mem::replace(&mut self.in_decorator, false);
        let mut members = Vec::new();
        while !self.check(&TokenKind::RBrace) {
            if self.is_eof() {
                return self.expected("\"}\"");
            }
            if let Some(member) = self.parse_class_member()? {
                members.push(member);
            }
        }
        self.allow_in = old_allow_in;
        self.in_decorator = old_in_decorator;
        self.expect(&TokenKind::RBrace)?;
        self.pop_scope();

        Ok(Class {
            name: name_ref,
            extends,
            members,
            decorators,
            scope,
            span: self.span_from(start),
        })
    }

    /// One class member. Returns `None` for members that are erased.
    fn parse_class_member(&mut self) -> Result<Option<ClassMember>> {
        let start = self.current.span.start;
        if self.eat(&TokenKind::Semicolon)? {
            return Ok(None);
        }

        let decorators = if self.check(&TokenKind::At) {
            self.parse_decorators()?
        } else {
            Vec::new()
        };

        // "static { ... }"
        if self.is_ident("static") && matches!(self.lookahead()?.kind, TokenKind::LBrace) {
            if let Some(first) = decorators.first() {
                return self.syntax_error("Decorators are not valid here", first.span);
            }
            self.next()?;
            let body = self.parse_static_block()?;
            return Ok(Some(ClassMember::StaticBlock {
                body,
                span: self.span_from(start),
            }));
        }

        let mods = self.parse_member_modifiers()?;

        // "[key: string]: T" is erased
        if self.options.typescript
            && self.check(&TokenKind::LBracket)
            && self.at_index_signature()?
        {
            self.skip_index_signature()?;
            return Ok(None);
        }

        let key_span = self.current.span;
        let key = self.parse_property_key()?;
        let is_private = matches!(key, PropertyKey::Private(_));
        if is_private && !decorators.is_empty() {
            return self.syntax_error("Decorators are not valid on private members", key_span);
        }
        let is_constructor = !mods.is_static
            && matches!(&key, PropertyKey::Name(n) | PropertyKey::String(n) if n == "constructor");

        // "x?: T", "x!: T", "m?() {}"
        if self.options.typescript
            && matches!(self.peek(), TokenKind::Question | TokenKind::Bang)
            && !self.current.had_newline_before
        {
            self.next()?;
        }

        if self.check(&TokenKind::LParen)
            || (self.options.typescript && self.check(&TokenKind::Lt))
        {
            return self.parse_class_method(start, key, mods, decorators, is_constructor);
        }

        if mods.kind.is_some() || mods.is_async || mods.is_generator {
            return self.expected("\"(\"");
        }
        if is_constructor {
            return self.syntax_error("Invalid field name \"constructor\"", key_span);
        }

        if self.options.typescript && self.eat(&TokenKind::Colon)? {
            self.skip_type(Level::Lowest)?;
        }
        let value = if self.eat(&TokenKind::Eq)? {
            let old_flags = std::mem::replace(&mut self.fn_flags, FnFlags::default());
            let value = self.parse_expr(Level::Comma)?;
            self.fn_flags = old_flags;
            Some(value)
        } else {
            None
        };
        self.expect_semicolon()?;

        // TypeScript drops uninitialized fields unless they are defined
        // with [[Define]] semantics; private and decorated fields stay.
        let keeps_bare_field = !self.options.typescript
            || self.options.use_define_for_class_fields
            || is_private
            || mods.is_accessor
            || !decorators.is_empty();
        if mods.is_erased || (value.is_none() && !keeps_bare_field) {
            return Ok(None);
        }

        Ok(Some(ClassMember::Field {
            key,
            value,
            is_static: mods.is_static,
            is_accessor: mods.is_accessor,
            decorators,
            span: self.span_from(start),
        }))
    }

    fn parse_class_method(
        &mut self,
        start: u32,
        key: PropertyKey,
        mods: MemberModifiers,
        decorators: Vec<Expr>,
        is_constructor: bool,
    ) -> Result<Option<ClassMember>> {
        if is_constructor {
            if let Some(first) = decorators.first() {
                return self.declaration_error(
                    "Decorators are not valid on class constructors",
                    first.span,
                );
            }
            if mods.kind.is_some() || mods.is_async || mods.is_generator {
                let span = self.current.span;
                return self.syntax_error("Class constructor may not be special", span);
            }
        }

        let func_start = self.current.span.start;
        let fn_opts = FnOpts {
            is_async: mods.is_async,
            is_generator: mods.is_generator,
            allow_missing_body: self.options.typescript,
            is_constructor,
        };
        let Some(func) = self.parse_fn_rest(func_start, fn_opts, None)? else {
            // Overload signature or abstract method
            return Ok(None);
        };
        if mods.is_erased {
            return Ok(None);
        }

        let kind = if is_constructor {
            MethodKind::Constructor
        } else {
            mods.kind.unwrap_or(MethodKind::Method)
        };
        Ok(Some(ClassMember::Method {
            kind,
            key,
            func,
            is_static: mods.is_static,
            decorators,
            span: self.span_from(start),
        }))
    }

    /// Consume modifiers until the member key. A modifier word directly
    /// followed by `(`, `=`, `;`, `}`, `:`, `?`, `!` or `<` is the key itself.
    fn parse_member_modifiers(&mut self) -> Result<MemberModifiers> {
        let mut mods = MemberModifiers::default();
        loop {
            let TokenKind::Identifier(word) = self.peek() else {
                break;
            };
            let word = word.clone();
            let is_ts_modifier = matches!(
                word.as_str(),
                "public"
                    | "private"
                    | "protected"
                    | "readonly"
                    | "override"
                    | "abstract"
                    | "declare"
            );
            let is_modifier = match word.as_str() {
                "static" => !mods.is_static,
                "get" | "set" | "async" | "accessor" => mods.kind.is_none(),
                _ => is_ts_modifier && self.options.typescript,
            };
            if !is_modifier {
                break;
            }

            let next = self.lookahead()?;
            let is_key = matches!(
                next.kind,
                TokenKind::LParen
                    | TokenKind::Eq
                    | TokenKind::Semicolon
                    | TokenKind::RBrace
                    | TokenKind::Colon
                    | TokenKind::Question
                    | TokenKind::Bang
                    | TokenKind::Lt
                    | TokenKind::Eof
            );
            // "async\nfoo() {}" is a field named "async" followed by a method
            let newline_ends_member = next.had_newline_before
                && (is_ts_modifier || matches!(word.as_str(), "async" | "accessor"));
            if is_key || newline_ends_member {
                break;
            }

            self.next()?;
            match word.as_str() {
                "static" => mods.is_static = true,
                "get" => mods.kind = Some(MethodKind::Get),
                "set" => mods.kind = Some(MethodKind::Set),
                "async" => mods.is_async = true,
                "accessor" => mods.is_accessor = true,
                "abstract" | "declare" => mods.is_erased = true,
                _ => {}
            }
            if mods.kind.is_some() {
                break;
            }
        }
        if mods.kind.is_none() && self.eat(&TokenKind::Star)? {
            mods.is_generator = true;
        }
        Ok(mods)
    }

    /// `[name: T]` as opposed to a computed key.
    fn at_index_signature(&mut self) -> Result<bool> {
        let mut lexer = self.lexer.clone();
        let first = lexer.next_token().map_err(|e| self.ctx.log.report(e))?;
        if !matches!(first.kind, TokenKind::Identifier(_)) {
            return Ok(false);
        }
        let second = lexer.next_token().map_err(|e| self.ctx.log.report(e))?;
        Ok(matches!(second.kind, TokenKind::Colon))
    }

    fn skip_index_signature(&mut self) -> Result<()> {
        self.expect(&TokenKind::LBracket)?;
        self.expect_identifier()?;
        self.expect(&TokenKind::Colon)?;
        self.skip_type(Level::Lowest)?;
        self.expect(&TokenKind::RBracket)?;
        self.expect(&TokenKind::Colon)?;
        self.skip_type(Level::Lowest)?;
        self.expect_semicolon()
    }

    fn parse_static_block(&mut self) -> Result<FnBody> {
        self.expect(&TokenKind::LBrace)?;
        let scope = self.push_scope(ScopeKind::FunctionBody);
        let old_flags = std::mem::replace(&mut self.fn_flags, FnFlags::default());
        let stmts = self.parse_stmts_until_rbrace(StmtOpts::default())?;
        self.fn_flags = old_flags;
        self.pop_scope();
        self.expect(&TokenKind::RBrace)?;
        Ok(FnBody { stmts, scope })
    }

    // =========================================================================
    // Decorators
    // =========================================================================

    /// `@a @b.c @d(e)`
    pub(crate) fn parse_decorators(&mut self) -> Result<Vec<Expr>> {
        let mut decorators = Vec::new();
        while self.eat(&TokenKind::At)? {
            let old_in_decorator = std::mem::replace(&mut self.in_decorator, true);
            let value = self.parse_expr(Level::New)?;
            self.in_decorator = old_in_decorator;
            decorators.push(value);
        }
        Ok(decorators)
    }

    /// The statement after a list of decorators.
    pub(crate) fn parse_decorated_stmt(
        &mut self,
        start: u32,
        opts: StmtOpts,
        decorators: Vec<Expr>,
    ) -> Result<Stmt> {
        // "@dec export class", "@dec export default class"
        if self.check(&TokenKind::Export) && opts.is_module_scope {
            self.next()?;
            if self.eat(&TokenKind::Default)? {
                let decl_start = self.current.span.start;
                self.eat_abstract_before_class()?;
                if !self.check(&TokenKind::Class) {
                    return self.decorators_not_valid(&decorators);
                }
                let class = self.parse_class(decl_start, decorators, ClassContext::DefaultExport)?;
                return Ok(Stmt::new(
                    StmtKind::ExportDefault(ExportDefault::Class(class)),
                    self.span_from(start),
                ));
            }
            let opts = StmtOpts {
                is_export: true,
                ..opts
            };
            return self.parse_decorated_stmt(start, opts, decorators);
        }

        self.eat_abstract_before_class()?;
        if self.check(&TokenKind::Class) {
            return self.parse_class_stmt(start, opts, decorators);
        }
        self.decorators_not_valid(&decorators)
    }

    fn eat_abstract_before_class(&mut self) -> Result<()> {
        if self.options.typescript
            && self.is_ident("abstract")
            && matches!(self.lookahead()?.kind, TokenKind::Class)
        {
            self.next()?;
        }
        Ok(())
    }

    fn decorators_not_valid<T>(&mut self, decorators: &[Expr]) -> Result<T> {
        let span = decorators
            .first()
            .map_or(self.current.span, |first| first.span);
        self.syntax_error("Decorators are not valid here", span)
    }
}

#[cfg(test)]
mod tests {
    use crate::ast::*;
    use crate::error::{ErrorKind, Result};
    use crate::options::ParserOptions;
    use crate::parser::Parser;

    fn parse_with(source: &str, options: ParserOptions) -> Result<Vec<Stmt>> {
        let mut parser = Parser::new(source, options)?;
        parser.parse_program()
    }

    fn class(stmt: &Stmt) -> &Class {
        match &stmt.kind {
            StmtKind::Class { class, .. } => class,
            StmtKind::ExportDefault(ExportDefault::Class(class)) => class,
            other => panic!("expected class, got {other:?}"),
        }
    }

    fn members(source: &str, options: ParserOptions) -> Vec<ClassMember> {
        let stmts = parse_with(source, options).unwrap();
        class(&stmts[0]).members.clone()
    }

    #[test]
    fn test_type_only_members_are_erased() {
        let members = members(
            "abstract class A<T> extends B<T> implements C, D<T> {\n\
               [key: string]: unknown;\n\
               declare x: number;\n\
               abstract run(): void;\n\
               y: string;\n\
               #z: number;\n\
               w = 1;\n\
               m(a: string): void;\n\
               m(a: any) {}\n\
             }",
            ParserOptions::default(),
        );
        assert_eq!(members.len(), 3);
        assert!(matches!(
            &members[0],
            ClassMember::Field { key: PropertyKey::Private(n), .. } if n == "z"
        ));
        assert!(matches!(
            &members[1],
            ClassMember::Field { key: PropertyKey::Name(n), value: Some(_), .. } if n == "w"
        ));
        assert!(matches!(&members[2], ClassMember::Method { .. }));
    }

    #[test]
    fn test_define_semantics_keep_bare_fields() {
        let options = ParserOptions::default().with_use_define_for_class_fields(true);
        let members = members("class A { y: string; declare z: number }", options);
        assert_eq!(members.len(), 1);
    }

    #[test]
    fn test_modifier_words_as_member_names() {
        let members = members(
            "class A { static; get; set = 1; async\nfoo() {} static static() {} get get() { return 1 } }",
            ParserOptions::javascript(),
        );
        assert_eq!(members.len(), 7);
        assert!(matches!(
            &members[0],
            ClassMember::Field { key: PropertyKey::Name(n), is_static: false, .. } if n == "static"
        ));
        assert!(matches!(
            &members[3],
            ClassMember::Field { key: PropertyKey::Name(n), .. } if n == "async"
        ));
        assert!(matches!(
            &members[4],
            ClassMember::Method { key: PropertyKey::Name(n), .. } if n == "foo"
        ));
        assert!(matches!(
            &members[5],
            ClassMember::Method { key: PropertyKey::Name(n), is_static: true, .. } if n == "static"
        ));
        assert!(matches!(
            &members[6],
            ClassMember::Method { kind: MethodKind::Get, .. }
        ));
    }

    #[test]
    fn test_constructor_parameter_properties() {
        let members = members(
            "class A { constructor(public x: number, private readonly y = 1, z) {} }",
            ParserOptions::default(),
        );
        let ClassMember::Method { kind, func, .. } = &members[0] else {
            panic!("expected constructor");
        };
        assert_eq!(*kind, MethodKind::Constructor);
        let flags: Vec<bool> = func.params.iter().map(|p| p.is_parameter_property).collect();
        assert_eq!(flags, vec![true, true, false]);
    }

    #[test]
    fn test_parameter_property_on_method_is_error() {
        let err = parse_with("class A { m(public x) {} }", ParserOptions::default()).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Syntax);
    }

    #[test]
    fn test_decorators() {
        let stmts = parse_with(
            "@a @b.c() export class A { @d [e]() {} @f g = 1 }",
            ParserOptions::default(),
        )
        .unwrap();
        let decl = class(&stmts[0]);
        assert_eq!(decl.decorators.len(), 2);
        let ClassMember::Method { key, decorators, .. } = &decl.members[0] else {
            panic!("expected method");
        };
        assert!(matches!(key, PropertyKey::Computed(_)));
        assert_eq!(decorators.len(), 1);

        let stmts = parse_with("export default @dec class {}", ParserOptions::default()).unwrap();
        assert!(class(&stmts[0]).name.is_none());
    }

    #[test]
    fn test_invalid_decorators() {
        let err = parse_with("class A { @dec #x = 1 }", ParserOptions::default()).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Syntax);
        assert_eq!(err.message, "Decorators are not valid on private members");

        let err =
            parse_with("class A { @dec constructor() {} }", ParserOptions::default()).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Declaration);

        let err = parse_with("@dec function f() {}", ParserOptions::default()).unwrap_err();
        assert_eq!(err.message, "Decorators are not valid here");
    }

    #[test]
    fn test_class_expression_name_is_local() {
        let mut parser = Parser::new("(class Inner {})", ParserOptions::default()).unwrap();
        parser.parse_program().unwrap();
        let ctx = parser.into_context();
        assert!(!ctx
            .scopes
            .get(crate::symbols::ScopeTree::MODULE)
            .members
            .contains_key("Inner"));
    }

    #[test]
    fn test_static_block() {
        let members = members(
            "class A { static { var x = 1; } }",
            ParserOptions::default(),
        );
        assert!(matches!(&members[0], ClassMember::StaticBlock { .. }));
    }
}
