//! AST node types.
//!
//! Design principle: everything is an expression, a binding, or a statement.
//! Declarations carry the symbol `Ref` they introduced; identifier references
//! carry their name and, once the visit pass has run, the `Ref` they resolve to.
//! Nodes that open a scope carry its `ScopeId`.

use crate::span::Span;
use crate::symbols::{Ref, ScopeId, SymbolTable};

/// The root AST for a parsed module.
#[derive(Debug)]
pub struct Ast {
    /// All statements in the program.
    pub stmts: Vec<Stmt>,
    /// Every symbol referenced by the statements.
    pub symbols: SymbolTable,
}

/// A declared name and where it was declared.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocRef {
    pub span: Span,
    pub symbol: Ref,
}

/// Operator binding power, shared by the expression parser, the type
/// skipper and the printer. Higher binds tighter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    Lowest,
    Comma,
    Spread,
    Yield,
    Assign,
    Conditional,
    NullishCoalescing,
    LogicalOr,
    LogicalAnd,
    BitwiseOr,
    BitwiseXor,
    BitwiseAnd,
    Equals,
    Compare,
    Shift,
    Add,
    Multiply,
    Exponentiation,
    Prefix,
    Postfix,
    New,
    Call,
    Member,
}

impl Level {
    /// The next lower level, used for right-associative operators.
    pub fn lower(self) -> Level {
        use Level::*;
        match self {
            Lowest | Comma => Lowest,
            Spread => Comma,
            Yield => Spread,
            Assign => Yield,
            Conditional => Assign,
            NullishCoalescing => Conditional,
            LogicalOr => NullishCoalescing,
            LogicalAnd => LogicalOr,
            BitwiseOr => LogicalAnd,
            BitwiseXor => BitwiseOr,
            BitwiseAnd => BitwiseXor,
            Equals => BitwiseAnd,
            Compare => Equals,
            Shift => Compare,
            Add => Shift,
            Multiply => Add,
            Exponentiation => Multiply,
            Prefix => Exponentiation,
            Postfix => Prefix,
            New => Postfix,
            Call => New,
            Member => Call,
        }
    }
}

// =============================================================================
// Expressions
// =============================================================================

/// An expression node.
#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

impl Expr {
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// A reference to a known symbol.
    pub fn ident(symbols: &SymbolTable, symbol: Ref, span: Span) -> Self {
        Self::new(
            ExprKind::Ident(Ident {
                name: symbols.name(symbol).to_string(),
                symbol: Some(symbol),
            }),
            span,
        )
    }

    /// `target.name`
    pub fn dot(target: Expr, name: impl Into<String>, span: Span) -> Self {
        Self::new(
            ExprKind::Dot {
                target: Box::new(target),
                name: name.into(),
                optional_chain: OptionalChain::None,
            },
            span,
        )
    }

    /// `target[index]`
    pub fn index(target: Expr, index: Expr, span: Span) -> Self {
        Self::new(
            ExprKind::Index {
                target: Box::new(target),
                index: Box::new(index),
                optional_chain: OptionalChain::None,
            },
            span,
        )
    }

    /// `target = value`
    pub fn assign(target: Expr, value: Expr) -> Self {
        Self::binary(BinaryOp::Assign, target, value)
    }

    pub fn binary(op: BinaryOp, left: Expr, right: Expr) -> Self {
        let span = left.span.merge(right.span);
        Self::new(
            ExprKind::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            },
            span,
        )
    }

    /// Join expressions with the comma operator.
    pub fn join_with_comma(exprs: Vec<Expr>) -> Option<Expr> {
        exprs
            .into_iter()
            .reduce(|left, right| Expr::binary(BinaryOp::Comma, left, right))
    }
}

/// An identifier reference.
#[derive(Debug, Clone, PartialEq)]
pub struct Ident {
    pub name: String,
    /// Filled in by the visit pass.
    pub symbol: Option<Ref>,
}

/// Expression kinds.
#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    // === Literals ===
    Null,
    Undefined,
    Bool(bool),
    Number(f64),
    /// BigInt digits without the `n` suffix
    BigInt(String),
    String(String),
    Regex {
        pattern: String,
        flags: String,
    },
    /// Template literal, optionally tagged. Text parts are kept raw.
    Template {
        tag: Option<Box<Expr>>,
        head: String,
        parts: Vec<TemplatePart>,
    },

    // === Identifiers ===
    Ident(Ident),
    /// `#x` as the left operand of `in` or the index of a private access
    PrivateName(String),
    This,
    Super,
    /// `new.target`
    NewTarget,
    /// `import.meta`
    ImportMeta,

    // === Compound expressions ===
    /// Array literal; holes are `Missing`
    Array(Vec<Expr>),
    Object(Vec<Property>),
    Function(Box<Function>),
    Arrow(Box<Arrow>),
    Class(Box<Class>),

    // === Operators ===
    Unary {
        op: UnaryOp,
        arg: Box<Expr>,
    },
    /// Binary operators, including assignment and the comma operator
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Conditional {
        test: Box<Expr>,
        consequent: Box<Expr>,
        alternate: Box<Expr>,
    },

    // === Access and calls ===
    Dot {
        target: Box<Expr>,
        name: String,
        optional_chain: OptionalChain,
    },
    Index {
        target: Box<Expr>,
        index: Box<Expr>,
        optional_chain: OptionalChain,
    },
    Call {
        target: Box<Expr>,
        args: Vec<Expr>,
        optional_chain: OptionalChain,
    },
    New {
        target: Box<Expr>,
        args: Vec<Expr>,
    },
    /// `import(specifier)` with optional import attributes
    ImportCall {
        arg: Box<Expr>,
        options: Option<Box<Expr>>,
    },

    // === Other ===
    Spread(Box<Expr>),
    Await(Box<Expr>),
    Yield {
        arg: Option<Box<Expr>>,
        delegate: bool,
    },
    /// Array hole: `[a, , b]`
    Missing,
}

/// One `${expr}text` part of a template literal.
#[derive(Debug, Clone, PartialEq)]
pub struct TemplatePart {
    pub expr: Expr,
    pub tail: String,
}

/// Position of an access or call within an optional chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionalChain {
    None,
    /// This link starts with `?.`
    Start,
    /// A later link in a chain that started with `?.`
    Continue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Pos,
    Neg,
    Cpl,
    Not,
    Void,
    Typeof,
    Delete,
    PreInc,
    PreDec,
    PostInc,
    PostDec,
}

impl UnaryOp {
    pub fn text(self) -> &'static str {
        match self {
            Self::Pos => "+",
            Self::Neg => "-",
            Self::Cpl => "~",
            Self::Not => "!",
            Self::Void => "void",
            Self::Typeof => "typeof",
            Self::Delete => "delete",
            Self::PreInc | Self::PostInc => "++",
            Self::PreDec | Self::PostDec => "--",
        }
    }

    pub fn is_prefix(self) -> bool {
        !matches!(self, Self::PostInc | Self::PostDec)
    }

    pub fn is_keyword(self) -> bool {
        matches!(self, Self::Void | Self::Typeof | Self::Delete)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Pow,
    Lt,
    Le,
    Gt,
    Ge,
    In,
    Instanceof,
    Shl,
    Shr,
    UShr,
    LooseEq,
    LooseNe,
    StrictEq,
    StrictNe,
    NullishCoalescing,
    LogicalOr,
    LogicalAnd,
    BitwiseOr,
    BitwiseAnd,
    BitwiseXor,
    Comma,
    Assign,
    AddAssign,
    SubAssign,
    MulAssign,
    DivAssign,
    RemAssign,
    PowAssign,
    ShlAssign,
    ShrAssign,
    UShrAssign,
    BitwiseOrAssign,
    BitwiseAndAssign,
    BitwiseXorAssign,
    NullishCoalescingAssign,
    LogicalOrAssign,
    LogicalAndAssign,
}

impl BinaryOp {
    pub fn text(self) -> &'static str {
        use BinaryOp::*;
        match self {
            Add => "+",
            Sub => "-",
            Mul => "*",
            Div => "/",
            Rem => "%",
            Pow => "**",
            Lt => "<",
            Le => "<=",
            Gt => ">",
            Ge => ">=",
            In => "in",
            Instanceof => "instanceof",
            Shl => "<<",
            Shr => ">>",
            UShr => ">>>",
            LooseEq => "==",
            LooseNe => "!=",
            StrictEq => "===",
            StrictNe => "!==",
            NullishCoalescing => "??",
            LogicalOr => "||",
            LogicalAnd => "&&",
            BitwiseOr => "|",
            BitwiseAnd => "&",
            BitwiseXor => "^",
            Comma => ",",
            Assign => "=",
            AddAssign => "+=",
            SubAssign => "-=",
            MulAssign => "*=",
            DivAssign => "/=",
            RemAssign => "%=",
            PowAssign => "**=",
            ShlAssign => "<<=",
            ShrAssign => ">>=",
            UShrAssign => ">>>=",
            BitwiseOrAssign => "|=",
            BitwiseAndAssign => "&=",
            BitwiseXorAssign => "^=",
            NullishCoalescingAssign => "??=",
            LogicalOrAssign => "||=",
            LogicalAndAssign => "&&=",
        }
    }

    /// The precedence level of this operator.
    pub fn level(self) -> Level {
        use BinaryOp::*;
        match self {
            Comma => Level::Comma,
            Assign | AddAssign | SubAssign | MulAssign | DivAssign | RemAssign | PowAssign
            | ShlAssign | ShrAssign | UShrAssign | BitwiseOrAssign | BitwiseAndAssign
            | BitwiseXorAssign | NullishCoalescingAssign | LogicalOrAssign
            | LogicalAndAssign => Level::Assign,
            NullishCoalescing => Level::NullishCoalescing,
            LogicalOr => Level::LogicalOr,
            LogicalAnd => Level::LogicalAnd,
            BitwiseOr => Level::BitwiseOr,
            BitwiseXor => Level::BitwiseXor,
            BitwiseAnd => Level::BitwiseAnd,
            LooseEq | LooseNe | StrictEq | StrictNe => Level::Equals,
            Lt | Le | Gt | Ge | In | Instanceof => Level::Compare,
            Shl | Shr | UShr => Level::Shift,
            Add | Sub => Level::Add,
            Mul | Div | Rem => Level::Multiply,
            Pow => Level::Exponentiation,
        }
    }

    pub fn is_assign(self) -> bool {
        self.level() == Level::Assign
    }

    pub fn is_right_associative(self) -> bool {
        self == BinaryOp::Pow || self.is_assign()
    }
}

/// Object literal property.
#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    pub kind: PropertyKind,
    pub key: PropertyKey,
    /// The value; for `Spread` the spread argument, for methods and
    /// accessors a function expression.
    pub value: Expr,
    /// `{ a = 1 }` when the literal is a destructuring target.
    pub initializer: Option<Expr>,
    pub is_method: bool,
    pub is_shorthand: bool,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyKind {
    Init,
    Get,
    Set,
    Spread,
}

/// Property key in objects, classes and destructuring patterns.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyKey {
    /// Identifier-like name, including reserved words
    Name(String),
    String(String),
    Number(f64),
    BigInt(String),
    Private(String),
    Computed(Box<Expr>),
}

// =============================================================================
// Functions and classes
// =============================================================================

/// A statement list with its scope.
#[derive(Debug, Clone, PartialEq)]
pub struct FnBody {
    pub stmts: Vec<Stmt>,
    pub scope: ScopeId,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    pub name: Option<LocRef>,
    pub params: Vec<Param>,
    pub body: FnBody,
    pub is_async: bool,
    pub is_generator: bool,
    pub args_scope: ScopeId,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Arrow {
    pub params: Vec<Param>,
    pub body: FnBody,
    pub is_async: bool,
    /// The body was a bare expression: print `=> expr`.
    pub prefer_expr: bool,
    pub args_scope: ScopeId,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub binding: Binding,
    pub default: Option<Expr>,
    pub is_rest: bool,
    pub decorators: Vec<Expr>,
    /// `constructor(public x)` shorthand; lowered to `this.x = x`
    pub is_parameter_property: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Class {
    pub name: Option<LocRef>,
    pub extends: Option<Box<Expr>>,
    pub members: Vec<ClassMember>,
    pub decorators: Vec<Expr>,
    pub scope: ScopeId,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ClassMember {
    Method {
        kind: MethodKind,
        key: PropertyKey,
        func: Function,
        is_static: bool,
        decorators: Vec<Expr>,
        span: Span,
    },
    Field {
        key: PropertyKey,
        value: Option<Expr>,
        is_static: bool,
        /// `accessor x = 1`
        is_accessor: bool,
        decorators: Vec<Expr>,
        span: Span,
    },
    StaticBlock {
        body: FnBody,
        span: Span,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MethodKind {
    Method,
    Get,
    Set,
    Constructor,
}

// =============================================================================
// Bindings
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct Binding {
    pub kind: BindingKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum BindingKind {
    Ident(Ref),
    Array {
        items: Vec<ArrayBindingItem>,
        /// The last item is a rest element.
        has_spread: bool,
    },
    Object {
        props: Vec<PropertyBinding>,
    },
    /// Hole in an array pattern
    Missing,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArrayBindingItem {
    pub binding: Binding,
    pub default: Option<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PropertyBinding {
    pub key: PropertyKey,
    pub value: Binding,
    pub default: Option<Expr>,
    pub is_spread: bool,
    /// `{ x }` rather than `{ x: x }`
    pub is_shorthand: bool,
}

impl Binding {
    /// Call `f` on every identifier bound by this pattern.
    pub fn for_each_identifier(&self, f: &mut impl FnMut(Ref, Span)) {
        match &self.kind {
            BindingKind::Ident(r) => f(*r, self.span),
            BindingKind::Array { items, .. } => {
                for item in items {
                    item.binding.for_each_identifier(f);
                }
            }
            BindingKind::Object { props } => {
                for prop in props {
                    prop.value.for_each_identifier(f);
                }
            }
            BindingKind::Missing => {}
        }
    }
}

// =============================================================================
// Statements
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct Stmt {
    pub kind: StmtKind,
    pub span: Span,
}

impl Stmt {
    pub fn new(kind: StmtKind, span: Span) -> Self {
        Self { kind, span }
    }

    pub fn expr(expr: Expr) -> Self {
        let span = expr.span;
        Self::new(StmtKind::Expr(expr), span)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum StmtKind {
    Expr(Expr),
    Local(Local),
    Function {
        func: Function,
        is_export: bool,
    },
    Class {
        class: Class,
        is_export: bool,
    },
    Block(FnBody),
    Empty,
    Debugger,
    Return(Option<Expr>),
    Throw(Expr),
    If {
        test: Expr,
        consequent: Box<Stmt>,
        alternate: Option<Box<Stmt>>,
    },
    For {
        init: Option<Box<Stmt>>,
        test: Option<Expr>,
        update: Option<Expr>,
        body: Box<Stmt>,
        scope: ScopeId,
    },
    ForIn {
        left: Box<Stmt>,
        right: Expr,
        body: Box<Stmt>,
        scope: ScopeId,
    },
    ForOf {
        left: Box<Stmt>,
        right: Expr,
        body: Box<Stmt>,
        is_await: bool,
        scope: ScopeId,
    },
    While {
        test: Expr,
        body: Box<Stmt>,
    },
    DoWhile {
        body: Box<Stmt>,
        test: Expr,
    },
    Labeled {
        label: String,
        body: Box<Stmt>,
    },
    Break(Option<String>),
    Continue(Option<String>),
    Switch {
        discriminant: Expr,
        cases: Vec<SwitchCase>,
        scope: ScopeId,
    },
    Try {
        block: FnBody,
        handler: Option<CatchClause>,
        finalizer: Option<FnBody>,
    },
    With {
        object: Expr,
        body: Box<Stmt>,
        scope: ScopeId,
    },

    // === Modules ===
    Import(Import),
    /// `export { a, b as c }` or `export { a } from "m"`
    ExportClause {
        items: Vec<ExportItem>,
        source: Option<String>,
    },
    /// `export * from "m"` / `export * as ns from "m"`
    ExportStar {
        alias: Option<String>,
        source: String,
    },
    ExportDefault(ExportDefault),
    /// `export = value`
    ExportEquals(Expr),

    // === TypeScript ===
    Namespace(Namespace),
    Enum(Enum),
    /// An erased type-only declaration. Removed by the visit pass.
    TypeScript,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocalKind {
    Var,
    Let,
    Const,
}

impl LocalKind {
    pub fn text(self) -> &'static str {
        match self {
            Self::Var => "var",
            Self::Let => "let",
            Self::Const => "const",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Local {
    pub kind: LocalKind,
    pub decls: Vec<Decl>,
    pub is_export: bool,
    /// Produced by `import x = ...`
    pub was_import_equals: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Decl {
    pub binding: Binding,
    pub value: Option<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SwitchCase {
    /// `None` for `default:`
    pub test: Option<Expr>,
    pub body: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CatchClause {
    pub param: Option<Binding>,
    /// The catch parameter and body share this scope.
    pub body: FnBody,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Import {
    pub default: Option<LocRef>,
    pub namespace: Option<LocRef>,
    /// `None` when there are no braces at all.
    pub items: Option<Vec<ImportItem>>,
    pub source: String,
}

impl Import {
    /// `import "m"`: no clause, kept for its side effects.
    pub fn is_side_effect_only(&self) -> bool {
        self.default.is_none() && self.namespace.is_none() && self.items.is_none()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImportItem {
    /// Name in the source module
    pub imported: String,
    pub local: LocRef,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExportItem {
    /// Local name, or the name in the source module for re-exports
    pub local: Ident,
    pub exported: String,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExportDefault {
    Expr(Expr),
    Function(Function),
    Class(Class),
}

// =============================================================================
// TypeScript declarations
// =============================================================================

/// `namespace name { stmts }`
#[derive(Debug, Clone, PartialEq)]
pub struct Namespace {
    pub name: LocRef,
    /// Formal parameter of the generated closure.
    pub arg: Ref,
    pub stmts: Vec<Stmt>,
    pub is_export: bool,
    pub scope: ScopeId,
}

/// `enum name { values }`
#[derive(Debug, Clone, PartialEq)]
pub struct Enum {
    pub name: LocRef,
    /// Formal parameter of the generated closure.
    pub arg: Ref,
    pub values: Vec<EnumValue>,
    pub is_export: bool,
    pub is_const: bool,
    pub scope: ScopeId,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumValue {
    pub name: String,
    pub span: Span,
    pub value: Option<Expr>,
    /// Present only when the name is a valid identifier.
    pub symbol: Option<Ref>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_ordering() {
        assert!(Level::Lowest < Level::Comma);
        assert!(Level::BitwiseOr < Level::BitwiseAnd);
        assert!(Level::Conditional < Level::BitwiseOr);
        assert!(Level::Prefix > Level::Exponentiation);
        assert_eq!(Level::Assign.lower(), Level::Yield);
    }

    #[test]
    fn test_binary_op_levels() {
        assert_eq!(BinaryOp::Shl.level(), Level::Shift);
        assert_eq!(BinaryOp::LogicalOrAssign.level(), Level::Assign);
        assert!(BinaryOp::Pow.is_right_associative());
        assert!(!BinaryOp::Sub.is_right_associative());
    }

    #[test]
    fn test_join_with_comma() {
        let a = Expr::new(ExprKind::Number(1.0), Span::new(0, 1));
        let b = Expr::new(ExprKind::Number(2.0), Span::new(3, 4));
        let joined = Expr::join_with_comma(vec![a, b]).unwrap();
        assert!(matches!(
            joined.kind,
            ExprKind::Binary {
                op: BinaryOp::Comma,
                ..
            }
        ));
        assert_eq!(joined.span, Span::new(0, 4));
        assert!(Expr::join_with_comma(Vec::new()).is_none());
    }
}
