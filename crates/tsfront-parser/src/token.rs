//! Token types for JavaScript and TypeScript.
//!
//! Only reserved words get their own token kind. Contextual words such as
//! `let`, `async`, `type`, `namespace` or `declare` are lexed as identifiers
//! and recognized by text at the grammar positions where they matter.

use crate::span::Span;

/// A token with its kind and source location.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
    /// A line terminator appeared between the previous token and this one.
    pub had_newline_before: bool,
}

impl Token {
    /// Create a new token.
    #[inline]
    pub const fn new(kind: TokenKind, span: Span, had_newline_before: bool) -> Self {
        Self {
            kind,
            span,
            had_newline_before,
        }
    }
}

/// The kind of token.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // === Literals ===
    /// Identifier or contextual keyword: `foo`, `type`, `async`
    Identifier(String),
    /// Private name: `#foo` (stored without the `#`)
    PrivateName(String),
    /// String literal with escapes decoded
    String(String),
    /// Number literal: `42`, `3.14`, `0xff`
    Number(f64),
    /// BigInt literal digits without the trailing `n`
    BigInt(String),
    /// Regular expression: `/pattern/flags`
    Regex { pattern: String, flags: String },
    /// Template literal without substitutions (raw text)
    TemplateNoSub(String),
    /// Template head: `` `hello ${``
    TemplateHead(String),
    /// Template middle: `` } middle ${``
    TemplateMiddle(String),
    /// Template tail: `` } end` ``
    TemplateTail(String),

    // === Reserved words ===
    Break,
    Case,
    Catch,
    Class,
    Const,
    Continue,
    Debugger,
    Default,
    Delete,
    Do,
    Else,
    Enum,
    Export,
    Extends,
    False,
    Finally,
    For,
    Function,
    If,
    Import,
    In,
    Instanceof,
    New,
    Null,
    Return,
    Super,
    Switch,
    This,
    Throw,
    True,
    Try,
    Typeof,
    Var,
    Void,
    While,
    With,

    // === Punctuation ===
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Semicolon,
    Comma,
    Colon,
    Question,
    QuestionDot,
    Dot,
    DotDotDot,
    Arrow,
    At,
    Tilde,

    // === Operators ===
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    StarStar,
    PlusPlus,
    MinusMinus,
    Lt,
    Gt,
    LtEq,
    GtEq,
    EqEq,
    EqEqEq,
    BangEq,
    BangEqEq,
    Amp,
    Pipe,
    Caret,
    Bang,
    LtLt,
    GtGt,
    GtGtGt,
    AmpAmp,
    PipePipe,
    QuestionQuestion,

    // === Assignment ===
    Eq,
    PlusEq,
    MinusEq,
    StarEq,
    SlashEq,
    PercentEq,
    StarStarEq,
    LtLtEq,
    GtGtEq,
    GtGtGtEq,
    AmpEq,
    PipeEq,
    CaretEq,
    AmpAmpEq,
    PipePipeEq,
    QuestionQuestionEq,

    Eof,
}

impl TokenKind {
    /// The text of a reserved word, if this is one.
    pub fn keyword_text(&self) -> Option<&'static str> {
        Some(match self {
            Self::Break => "break",
            Self::Case => "case",
            Self::Catch => "catch",
            Self::Class => "class",
            Self::Const => "const",
            Self::Continue => "continue",
            Self::Debugger => "debugger",
            Self::Default => "default",
            Self::Delete => "delete",
            Self::Do => "do",
            Self::Else => "else",
            Self::Enum => "enum",
            Self::Export => "export",
            Self::Extends => "extends",
            Self::False => "false",
            Self::Finally => "finally",
            Self::For => "for",
            Self::Function => "function",
            Self::If => "if",
            Self::Import => "import",
            Self::In => "in",
            Self::Instanceof => "instanceof",
            Self::New => "new",
            Self::Null => "null",
            Self::Return => "return",
            Self::Super => "super",
            Self::Switch => "switch",
            Self::This => "this",
            Self::Throw => "throw",
            Self::True => "true",
            Self::Try => "try",
            Self::Typeof => "typeof",
            Self::Var => "var",
            Self::Void => "void",
            Self::While => "while",
            Self::With => "with",
            _ => return None,
        })
    }

    /// Source text of a fixed-spelling token, for diagnostics.
    pub fn fixed_text(&self) -> Option<&'static str> {
        if let Some(text) = self.keyword_text() {
            return Some(text);
        }
        Some(match self {
            Self::LParen => "(",
            Self::RParen => ")",
            Self::LBrace => "{",
            Self::RBrace => "}",
            Self::LBracket => "[",
            Self::RBracket => "]",
            Self::Semicolon => ";",
            Self::Comma => ",",
            Self::Colon => ":",
            Self::Question => "?",
            Self::QuestionDot => "?.",
            Self::Dot => ".",
            Self::DotDotDot => "...",
            Self::Arrow => "=>",
            Self::At => "@",
            Self::Tilde => "~",
            Self::Plus => "+",
            Self::Minus => "-",
            Self::Star => "*",
            Self::Slash => "/",
            Self::Percent => "%",
            Self::StarStar => "**",
            Self::PlusPlus => "++",
            Self::MinusMinus => "--",
            Self::Lt => "<",
            Self::Gt => ">",
            Self::LtEq => "<=",
            Self::GtEq => ">=",
            Self::EqEq => "==",
            Self::EqEqEq => "===",
            Self::BangEq => "!=",
            Self::BangEqEq => "!==",
            Self::Amp => "&",
            Self::Pipe => "|",
            Self::Caret => "^",
            Self::Bang => "!",
            Self::LtLt => "<<",
            Self::GtGt => ">>",
            Self::GtGtGt => ">>>",
            Self::AmpAmp => "&&",
            Self::PipePipe => "||",
            Self::QuestionQuestion => "??",
            Self::Eq => "=",
            Self::PlusEq => "+=",
            Self::MinusEq => "-=",
            Self::StarEq => "*=",
            Self::SlashEq => "/=",
            Self::PercentEq => "%=",
            Self::StarStarEq => "**=",
            Self::LtLtEq => "<<=",
            Self::GtGtEq => ">>=",
            Self::GtGtGtEq => ">>>=",
            Self::AmpEq => "&=",
            Self::PipeEq => "|=",
            Self::CaretEq => "^=",
            Self::AmpAmpEq => "&&=",
            Self::PipePipeEq => "||=",
            Self::QuestionQuestionEq => "??=",
            _ => return None,
        })
    }

    /// Check if this token is a reserved word.
    pub fn is_keyword(&self) -> bool {
        self.keyword_text().is_some()
    }

    /// The name carried by an identifier or reserved word, as used in
    /// property-name positions (`a.if`, `{ class: 1 }`).
    pub fn identifier_or_keyword(&self) -> Option<&str> {
        match self {
            Self::Identifier(name) => Some(name),
            other => other.keyword_text(),
        }
    }

    /// Check if this is an assignment operator.
    pub fn is_assignment(&self) -> bool {
        matches!(
            self,
            Self::Eq
                | Self::PlusEq
                | Self::MinusEq
                | Self::StarEq
                | Self::SlashEq
                | Self::PercentEq
                | Self::StarStarEq
                | Self::LtLtEq
                | Self::GtGtEq
                | Self::GtGtGtEq
                | Self::AmpEq
                | Self::PipeEq
                | Self::CaretEq
                | Self::AmpAmpEq
                | Self::PipePipeEq
                | Self::QuestionQuestionEq
        )
    }

    /// Check if this token can start an expression.
    pub fn can_start_expr(&self) -> bool {
        matches!(
            self,
            Self::Identifier(_)
                | Self::PrivateName(_)
                | Self::String(_)
                | Self::Number(_)
                | Self::BigInt(_)
                | Self::Regex { .. }
                | Self::TemplateNoSub(_)
                | Self::TemplateHead(_)
                | Self::LParen
                | Self::LBracket
                | Self::LBrace
                | Self::Function
                | Self::Class
                | Self::New
                | Self::Delete
                | Self::Typeof
                | Self::Void
                | Self::This
                | Self::Super
                | Self::Null
                | Self::True
                | Self::False
                | Self::Import
                | Self::Plus
                | Self::Minus
                | Self::Bang
                | Self::Tilde
                | Self::PlusPlus
                | Self::MinusMinus
                | Self::Slash
                | Self::SlashEq
                | Self::Lt
                | Self::At
                | Self::DotDotDot
        )
    }
}

/// Look up a reserved word.
pub fn keyword_from_str(s: &str) -> Option<TokenKind> {
    Some(match s {
        "break" => TokenKind::Break,
        "case" => TokenKind::Case,
        "catch" => TokenKind::Catch,
        "class" => TokenKind::Class,
        "const" => TokenKind::Const,
        "continue" => TokenKind::Continue,
        "debugger" => TokenKind::Debugger,
        "default" => TokenKind::Default,
        "delete" => TokenKind::Delete,
        "do" => TokenKind::Do,
        "else" => TokenKind::Else,
        "enum" => TokenKind::Enum,
        "export" => TokenKind::Export,
        "extends" => TokenKind::Extends,
        "false" => TokenKind::False,
        "finally" => TokenKind::Finally,
        "for" => TokenKind::For,
        "function" => TokenKind::Function,
        "if" => TokenKind::If,
        "import" => TokenKind::Import,
        "in" => TokenKind::In,
        "instanceof" => TokenKind::Instanceof,
        "new" => TokenKind::New,
        "null" => TokenKind::Null,
        "return" => TokenKind::Return,
        "super" => TokenKind::Super,
        "switch" => TokenKind::Switch,
        "this" => TokenKind::This,
        "throw" => TokenKind::Throw,
        "true" => TokenKind::True,
        "try" => TokenKind::Try,
        "typeof" => TokenKind::Typeof,
        "var" => TokenKind::Var,
        "void" => TokenKind::Void,
        "while" => TokenKind::While,
        "with" => TokenKind::With,
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_lookup_round_trips() {
        for word in ["break", "enum", "typeof", "with", "instanceof"] {
            let kind = keyword_from_str(word).unwrap();
            assert_eq!(kind.keyword_text(), Some(word));
        }
        assert_eq!(keyword_from_str("namespace"), None);
        assert_eq!(keyword_from_str("let"), None);
    }

    #[test]
    fn test_identifier_or_keyword() {
        assert_eq!(
            TokenKind::Identifier("type".into()).identifier_or_keyword(),
            Some("type")
        );
        assert_eq!(TokenKind::Class.identifier_or_keyword(), Some("class"));
        assert_eq!(TokenKind::Comma.identifier_or_keyword(), None);
    }
}
