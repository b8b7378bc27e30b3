//! Parse errors and the per-parser diagnostic log.

use crate::span::Span;
use thiserror::Error;

/// Result alias used throughout the parser.
pub type Result<T> = std::result::Result<T, ParseError>;

/// Which class of failure stopped the parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Unexpected token, malformed type, TypeScript syntax in a disallowed position.
    Syntax,
    /// Duplicate incompatible symbol, assignment to an `import =` binding,
    /// decorator on a constructor.
    Declaration,
}

impl ErrorKind {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Syntax => "syntax",
            Self::Declaration => "declaration",
        }
    }
}

/// A fatal parse error. Parsing stops at the first one.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{message} at {}..{}", .span.start, .span.end)]
pub struct ParseError {
    pub kind: ErrorKind,
    pub message: String,
    pub span: Span,
}

impl ParseError {
    /// Create a syntax error.
    pub fn syntax(message: impl Into<String>, span: Span) -> Self {
        Self {
            kind: ErrorKind::Syntax,
            message: message.into(),
            span,
        }
    }

    /// Create a declaration error.
    pub fn declaration(message: impl Into<String>, span: Span) -> Self {
        Self {
            kind: ErrorKind::Declaration,
            message: message.into(),
            span,
        }
    }
}

/// Errors reported during one parse.
///
/// While `suppressed` is set (inside a speculative attempt) nothing is
/// recorded; the error value still flows back to the attempt so it can
/// rewind.
#[derive(Debug, Default)]
pub struct Log {
    messages: Vec<ParseError>,
    suppressed: bool,
}

impl Log {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an error unless reporting is suppressed, and hand it back.
    pub fn report(&mut self, error: ParseError) -> ParseError {
        if !self.suppressed {
            self.messages.push(error.clone());
        }
        error
    }

    pub fn is_suppressed(&self) -> bool {
        self.suppressed
    }

    pub fn set_suppressed(&mut self, suppressed: bool) {
        self.suppressed = suppressed;
    }

    /// All errors reported so far.
    pub fn messages(&self) -> &[ParseError] {
        &self.messages
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = ParseError::syntax("Unexpected \")\"", Span::new(4, 5));
        assert_eq!(err.to_string(), "Unexpected \")\" at 4..5");
        assert_eq!(err.kind, ErrorKind::Syntax);
    }

    #[test]
    fn test_suppressed_log_records_nothing() {
        let mut log = Log::new();
        log.set_suppressed(true);
        let err = log.report(ParseError::syntax("x", Span::empty(0)));
        assert_eq!(err.message, "x");
        assert!(log.messages().is_empty());

        log.set_suppressed(false);
        log.report(ParseError::declaration("y", Span::empty(1)));
        assert_eq!(log.messages().len(), 1);
        assert_eq!(log.messages()[0].kind, ErrorKind::Declaration);
    }
}
