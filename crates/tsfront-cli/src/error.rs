//! CLI error type, rendered through miette.

use miette::{Diagnostic, NamedSource, SourceSpan};
use std::path::PathBuf;
use thiserror::Error;
use tsfront_parser::{LineIndex, ParseError};

#[derive(Error, Debug, Diagnostic)]
pub enum CliError {
    #[error("Failed to access {path}: {source}")]
    #[diagnostic(code(tsfront::io))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read config at {path}: {source}")]
    #[diagnostic(code(tsfront::config))]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config at {path}: {source}")]
    #[diagnostic(code(tsfront::config))]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("{kind} error: {message} ({line}:{column})")]
    #[diagnostic(code(tsfront::parse))]
    Parse {
        kind: &'static str,
        message: String,
        line: u32,
        column: u32,
        #[source_code]
        src: NamedSource<String>,
        #[label("here")]
        span: SourceSpan,
    },
}

impl CliError {
    /// Attach the file name, source text and line/column to a parse error.
    pub fn parse(path: &str, source: &str, error: &ParseError) -> Self {
        let (line, column) = LineIndex::new(source).line_col(error.span.start);
        let start = error.span.start as usize;
        let len = error.span.len() as usize;
        Self::Parse {
            kind: error.kind.as_str(),
            message: error.message.clone(),
            line,
            column,
            src: NamedSource::new(path, source.to_string()),
            span: (start, len).into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tsfront_parser::{transform, TransformOptions};

    #[test]
    fn test_parse_error_has_line_and_column() {
        let source = "let a = 1;\nlet = ;";
        let err = transform(source, &TransformOptions::default()).unwrap_err();
        let CliError::Parse {
            line, column, kind, ..
        } = CliError::parse("a.ts", source, &err)
        else {
            panic!("expected parse error");
        };
        assert_eq!(kind, "syntax");
        assert_eq!(line, 2);
        assert!(column >= 1);
    }
}
