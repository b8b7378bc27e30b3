//! Command implementations.

pub mod check;
pub mod transform;

use crate::error::CliError;
use serde::Serialize;
use std::path::Path;
use tsfront_parser::{LineIndex, ParseError};

/// The JSON object printed by every command with `--json`.
#[derive(Serialize)]
pub struct CommandOutput {
    pub ok: bool,
    pub file: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub out_file: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorReport>,
}

#[derive(Serialize)]
pub struct ErrorReport {
    pub kind: String,
    pub message: String,
    pub line: u32,
    pub column: u32,
}

impl ErrorReport {
    pub fn new(source: &str, error: &ParseError) -> Self {
        let (line, column) = LineIndex::new(source).line_col(error.span.start);
        Self {
            kind: error.kind.as_str().to_string(),
            message: error.message.clone(),
            line,
            column,
        }
    }
}

pub fn read_source(file: &Path) -> Result<String, CliError> {
    std::fs::read_to_string(file).map_err(|source| CliError::Io {
        path: file.to_path_buf(),
        source,
    })
}

/// Print a command result as pretty JSON on stdout.
pub fn print_json(output: &CommandOutput) -> miette::Result<()> {
    let text = serde_json::to_string_pretty(output)
        .map_err(|e| miette::miette!("Failed to serialize output: {}", e))?;
    println!("{text}");
    Ok(())
}
