//! `tsfront check` command implementation.

use super::{print_json, read_source, CommandOutput, ErrorReport};
use crate::error::CliError;
use miette::Result;
use std::path::Path;
use tracing::info;
use tsfront_parser::ParserOptions;

/// Parse and lower a file without printing it.
pub fn run(file: &Path, options: &ParserOptions, json: bool) -> Result<()> {
    let source = read_source(file)?;
    let display = file.display().to_string();
    info!(file = %file.display(), "checking");

    let error = tsfront_parser::parse(&source, options).err();
    if json {
        let ok = error.is_none();
        print_json(&CommandOutput {
            ok,
            file: display,
            output: None,
            out_file: None,
            error: error.as_ref().map(|e| ErrorReport::new(&source, e)),
        })?;
        if !ok {
            std::process::exit(1);
        }
        return Ok(());
    }

    match error {
        None => {
            println!("{display}: ok");
            Ok(())
        }
        Some(error) => Err(CliError::parse(&display, &source, &error).into()),
    }
}
