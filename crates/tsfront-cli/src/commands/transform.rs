//! `tsfront transform` command implementation.
//!
//! Parses a file, lowers TypeScript and prints JavaScript to stdout or to
//! the output file.

use super::{print_json, read_source, CommandOutput, ErrorReport};
use crate::error::CliError;
use miette::Result;
use std::path::Path;
use tracing::{debug, info};
use tsfront_parser::TransformOptions;

/// Run the transform command.
pub fn run(file: &Path, out: Option<&Path>, options: &TransformOptions, json: bool) -> Result<()> {
    let source = read_source(file)?;
    let display = file.display().to_string();
    info!(file = %file.display(), typescript = options.parser.typescript, "transforming");

    let js = match tsfront_parser::transform(&source, options) {
        Ok(js) => js,
        Err(error) => {
            if json {
                print_json(&CommandOutput {
                    ok: false,
                    file: display,
                    output: None,
                    out_file: None,
                    error: Some(ErrorReport::new(&source, &error)),
                })?;
                std::process::exit(1);
            }
            return Err(CliError::parse(&display, &source, &error).into());
        }
    };
    debug!(bytes = js.len(), "generated output");

    if let Some(out) = out {
        std::fs::write(out, &js).map_err(|source| CliError::Io {
            path: out.to_path_buf(),
            source,
        })?;
    }

    if json {
        print_json(&CommandOutput {
            ok: true,
            file: display,
            output: out.is_none().then_some(js),
            out_file: out.map(|path| path.display().to_string()),
            error: None,
        })
    } else {
        if out.is_none() {
            print!("{js}");
        }
        Ok(())
    }
}
