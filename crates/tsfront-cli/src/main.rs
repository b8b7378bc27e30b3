#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

mod commands;
mod config;
mod error;
mod logging;

use clap::Parser;
use miette::Result;
use std::path::PathBuf;
use tracing::debug;
use tsfront_parser::TransformOptions;

#[derive(Parser, Debug)]
#[command(name = "tsfront")]
#[command(
    author,
    version,
    about = "Strip TypeScript types and lower namespaces and enums",
    long_about = None
)]
struct Cli {
    /// Increase logging verbosity (-v for DEBUG, -vv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Emit JSON formatted output (stable, machine-readable)
    #[arg(long, global = true)]
    json: bool,

    /// Read options from this JSON file (default: tsfront.json when present)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Parse plain JavaScript; type syntax becomes an error
    #[arg(long, global = true)]
    js: bool,

    /// Minify the printed output
    #[arg(long, global = true)]
    minify: bool,

    /// Keep class fields that have no initializer
    #[arg(long, global = true)]
    define_class_fields: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Parse, lower and print a file as JavaScript
    Transform {
        /// The TypeScript or JavaScript file
        file: PathBuf,

        /// Output file (if not specified, prints to stdout)
        #[arg(long, short = 'o')]
        outfile: Option<PathBuf>,
    },

    /// Parse and lower a file, reporting the first error
    Check {
        /// The TypeScript or JavaScript file
        file: PathBuf,
    },
}

impl Cli {
    /// Flags override whatever the config file says.
    fn apply_overrides(&self, mut options: TransformOptions) -> TransformOptions {
        if self.js {
            options.parser.typescript = false;
        }
        if self.define_class_fields {
            options.parser.use_define_for_class_fields = true;
        }
        if self.minify {
            options.print.minify = true;
        }
        options
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose, cli.json);

    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let options = cli.apply_overrides(config::load(&cwd, cli.config.as_deref())?);
    debug!(?options, "resolved options");

    match &cli.command {
        Commands::Transform { file, outfile } => {
            commands::transform::run(file, outfile.as_deref(), &options, cli.json)
        }
        Commands::Check { file } => commands::check::run(file, &options.parser, cli.json),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_config() {
        let cli = Cli::parse_from(["tsfront", "--js", "--minify", "check", "a.js"]);
        let options = cli.apply_overrides(TransformOptions::default());
        assert!(!options.parser.typescript);
        assert!(options.print.minify);
        assert!(!options.parser.use_define_for_class_fields);
    }

    #[test]
    fn test_transform_args() {
        let cli = Cli::parse_from(["tsfront", "-vv", "transform", "in.ts", "-o", "out.js"]);
        assert_eq!(cli.verbose, 2);
        let Commands::Transform { file, outfile } = cli.command else {
            panic!("expected transform");
        };
        assert_eq!(file, PathBuf::from("in.ts"));
        assert_eq!(outfile, Some(PathBuf::from("out.js")));
    }
}
