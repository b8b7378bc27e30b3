//! Loading `TransformOptions` from a JSON config file.

use crate::error::CliError;
use std::path::{Path, PathBuf};
use tracing::debug;
use tsfront_parser::TransformOptions;

/// Config file picked up from the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "tsfront.json";

/// Load options from `explicit`, or from `tsfront.json` in `cwd` when it
/// exists, or fall back to the defaults.
pub fn load(cwd: &Path, explicit: Option<&Path>) -> Result<TransformOptions, CliError> {
    let path: PathBuf = match explicit {
        Some(path) => path.to_path_buf(),
        None => {
            let path = cwd.join(DEFAULT_CONFIG_FILE);
            if !path.is_file() {
                debug!("no config file, using defaults");
                return Ok(TransformOptions::default());
            }
            path
        }
    };

    let text = std::fs::read_to_string(&path).map_err(|source| CliError::ConfigRead {
        path: path.clone(),
        source,
    })?;
    let options = serde_json::from_str(&text).map_err(|source| CliError::ConfigParse {
        path: path.clone(),
        source,
    })?;
    debug!(path = %path.display(), "loaded config");
    Ok(options)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_default_config_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(load(dir.path(), None).unwrap(), TransformOptions::default());
    }

    #[test]
    fn test_default_config_file_is_read() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(DEFAULT_CONFIG_FILE),
            r#"{"print": {"minify": true}}"#,
        )
        .unwrap();
        let options = load(dir.path(), None).unwrap();
        assert!(options.print.minify);
        assert!(options.parser.typescript);
    }

    #[test]
    fn test_explicit_config_errors() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.json");
        assert!(matches!(load(dir.path(), Some(&missing)), Err(CliError::ConfigRead { .. })));

        let bad = dir.path().join("bad.json");
        std::fs::write(&bad, "{").unwrap();
        assert!(matches!(load(dir.path(), Some(&bad)), Err(CliError::ConfigParse { .. })));
    }
}
