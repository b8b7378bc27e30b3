use serde::{Deserialize, Serialize};

/// Parser configuration options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserOptions {
    /// Accept TypeScript syntax and lower it.
    pub typescript: bool,

    /// Keep class fields that have no initializer (`x: number;`) instead of
    /// erasing them.
    pub use_define_for_class_fields: bool,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            typescript: true,
            use_define_for_class_fields: false,
        }
    }
}

impl ParserOptions {
    /// Options for plain JavaScript input.
    #[must_use]
    pub fn javascript() -> Self {
        Self {
            typescript: false,
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_typescript(mut self, typescript: bool) -> Self {
        self.typescript = typescript;
        self
    }

    #[must_use]
    pub fn with_use_define_for_class_fields(mut self, enabled: bool) -> Self {
        self.use_define_for_class_fields = enabled;
        self
    }
}

/// Printer configuration options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrintOptions {
    /// Drop all optional whitespace.
    pub minify: bool,

    /// Indent string (default: two spaces).
    pub indent: String,
}

impl Default for PrintOptions {
    fn default() -> Self {
        Self {
            minify: false,
            indent: "  ".to_string(),
        }
    }
}

impl PrintOptions {
    #[must_use]
    pub fn with_minify(mut self, minify: bool) -> Self {
        self.minify = minify;
        self
    }

    #[must_use]
    pub fn with_indent(mut self, indent: impl Into<String>) -> Self {
        self.indent = indent.into();
        self
    }
}

/// Everything `transform` needs, loadable from a JSON config file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformOptions {
    pub parser: ParserOptions,
    pub print: PrintOptions,
}

impl TransformOptions {
    #[must_use]
    pub fn with_parser(mut self, parser: ParserOptions) -> Self {
        self.parser = parser;
        self
    }

    #[must_use]
    pub fn with_print(mut self, print: PrintOptions) -> Self {
        self.print = print;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let opts = TransformOptions::default();
        assert!(opts.parser.typescript);
        assert!(!opts.parser.use_define_for_class_fields);
        assert!(!opts.print.minify);
        assert_eq!(opts.print.indent, "  ");
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let opts: TransformOptions =
            serde_json::from_str(r#"{ "print": { "minify": true } }"#).unwrap();
        assert!(opts.print.minify);
        assert_eq!(opts.print.indent, "  ");
        assert!(opts.parser.typescript);
    }

    #[test]
    fn test_builders() {
        let opts = ParserOptions::javascript().with_use_define_for_class_fields(true);
        assert!(!opts.typescript);
        assert!(opts.use_define_for_class_fields);
    }
}
