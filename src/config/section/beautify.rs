//! `[beautify]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [beautify]
//! indent_size = 2
//! indent_char = " "           # or "\t"
//! end_with_newline = true
//! html = true
//! css = true
//! ```

use serde::{Deserialize, Serialize};

use crate::config::{ConfigDiagnostics, FieldPath};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BeautifyConfig {
    pub enable: bool,
    pub indent_size: usize,
    pub indent_char: String,
    pub end_with_newline: bool,
    pub html: bool,
    pub css: bool,
}

impl Default for BeautifyConfig {
    fn default() -> Self {
        Self {
            enable: true,
            indent_size: 2,
            indent_char: " ".into(),
            end_with_newline: true,
            html: true,
            css: true,
        }
    }
}

impl BeautifyConfig {
    pub const INDENT_SIZE: FieldPath = FieldPath::new("beautify.indent_size");
    pub const INDENT_CHAR: FieldPath = FieldPath::new("beautify.indent_char");

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if self.indent_size == 0 {
            diag.error(Self::INDENT_SIZE, "must be greater than 0");
        }
        if self.indent_char.chars().count() != 1 {
            diag.error_with_hint(
                Self::INDENT_CHAR,
                format!("must be a single character, got {:?}", self.indent_char),
                "use \" \" or \"\\t\"",
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_parse_config;

    #[test]
    fn test_beautify_tabs() {
        let config = test_parse_config("[beautify]\nindent_size = 1\nindent_char = \"\\t\"");
        assert_eq!(config.beautify.indent_char, "\t");
        let mut diag = ConfigDiagnostics::new();
        config.beautify.validate(&mut diag);
        assert!(diag.is_empty());
    }

    #[test]
    fn test_beautify_invalid() {
        let config = test_parse_config("[beautify]\nindent_size = 0\nindent_char = \"--\"");
        let mut diag = ConfigDiagnostics::new();
        config.beautify.validate(&mut diag);
        let fields: Vec<_> = diag.errors().iter().map(|e| e.field).collect();
        assert_eq!(
            fields,
            vec![BeautifyConfig::INDENT_SIZE, BeautifyConfig::INDENT_CHAR]
        );
    }
}
