//! `[layouts]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [layouts]
//! directory = "layouts"       # Layout templates, relative to lathe.toml
//! partials = "partials"       # Includable fragments
//! pattern = "**/*.html"       # Output files eligible for a layout
//! default = "page.html"       # Layout for pages without `layout`
//! ```

use std::path::PathBuf;

use glob::Pattern;
use serde::{Deserialize, Serialize};

use crate::config::{ConfigDiagnostics, FieldPath};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutsConfig {
    pub enable: bool,
    pub directory: PathBuf,
    pub partials: PathBuf,
    pub pattern: String,
    pub default: Option<String>,
}

impl Default for LayoutsConfig {
    fn default() -> Self {
        Self {
            enable: true,
            directory: "layouts".into(),
            partials: "partials".into(),
            pattern: "**/*.html".into(),
            default: None,
        }
    }
}

impl LayoutsConfig {
    pub const PATTERN: FieldPath = FieldPath::new("layouts.pattern");

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if let Err(e) = Pattern::new(&self.pattern) {
            diag.error(Self::PATTERN, format!("invalid glob `{}`: {}", self.pattern, e));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_parse_config;

    #[test]
    fn test_layouts_config() {
        let config = test_parse_config("[layouts]\ndirectory = \"tpl\"\ndefault = \"page.html\"");
        assert_eq!(config.layouts.directory, PathBuf::from("tpl"));
        assert_eq!(config.layouts.partials, PathBuf::from("partials"));
        assert_eq!(config.layouts.pattern, "**/*.html");
        assert_eq!(config.layouts.default.as_deref(), Some("page.html"));
    }

    #[test]
    fn test_layouts_invalid_pattern() {
        let config = test_parse_config("[layouts]\npattern = \"**/[.html\"");
        let mut diag = ConfigDiagnostics::new();
        config.layouts.validate(&mut diag);
        assert_eq!(diag.len(), 1);
    }
}
