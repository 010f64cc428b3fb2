//! `[build]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [build]
//! source = "src"              # Site sources, relative to lathe.toml
//! output = "build"            # Output directory
//! clean = true                # Remove output before writing
//! ignore = ["**/*.scss"]      # Globs dropped from the output
//! ```

use std::path::PathBuf;

use glob::Pattern;
use serde::{Deserialize, Serialize};

use crate::config::{ConfigDiagnostics, FieldPath};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    pub source: PathBuf,
    pub output: PathBuf,
    pub clean: bool,
    pub ignore: Vec<String>,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            source: "src".into(),
            output: "build".into(),
            clean: true,
            ignore: vec!["**/*.scss".into()],
        }
    }
}

impl BuildConfig {
    pub const SOURCE: FieldPath = FieldPath::new("build.source");
    pub const OUTPUT: FieldPath = FieldPath::new("build.output");
    pub const IGNORE: FieldPath = FieldPath::new("build.ignore");

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if !self.source.is_dir() {
            diag.error_with_hint(
                Self::SOURCE,
                format!("source directory `{}` does not exist", self.source.display()),
                "create it or point `build.source` at your site sources",
            );
        }

        if self.output == self.source {
            diag.error(Self::OUTPUT, "output directory must differ from source");
        }

        for pattern in &self.ignore {
            if let Err(e) = Pattern::new(pattern) {
                diag.error(Self::IGNORE, format!("invalid glob `{}`: {}", pattern, e));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_parse_config;

    #[test]
    fn test_build_defaults() {
        let config = test_parse_config("");
        assert_eq!(config.build.source, PathBuf::from("src"));
        assert_eq!(config.build.output, PathBuf::from("build"));
        assert!(config.build.clean);
        assert_eq!(config.build.ignore, vec!["**/*.scss"]);
    }

    #[test]
    fn test_build_validate() {
        let config = test_parse_config(
            "[build]\nsource = \"/definitely/not/here\"\nignore = [\"[\", \"**/*.tmp\"]",
        );
        let mut diag = ConfigDiagnostics::new();
        config.build.validate(&mut diag);

        let fields: Vec<_> = diag.errors().iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["build.source", "build.ignore"]);
    }
}
