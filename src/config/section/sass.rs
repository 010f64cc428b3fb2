//! `[sass]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [sass]
//! output_dir = "style"          # compiled `<stem>.css` lands here
//! load_paths = ["node_modules"] # searched after the file's own directory
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Component, Path, PathBuf};

use crate::config::{ConfigDiagnostics, FieldPath};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SassConfig {
    pub enable: bool,
    pub output_dir: String,
    pub load_paths: Vec<PathBuf>,
}

impl Default for SassConfig {
    fn default() -> Self {
        Self {
            enable: true,
            output_dir: "style".into(),
            load_paths: Vec::new(),
        }
    }
}

impl SassConfig {
    pub const OUTPUT_DIR: FieldPath = FieldPath::new("sass.output_dir");

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        let escapes = Path::new(&self.output_dir)
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if escapes {
            diag.error_with_hint(
                Self::OUTPUT_DIR,
                format!("must stay inside the output directory, got `{}`", self.output_dir),
                "use a relative path such as \"style\"",
            );
        }
    }
}
