//! `[style]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [style]
//! browsers = ["last 2 versions", "> 5%"]   # browserslist queries
//! minify = false
//! ```

use lightningcss::targets::Browsers;
use serde::{Deserialize, Serialize};

use crate::config::{ConfigDiagnostics, FieldPath};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleConfig {
    pub enable: bool,
    pub browsers: Vec<String>,
    pub minify: bool,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            enable: true,
            browsers: vec!["last 2 versions".into(), "> 5%".into()],
            minify: false,
        }
    }
}

impl StyleConfig {
    pub const BROWSERS: FieldPath = FieldPath::new("style.browsers");

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if self.browsers.is_empty() {
            return;
        }
        if let Err(e) = Browsers::from_browserslist(&self.browsers) {
            diag.error_with_hint(
                Self::BROWSERS,
                format!("invalid browserslist query: {}", e),
                "see https://browsersl.ist for the query syntax",
            );
        }
    }
}
