//! `[deploy]` section configuration.
//!
//! Controls the `deploy` stage group, which only `lathe build` runs.
//!
//! ```toml
//! [deploy]
//! relative_links = true       # href="/x" → href="../.././x" per file depth
//! ```

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeployConfig {
    /// Rewrite root-relative `href`s so the output works from any sub-path.
    pub relative_links: bool,
}

impl Default for DeployConfig {
    fn default() -> Self {
        Self {
            relative_links: true,
        }
    }
}
