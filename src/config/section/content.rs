//! `[content]` section configuration.
//!
//! ```toml
//! [content]
//! records = "content.json"    # JSON array of content records
//! ```
//!
//! A missing records file means the site has no content records.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentConfig {
    pub records: PathBuf,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            records: "content.json".into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_parse_config;

    #[test]
    fn test_content_records_path() {
        assert_eq!(test_parse_config("").content.records, PathBuf::from("content.json"));
        let config = test_parse_config("[content]\nrecords = \"cms/export.json\"");
        assert_eq!(config.content.records, PathBuf::from("cms/export.json"));
    }
}
