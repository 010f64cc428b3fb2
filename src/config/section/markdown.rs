//! `[markdown]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [markdown]
//! enable = true
//! tables = true
//! footnotes = true
//! strikethrough = true
//! task_lists = true
//! smart_punctuation = false   # "quotes" → “quotes”
//! heading_attributes = false  # # Title {#id .class}
//! ```

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkdownConfig {
    pub enable: bool,
    pub tables: bool,
    pub footnotes: bool,
    pub strikethrough: bool,
    pub task_lists: bool,
    pub smart_punctuation: bool,
    pub heading_attributes: bool,
}

impl Default for MarkdownConfig {
    fn default() -> Self {
        Self {
            enable: true,
            tables: true,
            footnotes: true,
            strikethrough: true,
            task_lists: true,
            smart_punctuation: false,
            heading_attributes: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::config::test_parse_config;

    #[test]
    fn test_markdown_partial_override() {
        let config = test_parse_config("[markdown]\nsmart_punctuation = true\ntables = false");
        assert!(config.markdown.enable);
        assert!(config.markdown.smart_punctuation);
        assert!(!config.markdown.tables);
        assert!(config.markdown.footnotes);
    }
}
