//! `[site]` section configuration.
//!
//! Site-wide values exposed to every layout as `site`. Keys other than the
//! known ones are kept and passed through unchanged.
//!
//! # Example
//!
//! ```toml
//! [site]
//! title = "My Blog"
//! description = "Notes and posts"
//! url = "https://example.com"
//! twitter = "@me"              # available as {{ site.twitter }}
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteSection {
    pub title: String,
    pub description: String,
    pub url: Option<String>,

    /// Free-form keys.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SiteSection {
    /// Template view of the section.
    pub fn to_value(&self) -> Value {
        let mut map = self.extra.clone();
        map.insert("title".into(), Value::String(self.title.clone()));
        map.insert(
            "description".into(),
            Value::String(self.description.clone()),
        );
        map.insert(
            "url".into(),
            self.url.clone().map_or(Value::Null, Value::String),
        );
        Value::Object(map)
    }
}

#[cfg(test)]
mod tests {
    use crate::config::test_parse_config;
    use serde_json::json;

    #[test]
    fn test_site_extra_keys() {
        let config = test_parse_config("url = \"https://example.com\"\ntwitter = \"@me\"\n[site.social]\nmastodon = \"@me@x\"");

        assert_eq!(config.site.title, "Test");
        assert_eq!(config.site.url.as_deref(), Some("https://example.com"));

        let value = config.site.to_value();
        assert_eq!(value["title"], "Test");
        assert_eq!(value["twitter"], "@me");
        assert_eq!(value["social"], json!({ "mastodon": "@me@x" }));
    }

    #[test]
    fn test_site_url_absent_is_null() {
        let config = test_parse_config("");
        assert_eq!(config.site.to_value()["url"], serde_json::Value::Null);
    }
}
