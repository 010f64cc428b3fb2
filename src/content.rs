//! Content records exported from the content-management source.
//!
//! Records arrive as a JSON array (the `[content] records` file):
//!
//! ```json
//! [
//!   { "type": "home", "uid": "home", "data": { "title": "Welcome" } },
//!   { "type": "blog-post", "uid": "my-first-post", "data": {
//!       "title": "Hello",
//!       "author": { "link_type": "Document", "type": "author", "uid": "bob" }
//!   } }
//! ]
//! ```
//!
//! A record with `data` is a listing entry (it renders as a full page). A
//! nested document link has no `data` and only ever resolves to a directory
//! path.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::debug;
use crate::link::LinkResolver;

/// `link_type` value marking a nested JSON object as a document link.
const DOCUMENT_LINK_TYPE: &str = "Document";

#[derive(Debug, Error)]
pub enum ContentError {
    #[error("IO error when reading `{0}`")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("invalid content records in `{0}`")]
    Parse(PathBuf, #[source] serde_json::Error),
}

/// One content item.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContentRecord {
    #[serde(rename = "type")]
    pub record_type: String,

    #[serde(default)]
    pub uid: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,

    #[serde(default, rename = "isBroken")]
    pub is_broken: bool,

    /// Page body. Present only for listing entries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl ContentRecord {
    pub fn new(record_type: impl Into<String>, uid: impl Into<String>) -> Self {
        Self {
            record_type: record_type.into(),
            uid: uid.into(),
            ..Self::default()
        }
    }

    pub fn with_slug(mut self, slug: impl Into<String>) -> Self {
        self.slug = Some(slug.into());
        self
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    pub fn broken(mut self) -> Self {
        self.is_broken = true;
        self
    }

    /// Whether this record renders as a full page rather than a bare link.
    #[inline]
    pub fn is_listing_entry(&self) -> bool {
        self.data.is_some()
    }

    /// Path identifier: `uid` when set, `slug` otherwise.
    pub fn identifier(&self) -> &str {
        if !self.uid.is_empty() {
            return &self.uid;
        }
        self.slug.as_deref().unwrap_or_default()
    }

    /// Interpret a JSON object as a document link, if it is one.
    pub fn from_link_object(object: &Map<String, Value>) -> Option<Self> {
        if object.get("link_type").and_then(Value::as_str) != Some(DOCUMENT_LINK_TYPE) {
            return None;
        }
        let text = |key: &str| object.get(key).and_then(Value::as_str).map(str::to_owned);

        Some(Self {
            record_type: text("type")?,
            uid: text("uid").unwrap_or_default(),
            slug: text("slug"),
            is_broken: object
                .get("isBroken")
                .and_then(Value::as_bool)
                .unwrap_or(false),
            data: None,
        })
    }

    /// Serialize the record for templates, with `url` filled in for the
    /// record and every document link nested in its data.
    pub fn annotate(&self, resolver: &dyn LinkResolver) -> Value {
        let mut object = Map::new();
        object.insert("type".into(), Value::String(self.record_type.clone()));
        object.insert("uid".into(), Value::String(self.uid.clone()));
        if let Some(slug) = &self.slug {
            object.insert("slug".into(), Value::String(slug.clone()));
        }
        object.insert("isBroken".into(), Value::Bool(self.is_broken));
        object.insert("url".into(), url_value(resolver.resolve(self)));

        if let Some(data) = &self.data {
            let mut data = data.clone();
            annotate_links(&mut data, resolver);
            object.insert("data".into(), data);
        }

        Value::Object(object)
    }
}

fn url_value(url: Option<String>) -> Value {
    url.map_or(Value::Null, Value::String)
}

/// Add `url` to every document link found under `value`.
pub fn annotate_links(value: &mut Value, resolver: &dyn LinkResolver) {
    match value {
        Value::Object(object) => {
            if let Some(link) = ContentRecord::from_link_object(object) {
                object.insert("url".into(), url_value(resolver.resolve(&link)));
            }
            for child in object.values_mut() {
                annotate_links(child, resolver);
            }
        }
        Value::Array(items) => {
            for item in items {
                annotate_links(item, resolver);
            }
        }
        _ => {}
    }
}

// ============================================================================
// Store
// ============================================================================

/// All records available to one build.
#[derive(Debug, Clone, Default)]
pub struct ContentStore {
    records: Vec<ContentRecord>,
}

impl ContentStore {
    pub fn new(records: Vec<ContentRecord>) -> Self {
        Self { records }
    }

    /// Load records from a JSON export. A missing file is an empty store.
    pub fn load(path: &Path) -> Result<Self, ContentError> {
        if !path.is_file() {
            debug!("content"; "no records at {}", path.display());
            return Ok(Self::default());
        }

        let text = std::fs::read_to_string(path)
            .map_err(|err| ContentError::Io(path.to_path_buf(), err))?;
        Self::from_json(&text).map_err(|err| ContentError::Parse(path.to_path_buf(), err))
    }

    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        Ok(Self::new(serde_json::from_str(text)?))
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn records(&self) -> &[ContentRecord] {
        &self.records
    }

    pub fn by_type<'a>(&'a self, record_type: &str) -> impl Iterator<Item = &'a ContentRecord> {
        self.records
            .iter()
            .filter(move |record| record.record_type == record_type)
    }

    /// Find a record by type and uid. Without a uid, the first record of the type.
    pub fn find(&self, record_type: &str, uid: Option<&str>) -> Option<&ContentRecord> {
        self.by_type(record_type)
            .find(|record| uid.is_none_or(|uid| record.uid == uid))
    }

    /// Record types in first-seen order.
    pub fn types(&self) -> Vec<&str> {
        let mut types: Vec<&str> = Vec::new();
        for record in &self.records {
            if !types.contains(&record.record_type.as_str()) {
                types.push(&record.record_type);
            }
        }
        types
    }
}
