//! Template helpers.
//!
//! Helpers are held in an explicit [`HelperRegistry`] and installed into a
//! renderer when that renderer is built. There is no process-wide registry.
//!
//! | Name        | Usage                              | Result                        |
//! |-------------|------------------------------------|-------------------------------|
//! | `json`      | `{{ record \| json(indent=2) }}`   | JSON text, pretty when indent |
//! | `striptags` | `{{ contents \| striptags }}`      | text with `<...>` tags removed |

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, LazyLock};

use regex::Regex;
use serde::Serialize;
use serde::ser::Error as _;
use serde_json::Value;
use thiserror::Error;

pub const JSON_HELPER: &str = "json";
pub const STRIPTAGS_HELPER: &str = "striptags";

/// Longest indent unit honored, as with `JSON.stringify`.
const MAX_INDENT: usize = 10;

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").unwrap());

#[derive(Debug, Error)]
pub enum HelperError {
    #[error("value is not serializable as JSON")]
    Serialization(#[from] serde_json::Error),
}

// ============================================================================
// Text transforms
// ============================================================================

/// Indentation for [`pretty_print_json`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Indent {
    Spaces(usize),
    Text(String),
}

impl Indent {
    /// Indent unit bytes; empty means compact output.
    fn unit(&self) -> Vec<u8> {
        match self {
            Self::Spaces(n) => vec![b' '; (*n).min(MAX_INDENT)],
            Self::Text(text) => text.chars().take(MAX_INDENT).collect::<String>().into_bytes(),
        }
    }
}

impl From<usize> for Indent {
    fn from(n: usize) -> Self {
        Self::Spaces(n)
    }
}

impl From<&str> for Indent {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

/// Serialize `value` as JSON. Without indent (or with an empty one) the
/// output is compact.
pub fn pretty_print_json<T>(value: &T, indent: Option<Indent>) -> Result<String, HelperError>
where
    T: Serialize + ?Sized,
{
    let unit = indent.map(|indent| indent.unit()).unwrap_or_default();
    if unit.is_empty() {
        return Ok(serde_json::to_string(value)?);
    }

    let mut out = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(&unit);
    let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
    value.serialize(&mut serializer)?;
    let text = String::from_utf8(out).map_err(serde_json::Error::custom)?;
    Ok(text)
}

/// Remove everything shaped like `<...>`. `None` gives an empty string.
///
/// This is not an HTML parser: a `>` inside an attribute value ends the tag early.
pub fn strip_tags(text: Option<&str>) -> String {
    match text {
        Some(text) => TAG_RE.replace_all(text, "").into_owned(),
        None => String::new(),
    }
}

// ============================================================================
// Registry
// ============================================================================

/// A named template helper. Arguments arrive by name.
pub trait Helper: Send + Sync {
    fn call(&self, value: &Value, args: &HashMap<String, Value>) -> Result<Value, HelperError>;
}

impl<F> Helper for F
where
    F: Fn(&Value, &HashMap<String, Value>) -> Result<Value, HelperError> + Send + Sync,
{
    fn call(&self, value: &Value, args: &HashMap<String, Value>) -> Result<Value, HelperError> {
        self(value, args)
    }
}

/// `indent` follows `JSON.stringify`: numbers are floored (below 1 is
/// compact), strings are used as the unit, anything else is ignored.
fn json_helper(value: &Value, args: &HashMap<String, Value>) -> Result<Value, HelperError> {
    let indent = match args.get("indent") {
        Some(Value::Number(n)) => n
            .as_f64()
            .filter(|n| *n >= 1.0)
            .map(|n| Indent::Spaces(n.min(MAX_INDENT as f64) as usize)),
        Some(Value::String(text)) => Some(Indent::Text(text.clone())),
        _ => None,
    };
    pretty_print_json(value, indent).map(Value::String)
}

fn striptags_helper(value: &Value, _args: &HashMap<String, Value>) -> Result<Value, HelperError> {
    let stripped = match value {
        Value::Null => strip_tags(None),
        Value::String(text) => strip_tags(Some(text)),
        other => strip_tags(Some(&other.to_string())),
    };
    Ok(Value::String(stripped))
}

/// Name → helper map handed to the renderer at construction.
#[derive(Clone, Default)]
pub struct HelperRegistry {
    helpers: BTreeMap<String, Arc<dyn Helper>>,
}

impl std::fmt::Debug for HelperRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.helpers.keys()).finish()
    }
}

impl HelperRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with `json` and `striptags`.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(JSON_HELPER, json_helper);
        registry.register(STRIPTAGS_HELPER, striptags_helper);
        registry
    }

    /// Add or replace a helper.
    pub fn register(&mut self, name: impl Into<String>, helper: impl Helper + 'static) {
        self.helpers.insert(name.into(), Arc::new(helper));
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Helper>> {
        self.helpers.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.helpers.keys().map(String::as_str)
    }

    /// Register every helper as a filter on `tera`.
    ///
    /// Installing again replaces the previous filters.
    pub fn install(&self, tera: &mut tera::Tera) {
        for (name, helper) in &self.helpers {
            tera.register_filter(
                name,
                HelperFilter {
                    name: name.clone(),
                    helper: Arc::clone(helper),
                },
            );
        }
    }
}

/// Adapter from [`Helper`] to a tera filter.
struct HelperFilter {
    name: String,
    helper: Arc<dyn Helper>,
}

impl tera::Filter for HelperFilter {
    fn filter(&self, value: &Value, args: &HashMap<String, Value>) -> tera::Result<Value> {
        self.helper
            .call(value, args)
            .map_err(|err| tera::Error::chain(format!("helper `{}` failed", self.name), err))
    }
}
