//! Frontmatter extraction from source files.
//!
//! Supports YAML-like (`---`) and TOML (`+++`) blocks at the top of a file.
//! The YAML-like form only understands flat `key: value` lines; values are
//! typed loosely (bool, null, number, comma list, string).

use anyhow::{Result, anyhow};
use serde_json::{Map, Value};

/// Split `content` into (metadata, body). Files without frontmatter return
/// empty metadata and the content unchanged.
pub fn extract(content: &str) -> Result<(Map<String, Value>, &str)> {
    match detect(content) {
        Some((fm, body, true)) => Ok((parse_toml(fm)?, body)),
        Some((fm, body, false)) => Ok((parse_yaml_like(fm), body)),
        None => Ok((Map::new(), content)),
    }
}

/// Returns `(frontmatter, body, is_toml)`.
fn detect(content: &str) -> Option<(&str, &str, bool)> {
    for (fence, is_toml) in [("---", false), ("+++", true)] {
        let Some(rest) = content.strip_prefix(fence) else {
            continue;
        };
        // fence must be alone on its line
        if !(rest.starts_with('\n') || rest.starts_with("\r\n")) {
            continue;
        }
        let closing = format!("\n{fence}");
        let end = rest.find(&closing)?;
        let fm = rest[..end].trim();
        let body = &rest[end + closing.len()..];
        let body = body.strip_prefix("\r\n").or_else(|| body.strip_prefix('\n')).unwrap_or(body);
        return Some((fm, body, is_toml));
    }
    None
}

fn parse_toml(content: &str) -> Result<Map<String, Value>> {
    let table: toml::Table =
        toml::from_str(content).map_err(|e| anyhow!("invalid TOML frontmatter: {}", e))?;
    match serde_json::to_value(table)? {
        Value::Object(map) => Ok(map),
        _ => Ok(Map::new()),
    }
}

fn parse_yaml_like(content: &str) -> Map<String, Value> {
    let mut meta = Map::new();
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Some((key, value)) = line.split_once(':') {
            meta.insert(key.trim().to_string(), parse_value(value.trim()));
        }
    }
    meta
}

fn parse_value(s: &str) -> Value {
    if s.eq_ignore_ascii_case("true") {
        return Value::Bool(true);
    }
    if s.eq_ignore_ascii_case("false") {
        return Value::Bool(false);
    }
    if s.is_empty() || s.eq_ignore_ascii_case("null") || s == "~" {
        return Value::Null;
    }
    if let Ok(n) = s.parse::<i64>() {
        return Value::Number(n.into());
    }
    if let Ok(n) = s.parse::<f64>()
        && let Some(num) = serde_json::Number::from_f64(n)
    {
        return Value::Number(num);
    }

    let unquoted = unquote(s);
    if unquoted.len() == s.len() && s.contains(',') {
        return Value::Array(
            s.split(',')
                .map(|item| Value::String(unquote(item.trim()).to_string()))
                .collect(),
        );
    }
    Value::String(unquoted.to_string())
}

fn unquote(s: &str) -> &str {
    for quote in ['"', '\''] {
        if s.len() >= 2 && s.starts_with(quote) && s.ends_with(quote) {
            return &s[1..s.len() - 1];
        }
    }
    s
}
