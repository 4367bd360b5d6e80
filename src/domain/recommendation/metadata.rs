//! Document metadata normalized into one canonical shape.
//!
//! Knowledge-base metadata arrives with loosely typed values: tags may be a
//! JSON array, a Python-style list literal, or a comma separated string;
//! numbers and booleans show up where text is expected. Everything is
//! converted once, at load time, into [`MetadataValue::Text`] or
//! [`MetadataValue::List`], so filtering never inspects runtime types.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::domain::foundation::text::{fold_accents, normalize_key};

/// Keys whose string values are split into lists.
const LIST_KEYS: &[&str] = &["tags", "etiquetas", "keywords"];

/// A normalized metadata value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetadataValue {
    Text(String),
    List(Vec<String>),
}

impl MetadataValue {
    /// Normalizes an arbitrary JSON value stored under `key`.
    pub fn from_json(key: &str, value: &Value) -> Self {
        let list_key = LIST_KEYS.contains(&metadata_key(key).as_str());
        match value {
            Value::Null => MetadataValue::Text(String::new()),
            Value::String(s) if list_key => MetadataValue::List(split_list_literal(s)),
            Value::String(s) => MetadataValue::Text(s.trim().to_string()),
            Value::Array(values) => MetadataValue::List(
                values
                    .iter()
                    .map(scalar_to_string)
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect(),
            ),
            other => MetadataValue::Text(scalar_to_string(other)),
        }
    }

    /// All string values, one for text and each element for lists.
    pub fn values(&self) -> Vec<&str> {
        match self {
            MetadataValue::Text(s) => vec![s.as_str()],
            MetadataValue::List(items) => items.iter().map(String::as_str).collect(),
        }
    }

    /// The value rendered as a single string (lists joined with ", ").
    pub fn as_text(&self) -> String {
        match self {
            MetadataValue::Text(s) => s.clone(),
            MetadataValue::List(items) => items.join(", "),
        }
    }

    /// The value as a list (text becomes a one-element list unless empty).
    pub fn to_list(&self) -> Vec<String> {
        match self {
            MetadataValue::Text(s) if s.is_empty() => Vec::new(),
            MetadataValue::Text(s) => vec![s.clone()],
            MetadataValue::List(items) => items.clone(),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            MetadataValue::Text(s) => s.trim().is_empty(),
            MetadataValue::List(items) => items.is_empty(),
        }
    }
}

impl From<&str> for MetadataValue {
    fn from(value: &str) -> Self {
        MetadataValue::Text(value.to_string())
    }
}

impl From<String> for MetadataValue {
    fn from(value: String) -> Self {
        MetadataValue::Text(value)
    }
}

impl From<Vec<String>> for MetadataValue {
    fn from(value: Vec<String>) -> Self {
        MetadataValue::List(value)
    }
}

impl From<Vec<&str>> for MetadataValue {
    fn from(value: Vec<&str>) -> Self {
        MetadataValue::List(value.into_iter().map(String::from).collect())
    }
}

/// Flat key-value metadata of a knowledge document.
///
/// Keys are stored lowercased and accent folded, so `Recomendación` and
/// `recomendacion` address the same entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentMetadata(BTreeMap<String, MetadataValue>);

impl DocumentMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds metadata from a JSON object, normalizing every value.
    pub fn from_json_object(object: &serde_json::Map<String, Value>) -> Self {
        Self(
            object
                .iter()
                .map(|(k, v)| (metadata_key(k), MetadataValue::from_json(k, v)))
                .collect(),
        )
    }

    /// Adds an entry.
    pub fn with(mut self, key: &str, value: impl Into<MetadataValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: &str, value: impl Into<MetadataValue>) {
        self.0.insert(metadata_key(key), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&MetadataValue> {
        self.0.get(&metadata_key(key))
    }

    /// First non-empty value among the given key aliases.
    pub fn get_any(&self, keys: &[&str]) -> Option<&MetadataValue> {
        keys.iter()
            .filter_map(|k| self.get(k))
            .find(|v| !v.is_empty())
    }

    /// First non-empty text among the given key aliases.
    pub fn text(&self, keys: &[&str]) -> Option<String> {
        self.get_any(keys).map(MetadataValue::as_text)
    }

    /// First non-empty value among the given key aliases, as a list.
    pub fn list(&self, keys: &[&str]) -> Vec<String> {
        self.get_any(keys).map(MetadataValue::to_list).unwrap_or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &MetadataValue)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

fn metadata_key(key: &str) -> String {
    fold_accents(&normalize_key(key))
}

fn scalar_to_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Splits `"['a', 'b']"`, `"[\"a\"]"` or `"a, b"` into `["a", "b"]`.
fn split_list_literal(raw: &str) -> Vec<String> {
    let trimmed = raw.trim();
    let inner = trimmed
        .strip_prefix('[')
        .and_then(|s| s.strip_suffix(']'))
        .unwrap_or(trimmed);
    inner
        .split([',', ';'])
        .map(|part| part.trim().trim_matches(|c| c == '\'' || c == '"').trim())
        .filter(|part| !part.is_empty())
        .map(String::from)
        .collect()
}
