//! Core data models used throughout the index builder.
//!
//! A [`SourceRecord`] is the untyped content of one `meta.json`; it is turned
//! into a typed [`IndexEntry`] exactly once, by [`crate::normalize`], and
//! nothing downstream of that conversion sees raw JSON again.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use std::path::PathBuf;

/// Raw parsed content of one `meta.json` file.
#[derive(Debug, Clone, Default)]
pub struct SourceRecord {
    /// Path of the metadata file, used in diagnostics.
    pub path: PathBuf,
    pub fields: Map<String, Value>,
}

impl SourceRecord {
    pub fn new(path: PathBuf, fields: Map<String, Value>) -> Self {
        Self { path, fields }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// True when the field is absent or falsy (see [`is_falsy`]).
    pub fn is_falsy(&self, key: &str) -> bool {
        self.get(key).map_or(true, is_falsy)
    }

    pub fn set(&mut self, key: &str, value: Value) {
        self.fields.insert(key.to_string(), value);
    }
}

/// `null`, `false`, numeric zero and `""`.
pub fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64().map_or(false, |f| f == 0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}

/// One normalized, validated entry of the index file.
///
/// Field order here is the key order of the serialized output. The three
/// optional trailing fields are only populated for [`OutputShape::Full`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexEntry {
    pub id: String,
    pub title: String,
    pub author: String,
    pub year: Option<i64>,
    pub category_slug: String,
    pub category: String,
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub added_at: Option<String>,
    pub summary: String,
    /// Addition timestamp kept for sorting even when `added_at` is not
    /// serialized.
    #[serde(skip)]
    pub sort_added_at: String,
}

/// Ordering applied to the final entry sequence.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum SortPolicy {
    /// Newest `added_at` first, then title.
    #[default]
    RecencyFirst,
    /// Title ascending, then newest `year` first.
    TitleFirst,
}

/// How the `category` / `category_slug` fields are handled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum CategoryMode {
    /// Resolve against the fixed category table; unresolvable entries are dropped.
    #[default]
    Table,
    /// Copy both fields through without validation.
    Passthrough,
}

/// Which fields appear in each serialized entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum OutputShape {
    /// Includes `rating`, `status` and `added_at`.
    #[default]
    Full,
    /// Omits `rating`, `status` and `added_at`.
    Compact,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn falsy_values() {
        for v in [json!(null), json!(false), json!(0), json!(0.0), json!("")] {
            assert!(is_falsy(&v), "{} should be falsy", v);
        }
        for v in [json!(true), json!(1), json!(" "), json!([]), json!({})] {
            assert!(!is_falsy(&v), "{} should be truthy", v);
        }
    }

    #[test]
    fn compact_entry_omits_optional_fields() {
        let entry = IndexEntry {
            id: "b1".into(),
            title: "Zeta".into(),
            author: String::new(),
            year: None,
            category_slug: "art-design".into(),
            category: "🎨 藝術與設計".into(),
            tags: vec![],
            rating: None,
            status: None,
            added_at: None,
            summary: String::new(),
            sort_added_at: "2024-01-01".into(),
        };
        let value = serde_json::to_value(&entry).unwrap();
        let keys: Vec<&str> = value.as_object().unwrap().keys().map(|k| k.as_str()).collect();
        assert!(!keys.contains(&"rating"));
        assert!(!keys.contains(&"added_at"));
        assert!(!keys.contains(&"sort_added_at"));
        assert_eq!(value["year"], Value::Null);
    }

    #[test]
    fn policy_names_are_kebab_case() {
        let p: SortPolicy = serde_json::from_value(json!("title-first")).unwrap();
        assert_eq!(p, SortPolicy::TitleFirst);
        let m: CategoryMode = serde_json::from_value(json!("passthrough")).unwrap();
        assert_eq!(m, CategoryMode::Passthrough);
    }
}
