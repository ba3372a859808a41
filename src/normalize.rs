//! Conversion of an untyped [`SourceRecord`] into a typed [`IndexEntry`].
//!
//! This is the only place raw metadata JSON is interpreted. String fields
//! are trimmed and default to `""`, numeric fields are coerced or nulled,
//! tags are filtered, and the category is resolved according to the
//! configured [`CategoryMode`].

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{Number, Value};
use std::time::SystemTime;

use crate::categories::{self, Unresolved};
use crate::models::{is_falsy, CategoryMode, IndexEntry, OutputShape, SourceRecord};

/// Why a record did not become an entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    Category(Unresolved),
    MissingId,
    MissingTitle,
}

/// Options that select between the historical output variants.
#[derive(Debug, Clone, Copy, Default)]
pub struct NormalizeOptions {
    pub categories: CategoryMode,
    pub shape: OutputShape,
}

/// Substitute the candidate directory name when the record has no usable id.
pub fn backfill_id(record: &mut SourceRecord, dir_name: &str) {
    if record.is_falsy("id") {
        record.set("id", Value::String(dir_name.to_string()));
    }
}

/// Substitute the metadata file's modification time when `added_at` is missing.
pub fn backfill_added_at(record: &mut SourceRecord, modified: SystemTime) {
    if record.is_falsy("added_at") {
        record.set("added_at", Value::String(format_iso(modified)));
    }
}

/// ISO-8601 in UTC with millisecond precision, e.g. `2024-05-01T12:00:00.000Z`.
pub fn format_iso(time: SystemTime) -> String {
    DateTime::<Utc>::from(time).to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn to_index_entry(
    record: &SourceRecord,
    opts: NormalizeOptions,
) -> Result<IndexEntry, Rejection> {
    let (category_slug, category) = match opts.categories {
        CategoryMode::Table => {
            let cat = categories::resolve(record).map_err(Rejection::Category)?;
            (cat.slug.to_string(), cat.label.to_string())
        }
        CategoryMode::Passthrough => (
            string_field(record, "category_slug"),
            string_field(record, "category"),
        ),
    };

    let id = string_field(record, "id");
    if id.is_empty() {
        return Err(Rejection::MissingId);
    }
    let title = string_field(record, "title");
    if title.is_empty() {
        return Err(Rejection::MissingTitle);
    }

    let added_at = string_field(record, "added_at");
    let full = opts.shape == OutputShape::Full;

    Ok(IndexEntry {
        id,
        title,
        author: string_field(record, "author"),
        year: year_field(record.get("year")),
        category_slug,
        category,
        tags: tags_field(record.get("tags")),
        rating: full.then(|| rating_field(record.get("rating"))),
        status: full.then(|| string_field(record, "status")),
        added_at: full.then(|| added_at.clone()),
        summary: string_field(record, "summary"),
        sort_added_at: added_at,
    })
}

fn string_field(record: &SourceRecord, key: &str) -> String {
    match record.get(key) {
        Some(Value::String(s)) => s.trim().to_string(),
        _ => String::new(),
    }
}

/// Finite integral numbers survive; everything else is null.
fn year_field(value: Option<&Value>) -> Option<i64> {
    let Value::Number(n) = value? else {
        return None;
    };
    if let Some(i) = n.as_i64() {
        return Some(i);
    }
    let f = n.as_f64()?;
    if f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64 {
        Some(f as i64)
    } else {
        None
    }
}

fn rating_field(value: Option<&Value>) -> Number {
    match value {
        Some(Value::Number(n)) => integral_number(n),
        _ => Number::from(0),
    }
}

/// Write integral floats as integers (`4.0` → `4`); other numbers unchanged.
fn integral_number(n: &Number) -> Number {
    if n.is_f64() {
        if let Some(f) = n.as_f64() {
            // Beyond 2^53 an f64 no longer holds every integer exactly.
            if f.fract() == 0.0 && f.abs() <= 9_007_199_254_740_992.0 {
                return Number::from(f as i64);
            }
        }
    }
    n.clone()
}

/// Keep truthy scalar tags in order, rendered as strings, without repeats.
fn tags_field(value: Option<&Value>) -> Vec<String> {
    let Some(Value::Array(items)) = value else {
        return Vec::new();
    };

    let mut tags: Vec<String> = Vec::with_capacity(items.len());
    for item in items {
        if is_falsy(item) {
            continue;
        }
        let tag = match item {
            Value::String(s) => s.trim().to_string(),
            Value::Number(n) => integral_number(n).to_string(),
            Value::Bool(true) => "true".to_string(),
            _ => continue,
        };
        if tag.is_empty() || tags.contains(&tag) {
            continue;
        }
        tags.push(tag);
    }
    tags
}
