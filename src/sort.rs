//! Final ordering of the index.
//!
//! Both policies end with an ascending-id tie-break, so the output order
//! does not depend on directory enumeration order.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use std::cmp::Ordering;

use crate::collate;
use crate::models::{IndexEntry, SortPolicy};

pub fn sort_entries(entries: &mut [IndexEntry], policy: SortPolicy) {
    match policy {
        SortPolicy::RecencyFirst => entries.sort_by(recency_first),
        SortPolicy::TitleFirst => entries.sort_by(title_first),
    }
}

fn recency_first(a: &IndexEntry, b: &IndexEntry) -> Ordering {
    let ta = timestamp_millis(&a.sort_added_at);
    let tb = timestamp_millis(&b.sort_added_at);
    tb.cmp(&ta)
        .then_with(|| collate::compare(&a.title, &b.title))
        .then_with(|| a.id.cmp(&b.id))
}

fn title_first(a: &IndexEntry, b: &IndexEntry) -> Ordering {
    // `None < Some(_)`, so reversing puts missing years last.
    collate::compare(&a.title, &b.title)
        .then_with(|| b.year.cmp(&a.year))
        .then_with(|| a.id.cmp(&b.id))
}

/// Date-time layouts with an explicit offset (`Z` is rewritten to `+00:00`).
const OFFSET_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f%:z", "%Y-%m-%dT%H:%M%:z"];

/// Date-time layouts without an offset, taken as UTC.
const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

/// Milliseconds since the epoch, or 0 when the value does not parse.
///
/// Accepts full and minute-precision date-times (with or without an offset)
/// and the date-only forms `YYYY-MM-DD`, `YYYY-MM` and `YYYY`.
pub fn timestamp_millis(value: &str) -> i64 {
    let value = value.trim();
    if value.is_empty() {
        return 0;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return dt.timestamp_millis();
    }

    let with_offset = match value.strip_suffix('Z') {
        Some(head) => format!("{}+00:00", head),
        None => value.to_string(),
    };
    for fmt in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(&with_offset, fmt) {
            return dt.timestamp_millis();
        }
    }
    for fmt in NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, fmt) {
            return dt.and_utc().timestamp_millis();
        }
    }

    date_only(value)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map_or(0, |dt| dt.and_utc().timestamp_millis())
}

fn date_only(value: &str) -> Option<NaiveDate> {
    let full = match value.len() {
        4 if value.bytes().all(|b| b.is_ascii_digit()) => format!("{}-01-01", value),
        7 => format!("{}-01", value),
        _ => value.to_string(),
    };
    NaiveDate::parse_from_str(&full, "%Y-%m-%d").ok()
}
