//! Fixed category vocabulary.
//!
//! Every book is filed under exactly one of ten thematic categories. Each
//! category has a display label (what readers see) and a slug (what URLs
//! and filters use). The table is compiled in and read-only; callers only
//! get lookups, never the table itself.

use crate::models::SourceRecord;

/// `(label, slug)` pairs. Labels and slugs are each unique.
const CATEGORIES: [(&str, &str); 10] = [
    ("🎨 藝術與設計", "art-design"),
    ("🔊 聲音與音樂", "sound-music"),
    ("🧠 心智與心理學", "mind-psych"),
    ("🌌 哲學與科普", "philosophy-science"),
    ("📈 經濟與社會觀察", "economy-society"),
    ("✍️ 語言與表達", "language-expression"),
    ("🧭 自我成長與人生設計", "self-growth-design"),
    ("👁️‍🗨️ 感官與風格", "senses-style"),
    ("📚 知識與文明史", "knowledge-civilization"),
    ("🧰 創新與問題解決", "innovation-problem"),
];

/// A category resolved against the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Category {
    pub label: &'static str,
    pub slug: &'static str,
}

/// Look a category up by its slug.
pub fn by_slug(slug: &str) -> Option<Category> {
    CATEGORIES
        .iter()
        .find(|(_, s)| *s == slug)
        .map(|&(label, slug)| Category { label, slug })
}

/// Look a category up by its display label.
pub fn by_label(label: &str) -> Option<Category> {
    CATEGORIES
        .iter()
        .find(|(l, _)| *l == label)
        .map(|&(label, slug)| Category { label, slug })
}

/// Number of categories in the table.
pub fn len() -> usize {
    CATEGORIES.len()
}

/// Raw category fields of a record that failed to resolve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unresolved {
    pub category_slug: String,
    pub category: String,
}

/// Resolve a record's category: a known `category_slug` wins, then a known
/// `category` label.
pub fn resolve(record: &SourceRecord) -> Result<Category, Unresolved> {
    let slug = trimmed_str(record, "category_slug");
    if !slug.is_empty() {
        if let Some(cat) = by_slug(slug) {
            return Ok(cat);
        }
    }

    let label = trimmed_str(record, "category");
    if !label.is_empty() {
        if let Some(cat) = by_label(label) {
            return Ok(cat);
        }
    }

    Err(Unresolved {
        category_slug: raw_display(record, "category_slug"),
        category: raw_display(record, "category"),
    })
}

fn trimmed_str<'a>(record: &'a SourceRecord, key: &str) -> &'a str {
    record.get(key).and_then(|v| v.as_str()).unwrap_or("").trim()
}

/// Render a raw field for a diagnostic: falsy values print as empty.
fn raw_display(record: &SourceRecord, key: &str) -> String {
    if record.is_falsy(key) {
        return String::new();
    }
    match record.get(key) {
        Some(serde_json::Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => String::new(),
    }
}
