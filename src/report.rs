//! Diagnostics for a build run.
//!
//! Per-entry problems never abort a run; they are reported here and the
//! entry is skipped. Warnings and errors go to **stderr**; the completion
//! line goes to stdout in human mode so scripts can pick it up.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Mutex;

/// A single diagnostic event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Diagnostic {
    /// `meta.json` exists but could not be read or parsed.
    LoadFailed { path: PathBuf, error: String },
    /// `meta.json` parsed, but its top level is not an object.
    NotAnObject { path: PathBuf },
    /// Neither `category_slug` nor `category` names a known category.
    CategoryUnresolved {
        path: PathBuf,
        category_slug: String,
        category: String,
    },
    MissingId { path: PathBuf },
    MissingTitle { path: PathBuf },
    /// A later entry reused an id; the earlier entry is kept.
    DuplicateId { id: String, path: PathBuf },
    /// The index file was written.
    Written { path: PathBuf, count: usize },
}

impl Diagnostic {
    /// Short machine name, used as the `event` field in JSON mode.
    pub fn kind(&self) -> &'static str {
        match self {
            Diagnostic::LoadFailed { .. } => "load_failed",
            Diagnostic::NotAnObject { .. } => "not_an_object",
            Diagnostic::CategoryUnresolved { .. } => "category_unresolved",
            Diagnostic::MissingId { .. } => "missing_id",
            Diagnostic::MissingTitle { .. } => "missing_title",
            Diagnostic::DuplicateId { .. } => "duplicate_id",
            Diagnostic::Written { .. } => "written",
        }
    }

    fn human_line(&self) -> String {
        match self {
            Diagnostic::LoadFailed { path, error } => {
                format!("error: failed to parse JSON: {}\n  {}", path.display(), error)
            }
            Diagnostic::NotAnObject { path } => {
                format!("error: metadata is not a JSON object: {}", path.display())
            }
            Diagnostic::CategoryUnresolved {
                path,
                category_slug,
                category,
            } => format!(
                "warning: cannot resolve category: {} (category_slug='{}', category='{}')",
                path.display(),
                category_slug,
                category
            ),
            Diagnostic::MissingId { path } => {
                format!("warning: skipped (missing id): {}", path.display())
            }
            Diagnostic::MissingTitle { path } => {
                format!("warning: skipped (missing title): {}", path.display())
            }
            Diagnostic::DuplicateId { id, path } => format!(
                "warning: duplicate id, keeping the first: {} (source: {})",
                id,
                path.display()
            ),
            Diagnostic::Written { path, count } => {
                format!("wrote {} ({} entries)", path.display(), count)
            }
        }
    }

    fn json_value(&self) -> serde_json::Value {
        let mut obj = match self {
            Diagnostic::LoadFailed { path, error } => serde_json::json!({
                "path": path.display().to_string(),
                "error": error,
            }),
            Diagnostic::NotAnObject { path }
            | Diagnostic::MissingId { path }
            | Diagnostic::MissingTitle { path } => serde_json::json!({
                "path": path.display().to_string(),
            }),
            Diagnostic::CategoryUnresolved {
                path,
                category_slug,
                category,
            } => serde_json::json!({
                "path": path.display().to_string(),
                "category_slug": category_slug,
                "category": category,
            }),
            Diagnostic::DuplicateId { id, path } => serde_json::json!({
                "id": id,
                "path": path.display().to_string(),
            }),
            Diagnostic::Written { path, count } => serde_json::json!({
                "path": path.display().to_string(),
                "count": count,
            }),
        };
        obj["event"] = serde_json::Value::String(self.kind().to_string());
        obj
    }
}

/// Receives diagnostics from the build pipeline.
pub trait Reporter: Send + Sync {
    fn report(&self, diagnostic: Diagnostic);
}

/// Human-readable lines.
pub struct HumanReporter;

impl Reporter for HumanReporter {
    fn report(&self, diagnostic: Diagnostic) {
        let line = diagnostic.human_line();
        if matches!(diagnostic, Diagnostic::Written { .. }) {
            let _ = writeln!(std::io::stdout().lock(), "{}", line);
        } else {
            let _ = writeln!(std::io::stderr().lock(), "{}", line);
        }
    }
}

/// Machine-readable diagnostics: one JSON object per line on stderr.
pub struct JsonReporter;

impl Reporter for JsonReporter {
    fn report(&self, diagnostic: Diagnostic) {
        if let Ok(line) = serde_json::to_string(&diagnostic.json_value()) {
            let _ = writeln!(std::io::stderr().lock(), "{}", line);
            let _ = std::io::stderr().lock().flush();
        }
    }
}

/// Keeps every diagnostic in memory.
#[derive(Default)]
pub struct CollectingReporter {
    events: Mutex<Vec<Diagnostic>>,
}

impl CollectingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<Diagnostic> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }
}

impl Reporter for CollectingReporter {
    fn report(&self, diagnostic: Diagnostic) {
        if let Ok(mut events) = self.events.lock() {
            events.push(diagnostic);
        }
    }
}

/// Diagnostic format for the CLI.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ReportFormat {
    #[default]
    Human,
    Json,
}

impl ReportFormat {
    pub fn reporter(&self) -> Box<dyn Reporter> {
        match self {
            ReportFormat::Human => Box::new(HumanReporter),
            ReportFormat::Json => Box::new(JsonReporter),
        }
    }
}
