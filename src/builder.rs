//! Index build pipeline.
//!
//! Coordinates the full run: scan → load → backfill → normalize → dedup →
//! sort → write. Candidates are processed one at a time in enumeration
//! order. Per-entry problems are reported through the [`Reporter`] and the
//! entry is skipped; only failures to list the root or write the output
//! abort the run.

use anyhow::{Context, Result};
use serde_json::Value;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::export;
use crate::models::{is_falsy, IndexEntry, SourceRecord};
use crate::normalize::{self, Rejection};
use crate::report::{Diagnostic, Reporter};
use crate::scan::{self, Candidate};
use crate::sort;

/// Outcome of a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildSummary {
    pub output: PathBuf,
    pub count: usize,
}

pub struct IndexBuilder<'a> {
    config: &'a Config,
    reporter: &'a dyn Reporter,
}

impl<'a> IndexBuilder<'a> {
    pub fn new(config: &'a Config, reporter: &'a dyn Reporter) -> Self {
        Self { config, reporter }
    }

    /// Build the index and write it to the configured output path.
    pub async fn run(&self) -> Result<BuildSummary> {
        let entries = self.collect().await?;
        let output = self.config.paths.output.clone();

        export::write_index(&output, &entries).await?;

        self.reporter.report(Diagnostic::Written {
            path: output.clone(),
            count: entries.len(),
        });
        Ok(BuildSummary {
            output,
            count: entries.len(),
        })
    }

    /// Produce the sorted, deduplicated entries without writing anything.
    pub async fn collect(&self) -> Result<Vec<IndexEntry>> {
        let root = &self.config.paths.root;
        ensure_root(root).await?;

        let candidates = scan::scan_candidates(root)?;
        let mut entries: Vec<IndexEntry> = Vec::with_capacity(candidates.len());
        let mut seen_ids: HashSet<String> = HashSet::new();

        for candidate in &candidates {
            let Some(entry) = self.process_candidate(candidate).await else {
                continue;
            };

            if !seen_ids.insert(entry.id.clone()) {
                self.reporter.report(Diagnostic::DuplicateId {
                    id: entry.id,
                    path: candidate.meta_path(),
                });
                continue;
            }
            entries.push(entry);
        }

        sort::sort_entries(&mut entries, self.config.index.sort);
        Ok(entries)
    }

    async fn process_candidate(&self, candidate: &Candidate) -> Option<IndexEntry> {
        let meta_path = candidate.meta_path();
        if !matches!(tokio::fs::try_exists(&meta_path).await, Ok(true)) {
            return None;
        }

        let mut record = self.load_record(&meta_path).await?;

        normalize::backfill_id(&mut record, &candidate.name);
        if self.config.index.backfill_added_at && record.is_falsy("added_at") {
            if let Ok(modified) = tokio::fs::metadata(&meta_path)
                .await
                .and_then(|m| m.modified())
            {
                normalize::backfill_added_at(&mut record, modified);
            }
        }

        match normalize::to_index_entry(&record, self.config.normalize_options()) {
            Ok(entry) => Some(entry),
            Err(rejection) => {
                self.reporter.report(rejection_diagnostic(rejection, meta_path));
                None
            }
        }
    }

    async fn load_record(&self, path: &Path) -> Option<SourceRecord> {
        let parsed = match tokio::fs::read_to_string(path).await {
            Ok(raw) => serde_json::from_str::<Value>(&raw).map_err(|e| e.to_string()),
            Err(e) => Err(e.to_string()),
        };

        match parsed {
            Ok(Value::Object(fields)) => Some(SourceRecord::new(path.to_path_buf(), fields)),
            // `null`, `false`, `0` and `""` carry nothing to index.
            Ok(value) if is_falsy(&value) => None,
            Ok(_) => {
                self.reporter.report(Diagnostic::NotAnObject {
                    path: path.to_path_buf(),
                });
                None
            }
            Err(error) => {
                self.reporter.report(Diagnostic::LoadFailed {
                    path: path.to_path_buf(),
                    error,
                });
                None
            }
        }
    }
}

/// Create the books root when it does not exist yet.
async fn ensure_root(root: &Path) -> Result<()> {
    if matches!(tokio::fs::try_exists(root).await, Ok(true)) {
        return Ok(());
    }
    tokio::fs::create_dir_all(root)
        .await
        .with_context(|| format!("Failed to create books directory: {}", root.display()))
}

fn rejection_diagnostic(rejection: Rejection, path: PathBuf) -> Diagnostic {
    match rejection {
        Rejection::Category(unresolved) => Diagnostic::CategoryUnresolved {
            path,
            category_slug: unresolved.category_slug,
            category: unresolved.category,
        },
        Rejection::MissingId => Diagnostic::MissingId { path },
        Rejection::MissingTitle => Diagnostic::MissingTitle { path },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CategoryMode, OutputShape, SortPolicy};
    use crate::report::CollectingReporter;
    use std::fs;
    use tempfile::TempDir;

    fn write_meta(root: &Path, dir: &str, content: &str) {
        let d = root.join(dir);
        fs::create_dir_all(&d).unwrap();
        fs::write(d.join("meta.json"), content).unwrap();
    }

    fn config_for(tmp: &TempDir) -> Config {
        let mut cfg = Config::default();
        cfg.paths.root = tmp.path().join("books");
        cfg.paths.output = tmp.path().join("out/index.json");
        cfg
    }

    #[tokio::test]
    async fn missing_id_is_backfilled_from_directory() {
        let tmp = TempDir::new().unwrap();
        let mut cfg = config_for(&tmp);
        cfg.index.categories = CategoryMode::Passthrough;
        write_meta(&cfg.paths.root, "b1", r#"{"title":"Zeta","author":"X"}"#);

        let reporter = CollectingReporter::new();
        let entries = IndexBuilder::new(&cfg, &reporter).collect().await.unwrap();

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].id, "b1");
        assert_eq!(entries[0].title, "Zeta");
        assert_eq!(entries[0].author, "X");
        assert!(reporter.events().is_empty());
    }

    #[tokio::test]
    async fn duplicate_ids_keep_one_and_warn() {
        let tmp = TempDir::new().unwrap();
        let cfg = config_for(&tmp);
        let meta = r#"{"id":"dup1","title":"Same","category_slug":"art-design"}"#;
        write_meta(&cfg.paths.root, "a", meta);
        write_meta(&cfg.paths.root, "b", meta);

        let reporter = CollectingReporter::new();
        let entries = IndexBuilder::new(&cfg, &reporter).collect().await.unwrap();

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].id, "dup1");
        let events = reporter.events();
        assert_eq!(events.len(), 1);
        assert!(matches!(&events[0], Diagnostic::DuplicateId { id, .. } if id == "dup1"));
    }

    #[tokio::test]
    async fn unknown_category_drops_entry() {
        let tmp = TempDir::new().unwrap();
        let cfg = config_for(&tmp);
        write_meta(
            &cfg.paths.root,
            "c1",
            r#"{"title":"T","category_slug":"not-a-real-slug"}"#,
        );

        let reporter = CollectingReporter::new();
        let entries = IndexBuilder::new(&cfg, &reporter).collect().await.unwrap();

        assert!(entries.is_empty());
        assert!(matches!(
            &reporter.events()[0],
            Diagnostic::CategoryUnresolved { category_slug, .. } if category_slug == "not-a-real-slug"
        ));
    }

    #[tokio::test]
    async fn directories_without_meta_are_silent() {
        let tmp = TempDir::new().unwrap();
        let cfg = config_for(&tmp);
        fs::create_dir_all(cfg.paths.root.join("empty")).unwrap();
        fs::write(cfg.paths.root.join("stray.json"), "{}").unwrap();

        let reporter = CollectingReporter::new();
        let entries = IndexBuilder::new(&cfg, &reporter).collect().await.unwrap();

        assert!(entries.is_empty());
        assert!(reporter.events().is_empty());
    }

    #[tokio::test]
    async fn malformed_json_is_reported_and_skipped() {
        let tmp = TempDir::new().unwrap();
        let cfg = config_for(&tmp);
        write_meta(&cfg.paths.root, "bad", "{ \"title\": ");
        write_meta(&cfg.paths.root, "arr", "[1, 2]");
        write_meta(&cfg.paths.root, "nul", "null");
        write_meta(
            &cfg.paths.root,
            "good",
            r#"{"title":"Ok","category":"📚 知識與文明史"}"#,
        );

        let reporter = CollectingReporter::new();
        let entries = IndexBuilder::new(&cfg, &reporter).collect().await.unwrap();

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].category_slug, "knowledge-civilization");
        let events = reporter.events();
        assert_eq!(events.len(), 2);
        assert!(events.iter().any(|e| matches!(
            e,
            Diagnostic::LoadFailed { path, .. } if path.ends_with("bad/meta.json")
        )));
        assert!(events
            .iter()
            .any(|e| matches!(e, Diagnostic::NotAnObject { .. })));
    }

    #[tokio::test]
    async fn added_at_backfill_is_configurable() {
        let tmp = TempDir::new().unwrap();
        let mut cfg = config_for(&tmp);
        cfg.index.categories = CategoryMode::Passthrough;
        write_meta(&cfg.paths.root, "b1", r#"{"title":"T"}"#);

        let reporter = CollectingReporter::new();
        let entries = IndexBuilder::new(&cfg, &reporter).collect().await.unwrap();
        let added_at = entries[0].added_at.clone().unwrap();
        assert!(added_at.ends_with('Z'));
        assert!(sort::timestamp_millis(&added_at) > 0);

        cfg.index.backfill_added_at = false;
        let entries = IndexBuilder::new(&cfg, &reporter).collect().await.unwrap();
        assert_eq!(entries[0].added_at.as_deref(), Some(""));
    }

    #[tokio::test]
    async fn missing_root_is_created() {
        let tmp = TempDir::new().unwrap();
        let cfg = config_for(&tmp);
        assert!(!cfg.paths.root.exists());

        let reporter = CollectingReporter::new();
        let summary = IndexBuilder::new(&cfg, &reporter).run().await.unwrap();

        assert!(cfg.paths.root.is_dir());
        assert_eq!(summary.count, 0);
        assert_eq!(fs::read_to_string(&cfg.paths.output).unwrap(), "[]\n");
        assert!(matches!(
            &reporter.events()[0],
            Diagnostic::Written { count: 0, .. }
        ));
    }

    #[tokio::test]
    async fn root_file_fails_without_touching_index() {
        let tmp = TempDir::new().unwrap();
        let cfg = config_for(&tmp);
        fs::write(&cfg.paths.root, "").unwrap();
        fs::create_dir_all(cfg.paths.output.parent().unwrap()).unwrap();
        fs::write(&cfg.paths.output, "[{\"id\":\"keep\"}]\n").unwrap();

        let reporter = CollectingReporter::new();
        let result = IndexBuilder::new(&cfg, &reporter).run().await;

        assert!(result.is_err());
        assert_eq!(
            fs::read_to_string(&cfg.paths.output).unwrap(),
            "[{\"id\":\"keep\"}]\n"
        );
        assert!(reporter.events().is_empty());
    }

    #[tokio::test]
    async fn repeated_runs_are_byte_identical() {
        let tmp = TempDir::new().unwrap();
        let mut cfg = config_for(&tmp);
        cfg.index.sort = SortPolicy::TitleFirst;
        cfg.index.shape = OutputShape::Compact;
        for (dir, title, year) in [("a", "Beta", 2001), ("b", "alpha", 1999), ("c", "Beta", 2010)] {
            write_meta(
                &cfg.paths.root,
                dir,
                &format!(
                    r#"{{"title":"{}","year":{},"category_slug":"sound-music","tags":["x","",null,"y"]}}"#,
                    title, year
                ),
            );
        }

        let reporter = CollectingReporter::new();
        IndexBuilder::new(&cfg, &reporter).run().await.unwrap();
        let first = fs::read_to_string(&cfg.paths.output).unwrap();
        IndexBuilder::new(&cfg, &reporter).run().await.unwrap();
        let second = fs::read_to_string(&cfg.paths.output).unwrap();
        assert_eq!(first, second);

        let value: serde_json::Value = serde_json::from_str(&first).unwrap();
        let ids: Vec<&str> = value
            .as_array()
            .unwrap()
            .iter()
            .map(|e| e["id"].as_str().unwrap())
            .collect();
        assert_eq!(ids, vec!["b", "c", "a"]);
        assert_eq!(value[0]["tags"], serde_json::json!(["x", "y"]));
        assert!(value[0].get("added_at").is_none());
    }
}
