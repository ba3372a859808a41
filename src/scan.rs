//! Candidate discovery under the books root.
//!
//! Each immediate subdirectory of the root is a candidate; its name is the
//! fallback identifier for the book it holds. Plain files and symlinks at
//! the top level are ignored, and nothing below the first level is visited.

use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Name of the metadata file inside each candidate directory.
pub const META_FILE: &str = "meta.json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    /// Directory name, used as the fallback id.
    pub name: String,
    pub dir: PathBuf,
}

impl Candidate {
    pub fn meta_path(&self) -> PathBuf {
        self.dir.join(META_FILE)
    }
}

/// List candidate directories in filesystem enumeration order.
pub fn scan_candidates(root: &Path) -> Result<Vec<Candidate>> {
    let metadata = std::fs::metadata(root)
        .with_context(|| format!("Failed to list books directory: {}", root.display()))?;
    if !metadata.is_dir() {
        bail!("Books root is not a directory: {}", root.display());
    }

    let mut candidates = Vec::new();

    let walker = WalkDir::new(root)
        .min_depth(1)
        .max_depth(1)
        .follow_links(false);
    for entry in walker {
        let entry =
            entry.with_context(|| format!("Failed to list books directory: {}", root.display()))?;
        if !entry.file_type().is_dir() {
            continue;
        }

        candidates.push(Candidate {
            name: entry.file_name().to_string_lossy().to_string(),
            dir: entry.path().to_path_buf(),
        });
    }

    Ok(candidates)
}
