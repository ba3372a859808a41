//! Write the index as pretty-printed JSON.
//!
//! The file is overwritten in place (no temp file + rename). Parent
//! directories are created as needed.

use anyhow::{Context, Result};
use std::path::Path;

use crate::models::IndexEntry;

/// Serialize entries as a two-space indented JSON array with a trailing newline.
pub fn render_index(entries: &[IndexEntry]) -> Result<String> {
    let mut json = serde_json::to_string_pretty(entries)?;
    json.push('\n');
    Ok(json)
}

pub async fn write_index(path: &Path, entries: &[IndexEntry]) -> Result<()> {
    let json = render_index(entries)?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
    }
    tokio::fs::write(path, json)
        .await
        .with_context(|| format!("Failed to write index file: {}", path.display()))?;

    Ok(())
}
