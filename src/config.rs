use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::models::{CategoryMode, OutputShape, SortPolicy};
use crate::normalize::NormalizeOptions;
use crate::report::ReportFormat;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub index: IndexConfig,
    #[serde(default)]
    pub report: ReportConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PathsConfig {
    /// Directory holding one subdirectory per book.
    #[serde(default = "default_root")]
    pub root: PathBuf,
    /// Index file to write.
    #[serde(default = "default_output")]
    pub output: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            output: default_output(),
        }
    }
}

fn default_root() -> PathBuf {
    PathBuf::from("data").join("books")
}

fn default_output() -> PathBuf {
    PathBuf::from("data").join("books_index.json")
}

#[derive(Debug, Deserialize, Clone)]
pub struct IndexConfig {
    #[serde(default)]
    pub sort: SortPolicy,
    #[serde(default)]
    pub categories: CategoryMode,
    #[serde(default)]
    pub shape: OutputShape,
    #[serde(default = "default_backfill_added_at")]
    pub backfill_added_at: bool,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            sort: SortPolicy::default(),
            categories: CategoryMode::default(),
            shape: OutputShape::default(),
            backfill_added_at: default_backfill_added_at(),
        }
    }
}

fn default_backfill_added_at() -> bool {
    true
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct ReportConfig {
    #[serde(default)]
    pub format: ReportFormat,
}

impl Config {
    pub fn normalize_options(&self) -> NormalizeOptions {
        NormalizeOptions {
            categories: self.index.categories,
            shape: self.index.shape,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.paths.root.as_os_str().is_empty() {
            anyhow::bail!("paths.root must not be empty");
        }
        if self.paths.output.as_os_str().is_empty() {
            anyhow::bail!("paths.output must not be empty");
        }
        if self.paths.output.is_dir() {
            anyhow::bail!(
                "paths.output is a directory: {}",
                self.paths.output.display()
            );
        }
        Ok(())
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;
    config.validate()?;

    Ok(config)
}
