//! # Books index builder (`build-index`)
//!
//! Scans `./data/books/*/meta.json` and writes `./data/books_index.json`.
//! Running with no arguments is the normal way to use it; every flag only
//! overrides a default or a value from `--config`.
//!
//! Exit status is 0 when the index was written (even if some entries were
//! skipped) and 1 when the books directory could not be listed or the
//! index could not be written.

use books_index::builder::IndexBuilder;
use books_index::config::{self, Config};
use books_index::models::{CategoryMode, OutputShape, SortPolicy};
use books_index::report::ReportFormat;
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;

/// Build the consolidated books index from per-book metadata files.
#[derive(Parser)]
#[command(
    name = "build-index",
    about = "Build data/books_index.json from data/books/*/meta.json",
    version
)]
struct Cli {
    /// Optional TOML configuration file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory holding one subdirectory per book.
    #[arg(long)]
    root: Option<PathBuf>,

    /// Index file to write.
    #[arg(long)]
    output: Option<PathBuf>,

    /// Ordering of the index.
    #[arg(long, value_enum)]
    sort: Option<SortPolicy>,

    /// Category handling: resolve against the fixed table, or pass through.
    #[arg(long, value_enum)]
    categories: Option<CategoryMode>,

    /// Output fields: `full` keeps rating/status/added_at, `compact` drops them.
    #[arg(long, value_enum)]
    shape: Option<OutputShape>,

    /// Diagnostic format on stderr.
    #[arg(long, value_enum)]
    report: Option<ReportFormat>,
}

impl Cli {
    fn into_config(self) -> anyhow::Result<Config> {
        let mut cfg = match &self.config {
            Some(path) => config::load_config(path)?,
            None => Config::default(),
        };

        if let Some(root) = self.root {
            cfg.paths.root = root;
        }
        if let Some(output) = self.output {
            cfg.paths.output = output;
        }
        if let Some(sort) = self.sort {
            cfg.index.sort = sort;
        }
        if let Some(categories) = self.categories {
            cfg.index.categories = categories;
        }
        if let Some(shape) = self.shape {
            cfg.index.shape = shape;
        }
        if let Some(format) = self.report {
            cfg.report.format = format;
        }

        cfg.validate()?;
        Ok(cfg)
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let cfg = cli.into_config()?;
    let reporter = cfg.report.format.reporter();
    IndexBuilder::new(&cfg, reporter.as_ref()).run().await?;
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
