//! Batch import of every file matching a glob pattern.

use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use tracing::{debug, warn};

use tally_core::{Dispatcher, FileKind, UploadResponse, UploadStatus};

use super::import::{display_name, import_file};
use super::{load_config, ocr_adapter, open_store};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Glob pattern of input files
    #[arg(required = true)]
    input: String,

    /// Owner of the imported transactions
    #[arg(short, long)]
    owner: String,

    /// Transaction store file (default: from config)
    #[arg(short, long)]
    store: Option<PathBuf>,

    /// Write a per-file summary CSV to this path
    #[arg(long)]
    summary: Option<PathBuf>,
}

/// Outcome of importing a single file.
struct FileResult {
    path: PathBuf,
    response: Result<UploadResponse, String>,
    processing_time_ms: u64,
}

impl FileResult {
    fn status(&self) -> &str {
        match &self.response {
            Ok(response) => response.message.as_str(),
            Err(_) => "Error",
        }
    }

    fn records(&self) -> usize {
        self.response.as_ref().map(|r| r.records).unwrap_or(0)
    }

    fn errors(&self) -> Vec<String> {
        match &self.response {
            Ok(response) => response.errors.clone(),
            Err(e) => vec![e.clone()],
        }
    }
}

pub async fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    let files: Vec<PathBuf> = glob(&args.input)?
        .filter_map(|r| r.ok())
        .filter(|p| p.is_file() && FileKind::from_filename(&display_name(p)).is_ok())
        .collect();

    if files.is_empty() {
        anyhow::bail!("No matching files found for pattern: {}", args.input);
    }

    println!("{} Found {} files to import", style("ℹ").blue(), files.len());

    // One adapter for the whole run so OCR models load at most once.
    let ocr = ocr_adapter(&config);
    let store = open_store(&config, args.store.as_deref());
    let dispatcher = Dispatcher::new(&ocr, &store).with_pdf_config(config.pdf.clone());

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files {msg}")?
            .progress_chars("=>-"),
    );

    let mut results = Vec::with_capacity(files.len());
    for path in files {
        pb.set_message(display_name(&path));
        let file_start = Instant::now();

        let response = import_file(&dispatcher, &path, &args.owner).map_err(|e| {
            warn!("Failed to import {}: {}", path.display(), e);
            e.to_string()
        });

        results.push(FileResult {
            path,
            response,
            processing_time_ms: file_start.elapsed().as_millis() as u64,
        });
        pb.inc(1);
    }

    pb.finish_and_clear();

    if let Some(summary_path) = &args.summary {
        write_summary(summary_path, &results)?;
        println!("{} Summary written to {}", style("✓").green(), summary_path.display());
    }

    let imported: usize = results.iter().map(FileResult::records).sum();
    let failed: Vec<_> = results
        .iter()
        .filter(|r| r.response.as_ref().map_or(true, |resp| resp.message == UploadStatus::Failed))
        .collect();

    println!();
    println!(
        "{} Imported {} transactions from {} files in {:?}",
        style("✓").green(),
        imported,
        results.len(),
        start.elapsed()
    );
    println!(
        "   {} succeeded, {} failed",
        style(results.len() - failed.len()).green(),
        style(failed.len()).red()
    );

    if !failed.is_empty() {
        println!();
        println!("{}", style("Failed files:").red());
        for result in &failed {
            println!("  - {}: {}", result.path.display(), result.errors().join("; "));
        }
    }

    Ok(())
}

/// One line of the summary CSV; field names become the header row.
#[derive(Serialize)]
struct SummaryRow<'a> {
    filename: String,
    status: &'a str,
    records: usize,
    errors: String,
    processing_time_ms: u64,
}

fn write_summary(path: &Path, results: &[FileResult]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    for result in results {
        wtr.serialize(SummaryRow {
            filename: display_name(&result.path),
            status: result.status(),
            records: result.records(),
            errors: result.errors().join("; "),
            processing_time_ms: result.processing_time_ms,
        })?;
    }

    wtr.flush()?;
    debug!("Wrote summary for {} files", results.len());
    Ok(())
}
