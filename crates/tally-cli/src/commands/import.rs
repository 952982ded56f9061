//! Import command - extract transactions from a single file.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use tally_core::{Dispatcher, MemoryStore, TransactionStore, UploadResponse, UploadStatus};

use super::{load_config, ocr_adapter, open_store};

/// Arguments for the import command.
#[derive(Args)]
pub struct ImportArgs {
    /// Input file (CSV, XLSX, XLS, PDF, JPG or PNG)
    #[arg(required = true)]
    input: PathBuf,

    /// Owner of the imported transactions
    #[arg(short, long)]
    owner: String,

    /// Transaction store file (default: from config)
    #[arg(short, long)]
    store: Option<PathBuf>,

    /// Parse the file but do not save anything
    #[arg(long)]
    dry_run: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    format: ReportFormat,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum ReportFormat {
    /// JSON upload response
    Json,
    /// Plain text summary
    Text,
}

pub async fn run(args: ImportArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    info!("Importing file: {}", args.input.display());

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed_precise}] {msg}")?);
    pb.set_message(format!("Extracting {}...", display_name(&args.input)));
    pb.enable_steady_tick(Duration::from_millis(100));

    let ocr = ocr_adapter(&config);
    let memory;
    let file;
    let store: &dyn TransactionStore = if args.dry_run {
        memory = MemoryStore::new();
        &memory
    } else {
        file = open_store(&config, args.store.as_deref());
        &file
    };
    let dispatcher = Dispatcher::new(&ocr, store).with_pdf_config(config.pdf.clone());

    let response = import_file(&dispatcher, &args.input, &args.owner);
    pb.finish_and_clear();
    let response = response?;

    match args.format {
        ReportFormat::Json => println!("{}", serde_json::to_string_pretty(&response)?),
        ReportFormat::Text => print_response(&response, args.dry_run),
    }

    debug!("Total processing time: {:?}", start.elapsed());

    if response.message == UploadStatus::Failed {
        anyhow::bail!("No transactions imported from {}", args.input.display());
    }
    Ok(())
}

/// Read one file and run it through the dispatcher.
pub fn import_file(dispatcher: &Dispatcher<'_>, path: &Path, owner: &str) -> anyhow::Result<UploadResponse> {
    let data = fs::read(path)?;
    Ok(dispatcher.process(&display_name(path), Some(data.as_slice()), Some(owner))?)
}

pub fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn print_response(response: &UploadResponse, dry_run: bool) {
    let marker = match response.message {
        UploadStatus::Success => style("✓").green(),
        UploadStatus::PartialSuccess => style("!").yellow(),
        UploadStatus::Failed => style("✗").red(),
    };

    println!("{} {}: {}", marker, response.message, response.details);
    if dry_run {
        println!("{} Dry run, nothing was saved.", style("ℹ").blue());
    }

    if !response.errors.is_empty() {
        println!();
        println!("{}", style("Errors:").yellow());
        for error in &response.errors {
            println!("  - {}", error);
        }
    }
}
