//! Add command - record one transaction typed in by hand.

use std::path::PathBuf;

use clap::Args;
use console::style;
use tracing::info;

use tally_core::{ManualEntry, TransactionStore};

use super::{load_config, open_store};

/// Arguments for the add command.
#[derive(Args)]
pub struct AddArgs {
    /// Owner of the transaction
    #[arg(short, long)]
    owner: String,

    /// Amount; currency symbols and separators are ignored
    #[arg(short, long, allow_hyphen_values = true)]
    amount: String,

    /// Category name (e.g. Food, Transport)
    #[arg(long, default_value = "Other")]
    category: String,

    /// "credit" or "debit"
    #[arg(short, long, default_value = "debit")]
    direction: String,

    /// Transaction date (default: today)
    #[arg(long)]
    date: Option<String>,

    /// Free-text description
    #[arg(long)]
    description: Option<String>,

    /// Transaction store file (default: from config)
    #[arg(short, long)]
    store: Option<PathBuf>,
}

pub async fn run(args: AddArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let store = open_store(&config, args.store.as_deref());

    let owner = args.owner.clone();
    let record = ManualEntry {
        owner_id: args.owner,
        amount: args.amount,
        category: args.category,
        direction: args.direction,
        date: args.date,
        description: args.description,
    }
    .into_record()?;

    store.insert_batch(&owner, std::slice::from_ref(&record))?;
    info!("Added manual transaction to {}", store.path().display());

    println!(
        "{} Added {} {} of {} on {} ({})",
        style("✓").green(),
        record.category(),
        record.direction(),
        record.amount(),
        record.date(),
        if record.description().is_empty() { "no description" } else { record.description() }
    );

    Ok(())
}
