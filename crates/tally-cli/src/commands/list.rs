//! List command - show stored transactions, newest first.

use std::path::PathBuf;

use clap::Args;
use console::style;

use tally_core::{Category, Direction, TransactionFilter, TransactionRecord, TransactionStore};

use super::{load_config, open_store};

/// Arguments for the list command.
#[derive(Args)]
pub struct ListArgs {
    /// Owner whose transactions to list
    #[arg(short, long)]
    owner: String,

    /// Maximum number of transactions
    #[arg(short, long, default_value_t = TransactionFilter::DEFAULT_LIMIT)]
    limit: usize,

    /// Only this category (e.g. Food)
    #[arg(long)]
    category: Option<String>,

    /// Only credits or only debits
    #[arg(short, long)]
    direction: Option<Direction>,

    /// Transaction store file (default: from config)
    #[arg(short, long)]
    store: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    format: OutputFormat,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON array
    Json,
    /// CSV with a header row
    Csv,
    /// Aligned plain text
    Text,
}

pub async fn run(args: ListArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let store = open_store(&config, args.store.as_deref());

    let mut filter = TransactionFilter::recent(&args.owner).with_limit(args.limit);
    if let Some(category) = &args.category {
        filter = filter.with_category(Category::from(category.trim()));
    }
    if let Some(direction) = args.direction {
        filter = filter.with_direction(direction);
    }

    let records = store.query(&filter)?;

    let output = match args.format {
        OutputFormat::Json => serde_json::to_string_pretty(&records)?,
        OutputFormat::Csv => format_csv(&records)?,
        OutputFormat::Text => format_text(&records),
    };
    print!("{}", output);

    Ok(())
}

fn format_csv(records: &[TransactionRecord]) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record(["date", "description", "amount", "category", "type", "created_at"])?;

    for record in records {
        wtr.write_record([
            record.date(),
            record.description(),
            &record.amount().to_string(),
            record.category().as_str(),
            record.direction().as_str(),
            &record.created_at().to_rfc3339(),
        ])?;
    }

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_text(records: &[TransactionRecord]) -> String {
    if records.is_empty() {
        return format!("{} No transactions found.\n", style("ℹ").blue());
    }

    let mut output = String::new();
    for record in records {
        let amount = match record.direction() {
            Direction::Credit => style(format!("+{:>12}", record.amount().to_string())).green(),
            Direction::Debit => style(format!("-{:>12}", record.amount().to_string())).red(),
        };
        output.push_str(&format!(
            "{:<12} {} {:<14} {}\n",
            record.date(),
            amount,
            record.category().as_str(),
            record.description()
        ));
    }
    output
}
