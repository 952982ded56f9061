//! CLI for importing financial documents into a transaction ledger.

mod commands;

use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use commands::{add, batch, config, import, list};

/// tally - Turn bank statements, spreadsheets and receipts into transactions
#[derive(Parser)]
#[command(name = "tally")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Import transactions from a single file
    Import(import::ImportArgs),

    /// Import transactions from every file matching a pattern
    Batch(batch::BatchArgs),

    /// List stored transactions
    List(list::ListArgs),

    /// Record a single transaction by hand
    Add(add::AddArgs),

    /// Manage configuration
    Config(config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let config_path = cli.config.as_deref();
    match cli.command {
        Commands::Import(args) => import::run(args, config_path).await,
        Commands::Batch(args) => batch::run(args, config_path).await,
        Commands::List(args) => list::run(args, config_path).await,
        Commands::Add(args) => add::run(args, config_path).await,
        Commands::Config(args) => config::run(args).await,
    }
}
