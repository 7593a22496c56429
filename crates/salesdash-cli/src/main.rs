//! CLI sales dashboard over POS, online and B2B sheet folders.

mod commands;

use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use commands::{config, invoices, report, sales};

/// Sales dashboard - aggregate POS, online and B2B sales sheets
#[derive(Parser)]
#[command(name = "salesdash")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rebuild invoices and line items from B2B ledger sheets
    Invoices(invoices::InvoicesArgs),

    /// Summarize POS or online sales sheets
    Sales(sales::SalesArgs),

    /// Combined report over the configured source folders
    Report(report::ReportArgs),

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

    match cli.command {
        Commands::Invoices(args) => invoices::run(args, cli.config.as_deref()).await,
        Commands::Sales(args) => sales::run(args, cli.config.as_deref()).await,
        Commands::Report(args) => report::run(args, cli.config.as_deref()).await,
        Commands::Config(args) => config::run(args, cli.config.as_deref()).await,
    }
}
