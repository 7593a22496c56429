//! Invoices command - rebuild invoices from B2B ledger sheets.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::Args;
use console::style;
use tracing::info;

use salesdash_core::{
    FailedParsePolicy, InvoiceFilter, InvoiceReconstructor, SourceRows, VoucherScope,
};

use super::output::{invoices_csv, invoices_text, write_output, OutputFormat};
use super::{expand_inputs, load_config, load_reported};

/// Arguments for the invoices command.
#[derive(Args)]
pub struct InvoicesArgs {
    /// Sheet files, directories or glob patterns
    #[arg(required = true)]
    inputs: Vec<String>,

    /// Output file (stdout if not specified)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Include line items
    #[arg(long)]
    items: bool,

    /// Treat all files as one voucher namespace
    #[arg(long)]
    merge: bool,

    /// Count unparseable amounts as zero instead of excluding them
    #[arg(long)]
    zero_failed: bool,

    /// Only invoices whose vendor contains this text
    #[arg(long)]
    vendor: Option<String>,

    /// Earliest invoice date (YYYY-MM-DD)
    #[arg(long)]
    from: Option<NaiveDate>,

    /// Latest invoice date (YYYY-MM-DD)
    #[arg(long)]
    to: Option<NaiveDate>,
}

pub async fn run(args: InvoicesArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let files = expand_inputs(&args.inputs, &config.sources.extensions)?;

    let Some(loaded) = load_reported(&files)? else {
        println!("{} No data found in {}", style("ℹ").blue(), args.inputs.join(", "));
        return Ok(());
    };

    let mut b2b = config.b2b.clone();
    if args.merge {
        b2b.scope = VoucherScope::Merged;
    }
    if args.zero_failed {
        b2b.failed_parse = FailedParsePolicy::Zero;
    }

    let sources: Vec<SourceRows> = loaded
        .sheets
        .iter()
        .map(|sheet| SourceRows::from_sheet(sheet, &b2b))
        .collect();

    let reconstruction = InvoiceReconstructor::from_config(&b2b).reconstruct_sources(&sources);

    let filter = InvoiceFilter {
        from: args.from,
        to: args.to,
        vendor: args.vendor.clone(),
    };
    let reconstruction = filter.apply(reconstruction);
    info!(
        "{} invoices, {} line items after filtering",
        reconstruction.invoices.len(),
        reconstruction.line_items.len()
    );

    let content = match args.format {
        OutputFormat::Json => serde_json::to_string_pretty(&reconstruction)?,
        OutputFormat::Csv => invoices_csv(&reconstruction, args.items)?,
        OutputFormat::Text => invoices_text(&reconstruction, args.items),
    };

    write_output(&content, args.output.as_deref())
}
