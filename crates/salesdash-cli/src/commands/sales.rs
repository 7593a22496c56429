//! Sales command - summarize POS or online sales sheets.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, ValueEnum};
use console::style;
use tracing::warn;

use salesdash_core::{records_from_sheet, summarize, Channel, SalesFilter, SalesRecord};

use super::output::{summary_csv, summary_text, write_output, OutputFormat};
use super::{expand_inputs, load_config, load_reported};

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum ChannelArg {
    /// Point-of-sale sheets
    Pos,
    /// Online store sheets
    Online,
}

impl From<ChannelArg> for Channel {
    fn from(arg: ChannelArg) -> Self {
        match arg {
            ChannelArg::Pos => Channel::Pos,
            ChannelArg::Online => Channel::Online,
        }
    }
}

/// Arguments for the sales command.
#[derive(Args)]
pub struct SalesArgs {
    /// Sheet files, directories or glob patterns
    #[arg(required = true)]
    inputs: Vec<String>,

    /// Sales channel of the inputs
    #[arg(long, value_enum, default_value = "pos")]
    channel: ChannelArg,

    /// Earliest sale date (YYYY-MM-DD)
    #[arg(long)]
    from: Option<NaiveDate>,

    /// Latest sale date (YYYY-MM-DD)
    #[arg(long)]
    to: Option<NaiveDate>,

    /// Only this store (repeatable)
    #[arg(long = "store")]
    stores: Vec<String>,

    /// Only products containing this text
    #[arg(long)]
    product: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Output file (stdout if not specified)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Include per-day totals
    #[arg(long)]
    daily: bool,
}

pub async fn run(args: SalesArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let channel = Channel::from(args.channel);
    let files = expand_inputs(&args.inputs, &config.sources.extensions)?;

    let Some(loaded) = load_reported(&files)? else {
        println!("{} No data found in {}", style("ℹ").blue(), args.inputs.join(", "));
        return Ok(());
    };

    let mut records: Vec<SalesRecord> = Vec::new();
    for sheet in &loaded.sheets {
        match records_from_sheet(sheet, channel, &config.sales) {
            Ok(sheet_records) => records.extend(sheet_records),
            Err(e) => warn!("Skipping sheet: {}", e),
        }
    }

    let filter = SalesFilter {
        from: args.from,
        to: args.to,
        stores: args.stores.clone(),
        product: args.product.clone(),
        channel: None,
    };
    let summary = summarize(&records, &filter);

    let content = match args.format {
        OutputFormat::Json => serde_json::to_string_pretty(&summary)?,
        OutputFormat::Csv => summary_csv(&summary)?,
        OutputFormat::Text => summary_text(&format!("{} sales", channel), &summary, args.daily),
    };

    write_output(&content, args.output.as_deref())
}
