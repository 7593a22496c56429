//! Report command - combined summary over the configured source folders.

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::NaiveDate;
use clap::{Args, ValueEnum};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use serde_json::json;
use tracing::{debug, warn};

use salesdash_core::{
    records_from_invoices, records_from_sheet, summarize, Channel, InvoiceReconstructor,
    InvoiceTotal, SalesConfig, SalesFilter, SalesRecord, SalesSummary, SourceRows,
};

use super::output::{summary_csv, summary_text, write_output, OutputFormat};
use super::{expand_inputs, load_reported};

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum B2bTotalArg {
    /// Header gross total, one record per invoice
    Gross,
    /// Sum of line values, one record per line item
    Computed,
}

impl From<B2bTotalArg> for InvoiceTotal {
    fn from(arg: B2bTotalArg) -> Self {
        match arg {
            B2bTotalArg::Gross => InvoiceTotal::Gross,
            B2bTotalArg::Computed => InvoiceTotal::Computed,
        }
    }
}

/// Arguments for the report command.
#[derive(Args)]
pub struct ReportArgs {
    /// Earliest sale date (YYYY-MM-DD)
    #[arg(long)]
    from: Option<NaiveDate>,

    /// Latest sale date (YYYY-MM-DD)
    #[arg(long)]
    to: Option<NaiveDate>,

    /// Which B2B figure counts as revenue
    #[arg(long, value_enum, default_value = "gross")]
    b2b_total: B2bTotalArg,

    /// POS folder (overrides config)
    #[arg(long)]
    pos_dir: Option<PathBuf>,

    /// Online folder (overrides config)
    #[arg(long)]
    online_dir: Option<PathBuf>,

    /// B2B folder (overrides config)
    #[arg(long)]
    b2b_dir: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Output file (stdout if not specified)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

/// Records gathered from one channel folder.
struct ChannelLoad {
    channel: Channel,
    records: Vec<SalesRecord>,
}

pub async fn run(args: ReportArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let mut config = super::load_config(config_path)?;
    if let Some(dir) = args.pos_dir.clone() {
        config.sources.pos_dir = dir;
    }
    if let Some(dir) = args.online_dir.clone() {
        config.sources.online_dir = dir;
    }
    if let Some(dir) = args.b2b_dir.clone() {
        config.sources.b2b_dir = dir;
    }

    let total = InvoiceTotal::from(args.b2b_total);
    let multi_progress = MultiProgress::new();
    let spinner_style = ProgressStyle::with_template("{spinner:.green} {prefix:<7} {msg}")?;

    let mut handles = Vec::new();
    for channel in [Channel::Pos, Channel::Online, Channel::B2b] {
        let pb = multi_progress.add(ProgressBar::new_spinner());
        pb.set_style(spinner_style.clone());
        pb.set_prefix(channel.to_string());
        pb.set_message("loading");
        pb.enable_steady_tick(Duration::from_millis(100));

        let config = config.clone();
        let handle = tokio::task::spawn_blocking(move || {
            let result = load_channel(channel, &config, total);
            match &result {
                Ok(load) if load.records.is_empty() => pb.finish_with_message("no data"),
                Ok(load) => pb.finish_with_message(format!("{} records", load.records.len())),
                Err(e) => pb.finish_with_message(format!("failed: {}", e)),
            }
            result
        });
        handles.push((channel, handle));
    }

    let mut loads = Vec::new();
    for (channel, handle) in handles {
        match handle.await? {
            Ok(load) => loads.push(load),
            Err(e) => {
                warn!("{} sources failed: {}", channel, e);
                loads.push(ChannelLoad { channel, records: Vec::new() });
            }
        }
    }

    let filter = SalesFilter {
        from: args.from,
        to: args.to,
        ..SalesFilter::default()
    };

    let per_channel: Vec<(Channel, SalesSummary)> = loads
        .iter()
        .map(|load| (load.channel, summarize(&load.records, &filter)))
        .collect();
    let all_records: Vec<SalesRecord> = loads.into_iter().flat_map(|l| l.records).collect();
    let combined = summarize(&all_records, &filter);

    let content = match args.format {
        OutputFormat::Json => {
            let mut channels = serde_json::Map::new();
            for (channel, summary) in &per_channel {
                channels.insert(channel.to_string(), serde_json::to_value(summary)?);
            }
            serde_json::to_string_pretty(&json!({
                "channels": channels,
                "combined": combined,
            }))?
        }
        OutputFormat::Csv => summary_csv(&combined)?,
        OutputFormat::Text => report_text(&per_channel, &combined),
    };

    write_output(&content, args.output.as_deref())
}

fn report_text(per_channel: &[(Channel, SalesSummary)], combined: &SalesSummary) -> String {
    let mut output = String::new();

    for (channel, summary) in per_channel {
        if summary.is_empty() {
            output.push_str(&format!("{}: no data\n", channel));
        } else {
            output.push_str(&format!(
                "{}: {} records, {:.2}\n",
                channel, summary.record_count, summary.total_amount
            ));
        }
    }
    output.push('\n');
    output.push_str(&summary_text("Combined sales", combined, false));

    output
}

fn channel_dir(channel: Channel, config: &SalesConfig) -> &Path {
    match channel {
        Channel::Pos => &config.sources.pos_dir,
        Channel::Online => &config.sources.online_dir,
        Channel::B2b => &config.sources.b2b_dir,
    }
}

fn load_channel(channel: Channel, config: &SalesConfig, total: InvoiceTotal) -> anyhow::Result<ChannelLoad> {
    let dir = channel_dir(channel, config);
    let empty = ChannelLoad { channel, records: Vec::new() };

    if !dir.is_dir() {
        debug!("{} folder {} not found", channel, dir.display());
        return Ok(empty);
    }

    let files = expand_inputs(&[dir.display().to_string()], &config.sources.extensions)?;
    let Some(loaded) = load_reported(&files)? else {
        return Ok(empty);
    };

    let records = match channel {
        Channel::B2b => {
            let sources: Vec<SourceRows> = loaded
                .sheets
                .iter()
                .map(|sheet| SourceRows::from_sheet(sheet, &config.b2b))
                .collect();
            let reconstruction =
                InvoiceReconstructor::from_config(&config.b2b).reconstruct_sources(&sources);
            records_from_invoices(&reconstruction, total)
        }
        _ => loaded
            .sheets
            .iter()
            .filter_map(|sheet| match records_from_sheet(sheet, channel, &config.sales) {
                Ok(records) => Some(records),
                Err(e) => {
                    warn!("Skipping sheet: {}", e);
                    None
                }
            })
            .flatten()
            .collect(),
    };

    Ok(ChannelLoad { channel, records })
}
