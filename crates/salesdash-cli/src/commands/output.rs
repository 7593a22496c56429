//! Rendering of invoices and summaries as text, CSV or JSON.

use std::fs;
use std::path::Path;

use console::style;
use rust_decimal::Decimal;

use salesdash_core::{Reconstruction, SalesSummary};

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output
    Csv,
    /// Plain text tables
    Text,
}

/// Write to a file, or print to stdout when no path is given.
pub fn write_output(content: &str, output: Option<&Path>) -> anyhow::Result<()> {
    match output {
        Some(path) => {
            fs::write(path, content)?;
            println!("{} Output written to {}", style("✓").green(), path.display());
        }
        None => println!("{}", content),
    }
    Ok(())
}

pub fn amount(value: Option<Decimal>) -> String {
    value.map(|v| format!("{:.2}", v)).unwrap_or_else(|| "-".to_string())
}

fn text(value: Option<&str>) -> String {
    value.unwrap_or("-").to_string()
}

/// Left-aligned table with a dashed rule under the header.
fn table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if let Some(w) = widths.get_mut(i) {
                *w = (*w).max(cell.chars().count());
            }
        }
    }

    let mut out = String::new();
    out.push_str(&render_line(headers, &widths));
    out.push('\n');
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    out.push_str(&render_line(&rule, &widths));
    out.push('\n');
    for row in rows {
        out.push_str(&render_line(row, &widths));
        out.push('\n');
    }
    out
}

fn render_line<S: AsRef<str>>(cells: &[S], widths: &[usize]) -> String {
    cells
        .iter()
        .zip(widths)
        .map(|(c, w)| format!("{:<width$}", c.as_ref(), width = *w))
        .collect::<Vec<_>>()
        .join("  ")
        .trim_end()
        .to_string()
}

pub fn invoices_text(reconstruction: &Reconstruction, with_items: bool) -> String {
    let mut output = String::new();

    if reconstruction.has_invoice_metadata() {
        output.push_str(&format!("Invoices: {}\n\n", reconstruction.invoices.len()));

        let rows: Vec<Vec<String>> = reconstruction
            .invoices
            .iter()
            .map(|inv| {
                vec![
                    inv.voucher_no.clone(),
                    inv.date.map(|d| d.to_string()).unwrap_or_else(|| "-".to_string()),
                    text(inv.vendor.as_deref()),
                    amount(inv.gross_total),
                    amount(inv.computed_total),
                    inv.item_count.to_string(),
                    amount(inv.total_difference()),
                ]
            })
            .collect();

        output.push_str(&table(
            &["VOUCHER", "DATE", "VENDOR", "GROSS", "COMPUTED", "ITEMS", "DIFF"],
            &rows,
        ));
        output.push('\n');
        output.push_str(&format!(
            "Gross total:    {}\nComputed total: {}\n",
            amount(Some(reconstruction.gross_total())),
            amount(Some(reconstruction.computed_total()))
        ));
    } else {
        output.push_str("No invoice metadata available\n");
    }

    if with_items || !reconstruction.has_invoice_metadata() {
        output.push_str(&format!("\nLine items: {}\n\n", reconstruction.line_items.len()));
        let rows: Vec<Vec<String>> = reconstruction
            .line_items
            .iter()
            .map(|item| {
                vec![
                    item.voucher_no.clone(),
                    text(item.product.as_deref()),
                    amount(item.quantity),
                    text(item.rate_raw.as_deref()),
                    amount(item.line_value),
                ]
            })
            .collect();
        output.push_str(&table(&["VOUCHER", "PRODUCT", "QTY", "RATE", "VALUE"], &rows));
    }

    let stats = &reconstruction.stats;
    output.push_str(&format!(
        "\nRows scanned: {}, header rows: {}, item rows: {}\n",
        stats.rows_scanned, stats.header_rows, stats.item_rows
    ));
    if stats.orphan_header_rows + stats.orphan_item_rows > 0 {
        output.push_str(&format!(
            "Dropped orphan rows: {} header, {} item\n",
            stats.orphan_header_rows, stats.orphan_item_rows
        ));
    }
    if stats.duplicate_header_rows > 0 {
        output.push_str(&format!("Ignored duplicate header rows: {}\n", stats.duplicate_header_rows));
    }
    if stats.unparsed_amounts > 0 {
        output.push_str(&format!("Unparseable amounts: {}\n", stats.unparsed_amounts));
    }
    for collision in &reconstruction.collisions {
        output.push_str(&format!(
            "Warning: voucher {} found in {}\n",
            collision.voucher_no,
            collision.sources.join(", ")
        ));
    }

    output
}

pub fn invoices_csv(reconstruction: &Reconstruction, with_items: bool) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    if with_items {
        wtr.write_record([
            "voucher_no", "date", "vendor", "product", "quantity", "rate", "line_value", "source", "line",
        ])?;
        for item in &reconstruction.line_items {
            let invoice = reconstruction.invoice_for(item);
            wtr.write_record([
                item.voucher_no.clone(),
                invoice.and_then(|i| i.date).map(|d| d.to_string()).unwrap_or_default(),
                invoice.and_then(|i| i.vendor.clone()).unwrap_or_default(),
                item.product.clone().unwrap_or_default(),
                opt(item.quantity),
                item.rate_raw.clone().unwrap_or_default(),
                opt(item.line_value),
                item.source.clone().unwrap_or_default(),
                item.line.to_string(),
            ])?;
        }
    } else {
        wtr.write_record([
            "voucher_no", "date", "vendor", "gross_total", "computed_total", "item_count", "source",
        ])?;
        for inv in &reconstruction.invoices {
            wtr.write_record([
                inv.voucher_no.clone(),
                inv.date.map(|d| d.to_string()).unwrap_or_default(),
                inv.vendor.clone().unwrap_or_default(),
                opt(inv.gross_total),
                opt(inv.computed_total),
                inv.item_count.to_string(),
                inv.source.clone().unwrap_or_default(),
            ])?;
        }
    }

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn opt(value: Option<Decimal>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

pub fn summary_text(title: &str, summary: &SalesSummary, daily: bool) -> String {
    let mut output = String::new();

    output.push_str(&format!("{}\n\n", title));
    if summary.is_empty() {
        output.push_str("No data for the selected filters\n");
        return output;
    }

    output.push_str(&format!("Records:        {}\n", summary.record_count));
    output.push_str(&format!("Total amount:   {}\n", amount(Some(summary.total_amount))));
    output.push_str(&format!("Total quantity: {}\n", summary.total_quantity));
    if summary.missing_amounts > 0 {
        output.push_str(&format!("Missing amounts: {}\n", summary.missing_amounts));
    }
    if summary.undated_records > 0 {
        output.push_str(&format!("Undated records: {}\n", summary.undated_records));
    }

    let group_rows = |groups: Vec<(String, usize, Decimal, Decimal)>| -> Vec<Vec<String>> {
        groups
            .into_iter()
            .map(|(key, records, quantity, amt)| {
                vec![key, records.to_string(), quantity.to_string(), amount(Some(amt))]
            })
            .collect()
    };

    if summary.by_channel.len() > 1 {
        output.push_str("\nBy channel\n");
        output.push_str(&table(
            &["CHANNEL", "RECORDS", "QTY", "AMOUNT"],
            &group_rows(summary.by_channel.iter().map(|g| (g.key.to_string(), g.records, g.quantity, g.amount)).collect()),
        ));
    }

    output.push_str("\nBy store\n");
    output.push_str(&table(
        &["STORE", "RECORDS", "QTY", "AMOUNT"],
        &group_rows(summary.by_store.iter().map(|g| (g.key.clone(), g.records, g.quantity, g.amount)).collect()),
    ));

    output.push_str("\nBy product\n");
    output.push_str(&table(
        &["PRODUCT", "RECORDS", "QTY", "AMOUNT"],
        &group_rows(summary.by_product.iter().map(|g| (g.key.clone(), g.records, g.quantity, g.amount)).collect()),
    ));

    if daily {
        output.push_str("\nBy date\n");
        output.push_str(&table(
            &["DATE", "RECORDS", "QTY", "AMOUNT"],
            &group_rows(summary.by_date.iter().map(|g| (g.key.to_string(), g.records, g.quantity, g.amount)).collect()),
        ));
    }

    output
}

/// Flatten all groupings into one CSV table.
pub fn summary_csv(summary: &SalesSummary) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(["group", "key", "records", "quantity", "amount"])?;

    let mut write = |group: &str, key: String, records: usize, quantity: Decimal, amt: Decimal| {
        wtr.write_record([
            group.to_string(),
            key,
            records.to_string(),
            quantity.to_string(),
            amt.to_string(),
        ])
    };

    write("total", "all".to_string(), summary.record_count, summary.total_quantity, summary.total_amount)?;
    for g in &summary.by_channel {
        write("channel", g.key.to_string(), g.records, g.quantity, g.amount)?;
    }
    for g in &summary.by_store {
        write("store", g.key.clone(), g.records, g.quantity, g.amount)?;
    }
    for g in &summary.by_product {
        write("product", g.key.clone(), g.records, g.quantity, g.amount)?;
    }
    for g in &summary.by_date {
        write("date", g.key.to_string(), g.records, g.quantity, g.amount)?;
    }

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_pads_columns() {
        let rendered = table(&["A", "NAME"], &[vec!["long".to_string(), "x".to_string()]]);
        let lines: Vec<&str> = rendered.lines().collect();

        assert_eq!(lines[0], "A     NAME");
        assert_eq!(lines[1], "----  ----");
        assert_eq!(lines[2], "long  x");
    }

    #[test]
    fn amounts_use_two_decimals() {
        assert_eq!(amount(Some(Decimal::new(15, 1))), "1.50");
        assert_eq!(amount(None), "-");
    }

    #[test]
    fn empty_reconstruction_has_no_metadata_notice() {
        let text = invoices_text(&Reconstruction::default(), false);
        assert!(text.contains("No invoice metadata available"));
    }
}
