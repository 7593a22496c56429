//! POS/Online sales sheets: normalization, filtering and aggregation.

mod summary;

pub use summary::{summarize, GroupTotal, SalesFilter, SalesSummary};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::LoadError;
use crate::invoice::find_column;
use crate::invoice::rules::{clean_amount, parse_sheet_date};
use crate::models::config::SalesColumns;
use crate::models::invoice::{Invoice, LineItem, Reconstruction};
use crate::models::sales::{Channel, SalesRecord};
use crate::table::RawSheet;

const UNKNOWN: &str = "Unknown";

/// Which invoice figure counts as the B2B sale amount.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceTotal {
    /// One record per invoice carrying the header gross total.
    #[default]
    Gross,
    /// One record per line item carrying its line value.
    Computed,
}

/// Normalize a POS/Online sheet.
///
/// Date and Amount columns are required; the rest default to "Unknown"
/// or null. Unparseable dates and amounts become null.
pub fn records_from_sheet(
    sheet: &RawSheet,
    channel: Channel,
    columns: &SalesColumns,
) -> Result<Vec<SalesRecord>, LoadError> {
    let date_col = find_column(&sheet.headers, &columns.date);
    let amount_col = find_column(&sheet.headers, &columns.amount);

    let (Some(date_col), Some(amount_col)) = (date_col, amount_col) else {
        let mut missing = Vec::new();
        if date_col.is_none() {
            missing.push("Date".to_string());
        }
        if amount_col.is_none() {
            missing.push("Amount".to_string());
        }
        return Err(LoadError::MissingColumns {
            sheet: sheet.name.clone(),
            columns: missing,
        });
    };

    let store_col = find_column(&sheet.headers, &columns.store);
    let product_col = find_column(&sheet.headers, &columns.product);
    let quantity_col = find_column(&sheet.headers, &columns.quantity);
    let size_col = find_column(&sheet.headers, &columns.size);

    let text = |row: usize, col: Option<usize>| -> Option<String> {
        col.map(|c| sheet.cell(row, c).trim())
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    };

    let records: Vec<SalesRecord> = (0..sheet.rows.len())
        .map(|row| SalesRecord {
            channel,
            date: parse_sheet_date(sheet.cell(row, date_col)),
            store: text(row, store_col).unwrap_or_else(|| UNKNOWN.to_string()),
            product: text(row, product_col).unwrap_or_else(|| UNKNOWN.to_string()),
            quantity: text(row, quantity_col).and_then(|q| clean_amount(&q)),
            size: text(row, size_col),
            amount: clean_amount(sheet.cell(row, amount_col)),
            source: Some(sheet.name.clone()),
        })
        .collect();

    debug!("{}: {} {} records", sheet.name, records.len(), channel);
    Ok(records)
}

/// Turn reconstructed B2B invoices into sales records.
///
/// Line items without an owning invoice (sheets with no header rows)
/// still count as undated "Unknown" sales under either total. Invoices
/// without a date or amount still produce a record; the summary counts
/// them separately.
pub fn records_from_invoices(reconstruction: &Reconstruction, total: InvoiceTotal) -> Vec<SalesRecord> {
    match total {
        InvoiceTotal::Gross => {
            let invoices = reconstruction.invoices.iter().map(|invoice| {
                let quantity = reconstruction
                    .items_for(invoice)
                    .filter_map(|i| i.quantity)
                    .fold(None, |acc: Option<Decimal>, q| Some(acc.unwrap_or(Decimal::ZERO) + q));

                SalesRecord {
                    channel: Channel::B2b,
                    date: invoice.date,
                    store: invoice.vendor.clone().unwrap_or_else(|| UNKNOWN.to_string()),
                    product: format!("Invoice {}", invoice.voucher_no),
                    quantity,
                    size: None,
                    amount: invoice.gross_total,
                    source: invoice.source.clone(),
                }
            });
            let unowned = reconstruction
                .line_items
                .iter()
                .filter(|item| reconstruction.invoice_for(item).is_none())
                .map(|item| item_record(item, None));

            invoices.chain(unowned).collect()
        }
        InvoiceTotal::Computed => reconstruction
            .line_items
            .iter()
            .map(|item| item_record(item, reconstruction.invoice_for(item)))
            .collect(),
    }
}

fn item_record(item: &LineItem, invoice: Option<&Invoice>) -> SalesRecord {
    SalesRecord {
        channel: Channel::B2b,
        date: invoice.and_then(|i| i.date),
        store: invoice
            .and_then(|i| i.vendor.clone())
            .unwrap_or_else(|| UNKNOWN.to_string()),
        product: item.product.clone().unwrap_or_else(|| UNKNOWN.to_string()),
        quantity: item.quantity,
        size: None,
        amount: item.line_value,
        source: item.source.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invoice::{FieldRole, InvoiceReconstructor, RawRow};
    use chrono::NaiveDate;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_records_from_sheet() {
        let sheet = RawSheet::new(
            "pos.csv",
            strings(&["Date", "Store", "Product", "Quantity Ordered", "Size", "Amount"]),
            vec![
                strings(&["2024-01-01", "Central", "Latte", "2", "L", "9.00"]),
                strings(&["bad date", "", "Mocha", "x", "", "1,200"]),
            ],
        );

        let records = records_from_sheet(&sheet, Channel::Pos, &SalesColumns::default()).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].date, NaiveDate::from_ymd_opt(2024, 1, 1));
        assert_eq!(records[0].quantity, Some(Decimal::from(2)));
        assert_eq!(records[0].size.as_deref(), Some("L"));
        assert_eq!(records[1].date, None);
        assert_eq!(records[1].store, "Unknown");
        assert_eq!(records[1].quantity, None);
        assert_eq!(records[1].amount, Some(Decimal::from(1200)));
    }

    #[test]
    fn test_missing_columns() {
        let sheet = RawSheet::new("online.csv", strings(&["Store", "Product"]), vec![]);

        let err = records_from_sheet(&sheet, Channel::Online, &SalesColumns::default()).unwrap_err();
        match err {
            LoadError::MissingColumns { sheet, columns } => {
                assert_eq!(sheet, "online.csv");
                assert_eq!(columns, vec!["Date", "Amount"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_records_from_invoices() {
        let rows = vec![
            RawRow::new(2)
                .with(FieldRole::Date, "01-01-2024")
                .with(FieldRole::Vendor, "Acme")
                .with(FieldRole::VoucherNo, "INV1")
                .with(FieldRole::GrossTotal, "1,180 Dr"),
            RawRow::new(3)
                .with(FieldRole::Product, "Widget")
                .with(FieldRole::Quantity, "5 pcs")
                .with(FieldRole::Value, "500"),
            RawRow::new(4)
                .with(FieldRole::Product, "Gadget")
                .with(FieldRole::Quantity, "3")
                .with(FieldRole::Value, "500"),
        ];
        let reconstruction = InvoiceReconstructor::new().reconstruct(&rows);

        let gross = records_from_invoices(&reconstruction, InvoiceTotal::Gross);
        assert_eq!(gross.len(), 1);
        assert_eq!(gross[0].store, "Acme");
        assert_eq!(gross[0].amount, Some(Decimal::from(1180)));
        assert_eq!(gross[0].quantity, Some(Decimal::from(8)));

        let computed = records_from_invoices(&reconstruction, InvoiceTotal::Computed);
        assert_eq!(computed.len(), 2);
        assert_eq!(computed[1].product, "Gadget");
        assert_eq!(computed[1].amount, Some(Decimal::from(500)));
    }

    #[test]
    fn test_items_without_invoice_still_count() {
        let rows = vec![
            RawRow::new(2).with(FieldRole::VoucherNo, "INV9"),
            RawRow::new(3)
                .with(FieldRole::Product, "Widget")
                .with(FieldRole::Value, "40"),
        ];
        let reconstruction = InvoiceReconstructor::new().reconstruct(&rows);
        assert!(!reconstruction.has_invoice_metadata());

        for total in [InvoiceTotal::Gross, InvoiceTotal::Computed] {
            let records = records_from_invoices(&reconstruction, total);
            assert_eq!(records.len(), 1);
            assert_eq!(records[0].amount, Some(Decimal::from(40)));
            assert_eq!(records[0].store, "Unknown");
            assert_eq!(records[0].product, "Widget");
            assert_eq!(records[0].date, None);
        }
    }
}
