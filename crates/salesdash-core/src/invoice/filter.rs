//! Date and vendor filters over reconstructed invoices.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::invoice::{Invoice, Reconstruction};

/// Filter applied to a [`Reconstruction`] before display.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceFilter {
    /// Earliest invoice date, inclusive.
    pub from: Option<NaiveDate>,
    /// Latest invoice date, inclusive.
    pub to: Option<NaiveDate>,
    /// Case-insensitive substring of the vendor name.
    pub vendor: Option<String>,
}

impl InvoiceFilter {
    pub fn is_empty(&self) -> bool {
        self.from.is_none() && self.to.is_none() && self.vendor.is_none()
    }

    /// Whether an invoice passes. Undated invoices fail any date bound.
    pub fn matches(&self, invoice: &Invoice) -> bool {
        if self.from.is_some() || self.to.is_some() {
            let Some(date) = invoice.date else {
                return false;
            };
            if self.from.is_some_and(|from| date < from) || self.to.is_some_and(|to| date > to) {
                return false;
            }
        }

        match &self.vendor {
            Some(needle) => invoice
                .vendor
                .as_deref()
                .is_some_and(|v| v.to_lowercase().contains(&needle.to_lowercase())),
            None => true,
        }
    }

    /// Keep matching invoices and their line items.
    ///
    /// Without invoice metadata there is nothing to match line items
    /// against, so they are returned unchanged.
    pub fn apply(&self, reconstruction: Reconstruction) -> Reconstruction {
        if self.is_empty() || !reconstruction.has_invoice_metadata() {
            return reconstruction;
        }

        let kept: Vec<Invoice> = reconstruction
            .invoices
            .iter()
            .filter(|invoice| self.matches(invoice))
            .cloned()
            .collect();

        let line_items = kept
            .iter()
            .flat_map(|invoice| reconstruction.items_for(invoice))
            .cloned()
            .collect::<Vec<_>>();

        let collisions = reconstruction
            .collisions
            .iter()
            .filter(|c| kept.iter().any(|i| i.voucher_no == c.voucher_no))
            .cloned()
            .collect();

        Reconstruction {
            invoices: kept,
            line_items,
            stats: reconstruction.stats,
            collisions,
            scope: reconstruction.scope,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::invoice::LineItem;
    use rust_decimal::Decimal;

    fn invoice(voucher: &str, date: Option<(i32, u32, u32)>, vendor: &str) -> Invoice {
        Invoice {
            voucher_no: voucher.to_string(),
            date: date.and_then(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d)),
            vendor: Some(vendor.to_string()),
            gross_total: Some(Decimal::from(10)),
            item_count: 1,
            computed_total: Some(Decimal::from(10)),
            source: None,
        }
    }

    fn line(voucher: &str) -> LineItem {
        LineItem {
            voucher_no: voucher.to_string(),
            product: None,
            quantity: None,
            rate: None,
            rate_raw: None,
            line_value: Some(Decimal::from(10)),
            source: None,
            line: 0,
        }
    }

    fn sample() -> Reconstruction {
        Reconstruction {
            invoices: vec![
                invoice("INV1", Some((2024, 1, 5)), "Acme Traders"),
                invoice("INV2", Some((2024, 2, 5)), "Beta Stores"),
                invoice("INV3", None, "Acme Retail"),
            ],
            line_items: vec![line("INV1"), line("INV2"), line("INV3")],
            ..Default::default()
        }
    }

    #[test]
    fn test_date_range() {
        let filter = InvoiceFilter {
            from: NaiveDate::from_ymd_opt(2024, 1, 1),
            to: NaiveDate::from_ymd_opt(2024, 1, 31),
            vendor: None,
        };

        let result = filter.apply(sample());

        assert_eq!(result.invoices.len(), 1);
        assert_eq!(result.invoices[0].voucher_no, "INV1");
        assert_eq!(result.line_items.len(), 1);
    }

    #[test]
    fn test_vendor_substring() {
        let filter = InvoiceFilter {
            vendor: Some("acme".to_string()),
            ..Default::default()
        };

        let result = filter.apply(sample());
        let vouchers: Vec<_> = result.invoices.iter().map(|i| i.voucher_no.as_str()).collect();

        assert_eq!(vouchers, vec!["INV1", "INV3"]);
        assert_eq!(result.line_items.len(), 2);
    }

    #[test]
    fn test_no_metadata_passes_items_through() {
        let reconstruction = Reconstruction {
            line_items: vec![line("INV1")],
            ..Default::default()
        };
        let filter = InvoiceFilter {
            vendor: Some("acme".to_string()),
            ..Default::default()
        };

        assert_eq!(filter.apply(reconstruction).line_items.len(), 1);
    }
}
