//! Invoice and line item tables reconstructed from B2B ledger sheets.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::config::VoucherScope;

/// One invoice (voucher) from a B2B sheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    /// Voucher number, unique within one reconstruction scope.
    pub voucher_no: String,

    /// Invoice date from the header row.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,

    /// Counterparty named on the header row.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vendor: Option<String>,

    /// Amount printed on the header row.
    pub gross_total: Option<Decimal>,

    /// Number of line items under this voucher.
    pub item_count: usize,

    /// Sum of the parsed line values, `None` when no item carries one.
    pub computed_total: Option<Decimal>,

    /// Sheet or file the invoice was read from.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl Invoice {
    /// Difference between the printed gross total and the item sum.
    ///
    /// Source files disagree on rounding and tax inclusion, so neither
    /// number overrides the other; this only reports the gap.
    pub fn total_difference(&self) -> Option<Decimal> {
        match (self.gross_total, self.computed_total) {
            (Some(gross), Some(computed)) => Some(gross - computed),
            _ => None,
        }
    }
}

/// A single product line under a voucher.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    /// Voucher the line belongs to (after forward-fill).
    pub voucher_no: String,

    /// Product description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product: Option<String>,

    /// Quantity taken from the first run of digits in the cell.
    pub quantity: Option<Decimal>,

    /// Parsed unit rate.
    pub rate: Option<Decimal>,

    /// Rate cell as it appeared in the sheet.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rate_raw: Option<String>,

    /// Parsed line value.
    pub line_value: Option<Decimal>,

    /// Sheet or file the line was read from.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    /// 1-based row number within the source sheet.
    pub line: usize,
}

/// Counters collected while scanning rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconstructionStats {
    pub rows_scanned: usize,
    pub header_rows: usize,
    pub item_rows: usize,
    /// Header rows dropped because no voucher key was known.
    pub orphan_header_rows: usize,
    /// Item rows dropped because no voucher key was known.
    pub orphan_item_rows: usize,
    /// Header rows ignored because the voucher already had one.
    pub duplicate_header_rows: usize,
    /// Non-empty amount cells that did not parse.
    pub unparsed_amounts: usize,
}

impl ReconstructionStats {
    /// Add the counters of another run.
    pub fn absorb(&mut self, other: &ReconstructionStats) {
        self.rows_scanned += other.rows_scanned;
        self.header_rows += other.header_rows;
        self.item_rows += other.item_rows;
        self.orphan_header_rows += other.orphan_header_rows;
        self.orphan_item_rows += other.orphan_item_rows;
        self.duplicate_header_rows += other.duplicate_header_rows;
        self.unparsed_amounts += other.unparsed_amounts;
    }
}

/// A voucher number found in more than one source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoucherCollision {
    pub voucher_no: String,
    pub sources: Vec<String>,
}

/// Output of a reconstruction run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Reconstruction {
    /// One row per voucher, in order of first appearance.
    pub invoices: Vec<Invoice>,

    /// Line items in sheet order.
    pub line_items: Vec<LineItem>,

    /// Scan counters.
    pub stats: ReconstructionStats,

    /// Voucher numbers shared between sources.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub collisions: Vec<VoucherCollision>,

    /// Voucher scoping the run used; decides how items find their invoice.
    #[serde(default)]
    pub scope: VoucherScope,
}

impl Reconstruction {
    /// Whether any header row was found.
    ///
    /// Sheets without header rows still produce line items; callers show
    /// "no invoice metadata available" instead of an invoice table.
    pub fn has_invoice_metadata(&self) -> bool {
        !self.invoices.is_empty()
    }

    /// Whether nothing at all was reconstructed.
    pub fn is_empty(&self) -> bool {
        self.invoices.is_empty() && self.line_items.is_empty()
    }

    /// Line items belonging to one invoice.
    ///
    /// Outside merged runs items must also come from the invoice's source:
    /// a voucher number reused by another file never owns that file's items.
    pub fn items_for<'a>(&'a self, invoice: &'a Invoice) -> impl Iterator<Item = &'a LineItem> + 'a {
        self.line_items
            .iter()
            .filter(move |item| self.owns(invoice, item))
    }

    /// Invoice owning a line item, if any.
    pub fn invoice_for(&self, item: &LineItem) -> Option<&Invoice> {
        self.invoices.iter().find(|invoice| self.owns(invoice, item))
    }

    fn owns(&self, invoice: &Invoice, item: &LineItem) -> bool {
        item.voucher_no == invoice.voucher_no
            && (self.scope == VoucherScope::Merged || item.source == invoice.source)
    }

    /// Sum of gross totals, skipping invoices without one.
    pub fn gross_total(&self) -> Decimal {
        self.invoices.iter().filter_map(|i| i.gross_total).sum()
    }

    /// Sum of computed totals, skipping invoices without one.
    pub fn computed_total(&self) -> Decimal {
        self.invoices.iter().filter_map(|i| i.computed_total).sum()
    }
}
