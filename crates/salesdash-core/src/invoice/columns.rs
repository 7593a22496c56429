//! Column mapping from ad-hoc sheet headers to field roles.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::rules::patterns::{HEADER_PUNCTUATION, WHITESPACE};
use crate::models::config::{B2bColumns, B2bConfig};
use crate::table::RawSheet;

/// Known roles a B2B ledger column can play.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldRole {
    Date,
    Vendor,
    VoucherNo,
    /// Header marker: populated only on invoice header rows.
    GrossTotal,
    Product,
    Quantity,
    Rate,
    Value,
}

impl FieldRole {
    pub const ALL: [FieldRole; 8] = [
        FieldRole::Date,
        FieldRole::Vendor,
        FieldRole::VoucherNo,
        FieldRole::GrossTotal,
        FieldRole::Product,
        FieldRole::Quantity,
        FieldRole::Rate,
        FieldRole::Value,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FieldRole::Date => "date",
            FieldRole::Vendor => "vendor",
            FieldRole::VoucherNo => "voucher_no",
            FieldRole::GrossTotal => "gross_total",
            FieldRole::Product => "product",
            FieldRole::Quantity => "quantity",
            FieldRole::Rate => "rate",
            FieldRole::Value => "value",
        }
    }
}

/// One sheet row keyed by field role.
///
/// Empty cells and unmapped columns are both absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRow {
    /// 1-based row number in the sheet, header row included.
    pub line: usize,
    fields: BTreeMap<FieldRole, String>,
}

impl RawRow {
    pub fn new(line: usize) -> Self {
        Self {
            line,
            fields: BTreeMap::new(),
        }
    }

    /// Set a field; blank values are ignored.
    pub fn with(mut self, role: FieldRole, value: impl Into<String>) -> Self {
        self.set(role, value);
        self
    }

    pub fn set(&mut self, role: FieldRole, value: impl Into<String>) {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            self.fields.remove(&role);
        } else {
            self.fields.insert(role, trimmed.to_string());
        }
    }

    /// Non-empty value of a field.
    pub fn get(&self, role: FieldRole) -> Option<&str> {
        self.fields.get(&role).map(String::as_str)
    }

    pub fn has(&self, role: FieldRole) -> bool {
        self.fields.contains_key(&role)
    }
}

/// Rows of one source sheet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceRows {
    pub source: String,
    pub rows: Vec<RawRow>,
}

impl SourceRows {
    pub fn new(source: impl Into<String>, rows: Vec<RawRow>) -> Self {
        Self {
            source: source.into(),
            rows,
        }
    }

    /// Detect the header row of a sheet and map its data rows.
    ///
    /// A sheet without a recognizable header yields no rows.
    pub fn from_sheet(sheet: &RawSheet, config: &B2bConfig) -> Self {
        let rows = match ColumnMapping::detect(sheet, &config.columns, config.header_scan_rows) {
            Some(mapping) => mapping.rows(sheet),
            None => {
                warn!("No recognizable header row in {}", sheet.name);
                Vec::new()
            }
        };
        Self::new(sheet.name.clone(), rows)
    }
}

/// Lowercase, drop punctuation, collapse whitespace.
pub fn normalize_header(header: &str) -> String {
    let lowered = header.to_lowercase();
    let spaced = HEADER_PUNCTUATION.replace_all(&lowered, " ");
    WHITESPACE.replace_all(spaced.trim(), " ").into_owned()
}

/// Index of the first header matching any alias, trying aliases in order.
pub fn find_column(headers: &[String], aliases: &[String]) -> Option<usize> {
    let normalized: Vec<String> = headers.iter().map(|h| normalize_header(h)).collect();
    aliases.iter().find_map(|alias| {
        let alias = normalize_header(alias);
        normalized.iter().position(|h| !h.is_empty() && *h == alias)
    })
}

/// Field role to column index, plus where the data starts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnMapping {
    columns: BTreeMap<FieldRole, usize>,
    /// Index into `RawSheet::rows` of the first data row.
    data_start: usize,
}

impl ColumnMapping {
    /// Map a header row. Several roles may resolve to the same column.
    pub fn from_headers(headers: &[String], aliases: &B2bColumns) -> Self {
        let columns = FieldRole::ALL
            .iter()
            .filter_map(|role| find_column(headers, aliases.aliases(*role)).map(|i| (*role, i)))
            .collect();

        Self {
            columns,
            data_start: 0,
        }
    }

    /// Find the header row among the sheet headers and the next
    /// `scan_rows` rows: the first candidate recognizing two roles wins.
    pub fn detect(sheet: &RawSheet, aliases: &B2bColumns, scan_rows: usize) -> Option<Self> {
        let first = Self::from_headers(&sheet.headers, aliases);
        if first.len() >= 2 {
            return Some(first);
        }

        for (index, row) in sheet.rows.iter().take(scan_rows).enumerate() {
            let mut mapping = Self::from_headers(row, aliases);
            if mapping.len() >= 2 {
                debug!("Header row of {} found at data row {}", sheet.name, index + 1);
                mapping.data_start = index + 1;
                return Some(mapping);
            }
        }

        None
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn column(&self, role: FieldRole) -> Option<usize> {
        self.columns.get(&role).copied()
    }

    /// Roles with no matching column.
    pub fn missing(&self) -> Vec<FieldRole> {
        FieldRole::ALL
            .iter()
            .copied()
            .filter(|role| !self.columns.contains_key(role))
            .collect()
    }

    /// Convert the sheet's data rows.
    pub fn rows(&self, sheet: &RawSheet) -> Vec<RawRow> {
        (self.data_start..sheet.rows.len())
            .map(|index| {
                let mut row = RawRow::new(sheet.line(index));
                for (role, column) in &self.columns {
                    row.set(*role, sheet.cell(index, *column));
                }
                row
            })
            .collect()
    }
}
