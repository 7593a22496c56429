//! Excel workbook loader (`.xlsx`, `.xlsm`, `.xls`).

use std::fmt::Display;
use std::io::{Cursor, Read, Seek};

use calamine::{open_workbook_from_rs, Data, Range, Reader, Xls, Xlsx};
use chrono::{Duration, NaiveDate};
use tracing::warn;

use super::{RawSheet, Result, TableLoader};
use crate::error::LoadError;

/// Reads every non-empty worksheet of a workbook as its own sheet.
#[derive(Debug, Clone, Default)]
pub struct XlsxLoader;

impl XlsxLoader {
    pub fn new() -> Self {
        Self
    }
}

impl TableLoader for XlsxLoader {
    fn extensions(&self) -> &[&'static str] {
        &["xlsx", "xlsm", "xls"]
    }

    fn load(&self, name: &str, data: &[u8]) -> Result<Vec<RawSheet>> {
        let is_legacy = name.to_lowercase().ends_with(".xls");
        let cursor = Cursor::new(data);

        if is_legacy {
            let workbook: Xls<_> = open_workbook_from_rs(cursor)
                .map_err(|e| LoadError::Excel(format!("failed to open {}: {}", name, e)))?;
            Ok(read_worksheets(name, workbook))
        } else {
            let workbook: Xlsx<_> = open_workbook_from_rs(cursor)
                .map_err(|e| LoadError::Excel(format!("failed to open {}: {}", name, e)))?;
            Ok(read_worksheets(name, workbook))
        }
    }
}

fn read_worksheets<RS, W>(name: &str, mut workbook: W) -> Vec<RawSheet>
where
    RS: Read + Seek,
    W: Reader<RS>,
    W::Error: Display,
{
    let sheet_names: Vec<String> = workbook.sheet_names().to_vec();
    let single = sheet_names.len() == 1;
    let mut sheets = Vec::new();

    for sheet_name in &sheet_names {
        let range = match workbook.worksheet_range(sheet_name) {
            Ok(r) => r,
            Err(e) => {
                warn!("Skipping sheet '{}' in {}: {}", sheet_name, name, e);
                continue;
            }
        };

        let full_name = if single {
            name.to_string()
        } else {
            format!("{}:{}", name, sheet_name)
        };

        if let Some(sheet) = range_to_sheet(full_name, &range) {
            sheets.push(sheet);
        }
    }

    sheets
}

/// First row becomes the headers; blank rows are dropped but keep their
/// sheet line numbers.
fn range_to_sheet(name: String, range: &Range<Data>) -> Option<RawSheet> {
    // ranges start at the first used cell, not at row 1
    let origin = range.start().map(|(row, _)| row as usize).unwrap_or(0);
    let mut row_iter = range.rows().enumerate();

    let (_, header_row) = row_iter.next()?;
    let headers: Vec<String> = header_row.iter().map(cell_to_string).collect();

    let (row_lines, rows): (Vec<usize>, Vec<Vec<String>>) = row_iter
        .map(|(index, row)| (origin + index + 1, row.iter().map(cell_to_string).collect::<Vec<_>>()))
        .filter(|(_, values)| values.iter().any(|v| !v.is_empty()))
        .unzip();

    if headers.iter().all(|h| h.is_empty()) && rows.is_empty() {
        return None;
    }

    Some(RawSheet::new(name, headers, rows).with_lines(origin + 1, row_lines))
}

fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.trim().to_string(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => {
            // Avoid trailing ".0" for whole numbers
            if f.fract() == 0.0 && f.abs() < i64::MAX as f64 {
                format!("{}", *f as i64)
            } else {
                format!("{}", f)
            }
        }
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => excel_serial_to_date(dt.as_f64())
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_default(),
        Data::DateTimeIso(s) => s.clone(),
        Data::DurationIso(s) => s.clone(),
        Data::Error(_) => String::new(),
    }
}

/// Excel serial day number to a calendar date (1900 date system).
fn excel_serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || serial < 1.0 {
        return None;
    }
    // Day 60 is the nonexistent 1900-02-29; later serials count from 1899-12-30.
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    let days = serial.trunc() as i64;
    let days = if days < 61 { days + 1 } else { days };
    epoch.checked_add_signed(Duration::days(days))
}
