//! CSV sheet loader.

use super::{RawSheet, Result, TableLoader};

/// Reads comma-separated files into a single sheet.
#[derive(Debug, Clone)]
pub struct CsvLoader {
    delimiter: u8,
}

impl CsvLoader {
    pub fn new() -> Self {
        Self { delimiter: b',' }
    }

    /// Set the field delimiter.
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }
}

impl Default for CsvLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl TableLoader for CsvLoader {
    fn extensions(&self) -> &[&'static str] {
        &["csv"]
    }

    fn load(&self, name: &str, data: &[u8]) -> Result<Vec<RawSheet>> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(self.delimiter)
            .has_headers(false)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(data);

        let mut records = Vec::new();
        for (index, result) in reader.byte_records().enumerate() {
            let record = result?;
            let line = record
                .position()
                .map(|p| p.line() as usize)
                .unwrap_or(index + 1);
            let row: Vec<String> = record
                .iter()
                .map(|field| String::from_utf8_lossy(field).into_owned())
                .collect();

            // Skip completely empty rows
            if row.iter().all(|v| v.is_empty()) {
                continue;
            }
            records.push((line, row));
        }

        let mut rows = records.into_iter();
        let Some((header_line, mut headers)) = rows.next() else {
            return Ok(Vec::new());
        };

        if let Some(first) = headers.first_mut() {
            *first = first.trim_start_matches('\u{feff}').trim().to_string();
        }

        let (row_lines, rows): (Vec<usize>, Vec<Vec<String>>) = rows.unzip();
        Ok(vec![RawSheet::new(name, headers, rows).with_lines(header_line, row_lines)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_load_ragged_rows() {
        let data = "\u{feff}Date,Particulars,Vch No.,Gross Total\n\
                    01-01-2024, Acme ,INV1,\"1,000 Dr\"\n\
                    ,,,\n\
                    ,Widget\n";

        let sheets = CsvLoader::new().load("b2b.csv", data.as_bytes()).unwrap();

        assert_eq!(sheets.len(), 1);
        let sheet = &sheets[0];
        assert_eq!(sheet.name, "b2b.csv");
        assert_eq!(sheet.headers, vec!["Date", "Particulars", "Vch No.", "Gross Total"]);
        assert_eq!(sheet.rows.len(), 2);
        assert_eq!(sheet.cell(0, 1), "Acme");
        assert_eq!(sheet.cell(0, 3), "1,000 Dr");
        assert_eq!(sheet.cell(1, 1), "Widget");
        assert_eq!(sheet.cell(1, 3), "");
        assert_eq!(sheet.header_line, 1);
        assert_eq!(sheet.row_lines, vec![2, 4]);
        assert_eq!(sheet.line(1), 4);
    }

    #[test]
    fn test_load_empty() {
        let sheets = CsvLoader::new().load("empty.csv", b"").unwrap();
        assert!(sheets.is_empty());
    }

    #[test]
    fn test_semicolon_delimiter() {
        let sheets = CsvLoader::new()
            .with_delimiter(b';')
            .load("pos.csv", b"Date;Amount\n2024-01-01;12,50\n")
            .unwrap();

        assert_eq!(sheets[0].cell(0, 1), "12,50");
    }
}
