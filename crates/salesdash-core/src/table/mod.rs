//! Tabular source loading (CSV and Excel into in-memory sheets).

mod delimited;
#[cfg(feature = "xlsx")]
mod workbook;

pub use delimited::CsvLoader;
#[cfg(feature = "xlsx")]
pub use workbook::XlsxLoader;

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::error::{LoadError, SalesError};

/// Result type for loading operations.
pub type Result<T> = std::result::Result<T, LoadError>;

/// One sheet of raw cells. The first row is kept apart as `headers`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawSheet {
    /// File name, with the worksheet name appended for workbooks.
    pub name: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
    /// 1-based sheet line of `headers`.
    pub header_line: usize,
    /// 1-based sheet line of each entry in `rows`; blank lines leave gaps.
    pub row_lines: Vec<usize>,
}

impl RawSheet {
    /// Sheet whose rows sit on consecutive lines below the headers.
    pub fn new(name: impl Into<String>, headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        let row_lines = (2..rows.len() + 2).collect();
        Self {
            name: name.into(),
            headers,
            rows,
            header_line: 1,
            row_lines,
        }
    }

    /// Override line numbers for loaders that drop blank or leading rows.
    pub fn with_lines(mut self, header_line: usize, row_lines: Vec<usize>) -> Self {
        self.header_line = header_line;
        self.row_lines = row_lines;
        self
    }

    /// Sheet line of a data row.
    pub fn line(&self, row: usize) -> usize {
        self.row_lines
            .get(row)
            .copied()
            .unwrap_or(self.header_line + 1 + row)
    }

    /// Cell at `row`/`col`, empty when the row is short.
    pub fn cell(&self, row: usize, col: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .map(String::as_str)
            .unwrap_or("")
    }
}

/// Trait for tabular file readers.
pub trait TableLoader {
    /// Extensions (lowercase, without dot) this loader accepts.
    fn extensions(&self) -> &[&'static str];

    /// Parse file contents into sheets.
    fn load(&self, name: &str, data: &[u8]) -> Result<Vec<RawSheet>>;
}

/// Load every sheet of a file, dispatching on its extension.
pub fn load_path(path: &Path) -> Result<Vec<RawSheet>> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("sheet")
        .to_string();

    let mut loaders: Vec<Box<dyn TableLoader>> = vec![Box::new(CsvLoader::new())];
    #[cfg(feature = "xlsx")]
    loaders.push(Box::new(XlsxLoader::new()));

    let loader = loaders
        .iter()
        .find(|l| l.extensions().contains(&extension.as_str()))
        .ok_or_else(|| LoadError::UnsupportedFormat(extension.clone()))?;

    let data = std::fs::read(path)?;
    let sheets = loader.load(&name, &data)?;
    debug!("Loaded {} sheet(s) from {}", sheets.len(), path.display());

    if sheets.iter().all(|s| s.rows.is_empty()) {
        return Err(LoadError::Empty(name));
    }

    Ok(sheets)
}

/// Sheets from a batch of files plus the files that could not be read.
#[derive(Debug, Default)]
pub struct LoadedSources {
    pub sheets: Vec<RawSheet>,
    pub failures: Vec<(PathBuf, LoadError)>,
}

impl LoadedSources {
    pub fn row_count(&self) -> usize {
        self.sheets.iter().map(|s| s.rows.len()).sum()
    }
}

/// Load a batch of files.
///
/// Unreadable or empty files are recorded in `failures` and do not stop
/// the batch. Fails with [`SalesError::NoData`] only when no file yields
/// a single row.
pub fn load_sources<P: AsRef<Path>>(paths: &[P]) -> std::result::Result<LoadedSources, SalesError> {
    let mut loaded = LoadedSources::default();

    for path in paths {
        let path = path.as_ref();
        match load_path(path) {
            Ok(sheets) => loaded.sheets.extend(sheets),
            Err(e) => {
                warn!("Skipping {}: {}", path.display(), e);
                loaded.failures.push((path.to_path_buf(), e));
            }
        }
    }

    info!(
        "Loaded {} rows from {} sheet(s), {} file(s) skipped",
        loaded.row_count(),
        loaded.sheets.len(),
        loaded.failures.len()
    );

    if loaded.row_count() == 0 {
        return Err(SalesError::NoData);
    }

    Ok(loaded)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_path_unsupported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "hello").unwrap();

        assert!(matches!(
            load_path(&path),
            Err(LoadError::UnsupportedFormat(ext)) if ext == "txt"
        ));
    }

    #[test]
    fn test_load_sources_skips_bad_files() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("good.csv");
        let empty = dir.path().join("empty.csv");
        let missing = dir.path().join("missing.csv");
        std::fs::write(&good, "Date,Amount\n2024-01-01,10\n").unwrap();
        std::fs::write(&empty, "").unwrap();

        let loaded = load_sources(&[&good, &empty, &missing]).unwrap();

        assert_eq!(loaded.sheets.len(), 1);
        assert_eq!(loaded.row_count(), 1);
        assert_eq!(loaded.failures.len(), 2);
    }

    #[test]
    fn test_load_sources_no_data() {
        let dir = tempfile::tempdir().unwrap();
        let header_only = dir.path().join("header.csv");
        std::fs::write(&header_only, "Date,Amount\n").unwrap();

        assert!(matches!(load_sources(&[header_only]), Err(SalesError::NoData)));
        let none: [PathBuf; 0] = [];
        assert!(matches!(load_sources(&none), Err(SalesError::NoData)));
    }
}
