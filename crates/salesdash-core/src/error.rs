//! Error types for the salesdash-core library.

use thiserror::Error;

/// Main error type for the salesdash library.
#[derive(Error, Debug)]
pub enum SalesError {
    /// Sheet loading error.
    #[error("load error: {0}")]
    Load(#[from] LoadError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// No readable source produced any rows.
    #[error("no data: no readable rows in any source")]
    NoData,
}

/// Errors related to reading a single source file.
#[derive(Error, Debug)]
pub enum LoadError {
    /// Malformed CSV input.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Failed to open or read an Excel workbook.
    #[error("Excel error: {0}")]
    Excel(String),

    /// File extension is not a supported tabular format.
    #[error("unsupported file format: {0}")]
    UnsupportedFormat(String),

    /// The file contains no data rows.
    #[error("{0} contains no data")]
    Empty(String),

    /// Required columns could not be found in the sheet.
    #[error("{sheet} is missing columns: {}", columns.join(", "))]
    MissingColumns { sheet: String, columns: Vec<String> },

    /// I/O error while reading the file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for the salesdash library.
pub type Result<T> = std::result::Result<T, SalesError>;
