//! Core library for the sales dashboard.
//!
//! This crate provides:
//! - Sheet loading from CSV and Excel files
//! - Column mapping from ad-hoc header names to known field roles
//! - B2B invoice reconstruction from flat, header-interleaved ledger sheets
//! - POS/Online sales normalization, filtering and aggregation

pub mod error;
pub mod models;
pub mod table;
pub mod invoice;
pub mod sales;

pub use error::{LoadError, Result, SalesError};
pub use models::config::{FailedParsePolicy, SalesConfig, VoucherScope};
pub use models::invoice::{
    Invoice, LineItem, Reconstruction, ReconstructionStats, VoucherCollision,
};
pub use models::sales::{Channel, SalesRecord};
pub use table::{load_path, load_sources, LoadedSources, RawSheet, TableLoader};
pub use invoice::{ColumnMapping, FieldRole, InvoiceFilter, InvoiceReconstructor, RawRow, SourceRows};
pub use sales::{records_from_invoices, records_from_sheet, summarize, InvoiceTotal, SalesFilter, SalesSummary};
