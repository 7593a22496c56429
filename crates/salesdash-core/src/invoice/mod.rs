//! B2B ledger handling: column mapping, invoice reconstruction, filtering.

mod columns;
mod filter;
mod reconstructor;
pub mod rules;

pub use columns::{find_column, normalize_header, ColumnMapping, FieldRole, RawRow, SourceRows};
pub use filter::InvoiceFilter;
pub use reconstructor::{forward_fill, InvoiceReconstructor};
