//! Cell cleanup rules shared by B2B and sales sheets.

pub mod amounts;
pub mod dates;
pub mod patterns;

pub use amounts::{clean_amount, extract_quantity, AmountCell};
pub use dates::parse_sheet_date;
