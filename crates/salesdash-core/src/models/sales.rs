//! POS and online sales records.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Sales channel a sheet belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    /// In-store point of sale.
    Pos,
    /// Online store.
    Online,
    /// Business-to-business invoices.
    B2b,
}

impl Channel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::Pos => "pos",
            Channel::Online => "online",
            Channel::B2b => "b2b",
        }
    }
}

impl std::fmt::Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One normalized sales row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesRecord {
    pub channel: Channel,

    /// Sale date, `None` when the cell did not parse.
    pub date: Option<NaiveDate>,

    pub store: String,

    pub product: String,

    pub quantity: Option<Decimal>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,

    /// Sale amount, `None` when missing or unparseable.
    pub amount: Option<Decimal>,

    /// Sheet or file the record was read from.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}
