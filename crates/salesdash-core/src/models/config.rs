//! Configuration structures for loading and reconstruction.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::SalesError;
use crate::invoice::FieldRole;

/// Main configuration for salesdash.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SalesConfig {
    /// Source folder configuration.
    pub sources: SourceConfig,

    /// B2B ledger reconstruction configuration.
    pub b2b: B2bConfig,

    /// POS/Online sales sheet configuration.
    pub sales: SalesColumns,
}

/// Folders the dashboard reads from.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Folder with point-of-sale exports.
    pub pos_dir: PathBuf,

    /// Folder with online store exports.
    pub online_dir: PathBuf,

    /// Folder with B2B ledger sheets.
    pub b2b_dir: PathBuf,

    /// File extensions picked up when scanning a folder.
    pub extensions: Vec<String>,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            pos_dir: PathBuf::from("sales_data/pos"),
            online_dir: PathBuf::from("sales_data/online"),
            b2b_dir: PathBuf::from("sales_data/b2b"),
            extensions: strings(&["csv", "xlsx", "xlsm", "xls"]),
        }
    }
}

/// What happens to a non-empty amount cell that does not parse.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailedParsePolicy {
    /// The value is null and left out of every sum.
    #[default]
    Exclude,
    /// The value is coerced to zero and counted in sums.
    Zero,
}

/// How voucher numbers are scoped when several sources are reconstructed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoucherScope {
    /// Each source is reconstructed on its own; duplicates are reported.
    #[default]
    PerSource,
    /// All rows are concatenated and reconstructed once.
    Merged,
}

/// B2B ledger reconstruction configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct B2bConfig {
    /// Header aliases per field role.
    pub columns: B2bColumns,

    /// Handling of unparseable amounts.
    pub failed_parse: FailedParsePolicy,

    /// Voucher scoping across sources.
    pub scope: VoucherScope,

    /// Rows below the first one searched for the real header row.
    pub header_scan_rows: usize,
}

impl Default for B2bConfig {
    fn default() -> Self {
        Self {
            columns: B2bColumns::default(),
            failed_parse: FailedParsePolicy::Exclude,
            scope: VoucherScope::PerSource,
            header_scan_rows: 10,
        }
    }
}

/// Header aliases for each B2B field role.
///
/// Aliases are compared after normalization (lowercase, punctuation
/// removed, whitespace collapsed). Roles may share aliases.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct B2bColumns {
    pub date: Vec<String>,
    pub vendor: Vec<String>,
    pub voucher_no: Vec<String>,
    pub gross_total: Vec<String>,
    pub product: Vec<String>,
    pub quantity: Vec<String>,
    pub rate: Vec<String>,
    pub value: Vec<String>,
}

impl Default for B2bColumns {
    fn default() -> Self {
        Self {
            date: strings(&["date", "voucher date", "invoice date"]),
            vendor: strings(&["particulars", "party", "party name", "vendor", "customer", "buyer"]),
            voucher_no: strings(&[
                "voucher no",
                "vch no",
                "voucher number",
                "invoice no",
                "invoice number",
                "bill no",
            ]),
            gross_total: strings(&["gross total", "invoice total", "total amount", "grand total"]),
            product: strings(&["product", "item", "item name", "stock item", "description", "particulars"]),
            quantity: strings(&["quantity", "qty", "billed qty", "actual qty"]),
            rate: strings(&["rate", "price", "unit price"]),
            value: strings(&["value", "amount", "line value", "item value"]),
        }
    }
}

impl B2bColumns {
    /// Aliases configured for a field role.
    pub fn aliases(&self, role: FieldRole) -> &[String] {
        match role {
            FieldRole::Date => &self.date,
            FieldRole::Vendor => &self.vendor,
            FieldRole::VoucherNo => &self.voucher_no,
            FieldRole::GrossTotal => &self.gross_total,
            FieldRole::Product => &self.product,
            FieldRole::Quantity => &self.quantity,
            FieldRole::Rate => &self.rate,
            FieldRole::Value => &self.value,
        }
    }
}

/// Header aliases for POS/Online sales sheets.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SalesColumns {
    pub date: Vec<String>,
    pub store: Vec<String>,
    pub product: Vec<String>,
    pub quantity: Vec<String>,
    pub size: Vec<String>,
    pub amount: Vec<String>,
}

impl Default for SalesColumns {
    fn default() -> Self {
        Self {
            date: strings(&["date", "order date", "sale date"]),
            store: strings(&["store", "outlet", "branch", "location"]),
            product: strings(&["product", "item", "product name"]),
            quantity: strings(&["quantity ordered", "quantity", "qty"]),
            size: strings(&["size", "variant"]),
            amount: strings(&["amount", "total", "sales", "net amount"]),
        }
    }
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

impl SalesConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, SalesError> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| SalesError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &Path) -> Result<(), SalesError> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| SalesError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: SalesConfig =
            serde_json::from_str(r#"{"b2b": {"failed_parse": "zero"}}"#).unwrap();

        assert_eq!(config.b2b.failed_parse, FailedParsePolicy::Zero);
        assert_eq!(config.b2b.scope, VoucherScope::PerSource);
        assert_eq!(config.b2b.header_scan_rows, 10);
        assert!(config.b2b.columns.voucher_no.contains(&"vch no".to_string()));
        assert_eq!(config.sources.pos_dir, PathBuf::from("sales_data/pos"));
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut config = SalesConfig::default();
        config.b2b.scope = VoucherScope::Merged;
        config.save(&path).unwrap();

        let loaded = SalesConfig::from_file(&path).unwrap();
        assert_eq!(loaded.b2b.scope, VoucherScope::Merged);
    }

    #[test]
    fn test_invalid_config_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();

        assert!(matches!(
            SalesConfig::from_file(&path),
            Err(SalesError::Config(_))
        ));
    }
}
