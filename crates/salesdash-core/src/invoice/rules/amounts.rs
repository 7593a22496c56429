//! Amount and quantity cleanup for ledger cells.

use rust_decimal::Decimal;
use std::str::FromStr;

use super::patterns::FIRST_DIGITS;
use crate::models::config::FailedParsePolicy;

/// Outcome of reading one amount cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AmountCell {
    /// Cell was empty or the column is absent.
    Empty,
    /// Cell parsed to a value.
    Value(Decimal),
    /// Cell had text that did not parse.
    Invalid(String),
}

impl AmountCell {
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            None => AmountCell::Empty,
            Some(text) => match clean_amount(text) {
                Some(value) => AmountCell::Value(value),
                None => AmountCell::Invalid(text.to_string()),
            },
        }
    }

    pub fn is_invalid(&self) -> bool {
        matches!(self, AmountCell::Invalid(_))
    }

    /// Value to store, applying the failed-parse policy.
    pub fn resolve(&self, policy: FailedParsePolicy) -> Option<Decimal> {
        match (self, policy) {
            (AmountCell::Value(v), _) => Some(*v),
            (AmountCell::Invalid(_), FailedParsePolicy::Zero) => Some(Decimal::ZERO),
            _ => None,
        }
    }
}

/// Parse a ledger amount such as `"1,000 Dr"` or `"250.50 Cr"`.
///
/// The literal, case-sensitive substrings `Dr`, `Cr` and `,` are removed
/// before parsing. The suffix never changes the sign.
pub fn clean_amount(s: &str) -> Option<Decimal> {
    let stripped = s.replace("Dr", "").replace("Cr", "").replace(',', "");
    let cleaned = stripped.trim();

    if cleaned.is_empty() {
        return None;
    }

    Decimal::from_str(cleaned)
        .or_else(|_| Decimal::from_scientific(cleaned))
        .ok()
}

/// Quantity from the first run of digits (`"12 pcs"` -> 12).
pub fn extract_quantity(s: &str) -> Option<Decimal> {
    FIRST_DIGITS
        .find(s)
        .and_then(|m| Decimal::from_str(m.as_str()).ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_amount() {
        assert_eq!(clean_amount("1,000 Dr"), Some(Decimal::from(1000)));
        assert_eq!(clean_amount("2,50,000.75 Cr"), Some(Decimal::from_str("250000.75").unwrap()));
        assert_eq!(clean_amount("-42"), Some(Decimal::from(-42)));
        assert_eq!(clean_amount("1e3"), Some(Decimal::from(1000)));
        assert_eq!(clean_amount("N/A"), None);
        assert_eq!(clean_amount("  "), None);
    }

    #[test]
    fn test_clean_amount_is_case_sensitive() {
        assert_eq!(clean_amount("100 dr"), None);
        assert_eq!(clean_amount("100 CR"), None);
    }

    #[test]
    fn test_clean_amount_idempotent() {
        let once = clean_amount("1234").unwrap();
        let twice = clean_amount(&once.to_string()).unwrap();
        assert_eq!(once, Decimal::from(1234));
        assert_eq!(once, twice);
    }

    #[test]
    fn test_extract_quantity() {
        assert_eq!(extract_quantity("12 pcs"), Some(Decimal::from(12)));
        assert_eq!(extract_quantity("3"), Some(Decimal::from(3)));
        assert_eq!(extract_quantity("2.5 kg"), Some(Decimal::from(2)));
        assert_eq!(extract_quantity("Nos"), None);
    }

    #[test]
    fn test_amount_cell_policy() {
        let invalid = AmountCell::parse(Some("N/A"));
        assert!(invalid.is_invalid());
        assert_eq!(invalid.resolve(FailedParsePolicy::Exclude), None);
        assert_eq!(invalid.resolve(FailedParsePolicy::Zero), Some(Decimal::ZERO));

        let empty = AmountCell::parse(None);
        assert_eq!(empty.resolve(FailedParsePolicy::Zero), None);

        let value = AmountCell::parse(Some("500"));
        assert_eq!(value.resolve(FailedParsePolicy::Exclude), Some(Decimal::from(500)));
    }
}
