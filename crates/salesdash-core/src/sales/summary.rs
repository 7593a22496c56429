//! Filters and aggregate metrics over sales records.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::sales::{Channel, SalesRecord};

/// Dashboard filter controls.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalesFilter {
    /// Earliest sale date, inclusive.
    pub from: Option<NaiveDate>,
    /// Latest sale date, inclusive.
    pub to: Option<NaiveDate>,
    /// Stores to keep (case-insensitive); empty keeps all.
    pub stores: Vec<String>,
    /// Case-insensitive product substring.
    pub product: Option<String>,
    pub channel: Option<Channel>,
}

impl SalesFilter {
    /// Whether a record passes. Undated records fail any date bound.
    pub fn matches(&self, record: &SalesRecord) -> bool {
        if self.channel.is_some_and(|c| c != record.channel) {
            return false;
        }

        if self.from.is_some() || self.to.is_some() {
            match record.date {
                Some(date) => {
                    if self.from.is_some_and(|from| date < from) || self.to.is_some_and(|to| date > to) {
                        return false;
                    }
                }
                None => return false,
            }
        }

        if !self.stores.is_empty()
            && !self.stores.iter().any(|s| s.eq_ignore_ascii_case(&record.store))
        {
            return false;
        }

        if let Some(needle) = &self.product {
            if !record.product.to_lowercase().contains(&needle.to_lowercase()) {
                return false;
            }
        }

        true
    }
}

/// Totals for one group key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupTotal<K> {
    pub key: K,
    pub records: usize,
    pub quantity: Decimal,
    pub amount: Decimal,
}

/// Aggregate metrics for the filtered records.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SalesSummary {
    pub record_count: usize,
    pub total_amount: Decimal,
    pub total_quantity: Decimal,
    /// Records whose amount was missing or unparseable.
    pub missing_amounts: usize,
    /// Records with no usable date.
    pub undated_records: usize,
    pub by_store: Vec<GroupTotal<String>>,
    pub by_product: Vec<GroupTotal<String>>,
    pub by_date: Vec<GroupTotal<NaiveDate>>,
    pub by_channel: Vec<GroupTotal<Channel>>,
}

impl SalesSummary {
    pub fn is_empty(&self) -> bool {
        self.record_count == 0
    }
}

/// Aggregate records passing `filter`. Null amounts and quantities are
/// left out of the sums but the record still counts.
pub fn summarize(records: &[SalesRecord], filter: &SalesFilter) -> SalesSummary {
    let mut summary = SalesSummary::default();
    let mut by_store: BTreeMap<String, GroupTotal<String>> = BTreeMap::new();
    let mut by_product: BTreeMap<String, GroupTotal<String>> = BTreeMap::new();
    let mut by_date: BTreeMap<NaiveDate, GroupTotal<NaiveDate>> = BTreeMap::new();
    let mut by_channel: BTreeMap<Channel, GroupTotal<Channel>> = BTreeMap::new();

    for record in records.iter().filter(|r| filter.matches(r)) {
        summary.record_count += 1;
        let amount = record.amount.unwrap_or_default();
        let quantity = record.quantity.unwrap_or_default();

        if record.amount.is_none() {
            summary.missing_amounts += 1;
        }
        summary.total_amount += amount;
        summary.total_quantity += quantity;

        add(&mut by_store, record.store.clone(), quantity, amount);
        add(&mut by_product, record.product.clone(), quantity, amount);
        add(&mut by_channel, record.channel, quantity, amount);
        match record.date {
            Some(date) => add(&mut by_date, date, quantity, amount),
            None => summary.undated_records += 1,
        }
    }

    summary.by_store = by_store.into_values().collect();
    summary.by_product = by_product.into_values().collect();
    summary.by_date = by_date.into_values().collect();
    summary.by_channel = by_channel.into_values().collect();
    summary
}

fn add<K: Ord + Clone>(
    groups: &mut BTreeMap<K, GroupTotal<K>>,
    key: K,
    quantity: Decimal,
    amount: Decimal,
) {
    let group = groups.entry(key.clone()).or_insert_with(|| GroupTotal {
        key,
        records: 0,
        quantity: Decimal::ZERO,
        amount: Decimal::ZERO,
    });
    group.records += 1;
    group.quantity += quantity;
    group.amount += amount;
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn record(channel: Channel, date: Option<(i32, u32, u32)>, store: &str, product: &str, amount: Option<i64>) -> SalesRecord {
        SalesRecord {
            channel,
            date: date.and_then(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d)),
            store: store.to_string(),
            product: product.to_string(),
            quantity: Some(Decimal::ONE),
            size: None,
            amount: amount.map(Decimal::from),
            source: None,
        }
    }

    fn sample() -> Vec<SalesRecord> {
        vec![
            record(Channel::Pos, Some((2024, 1, 1)), "Central", "Latte", Some(10)),
            record(Channel::Pos, Some((2024, 1, 2)), "Harbor", "Mocha", Some(20)),
            record(Channel::Online, Some((2024, 1, 2)), "Web", "Latte Beans", Some(30)),
            record(Channel::Online, None, "Web", "Mug", None),
        ]
    }

    #[test]
    fn test_summarize_all() {
        let summary = summarize(&sample(), &SalesFilter::default());

        assert_eq!(summary.record_count, 4);
        assert_eq!(summary.total_amount, Decimal::from(60));
        assert_eq!(summary.total_quantity, Decimal::from(4));
        assert_eq!(summary.missing_amounts, 1);
        assert_eq!(summary.undated_records, 1);

        let stores: Vec<_> = summary.by_store.iter().map(|g| (g.key.as_str(), g.amount)).collect();
        assert_eq!(
            stores,
            vec![
                ("Central", Decimal::from(10)),
                ("Harbor", Decimal::from(20)),
                ("Web", Decimal::from(30)),
            ]
        );
        assert_eq!(summary.by_date.len(), 2);
        assert_eq!(summary.by_date[1].amount, Decimal::from(50));
        assert_eq!(summary.by_channel[0].key, Channel::Pos);
    }

    #[test]
    fn test_filters() {
        let filter = SalesFilter {
            product: Some("latte".to_string()),
            ..Default::default()
        };
        assert_eq!(summarize(&sample(), &filter).total_amount, Decimal::from(40));

        let filter = SalesFilter {
            stores: vec!["central".to_string(), "HARBOR".to_string()],
            ..Default::default()
        };
        assert_eq!(summarize(&sample(), &filter).record_count, 2);

        let filter = SalesFilter {
            from: NaiveDate::from_ymd_opt(2024, 1, 2),
            channel: Some(Channel::Online),
            ..Default::default()
        };
        let summary = summarize(&sample(), &filter);
        assert_eq!(summary.record_count, 1);
        assert_eq!(summary.total_amount, Decimal::from(30));
    }

    #[test]
    fn test_empty_summary() {
        let summary = summarize(&[], &SalesFilter::default());
        assert!(summary.is_empty());
        assert_eq!(summary.total_amount, Decimal::ZERO);
    }
}
