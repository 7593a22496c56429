//! Rebuild invoices and line items from a flat B2B ledger.
//!
//! Ledger exports interleave one header row per voucher (date, party,
//! gross total) with product rows that leave the voucher and party cells
//! blank. The scan below carries the last seen voucher number and party
//! down the rows, treats rows with a gross total as headers and rows with
//! a quantity, rate or value as line items.

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use super::columns::{FieldRole, RawRow, SourceRows};
use super::rules::{extract_quantity, parse_sheet_date, AmountCell};
use crate::models::config::{B2bConfig, FailedParsePolicy, VoucherScope};
use crate::models::invoice::{
    Invoice, LineItem, Reconstruction, ReconstructionStats, VoucherCollision,
};

const ITEM_ROLES: [FieldRole; 3] = [FieldRole::Quantity, FieldRole::Rate, FieldRole::Value];

#[derive(Debug, Clone)]
struct HeaderFields {
    date: Option<NaiveDate>,
    vendor: Option<String>,
    gross_total: Option<Decimal>,
}

#[derive(Debug)]
struct VoucherGroup {
    voucher_no: String,
    source: Option<String>,
    /// First header row of the voucher.
    header: Option<HeaderFields>,
    /// First row of the voucher, used when no header row exists.
    fallback: HeaderFields,
    /// Sources whose rows name this voucher explicitly.
    sources: Vec<String>,
}

/// Accumulator threaded through the row fold.
#[derive(Debug, Default)]
struct ScanState {
    last_voucher: Option<String>,
    last_vendor: Option<String>,
    groups: Vec<VoucherGroup>,
    index: HashMap<String, usize>,
    items: Vec<LineItem>,
    stats: ReconstructionStats,
}

/// Converts ledger rows into [`Reconstruction`]s.
///
/// Stateless between calls; one instance can serve any number of sources
/// from any number of threads.
#[derive(Debug, Clone, Default)]
pub struct InvoiceReconstructor {
    failed_parse: FailedParsePolicy,
    scope: VoucherScope,
}

impl InvoiceReconstructor {
    /// Create a reconstructor excluding unparseable amounts, scoped per source.
    pub fn new() -> Self {
        Self {
            failed_parse: FailedParsePolicy::Exclude,
            scope: VoucherScope::PerSource,
        }
    }

    pub fn from_config(config: &B2bConfig) -> Self {
        Self::new()
            .with_failed_parse_policy(config.failed_parse)
            .with_scope(config.scope)
    }

    /// Set handling of amount cells that do not parse.
    pub fn with_failed_parse_policy(mut self, policy: FailedParsePolicy) -> Self {
        self.failed_parse = policy;
        self
    }

    /// Set voucher scoping for multi-source runs.
    pub fn with_scope(mut self, scope: VoucherScope) -> Self {
        self.scope = scope;
        self
    }

    /// Reconstruct one sequence of rows in file order.
    pub fn reconstruct(&self, rows: &[RawRow]) -> Reconstruction {
        self.scan(rows.iter().map(|row| (None, row)))
    }

    /// Reconstruct several sources according to the configured scope.
    pub fn reconstruct_sources(&self, sources: &[SourceRows]) -> Reconstruction {
        let result = match self.scope {
            VoucherScope::PerSource => {
                let mut merged = Reconstruction::default();
                let mut mentions: BTreeMap<String, Vec<String>> = BTreeMap::new();
                for source in sources {
                    let part = self.scan(
                        source
                            .rows
                            .iter()
                            .map(|row| (Some(source.source.as_str()), row)),
                    );
                    // headerless sources have items but no invoices
                    let vouchers = part
                        .invoices
                        .iter()
                        .map(|i| &i.voucher_no)
                        .chain(part.line_items.iter().map(|i| &i.voucher_no));
                    for voucher in vouchers {
                        let seen = mentions.entry(voucher.clone()).or_default();
                        if !seen.contains(&source.source) {
                            seen.push(source.source.clone());
                        }
                    }
                    debug!(
                        "{}: {} invoices, {} line items",
                        source.source,
                        part.invoices.len(),
                        part.line_items.len()
                    );
                    merged.invoices.extend(part.invoices);
                    merged.line_items.extend(part.line_items);
                    merged.stats.absorb(&part.stats);
                }
                merged.collisions = find_collisions(mentions);
                merged
            }
            VoucherScope::Merged => self.scan(sources.iter().flat_map(|source| {
                source
                    .rows
                    .iter()
                    .map(move |row| (Some(source.source.as_str()), row))
            })),
        };

        for collision in &result.collisions {
            warn!(
                "Voucher {} appears in several sources: {}",
                collision.voucher_no,
                collision.sources.join(", ")
            );
        }

        info!(
            "Reconstructed {} invoices and {} line items from {} source(s)",
            result.invoices.len(),
            result.line_items.len(),
            sources.len()
        );

        result
    }

    fn scan<'a, I>(&self, rows: I) -> Reconstruction
    where
        I: Iterator<Item = (Option<&'a str>, &'a RawRow)>,
    {
        let state = rows.fold(ScanState::default(), |state, (source, row)| {
            self.step(state, source, row)
        });
        self.finish(state)
    }

    fn step(&self, mut state: ScanState, source: Option<&str>, row: &RawRow) -> ScanState {
        state.stats.rows_scanned += 1;

        let explicit_voucher = row.get(FieldRole::VoucherNo);
        if let Some(voucher) = explicit_voucher {
            state.last_voucher = Some(voucher.to_string());
        }
        let is_header = row.has(FieldRole::GrossTotal);

        // Vendor and Product often share one column; only voucher and
        // header rows name the party.
        if explicit_voucher.is_some() || is_header {
            if let Some(vendor) = row.get(FieldRole::Vendor) {
                state.last_vendor = Some(vendor.to_string());
            }
        }
        let is_item = !is_header && ITEM_ROLES.iter().any(|role| row.has(*role));

        let Some(voucher) = state.last_voucher.clone() else {
            if is_header {
                state.stats.orphan_header_rows += 1;
                debug!("Dropping header row {} without a voucher number", row.line);
            } else if is_item {
                state.stats.orphan_item_rows += 1;
                debug!("Dropping item row {} before any voucher number", row.line);
            }
            return state;
        };

        let group_index = match state.index.get(&voucher) {
            Some(&index) => index,
            None => {
                state.groups.push(VoucherGroup {
                    voucher_no: voucher.clone(),
                    source: source.map(str::to_string),
                    header: None,
                    fallback: HeaderFields {
                        date: row.get(FieldRole::Date).and_then(parse_sheet_date),
                        vendor: state.last_vendor.clone(),
                        gross_total: None,
                    },
                    sources: Vec::new(),
                });
                state.index.insert(voucher.clone(), state.groups.len() - 1);
                state.groups.len() - 1
            }
        };

        if let (Some(_), Some(source)) = (explicit_voucher, source) {
            let group = &mut state.groups[group_index];
            if !group.sources.iter().any(|s| s == source) {
                group.sources.push(source.to_string());
            }
        }

        if is_header {
            state.stats.header_rows += 1;
            let gross = AmountCell::parse(row.get(FieldRole::GrossTotal));
            if gross.is_invalid() {
                state.stats.unparsed_amounts += 1;
            }

            let group = &mut state.groups[group_index];
            if group.header.is_none() {
                group.header = Some(HeaderFields {
                    date: row.get(FieldRole::Date).and_then(parse_sheet_date),
                    vendor: state.last_vendor.clone(),
                    gross_total: gross.resolve(self.failed_parse),
                });
            } else {
                state.stats.duplicate_header_rows += 1;
            }
        } else if is_item {
            state.stats.item_rows += 1;
            let rate = AmountCell::parse(row.get(FieldRole::Rate));
            let value = AmountCell::parse(row.get(FieldRole::Value));
            state.stats.unparsed_amounts += [&rate, &value].iter().filter(|c| c.is_invalid()).count();

            state.items.push(LineItem {
                voucher_no: voucher,
                product: row.get(FieldRole::Product).map(str::to_string),
                quantity: row.get(FieldRole::Quantity).and_then(extract_quantity),
                rate: rate.resolve(self.failed_parse),
                rate_raw: row.get(FieldRole::Rate).map(str::to_string),
                line_value: value.resolve(self.failed_parse),
                source: source.map(str::to_string),
                line: row.line,
            });
        }

        state
    }

    fn finish(&self, state: ScanState) -> Reconstruction {
        let ScanState {
            groups,
            items,
            stats,
            ..
        } = state;

        let collisions: Vec<VoucherCollision> = groups
            .iter()
            .filter(|group| group.sources.len() > 1)
            .map(|group| VoucherCollision {
                voucher_no: group.voucher_no.clone(),
                sources: group.sources.clone(),
            })
            .collect();

        if stats.header_rows == 0 {
            if !items.is_empty() {
                warn!(
                    "No invoice header rows found; {} line items have no invoice metadata",
                    items.len()
                );
            }
            return Reconstruction {
                invoices: Vec::new(),
                line_items: items,
                stats,
                collisions,
                scope: self.scope,
            };
        }

        let mut totals: HashMap<&str, (usize, Option<Decimal>)> = HashMap::new();
        for item in &items {
            let entry = totals.entry(item.voucher_no.as_str()).or_insert((0, None));
            entry.0 += 1;
            if let Some(value) = item.line_value {
                entry.1 = Some(entry.1.unwrap_or(Decimal::ZERO) + value);
            }
        }

        let invoices: Vec<Invoice> = groups
            .into_iter()
            .map(|group| {
                let header = group.header.unwrap_or(group.fallback);
                let (item_count, computed_total) = totals
                    .get(group.voucher_no.as_str())
                    .copied()
                    .unwrap_or((0, None));

                Invoice {
                    voucher_no: group.voucher_no,
                    date: header.date,
                    vendor: header.vendor,
                    gross_total: header.gross_total,
                    item_count,
                    computed_total,
                    source: group.source,
                }
            })
            .collect();

        Reconstruction {
            invoices,
            line_items: items,
            stats,
            collisions,
            scope: self.scope,
        }
    }
}

/// Voucher numbers mentioned by more than one source.
fn find_collisions(mentions: BTreeMap<String, Vec<String>>) -> Vec<VoucherCollision> {
    mentions
        .into_iter()
        .filter(|(_, sources)| sources.len() > 1)
        .map(|(voucher_no, sources)| VoucherCollision { voucher_no, sources })
        .collect()
}

/// Carry the last non-empty value of each role down the rows.
pub fn forward_fill(rows: &[RawRow], roles: &[FieldRole]) -> Vec<RawRow> {
    let mut last: HashMap<FieldRole, String> = HashMap::new();

    rows.iter()
        .map(|row| {
            let mut filled = row.clone();
            for role in roles {
                match row.get(*role) {
                    Some(value) => {
                        last.insert(*role, value.to_string());
                    }
                    None => {
                        if let Some(value) = last.get(role) {
                            filled.set(*role, value.clone());
                        }
                    }
                }
            }
            filled
        })
        .collect()
}
