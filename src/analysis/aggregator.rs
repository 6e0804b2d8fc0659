//! Purchase aggregation and statistics.
//!
//! This module provides the shared grouping machinery and the headline
//! purchasing summaries computed over a record set.

use crate::error::{ReportError, ReportResult};
use crate::models::{AgeBucket, Gender, GroupPurchasing, PurchaseRecord, PurchaseSummary};
use rust_decimal::Decimal;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fmt;

/// Running totals for one group of purchases.
#[derive(Debug, Default)]
struct GroupTotals<'a> {
    purchase_count: usize,
    total: Decimal,
    players: HashSet<&'a str>,
}

impl<'a> GroupTotals<'a> {
    fn add(&mut self, record: &'a PurchaseRecord) {
        self.purchase_count += 1;
        self.total += record.price;
        self.players.insert(record.player_handle.as_str());
    }

    fn finish<K: fmt::Display>(&self, group: K) -> ReportResult<GroupPurchasing<K>> {
        if self.purchase_count == 0 || self.players.is_empty() {
            return Err(ReportError::EmptyGroup {
                group: group.to_string(),
            });
        }

        Ok(GroupPurchasing {
            average_price: self.total / Decimal::from(self.purchase_count),
            average_per_person: self.total / Decimal::from(self.players.len()),
            purchase_count: self.purchase_count,
            total_purchase_value: self.total,
            group,
        })
    }
}

/// Share of `count` in `total`, in percent, at full precision.
pub(crate) fn percentage(count: usize, total: usize) -> Decimal {
    Decimal::from(count) * Decimal::ONE_HUNDRED / Decimal::from(total)
}

/// Count distinct player handles.
pub fn count_distinct_players(records: &[PurchaseRecord]) -> usize {
    records
        .iter()
        .map(|r| r.player_handle.as_str())
        .collect::<HashSet<_>>()
        .len()
}

/// Compute the headline purchasing totals.
///
/// Unique items are keyed by item id, not item name.
pub fn summarize_purchases(records: &[PurchaseRecord]) -> ReportResult<PurchaseSummary> {
    if records.is_empty() {
        return Err(ReportError::EmptyRecordSet("purchasing analysis"));
    }

    let total_revenue: Decimal = records.iter().map(|r| r.price).sum();
    let distinct_item_count = records
        .iter()
        .map(|r| r.item_id)
        .collect::<HashSet<_>>()
        .len();

    Ok(PurchaseSummary {
        distinct_item_count,
        average_price: total_revenue / Decimal::from(records.len()),
        purchase_count: records.len(),
        total_revenue,
    })
}

/// Compute purchasing statistics for each requested group.
///
/// Records are partitioned in a single pass by `key_fn`. Groups are reported
/// in the order given by `groups`; a requested group without any purchase
/// fails with [`ReportError::EmptyGroup`]. Records whose key is not requested
/// are left out.
pub fn purchasing_by_group<K, F>(
    records: &[PurchaseRecord],
    key_fn: F,
    groups: &[K],
) -> ReportResult<Vec<GroupPurchasing<K>>>
where
    K: Ord + Clone + fmt::Display,
    F: Fn(&PurchaseRecord) -> ReportResult<K>,
{
    let mut totals: BTreeMap<K, GroupTotals<'_>> = BTreeMap::new();

    for record in records {
        totals.entry(key_fn(record)?).or_default().add(record);
    }

    let empty = GroupTotals::default();
    groups
        .iter()
        .map(|group| totals.get(group).unwrap_or(&empty).finish(group.clone()))
        .collect()
}

/// Groups that occur at least once, in ascending key order.
fn observed_groups<K, F>(records: &[PurchaseRecord], key_fn: F) -> ReportResult<Vec<K>>
where
    K: Ord,
    F: Fn(&PurchaseRecord) -> ReportResult<K>,
{
    let observed = records.iter().map(key_fn).collect::<ReportResult<BTreeSet<K>>>()?;
    Ok(observed.into_iter().collect())
}

/// Purchasing statistics per gender present in the record set.
pub fn purchasing_by_gender(
    records: &[PurchaseRecord],
) -> ReportResult<Vec<GroupPurchasing<Gender>>> {
    let groups = observed_groups(records, PurchaseRecord::gender)?;
    purchasing_by_group(records, PurchaseRecord::gender, &groups)
}

/// Purchasing statistics per age bucket present in the record set.
pub fn purchasing_by_age_bucket(
    records: &[PurchaseRecord],
) -> ReportResult<Vec<GroupPurchasing<AgeBucket>>> {
    let bucket = |r: &PurchaseRecord| -> ReportResult<AgeBucket> { Ok(r.age_bucket()) };
    let groups = observed_groups(records, bucket)?;
    purchasing_by_group(records, bucket, &groups)
}
