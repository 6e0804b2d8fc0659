//! Spender and item rankings.

use crate::models::{ItemRow, ItemStatistics, PurchaseRecord, SpenderRow};
use rust_decimal::Decimal;
use std::collections::HashMap;
use tracing::warn;

/// Default length of every ranking.
pub const DEFAULT_TOP_N: usize = 5;

/// Rank players by total purchase value, highest first.
///
/// One row per player. Ties keep the order in which players first appear.
pub fn top_spenders(records: &[PurchaseRecord], n: usize) -> Vec<SpenderRow> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut totals: Vec<(&str, usize, Decimal)> = Vec::new();

    for record in records {
        let handle = record.player_handle.as_str();
        let slot = *index.entry(handle).or_insert_with(|| {
            totals.push((handle, 0, Decimal::ZERO));
            totals.len() - 1
        });
        totals[slot].1 += 1;
        totals[slot].2 += record.price;
    }

    let mut spenders: Vec<SpenderRow> = totals
        .into_iter()
        .map(|(handle, count, total)| SpenderRow {
            player_handle: handle.to_string(),
            purchase_count: count,
            average_price: total / Decimal::from(count),
            total_purchase_value: total,
        })
        .collect();

    spenders.sort_by(|a, b| b.total_purchase_value.cmp(&a.total_purchase_value));
    spenders.truncate(n);
    spenders
}

/// Compute sales statistics for every item id, in first-seen order.
///
/// The first name seen for an id is used as its label.
pub fn item_statistics(records: &[PurchaseRecord]) -> ItemStatistics {
    let mut index: HashMap<u64, usize> = HashMap::new();
    let mut items: Vec<ItemRow> = Vec::new();

    for record in records {
        let slot = *index.entry(record.item_id).or_insert_with(|| {
            items.push(ItemRow {
                item_id: record.item_id,
                item_name: record.item_name.clone(),
                purchase_count: 0,
                item_price: Decimal::ZERO,
                total_purchase_value: Decimal::ZERO,
            });
            items.len() - 1
        });

        let item = &mut items[slot];
        if item.item_name != record.item_name {
            warn!(
                "Item {} sold as both '{}' and '{}' (purchase {}); keeping the first name",
                item.item_id, item.item_name, record.item_name, record.purchase_id
            );
        }
        item.purchase_count += 1;
        item.total_purchase_value += record.price;
    }

    for item in &mut items {
        item.item_price = item.total_purchase_value / Decimal::from(item.purchase_count);
    }

    ItemStatistics { items }
}

/// Items ranked by purchase count, then by total value.
pub fn most_popular_items(stats: &ItemStatistics, n: usize) -> Vec<ItemRow> {
    let mut items = stats.items.clone();
    items.sort_by(|a, b| {
        b.purchase_count
            .cmp(&a.purchase_count)
            .then_with(|| b.total_purchase_value.cmp(&a.total_purchase_value))
    });
    items.truncate(n);
    items
}

/// Items ranked by total value, then by purchase count.
pub fn most_profitable_items(stats: &ItemStatistics, n: usize) -> Vec<ItemRow> {
    let mut items = stats.items.clone();
    items.sort_by(|a, b| {
        b.total_purchase_value
            .cmp(&a.total_purchase_value)
            .then_with(|| b.purchase_count.cmp(&a.purchase_count))
    });
    items.truncate(n);
    items
}
