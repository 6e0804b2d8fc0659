//! Data models for the purchase reports.
//!
//! This module contains the purchase record read from the log and every
//! derived table the reports produce.

use crate::error::{ReportError, ReportResult};
use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Decimal places kept when a value leaves the aggregation core.
pub const PRESENTATION_DP: u32 = 2;

/// Round a value for presentation.
///
/// Exact decimal midpoints round half to even, so `2.675` becomes `2.68` and
/// `2.665` becomes `2.66`.
pub fn round_for_display(value: Decimal, dp: u32) -> Decimal {
    value.round_dp_with_strategy(dp, RoundingStrategy::MidpointNearestEven)
}

/// Player gender as recorded in the purchase log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Gender {
    Male,
    Female,
    #[serde(rename = "Other / Non-Disclosed")]
    Other,
}

impl Gender {
    /// All recognized genders in report order.
    pub const ALL: [Gender; 3] = [Gender::Male, Gender::Female, Gender::Other];

    pub fn label(&self) -> &'static str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
            Gender::Other => "Other / Non-Disclosed",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Gender {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Male" => Ok(Gender::Male),
            "Female" => Ok(Gender::Female),
            "Other / Non-Disclosed" => Ok(Gender::Other),
            other => Err(ReportError::InvalidGender(other.to_string())),
        }
    }
}

/// Age range used for demographic grouping.
///
/// Buckets are half-open with the lower edge inclusive, so 10 lands in
/// `10-14` and 40 lands in `40+`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum AgeBucket {
    #[serde(rename = "<10")]
    Under10,
    #[serde(rename = "10-14")]
    From10To14,
    #[serde(rename = "15-19")]
    From15To19,
    #[serde(rename = "20-24")]
    From20To24,
    #[serde(rename = "25-29")]
    From25To29,
    #[serde(rename = "30-34")]
    From30To34,
    #[serde(rename = "35-39")]
    From35To39,
    #[serde(rename = "40+")]
    From40,
}

impl AgeBucket {
    /// All buckets in ascending order.
    pub const ALL: [AgeBucket; 8] = [
        AgeBucket::Under10,
        AgeBucket::From10To14,
        AgeBucket::From15To19,
        AgeBucket::From20To24,
        AgeBucket::From25To29,
        AgeBucket::From30To34,
        AgeBucket::From35To39,
        AgeBucket::From40,
    ];

    /// Map an age onto its bucket.
    pub fn from_age(age: u32) -> Self {
        match age {
            0..=9 => AgeBucket::Under10,
            10..=14 => AgeBucket::From10To14,
            15..=19 => AgeBucket::From15To19,
            20..=24 => AgeBucket::From20To24,
            25..=29 => AgeBucket::From25To29,
            30..=34 => AgeBucket::From30To34,
            35..=39 => AgeBucket::From35To39,
            _ => AgeBucket::From40,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AgeBucket::Under10 => "<10",
            AgeBucket::From10To14 => "10-14",
            AgeBucket::From15To19 => "15-19",
            AgeBucket::From20To24 => "20-24",
            AgeBucket::From25To29 => "25-29",
            AgeBucket::From30To34 => "30-34",
            AgeBucket::From35To39 => "35-39",
            AgeBucket::From40 => "40+",
        }
    }
}

impl fmt::Display for AgeBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A single row of the purchase log.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PurchaseRecord {
    /// Unique id of the purchase.
    pub purchase_id: u64,
    /// Screen name of the buying player.
    pub player_handle: String,
    /// Player age in years.
    pub age: u32,
    /// Gender exactly as it appears in the log.
    ///
    /// Classified lazily by [`PurchaseRecord::gender`] so that a bad value
    /// fails the aggregation that reads it.
    pub gender: String,
    /// Catalog id of the item bought.
    pub item_id: u64,
    /// Display name of the item.
    pub item_name: String,
    /// Price paid for this purchase.
    pub price: Decimal,
}

impl PurchaseRecord {
    /// Classify the raw gender column.
    pub fn gender(&self) -> ReportResult<Gender> {
        self.gender.parse()
    }

    /// Age bucket of the buying player.
    pub fn age_bucket(&self) -> AgeBucket {
        AgeBucket::from_age(self.age)
    }
}

/// Headline totals over the whole purchase log.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PurchaseSummary {
    /// Number of distinct item ids sold.
    pub distinct_item_count: usize,
    #[serde(serialize_with = "rounded::serialize")]
    pub average_price: Decimal,
    /// Number of purchases (one per row).
    pub purchase_count: usize,
    #[serde(serialize_with = "rounded::serialize")]
    pub total_revenue: Decimal,
}

/// Distinct-player count for one demographic group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DemographicRow<K> {
    pub group: K,
    pub count: usize,
    /// Share of all distinct players, in percent.
    #[serde(serialize_with = "rounded::serialize")]
    pub percentage: Decimal,
}

/// Purchasing statistics for one group of records.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupPurchasing<K> {
    pub group: K,
    pub purchase_count: usize,
    #[serde(serialize_with = "rounded::serialize")]
    pub average_price: Decimal,
    #[serde(serialize_with = "rounded::serialize")]
    pub total_purchase_value: Decimal,
    /// Total value divided by the distinct players in the group.
    #[serde(serialize_with = "rounded::serialize")]
    pub average_per_person: Decimal,
}

/// One row of the top spenders ranking.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpenderRow {
    pub player_handle: String,
    pub purchase_count: usize,
    #[serde(serialize_with = "rounded::serialize")]
    pub average_price: Decimal,
    #[serde(serialize_with = "rounded::serialize")]
    pub total_purchase_value: Decimal,
}

/// Sales statistics for one item id.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemRow {
    pub item_id: u64,
    /// First name seen for this id.
    pub item_name: String,
    pub purchase_count: usize,
    /// Mean price paid across all purchases of the item.
    #[serde(serialize_with = "rounded::serialize")]
    pub item_price: Decimal,
    #[serde(serialize_with = "rounded::serialize")]
    pub total_purchase_value: Decimal,
}

/// Per-item statistics in first-seen order.
///
/// Both item rankings borrow one instance so they always agree.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ItemStatistics {
    pub items: Vec<ItemRow>,
}

/// Metadata about a compiled report.
#[derive(Debug, Clone, Serialize)]
pub struct ReportMetadata {
    /// Path of the purchase log.
    pub source: String,
    /// Time the report was compiled.
    pub generated_at: DateTime<Utc>,
    /// Rows in the record set.
    pub record_count: usize,
}

/// The full sequence of purchase reports.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub metadata: ReportMetadata,
    pub player_count: usize,
    pub purchasing: PurchaseSummary,
    pub gender_demographics: Vec<DemographicRow<Gender>>,
    pub gender_purchasing: Vec<GroupPurchasing<Gender>>,
    pub age_demographics: Vec<DemographicRow<AgeBucket>>,
    pub age_purchasing: Vec<GroupPurchasing<AgeBucket>>,
    pub top_spenders: Vec<SpenderRow>,
    pub most_popular_items: Vec<ItemRow>,
    pub most_profitable_items: Vec<ItemRow>,
}

/// Serialize a decimal rounded to presentation precision.
mod rounded {
    use super::{round_for_display, PRESENTATION_DP};
    use rust_decimal::Decimal;
    use serde::{Serialize, Serializer};

    pub fn serialize<S: Serializer>(value: &Decimal, serializer: S) -> Result<S::Ok, S::Error> {
        Serialize::serialize(&round_for_display(*value, PRESENTATION_DP), serializer)
    }
}
