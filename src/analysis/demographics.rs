//! Player demographics.
//!
//! Every player is counted once, using the gender and age of their first
//! purchase in the log.

use super::aggregator::{count_distinct_players, percentage};
use crate::error::{ReportError, ReportResult};
use crate::models::{AgeBucket, DemographicRow, Gender, PurchaseRecord};
use std::collections::{BTreeMap, HashMap};

/// Count distinct players per gender.
///
/// All three genders are present in the result, possibly with a zero count.
/// Every row is classified, so an unrecognized gender anywhere in the log
/// fails with [`ReportError::InvalidGender`].
pub fn count_distinct_players_by_gender(
    records: &[PurchaseRecord],
) -> ReportResult<BTreeMap<Gender, usize>> {
    let mut first_seen: HashMap<&str, Gender> = HashMap::new();

    for record in records {
        let gender = record.gender()?;
        first_seen
            .entry(record.player_handle.as_str())
            .or_insert(gender);
    }

    let mut counts: BTreeMap<Gender, usize> = Gender::ALL.iter().map(|g| (*g, 0)).collect();
    for gender in first_seen.values() {
        *counts.entry(*gender).or_default() += 1;
    }

    Ok(counts)
}

/// Count distinct players per age bucket, all buckets included.
pub fn count_distinct_players_by_age_bucket(
    records: &[PurchaseRecord],
) -> BTreeMap<AgeBucket, usize> {
    let mut first_seen: HashMap<&str, AgeBucket> = HashMap::new();

    for record in records {
        first_seen
            .entry(record.player_handle.as_str())
            .or_insert_with(|| record.age_bucket());
    }

    let mut counts: BTreeMap<AgeBucket, usize> =
        AgeBucket::ALL.iter().map(|b| (*b, 0)).collect();
    for bucket in first_seen.values() {
        *counts.entry(*bucket).or_default() += 1;
    }

    counts
}

/// Gender demographics: count and share of players per gender.
pub fn demographics_by_gender(
    records: &[PurchaseRecord],
) -> ReportResult<Vec<DemographicRow<Gender>>> {
    let counts = count_distinct_players_by_gender(records)?;
    to_rows(counts, count_distinct_players(records), "gender demographics")
}

/// Age demographics: count and share of players per age bucket, ascending.
pub fn demographics_by_age_bucket(
    records: &[PurchaseRecord],
) -> ReportResult<Vec<DemographicRow<AgeBucket>>> {
    let counts = count_distinct_players_by_age_bucket(records);
    to_rows(counts, count_distinct_players(records), "age demographics")
}

fn to_rows<K>(
    counts: BTreeMap<K, usize>,
    total_players: usize,
    report: &'static str,
) -> ReportResult<Vec<DemographicRow<K>>> {
    if total_players == 0 {
        return Err(ReportError::EmptyRecordSet(report));
    }

    Ok(counts
        .into_iter()
        .map(|(group, count)| DemographicRow {
            group,
            count,
            percentage: percentage(count, total_players),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::test_support::{record, sample_log, scenario};
    use rust_decimal_macros::dec;

    #[test]
    fn test_gender_demographics_scenario() {
        let rows = demographics_by_gender(&scenario()).unwrap();

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].group, Gender::Male);
        assert_eq!(rows[0].count, 1);
        assert_eq!(rows[0].percentage, dec!(50));
        assert_eq!(rows[1].group, Gender::Female);
        assert_eq!(rows[1].count, 1);
        assert_eq!(rows[1].percentage, dec!(50));
        assert_eq!(rows[2].group, Gender::Other);
        assert_eq!(rows[2].count, 0);
    }

    #[test]
    fn test_first_observed_gender_wins() {
        let records = vec![
            record(0, "Shifty", 20, "Female", 1, "Sword", dec!(1.00)),
            record(1, "Shifty", 20, "Male", 2, "Shield", dec!(1.00)),
        ];
        let counts = count_distinct_players_by_gender(&records).unwrap();

        assert_eq!(counts[&Gender::Female], 1);
        assert_eq!(counts[&Gender::Male], 0);
    }

    #[test]
    fn test_unknown_gender_fails() {
        let mut records = scenario();
        records.push(record(3, "P3", 25, "Unknown", 2, "Shield", dec!(5.00)));

        assert_eq!(
            count_distinct_players_by_gender(&records),
            Err(ReportError::InvalidGender("Unknown".to_string()))
        );
    }

    #[test]
    fn test_unknown_gender_on_repeat_row_fails() {
        let records = vec![
            record(0, "P1", 20, "Male", 1, "Sword", dec!(1.00)),
            record(1, "P1", 20, "Unknown", 1, "Sword", dec!(1.00)),
        ];
        assert!(count_distinct_players_by_gender(&records).is_err());
    }

    #[test]
    fn test_age_demographics_uses_first_seen_age() {
        let records = vec![
            record(0, "Birthday", 14, "Male", 1, "Sword", dec!(1.00)),
            record(1, "Birthday", 15, "Male", 1, "Sword", dec!(1.00)),
            record(2, "Elder", 40, "Female", 1, "Sword", dec!(1.00)),
        ];
        let rows = demographics_by_age_bucket(&records).unwrap();

        assert_eq!(rows.len(), AgeBucket::ALL.len());
        let teen = rows.iter().find(|r| r.group == AgeBucket::From10To14).unwrap();
        assert_eq!(teen.count, 1);
        assert_eq!(teen.percentage, dec!(50));
        let late_teen = rows.iter().find(|r| r.group == AgeBucket::From15To19).unwrap();
        assert_eq!(late_teen.count, 0);
        assert_eq!(rows.last().map(|r| r.group), Some(AgeBucket::From40));
        assert_eq!(rows.last().map(|r| r.count), Some(1));
    }

    #[test]
    fn test_group_player_counts_sum_to_total() {
        let records = sample_log();
        let total = count_distinct_players(&records);

        let by_gender: usize = count_distinct_players_by_gender(&records)
            .unwrap()
            .values()
            .sum();
        let by_age: usize = count_distinct_players_by_age_bucket(&records).values().sum();

        assert_eq!(by_gender, total);
        assert_eq!(by_age, total);
    }

    #[test]
    fn test_percentages_sum_to_hundred() {
        let rows = demographics_by_age_bucket(&sample_log()).unwrap();
        let sum: rust_decimal::Decimal = rows.iter().map(|r| r.percentage).sum();
        assert_eq!(sum.round_dp(6), dec!(100));
    }

    #[test]
    fn test_empty_record_set_fails() {
        assert!(matches!(
            demographics_by_gender(&[]),
            Err(ReportError::EmptyRecordSet(_))
        ));
        assert!(matches!(
            demographics_by_age_bucket(&[]),
            Err(ReportError::EmptyRecordSet(_))
        ));
    }
}
