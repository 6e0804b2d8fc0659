//! Aggregation engine.
//!
//! Every report is a pure function over the loaded record set. This module
//! also compiles the full report sequence in one call.

pub mod aggregator;
pub mod demographics;
pub mod rankings;

pub use aggregator::*;
pub use demographics::*;
pub use rankings::*;

use crate::error::ReportResult;
use crate::models::{PurchaseRecord, Report, ReportMetadata};
use chrono::Utc;
use tracing::debug;

/// Compile every report over `records`, in presentation order.
///
/// Fails on the first report that cannot be computed.
pub fn compile_report(records: &[PurchaseRecord], source: &str, top_n: usize) -> ReportResult<Report> {
    debug!("Compiling reports over {} records", records.len());

    let purchasing = summarize_purchases(records)?;
    let gender_demographics = demographics_by_gender(records)?;
    let gender_purchasing = purchasing_by_gender(records)?;
    let age_demographics = demographics_by_age_bucket(records)?;
    let age_purchasing = purchasing_by_age_bucket(records)?;
    let top_spenders = top_spenders(records, top_n);

    let items = item_statistics(records);
    let most_popular_items = most_popular_items(&items, top_n);
    let most_profitable_items = most_profitable_items(&items, top_n);
    debug!("{} distinct items ranked", items.items.len());

    Ok(Report {
        metadata: ReportMetadata {
            source: source.to_string(),
            generated_at: Utc::now(),
            record_count: records.len(),
        },
        player_count: count_distinct_players(records),
        purchasing,
        gender_demographics,
        gender_purchasing,
        age_demographics,
        age_purchasing,
        top_spenders,
        most_popular_items,
        most_profitable_items,
    })
}


#[cfg(test)]
mod tests {
    use super::test_support::{record, sample_log, scenario};
    use super::*;
    use crate::error::ReportError;
    use crate::models::Gender;
    use rust_decimal_macros::dec;

    #[test]
    fn test_compile_report_scenario() {
        let report = compile_report(&scenario(), "purchase_data.csv", DEFAULT_TOP_N).unwrap();

        assert_eq!(report.metadata.record_count, 3);
        assert_eq!(report.player_count, 2);
        assert_eq!(report.purchasing.purchase_count, 3);
        assert_eq!(report.purchasing.total_revenue, dec!(25.00));
        assert_eq!(report.gender_demographics[0].group, Gender::Male);
        assert_eq!(report.gender_demographics[0].percentage, dec!(50));
        assert_eq!(report.top_spenders[0].player_handle, "P1");
        assert_eq!(report.most_popular_items[0].item_name, "Sword");
        assert_eq!(report.most_profitable_items[0].total_purchase_value, dec!(20.00));
    }

    #[test]
    fn test_compile_report_truncates_rankings() {
        let report = compile_report(&sample_log(), "purchase_data.csv", 3).unwrap();

        assert_eq!(report.top_spenders.len(), 3);
        assert_eq!(report.most_popular_items.len(), 3);
        assert_eq!(report.most_profitable_items.len(), 3);
        assert_eq!(report.most_popular_items[0].item_id, 92);
    }

    #[test]
    fn test_compile_report_fails_fast_on_bad_gender() {
        let mut records = scenario();
        records.push(record(3, "P3", 25, "Unknown", 2, "Shield", dec!(5.00)));

        assert_eq!(
            compile_report(&records, "purchase_data.csv", DEFAULT_TOP_N).map(|_| ()),
            Err(ReportError::InvalidGender("Unknown".to_string()))
        );
    }

    #[test]
    fn test_compile_report_empty_fails() {
        assert!(compile_report(&[], "purchase_data.csv", DEFAULT_TOP_N).is_err());
    }
}
