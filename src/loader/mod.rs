//! Purchase log loading.
//!
//! This module reads the CSV purchase log into an in-memory record set,
//! validating every numeric column on the way in.

use crate::error::ReportError;
use crate::models::PurchaseRecord;
use anyhow::{Context, Result};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::HashSet;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, info, warn};

/// Default location of the purchase log, relative to the working directory.
pub const DEFAULT_INPUT: &str = "Resources/purchase_data.csv";

/// One CSV row before validation.
#[derive(Debug, Deserialize)]
struct RawRecord {
    #[serde(rename = "Purchase ID")]
    purchase_id: String,
    #[serde(rename = "SN")]
    player_handle: String,
    #[serde(rename = "Age")]
    age: String,
    #[serde(rename = "Gender")]
    gender: String,
    #[serde(rename = "Item ID")]
    item_id: String,
    #[serde(rename = "Item Name")]
    item_name: String,
    #[serde(rename = "Price")]
    price: String,
}

impl RawRecord {
    fn validate(self, row: usize) -> Result<PurchaseRecord, ReportError> {
        let price: Decimal = parse_field(&self.price, "Price", row)?;
        if price <= Decimal::ZERO {
            return Err(ReportError::MalformedRecord {
                row,
                reason: format!("Price must be positive, got {}", price),
            });
        }

        Ok(PurchaseRecord {
            purchase_id: parse_field(&self.purchase_id, "Purchase ID", row)?,
            player_handle: self.player_handle,
            age: parse_field(&self.age, "Age", row)?,
            gender: self.gender,
            item_id: parse_field(&self.item_id, "Item ID", row)?,
            item_name: self.item_name,
            price,
        })
    }
}

fn parse_field<T: FromStr>(value: &str, column: &str, row: usize) -> Result<T, ReportError> {
    value.parse().map_err(|_| ReportError::MalformedRecord {
        row,
        reason: format!("{} is not a valid number: '{}'", column, value),
    })
}

/// Load the purchase log at `path`.
///
/// A missing file fails with [`ReportError::InputNotFound`] before anything
/// is read.
pub fn load_records(path: &Path) -> Result<Vec<PurchaseRecord>> {
    if !path.is_file() {
        return Err(ReportError::InputNotFound {
            path: path.display().to_string(),
        }
        .into());
    }

    info!("Loading purchase log: {}", path.display());
    let file = std::fs::File::open(path)
        .with_context(|| format!("Failed to open purchase log: {}", path.display()))?;

    let records = parse_records(file)
        .with_context(|| format!("Failed to read purchase log: {}", path.display()))?;
    info!("Loaded {} purchases", records.len());

    Ok(records)
}

/// Parse a purchase log from any reader.
pub fn parse_records<R: Read>(reader: R) -> Result<Vec<PurchaseRecord>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut records = Vec::new();
    let mut seen_ids = HashSet::new();

    for (i, result) in csv_reader.deserialize::<RawRecord>().enumerate() {
        let row = i + 1;
        let raw = result.with_context(|| format!("Invalid CSV at row {}", row))?;
        let record = raw.validate(row)?;

        if !seen_ids.insert(record.purchase_id) {
            warn!("Duplicate purchase id {} at row {}", record.purchase_id, row);
        }
        records.push(record);
    }

    debug!("Parsed {} rows", records.len());
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::io::Write;
    use tempfile::TempDir;

    const HEADER: &str = "Purchase ID,SN,Age,Gender,Item ID,Item Name,Price\n";

    fn fixture_path() -> std::path::PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("fixtures")
            .join("purchase_data.csv")
    }

    #[test]
    fn test_parse_records() {
        let data = format!(
            "{}0,Lisim78,20,Male,108,\"Extraction, Quickblade Of Trembling Hands\",3.53\n\
             1,Lisovynya38,40,Male,143,Frenzied Scimitar,1.56\n",
            HEADER
        );
        let records = parse_records(data.as_bytes()).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].player_handle, "Lisim78");
        assert_eq!(records[0].item_name, "Extraction, Quickblade Of Trembling Hands");
        assert_eq!(records[0].price, dec!(3.53));
        assert_eq!(records[1].age, 40);
        assert_eq!(records[1].gender, "Male");
    }

    #[test]
    fn test_unknown_gender_is_kept_for_aggregation() {
        let data = format!("{}0,Ghost,20,Unknown,1,Sword,1.00\n", HEADER);
        let records = parse_records(data.as_bytes()).unwrap();

        assert_eq!(records[0].gender, "Unknown");
        assert!(records[0].gender().is_err());
    }

    #[test]
    fn test_non_numeric_price_fails() {
        let data = format!("{}0,Lisim78,20,Male,108,Sword,cheap\n", HEADER);
        let err = parse_records(data.as_bytes()).unwrap_err();

        assert!(matches!(
            err.downcast_ref::<ReportError>(),
            Some(ReportError::MalformedRecord { row: 1, .. })
        ));
    }

    #[test]
    fn test_non_numeric_age_fails() {
        let data = format!(
            "{}0,Lisim78,20,Male,108,Sword,1.00\n1,Yalae81,old,Male,81,Dreamkiss,3.61\n",
            HEADER
        );
        let err = parse_records(data.as_bytes()).unwrap_err();

        assert!(matches!(
            err.downcast_ref::<ReportError>(),
            Some(ReportError::MalformedRecord { row: 2, .. })
        ));
    }

    #[test]
    fn test_non_positive_price_fails() {
        let data = format!("{}0,Lisim78,20,Male,108,Sword,0.00\n", HEADER);
        assert!(parse_records(data.as_bytes()).is_err());
    }

    #[test]
    fn test_missing_file_fails() {
        let dir = TempDir::new().unwrap();
        let err = load_records(&dir.path().join("missing.csv")).unwrap_err();

        assert!(matches!(
            err.downcast_ref::<ReportError>(),
            Some(ReportError::InputNotFound { .. })
        ));
    }

    #[test]
    fn test_load_records_from_disk() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("purchase_data.csv");
        let mut file = std::fs::File::create(&path).unwrap();
        write!(file, "{}0,P1,22,Male,1,Sword,10.00\n", HEADER).unwrap();

        let records = load_records(&path).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].price, dec!(10.00));
    }

    #[test]
    fn test_load_fixture() {
        let records = load_records(&fixture_path()).unwrap();

        assert_eq!(records.len(), 20);
        assert!(records.iter().all(|r| r.gender().is_ok()));
        assert!(records.iter().all(|r| r.price > Decimal::ZERO));
    }
}
