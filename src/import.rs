use std::path::Path;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::PgPool;

use crate::db;
use crate::error::HarvestError;
use crate::models::HarvestRecord;

/// The required fields of one imported element. `loss_percentage` is
/// deliberately not a field: whatever the file claims, the stored value is
/// recomputed from total and lost tonnage.
#[derive(Debug, Deserialize)]
struct ImportRow {
    date: NaiveDate,
    area_hectares: Decimal,
    harvester_id: String,
    total_tons: Decimal,
    lost_tons: Decimal,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ImportOutcome {
    pub imported: usize,
    pub failed: usize,
}

/// Imports a JSON array of harvest records, one insert per element.
///
/// An unreadable file or a document that is not a JSON array aborts before
/// any element is touched. After that the batch never aborts: an element
/// that fails to decode, fails validation or fails to insert counts as
/// failed and the rest continue.
pub async fn import_json(pool: &PgPool, path: &Path) -> Result<ImportOutcome, HarvestError> {
    let text = std::fs::read_to_string(path).map_err(|source| HarvestError::ImportFile {
        path: path.to_path_buf(),
        source,
    })?;
    let entries = parse_entries(&text)?;

    let mut outcome = ImportOutcome::default();
    for (index, entry) in entries.iter().enumerate() {
        let record = match decode_entry(entry) {
            Ok(record) => record,
            Err(err) => {
                tracing::warn!("skipping entry {index}: {err}");
                outcome.failed += 1;
                continue;
            }
        };

        match db::insert_record(pool, &record).await {
            Ok(()) => outcome.imported += 1,
            Err(err) => {
                tracing::error!("insert failed for entry {index}: {err}");
                outcome.failed += 1;
            }
        }
    }

    Ok(outcome)
}

fn parse_entries(text: &str) -> Result<Vec<serde_json::Value>, HarvestError> {
    let document: serde_json::Value =
        serde_json::from_str(text).map_err(|err| HarvestError::ImportFormat(err.to_string()))?;

    match document {
        serde_json::Value::Array(entries) => Ok(entries),
        other => Err(HarvestError::ImportFormat(format!(
            "expected a top-level array, got {}",
            value_kind(&other)
        ))),
    }
}

fn decode_entry(entry: &serde_json::Value) -> Result<HarvestRecord, HarvestError> {
    let row: ImportRow = serde_json::from_value(entry.clone())
        .map_err(|err| HarvestError::ImportFormat(err.to_string()))?;

    HarvestRecord::with_date(
        row.date,
        row.area_hectares,
        &row.harvester_id,
        row.total_tons,
        row.lost_tons,
    )
}

fn value_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    #[test]
    fn top_level_object_is_rejected() {
        let result = parse_entries(r#"{"date": "2026-07-14"}"#);
        assert!(matches!(result, Err(HarvestError::ImportFormat(_))));
    }

    #[test]
    fn malformed_json_is_rejected() {
        let result = parse_entries("[{");
        assert!(matches!(result, Err(HarvestError::ImportFormat(_))));
    }

    #[test]
    fn well_formed_entry_decodes_with_recomputed_percentage() {
        // The bogus loss_percentage in the file must not survive.
        let entry = json!({
            "date": "2026-07-14",
            "area_hectares": 10.0,
            "harvester_id": "C1",
            "total_tons": 100.0,
            "lost_tons": 5.0,
            "loss_percentage": 99.9
        });
        let record = decode_entry(&entry).unwrap();
        assert_eq!(record.loss_percentage, dec!(5.00));
        assert_eq!(record.harvester_id, "C1");
    }

    #[test]
    fn entry_missing_total_tons_fails_decoding() {
        let entry = json!({
            "date": "2026-07-14",
            "area_hectares": 10.0,
            "harvester_id": "C1",
            "lost_tons": 5.0
        });
        assert!(decode_entry(&entry).is_err());
    }

    #[test]
    fn non_object_entry_fails_decoding() {
        assert!(decode_entry(&json!(42)).is_err());
        assert!(decode_entry(&json!("harvest")).is_err());
    }

    #[test]
    fn entry_with_loss_above_total_fails_decoding() {
        let entry = json!({
            "date": "2026-07-14",
            "area_hectares": 10.0,
            "harvester_id": "C1",
            "total_tons": 10.0,
            "lost_tons": 15.0
        });
        assert!(matches!(
            decode_entry(&entry),
            Err(HarvestError::LossExceedsTotal { .. })
        ));
    }

    #[test]
    fn mixed_batch_decodes_one_and_rejects_one() {
        let entries = parse_entries(
            r#"[
                {"date": "2026-07-14", "area_hectares": 10.0, "harvester_id": "C1",
                 "total_tons": 100.0, "lost_tons": 5.0},
                {"date": "2026-07-14", "area_hectares": 8.0, "harvester_id": "C2",
                 "lost_tons": 2.0}
            ]"#,
        )
        .unwrap();

        let outcomes: Vec<_> = entries.iter().map(decode_entry).collect();
        assert_eq!(outcomes.len(), 2);
        assert!(outcomes[0].is_ok());
        assert!(outcomes[1].is_err());
    }

    #[test]
    fn zero_total_imports_with_zero_percentage() {
        let entry = json!({
            "date": "2026-07-14",
            "area_hectares": 4.0,
            "harvester_id": "C3",
            "total_tons": 0.0,
            "lost_tons": 0.0
        });
        let record = decode_entry(&entry).unwrap();
        assert_eq!(record.loss_percentage, Decimal::ZERO);
    }
}
