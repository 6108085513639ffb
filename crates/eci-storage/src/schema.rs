//! Column expectations for the metric tables.

use csv::StringRecord;

use eci_core::errors::StorageError;
use eci_core::types::collections::FxHashMap;

pub const INTERNAL_REQUIRED: &[&str] = &[
    "prompt_id",
    "model_name",
    "eci_raw",
    "eci_residualized",
    "early_eci_raw",
    "effective_ranks",
];

pub const INTERNAL_OPTIONAL: &[&str] = &[
    "participation_ratios",
    "variances",
    "window_starts",
    "window_ends",
    "control",
    "mode",
];

pub const EXTERNAL_REQUIRED: &[&str] = &["prompt_id", "model_name", "qa_failure"];

pub const EXTERNAL_OPTIONAL: &[&str] = &[
    "reasoning_failures",
    "delta_i_values",
    "ngram_novelty_values",
    "char_entropy_values",
];

/// Header name to column position for one table.
#[derive(Debug, Clone)]
pub struct ColumnIndex {
    table: String,
    positions: FxHashMap<String, usize>,
}

impl ColumnIndex {
    /// Index `headers`, failing with every required column that is absent.
    pub fn validate(
        table: &str,
        headers: &StringRecord,
        required: &[&str],
    ) -> Result<Self, StorageError> {
        let positions: FxHashMap<String, usize> = headers
            .iter()
            .enumerate()
            .map(|(i, name)| (name.trim().to_string(), i))
            .collect();

        let missing: Vec<String> = required
            .iter()
            .filter(|col| !positions.contains_key(**col))
            .map(|col| col.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(StorageError::SchemaValidation {
                table: table.to_string(),
                missing,
                expected: required.iter().map(|c| c.to_string()).collect(),
            });
        }

        Ok(Self {
            table: table.to_string(),
            positions,
        })
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn has(&self, column: &str) -> bool {
        self.positions.contains_key(column)
    }

    /// Cell text, or `None` when the column is absent from the table.
    pub fn get<'r>(&self, record: &'r StringRecord, column: &str) -> Option<&'r str> {
        self.positions
            .get(column)
            .and_then(|&i| record.get(i))
            .map(str::trim)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_columns_all_named() {
        let headers = StringRecord::from(vec!["prompt_id", "eci_raw"]);
        let err = ColumnIndex::validate("metrics_internal.csv", &headers, INTERNAL_REQUIRED)
            .unwrap_err();
        match err {
            StorageError::SchemaValidation { missing, .. } => assert_eq!(
                missing,
                vec!["model_name", "eci_residualized", "early_eci_raw", "effective_ranks"]
            ),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_lookup() {
        let headers = StringRecord::from(vec!["prompt_id", " model_name ", "qa_failure"]);
        let index = ColumnIndex::validate("t", &headers, EXTERNAL_REQUIRED).unwrap();
        let row = StringRecord::from(vec!["p1", "m", " True "]);
        assert_eq!(index.get(&row, "qa_failure"), Some("True"));
        assert_eq!(index.get(&row, "reasoning_failures"), None);
        assert!(index.has("model_name"));
    }
}
