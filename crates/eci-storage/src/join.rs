//! Inner join of the internal and external tables on `(model_name, prompt_id)`.

use std::collections::BTreeMap;

use eci_analysis::WindowSpec;
use eci_core::errors::StorageError;
use eci_core::types::{ExternalWindow, OutcomeLabel, SequenceRecord};

use crate::tables::{ExternalRow, InternalRow, RecordedEci};

/// Records and labels ready for a cohort run.
#[derive(Debug, Clone, Default)]
pub struct JoinedCohort {
    /// Every internal row; sequences without a label still feed the
    /// descriptive statistics.
    pub records: Vec<SequenceRecord>,
    /// Labels of sequences present in both tables.
    pub labels: Vec<OutcomeLabel>,
    /// Stored ECI values keyed by `(model_name, prompt_id)`.
    pub recorded: BTreeMap<(String, String), RecordedEci>,
    /// External rows with no internal counterpart.
    pub orphan_labels: Vec<(String, String)>,
}

impl JoinedCohort {
    pub fn unlabelled_count(&self) -> usize {
        self.records.len() - self.labels.len()
    }
}

/// Join the two tables.
///
/// A matched row's external lists become the record's external series, using
/// the internal window bounds. A delta-I list one shorter than the others is
/// taken to omit the first window. Mismatched series lengths are left for
/// record validation to reject per sequence.
pub fn join_tables(
    internal: Vec<InternalRow>,
    external: Vec<ExternalRow>,
    windows: &WindowSpec,
) -> Result<JoinedCohort, StorageError> {
    let mut by_key: BTreeMap<(String, String), ExternalRow> = external
        .into_iter()
        .map(|row| {
            let key = (row.label.model_name.clone(), row.label.prompt_id.clone());
            (key, row)
        })
        .collect();

    let mut cohort = JoinedCohort::default();
    for row in internal {
        let key = (row.meta.model_name.clone(), row.meta.prompt_id.clone());
        let mut record = SequenceRecord::new(row.meta, row.internal);

        if let Some(ext) = by_key.remove(&key) {
            if ext.has_series() {
                record.external = external_series(&record, &ext, windows);
            }
            cohort.labels.push(ext.label);
        }
        cohort.recorded.insert(key, row.recorded);
        cohort.records.push(record);
    }
    cohort.orphan_labels = by_key.into_keys().collect();

    if cohort.labels.is_empty() {
        return Err(StorageError::EmptyJoin);
    }
    if !cohort.orphan_labels.is_empty() {
        tracing::warn!(
            orphans = cohort.orphan_labels.len(),
            "external rows without internal metrics ignored"
        );
    }
    tracing::info!(
        records = cohort.records.len(),
        labelled = cohort.labels.len(),
        "joined metric tables"
    );
    Ok(cohort)
}

fn external_series(
    record: &SequenceRecord,
    ext: &ExternalRow,
    windows: &WindowSpec,
) -> Vec<ExternalWindow> {
    let deltas = ext.delta_i.len();
    let (n, delta_offset) = match ext.ngram_novelty.len().max(ext.char_entropy.len()) {
        0 if deltas + 1 == record.internal.len() => (record.internal.len(), 1),
        0 => (deltas, 0),
        m => (m, usize::from(deltas + 1 == m)),
    };

    let bounds = if n == record.internal.len() {
        record.internal.iter().map(|w| w.bounds).collect()
    } else {
        windows.implied_bounds(n)
    };

    (0..n)
        .map(|w| ExternalWindow {
            bounds: bounds[w],
            delta_i: w
                .checked_sub(delta_offset)
                .and_then(|i| ext.delta_i.get(i).copied().flatten()),
            ngram_novelty: ext.ngram_novelty.get(w).copied().unwrap_or(f64::NAN),
            char_entropy: ext.char_entropy.get(w).copied().unwrap_or(f64::NAN),
        })
        .collect()
}
