//! Serializable run outputs.

use std::collections::BTreeMap;

use serde::Serialize;

use eci_core::errors::SequenceFailure;
use eci_core::types::{EciResult, SequenceMeta, SequenceRecord};

use crate::eci::{ControlFit, EciSummary};
use crate::evaluation::{BootstrapResult, CalibrationCurve, PrCurve, RocCurve};
use crate::spectral::{summarize_trajectory, TrajectorySummary};

/// Join key of a sequence that appears in the report by reference only.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct SequenceKey {
    pub model_name: String,
    pub prompt_id: String,
}

impl From<&SequenceMeta> for SequenceKey {
    fn from(meta: &SequenceMeta) -> Self {
        Self {
            model_name: meta.model_name.clone(),
            prompt_id: meta.prompt_id.clone(),
        }
    }
}

/// Descriptive per-sequence features reported next to the ECI values.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SequenceFeatures {
    #[serde(flatten)]
    pub key: SequenceKey,
    /// Effective-rank trajectory summary.
    pub rank_trajectory: TrajectorySummary,
    /// `None` when the token stream was not available.
    pub repetition_detected: Option<bool>,
}

impl SequenceFeatures {
    /// Features of a record that arrives without its token stream.
    pub fn from_record(record: &SequenceRecord) -> Self {
        Self {
            key: SequenceKey::from(&record.meta),
            rank_trajectory: summarize_trajectory(&record.effective_ranks()),
            repetition_detected: None,
        }
    }
}

/// Predictive evaluation over the labelled subset.
#[derive(Debug, Clone, Serialize)]
pub struct PredictionReport {
    pub n_labelled: usize,
    pub positives: usize,
    pub negatives: usize,
    pub sigmoid_scale: f64,
    pub roc: RocCurve,
    pub pr: PrCurve,
    pub calibration: CalibrationCurve,
    pub roc_auc: BootstrapResult,
    pub average_precision: BootstrapResult,
    pub expected_calibration_error: BootstrapResult,
}

#[derive(Debug, Clone, Serialize)]
pub struct CohortReport {
    pub n_sequences: usize,
    pub n_included: usize,
    pub exclusions: Vec<SequenceFailure>,
    pub control: ControlFit,
    pub overall: EciSummary,
    pub by_model: BTreeMap<String, EciSummary>,
    /// Included sequences whose early slope is undefined.
    pub early_eci_undefined: usize,
    /// Included sequences flagged for degenerate repetition.
    pub repetition_detected: usize,
    pub prediction: PredictionReport,
    /// Included sequences with no outcome label.
    pub unlabelled: Vec<SequenceKey>,
    /// Included sequences in result order.
    pub features: Vec<SequenceFeatures>,
    /// Written separately as one row per sequence.
    #[serde(skip)]
    pub results: Vec<EciResult>,
}
