//! Per-sequence ECI values across the two pipeline phases.

use serde::{Deserialize, Serialize};

use super::records::SequenceMeta;

/// Phase-1 output: slopes computed from one sequence in isolation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EciEstimate {
    pub meta: SequenceMeta,
    pub n_windows: usize,
    pub n_tokens: usize,
    /// Slope of effective rank over the full window series.
    pub eci_raw: f64,
    /// Slope over windows ending at or before the early cutoff; `None` when
    /// fewer than two such windows exist.
    pub early_eci_raw: Option<f64>,
}

/// Phase-2 output: the estimate with the cohort-level control component
/// removed. Only the residualization pass constructs these.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EciResult {
    #[serde(flatten)]
    pub estimate: EciEstimate,
    pub eci_residualized: f64,
}

impl EciResult {
    pub fn prompt_id(&self) -> &str {
        &self.estimate.meta.prompt_id
    }

    pub fn model_name(&self) -> &str {
        &self.estimate.meta.model_name
    }

    pub fn eci_raw(&self) -> f64 {
        self.estimate.eci_raw
    }

    pub fn early_eci_raw(&self) -> Option<f64> {
        self.estimate.early_eci_raw
    }
}
