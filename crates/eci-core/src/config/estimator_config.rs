//! ECI estimator and residualization configuration.

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_EARLY_CUTOFF, ECI_COLLAPSE_THRESHOLD};

/// How the control-condition component is removed from `eci_raw`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ResidualizationMethod {
    /// Subtract the control group's mean `eci_raw`.
    #[default]
    ControlMean,
    /// Subtract the prediction of `eci_raw ~ a + b * n_tokens` fitted on the
    /// control group.
    LengthAdjusted,
}

/// Which sequences form the control group. At most one of the fields
/// should be set; with neither set, the per-record `control` flag is used.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct ControlSelectorConfig {
    pub model: Option<String>,
    pub mode: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct EstimatorConfig {
    /// Windows ending at or before this token index feed `early_eci_raw`. Default: 256.
    pub early_cutoff: Option<usize>,
    /// ECI below this value counts as collapse. Default: -0.02.
    pub collapse_threshold: Option<f64>,
    /// Default: control_mean.
    pub residualization: Option<ResidualizationMethod>,
    pub control: ControlSelectorConfig,
}

impl EstimatorConfig {
    pub fn effective_early_cutoff(&self) -> usize {
        self.early_cutoff.unwrap_or(DEFAULT_EARLY_CUTOFF)
    }

    pub fn effective_collapse_threshold(&self) -> f64 {
        self.collapse_threshold.unwrap_or(ECI_COLLAPSE_THRESHOLD)
    }

    pub fn effective_residualization(&self) -> ResidualizationMethod {
        self.residualization.unwrap_or_default()
    }
}
