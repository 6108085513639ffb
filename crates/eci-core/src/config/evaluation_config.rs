//! Evaluation engine configuration.

use serde::{Deserialize, Serialize};

use crate::constants::{
    BOOTSTRAP_N_RESAMPLES, CALIBRATION_N_BINS, DEFAULT_CONFIDENCE_LEVEL,
    DEFAULT_MAX_DEGENERATE_FRACTION, DEFAULT_SEED, DEFAULT_SIGMOID_SCALE,
};

/// Calibration binning strategy.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CalibrationBinning {
    /// Fixed-width bins over [0, 1].
    #[default]
    Uniform,
    /// Bins holding roughly equal numbers of predictions.
    Quantile,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct EvaluationConfig {
    /// Seed for bootstrap resampling. Default: 42.
    pub seed: Option<u64>,
    /// Bootstrap iteration count. Default: 1000.
    pub bootstrap_iterations: Option<usize>,
    /// Confidence level of percentile intervals. Default: 0.95.
    pub confidence_level: Option<f64>,
    /// Maximum fraction of single-class resamples. Default: 0.05.
    pub max_degenerate_fraction: Option<f64>,
    /// Calibration bin count. Default: 10.
    pub calibration_bins: Option<usize>,
    /// Default: uniform.
    pub calibration_binning: Option<CalibrationBinning>,
    /// Slope applied to failure scores before the sigmoid. Default: 10.
    pub sigmoid_scale: Option<f64>,
}

impl EvaluationConfig {
    pub fn effective_seed(&self) -> u64 {
        self.seed.unwrap_or(DEFAULT_SEED)
    }

    pub fn effective_bootstrap_iterations(&self) -> usize {
        self.bootstrap_iterations.unwrap_or(BOOTSTRAP_N_RESAMPLES)
    }

    pub fn effective_confidence_level(&self) -> f64 {
        self.confidence_level.unwrap_or(DEFAULT_CONFIDENCE_LEVEL)
    }

    pub fn effective_max_degenerate_fraction(&self) -> f64 {
        self.max_degenerate_fraction
            .unwrap_or(DEFAULT_MAX_DEGENERATE_FRACTION)
    }

    pub fn effective_calibration_bins(&self) -> usize {
        self.calibration_bins.unwrap_or(CALIBRATION_N_BINS)
    }

    pub fn effective_calibration_binning(&self) -> CalibrationBinning {
        self.calibration_binning.unwrap_or_default()
    }

    pub fn effective_sigmoid_scale(&self) -> f64 {
        self.sigmoid_scale.unwrap_or(DEFAULT_SIGMOID_SCALE)
    }
}
