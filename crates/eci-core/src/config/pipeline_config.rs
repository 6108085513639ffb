//! Cohort pipeline configuration.

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_MAX_EXCLUDED_FRACTION, DEFAULT_SMOKE_FRACTION, DEFAULT_SMOKE_MIN_ROWS,
};

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct PipelineConfig {
    /// Maximum fraction of sequences excluded by per-sequence failures. Default: 0.10.
    pub max_excluded_fraction: Option<f64>,
    /// Worker threads for phase 1 and bootstrap (0 = auto-detect).
    pub threads: Option<usize>,
    /// Smoke-run subsample fraction. Default: 0.05.
    pub smoke_fraction: Option<f64>,
    /// Smoke-run minimum row count. Default: 30.
    pub smoke_min_rows: Option<usize>,
}

impl PipelineConfig {
    pub fn effective_max_excluded_fraction(&self) -> f64 {
        self.max_excluded_fraction
            .unwrap_or(DEFAULT_MAX_EXCLUDED_FRACTION)
    }

    pub fn effective_threads(&self) -> usize {
        self.threads.unwrap_or(0)
    }

    pub fn effective_smoke_fraction(&self) -> f64 {
        self.smoke_fraction.unwrap_or(DEFAULT_SMOKE_FRACTION)
    }

    pub fn effective_smoke_min_rows(&self) -> usize {
        self.smoke_min_rows.unwrap_or(DEFAULT_SMOKE_MIN_ROWS)
    }
}
