//! Per-sequence ECI slopes.

use eci_core::config::EstimatorConfig;
use eci_core::errors::EstimationError;
use eci_core::types::{EciEstimate, InternalWindow, SequenceRecord};

use super::slope::ols_fit;

/// Reduces an effective-rank window series to `eci_raw` and `early_eci_raw`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EciEstimator {
    early_cutoff: usize,
}

impl EciEstimator {
    pub fn new(early_cutoff: usize) -> Self {
        Self { early_cutoff }
    }

    pub fn from_config(config: &EstimatorConfig) -> Self {
        Self::new(config.effective_early_cutoff())
    }

    pub fn early_cutoff(&self) -> usize {
        self.early_cutoff
    }

    /// Slope of effective rank against window midpoint over the full series.
    pub fn eci_raw(&self, series: &[InternalWindow]) -> Result<f64, EstimationError> {
        rank_slope("eci_raw", series.iter())
    }

    /// Slope over windows with `window_end <= early_cutoff`.
    pub fn early_eci_raw(&self, series: &[InternalWindow]) -> Result<f64, EstimationError> {
        rank_slope(
            "early_eci_raw",
            series.iter().filter(|w| w.bounds.end <= self.early_cutoff),
        )
    }

    /// Both slopes for one record. Only `eci_raw` failing rejects the
    /// record; an undefined early slope is left empty.
    pub fn estimate(&self, record: &SequenceRecord) -> Result<EciEstimate, EstimationError> {
        let eci_raw = self.eci_raw(&record.internal)?;
        let early_eci_raw = match self.early_eci_raw(&record.internal) {
            Ok(slope) => Some(slope),
            Err(e) => {
                tracing::debug!(
                    prompt_id = %record.meta.prompt_id,
                    model_name = %record.meta.model_name,
                    early_cutoff = self.early_cutoff,
                    "early_eci_raw undefined: {e}"
                );
                None
            }
        };
        Ok(EciEstimate {
            meta: record.meta.clone(),
            n_windows: record.internal.len(),
            n_tokens: record.n_tokens(),
            eci_raw,
            early_eci_raw,
        })
    }
}

fn rank_slope<'a>(
    statistic: &'static str,
    windows: impl Iterator<Item = &'a InternalWindow>,
) -> Result<f64, EstimationError> {
    let (x, y): (Vec<f64>, Vec<f64>) = windows
        .map(|w| (w.bounds.midpoint(), w.effective_rank))
        .unzip();

    ols_fit(&x, &y)
        .map(|fit| fit.slope)
        .ok_or_else(|| EstimationError::InsufficientWindows {
            statistic,
            required: 2,
            found: distinct_count(&x),
        })
}

fn distinct_count(values: &[f64]) -> usize {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    sorted.dedup();
    sorted.len()
}
