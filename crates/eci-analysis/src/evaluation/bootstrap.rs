//! Seeded percentile bootstrap.
//!
//! Iteration `i` draws its indices from a ChaCha8 stream selected by `i`
//! under the global seed, so every resample is fixed by `(seed, i)` alone and
//! the result is identical for any thread count or scheduling order.

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;

use eci_core::config::EvaluationConfig;
use eci_core::errors::EvaluationError;

use super::calibration::{ece_unchecked, CalibrationSpec};
use super::precision_recall::ap_unchecked;
use super::roc::auc_unchecked;
use super::types::{BootstrapResult, ConfidenceInterval};
use super::validate::{validate_inputs, ClassCounts};

/// Resolved bootstrap parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BootstrapSpec {
    iterations: usize,
    confidence_level: f64,
    seed: u64,
    max_degenerate_fraction: f64,
}

impl BootstrapSpec {
    pub fn new(
        iterations: usize,
        confidence_level: f64,
        seed: u64,
        max_degenerate_fraction: f64,
    ) -> Result<Self, EvaluationError> {
        if iterations == 0 {
            return Err(EvaluationError::InvalidParameter {
                name: "bootstrap_iterations",
                message: "must be greater than 0".to_string(),
            });
        }
        if !(confidence_level > 0.0 && confidence_level < 1.0) {
            return Err(EvaluationError::InvalidParameter {
                name: "confidence_level",
                message: format!("{confidence_level} is not strictly between 0 and 1"),
            });
        }
        if !(0.0..=1.0).contains(&max_degenerate_fraction) {
            return Err(EvaluationError::InvalidParameter {
                name: "max_degenerate_fraction",
                message: format!("{max_degenerate_fraction} is not between 0 and 1"),
            });
        }
        Ok(Self {
            iterations,
            confidence_level,
            seed,
            max_degenerate_fraction,
        })
    }

    pub fn from_config(config: &EvaluationConfig) -> Result<Self, EvaluationError> {
        Self::new(
            config.effective_bootstrap_iterations(),
            config.effective_confidence_level(),
            config.effective_seed(),
            config.effective_max_degenerate_fraction(),
        )
    }

    pub fn iterations(&self) -> usize {
        self.iterations
    }

    pub fn confidence_level(&self) -> f64 {
        self.confidence_level
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn max_degenerate_fraction(&self) -> f64 {
        self.max_degenerate_fraction
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

impl Default for BootstrapSpec {
    fn default() -> Self {
        Self {
            iterations: eci_core::constants::BOOTSTRAP_N_RESAMPLES,
            confidence_level: eci_core::constants::DEFAULT_CONFIDENCE_LEVEL,
            seed: eci_core::constants::DEFAULT_SEED,
            max_degenerate_fraction: eci_core::constants::DEFAULT_MAX_DEGENERATE_FRACTION,
        }
    }
}

/// `n` indices drawn with replacement for iteration `iteration`.
pub fn resample_indices(seed: u64, iteration: usize, n: usize) -> Vec<usize> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    rng.set_stream(iteration as u64);
    (0..n).map(|_| rng.gen_range(0..n)).collect()
}

/// Linear-interpolated percentile of sorted values, `q` in [0, 1].
pub fn percentile(sorted: &[f64], q: f64) -> f64 {
    match sorted.len() {
        0 => f64::NAN,
        1 => sorted[0],
        len => {
            let h = q.clamp(0.0, 1.0) * (len - 1) as f64;
            let lo = h.floor() as usize;
            let hi = (lo + 1).min(len - 1);
            sorted[lo] + (h - lo as f64) * (sorted[hi] - sorted[lo])
        }
    }
}

/// Run `statistic` over `spec.iterations()` resamples of `0..n`.
///
/// `statistic` returns `None` for a degenerate resample; those are dropped
/// and counted against `max_degenerate_fraction`. An empty sample is
/// `InvalidParameter`.
pub fn bootstrap_statistic<F>(
    name: &'static str,
    n: usize,
    point_estimate: f64,
    spec: &BootstrapSpec,
    statistic: F,
) -> Result<BootstrapResult, EvaluationError>
where
    F: Fn(&[usize]) -> Option<f64> + Sync,
{
    if n == 0 {
        return Err(EvaluationError::InvalidParameter {
            name: "n",
            message: format!("cannot bootstrap {name} over an empty sample"),
        });
    }
    let seed = spec.seed;
    let draws: Vec<Option<f64>> = (0..spec.iterations)
        .into_par_iter()
        .map(|i| statistic(&resample_indices(seed, i, n)))
        .collect();

    let mut values: Vec<f64> = draws.into_iter().flatten().collect();
    let dropped = spec.iterations - values.len();
    let dropped_fraction = dropped as f64 / spec.iterations as f64;

    if values.is_empty() || dropped_fraction > spec.max_degenerate_fraction {
        return Err(EvaluationError::TooManyDegenerateResamples {
            statistic: name,
            dropped,
            iterations: spec.iterations,
            max_fraction: spec.max_degenerate_fraction,
        });
    }
    if dropped > 0 {
        tracing::warn!(
            statistic = name,
            dropped,
            iterations = spec.iterations,
            "dropped single-class bootstrap resamples"
        );
    }

    values.sort_by(f64::total_cmp);
    let alpha = 1.0 - spec.confidence_level;
    let ci = ConfidenceInterval {
        lower: percentile(&values, alpha / 2.0),
        upper: percentile(&values, 1.0 - alpha / 2.0),
        level: spec.confidence_level,
    };
    tracing::debug!(
        statistic = name,
        point_estimate,
        lower = ci.lower,
        upper = ci.upper,
        "bootstrap complete"
    );

    Ok(BootstrapResult {
        statistic: name,
        point_estimate,
        ci,
        iterations: spec.iterations,
        seed,
        valid_iterations: values.len(),
        dropped,
    })
}

/// Gathers a resample and its class counts, or `None` if it is single-class.
fn gather(
    values: &[f64],
    outcomes: &[bool],
    indices: &[usize],
) -> Option<(Vec<f64>, Vec<bool>, ClassCounts)> {
    let v: Vec<f64> = indices.iter().map(|&i| values[i]).collect();
    let o: Vec<bool> = indices.iter().map(|&i| outcomes[i]).collect();
    let counts = ClassCounts::count(&o);
    counts.has_both().then_some((v, o, counts))
}

pub fn bootstrap_roc_auc(
    scores: &[f64],
    outcomes: &[bool],
    spec: &BootstrapSpec,
) -> Result<BootstrapResult, EvaluationError> {
    let counts = validate_inputs(scores, outcomes)?;
    let point = auc_unchecked(scores, outcomes, counts);
    bootstrap_statistic("roc_auc", scores.len(), point, spec, |idx| {
        gather(scores, outcomes, idx).map(|(s, o, c)| auc_unchecked(&s, &o, c))
    })
}

pub fn bootstrap_average_precision(
    scores: &[f64],
    outcomes: &[bool],
    spec: &BootstrapSpec,
) -> Result<BootstrapResult, EvaluationError> {
    let counts = validate_inputs(scores, outcomes)?;
    let point = ap_unchecked(scores, outcomes, counts);
    bootstrap_statistic("average_precision", scores.len(), point, spec, |idx| {
        gather(scores, outcomes, idx).map(|(s, o, c)| ap_unchecked(&s, &o, c))
    })
}

pub fn bootstrap_calibration_error(
    probabilities: &[f64],
    outcomes: &[bool],
    calibration: &CalibrationSpec,
    spec: &BootstrapSpec,
) -> Result<BootstrapResult, EvaluationError> {
    let point = super::calibration::calibration_curve(probabilities, outcomes, calibration)?
        .expected_calibration_error;
    bootstrap_statistic(
        "expected_calibration_error",
        probabilities.len(),
        point,
        spec,
        |idx| {
            gather(probabilities, outcomes, idx).map(|(p, o, _)| ece_unchecked(&p, &o, calibration))
        },
    )
}
