//! Reliability binning, Brier score and expected calibration error.

use eci_core::config::{CalibrationBinning, EvaluationConfig};
use eci_core::errors::EvaluationError;

use super::types::{CalibrationBin, CalibrationCurve};
use super::validate::validate_inputs;

/// Resolved binning parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalibrationSpec {
    bins: usize,
    binning: CalibrationBinning,
}

impl CalibrationSpec {
    pub fn new(bins: usize, binning: CalibrationBinning) -> Result<Self, EvaluationError> {
        if bins == 0 {
            return Err(EvaluationError::InvalidParameter {
                name: "calibration_bins",
                message: "must be greater than 0".to_string(),
            });
        }
        Ok(Self { bins, binning })
    }

    pub fn from_config(config: &EvaluationConfig) -> Result<Self, EvaluationError> {
        Self::new(
            config.effective_calibration_bins(),
            config.effective_calibration_binning(),
        )
    }

    pub fn bins(&self) -> usize {
        self.bins
    }

    pub fn binning(&self) -> CalibrationBinning {
        self.binning
    }
}

impl Default for CalibrationSpec {
    fn default() -> Self {
        Self {
            bins: eci_core::constants::CALIBRATION_N_BINS,
            binning: CalibrationBinning::Uniform,
        }
    }
}

fn validate_probabilities(
    probabilities: &[f64],
    outcomes: &[bool],
) -> Result<(), EvaluationError> {
    validate_inputs(probabilities, outcomes)?;
    match probabilities
        .iter()
        .position(|p| !(0.0..=1.0).contains(p))
    {
        Some(index) => Err(EvaluationError::ProbabilityOutOfRange {
            index,
            value: probabilities[index],
        }),
        None => Ok(()),
    }
}

/// Mean squared difference between probability and outcome.
pub fn brier_score(probabilities: &[f64], outcomes: &[bool]) -> Result<f64, EvaluationError> {
    validate_probabilities(probabilities, outcomes)?;
    Ok(brier_unchecked(probabilities, outcomes))
}

fn brier_unchecked(probabilities: &[f64], outcomes: &[bool]) -> f64 {
    let sum: f64 = probabilities
        .iter()
        .zip(outcomes)
        .map(|(&p, &o)| {
            let y = if o { 1.0 } else { 0.0 };
            (p - y).powi(2)
        })
        .sum();
    sum / probabilities.len() as f64
}

pub fn calibration_curve(
    probabilities: &[f64],
    outcomes: &[bool],
    spec: &CalibrationSpec,
) -> Result<CalibrationCurve, EvaluationError> {
    validate_probabilities(probabilities, outcomes)?;
    Ok(curve_unchecked(probabilities, outcomes, spec))
}

/// ECE alone, for bootstrap resamples already known to be valid.
pub(crate) fn ece_unchecked(
    probabilities: &[f64],
    outcomes: &[bool],
    spec: &CalibrationSpec,
) -> f64 {
    curve_unchecked(probabilities, outcomes, spec).expected_calibration_error
}

fn curve_unchecked(
    probabilities: &[f64],
    outcomes: &[bool],
    spec: &CalibrationSpec,
) -> CalibrationCurve {
    let assignment = match spec.binning {
        CalibrationBinning::Uniform => uniform_assignment(probabilities, spec.bins),
        CalibrationBinning::Quantile => quantile_assignment(probabilities, spec.bins),
    };

    #[derive(Default, Clone, Copy)]
    struct Acc {
        count: usize,
        sum_p: f64,
        positives: usize,
        min_p: f64,
        max_p: f64,
    }

    let mut accs = vec![Acc::default(); spec.bins];
    for ((&p, &o), &bin) in probabilities.iter().zip(outcomes).zip(&assignment) {
        let acc = &mut accs[bin];
        if acc.count == 0 {
            acc.min_p = p;
            acc.max_p = p;
        } else {
            acc.min_p = acc.min_p.min(p);
            acc.max_p = acc.max_p.max(p);
        }
        acc.count += 1;
        acc.sum_p += p;
        acc.positives += usize::from(o);
    }

    let n = probabilities.len() as f64;
    let width = 1.0 / spec.bins as f64;
    let mut ece = 0.0;
    let bins: Vec<CalibrationBin> = accs
        .iter()
        .enumerate()
        .filter(|(_, acc)| acc.count > 0)
        .map(|(b, acc)| {
            let mean_predicted = acc.sum_p / acc.count as f64;
            let observed_fraction = acc.positives as f64 / acc.count as f64;
            ece += acc.count as f64 / n * (mean_predicted - observed_fraction).abs();
            let (lower, upper) = match spec.binning {
                CalibrationBinning::Uniform => (b as f64 * width, (b + 1) as f64 * width),
                CalibrationBinning::Quantile => (acc.min_p, acc.max_p),
            };
            CalibrationBin {
                lower,
                upper,
                mean_predicted,
                observed_fraction,
                count: acc.count,
            }
        })
        .collect();

    CalibrationCurve {
        bins,
        brier_score: brier_unchecked(probabilities, outcomes),
        expected_calibration_error: ece,
    }
}

/// Fixed-width bins; p = 1 lands in the last bin.
fn uniform_assignment(probabilities: &[f64], bins: usize) -> Vec<usize> {
    probabilities
        .iter()
        .map(|&p| ((p * bins as f64).floor() as usize).min(bins - 1))
        .collect()
}

/// Equal-count bins over the sorted probabilities. Tied probabilities share
/// the bin of their first occurrence.
fn quantile_assignment(probabilities: &[f64], bins: usize) -> Vec<usize> {
    let n = probabilities.len();
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| probabilities[a].total_cmp(&probabilities[b]));

    let mut assignment = vec![0; n];
    let mut prev: Option<(f64, usize)> = None;
    for (rank, &idx) in order.iter().enumerate() {
        let p = probabilities[idx];
        let bin = match prev {
            Some((prev_p, prev_bin)) if prev_p == p => prev_bin,
            _ => rank * bins / n,
        };
        assignment[idx] = bin;
        prev = Some((p, bin));
    }
    assignment
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_bins_and_last_edge() {
        let probs = [0.05, 0.15, 0.95, 1.0];
        let outcomes = [false, false, true, true];
        let curve = calibration_curve(&probs, &outcomes, &CalibrationSpec::default()).unwrap();
        assert_eq!(curve.bins.len(), 3);
        let last = curve.bins.last().unwrap();
        assert_eq!(last.count, 2);
        assert!((last.lower - 0.9).abs() < 1e-12);
        assert!((last.mean_predicted - 0.975).abs() < 1e-12);
        assert_eq!(last.observed_fraction, 1.0);
    }

    #[test]
    fn test_perfectly_calibrated_extremes() {
        let curve = calibration_curve(
            &[0.0, 0.0, 1.0, 1.0],
            &[false, false, true, true],
            &CalibrationSpec::default(),
        )
        .unwrap();
        assert_eq!(curve.expected_calibration_error, 0.0);
        assert_eq!(curve.brier_score, 0.0);
    }

    #[test]
    fn test_ece_weights_by_count() {
        // One bin at 0.55 with 1/4 positives: |0.55 - 0.25| = 0.3.
        let curve = calibration_curve(
            &[0.55; 4],
            &[true, false, false, false],
            &CalibrationSpec::default(),
        )
        .unwrap();
        assert!((curve.expected_calibration_error - 0.3).abs() < 1e-12);
    }

    #[test]
    fn test_quantile_bins_equal_counts() {
        let probs: Vec<f64> = (0..10).map(|i| i as f64 / 20.0).collect();
        let outcomes: Vec<bool> = (0..10).map(|i| i % 2 == 0).collect();
        let spec = CalibrationSpec::new(5, CalibrationBinning::Quantile).unwrap();
        let curve = calibration_curve(&probs, &outcomes, &spec).unwrap();
        assert_eq!(curve.bins.len(), 5);
        assert!(curve.bins.iter().all(|b| b.count == 2));
        assert!(curve.bins.windows(2).all(|w| w[0].upper <= w[1].lower));
    }

    #[test]
    fn test_out_of_range_probability() {
        let err = brier_score(&[0.2, 1.5], &[false, true]).unwrap_err();
        assert_eq!(err, EvaluationError::ProbabilityOutOfRange { index: 1, value: 1.5 });
    }

    #[test]
    fn test_zero_bins_rejected() {
        assert!(CalibrationSpec::new(0, CalibrationBinning::Uniform).is_err());
    }
}
