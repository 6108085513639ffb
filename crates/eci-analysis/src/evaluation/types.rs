//! Evaluation result types. All serialize into `report.json`.

use serde::Serialize;

/// One ROC operating point. The first point has an infinite threshold.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RocPoint {
    pub threshold: f64,
    pub fpr: f64,
    pub tpr: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RocCurve {
    pub points: Vec<RocPoint>,
    pub auc: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PrPoint {
    pub threshold: f64,
    pub precision: f64,
    pub recall: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PrCurve {
    pub points: Vec<PrPoint>,
    pub average_precision: f64,
    /// Positive rate; the average precision of an uninformative score.
    pub prevalence: f64,
}

/// A non-empty calibration bin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CalibrationBin {
    pub lower: f64,
    pub upper: f64,
    pub mean_predicted: f64,
    pub observed_fraction: f64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalibrationCurve {
    pub bins: Vec<CalibrationBin>,
    pub brier_score: f64,
    pub expected_calibration_error: f64,
}

/// Two-sided percentile interval.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ConfidenceInterval {
    pub lower: f64,
    pub upper: f64,
    pub level: f64,
}

impl ConfidenceInterval {
    pub fn contains(&self, value: f64) -> bool {
        self.lower <= value && value <= self.upper
    }

    pub fn width(&self) -> f64 {
        self.upper - self.lower
    }
}

/// Point estimate plus bootstrap interval for one statistic.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BootstrapResult {
    pub statistic: &'static str,
    pub point_estimate: f64,
    pub ci: ConfidenceInterval,
    pub iterations: usize,
    pub seed: u64,
    pub valid_iterations: usize,
    /// Resamples dropped because they held a single outcome class.
    pub dropped: usize,
}
