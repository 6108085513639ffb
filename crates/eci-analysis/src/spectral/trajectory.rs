//! Summary statistics of a metric trajectory.

use serde::Serialize;
use statrs::statistics::Statistics;

/// Mean, population standard deviation, min and max of a trajectory.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Default)]
pub struct TrajectorySummary {
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub max: f64,
}

/// Summarize a window series; an empty series summarizes to zeros.
pub fn summarize_trajectory(values: &[f64]) -> TrajectorySummary {
    if values.is_empty() {
        return TrajectorySummary::default();
    }
    TrajectorySummary {
        mean: values.iter().mean(),
        std: values.iter().population_std_dev(),
        min: values.iter().copied().fold(f64::INFINITY, f64::min),
        max: values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary() {
        let s = summarize_trajectory(&[1.0, 2.0, 3.0, 4.0]);
        assert!((s.mean - 2.5).abs() < 1e-12);
        assert!((s.std - 1.25f64.sqrt()).abs() < 1e-12);
        assert_eq!(s.min, 1.0);
        assert_eq!(s.max, 4.0);
    }

    #[test]
    fn test_empty_summary_is_zero() {
        assert_eq!(summarize_trajectory(&[]), TrajectorySummary::default());
    }
}
