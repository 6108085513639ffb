//! Precision-recall curve and average precision.

use eci_core::errors::EvaluationError;

use super::roc::descending_groups;
use super::types::{PrCurve, PrPoint};
use super::validate::{validate_inputs, ClassCounts};

/// `Σ (Rₙ − Rₙ₋₁)·Pₙ` over distinct thresholds.
pub fn average_precision(scores: &[f64], outcomes: &[bool]) -> Result<f64, EvaluationError> {
    let counts = validate_inputs(scores, outcomes)?;
    Ok(ap_unchecked(scores, outcomes, counts))
}

pub(crate) fn ap_unchecked(scores: &[f64], outcomes: &[bool], counts: ClassCounts) -> f64 {
    walk(scores, outcomes, counts).1
}

pub fn pr_curve(scores: &[f64], outcomes: &[bool]) -> Result<PrCurve, EvaluationError> {
    let counts = validate_inputs(scores, outcomes)?;
    let (points, average_precision) = walk(scores, outcomes, counts);
    Ok(PrCurve {
        points,
        average_precision,
        prevalence: counts.positives as f64 / counts.total() as f64,
    })
}

fn walk(scores: &[f64], outcomes: &[bool], counts: ClassCounts) -> (Vec<PrPoint>, f64) {
    let p = counts.positives as f64;
    let mut points = Vec::new();
    let (mut tp, mut seen) = (0usize, 0usize);
    let (mut ap, mut prev_recall) = (0.0, 0.0);

    for group in descending_groups(scores) {
        seen += group.len();
        tp += group.iter().filter(|&&idx| outcomes[idx]).count();
        let precision = tp as f64 / seen as f64;
        let recall = tp as f64 / p;
        ap += (recall - prev_recall) * precision;
        prev_recall = recall;
        points.push(PrPoint {
            threshold: scores[group[0]],
            precision,
            recall,
        });
    }
    (points, ap)
}
