//! ROC curve and rank-based AUC.

use eci_core::errors::EvaluationError;

use super::types::{RocCurve, RocPoint};
use super::validate::{validate_inputs, ClassCounts};

/// Area under the ROC curve via the Mann-Whitney U statistic.
pub fn roc_auc(scores: &[f64], outcomes: &[bool]) -> Result<f64, EvaluationError> {
    let counts = validate_inputs(scores, outcomes)?;
    Ok(auc_unchecked(scores, outcomes, counts))
}

/// AUC for inputs already known to be valid.
pub(crate) fn auc_unchecked(scores: &[f64], outcomes: &[bool], counts: ClassCounts) -> f64 {
    let ranks = average_ranks(scores);
    let positive_rank_sum: f64 = ranks
        .iter()
        .zip(outcomes)
        .filter(|(_, &o)| o)
        .map(|(r, _)| r)
        .sum();
    let p = counts.positives as f64;
    let u = positive_rank_sum - p * (p + 1.0) / 2.0;
    u / (p * counts.negatives as f64)
}

/// 1-based ranks with ties sharing their average rank.
fn average_ranks(values: &[f64]) -> Vec<f64> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));

    let mut ranks = vec![0.0; values.len()];
    let mut i = 0;
    while i < order.len() {
        let mut j = i + 1;
        while j < order.len() && values[order[j]] == values[order[i]] {
            j += 1;
        }
        // Positions i..j hold ranks i+1..=j.
        let rank = (i + 1 + j) as f64 / 2.0;
        for &idx in &order[i..j] {
            ranks[idx] = rank;
        }
        i = j;
    }
    ranks
}

/// Indices sorted by descending score, grouped into runs of equal score.
pub(crate) fn descending_groups(scores: &[f64]) -> Vec<Vec<usize>> {
    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]));

    let mut groups: Vec<Vec<usize>> = Vec::new();
    for idx in order {
        match groups.last_mut() {
            Some(group) if scores[group[0]] == scores[idx] => group.push(idx),
            _ => groups.push(vec![idx]),
        }
    }
    groups
}

/// ROC points at every distinct score, from (0, 0) to (1, 1).
pub fn roc_curve(scores: &[f64], outcomes: &[bool]) -> Result<RocCurve, EvaluationError> {
    let counts = validate_inputs(scores, outcomes)?;
    let (p, n) = (counts.positives as f64, counts.negatives as f64);

    let mut points = vec![RocPoint {
        threshold: f64::INFINITY,
        fpr: 0.0,
        tpr: 0.0,
    }];
    let (mut tp, mut fp) = (0usize, 0usize);
    for group in descending_groups(scores) {
        for &idx in &group {
            if outcomes[idx] {
                tp += 1;
            } else {
                fp += 1;
            }
        }
        points.push(RocPoint {
            threshold: scores[group[0]],
            fpr: fp as f64 / n,
            tpr: tp as f64 / p,
        });
    }

    Ok(RocCurve {
        points,
        auc: auc_unchecked(scores, outcomes, counts),
    })
}
