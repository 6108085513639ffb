//! Diversity statistics of a singular-value spectrum.

use eci_core::constants::SPECTRUM_EPSILON;

/// Effective rank: `exp(H(p))` with `p_i = s_i / sum(s)`.
///
/// A zero or near-zero spectrum has effective rank 1. The result lies in
/// `[1, k]` for `k` singular values.
pub fn effective_rank(singular_values: &[f64]) -> f64 {
    let k = singular_values.len();
    if k == 0 {
        return 1.0;
    }
    let total: f64 = singular_values.iter().map(|s| s.abs()).sum();
    if !(total > SPECTRUM_EPSILON) || !total.is_finite() {
        return 1.0;
    }

    let entropy: f64 = -singular_values
        .iter()
        .map(|s| s.abs() / total)
        .filter(|p| *p > 0.0)
        .map(|p| p * p.ln())
        .sum::<f64>();

    entropy.exp().clamp(1.0, k as f64)
}

/// Participation ratio: `(sum s)^2 / sum s^2`.
///
/// Returns `None` when `sum s^2 = 0`, where the ratio is undefined.
pub fn participation_ratio(singular_values: &[f64]) -> Option<f64> {
    let k = singular_values.len();
    let sum: f64 = singular_values.iter().map(|s| s.abs()).sum();
    let sum_sq: f64 = singular_values.iter().map(|s| s * s).sum();
    if !(sum_sq > 0.0) || !sum_sq.is_finite() {
        return None;
    }
    let ratio = sum * sum / sum_sq;
    if !ratio.is_finite() {
        tracing::warn!(sum, sum_sq, "participation ratio is not finite");
        return None;
    }
    Some(ratio.clamp(1.0, k as f64))
}
