//! Degenerate repetition detection over adjacent token windows.

use eci_core::config::TextConfig;
use eci_core::types::collections::FxHashSet;

/// Window size and overlap threshold for [`detect_repetition`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RepetitionSpec {
    pub window: usize,
    pub threshold: f64,
}

impl RepetitionSpec {
    pub fn from_config(config: &TextConfig) -> Self {
        Self {
            window: config.effective_repetition_window(),
            threshold: config.effective_repetition_threshold(),
        }
    }
}

/// True when some pair of back-to-back token windows has a Jaccard overlap
/// of their vocabularies above `spec.threshold`.
///
/// Streams shorter than two windows are never flagged.
pub fn detect_repetition(tokens: &[String], spec: &RepetitionSpec) -> bool {
    let w = spec.window;
    if w == 0 || tokens.len() < 2 * w {
        return false;
    }
    (0..=tokens.len() - 2 * w).any(|i| {
        let first: FxHashSet<&str> = tokens[i..i + w].iter().map(String::as_str).collect();
        let second: FxHashSet<&str> = tokens[i + w..i + 2 * w].iter().map(String::as_str).collect();
        let union = first.union(&second).count();
        union > 0 && first.intersection(&second).count() as f64 / union as f64 > spec.threshold
    })
}
