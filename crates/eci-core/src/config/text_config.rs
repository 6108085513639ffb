//! Text drift metric configuration.

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_NGRAM_ORDER, DEFAULT_REPETITION_THRESHOLD, DEFAULT_REPETITION_WINDOW,
};

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct TextConfig {
    /// N-gram order for divergence and novelty. Default: 3.
    pub ngram_order: Option<usize>,
    /// Token window for repetition detection. Default: 50.
    pub repetition_window: Option<usize>,
    /// Jaccard overlap that counts as repetition. Default: 0.8.
    pub repetition_threshold: Option<f64>,
}

impl TextConfig {
    pub fn effective_ngram_order(&self) -> usize {
        self.ngram_order.unwrap_or(DEFAULT_NGRAM_ORDER)
    }

    pub fn effective_repetition_window(&self) -> usize {
        self.repetition_window.unwrap_or(DEFAULT_REPETITION_WINDOW)
    }

    pub fn effective_repetition_threshold(&self) -> f64 {
        self.repetition_threshold
            .unwrap_or(DEFAULT_REPETITION_THRESHOLD)
    }
}
