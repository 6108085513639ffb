//! N-gram extraction and counting.

use eci_core::types::collections::FxHashMap;

/// Contiguous n-grams of `tokens`, borrowed as slices.
pub fn ngrams(tokens: &[String], n: usize) -> impl Iterator<Item = &[String]> {
    debug_assert!(n > 0);
    tokens.windows(n.max(1))
}

/// Frequency table of the n-grams of `tokens`.
pub fn ngram_counts(tokens: &[String], n: usize) -> FxHashMap<&[String], usize> {
    let mut counts = FxHashMap::default();
    for gram in ngrams(tokens, n) {
        *counts.entry(gram).or_insert(0) += 1;
    }
    counts
}
