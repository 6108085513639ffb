//! Character-level Shannon entropy.

use eci_core::types::collections::FxHashMap;

/// Shannon entropy in bits of the character distribution of `text`.
/// Empty text has entropy 0.
pub fn char_entropy(text: &str) -> f64 {
    let mut counts: FxHashMap<char, usize> = FxHashMap::default();
    let mut total = 0usize;
    for c in text.chars() {
        *counts.entry(c).or_insert(0) += 1;
        total += 1;
    }
    if total == 0 {
        return 0.0;
    }
    let total = total as f64;
    -counts
        .values()
        .map(|&c| {
            let p = c as f64 / total;
            p * p.log2()
        })
        .sum::<f64>()
}
