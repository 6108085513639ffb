//! Distributional distance between n-gram frequency tables.

use std::hash::Hash;

use eci_core::types::collections::FxHashMap;

/// Jensen-Shannon divergence in bits between two frequency tables.
///
/// Symmetric and bounded to `[0, 1]`. An empty table has no distribution to
/// compare, so any comparison involving one is maximal (1.0).
pub fn jensen_shannon<K: Hash + Eq>(p: &FxHashMap<K, usize>, q: &FxHashMap<K, usize>) -> f64 {
    let p_total: usize = p.values().sum();
    let q_total: usize = q.values().sum();
    if p_total == 0 || q_total == 0 {
        return 1.0;
    }
    let (p_total, q_total) = (p_total as f64, q_total as f64);

    let mut divergence = 0.0;
    for (key, &count) in p {
        let pk = count as f64 / p_total;
        let qk = q.get(key).map_or(0.0, |&c| c as f64 / q_total);
        let m = 0.5 * (pk + qk);
        divergence += 0.5 * pk * (pk / m).log2();
        if qk > 0.0 {
            divergence += 0.5 * qk * (qk / m).log2();
        }
    }
    for (key, &count) in q {
        if p.contains_key(key) {
            continue;
        }
        // qk / m = 2 when pk = 0
        divergence += 0.5 * (count as f64 / q_total);
    }

    divergence.clamp(0.0, 1.0)
}
