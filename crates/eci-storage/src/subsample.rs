//! Seeded subsampling for smoke runs.

use rand::seq::index;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use eci_core::config::PipelineConfig;

/// `max(floor(len * fraction), min_rows)` rows, capped at `len`, drawn
/// without replacement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SmokeSample {
    pub fraction: f64,
    pub min_rows: usize,
    pub seed: u64,
}

impl SmokeSample {
    pub fn from_config(config: &PipelineConfig, seed: u64) -> Self {
        Self {
            fraction: config.effective_smoke_fraction(),
            min_rows: config.effective_smoke_min_rows(),
            seed,
        }
    }

    pub fn target(&self, len: usize) -> usize {
        ((len as f64 * self.fraction).floor() as usize)
            .max(self.min_rows)
            .min(len)
    }

    /// The sampled rows, in their original order.
    pub fn apply<T>(&self, rows: Vec<T>) -> Vec<T> {
        let len = rows.len();
        let target = self.target(len);
        if target == len {
            return rows;
        }

        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        let mut keep = vec![false; len];
        for i in index::sample(&mut rng, len, target) {
            keep[i] = true;
        }
        let sampled: Vec<T> = rows
            .into_iter()
            .zip(keep)
            .filter_map(|(row, kept)| kept.then_some(row))
            .collect();
        tracing::info!(rows = len, sampled = sampled.len(), seed = self.seed, "smoke subsample");
        sampled
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(seed: u64) -> SmokeSample {
        SmokeSample {
            fraction: 0.05,
            min_rows: 30,
            seed,
        }
    }

    #[test]
    fn test_target_size() {
        assert_eq!(sample(42).target(1000), 50);
        assert_eq!(sample(42).target(200), 30);
        assert_eq!(sample(42).target(12), 12);
    }

    #[test]
    fn test_deterministic_and_ordered() {
        let rows: Vec<usize> = (0..1000).collect();
        let a = sample(42).apply(rows.clone());
        let b = sample(42).apply(rows.clone());
        let c = sample(7).apply(rows);
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.len(), 50);
        assert!(a.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_small_input_untouched() {
        let rows = vec!["a", "b"];
        assert_eq!(sample(1).apply(rows.clone()), rows);
    }
}
