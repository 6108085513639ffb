//! Windowed text drift series.

use eci_core::config::TextConfig;
use eci_core::errors::WindowError;
use eci_core::types::collections::FxHashSet;
use eci_core::types::ExternalWindow;

use super::divergence::jensen_shannon;
use super::entropy::char_entropy;
use super::ngrams::{ngram_counts, ngrams};
use super::tokens::TokenStream;
use crate::windowing::WindowSpec;

/// N-gram order used by divergence and novelty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextSpec {
    ngram_order: usize,
}

impl TextSpec {
    pub fn new(ngram_order: usize) -> Result<Self, WindowError> {
        if ngram_order == 0 {
            return Err(WindowError::InvalidShape {
                message: "n-gram order must be positive".to_string(),
            });
        }
        Ok(Self { ngram_order })
    }

    pub fn from_config(config: &TextConfig) -> Result<Self, WindowError> {
        Self::new(config.effective_ngram_order())
    }

    pub fn ngram_order(&self) -> usize {
        self.ngram_order
    }
}

/// External window series of one sequence.
///
/// Per window: divergence from the previous window (`None` for the first),
/// the fraction of n-gram occurrences never seen in an earlier window, and
/// the character entropy of the window text.
pub fn compute_external_series(
    stream: &TokenStream,
    windows: &WindowSpec,
    text: &TextSpec,
) -> Result<Vec<ExternalWindow>, WindowError> {
    let n = text.ngram_order;
    let plan = windows.plan(stream.len())?;

    let mut series = Vec::with_capacity(plan.len());
    let mut seen: FxHashSet<&[String]> = FxHashSet::default();
    let mut previous = None;

    for bounds in plan {
        let tokens = stream.slice(bounds);
        let counts = ngram_counts(tokens, n);

        let delta_i = previous.as_ref().map(|prev| jensen_shannon(prev, &counts));

        let total: usize = counts.values().sum();
        let novel: usize = counts
            .iter()
            .filter(|(gram, _)| !seen.contains(*gram))
            .map(|(_, &c)| c)
            .sum();
        let ngram_novelty = if total == 0 {
            0.0
        } else {
            novel as f64 / total as f64
        };

        seen.extend(ngrams(tokens, n));

        series.push(ExternalWindow {
            bounds,
            delta_i,
            ngram_novelty,
            char_entropy: char_entropy(&stream.window_text(bounds)),
        });
        previous = Some(counts);
    }

    Ok(series)
}

#[cfg(test)]
mod tests {
    use super::*;
    use eci_core::types::WindowBounds;

    fn distinct_stream(n: usize) -> TokenStream {
        TokenStream::from_tokens((0..n).map(|i| format!("t{i}")).collect())
    }

    #[test]
    fn test_alignment_with_window_plan() {
        let spec = WindowSpec::default();
        let series =
            compute_external_series(&distinct_stream(300), &spec, &TextSpec::new(3).unwrap())
                .unwrap();
        let bounds: Vec<WindowBounds> = series.iter().map(|w| w.bounds).collect();
        assert_eq!(bounds, spec.plan(300).unwrap());
    }

    #[test]
    fn test_first_window_has_no_delta() {
        let series = compute_external_series(
            &distinct_stream(300),
            &WindowSpec::default(),
            &TextSpec::new(3).unwrap(),
        )
        .unwrap();
        assert_eq!(series[0].delta_i, None);
        assert!(series[1..].iter().all(|w| w.delta_i.is_some()));
        assert_eq!(series[0].ngram_novelty, 1.0);
    }

    #[test]
    fn test_overlap_reduces_novelty() {
        // Windows [0,8) and [4,12) share tokens 4..8; trigrams 4-6 and 5-7 repeat.
        let series = compute_external_series(
            &distinct_stream(12),
            &WindowSpec::new(8, 4).unwrap(),
            &TextSpec::new(3).unwrap(),
        )
        .unwrap();
        assert_eq!(series.len(), 2);
        assert!((series[1].ngram_novelty - 4.0 / 6.0).abs() < 1e-12);
    }

    #[test]
    fn test_repeated_window_novelty_falls_to_zero() {
        let tokens: Vec<String> = "a b c d a b c d a b c d"
            .split_whitespace()
            .map(str::to_string)
            .collect();
        let series = compute_external_series(
            &TokenStream::from_tokens(tokens),
            &WindowSpec::new(4, 4).unwrap(),
            &TextSpec::new(2).unwrap(),
        )
        .unwrap();
        assert_eq!(series[0].ngram_novelty, 1.0);
        assert_eq!(series[2].ngram_novelty, 0.0);
        assert!(series[2].delta_i.unwrap().abs() < 1e-12);
    }

    #[test]
    fn test_window_shorter_than_order() {
        let series = compute_external_series(
            &distinct_stream(2),
            &WindowSpec::default(),
            &TextSpec::new(3).unwrap(),
        )
        .unwrap();
        assert_eq!(series.len(), 1);
        assert_eq!(series[0].ngram_novelty, 0.0);
    }

    #[test]
    fn test_empty_stream_fails() {
        let err = compute_external_series(
            &TokenStream::default(),
            &WindowSpec::default(),
            &TextSpec::new(3).unwrap(),
        )
        .unwrap_err();
        assert_eq!(err, WindowError::EmptySequence);
    }
}
