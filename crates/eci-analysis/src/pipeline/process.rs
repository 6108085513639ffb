//! Raw hidden states and tokens to window series.

use eci_core::config::EciConfig;
use eci_core::errors::WindowError;
use eci_core::types::{SequenceMeta, SequenceRecord};

use crate::spectral::{
    compute_internal_series, summarize_trajectory, HiddenStates, TrajectorySummary,
};
use crate::text::{
    compute_external_series, detect_repetition, RepetitionSpec, TextSpec, TokenStream,
};
use crate::windowing::WindowSpec;

use super::report::{SequenceFeatures, SequenceKey};

/// One generated sequence before any metric is computed.
#[derive(Debug, Clone)]
pub struct RawSequence {
    pub meta: SequenceMeta,
    pub hidden_states: HiddenStates,
    /// Generated tokens, aligned one-to-one with hidden-state rows.
    pub tokens: Option<TokenStream>,
}

#[derive(Debug, Clone)]
pub struct ProcessedSequence {
    pub record: SequenceRecord,
    pub rank_trajectory: TrajectorySummary,
    /// `None` when no tokens were supplied.
    pub repetition_detected: Option<bool>,
}

impl ProcessedSequence {
    pub fn features(&self) -> SequenceFeatures {
        SequenceFeatures {
            key: SequenceKey::from(&self.record.meta),
            rank_trajectory: self.rank_trajectory,
            repetition_detected: self.repetition_detected,
        }
    }
}

/// Window plan plus text parameters, resolved once per run.
#[derive(Debug, Clone, Copy)]
pub struct SequenceProcessor {
    windows: WindowSpec,
    text: TextSpec,
    repetition: RepetitionSpec,
}

impl SequenceProcessor {
    pub fn new(windows: WindowSpec, text: TextSpec, repetition: RepetitionSpec) -> Self {
        Self {
            windows,
            text,
            repetition,
        }
    }

    pub fn from_config(config: &EciConfig) -> Result<Self, WindowError> {
        Ok(Self::new(
            WindowSpec::from_config(&config.windowing)?,
            TextSpec::from_config(&config.text)?,
            RepetitionSpec::from_config(&config.text),
        ))
    }

    pub fn windows(&self) -> &WindowSpec {
        &self.windows
    }

    pub fn process(&self, raw: &RawSequence) -> Result<ProcessedSequence, WindowError> {
        let internal = compute_internal_series(&raw.hidden_states, &self.windows)?;
        let mut record = SequenceRecord::new(raw.meta.clone(), internal);
        let rank_trajectory = summarize_trajectory(&record.effective_ranks());

        let mut repetition_detected = None;
        if let Some(tokens) = &raw.tokens {
            if tokens.len() != raw.hidden_states.n_tokens() {
                return Err(WindowError::LengthMismatch {
                    field: "tokens".to_string(),
                    expected: raw.hidden_states.n_tokens(),
                    actual: tokens.len(),
                });
            }
            record = record.with_external(compute_external_series(
                tokens,
                &self.windows,
                &self.text,
            )?);
            repetition_detected = Some(detect_repetition(tokens.tokens(), &self.repetition));
        }

        record.validate(self.windows.length(), self.windows.stride())?;
        Ok(ProcessedSequence {
            record,
            rank_trajectory,
            repetition_detected,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(n_tokens: usize, with_tokens: bool) -> RawSequence {
        let rows: Vec<Vec<f64>> = (0..n_tokens)
            .map(|t| (0..6).map(|d| ((t * 7 + d * 3) % 11) as f64).collect())
            .collect();
        let tokens = with_tokens.then(|| {
            TokenStream::from_tokens((0..n_tokens).map(|t| format!("w{}", t % 17)).collect())
        });
        RawSequence {
            meta: SequenceMeta::new("p1", "m"),
            hidden_states: HiddenStates::from_rows(&rows).unwrap(),
            tokens,
        }
    }

    #[test]
    fn test_series_aligned() {
        let processed = SequenceProcessor::new(
            WindowSpec::default(),
            TextSpec::new(3).unwrap(),
            RepetitionSpec { window: 50, threshold: 0.8 },
        )
        .process(&raw(300, true))
        .unwrap();
        assert_eq!(processed.record.internal.len(), 3);
        assert_eq!(processed.record.external.len(), 3);
        assert!(processed.repetition_detected.is_some());
        assert!(processed.rank_trajectory.min >= 1.0);
    }

    #[test]
    fn test_without_tokens() {
        let processed = SequenceProcessor::from_config(&EciConfig::default())
            .unwrap()
            .process(&raw(200, false))
            .unwrap();
        assert!(processed.record.external.is_empty());
        assert_eq!(processed.repetition_detected, None);
    }

    #[test]
    fn test_token_length_mismatch() {
        let mut sequence = raw(200, true);
        sequence.tokens = Some(TokenStream::from_text("too few tokens"));
        let err = SequenceProcessor::from_config(&EciConfig::default())
            .unwrap()
            .process(&sequence)
            .unwrap_err();
        assert_eq!(
            err,
            WindowError::LengthMismatch {
                field: "tokens".into(),
                expected: 200,
                actual: 3
            }
        );
    }
}
