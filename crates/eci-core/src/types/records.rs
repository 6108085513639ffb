//! Per-sequence window series and outcome labels.

use serde::{Deserialize, Serialize};

use super::collections::BTreeMap;
use crate::errors::WindowError;

/// Half-open token range `[start, end)` covered by one window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WindowBounds {
    pub start: usize,
    pub end: usize,
}

impl WindowBounds {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    /// Window midpoint in token units, the regressor for ECI slopes.
    pub fn midpoint(&self) -> f64 {
        (self.start as f64 + self.end as f64) / 2.0
    }
}

/// Spectral diversity statistics for one window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InternalWindow {
    pub bounds: WindowBounds,
    pub effective_rank: f64,
    pub participation_ratio: f64,
    pub variance: f64,
}

/// Lexical drift statistics for one window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExternalWindow {
    pub bounds: WindowBounds,
    /// Divergence from the previous window; `None` for the first window.
    pub delta_i: Option<f64>,
    pub ngram_novelty: f64,
    pub char_entropy: f64,
}

/// Identity and condition labels of a generated sequence.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SequenceMeta {
    pub prompt_id: String,
    pub model_name: String,
    #[serde(default)]
    pub control: bool,
    #[serde(default)]
    pub mode: Option<String>,
}

impl SequenceMeta {
    pub fn new(prompt_id: impl Into<String>, model_name: impl Into<String>) -> Self {
        Self {
            prompt_id: prompt_id.into(),
            model_name: model_name.into(),
            control: false,
            mode: None,
        }
    }

    pub fn with_control(mut self, control: bool) -> Self {
        self.control = control;
        self
    }

    pub fn with_mode(mut self, mode: impl Into<String>) -> Self {
        self.mode = Some(mode.into());
        self
    }

    /// Join key: `(model_name, prompt_id)`.
    pub fn key(&self) -> (&str, &str) {
        (&self.model_name, &self.prompt_id)
    }
}

/// One generated sequence with its internal and external window series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SequenceRecord {
    pub meta: SequenceMeta,
    pub internal: Vec<InternalWindow>,
    /// Empty when no external metrics are available for the sequence.
    #[serde(default)]
    pub external: Vec<ExternalWindow>,
}

impl SequenceRecord {
    pub fn new(meta: SequenceMeta, internal: Vec<InternalWindow>) -> Self {
        Self {
            meta,
            internal,
            external: Vec::new(),
        }
    }

    pub fn with_external(mut self, external: Vec<ExternalWindow>) -> Self {
        self.external = external;
        self
    }

    /// Token count covered by the internal series.
    pub fn n_tokens(&self) -> usize {
        self.internal.iter().map(|w| w.bounds.end).max().unwrap_or(0)
    }

    pub fn effective_ranks(&self) -> Vec<f64> {
        self.internal.iter().map(|w| w.effective_rank).collect()
    }

    /// Check window ordering, the `(window_length, stride)` geometry and,
    /// when an external series is present, index-for-index alignment with
    /// the internal series.
    pub fn validate(&self, window_length: usize, stride: usize) -> Result<(), WindowError> {
        check_monotonic(self.internal.iter().map(|w| w.bounds))?;
        check_geometry(&self.internal, window_length, stride)?;
        if self.external.is_empty() {
            return Ok(());
        }
        if self.external.len() != self.internal.len() {
            return Err(WindowError::SeriesMisaligned {
                index: self.internal.len().min(self.external.len()),
                message: format!(
                    "{} internal windows vs {} external windows",
                    self.internal.len(),
                    self.external.len()
                ),
            });
        }
        for (index, (i, e)) in self.internal.iter().zip(&self.external).enumerate() {
            if i.bounds != e.bounds {
                return Err(WindowError::SeriesMisaligned {
                    index,
                    message: format!(
                        "internal [{}, {}) vs external [{}, {})",
                        i.bounds.start, i.bounds.end, e.bounds.start, e.bounds.end
                    ),
                });
            }
        }
        Ok(())
    }
}

fn check_monotonic(bounds: impl Iterator<Item = WindowBounds>) -> Result<(), WindowError> {
    let mut previous: Option<WindowBounds> = None;
    for (index, b) in bounds.enumerate() {
        if b.end < b.start {
            return Err(WindowError::NonMonotonicWindows { index });
        }
        if let Some(p) = previous {
            if b.start < p.start || b.end < p.end {
                return Err(WindowError::NonMonotonicWindows { index });
            }
        }
        previous = Some(b);
    }
    Ok(())
}

/// Every window spans `window_length` tokens and starts `stride` after its
/// predecessor. A lone window starting at 0 may be shorter.
fn check_geometry(
    internal: &[InternalWindow],
    window_length: usize,
    stride: usize,
) -> Result<(), WindowError> {
    let short_sequence = |b: &WindowBounds| {
        internal.len() == 1 && b.start == 0 && b.len() < window_length
    };
    for (index, window) in internal.iter().enumerate() {
        let b = window.bounds;
        if b.len() != window_length && !short_sequence(&b) {
            return Err(WindowError::IrregularWindows {
                index,
                message: format!(
                    "[{}, {}) spans {} tokens, expected {window_length}",
                    b.start,
                    b.end,
                    b.len()
                ),
            });
        }
        if index > 0 {
            let step = b.start - internal[index - 1].bounds.start;
            if step != stride {
                return Err(WindowError::IrregularWindows {
                    index,
                    message: format!(
                        "starts {step} tokens after window {}, expected stride {stride}",
                        index - 1
                    ),
                });
            }
        }
    }
    Ok(())
}

/// A reasoning-failure entry: either a flag or an occurrence count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FailureValue {
    Flag(bool),
    Count(u64),
}

impl FailureValue {
    pub fn is_failure(&self) -> bool {
        match self {
            Self::Flag(b) => *b,
            Self::Count(n) => *n > 0,
        }
    }
}

/// Downstream task outcome for one sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutcomeLabel {
    pub prompt_id: String,
    pub model_name: String,
    pub qa_failure: bool,
    #[serde(default)]
    pub reasoning_failures: BTreeMap<String, FailureValue>,
}

impl OutcomeLabel {
    pub fn new(prompt_id: impl Into<String>, model_name: impl Into<String>, qa_failure: bool) -> Self {
        Self {
            prompt_id: prompt_id.into(),
            model_name: model_name.into(),
            qa_failure,
            reasoning_failures: BTreeMap::new(),
        }
    }

    pub fn key(&self) -> (&str, &str) {
        (&self.model_name, &self.prompt_id)
    }

    /// Kinds of reasoning failure that were observed.
    pub fn failed_kinds(&self) -> impl Iterator<Item = &str> {
        self.reasoning_failures
            .iter()
            .filter(|(_, v)| v.is_failure())
            .map(|(k, _)| k.as_str())
    }
}
