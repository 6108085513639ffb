//! Shared input validation for score/outcome pairs.

use eci_core::errors::EvaluationError;

/// Outcome class sizes of a validated input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassCounts {
    pub positives: usize,
    pub negatives: usize,
}

impl ClassCounts {
    pub fn count(outcomes: &[bool]) -> Self {
        let positives = outcomes.iter().filter(|&&o| o).count();
        Self {
            positives,
            negatives: outcomes.len() - positives,
        }
    }

    pub fn total(&self) -> usize {
        self.positives + self.negatives
    }

    pub fn has_both(&self) -> bool {
        self.positives > 0 && self.negatives > 0
    }
}

/// Check lengths, finiteness and class balance.
pub fn validate_inputs(scores: &[f64], outcomes: &[bool]) -> Result<ClassCounts, EvaluationError> {
    if scores.len() != outcomes.len() {
        return Err(EvaluationError::DimensionMismatch {
            scores: scores.len(),
            outcomes: outcomes.len(),
        });
    }
    if let Some(index) = scores.iter().position(|s| !s.is_finite()) {
        return Err(EvaluationError::NonFiniteScore { index });
    }
    let counts = ClassCounts::count(outcomes);
    if !counts.has_both() {
        return Err(EvaluationError::InsufficientClasses {
            positives: counts.positives,
            negatives: counts.negatives,
        });
    }
    Ok(counts)
}
