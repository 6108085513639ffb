//! Cohort-level evaluation errors. All of these are fatal.

use super::error_code::{self, EciErrorCode};

/// Errors raised by the evaluation engine.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EvaluationError {
    #[error("Dimension mismatch: {scores} scores vs {outcomes} outcomes")]
    DimensionMismatch { scores: usize, outcomes: usize },

    #[error("Insufficient classes: {positives} positives, {negatives} negatives")]
    InsufficientClasses { positives: usize, negatives: usize },

    #[error("Non-finite score at index {index}")]
    NonFiniteScore { index: usize },

    #[error("Probability out of [0, 1] at index {index}: {value}")]
    ProbabilityOutOfRange { index: usize, value: f64 },

    #[error(
        "Too many degenerate bootstrap resamples for {statistic}: \
         {dropped} of {iterations} dropped (max fraction {max_fraction})"
    )]
    TooManyDegenerateResamples {
        statistic: &'static str,
        dropped: usize,
        iterations: usize,
        max_fraction: f64,
    },

    #[error("Invalid parameter {name}: {message}")]
    InvalidParameter { name: &'static str, message: String },
}

impl EciErrorCode for EvaluationError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::DimensionMismatch { .. } => error_code::DIMENSION_MISMATCH,
            Self::InsufficientClasses { .. } => error_code::INSUFFICIENT_CLASSES,
            Self::NonFiniteScore { .. } | Self::ProbabilityOutOfRange { .. } => {
                error_code::INVALID_SCORE
            }
            Self::TooManyDegenerateResamples { .. } => error_code::DEGENERATE_BOOTSTRAP,
            Self::InvalidParameter { .. } => error_code::INVALID_PARAMETER,
        }
    }
}
