//! ECI estimation errors.

use super::error_code::{self, EciErrorCode};

/// Errors raised by the per-sequence slope estimator.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EstimationError {
    /// A slope needs at least two windows with distinct midpoints.
    #[error("Insufficient windows for {statistic}: need {required}, found {found}")]
    InsufficientWindows {
        statistic: &'static str,
        required: usize,
        found: usize,
    },
}

impl EciErrorCode for EstimationError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::InsufficientWindows { .. } => error_code::INSUFFICIENT_WINDOWS,
        }
    }
}
