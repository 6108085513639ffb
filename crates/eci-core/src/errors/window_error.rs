//! Per-sequence windowing and window-metric errors.

use super::error_code::{self, EciErrorCode};

/// Errors raised while windowing a single sequence or computing its
/// per-window metrics. These are never fatal to a cohort run on their own.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum WindowError {
    #[error("Sequence has no tokens")]
    EmptySequence,

    #[error("Invalid shape: {message}")]
    InvalidShape { message: String },

    #[error("Degenerate window [{window_start}, {window_end}): spectrum has zero energy")]
    DegenerateWindow {
        window_start: usize,
        window_end: usize,
    },

    #[error("Internal and external series misaligned at window {index}: {message}")]
    SeriesMisaligned { index: usize, message: String },

    #[error("Window bounds not non-decreasing at window {index}")]
    NonMonotonicWindows { index: usize },

    #[error("Irregular window {index}: {message}")]
    IrregularWindows { index: usize, message: String },

    #[error("Length mismatch for {field}: expected {expected}, got {actual}")]
    LengthMismatch {
        field: String,
        expected: usize,
        actual: usize,
    },
}

impl EciErrorCode for WindowError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::EmptySequence => error_code::EMPTY_SEQUENCE,
            Self::InvalidShape { .. } | Self::LengthMismatch { .. } => error_code::INVALID_SHAPE,
            Self::DegenerateWindow { .. } => error_code::DEGENERATE_WINDOW,
            Self::SeriesMisaligned { .. } | Self::NonMonotonicWindows { .. } => {
                error_code::SERIES_MISALIGNED
            }
            Self::IrregularWindows { .. } => error_code::IRREGULAR_WINDOWS,
        }
    }
}
