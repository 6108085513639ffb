//! Pipeline errors and per-sequence failure records.

use serde::Serialize;

use super::error_code::{self, EciErrorCode};
use super::{ConfigError, EstimationError, EvaluationError, StorageError, WindowError};

/// Errors that can occur during a cohort run.
/// Aggregates subsystem errors via `From` conversions.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("Window error: {0}")]
    Window(#[from] WindowError),

    #[error("Estimation error: {0}")]
    Estimation(#[from] EstimationError),

    #[error("Evaluation error: {0}")]
    Evaluation(#[from] EvaluationError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("{excluded} of {total} sequences excluded, above the maximum fraction {max_fraction}")]
    ExcessiveExclusions {
        excluded: usize,
        total: usize,
        max_fraction: f64,
    },
}

impl EciErrorCode for PipelineError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Window(e) => e.error_code(),
            Self::Estimation(e) => e.error_code(),
            Self::Evaluation(e) => e.error_code(),
            Self::Storage(e) => e.error_code(),
            Self::Config(e) => e.error_code(),
            Self::ExcessiveExclusions { .. } => error_code::EXCESSIVE_EXCLUSIONS,
        }
    }
}

/// A sequence excluded from cohort aggregation, with the reason.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SequenceFailure {
    pub prompt_id: String,
    pub model_name: String,
    pub code: &'static str,
    pub message: String,
}

impl SequenceFailure {
    pub fn new<E>(prompt_id: &str, model_name: &str, error: &E) -> Self
    where
        E: EciErrorCode + std::fmt::Display,
    {
        Self {
            prompt_id: prompt_id.to_string(),
            model_name: model_name.to_string(),
            code: error.error_code(),
            message: error.to_string(),
        }
    }
}
