//! Error handling for the ECI workspace.
//! One error enum per subsystem, `thiserror` only.

pub mod config_error;
pub mod error_code;
pub mod estimation_error;
pub mod evaluation_error;
pub mod pipeline_error;
pub mod storage_error;
pub mod window_error;

pub use config_error::ConfigError;
pub use error_code::EciErrorCode;
pub use estimation_error::EstimationError;
pub use evaluation_error::EvaluationError;
pub use pipeline_error::{PipelineError, SequenceFailure};
pub use storage_error::StorageError;
pub use window_error::WindowError;
