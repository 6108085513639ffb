//! EciErrorCode trait for structured error reporting.

/// Every error enum implements this to expose a stable code string that
/// report consumers can match on without parsing messages.
pub trait EciErrorCode {
    /// Returns the error code string (e.g., "DEGENERATE_WINDOW").
    fn error_code(&self) -> &'static str;

    /// Returns the formatted string: `[ERROR_CODE] message`.
    fn coded_string(&self) -> String
    where
        Self: std::fmt::Display,
    {
        format!("[{}] {}", self.error_code(), self)
    }
}

pub const EMPTY_SEQUENCE: &str = "EMPTY_SEQUENCE";
pub const INVALID_SHAPE: &str = "INVALID_SHAPE";
pub const DEGENERATE_WINDOW: &str = "DEGENERATE_WINDOW";
pub const SERIES_MISALIGNED: &str = "SERIES_MISALIGNED";
pub const IRREGULAR_WINDOWS: &str = "IRREGULAR_WINDOWS";
pub const INSUFFICIENT_WINDOWS: &str = "INSUFFICIENT_WINDOWS";
pub const DIMENSION_MISMATCH: &str = "DIMENSION_MISMATCH";
pub const INSUFFICIENT_CLASSES: &str = "INSUFFICIENT_CLASSES";
pub const INVALID_SCORE: &str = "INVALID_SCORE";
pub const DEGENERATE_BOOTSTRAP: &str = "DEGENERATE_BOOTSTRAP";
pub const INVALID_PARAMETER: &str = "INVALID_PARAMETER";
pub const SCHEMA_VALIDATION: &str = "SCHEMA_VALIDATION";
pub const STORAGE_ERROR: &str = "STORAGE_ERROR";
pub const CONFIG_ERROR: &str = "CONFIG_ERROR";
pub const EXCESSIVE_EXCLUSIONS: &str = "EXCESSIVE_EXCLUSIONS";
