//! Run-directory I/O errors.

use super::error_code::{self, EciErrorCode};

/// Errors that can occur while reading or writing run-directory tables.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Missing required columns in {table}: {}. Expected: {}", .missing.join(", "), .expected.join(", "))]
    SchemaValidation {
        table: String,
        missing: Vec<String>,
        expected: Vec<String>,
    },

    #[error("{what} not found at {path}")]
    FileNotFound { what: String, path: String },

    #[error("I/O error on {path}: {message}")]
    Io { path: String, message: String },

    #[error("CSV error in {table}: {message}")]
    Csv { table: String, message: String },

    #[error("JSON error in {path}: {message}")]
    Json { path: String, message: String },

    #[error("Invalid value in {table} row {row}, column {column}: {message}")]
    InvalidValue {
        table: String,
        row: usize,
        column: String,
        message: String,
    },

    #[error("No matching rows when joining internal and external tables on prompt_id and model_name")]
    EmptyJoin,
}

impl EciErrorCode for StorageError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::SchemaValidation { .. } => error_code::SCHEMA_VALIDATION,
            _ => error_code::STORAGE_ERROR,
        }
    }
}
