//! Tests for the ECI error handling system.

use std::collections::HashSet;

use eci_core::errors::error_code::{self, EciErrorCode};
use eci_core::errors::*;

#[test]
fn test_all_errors_have_error_code() {
    let codes = [
        WindowError::EmptySequence.error_code(),
        WindowError::DegenerateWindow {
            window_start: 0,
            window_end: 128,
        }
        .error_code(),
        EstimationError::InsufficientWindows {
            statistic: "eci_raw",
            required: 2,
            found: 1,
        }
        .error_code(),
        EvaluationError::DimensionMismatch {
            scores: 3,
            outcomes: 4,
        }
        .error_code(),
        EvaluationError::InsufficientClasses {
            positives: 0,
            negatives: 4,
        }
        .error_code(),
        StorageError::EmptyJoin.error_code(),
        ConfigError::FileNotFound { path: "/tmp".into() }.error_code(),
    ];
    for code in codes {
        assert!(!code.is_empty());
    }
    let distinct: HashSet<_> = codes.iter().collect();
    assert!(distinct.len() >= 6);
}

#[test]
fn test_from_conversions_preserve_code() {
    let window = WindowError::DegenerateWindow {
        window_start: 64,
        window_end: 192,
    };
    let pipeline: PipelineError = window.into();
    assert!(matches!(
        pipeline,
        PipelineError::Window(WindowError::DegenerateWindow { .. })
    ));
    assert_eq!(pipeline.error_code(), error_code::DEGENERATE_WINDOW);

    let eval: PipelineError = EvaluationError::InsufficientClasses {
        positives: 0,
        negatives: 10,
    }
    .into();
    assert_eq!(eval.error_code(), error_code::INSUFFICIENT_CLASSES);
}

#[test]
fn test_schema_error_names_missing_columns() {
    let err = StorageError::SchemaValidation {
        table: "metrics_internal.csv".into(),
        missing: vec!["eci_raw".into(), "effective_ranks".into()],
        expected: vec!["prompt_id".into(), "eci_raw".into(), "effective_ranks".into()],
    };
    let msg = err.to_string();
    assert!(msg.contains("eci_raw"));
    assert!(msg.contains("effective_ranks"));
    assert_eq!(
        err.coded_string(),
        format!("[{}] {}", error_code::SCHEMA_VALIDATION, msg)
    );
}

#[test]
fn test_sequence_failure_captures_code() {
    let err = EstimationError::InsufficientWindows {
        statistic: "early_eci_raw",
        required: 2,
        found: 1,
    };
    let failure = SequenceFailure::new("p7", "microsoft/phi-2", &err);
    assert_eq!(failure.code, error_code::INSUFFICIENT_WINDOWS);
    assert!(failure.message.contains("early_eci_raw"));
}
