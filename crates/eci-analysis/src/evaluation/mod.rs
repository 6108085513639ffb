//! Evaluation engine: how well failure scores predict a binary outcome.
//!
//! Every statistic validates its inputs up front; all failures here are
//! cohort-level and fatal.

pub mod bootstrap;
pub mod calibration;
pub mod precision_recall;
pub mod roc;
pub mod scores;
pub mod types;
pub mod validate;

pub use bootstrap::{
    bootstrap_average_precision, bootstrap_calibration_error, bootstrap_roc_auc,
    bootstrap_statistic, percentile, resample_indices, BootstrapSpec,
};
pub use calibration::{brier_score, calibration_curve, CalibrationSpec};
pub use precision_recall::{average_precision, pr_curve};
pub use roc::{roc_auc, roc_curve};
pub use scores::{sigmoid, ScoreTransform};
pub use types::{
    BootstrapResult, CalibrationBin, CalibrationCurve, ConfidenceInterval, PrCurve, PrPoint,
    RocCurve, RocPoint,
};
pub use validate::{validate_inputs, ClassCounts};
