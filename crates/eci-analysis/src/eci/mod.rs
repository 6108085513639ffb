//! Epistemic Collapse Index: the trend of effective rank over token position.
//!
//! Phase 1 ([`EciEstimator`]) reduces one sequence to slopes. Phase 2
//! ([`Residualizer`]) needs the whole cohort and removes the control
//! condition's systematic component.

pub mod estimator;
pub mod residualize;
pub mod slope;
pub mod summary;

pub use estimator::EciEstimator;
pub use residualize::{ControlFit, ControlSelector, Residualizer};
pub use slope::{ols_fit, LinearFit};
pub use summary::{
    bootstrap_mean_ci, classify_collapse, collapse_fraction, summarize, summarize_by_model,
    EciSummary,
};
