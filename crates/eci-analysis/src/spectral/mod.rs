//! Spectral window metrics: per-window diversity statistics of a hidden-state
//! trajectory (effective rank, participation ratio, variance).
//!
//! Pure per-sequence computation; cohorts parallelize over sequences.

pub mod metrics;
pub mod trajectory;
pub mod windows;

pub use metrics::{effective_rank, participation_ratio};
pub use trajectory::{summarize_trajectory, TrajectorySummary};
pub use windows::{compute_internal_series, window_metrics, HiddenStates};
