//! Cohort pipeline: per-sequence phase 1 on the rayon pool, then the
//! cohort-wide residualization and evaluation barrier.

pub mod cohort;
pub mod process;
pub mod report;

pub use cohort::{CohortPipeline, PhaseOne};
pub use process::{ProcessedSequence, RawSequence, SequenceProcessor};
pub use report::{CohortReport, PredictionReport, SequenceFeatures, SequenceKey};
