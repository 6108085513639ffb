//! Record types shared by the analysis and storage crates.

pub mod collections;
pub mod eci;
pub mod manifest;
pub mod records;

pub use eci::{EciEstimate, EciResult};
pub use manifest::{ModelStatus, RunManifest};
pub use records::{
    ExternalWindow, FailureValue, InternalWindow, OutcomeLabel, SequenceMeta, SequenceRecord,
    WindowBounds,
};
