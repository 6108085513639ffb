//! Analysis engine for the Epistemic Collapse Index.
//!
//! Leaf-first: [`windowing`] plans token windows, [`spectral`] and [`text`]
//! turn one sequence into aligned window series, [`eci`] reduces a series to
//! trend slopes and residualizes them across a cohort, [`evaluation`] scores
//! those slopes against failure outcomes, and [`pipeline`] runs the phases
//! in order over a cohort.

pub mod eci;
pub mod evaluation;
pub mod pipeline;
pub mod spectral;
pub mod text;
pub mod windowing;

pub use windowing::WindowSpec;
