//! Core types, errors, configuration, constants, and tracing for the ECI
//! analysis workspace.
//!
//! Every other crate in the workspace depends on this one; it has no
//! numerical code of its own.

pub mod config;
pub mod constants;
pub mod errors;
pub mod tracing;
pub mod types;
