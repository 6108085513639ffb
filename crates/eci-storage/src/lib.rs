//! Run-directory persistence for the ECI workspace.
//!
//! A run directory holds `metrics_internal.csv`, `metrics_external.csv` and
//! `manifest.json`. This crate validates and parses them into records,
//! joins the two tables, and writes `eci_results.csv` and `report.json`.

pub mod join;
pub mod literal;
pub mod manifest;
pub mod run_dir;
pub mod schema;
pub mod subsample;
pub mod tables;
pub mod writer;

pub use join::{join_tables, JoinedCohort};
pub use manifest::load_manifest;
pub use run_dir::RunDirectory;
pub use subsample::SmokeSample;
pub use tables::{read_external_table, read_internal_table, ExternalRow, InternalRow, RecordedEci};
pub use writer::{write_report_json, write_results_csv};
