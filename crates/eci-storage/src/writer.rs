//! Output writers: `eci_results.csv` and `report.json`.

use std::path::Path;

use serde::Serialize;

use eci_analysis::pipeline::CohortReport;
use eci_core::errors::StorageError;
use eci_core::types::EciResult;

/// Flat CSV row for one sequence.
#[derive(Debug, Serialize)]
struct ResultRow<'a> {
    prompt_id: &'a str,
    model_name: &'a str,
    control: bool,
    mode: &'a str,
    n_windows: usize,
    n_tokens: usize,
    eci_raw: f64,
    early_eci_raw: Option<f64>,
    eci_residualized: f64,
}

impl<'a> From<&'a EciResult> for ResultRow<'a> {
    fn from(result: &'a EciResult) -> Self {
        let meta = &result.estimate.meta;
        Self {
            prompt_id: &meta.prompt_id,
            model_name: &meta.model_name,
            control: meta.control,
            mode: meta.mode.as_deref().unwrap_or(""),
            n_windows: result.estimate.n_windows,
            n_tokens: result.estimate.n_tokens,
            eci_raw: result.estimate.eci_raw,
            early_eci_raw: result.estimate.early_eci_raw,
            eci_residualized: result.eci_residualized,
        }
    }
}

fn io_error(path: &Path, e: impl std::fmt::Display) -> StorageError {
    StorageError::Io {
        path: path.display().to_string(),
        message: e.to_string(),
    }
}

fn ensure_parent(path: &Path) -> Result<(), StorageError> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            std::fs::create_dir_all(parent).map_err(|e| io_error(parent, e))
        }
        _ => Ok(()),
    }
}

/// One row per sequence.
pub fn write_results_csv(path: &Path, results: &[EciResult]) -> Result<(), StorageError> {
    ensure_parent(path)?;
    let csv_error = |e: csv::Error| StorageError::Csv {
        table: path.display().to_string(),
        message: e.to_string(),
    };

    let mut writer = csv::Writer::from_path(path).map_err(csv_error)?;
    for result in results {
        writer.serialize(ResultRow::from(result)).map_err(csv_error)?;
    }
    writer.flush().map_err(|e| io_error(path, e))?;
    tracing::info!(path = %path.display(), rows = results.len(), "wrote ECI results");
    Ok(())
}

pub fn write_report_json(path: &Path, report: &CohortReport) -> Result<(), StorageError> {
    ensure_parent(path)?;
    let json = serde_json::to_string_pretty(report).map_err(|e| StorageError::Json {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    std::fs::write(path, json).map_err(|e| io_error(path, e))?;
    tracing::info!(path = %path.display(), "wrote report");
    Ok(())
}
