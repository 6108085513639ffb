//! Readers for `metrics_internal.csv` and `metrics_external.csv`.

use std::io::Read;
use std::path::Path;

use csv::StringRecord;
use serde::Serialize;

use eci_analysis::WindowSpec;
use eci_core::errors::StorageError;
use eci_core::types::collections::FxHashSet;
use eci_core::types::{InternalWindow, OutcomeLabel, SequenceMeta, WindowBounds};

use crate::literal::{parse_bool, parse_list, parse_map};
use crate::schema::{ColumnIndex, EXTERNAL_REQUIRED, INTERNAL_REQUIRED};

/// ECI values as stored in the internal table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RecordedEci {
    pub eci_raw: f64,
    pub eci_residualized: f64,
    pub early_eci_raw: f64,
}

/// One parsed row of the internal table.
#[derive(Debug, Clone, PartialEq)]
pub struct InternalRow {
    pub meta: SequenceMeta,
    pub recorded: RecordedEci,
    pub internal: Vec<InternalWindow>,
}

/// One parsed row of the external table. The window lists carry no bounds
/// of their own; they take them from the matching internal row.
#[derive(Debug, Clone, PartialEq)]
pub struct ExternalRow {
    pub label: OutcomeLabel,
    pub delta_i: Vec<Option<f64>>,
    pub ngram_novelty: Vec<f64>,
    pub char_entropy: Vec<f64>,
}

impl ExternalRow {
    pub fn has_series(&self) -> bool {
        !(self.delta_i.is_empty() && self.ngram_novelty.is_empty() && self.char_entropy.is_empty())
    }
}

/// Row-level parsing context for error reporting.
struct Cells<'a> {
    index: &'a ColumnIndex,
    record: &'a StringRecord,
    row: usize,
}

impl Cells<'_> {
    fn invalid(&self, column: &str, message: impl Into<String>) -> StorageError {
        StorageError::InvalidValue {
            table: self.index.table().to_string(),
            row: self.row,
            column: column.to_string(),
            message: message.into(),
        }
    }

    fn text(&self, column: &str) -> Result<&str, StorageError> {
        match self.index.get(self.record, column) {
            Some(cell) if !cell.is_empty() => Ok(cell),
            _ => Err(self.invalid(column, "empty cell")),
        }
    }

    fn optional(&self, column: &str) -> Option<&str> {
        self.index.get(self.record, column).filter(|cell| !cell.is_empty())
    }

    fn float(&self, column: &str) -> Result<f64, StorageError> {
        let cell = self.text(column)?;
        cell.parse::<f64>()
            .map_err(|e| self.invalid(column, format!("{cell:?}: {e}")))
    }

    fn bool(&self, column: &str) -> Result<bool, StorageError> {
        parse_bool(self.text(column)?).map_err(|e| self.invalid(column, e))
    }

    fn list<T: serde::de::DeserializeOwned>(&self, column: &str) -> Result<Vec<T>, StorageError> {
        match self.index.get(self.record, column) {
            Some(cell) => parse_list(cell).map_err(|e| self.invalid(column, e)),
            None => Ok(Vec::new()),
        }
    }
}

fn csv_error(table: &str, e: csv::Error) -> StorageError {
    StorageError::Csv {
        table: table.to_string(),
        message: e.to_string(),
    }
}

fn open(path: &Path, what: &str) -> Result<std::fs::File, StorageError> {
    if !path.exists() {
        return Err(StorageError::FileNotFound {
            what: what.to_string(),
            path: path.display().to_string(),
        });
    }
    std::fs::File::open(path).map_err(|e| StorageError::Io {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}

fn table_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Read the internal table at `path`. Missing window bounds are rebuilt
/// from `windows`.
pub fn read_internal_table(path: &Path, windows: &WindowSpec) -> Result<Vec<InternalRow>, StorageError> {
    let file = open(path, "internal metrics table")?;
    read_internal(file, &table_name(path), windows)
}

pub fn read_internal<R: Read>(
    reader: R,
    table: &str,
    windows: &WindowSpec,
) -> Result<Vec<InternalRow>, StorageError> {
    let mut csv = csv::ReaderBuilder::new().from_reader(reader);
    let headers = csv.headers().map_err(|e| csv_error(table, e))?.clone();
    let index = ColumnIndex::validate(table, &headers, INTERNAL_REQUIRED)?;

    let mut seen = FxHashSet::default();
    let mut rows = Vec::new();
    for (i, record) in csv.records().enumerate() {
        let record = record.map_err(|e| csv_error(table, e))?;
        let cells = Cells {
            index: &index,
            record: &record,
            row: i + 1,
        };
        let row = internal_row(&cells, windows)?;
        if !seen.insert((row.meta.model_name.clone(), row.meta.prompt_id.clone())) {
            return Err(cells.invalid("prompt_id", "duplicate (model_name, prompt_id)"));
        }
        rows.push(row);
    }
    tracing::info!(table, rows = rows.len(), "read internal metrics");
    Ok(rows)
}

fn internal_row(cells: &Cells<'_>, windows: &WindowSpec) -> Result<InternalRow, StorageError> {
    let mut meta = SequenceMeta::new(cells.text("prompt_id")?, cells.text("model_name")?);
    if cells.optional("control").is_some() {
        meta.control = cells.bool("control")?;
    }
    meta.mode = cells.optional("mode").map(str::to_string);

    let recorded = RecordedEci {
        eci_raw: cells.float("eci_raw")?,
        eci_residualized: cells.float("eci_residualized")?,
        early_eci_raw: cells.float("early_eci_raw")?,
    };

    let ranks: Vec<f64> = cells.list("effective_ranks")?;
    let n = ranks.len();
    let participation = optional_series(cells, "participation_ratios", n)?;
    let variances = optional_series(cells, "variances", n)?;
    let bounds = window_bounds(cells, windows, n)?;

    let internal = (0..n)
        .map(|w| InternalWindow {
            bounds: bounds[w],
            effective_rank: ranks[w],
            participation_ratio: participation[w],
            variance: variances[w],
        })
        .collect();

    Ok(InternalRow {
        meta,
        recorded,
        internal,
    })
}

/// A per-window list of length `n`, or NaN throughout when not recorded.
fn optional_series(cells: &Cells<'_>, column: &str, n: usize) -> Result<Vec<f64>, StorageError> {
    let values: Vec<f64> = cells.list(column)?;
    match values.len() {
        0 => Ok(vec![f64::NAN; n]),
        len if len == n => Ok(values),
        len => Err(cells.invalid(column, format!("{len} values for {n} windows"))),
    }
}

fn window_bounds(
    cells: &Cells<'_>,
    windows: &WindowSpec,
    n: usize,
) -> Result<Vec<WindowBounds>, StorageError> {
    let starts: Vec<usize> = cells.list("window_starts")?;
    let ends: Vec<usize> = cells.list("window_ends")?;
    if starts.is_empty() && ends.is_empty() {
        return Ok(windows.implied_bounds(n));
    }
    if starts.len() != n || ends.len() != n {
        return Err(cells.invalid(
            "window_starts",
            format!(
                "{} starts and {} ends for {n} windows",
                starts.len(),
                ends.len()
            ),
        ));
    }
    Ok(starts
        .into_iter()
        .zip(ends)
        .map(|(start, end)| WindowBounds::new(start, end))
        .collect())
}

pub fn read_external_table(path: &Path) -> Result<Vec<ExternalRow>, StorageError> {
    let file = open(path, "external metrics table")?;
    read_external(file, &table_name(path))
}

pub fn read_external<R: Read>(reader: R, table: &str) -> Result<Vec<ExternalRow>, StorageError> {
    let mut csv = csv::ReaderBuilder::new().from_reader(reader);
    let headers = csv.headers().map_err(|e| csv_error(table, e))?.clone();
    let index = ColumnIndex::validate(table, &headers, EXTERNAL_REQUIRED)?;

    let mut seen = FxHashSet::default();
    let mut rows = Vec::new();
    for (i, record) in csv.records().enumerate() {
        let record = record.map_err(|e| csv_error(table, e))?;
        let cells = Cells {
            index: &index,
            record: &record,
            row: i + 1,
        };
        let row = external_row(&cells)?;
        if !seen.insert((row.label.model_name.clone(), row.label.prompt_id.clone())) {
            return Err(cells.invalid("prompt_id", "duplicate (model_name, prompt_id)"));
        }
        rows.push(row);
    }
    tracing::info!(table, rows = rows.len(), "read external metrics");
    Ok(rows)
}

fn external_row(cells: &Cells<'_>) -> Result<ExternalRow, StorageError> {
    let mut label = OutcomeLabel::new(
        cells.text("prompt_id")?,
        cells.text("model_name")?,
        cells.bool("qa_failure")?,
    );
    if let Some(cell) = cells.optional("reasoning_failures") {
        label.reasoning_failures =
            parse_map(cell).map_err(|e| cells.invalid("reasoning_failures", e))?;
    }

    Ok(ExternalRow {
        label,
        delta_i: cells.list("delta_i_values")?,
        ngram_novelty: cells.list("ngram_novelty_values")?,
        char_entropy: cells.list("char_entropy_values")?,
    })
}
