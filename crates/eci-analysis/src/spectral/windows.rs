//! Windowed spectral metrics over a hidden-state matrix.

use nalgebra::DMatrix;

use eci_core::errors::WindowError;
use eci_core::types::{InternalWindow, WindowBounds};

use super::metrics::{effective_rank, participation_ratio};
use crate::windowing::WindowSpec;

/// Per-token hidden states of one sequence: `tokens x hidden_dim`.
#[derive(Debug, Clone, PartialEq)]
pub struct HiddenStates {
    matrix: DMatrix<f64>,
}

impl HiddenStates {
    pub fn new(matrix: DMatrix<f64>) -> Result<Self, WindowError> {
        if matrix.nrows() == 0 {
            return Err(WindowError::EmptySequence);
        }
        if matrix.ncols() == 0 {
            return Err(WindowError::InvalidShape {
                message: "hidden dimension is 0".to_string(),
            });
        }
        if let Some(pos) = matrix.iter().position(|v| !v.is_finite()) {
            // nalgebra storage is column-major
            return Err(WindowError::InvalidShape {
                message: format!(
                    "non-finite activation at token {}, dimension {}",
                    pos % matrix.nrows(),
                    pos / matrix.nrows()
                ),
            });
        }
        Ok(Self { matrix })
    }

    /// Build from a row-major buffer of `n_tokens * hidden_dim` values.
    pub fn from_row_major(
        n_tokens: usize,
        hidden_dim: usize,
        data: &[f64],
    ) -> Result<Self, WindowError> {
        if data.len() != n_tokens * hidden_dim {
            return Err(WindowError::LengthMismatch {
                field: "hidden_states".to_string(),
                expected: n_tokens * hidden_dim,
                actual: data.len(),
            });
        }
        Self::new(DMatrix::from_row_slice(n_tokens, hidden_dim, data))
    }

    /// Build from one vector per token.
    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self, WindowError> {
        let hidden_dim = rows.first().map_or(0, Vec::len);
        if let Some((i, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != hidden_dim) {
            return Err(WindowError::LengthMismatch {
                field: format!("hidden_states[{i}]"),
                expected: hidden_dim,
                actual: row.len(),
            });
        }
        let flat: Vec<f64> = rows.iter().flatten().copied().collect();
        Self::from_row_major(rows.len(), hidden_dim, &flat)
    }

    pub fn n_tokens(&self) -> usize {
        self.matrix.nrows()
    }

    pub fn hidden_dim(&self) -> usize {
        self.matrix.ncols()
    }

    pub fn matrix(&self) -> &DMatrix<f64> {
        &self.matrix
    }
}

/// Metrics for one window sub-matrix (`tokens x hidden_dim`).
pub fn window_metrics(
    window: &DMatrix<f64>,
    bounds: WindowBounds,
) -> Result<InternalWindow, WindowError> {
    let singular_values: Vec<f64> = window.singular_values().iter().copied().collect();

    let participation_ratio =
        participation_ratio(&singular_values).ok_or(WindowError::DegenerateWindow {
            window_start: bounds.start,
            window_end: bounds.end,
        })?;

    let variance = (0..window.ncols())
        .map(|j| window.column(j).variance())
        .sum::<f64>()
        / window.ncols() as f64;

    Ok(InternalWindow {
        bounds,
        effective_rank: effective_rank(&singular_values),
        participation_ratio,
        variance,
    })
}

/// Internal window series of one sequence.
///
/// Fails on the first degenerate window; the caller excludes the sequence.
pub fn compute_internal_series(
    states: &HiddenStates,
    spec: &WindowSpec,
) -> Result<Vec<InternalWindow>, WindowError> {
    spec.plan(states.n_tokens())?
        .into_iter()
        .map(|bounds| {
            let window = states.matrix.rows(bounds.start, bounds.len()).clone_owned();
            window_metrics(&window, bounds)
        })
        .collect()
}
