//! Sliding-window planning shared by the spectral and text metrics.
//!
//! Windows start at `0, S, 2S, ...` and are kept while `start + L <= T`, so a
//! trailing partial window is dropped. A sequence shorter than `L` yields a
//! single window covering all of it.

use serde::Serialize;

use eci_core::config::WindowingConfig;
use eci_core::constants::{DEFAULT_STRIDE, DEFAULT_WINDOW_LENGTH};
use eci_core::errors::WindowError;
use eci_core::types::WindowBounds;

/// Window length `L` and stride `S`, both in tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WindowSpec {
    length: usize,
    stride: usize,
}

impl WindowSpec {
    pub fn new(length: usize, stride: usize) -> Result<Self, WindowError> {
        if length == 0 || stride == 0 {
            return Err(WindowError::InvalidShape {
                message: format!("window length {length} and stride {stride} must be positive"),
            });
        }
        Ok(Self { length, stride })
    }

    pub fn from_config(config: &WindowingConfig) -> Result<Self, WindowError> {
        Self::new(config.effective_window_length(), config.effective_stride())
    }

    pub fn length(&self) -> usize {
        self.length
    }

    pub fn stride(&self) -> usize {
        self.stride
    }

    /// `floor((T - L) / S) + 1` for `T >= L`, 1 for `0 < T < L`, 0 for `T = 0`.
    pub fn window_count(&self, n_tokens: usize) -> usize {
        match n_tokens {
            0 => 0,
            t if t < self.length => 1,
            t => (t - self.length) / self.stride + 1,
        }
    }

    /// Boundaries of every window over a sequence of `n_tokens` tokens.
    pub fn plan(&self, n_tokens: usize) -> Result<Vec<WindowBounds>, WindowError> {
        if n_tokens == 0 {
            return Err(WindowError::EmptySequence);
        }
        if n_tokens < self.length {
            return Ok(vec![WindowBounds::new(0, n_tokens)]);
        }
        Ok((0..self.window_count(n_tokens))
            .map(|i| {
                let start = i * self.stride;
                WindowBounds::new(start, start + self.length)
            })
            .collect())
    }

    /// Boundaries implied for a stored series of `n_windows` windows when the
    /// table carries no explicit bounds.
    pub fn implied_bounds(&self, n_windows: usize) -> Vec<WindowBounds> {
        (0..n_windows)
            .map(|i| {
                let start = i * self.stride;
                WindowBounds::new(start, start + self.length)
            })
            .collect()
    }
}

impl Default for WindowSpec {
    fn default() -> Self {
        Self {
            length: DEFAULT_WINDOW_LENGTH,
            stride: DEFAULT_STRIDE,
        }
    }
}
