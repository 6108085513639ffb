//! Sliding-window configuration shared by the spectral and text metrics.

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_STRIDE, DEFAULT_WINDOW_LENGTH};

/// Window length and stride. One value feeds both metric families so the
/// internal and external series always share boundaries.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct WindowingConfig {
    /// Window length in tokens. Default: 128.
    pub window_length: Option<usize>,
    /// Stride between window starts in tokens. Default: 64.
    pub stride: Option<usize>,
}

impl WindowingConfig {
    pub fn effective_window_length(&self) -> usize {
        self.window_length.unwrap_or(DEFAULT_WINDOW_LENGTH)
    }

    pub fn effective_stride(&self) -> usize {
        self.stride.unwrap_or(DEFAULT_STRIDE)
    }
}
