//! Shared constants for the ECI analysis workspace.

/// ECI version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// ---- Windowing ----

/// Default sliding-window length in tokens.
pub const DEFAULT_WINDOW_LENGTH: usize = 128;

/// Default sliding-window stride in tokens.
pub const DEFAULT_STRIDE: usize = 64;

/// Spectral mass at or below this is treated as a zero spectrum.
pub const SPECTRUM_EPSILON: f64 = 1e-12;

// ---- Text drift ----

/// Default n-gram order for divergence and novelty.
pub const DEFAULT_NGRAM_ORDER: usize = 3;

/// Default window size (in tokens) for repetition detection.
pub const DEFAULT_REPETITION_WINDOW: usize = 50;

/// Default Jaccard overlap above which two windows count as repeated.
pub const DEFAULT_REPETITION_THRESHOLD: f64 = 0.8;

// ---- ECI ----

/// Default early-window cutoff in tokens for `early_eci_raw`.
pub const DEFAULT_EARLY_CUTOFF: usize = 256;

/// ECI below this value is classified as collapse.
pub const ECI_COLLAPSE_THRESHOLD: f64 = -0.02;

// ---- Evaluation ----

/// Default random seed for bootstrap and subsampling.
pub const DEFAULT_SEED: u64 = 42;

/// Default number of bootstrap resamples.
pub const BOOTSTRAP_N_RESAMPLES: usize = 1000;

/// Default confidence level for percentile intervals.
pub const DEFAULT_CONFIDENCE_LEVEL: f64 = 0.95;

/// Default maximum fraction of single-class resamples before a bootstrap fails.
pub const DEFAULT_MAX_DEGENERATE_FRACTION: f64 = 0.05;

/// Default number of calibration bins.
pub const CALIBRATION_N_BINS: usize = 10;

/// Default slope applied before the sigmoid that maps failure scores to probabilities.
pub const DEFAULT_SIGMOID_SCALE: f64 = 10.0;

// ---- Pipeline ----

/// Default maximum fraction of sequences excluded by per-sequence failures.
pub const DEFAULT_MAX_EXCLUDED_FRACTION: f64 = 0.10;

/// Default smoke-test subsample fraction.
pub const DEFAULT_SMOKE_FRACTION: f64 = 0.05;

/// Default smoke-test minimum row count.
pub const DEFAULT_SMOKE_MIN_ROWS: usize = 30;

// ---- Run directory layout ----

/// Internal metrics table file name.
pub const INTERNAL_TABLE_FILE: &str = "metrics_internal.csv";

/// External metrics table file name.
pub const EXTERNAL_TABLE_FILE: &str = "metrics_external.csv";

/// Run manifest file name.
pub const MANIFEST_FILE: &str = "manifest.json";

/// Project config file name, looked up in the run directory.
pub const PROJECT_CONFIG_FILE: &str = "eci.toml";

/// Per-sequence ECI output file name.
pub const ECI_RESULTS_FILE: &str = "eci_results.csv";

/// Evaluation report output file name.
pub const REPORT_FILE: &str = "report.json";
