//! Top-level ECI configuration with layered resolution.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::{EstimatorConfig, EvaluationConfig, PipelineConfig, TextConfig, WindowingConfig};
use crate::constants::PROJECT_CONFIG_FILE;
use crate::errors::ConfigError;
use crate::types::RunManifest;

/// Top-level configuration aggregating all sub-configs.
///
/// Resolution order (highest priority first):
/// 1. CLI flags (applied via `apply_cli_overrides`)
/// 2. Environment variables (`ECI_*`)
/// 3. Project config (`eci.toml` in the run directory)
/// 4. User config (`~/.eci/config.toml`)
/// 5. Run manifest (seed, window length, stride)
/// 6. Compiled defaults
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct EciConfig {
    pub windowing: WindowingConfig,
    pub text: TextConfig,
    pub estimator: EstimatorConfig,
    pub evaluation: EvaluationConfig,
    pub pipeline: PipelineConfig,
}

/// CLI override arguments that can be applied to a config.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub seed: Option<u64>,
    pub bootstrap_iterations: Option<usize>,
    pub window_length: Option<usize>,
    pub stride: Option<usize>,
    pub threads: Option<usize>,
}

impl EciConfig {
    /// Load configuration with layered resolution for the run rooted at `root`.
    pub fn load(
        root: &Path,
        manifest: Option<&RunManifest>,
        cli_overrides: Option<&CliOverrides>,
    ) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        // Layer 5 (lowest priority above defaults): run manifest
        if let Some(manifest) = manifest {
            Self::apply_manifest(&mut config, manifest);
        }

        // Layer 4: user config
        if let Some(user_config_path) = user_config_path() {
            if user_config_path.exists() {
                match Self::merge_toml_file(&mut config, &user_config_path) {
                    Ok(()) => {}
                    Err(e @ ConfigError::ParseError { .. }) => return Err(e),
                    Err(e) => {
                        tracing::warn!(error = %e, "ignoring unreadable user config");
                    }
                }
            }
        }

        // Layer 3: project config
        let project_config_path = root.join(PROJECT_CONFIG_FILE);
        if project_config_path.exists() {
            Self::merge_toml_file(&mut config, &project_config_path)?;
        }

        // Layer 2: environment variables
        Self::apply_env_overrides(&mut config);

        // Layer 1 (highest priority): CLI flags
        if let Some(cli) = cli_overrides {
            Self::apply_cli_overrides(&mut config, cli);
        }

        Self::validate(&config)?;

        Ok(config)
    }

    /// Load configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(toml_str).map_err(|e| ConfigError::ParseError {
            path: "<string>".to_string(),
            message: e.to_string(),
        })?;
        Self::validate(&config)?;
        Ok(config)
    }

    /// Validate the configuration values.
    pub fn validate(config: &EciConfig) -> Result<(), ConfigError> {
        fn positive(field: &str, value: Option<usize>) -> Result<(), ConfigError> {
            match value {
                Some(0) => Err(ConfigError::ValidationFailed {
                    field: field.to_string(),
                    message: "must be greater than 0".to_string(),
                }),
                _ => Ok(()),
            }
        }
        fn fraction(field: &str, value: Option<f64>) -> Result<(), ConfigError> {
            match value {
                Some(v) if !(0.0..=1.0).contains(&v) => Err(ConfigError::ValidationFailed {
                    field: field.to_string(),
                    message: "must be between 0.0 and 1.0".to_string(),
                }),
                _ => Ok(()),
            }
        }

        positive("windowing.window_length", config.windowing.window_length)?;
        positive("windowing.stride", config.windowing.stride)?;
        positive("text.ngram_order", config.text.ngram_order)?;
        positive("text.repetition_window", config.text.repetition_window)?;
        fraction("text.repetition_threshold", config.text.repetition_threshold)?;
        positive(
            "evaluation.bootstrap_iterations",
            config.evaluation.bootstrap_iterations,
        )?;
        positive("evaluation.calibration_bins", config.evaluation.calibration_bins)?;
        fraction(
            "evaluation.max_degenerate_fraction",
            config.evaluation.max_degenerate_fraction,
        )?;
        fraction(
            "pipeline.max_excluded_fraction",
            config.pipeline.max_excluded_fraction,
        )?;
        fraction("pipeline.smoke_fraction", config.pipeline.smoke_fraction)?;

        if let Some(level) = config.evaluation.confidence_level {
            if !(level > 0.0 && level < 1.0) {
                return Err(ConfigError::ValidationFailed {
                    field: "evaluation.confidence_level".to_string(),
                    message: "must be strictly between 0.0 and 1.0".to_string(),
                });
            }
        }
        if let Some(scale) = config.evaluation.sigmoid_scale {
            if !scale.is_finite() || scale <= 0.0 {
                return Err(ConfigError::ValidationFailed {
                    field: "evaluation.sigmoid_scale".to_string(),
                    message: "must be a positive finite number".to_string(),
                });
            }
        }
        let control = &config.estimator.control;
        if control.model.is_some() && control.mode.is_some() {
            return Err(ConfigError::ValidationFailed {
                field: "estimator.control".to_string(),
                message: "set at most one of model and mode".to_string(),
            });
        }
        Ok(())
    }

    /// Merge a TOML file into the existing config.
    /// Unknown keys are silently ignored.
    fn merge_toml_file(config: &mut EciConfig, path: &Path) -> Result<(), ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
            path: path.display().to_string(),
        })?;

        let file_config: EciConfig =
            toml::from_str(&content).map_err(|e| ConfigError::ParseError {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;

        Self::merge(config, &file_config);
        Ok(())
    }

    /// Merge `other` into `base`; `other` wins wherever it has a value.
    fn merge(base: &mut EciConfig, other: &EciConfig) {
        // Windowing
        overlay(&mut base.windowing.window_length, &other.windowing.window_length);
        overlay(&mut base.windowing.stride, &other.windowing.stride);

        // Text
        overlay(&mut base.text.ngram_order, &other.text.ngram_order);
        overlay(&mut base.text.repetition_window, &other.text.repetition_window);
        overlay(
            &mut base.text.repetition_threshold,
            &other.text.repetition_threshold,
        );

        // Estimator
        overlay(&mut base.estimator.early_cutoff, &other.estimator.early_cutoff);
        overlay(
            &mut base.estimator.collapse_threshold,
            &other.estimator.collapse_threshold,
        );
        overlay(
            &mut base.estimator.residualization,
            &other.estimator.residualization,
        );
        if other.estimator.control.model.is_some() || other.estimator.control.mode.is_some() {
            base.estimator.control = other.estimator.control.clone();
        }

        // Evaluation
        overlay(&mut base.evaluation.seed, &other.evaluation.seed);
        overlay(
            &mut base.evaluation.bootstrap_iterations,
            &other.evaluation.bootstrap_iterations,
        );
        overlay(
            &mut base.evaluation.confidence_level,
            &other.evaluation.confidence_level,
        );
        overlay(
            &mut base.evaluation.max_degenerate_fraction,
            &other.evaluation.max_degenerate_fraction,
        );
        overlay(
            &mut base.evaluation.calibration_bins,
            &other.evaluation.calibration_bins,
        );
        overlay(
            &mut base.evaluation.calibration_binning,
            &other.evaluation.calibration_binning,
        );
        overlay(
            &mut base.evaluation.sigmoid_scale,
            &other.evaluation.sigmoid_scale,
        );

        // Pipeline
        overlay(
            &mut base.pipeline.max_excluded_fraction,
            &other.pipeline.max_excluded_fraction,
        );
        overlay(&mut base.pipeline.threads, &other.pipeline.threads);
        overlay(&mut base.pipeline.smoke_fraction, &other.pipeline.smoke_fraction);
        overlay(&mut base.pipeline.smoke_min_rows, &other.pipeline.smoke_min_rows);
    }

    /// Seed window spec, seed and control model from the run manifest.
    pub fn apply_manifest(config: &mut EciConfig, manifest: &RunManifest) {
        overlay(&mut config.windowing.window_length, &manifest.window_length);
        overlay(&mut config.windowing.stride, &manifest.stride);
        overlay(&mut config.evaluation.seed, &manifest.seed);
        if config.estimator.control.mode.is_none() {
            overlay(&mut config.estimator.control.model, &manifest.control_model);
        }
    }

    /// Apply environment variable overrides.
    /// Pattern: `ECI_WINDOW_LENGTH`, `ECI_SEED`, etc.
    fn apply_env_overrides(config: &mut EciConfig) {
        if let Some(v) = env_parse::<usize>("ECI_WINDOW_LENGTH") {
            config.windowing.window_length = Some(v);
        }
        if let Some(v) = env_parse::<usize>("ECI_STRIDE") {
            config.windowing.stride = Some(v);
        }
        if let Some(v) = env_parse::<usize>("ECI_EARLY_CUTOFF") {
            config.estimator.early_cutoff = Some(v);
        }
        if let Some(v) = env_parse::<u64>("ECI_SEED") {
            config.evaluation.seed = Some(v);
        }
        if let Some(v) = env_parse::<usize>("ECI_BOOTSTRAP_ITERATIONS") {
            config.evaluation.bootstrap_iterations = Some(v);
        }
        if let Some(v) = env_parse::<f64>("ECI_CONFIDENCE_LEVEL") {
            config.evaluation.confidence_level = Some(v);
        }
        if let Some(v) = env_parse::<f64>("ECI_MAX_EXCLUDED_FRACTION") {
            config.pipeline.max_excluded_fraction = Some(v);
        }
        if let Some(v) = env_parse::<usize>("ECI_THREADS") {
            config.pipeline.threads = Some(v);
        }
    }

    /// Apply CLI overrides (highest priority).
    fn apply_cli_overrides(config: &mut EciConfig, cli: &CliOverrides) {
        overlay(&mut config.evaluation.seed, &cli.seed);
        overlay(
            &mut config.evaluation.bootstrap_iterations,
            &cli.bootstrap_iterations,
        );
        overlay(&mut config.windowing.window_length, &cli.window_length);
        overlay(&mut config.windowing.stride, &cli.stride);
        overlay(&mut config.pipeline.threads, &cli.threads);
    }

    /// Serialize the config back to TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ParseError {
            path: "<serialization>".to_string(),
            message: e.to_string(),
        })
    }
}

fn overlay<T: Clone>(base: &mut Option<T>, other: &Option<T>) {
    if other.is_some() {
        base.clone_from(other);
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.parse().ok())
}

/// Returns the user config path: `~/.eci/config.toml`.
fn user_config_path() -> Option<PathBuf> {
    home_dir().map(|h| h.join(".eci").join("config.toml"))
}

/// Cross-platform home directory resolution.
fn home_dir() -> Option<PathBuf> {
    std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map(PathBuf::from)
}
