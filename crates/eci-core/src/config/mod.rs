//! Configuration system for the ECI workspace.
//! TOML-based, layered resolution: CLI > env > project > user > manifest > defaults.

pub mod eci_config;
pub mod estimator_config;
pub mod evaluation_config;
pub mod pipeline_config;
pub mod text_config;
pub mod windowing_config;

pub use eci_config::{CliOverrides, EciConfig};
pub use estimator_config::{ControlSelectorConfig, EstimatorConfig, ResidualizationMethod};
pub use evaluation_config::{CalibrationBinning, EvaluationConfig};
pub use pipeline_config::PipelineConfig;
pub use text_config::TextConfig;
pub use windowing_config::WindowingConfig;
