//! Tests for the ECI configuration system.

use std::sync::Mutex;

use eci_core::config::{CliOverrides, EciConfig, ResidualizationMethod};
use eci_core::errors::ConfigError;
use eci_core::types::RunManifest;

/// Serializes tests that touch environment variables.
static ENV_MUTEX: Mutex<()> = Mutex::new(());

const ECI_VARS: &[&str] = &[
    "ECI_WINDOW_LENGTH",
    "ECI_STRIDE",
    "ECI_EARLY_CUTOFF",
    "ECI_SEED",
    "ECI_BOOTSTRAP_ITERATIONS",
    "ECI_CONFIDENCE_LEVEL",
    "ECI_MAX_EXCLUDED_FRACTION",
    "ECI_THREADS",
];

fn clear_eci_env_vars() {
    for key in ECI_VARS {
        std::env::remove_var(key);
    }
}

/// Points HOME at an empty directory so a developer's `~/.eci` is never read.
fn isolated_home() -> tempfile::TempDir {
    let home = tempfile::TempDir::new().unwrap();
    std::env::set_var("HOME", home.path());
    home
}

#[test]
fn test_layered_resolution() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_eci_env_vars();
    let _home = isolated_home();

    let dir = tempfile::TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("eci.toml"),
        r#"
[windowing]
window_length = 96
stride = 48

[evaluation]
seed = 7
bootstrap_iterations = 200
"#,
    )
    .unwrap();

    let manifest = RunManifest {
        seed: Some(1),
        window_length: Some(256),
        stride: Some(128),
        control_model: Some("mistralai/Mistral-7B-v0.1".into()),
        ..Default::default()
    };

    std::env::set_var("ECI_STRIDE", "32");

    let cli = CliOverrides {
        seed: Some(99),
        ..Default::default()
    };

    let config = EciConfig::load(dir.path(), Some(&manifest), Some(&cli)).unwrap();

    // Project overrides manifest
    assert_eq!(config.windowing.effective_window_length(), 96);
    // Env overrides project
    assert_eq!(config.windowing.effective_stride(), 32);
    // CLI overrides everything
    assert_eq!(config.evaluation.effective_seed(), 99);
    assert_eq!(config.evaluation.effective_bootstrap_iterations(), 200);
    // Manifest fills what nobody else sets
    assert_eq!(
        config.estimator.control.model.as_deref(),
        Some("mistralai/Mistral-7B-v0.1")
    );

    clear_eci_env_vars();
}

#[test]
fn test_defaults_without_files() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_eci_env_vars();
    let _home = isolated_home();

    let dir = tempfile::TempDir::new().unwrap();
    let config = EciConfig::load(dir.path(), None, None).unwrap();

    assert_eq!(config.windowing.effective_window_length(), 128);
    assert_eq!(config.windowing.effective_stride(), 64);
    assert_eq!(config.text.effective_ngram_order(), 3);
    assert_eq!(config.estimator.effective_early_cutoff(), 256);
    assert_eq!(config.estimator.effective_collapse_threshold(), -0.02);
    assert_eq!(
        config.estimator.effective_residualization(),
        ResidualizationMethod::ControlMean
    );
    assert_eq!(config.evaluation.effective_seed(), 42);
    assert_eq!(config.evaluation.effective_bootstrap_iterations(), 1000);
    assert_eq!(config.evaluation.effective_confidence_level(), 0.95);
    assert_eq!(config.evaluation.effective_calibration_bins(), 10);
    assert_eq!(config.pipeline.effective_max_excluded_fraction(), 0.10);
}

#[test]
fn test_user_config_below_project() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_eci_env_vars();
    let home = isolated_home();

    std::fs::create_dir_all(home.path().join(".eci")).unwrap();
    std::fs::write(
        home.path().join(".eci").join("config.toml"),
        "[text]\nngram_order = 2\n[estimator]\nearly_cutoff = 512\n",
    )
    .unwrap();

    let dir = tempfile::TempDir::new().unwrap();
    std::fs::write(dir.path().join("eci.toml"), "[estimator]\nearly_cutoff = 384\n").unwrap();

    let config = EciConfig::load(dir.path(), None, None).unwrap();
    assert_eq!(config.text.effective_ngram_order(), 2);
    assert_eq!(config.estimator.effective_early_cutoff(), 384);
}

#[test]
fn test_invalid_toml_is_parse_error() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_eci_env_vars();
    let _home = isolated_home();

    let dir = tempfile::TempDir::new().unwrap();
    std::fs::write(dir.path().join("eci.toml"), "[windowing\nstride = ").unwrap();

    let err = EciConfig::load(dir.path(), None, None).unwrap_err();
    assert!(matches!(err, ConfigError::ParseError { .. }));
}

#[test]
fn test_validation_rejects_bad_values() {
    let cases = [
        ("[windowing]\nstride = 0\n", "windowing.stride"),
        ("[windowing]\nwindow_length = 0\n", "windowing.window_length"),
        ("[evaluation]\nconfidence_level = 1.0\n", "evaluation.confidence_level"),
        ("[evaluation]\nmax_degenerate_fraction = 1.5\n", "evaluation.max_degenerate_fraction"),
        ("[evaluation]\ncalibration_bins = 0\n", "evaluation.calibration_bins"),
        ("[pipeline]\nmax_excluded_fraction = -0.1\n", "pipeline.max_excluded_fraction"),
        ("[estimator.control]\nmodel = \"a\"\nmode = \"b\"\n", "estimator.control"),
    ];
    for (toml_str, expected_field) in cases {
        match EciConfig::from_toml(toml_str) {
            Err(ConfigError::ValidationFailed { field, .. }) => {
                assert_eq!(field, expected_field, "input: {toml_str}")
            }
            other => panic!("expected validation failure for {toml_str}, got {other:?}"),
        }
    }
}

#[test]
fn test_enum_fields_parse_snake_case() {
    let config = EciConfig::from_toml(
        "[estimator]\nresidualization = \"length_adjusted\"\n[evaluation]\ncalibration_binning = \"quantile\"\n",
    )
    .unwrap();
    assert_eq!(
        config.estimator.effective_residualization(),
        ResidualizationMethod::LengthAdjusted
    );
    assert_eq!(
        config.evaluation.effective_calibration_binning(),
        eci_core::config::CalibrationBinning::Quantile
    );
}

#[test]
fn test_toml_roundtrip_keeps_values() {
    let config = EciConfig::from_toml("[windowing]\nwindow_length = 64\nstride = 16\n").unwrap();
    let serialized = config.to_toml().unwrap();
    let reparsed = EciConfig::from_toml(&serialized).unwrap();
    assert_eq!(config, reparsed);
}
