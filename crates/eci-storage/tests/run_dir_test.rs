//! Run-directory round trip: tables on disk through the cohort pipeline to
//! written outputs.

use std::fmt::Write as _;
use std::path::Path;

use tempfile::TempDir;

use eci_analysis::pipeline::CohortPipeline;
use eci_analysis::WindowSpec;
use eci_core::config::EciConfig;
use eci_core::errors::{EciErrorCode, StorageError};
use eci_storage::{write_report_json, write_results_csv, RunDirectory, SmokeSample};

const INTERNAL_HEADER: &str =
    "prompt_id,model_name,eci_raw,eci_residualized,early_eci_raw,effective_ranks,window_starts,window_ends\n";

/// 10 control rows and 30 reasoning rows; reasoning prompts divisible by 3
/// have a falling rank trend and a QA failure.
fn write_run(dir: &Path) {
    let mut internal = String::from(INTERNAL_HEADER);
    let mut external = String::from("prompt_id,model_name,qa_failure,reasoning_failures\n");

    for (model, count) in [("base", 10), ("reasoning", 30)] {
        for i in 0..count {
            let failed = model == "reasoning" && i % 3 == 0;
            let slope = if failed { -0.03 } else { 0.0 };
            let ranks: Vec<String> = (0..5)
                .map(|w| {
                    let midpoint = (w * 64 + 64) as f64;
                    let wobble = ((i * 13 + w * 5) % 4) as f64 * 0.01;
                    format!("{:.6}", 20.0 + slope * midpoint + wobble)
                })
                .collect();
            writeln!(
                internal,
                "{model}-{i},{model},0.0,0.0,0.0,\"[{}]\",\"[0, 64, 128, 192, 256]\",\"[128, 192, 256, 320, 384]\"",
                ranks.join(", ")
            )
            .unwrap();
            let failures = if failed { "{'logic': True}" } else { "{}" };
            let qa = if failed { "True" } else { "False" };
            writeln!(external, "{model}-{i},{model},{qa},\"{failures}\"").unwrap();
        }
    }

    std::fs::write(dir.join("metrics_internal.csv"), internal).unwrap();
    std::fs::write(dir.join("metrics_external.csv"), external).unwrap();
    std::fs::write(
        dir.join("manifest.json"),
        r#"{"seed": 7, "window_size": 128, "stride": 64, "control_model": "base",
            "models": [{"name": "base", "completed": true}, {"name": "reasoning", "completed": true}],
            "started_at": "2024-05-01"}"#,
    )
    .unwrap();
}

#[test]
fn test_full_run_writes_outputs() {
    let tmp = TempDir::new().unwrap();
    write_run(tmp.path());

    let run = RunDirectory::open(tmp.path()).unwrap();
    let manifest = run.manifest().unwrap();
    assert_eq!(manifest.seed, Some(7));
    assert_eq!(manifest.window_length, Some(128));

    let mut config = EciConfig::default();
    EciConfig::apply_manifest(&mut config, &manifest);
    config.evaluation.bootstrap_iterations = Some(200);
    assert_eq!(config.estimator.control.model.as_deref(), Some("base"));

    let windows = WindowSpec::from_config(&config.windowing).unwrap();
    let cohort = run.load_cohort(&windows, None).unwrap();
    assert_eq!(cohort.records.len(), 40);
    assert_eq!(cohort.labels.len(), 40);

    let report = CohortPipeline::from_config(&config)
        .unwrap()
        .run(&cohort.records, &cohort.labels)
        .unwrap();
    assert_eq!(report.prediction.roc_auc.seed, 7);
    assert!(report.prediction.roc_auc.point_estimate > 0.95);

    let out = tmp.path().join("out");
    write_results_csv(&out.join("eci_results.csv"), &report.results).unwrap();
    write_report_json(&out.join("report.json"), &report).unwrap();

    let csv = std::fs::read_to_string(out.join("eci_results.csv")).unwrap();
    assert_eq!(csv.lines().count(), 41);
    assert!(csv.starts_with("prompt_id,model_name,control,mode,n_windows"));

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(out.join("report.json")).unwrap()).unwrap();
    assert_eq!(json["n_included"], 40);
    assert_eq!(json["control"]["control_count"], 10);
}

#[test]
fn test_missing_columns_named() {
    let tmp = TempDir::new().unwrap();
    std::fs::write(
        tmp.path().join("metrics_internal.csv"),
        "prompt_id,model_name,eci_raw\np1,m,0.1\n",
    )
    .unwrap();
    std::fs::write(
        tmp.path().join("metrics_external.csv"),
        "prompt_id,model_name,qa_failure\np1,m,True\n",
    )
    .unwrap();

    let err = RunDirectory::open(tmp.path())
        .unwrap()
        .load_cohort(&WindowSpec::default(), None)
        .unwrap_err();
    assert_eq!(err.error_code(), "SCHEMA_VALIDATION");
    let message = err.to_string();
    for column in ["eci_residualized", "early_eci_raw", "effective_ranks"] {
        assert!(message.contains(column), "{message} does not name {column}");
    }
}

#[test]
fn test_missing_files() {
    let tmp = TempDir::new().unwrap();
    let run = RunDirectory::open(tmp.path()).unwrap();
    assert!(matches!(run.manifest(), Err(StorageError::FileNotFound { .. })));
    assert!(matches!(
        run.load_cohort(&WindowSpec::default(), None),
        Err(StorageError::FileNotFound { .. })
    ));
    assert!(RunDirectory::open(tmp.path().join("nope")).is_err());
}

#[test]
fn test_smoke_subsample_is_seeded() {
    let tmp = TempDir::new().unwrap();
    write_run(tmp.path());
    let run = RunDirectory::open(tmp.path()).unwrap();
    let sample = SmokeSample {
        fraction: 0.05,
        min_rows: 12,
        seed: 42,
    };

    let ids = |cohort: eci_storage::JoinedCohort| -> Vec<String> {
        cohort.records.into_iter().map(|r| r.meta.prompt_id).collect()
    };
    let a = ids(run.load_cohort(&WindowSpec::default(), Some(&sample)).unwrap());
    let b = ids(run.load_cohort(&WindowSpec::default(), Some(&sample)).unwrap());
    assert_eq!(a.len(), 12);
    assert_eq!(a, b);
}
