use std::path::Path;

use anyhow::{Context, Result};
use tracing::{info, warn};

use eci_analysis::pipeline::{CohortPipeline, CohortReport};
use eci_core::config::EciConfig;
use eci_core::constants::{ECI_RESULTS_FILE, REPORT_FILE};
use eci_core::errors::StorageError;
use eci_storage::{write_report_json, write_results_csv, JoinedCohort, RunDirectory, SmokeSample};

use crate::cli::OverrideArgs;

/// Recomputed and stored `eci_raw` may differ by at most this much.
const RECORDED_TOLERANCE: f64 = 1e-6;

pub fn run_reproduce(input: &Path, output: &Path, smoke: bool, overrides: &OverrideArgs) -> Result<()> {
    let run = RunDirectory::open(input)
        .with_context(|| format!("opening run directory {}", input.display()))?;

    let manifest = match run.manifest() {
        Ok(manifest) => Some(manifest),
        Err(StorageError::FileNotFound { path, .. }) => {
            warn!(path = %path, "no run manifest, using configured defaults");
            None
        }
        Err(e) => return Err(e).context("reading run manifest"),
    };

    let config = EciConfig::load(run.root(), manifest.as_ref(), Some(&overrides.to_overrides()))
        .context("resolving configuration")?;
    let pipeline = CohortPipeline::from_config(&config).context("building pipeline")?;

    let seed = config.evaluation.effective_seed();
    let sample = smoke.then(|| SmokeSample::from_config(&config.pipeline, seed));
    let cohort = run
        .load_cohort(pipeline.processor().windows(), sample.as_ref())
        .context("loading metric tables")?;

    let report = pipeline
        .run(&cohort.records, &cohort.labels)
        .context("running cohort evaluation")?;
    check_recorded(&cohort, &report);

    write_results_csv(&output.join(ECI_RESULTS_FILE), &report.results)
        .context("writing ECI results")?;
    write_report_json(&output.join(REPORT_FILE), &report).context("writing report")?;

    print_summary(&report, output);
    Ok(())
}

/// Warn when stored slopes disagree with the recomputed ones.
fn check_recorded(cohort: &JoinedCohort, report: &CohortReport) {
    let disagreeing = report
        .results
        .iter()
        .filter(|result| {
            let key = (result.model_name().to_string(), result.prompt_id().to_string());
            cohort
                .recorded
                .get(&key)
                .is_some_and(|stored| (stored.eci_raw - result.eci_raw()).abs() > RECORDED_TOLERANCE)
        })
        .count();
    if disagreeing > 0 {
        warn!(
            disagreeing,
            tolerance = RECORDED_TOLERANCE,
            "stored eci_raw differs from the recomputed slope"
        );
    }
}

fn print_summary(report: &CohortReport, output: &Path) {
    let prediction = &report.prediction;
    info!(output = %output.display(), "run complete");
    println!(
        "sequences: {} included, {} excluded, {} unlabelled",
        report.n_included,
        report.exclusions.len(),
        report.unlabelled.len()
    );
    if report.control.is_identity() {
        println!("no control sequences: eci_residualized equals eci_raw");
    }
    println!(
        "early_eci_raw undefined: {}, repetition flagged: {}",
        report.early_eci_undefined, report.repetition_detected
    );
    for (model, summary) in &report.by_model {
        println!(
            "  {model}: n={} mean={:.5} median={:.5} collapse={:.1}%",
            summary.n,
            summary.mean,
            summary.median,
            summary.collapse_fraction * 100.0
        );
    }
    for result in [
        &prediction.roc_auc,
        &prediction.average_precision,
        &prediction.expected_calibration_error,
    ] {
        println!(
            "{}: {:.4} [{:.4}, {:.4}] ({:.0}% CI, {} resamples, seed {})",
            result.statistic,
            result.point_estimate,
            result.ci.lower,
            result.ci.upper,
            result.ci.level * 100.0,
            result.valid_iterations,
            result.seed
        );
    }
    println!("wrote {}", output.display());
}
