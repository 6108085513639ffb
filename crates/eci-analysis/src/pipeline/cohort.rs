//! End-to-end cohort run.

use rayon::prelude::*;

use eci_core::config::EciConfig;
use eci_core::errors::{PipelineError, SequenceFailure};
use eci_core::types::collections::{FxHashMap, FxHashSet};
use eci_core::types::{EciEstimate, EciResult, OutcomeLabel, SequenceRecord};

use super::process::{ProcessedSequence, RawSequence, SequenceProcessor};
use super::report::{CohortReport, PredictionReport, SequenceFeatures, SequenceKey};
use crate::eci::{summarize, summarize_by_model, ControlFit, EciEstimator, Residualizer};
use crate::evaluation::{
    bootstrap_average_precision, bootstrap_calibration_error, bootstrap_roc_auc,
    calibration_curve, pr_curve, roc_curve, BootstrapSpec, CalibrationSpec, ClassCounts,
    ScoreTransform,
};

/// Phase-1 output for a whole cohort, sorted by `(model_name, prompt_id)`.
#[derive(Debug, Clone)]
pub struct PhaseOne {
    pub estimates: Vec<EciEstimate>,
    pub exclusions: Vec<SequenceFailure>,
    pub total: usize,
}

/// All components of a run, resolved from one [`EciConfig`].
#[derive(Debug, Clone)]
pub struct CohortPipeline {
    processor: SequenceProcessor,
    estimator: EciEstimator,
    residualizer: Residualizer,
    bootstrap: BootstrapSpec,
    calibration: CalibrationSpec,
    transform: ScoreTransform,
    collapse_threshold: f64,
    max_excluded_fraction: f64,
}

impl CohortPipeline {
    pub fn from_config(config: &EciConfig) -> Result<Self, PipelineError> {
        let threads = config.pipeline.effective_threads();
        if threads > 0 {
            // Only the first global pool configuration wins.
            rayon::ThreadPoolBuilder::new()
                .num_threads(threads)
                .build_global()
                .ok();
        }

        Ok(Self {
            processor: SequenceProcessor::from_config(config)?,
            estimator: EciEstimator::from_config(&config.estimator),
            residualizer: Residualizer::from_config(&config.estimator),
            bootstrap: BootstrapSpec::from_config(&config.evaluation)?,
            calibration: CalibrationSpec::from_config(&config.evaluation)?,
            transform: ScoreTransform::from_config(&config.evaluation),
            collapse_threshold: config.estimator.effective_collapse_threshold(),
            max_excluded_fraction: config.pipeline.effective_max_excluded_fraction(),
        })
    }

    pub fn processor(&self) -> &SequenceProcessor {
        &self.processor
    }

    pub fn bootstrap(&self) -> &BootstrapSpec {
        &self.bootstrap
    }

    /// Window series for raw sequences. Failures are returned, not raised.
    pub fn process_raw(
        &self,
        raw: &[RawSequence],
    ) -> (Vec<ProcessedSequence>, Vec<SequenceFailure>) {
        let outcomes: Vec<Result<ProcessedSequence, SequenceFailure>> = raw
            .par_iter()
            .map(|sequence| {
                self.processor.process(sequence).map_err(|e| {
                    SequenceFailure::new(&sequence.meta.prompt_id, &sequence.meta.model_name, &e)
                })
            })
            .collect();

        let mut processed = Vec::with_capacity(outcomes.len());
        let mut failures = Vec::new();
        for outcome in outcomes {
            match outcome {
                Ok(p) => {
                    if p.repetition_detected == Some(true) {
                        tracing::debug!(
                            prompt_id = %p.record.meta.prompt_id,
                            model_name = %p.record.meta.model_name,
                            "degenerate repetition detected"
                        );
                    }
                    processed.push(p);
                }
                Err(failure) => failures.push(failure),
            }
        }
        (processed, failures)
    }

    /// Phase 1: validate each record and compute its slopes.
    pub fn estimate(&self, records: &[SequenceRecord]) -> Result<PhaseOne, PipelineError> {
        self.estimate_with(records, Vec::new())
    }

    fn estimate_with(
        &self,
        records: &[SequenceRecord],
        mut exclusions: Vec<SequenceFailure>,
    ) -> Result<PhaseOne, PipelineError> {
        let total = records.len() + exclusions.len();
        tracing::info!(sequences = records.len(), "phase 1: estimating ECI");
        let windows = self.processor.windows();

        let outcomes: Vec<Result<EciEstimate, SequenceFailure>> = records
            .par_iter()
            .map(|record| {
                let (prompt_id, model_name) = (&record.meta.prompt_id, &record.meta.model_name);
                record
                    .validate(windows.length(), windows.stride())
                    .map_err(|e| SequenceFailure::new(prompt_id, model_name, &e))?;
                let estimate = self
                    .estimator
                    .estimate(record)
                    .map_err(|e| SequenceFailure::new(prompt_id, model_name, &e))?;
                tracing::debug!(
                    prompt_id = %prompt_id,
                    model_name = %model_name,
                    n_windows = estimate.n_windows,
                    eci_raw = estimate.eci_raw,
                    "estimated"
                );
                Ok(estimate)
            })
            .collect();

        let mut estimates = Vec::with_capacity(outcomes.len());
        for outcome in outcomes {
            match outcome {
                Ok(estimate) => estimates.push(estimate),
                Err(failure) => exclusions.push(failure),
            }
        }
        for failure in &exclusions {
            tracing::warn!(
                prompt_id = %failure.prompt_id,
                model_name = %failure.model_name,
                code = failure.code,
                "excluding sequence: {}",
                failure.message
            );
        }

        let excluded = exclusions.len();
        if total > 0 && excluded as f64 / total as f64 > self.max_excluded_fraction {
            return Err(PipelineError::ExcessiveExclusions {
                excluded,
                total,
                max_fraction: self.max_excluded_fraction,
            });
        }

        estimates.sort_by(|a, b| a.meta.key().cmp(&b.meta.key()));
        tracing::info!(included = estimates.len(), excluded, "phase 1 complete");
        Ok(PhaseOne {
            estimates,
            exclusions,
            total,
        })
    }

    /// Phase 2: remove the control component from the whole cohort.
    pub fn residualize(&self, estimates: Vec<EciEstimate>) -> (Vec<EciResult>, ControlFit) {
        self.residualizer.residualize(estimates)
    }

    /// Join results with labels and score the labelled subset.
    ///
    /// Returns the prediction report and the keys of results without a label.
    pub fn evaluate(
        &self,
        results: &[EciResult],
        labels: &[OutcomeLabel],
    ) -> Result<(PredictionReport, Vec<SequenceKey>), PipelineError> {
        let by_key: FxHashMap<(&str, &str), bool> = labels
            .iter()
            .map(|label| (label.key(), label.qa_failure))
            .collect();

        let mut eci = Vec::new();
        let mut outcomes = Vec::new();
        let mut unlabelled = Vec::new();
        for result in results {
            match by_key.get(&result.estimate.meta.key()) {
                Some(&failed) => {
                    eci.push(result.eci_residualized);
                    outcomes.push(failed);
                }
                None => unlabelled.push(SequenceKey {
                    model_name: result.model_name().to_string(),
                    prompt_id: result.prompt_id().to_string(),
                }),
            }
        }
        if !unlabelled.is_empty() {
            tracing::warn!(
                unlabelled = unlabelled.len(),
                "sequences without outcome labels left out of prediction"
            );
        }

        let (scores, probabilities) = self.transform.apply(&eci);
        let counts = ClassCounts::count(&outcomes);
        tracing::info!(
            labelled = outcomes.len(),
            positives = counts.positives,
            negatives = counts.negatives,
            iterations = self.bootstrap.iterations(),
            seed = self.bootstrap.seed(),
            "evaluating failure prediction"
        );

        let report = PredictionReport {
            n_labelled: outcomes.len(),
            positives: counts.positives,
            negatives: counts.negatives,
            sigmoid_scale: self.transform.scale(),
            roc: roc_curve(&scores, &outcomes)?,
            pr: pr_curve(&scores, &outcomes)?,
            calibration: calibration_curve(&probabilities, &outcomes, &self.calibration)?,
            roc_auc: bootstrap_roc_auc(&scores, &outcomes, &self.bootstrap)?,
            average_precision: bootstrap_average_precision(&scores, &outcomes, &self.bootstrap)?,
            expected_calibration_error: bootstrap_calibration_error(
                &probabilities,
                &outcomes,
                &self.calibration,
                &self.bootstrap,
            )?,
        };
        tracing::info!(
            roc_auc = report.roc_auc.point_estimate,
            lower = report.roc_auc.ci.lower,
            upper = report.roc_auc.ci.upper,
            "evaluation complete"
        );
        Ok((report, unlabelled))
    }

    /// Full run over prepared records.
    pub fn run(
        &self,
        records: &[SequenceRecord],
        labels: &[OutcomeLabel],
    ) -> Result<CohortReport, PipelineError> {
        let phase_one = self.estimate(records)?;
        let features = records.par_iter().map(SequenceFeatures::from_record).collect();
        self.finish(phase_one, labels, features)
    }

    /// Full run starting from hidden states and tokens.
    pub fn run_raw(
        &self,
        raw: &[RawSequence],
        labels: &[OutcomeLabel],
    ) -> Result<CohortReport, PipelineError> {
        let (processed, failures) = self.process_raw(raw);
        let features = processed.iter().map(ProcessedSequence::features).collect();
        let records: Vec<SequenceRecord> = processed.into_iter().map(|p| p.record).collect();
        let phase_one = self.estimate_with(&records, failures)?;
        self.finish(phase_one, labels, features)
    }

    fn finish(
        &self,
        phase_one: PhaseOne,
        labels: &[OutcomeLabel],
        mut features: Vec<SequenceFeatures>,
    ) -> Result<CohortReport, PipelineError> {
        let PhaseOne {
            estimates,
            exclusions,
            total,
        } = phase_one;

        let (results, control) = self.residualize(estimates);
        let residuals: Vec<f64> = results.iter().map(|r| r.eci_residualized).collect();
        let overall = summarize(&residuals, self.collapse_threshold, &self.bootstrap);
        let by_model = summarize_by_model(&results, self.collapse_threshold, &self.bootstrap);

        let (prediction, unlabelled) = self.evaluate(&results, labels)?;

        let included: FxHashSet<(&str, &str)> =
            results.iter().map(|r| r.estimate.meta.key()).collect();
        features.retain(|f| {
            included.contains(&(f.key.model_name.as_str(), f.key.prompt_id.as_str()))
        });
        features.sort_by(|a, b| a.key.cmp(&b.key));
        let repetition_detected = features
            .iter()
            .filter(|f| f.repetition_detected == Some(true))
            .count();
        let early_eci_undefined = results
            .iter()
            .filter(|r| r.estimate.early_eci_raw.is_none())
            .count();
        if early_eci_undefined > 0 {
            tracing::warn!(
                early_eci_undefined,
                early_cutoff = self.estimator.early_cutoff(),
                "sequences with too few early windows for early_eci_raw"
            );
        }

        Ok(CohortReport {
            n_sequences: total,
            n_included: results.len(),
            exclusions,
            control,
            overall,
            by_model,
            early_eci_undefined,
            repetition_detected,
            prediction,
            unlabelled,
            features,
            results,
        })
    }
}
