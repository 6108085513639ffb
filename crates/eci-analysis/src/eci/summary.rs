//! Descriptive statistics of ECI values per model and over the cohort.

use std::collections::BTreeMap;

use serde::Serialize;
use statrs::statistics::{Data, Median, Statistics};

use eci_core::types::EciResult;

use crate::evaluation::{bootstrap_statistic, BootstrapSpec, ConfidenceInterval};

/// `true` when `eci` falls below the collapse threshold.
pub fn classify_collapse(eci: f64, threshold: f64) -> bool {
    eci < threshold
}

/// Fraction of values below `threshold`; 0 for an empty slice.
pub fn collapse_fraction(values: &[f64], threshold: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let collapsed = values
        .iter()
        .filter(|&&v| classify_collapse(v, threshold))
        .count();
    collapsed as f64 / values.len() as f64
}

#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct EciSummary {
    pub n: usize,
    pub mean: f64,
    /// Population standard deviation.
    pub std: f64,
    pub median: f64,
    pub collapse_fraction: f64,
    pub mean_ci: Option<ConfidenceInterval>,
}

/// Percentile bootstrap interval of the mean; `None` for an empty slice.
pub fn bootstrap_mean_ci(values: &[f64], spec: &BootstrapSpec) -> Option<ConfidenceInterval> {
    if values.is_empty() {
        return None;
    }
    let point = values.iter().mean();
    bootstrap_statistic("mean", values.len(), point, spec, |idx| {
        Some(idx.iter().map(|&i| values[i]).sum::<f64>() / idx.len() as f64)
    })
    .ok()
    .map(|result| result.ci)
}

/// Summary of a set of ECI values. An empty set summarizes to zeros.
pub fn summarize(values: &[f64], threshold: f64, spec: &BootstrapSpec) -> EciSummary {
    if values.is_empty() {
        return EciSummary::default();
    }
    EciSummary {
        n: values.len(),
        mean: values.iter().mean(),
        std: values.iter().population_std_dev(),
        median: Data::new(values.to_vec()).median(),
        collapse_fraction: collapse_fraction(values, threshold),
        mean_ci: bootstrap_mean_ci(values, spec),
    }
}

/// Residualized ECI summaries keyed by model name.
pub fn summarize_by_model(
    results: &[EciResult],
    threshold: f64,
    spec: &BootstrapSpec,
) -> BTreeMap<String, EciSummary> {
    let mut grouped: BTreeMap<String, Vec<f64>> = BTreeMap::new();
    for result in results {
        grouped
            .entry(result.model_name().to_string())
            .or_default()
            .push(result.eci_residualized);
    }
    grouped
        .into_iter()
        .map(|(model, values)| (model, summarize(&values, threshold, spec)))
        .collect()
}
