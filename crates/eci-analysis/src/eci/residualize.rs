//! Cohort-level residualization against the control condition.

use std::fmt;

use serde::Serialize;

use eci_core::config::{ControlSelectorConfig, EstimatorConfig, ResidualizationMethod};
use eci_core::types::{EciEstimate, EciResult, SequenceMeta};

use super::slope::ols_fit;

/// Picks the control group out of a cohort.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlSelector {
    /// Sequences whose `control` flag is set.
    Flag,
    /// All sequences from the named model.
    Model(String),
    /// All sequences generated under the named mode.
    Mode(String),
}

impl ControlSelector {
    pub fn from_config(config: &ControlSelectorConfig) -> Self {
        match (&config.model, &config.mode) {
            (Some(model), _) => Self::Model(model.clone()),
            (None, Some(mode)) => Self::Mode(mode.clone()),
            (None, None) => Self::Flag,
        }
    }

    pub fn matches(&self, meta: &SequenceMeta) -> bool {
        match self {
            Self::Flag => meta.control,
            Self::Model(name) => meta.model_name == *name,
            Self::Mode(name) => meta.mode.as_deref() == Some(name.as_str()),
        }
    }
}

impl fmt::Display for ControlSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Flag => f.write_str("control flag"),
            Self::Model(name) => write!(f, "model={name}"),
            Self::Mode(name) => write!(f, "mode={name}"),
        }
    }
}

/// The systematic component removed from every `eci_raw`.
///
/// `ControlMean` is the special case `slope = 0`. A cohort without control
/// sequences gets the zero fit with `control_count = 0`, which leaves every
/// `eci_raw` unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ControlFit {
    pub method: ResidualizationMethod,
    pub control_count: usize,
    pub intercept: f64,
    pub slope: f64,
}

impl ControlFit {
    /// No control group: residualization is the identity.
    pub fn identity(method: ResidualizationMethod) -> Self {
        Self {
            method,
            control_count: 0,
            intercept: 0.0,
            slope: 0.0,
        }
    }

    pub fn is_identity(&self) -> bool {
        self.control_count == 0
    }

    /// Expected `eci_raw` of a control sequence with `n_tokens` tokens.
    pub fn predict(&self, n_tokens: usize) -> f64 {
        self.intercept + self.slope * n_tokens as f64
    }
}

/// Phase 2: turns a full cohort of estimates into results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Residualizer {
    selector: ControlSelector,
    method: ResidualizationMethod,
}

impl Residualizer {
    pub fn new(selector: ControlSelector, method: ResidualizationMethod) -> Self {
        Self { selector, method }
    }

    pub fn from_config(config: &EstimatorConfig) -> Self {
        Self::new(
            ControlSelector::from_config(&config.control),
            config.effective_residualization(),
        )
    }

    pub fn selector(&self) -> &ControlSelector {
        &self.selector
    }

    pub fn method(&self) -> ResidualizationMethod {
        self.method
    }

    /// Fit the control component on the control subset.
    pub fn fit(&self, estimates: &[EciEstimate]) -> ControlFit {
        let (lengths, values): (Vec<f64>, Vec<f64>) = estimates
            .iter()
            .filter(|e| self.selector.matches(&e.meta))
            .map(|e| (e.n_tokens as f64, e.eci_raw))
            .unzip();

        if values.is_empty() {
            tracing::warn!(
                selector = %self.selector,
                "no control sequences, eci_residualized equals eci_raw"
            );
            return ControlFit::identity(self.method);
        }

        let mean = values.iter().sum::<f64>() / values.len() as f64;
        let mut fit = ControlFit {
            method: self.method,
            control_count: values.len(),
            intercept: mean,
            slope: 0.0,
        };

        if self.method == ResidualizationMethod::LengthAdjusted {
            match ols_fit(&lengths, &values) {
                Some(line) => {
                    fit.intercept = line.intercept;
                    fit.slope = line.slope;
                }
                None => tracing::warn!(
                    control_count = fit.control_count,
                    "control lengths do not vary, falling back to control mean"
                ),
            }
        }
        fit
    }

    /// Consume the cohort's estimates and return residualized results in the
    /// same order, together with the fitted control component.
    pub fn residualize(&self, estimates: Vec<EciEstimate>) -> (Vec<EciResult>, ControlFit) {
        let fit = self.fit(&estimates);
        tracing::info!(
            selector = %self.selector,
            method = ?fit.method,
            control_count = fit.control_count,
            intercept = fit.intercept,
            slope = fit.slope,
            "fitted control component"
        );

        let results = estimates
            .into_iter()
            .map(|estimate| {
                let eci_residualized = estimate.eci_raw - fit.predict(estimate.n_tokens);
                EciResult {
                    estimate,
                    eci_residualized,
                }
            })
            .collect();
        (results, fit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn estimate(prompt: &str, model: &str, n_tokens: usize, eci_raw: f64) -> EciEstimate {
        EciEstimate {
            meta: SequenceMeta::new(prompt, model),
            n_windows: 4,
            n_tokens,
            eci_raw,
            early_eci_raw: Some(eci_raw),
        }
    }

    #[test]
    fn test_control_mean_centres_control_group() {
        let cohort = vec![
            estimate("p1", "base", 300, -0.01),
            estimate("p2", "base", 300, -0.03),
            estimate("p1", "reasoning", 300, -0.05),
        ];
        let residualizer = Residualizer::new(
            ControlSelector::Model("base".into()),
            ResidualizationMethod::ControlMean,
        );
        let (results, fit) = residualizer.residualize(cohort);

        assert_eq!(fit.control_count, 2);
        assert!((fit.intercept + 0.02).abs() < 1e-12);
        let control_mean = (results[0].eci_residualized + results[1].eci_residualized) / 2.0;
        assert!(control_mean.abs() < 1e-12);
        assert!((results[2].eci_residualized + 0.03).abs() < 1e-12);
        assert_eq!(results[2].prompt_id(), "p1");
    }

    #[test]
    fn test_length_adjusted_removes_length_trend() {
        // Control eci_raw = 0.001 - 0.0001 * n_tokens exactly.
        let cohort: Vec<EciEstimate> = [100, 200, 300, 400]
            .iter()
            .enumerate()
            .map(|(i, &n)| estimate(&format!("p{i}"), "base", n, 0.001 - 0.0001 * n as f64))
            .chain(std::iter::once(estimate("q", "other", 200, 0.0)))
            .collect();
        let residualizer = Residualizer::new(
            ControlSelector::Model("base".into()),
            ResidualizationMethod::LengthAdjusted,
        );
        let (results, fit) = residualizer.residualize(cohort);

        assert!((fit.slope + 0.0001).abs() < 1e-12);
        for result in &results[..4] {
            assert!(result.eci_residualized.abs() < 1e-12);
        }
        assert!((results[4].eci_residualized - 0.019).abs() < 1e-12);
    }

    #[test]
    fn test_length_adjusted_constant_lengths_falls_back_to_mean() {
        let cohort = vec![
            estimate("p1", "base", 256, 0.2),
            estimate("p2", "base", 256, 0.4),
        ];
        let residualizer = Residualizer::new(
            ControlSelector::Model("base".into()),
            ResidualizationMethod::LengthAdjusted,
        );
        let fit = residualizer.fit(&cohort);
        assert_eq!(fit.slope, 0.0);
        assert!((fit.intercept - 0.3).abs() < 1e-12);
    }

    #[test]
    fn test_empty_control_group_is_identity() {
        let cohort = vec![
            estimate("p1", "reasoning", 300, -0.05),
            estimate("p2", "reasoning", 400, 0.01),
        ];
        for method in [
            ResidualizationMethod::ControlMean,
            ResidualizationMethod::LengthAdjusted,
        ] {
            let (results, fit) =
                Residualizer::new(ControlSelector::Flag, method).residualize(cohort.clone());
            assert!(fit.is_identity());
            assert_eq!(fit.method, method);
            for result in &results {
                assert_eq!(result.eci_residualized, result.eci_raw());
            }
        }
    }

    #[test]
    fn test_selector_variants() {
        let meta = SequenceMeta::new("p", "m").with_control(true).with_mode("greedy");
        assert!(ControlSelector::Flag.matches(&meta));
        assert!(ControlSelector::Model("m".into()).matches(&meta));
        assert!(ControlSelector::Mode("greedy".into()).matches(&meta));
        assert!(!ControlSelector::Mode("sample".into()).matches(&meta));

        let config = ControlSelectorConfig {
            model: None,
            mode: Some("greedy".into()),
        };
        assert_eq!(
            ControlSelector::from_config(&config),
            ControlSelector::Mode("greedy".into())
        );
    }
}
