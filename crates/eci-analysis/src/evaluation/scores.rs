//! Mapping residualized ECI onto failure scores and probabilities.

use eci_core::config::EvaluationConfig;

/// Numerically stable logistic function.
pub fn sigmoid(x: f64) -> f64 {
    if x >= 0.0 {
        1.0 / (1.0 + (-x).exp())
    } else {
        let e = x.exp();
        e / (1.0 + e)
    }
}

/// Lower ECI means more collapse, which means higher failure risk.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreTransform {
    scale: f64,
}

impl ScoreTransform {
    pub fn new(scale: f64) -> Self {
        Self { scale }
    }

    pub fn from_config(config: &EvaluationConfig) -> Self {
        Self::new(config.effective_sigmoid_scale())
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn failure_score(&self, eci_residualized: f64) -> f64 {
        -eci_residualized
    }

    pub fn probability(&self, score: f64) -> f64 {
        sigmoid(self.scale * score)
    }

    /// Scores and probabilities for a slice of residualized ECI values.
    pub fn apply(&self, eci_residualized: &[f64]) -> (Vec<f64>, Vec<f64>) {
        eci_residualized
            .iter()
            .map(|&eci| {
                let score = self.failure_score(eci);
                (score, self.probability(score))
            })
            .unzip()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sigmoid() {
        assert_eq!(sigmoid(0.0), 0.5);
        assert!((sigmoid(2.0) + sigmoid(-2.0) - 1.0).abs() < 1e-15);
        assert!(sigmoid(-800.0) >= 0.0);
        assert!(sigmoid(800.0) <= 1.0);
    }

    #[test]
    fn test_lower_eci_is_riskier() {
        let transform = ScoreTransform::new(10.0);
        let (scores, probs) = transform.apply(&[-0.05, 0.0, 0.05]);
        assert_eq!(scores, vec![0.05, -0.0, -0.05]);
        assert!(probs[0] > probs[1] && probs[1] > probs[2]);
        assert_eq!(probs[1], 0.5);
    }
}
