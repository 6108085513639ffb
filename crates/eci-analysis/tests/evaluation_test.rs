//! Evaluation engine: AUC scenarios, bootstrap determinism, AUC and mean
//! interval coverage.

use rand::distributions::Distribution;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use statrs::distribution::{ContinuousCDF, Normal};

use eci_analysis::eci::bootstrap_mean_ci;
use eci_analysis::evaluation::*;
use eci_core::errors::EvaluationError;

fn labels(bits: &[u8]) -> Vec<bool> {
    bits.iter().map(|&b| b == 1).collect()
}

#[test]
fn test_auc_perfect_separation() {
    let auc = roc_auc(&[0.1, 0.2, 0.8, 0.9], &labels(&[0, 0, 1, 1])).unwrap();
    assert_eq!(auc, 1.0);
}

#[test]
fn test_auc_all_tied() {
    let auc = roc_auc(&[0.4, 0.4, 0.4, 0.4], &labels(&[0, 1, 0, 1])).unwrap();
    assert_eq!(auc, 0.5);
}

#[test]
fn test_roc_curve_area_matches_rank_auc() {
    let scores = [0.3, 0.1, 0.7, 0.7, 0.2, 0.9, 0.5, 0.5];
    let outcomes = labels(&[0, 0, 1, 0, 0, 1, 1, 0]);
    let curve = roc_curve(&scores, &outcomes).unwrap();

    // Trapezoids over the curve equal the Mann-Whitney AUC.
    let trapezoid: f64 = curve
        .points
        .windows(2)
        .map(|w| (w[1].fpr - w[0].fpr) * (w[1].tpr + w[0].tpr) / 2.0)
        .sum();
    assert!((trapezoid - curve.auc).abs() < 1e-12);
    assert_eq!(curve.points.first().map(|p| (p.fpr, p.tpr)), Some((0.0, 0.0)));
    assert_eq!(curve.points.last().map(|p| (p.fpr, p.tpr)), Some((1.0, 1.0)));
}

#[test]
fn test_cohort_errors_are_fatal() {
    let spec = BootstrapSpec::default();
    assert!(matches!(
        bootstrap_roc_auc(&[0.1, 0.2], &labels(&[1]), &spec),
        Err(EvaluationError::DimensionMismatch { .. })
    ));
    assert!(matches!(
        bootstrap_average_precision(&[0.1, 0.2], &labels(&[0, 0]), &spec),
        Err(EvaluationError::InsufficientClasses { .. })
    ));
}

fn synthetic_cohort(n: usize, seed: u64) -> (Vec<f64>, Vec<bool>) {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let noise = Normal::new(0.0, 1.0).unwrap();
    (0..n)
        .map(|i| {
            let failed = i % 2 == 0;
            let shift = if failed { 1.0 } else { 0.0 };
            (shift + noise.sample(&mut rng), failed)
        })
        .unzip()
}

#[test]
fn test_bootstrap_identical_across_runs_and_thread_counts() {
    let (scores, outcomes) = synthetic_cohort(120, 11);
    let spec = BootstrapSpec::new(500, 0.95, 42, 0.05).unwrap();

    let run_on = |threads: usize| {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build()
            .unwrap()
            .install(|| bootstrap_roc_auc(&scores, &outcomes, &spec).unwrap())
    };

    let single = run_on(1);
    let again = run_on(1);
    let parallel = run_on(4);
    assert_eq!(single, again);
    assert_eq!(single, parallel);
    assert_eq!(single.ci.lower.to_bits(), parallel.ci.lower.to_bits());
    assert_eq!(single.ci.upper.to_bits(), parallel.ci.upper.to_bits());
    assert_eq!(single.seed, 42);

    let other_seed = bootstrap_roc_auc(&scores, &outcomes, &spec.with_seed(43)).unwrap();
    assert_eq!(other_seed.point_estimate, single.point_estimate);
    assert_ne!(other_seed.ci, single.ci);
}

#[test]
fn test_bootstrap_statistics_bracket_point_estimates() {
    let (scores, outcomes) = synthetic_cohort(200, 5);
    let spec = BootstrapSpec::new(400, 0.95, 42, 0.05).unwrap();
    let transform = ScoreTransform::new(1.0);
    let probabilities: Vec<f64> = scores.iter().map(|&s| transform.probability(s)).collect();

    let auc = bootstrap_roc_auc(&scores, &outcomes, &spec).unwrap();
    let ap = bootstrap_average_precision(&scores, &outcomes, &spec).unwrap();
    let ece =
        bootstrap_calibration_error(&probabilities, &outcomes, &CalibrationSpec::default(), &spec)
            .unwrap();

    for result in [&auc, &ap, &ece] {
        assert!(result.ci.lower <= result.ci.upper);
        assert_eq!(result.dropped, 0, "{} dropped resamples", result.statistic);
        assert_eq!(result.valid_iterations, 400);
    }
    // Shift of one standard deviation: AUC = Phi(1 / sqrt 2) ~ 0.76.
    assert!(auc.point_estimate > 0.65 && auc.point_estimate < 0.87);
    assert!(auc.ci.contains(auc.point_estimate));
}

#[test]
fn test_mean_interval_coverage_on_normal_cohorts() {
    let spec = BootstrapSpec::new(400, 0.95, 42, 0.05).unwrap();
    let dist = Normal::new(0.5, 1.0).unwrap();
    let trials = 200;

    let covered = (0..trials)
        .filter(|&trial| {
            let mut rng = ChaCha8Rng::seed_from_u64(1000 + trial);
            let values: Vec<f64> = (0..60).map(|_| dist.sample(&mut rng)).collect();
            bootstrap_mean_ci(&values, &spec.with_seed(trial)).is_some_and(|ci| ci.contains(0.5))
        })
        .count();

    let coverage = covered as f64 / trials as f64;
    assert!(coverage >= 0.90, "coverage {coverage} below 0.90");
}

#[test]
fn test_auc_interval_coverage_on_shifted_normal_cohorts() {
    // Negatives ~ N(0, 1), positives ~ N(d, 1): true AUC = Phi(d / sqrt 2).
    let shift = 1.0;
    let true_auc = Normal::new(0.0, 1.0)
        .unwrap()
        .cdf(shift / std::f64::consts::SQRT_2);
    let negatives = Normal::new(0.0, 1.0).unwrap();
    let positives = Normal::new(shift, 1.0).unwrap();
    let spec = BootstrapSpec::new(400, 0.95, 42, 0.05).unwrap();
    let trials = 200;

    let covered = (0..trials)
        .filter(|&trial| {
            let mut rng = ChaCha8Rng::seed_from_u64(5000 + trial);
            let outcomes: Vec<bool> = (0..120).map(|i| i % 2 == 0).collect();
            let scores: Vec<f64> = outcomes
                .iter()
                .map(|&failed| {
                    if failed {
                        positives.sample(&mut rng)
                    } else {
                        negatives.sample(&mut rng)
                    }
                })
                .collect();
            bootstrap_roc_auc(&scores, &outcomes, &spec.with_seed(trial))
                .map(|result| result.ci.contains(true_auc))
                .unwrap_or(false)
        })
        .count();

    let coverage = covered as f64 / trials as f64;
    assert!(coverage >= 0.90, "AUC coverage {coverage} below 0.90");
}
