//! Bootstrap and spectral throughput.
//!
//! Run with: cargo bench -p eci-analysis --bench evaluation_bench

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};

use eci_analysis::evaluation::{bootstrap_roc_auc, BootstrapSpec};
use eci_analysis::spectral::{compute_internal_series, HiddenStates};
use eci_analysis::WindowSpec;

fn synthetic_scores(n: usize) -> (Vec<f64>, Vec<bool>) {
    (0..n)
        .map(|i| {
            let failed = i % 3 == 0;
            let jitter = ((i * 7919) % 101) as f64 / 101.0;
            (if failed { 0.3 } else { 0.0 } + jitter, failed)
        })
        .unzip()
}

fn bootstrap_auc(c: &mut Criterion) {
    let mut group = c.benchmark_group("bootstrap_roc_auc");
    group.sample_size(10);

    for n in [100, 1000, 5000] {
        let (scores, outcomes) = synthetic_scores(n);
        let spec = BootstrapSpec::new(1000, 0.95, 42, 0.05).unwrap();
        group.bench_with_input(BenchmarkId::new("cohort", n), &n, |b, _| {
            b.iter(|| bootstrap_roc_auc(&scores, &outcomes, &spec).unwrap());
        });
    }
    group.finish();
}

fn spectral_series(c: &mut Criterion) {
    let mut group = c.benchmark_group("spectral_series");
    group.sample_size(10);

    for dim in [64, 256] {
        let n_tokens = 1024;
        let data: Vec<f64> = (0..n_tokens * dim)
            .map(|i| ((i * 2654435761) % 1000) as f64 / 1000.0)
            .collect();
        let states = HiddenStates::from_row_major(n_tokens, dim, &data).unwrap();
        let spec = WindowSpec::default();
        group.bench_with_input(BenchmarkId::new("hidden_dim", dim), &dim, |b, _| {
            b.iter(|| compute_internal_series(&states, &spec).unwrap());
        });
    }
    group.finish();
}

criterion_group!(benches, bootstrap_auc, spectral_series);
criterion_main!(benches);
