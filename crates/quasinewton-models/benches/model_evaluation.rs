//! Benchmarks for objective evaluation and logistic regression fits
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use quasinewton_core::prelude::*;
use quasinewton_models::{fit_logistic, simulate_logistic, ExtendedRosenbrock, LogisticRegression};
use rand::rngs::SmallRng;
use rand::SeedableRng;

fn benchmark_logistic_evaluation(c: &mut Criterion) {
    let mut group = c.benchmark_group("logistic_evaluation");
    let coefficients = [0.5, -1.0, 0.75, 2.0, -0.25];

    for &nobs in &[100, 1000, 10000] {
        let mut rng = SmallRng::seed_from_u64(42);
        let (x, y) = simulate_logistic(nobs, &coefficients, &mut rng);
        let model = LogisticRegression::new(&x, &y).unwrap();
        let beta = PaddedVector::from_slice(&coefficients);
        let mut gradient = PaddedVector::zeros(coefficients.len());

        group.bench_with_input(BenchmarkId::new("evaluate", nobs), &nobs, |b, _| {
            b.iter(|| model.evaluate(black_box(&beta.view()), &mut gradient.view_mut()));
        });
    }

    group.finish();
}

fn benchmark_logistic_fit(c: &mut Criterion) {
    let mut group = c.benchmark_group("logistic_fit");
    let coefficients = [0.5, -1.0, 0.75];

    for &nobs in &[100, 1000] {
        let mut rng = SmallRng::seed_from_u64(7);
        let (x, y) = simulate_logistic(nobs, &coefficients, &mut rng);

        group.bench_with_input(BenchmarkId::new("fit", nobs), &nobs, |b, _| {
            b.iter(|| fit_logistic(black_box(&x), black_box(&y)));
        });
    }

    group.finish();
}

fn benchmark_extended_rosenbrock(c: &mut Criterion) {
    let mut group = c.benchmark_group("extended_rosenbrock_evaluation");

    for &dim in &[100, 10000] {
        let problem = ExtendedRosenbrock::new(dim).unwrap();
        let x = PaddedVector::from_slice(&problem.starting_point::<f64>());
        let mut gradient = PaddedVector::zeros(dim);

        group.bench_with_input(BenchmarkId::new("evaluate", dim), &dim, |b, _| {
            b.iter(|| problem.evaluate(black_box(&x.view()), &mut gradient.view_mut()));
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    benchmark_logistic_evaluation,
    benchmark_logistic_fit,
    benchmark_extended_rosenbrock
);
criterion_main!(benches);
