//! Benchmarks for padded view operations.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use nalgebra::{DMatrix, DVector};
use quasinewton_core::prelude::*;

fn benchmark_dot_product(c: &mut Criterion) {
    let mut group = c.benchmark_group("dot_product");

    for size in [100, 1000, 10000].iter() {
        let a = DVector::<f64>::from_element(*size, 1.0);
        let b = DVector::<f64>::from_element(*size, 2.0);
        let pa = PaddedVector::from_dvector(&a);
        let pb = PaddedVector::from_dvector(&b);

        group.bench_with_input(BenchmarkId::new("nalgebra", size), size, |bench, _| {
            bench.iter(|| black_box(a.dot(&b)));
        });

        group.bench_with_input(BenchmarkId::new("view", size), size, |bench, _| {
            bench.iter(|| black_box(pa.view().dot(&pb.view())));
        });
    }

    group.finish();
}

fn benchmark_axpy(c: &mut Criterion) {
    let mut group = c.benchmark_group("axpy");

    for size in [100, 1000, 10000].iter() {
        let x = DVector::<f64>::from_element(*size, 1.5);
        let mut y = DVector::<f64>::from_element(*size, 0.5);
        let px = PaddedVector::from_dvector(&x);
        let mut py = PaddedVector::from_dvector(&y);

        group.bench_with_input(BenchmarkId::new("nalgebra", size), size, |bench, _| {
            bench.iter(|| y.axpy(black_box(1e-3), &x, 1.0));
        });

        group.bench_with_input(BenchmarkId::new("view", size), size, |bench, _| {
            bench.iter(|| py.view_mut().axpy(black_box(1e-3), &px.view()));
        });
    }

    group.finish();
}

fn benchmark_gemv(c: &mut Criterion) {
    let mut group = c.benchmark_group("gemv_transpose");

    for rows in [100, 1000].iter() {
        let cols = 20;
        let m = DMatrix::<f64>::from_fn(*rows, cols, |i, j| ((i * cols + j) as f64).sin());
        let x = DVector::<f64>::from_element(*rows, 0.1);
        let pm = PaddedMatrix::from_dmatrix(&m);
        let px = PaddedVector::from_dvector(&x);
        let mut py = PaddedVector::zeros(cols);

        group.bench_with_input(BenchmarkId::new("nalgebra", rows), rows, |bench, _| {
            bench.iter(|| black_box(m.tr_mul(&x)));
        });

        group.bench_with_input(BenchmarkId::new("view", rows), rows, |bench, _| {
            bench.iter(|| {
                pm.view()
                    .gemv_transpose(1.0, &px.view(), 0.0, &mut py.view_mut())
            });
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_dot_product, benchmark_axpy, benchmark_gemv);
criterion_main!(benches);
