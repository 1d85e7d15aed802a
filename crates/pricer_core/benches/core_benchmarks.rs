//! Criterion benchmarks for pricer_core numerical routines.
//!
//! Measures Simpson quadrature across partition counts and the L-BFGS
//! minimiser on a smooth five-dimensional objective.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use pricer_core::math::quadrature::QuadratureConfig;
use pricer_core::math::solvers::{LbfgsConfig, LbfgsMinimiser, Minimiser};

/// Oscillating, decaying integrand resembling a Fourier inversion kernel.
fn kernel(x: f64) -> f64 {
    (x * 1.3).sin() * (-0.05 * x).exp() / x
}

/// Benchmark Simpson quadrature over the default Fourier domain.
fn bench_simpson(c: &mut Criterion) {
    let mut group = c.benchmark_group("simpson");

    for partitions in [100, 1000, 10000] {
        let config = QuadratureConfig::new(1e-5, 100.0, partitions);
        group.bench_with_input(
            BenchmarkId::new("partitions", partitions),
            &config,
            |b, config| {
                b.iter(|| black_box(config.integrate(kernel)));
            },
        );
    }

    group.finish();
}

/// Benchmark L-BFGS on a shifted, mildly coupled quadratic.
fn bench_lbfgs(c: &mut Criterion) {
    let minimiser = LbfgsMinimiser::new(LbfgsConfig::new(1e-8, 500).with_max_step(0.5));
    let target = [1.5, 0.04, 0.3, -0.6, 0.05];
    let objective = move |p: &[f64]| {
        let mut value = 0.0;
        for (i, (x, t)) in p.iter().zip(target.iter()).enumerate() {
            value += (i as f64 + 1.0) * (x - t).powi(2);
        }
        value + 0.1 * (p[0] - target[0]) * (p[2] - target[2])
    };

    c.bench_function("lbfgs_quadratic_5d", |b| {
        b.iter(|| {
            minimiser
                .minimise(objective, black_box(&[0.5, 0.01, 0.2, 0.1, 0.4]))
                .unwrap()
        });
    });
}

criterion_group!(benches, bench_simpson, bench_lbfgs);
criterion_main!(benches);
