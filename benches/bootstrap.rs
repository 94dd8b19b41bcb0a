//! Bootstrap and spline fitting throughput
//!
//! Run with: cargo bench --bench bootstrap
//! Compare with the rayon trial loop: cargo bench --bench bootstrap --features parallel

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use quantile_mapping::bootstrap::BootstrapEngine;
use quantile_mapping::prelude::*;
use quantile_mapping::{PercentileGrid, Resampling};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};
use std::time::Duration;

fn normal_sample(n: usize, seed: u64) -> Vec<f64> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let dist = Normal::new(0.0, 1.0).unwrap();
    (0..n).map(|_| dist.sample(&mut rng)).collect()
}

fn bench_bootstrap(c: &mut Criterion) {
    let mut group = c.benchmark_group("bootstrap");
    group.measurement_time(Duration::from_secs(10));
    let grid = PercentileGrid::linspace(1.0, 99.0, 50).unwrap();
    const TRIALS: usize = 200;

    for &n in &[1_000usize, 10_000, 40_000] {
        let sample = normal_sample(n, 42);
        group.throughput(Throughput::Elements((n * TRIALS) as u64));

        for resampling in [Resampling::Plain, Resampling::Smooth] {
            let engine = BootstrapEngine::new()
                .with_trials(TRIALS)
                .with_resampling(resampling)
                .with_seed(7);
            group.bench_with_input(
                BenchmarkId::new(resampling.to_string(), n),
                &sample,
                |b, sample| b.iter(|| engine.run_grid(black_box(sample), &grid)),
            );
        }
    }
    group.finish();
}

fn bench_qq_map(c: &mut Criterion) {
    let mut group = c.benchmark_group("qq_map");
    let simul: Vec<f64> = normal_sample(20_000, 1).iter().map(|v| 1.2 * v + 0.5).collect();
    let data = normal_sample(10_000, 2);

    let config = QqMapConfig::new()
        .with_range(1.0, 99.0)
        .with_points(50)
        .with_uncertainty(Uncertainty::bootstrap(BootstrapTarget::Data, 200).with_seed(3));
    group.bench_function("build_data_200", |b| {
        b.iter(|| QqMap::build(black_box(&simul), black_box(&data), &config))
    });

    let map = QqMap::build(&simul, &data, &config).unwrap();
    let corrector = SplineCorrector::new();
    group.bench_function("weighted_spline_fit", |b| {
        b.iter(|| map.weighted_correction(black_box(&corrector)))
    });
    let correction = map.correction(&corrector).unwrap();
    group.bench_function("spline_eval_20k", |b| {
        b.iter(|| correction.eval_many(black_box(&simul)))
    });
    group.finish();
}

criterion_group!(benches, bench_bootstrap, bench_qq_map);
criterion_main!(benches);
