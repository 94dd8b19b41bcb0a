//! Shared utilities for integration tests

#![allow(dead_code)]

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};

pub use approx::assert_relative_eq;

/// Seeded draws from `Normal(mean, sd)`
pub fn normal_sample(n: usize, mean: f64, sd: f64, seed: u64) -> Vec<f64> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let dist = Normal::new(mean, sd).unwrap();
    (0..n).map(|_| dist.sample(&mut rng)).collect()
}

/// Route `tracing` output through the test harness, filtered by `RUST_LOG`
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn population_std(values: &[f64]) -> f64 {
    quantile_mapping::core::sample::std_dev(values).unwrap()
}

pub fn mean(values: &[f64]) -> f64 {
    quantile_mapping::core::sample::mean(values).unwrap()
}
