//! Empirical percentiles with selectable interpolation

use crate::{Interpolation, QuantileEstimator};
use qm_core::{sample, Error, Result};

/// Empirical percentile estimator
///
/// Deterministic and stateless apart from the interpolation rule.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Percentile {
    interpolation: Interpolation,
}

impl Percentile {
    pub fn new(interpolation: Interpolation) -> Self {
        Self { interpolation }
    }

    pub fn interpolation(&self) -> Interpolation {
        self.interpolation
    }
}

impl QuantileEstimator for Percentile {
    fn percentiles_sorted(&self, sorted_data: &[f64], percentages: &[f64]) -> Result<Vec<f64>> {
        if sorted_data.is_empty() {
            return Err(Error::EmptySample("percentiles"));
        }
        debug_assert!(sample::is_sorted(sorted_data), "input must be sorted ascending");

        let span = (sorted_data.len() - 1) as f64;
        percentages
            .iter()
            .map(|&p| {
                Error::check_percentage(p)?;
                Ok(self.interpolation.resolve(sorted_data, p / 100.0 * span))
            })
            .collect()
    }
}

/// Percentiles of `sample` at `percentages`
///
/// Fails with `InvalidRange` when a target lies outside `[0, 100]`. The input
/// is not modified.
///
/// # Example
/// ```rust
/// use qm_quantile::{percentiles, Interpolation};
///
/// let data = [4.0, 1.0, 3.0, 2.0, 5.0];
/// let q = percentiles(&data, &[0.0, 50.0, 100.0], Interpolation::Linear).unwrap();
/// assert_eq!(q, vec![1.0, 3.0, 5.0]);
/// ```
pub fn percentiles(
    sample: &[f64],
    percentages: &[f64],
    interpolation: Interpolation,
) -> Result<Vec<f64>> {
    Percentile::new(interpolation).percentiles(sample, percentages)
}

/// Percentiles of an already sorted sample
pub fn percentiles_sorted(
    sorted_sample: &[f64],
    percentages: &[f64],
    interpolation: Interpolation,
) -> Result<Vec<f64>> {
    Percentile::new(interpolation).percentiles_sorted(sorted_sample, percentages)
}

/// A single percentile
pub fn percentile(sample: &[f64], percentage: f64, interpolation: Interpolation) -> Result<f64> {
    percentiles(sample, &[percentage], interpolation).map(|v| v[0])
}
