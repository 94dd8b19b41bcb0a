//! Core traits for percentile estimation

use qm_core::{sample, Result};

/// Estimates percentiles of a sample
///
/// Implementors only provide the sorted-input method; the unsorted entry point
/// sorts an internal copy so the caller's sample is never reordered.
pub trait QuantileEstimator: Send + Sync {
    /// Percentiles of an ascending sample
    ///
    /// # Arguments
    /// * `sorted_data` - The sample, already sorted ascending
    /// * `percentages` - Target percentages in `[0, 100]`
    fn percentiles_sorted(&self, sorted_data: &[f64], percentages: &[f64]) -> Result<Vec<f64>>;

    /// Percentiles of an arbitrary sample
    fn percentiles(&self, data: &[f64], percentages: &[f64]) -> Result<Vec<f64>> {
        let sorted = sample::sorted_copy(data);
        self.percentiles_sorted(&sorted, percentages)
    }

    /// A single percentile of an ascending sample
    fn percentile_sorted(&self, sorted_data: &[f64], percentage: f64) -> Result<f64> {
        self.percentiles_sorted(sorted_data, &[percentage])
            .map(|values| values[0])
    }
}
