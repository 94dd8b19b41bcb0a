//! Sample validation and moment helpers
//!
//! Samples are borrowed slices owned by the caller. Nothing here mutates them;
//! sorting always happens on a copy.

use crate::{Error, Result};

/// Reject empty samples and samples containing NaN or infinities
pub fn check_finite(sample: &[f64], context: &'static str) -> Result<()> {
    if sample.is_empty() {
        return Err(Error::EmptySample(context));
    }
    if sample.iter().any(|x| !x.is_finite()) {
        return Err(Error::NonFinite(context));
    }
    Ok(())
}

/// Require at least `min_len` observations
pub fn check_min_len(sample: &[f64], min_len: usize) -> Result<()> {
    if sample.len() < min_len {
        return Err(Error::InsufficientData {
            expected: min_len,
            actual: sample.len(),
        });
    }
    Ok(())
}

/// Ascending copy of a sample
pub fn sorted_copy(sample: &[f64]) -> Vec<f64> {
    let mut sorted = sample.to_vec();
    sorted.sort_by(f64::total_cmp);
    sorted
}

/// Check ascending order (used in debug assertions)
pub fn is_sorted(sample: &[f64]) -> bool {
    sample.windows(2).all(|w| w[0] <= w[1])
}

/// Arithmetic mean
pub fn mean(sample: &[f64]) -> Result<f64> {
    if sample.is_empty() {
        return Err(Error::EmptySample("mean"));
    }
    Ok(sample.iter().sum::<f64>() / sample.len() as f64)
}

/// Population variance (divides by `n`)
pub fn variance(sample: &[f64]) -> Result<f64> {
    let m = mean(sample)?;
    let ss: f64 = sample.iter().map(|&x| (x - m) * (x - m)).sum();
    Ok(ss / sample.len() as f64)
}

/// Population standard deviation
pub fn std_dev(sample: &[f64]) -> Result<f64> {
    variance(sample).map(f64::sqrt)
}

/// Mean and population variance in one pass over the data
pub fn mean_variance(sample: &[f64]) -> Result<(f64, f64)> {
    let m = mean(sample)?;
    let ss: f64 = sample.iter().map(|&x| (x - m) * (x - m)).sum();
    Ok((m, ss / sample.len() as f64))
}
