//! Distribution-free confidence intervals for quantiles
//!
//! Based on the normal approximation to the binomial count of observations
//! below a quantile, as described in:
//! Ialongo, C. (2019). "Confidence interval for quantiles and percentiles."
//! Biochemia Medica 29(1).

use qm_core::{sample, Error, Result};
use statrs::distribution::{ContinuousCDF, Normal};

/// Two-sided standard normal quantile for a 95% interval
pub const DEFAULT_SIGMA: f64 = 1.96;

/// Standard normal quantile `z` such that `P(|Z| < z) = confidence_level`
pub fn sigma_for_confidence(confidence_level: f64) -> Result<f64> {
    if !(confidence_level > 0.0 && confidence_level < 1.0) {
        return Err(Error::InvalidRange {
            value: confidence_level,
            min: 0.0,
            max: 1.0,
        });
    }
    let normal = Normal::new(0.0, 1.0).map_err(|e| Error::Numerical(e.to_string()))?;
    Ok(normal.inverse_cdf(0.5 + confidence_level / 2.0))
}

/// Zero-based order-statistic indices bounding quantile `q` of `n` values
///
/// `lo = floor(n q - sigma sqrt(n q (1 - q))) - 1`,
/// `hi = ceil(n q + sigma sqrt(n q (1 - q))) - 1`, both clamped to `[0, n - 1]`.
pub fn order_statistic_indices(n: usize, q: f64, sigma: f64) -> (usize, usize) {
    debug_assert!(n > 0);
    let nf = n as f64;
    let half_width = sigma * (nf * q * (1.0 - q)).sqrt();
    let lo = (nf * q - half_width).floor() - 1.0;
    let hi = (nf * q + half_width).ceil() - 1.0;
    let clamp = |i: f64| i.clamp(0.0, nf - 1.0) as usize;
    (clamp(lo), clamp(hi))
}

/// Lower and upper interval bounds for each target fraction
///
/// # Arguments
/// * `sorted_sample` - Sample sorted ascending. This precondition is only
///   checked in debug builds.
/// * `fractions` - Target quantiles in `[0, 1]`
/// * `sigma` - Two-sided normal quantile for the confidence level
///   (1.96 gives roughly 95%)
///
/// The approximation degrades for `q` close to 0 or 1, where the clamped
/// indices collapse onto the sample extremes.
pub fn order_statistic_interval(
    sorted_sample: &[f64],
    fractions: &[f64],
    sigma: f64,
) -> Result<(Vec<f64>, Vec<f64>)> {
    if sorted_sample.is_empty() {
        return Err(Error::EmptySample("order-statistic interval"));
    }
    if !(sigma.is_finite() && sigma >= 0.0) {
        return Err(Error::InvalidParameter(format!(
            "sigma must be finite and non-negative, got {sigma}"
        )));
    }
    debug_assert!(sample::is_sorted(sorted_sample), "input must be sorted ascending");

    let n = sorted_sample.len();
    let mut lower = Vec::with_capacity(fractions.len());
    let mut upper = Vec::with_capacity(fractions.len());
    for &q in fractions {
        Error::check_probability(q)?;
        let (lo, hi) = order_statistic_indices(n, q, sigma);
        lower.push(sorted_sample[lo]);
        upper.push(sorted_sample[hi]);
    }
    Ok((lower, upper))
}
