//! Resampling primitives
//!
//! Both resamplers write into a caller-provided buffer of the same length as
//! the sample so a trial loop can reuse one allocation.

use qm_core::{sample, Error, Result};
use qm_quantile::{percentiles_sorted, Interpolation};
use rand::Rng;
use rand_distr::{Distribution, StandardNormal};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Resampling scheme used by each bootstrap trial
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Resampling {
    /// Draw `n` values uniformly with replacement
    #[default]
    Plain,
    /// Plain draw plus Gaussian kernel noise, shrunk to preserve the variance
    Smooth,
}

impl fmt::Display for Resampling {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resampling::Plain => f.write_str("plain"),
            Resampling::Smooth => f.write_str("smooth"),
        }
    }
}

impl FromStr for Resampling {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "plain" => Ok(Resampling::Plain),
            "smooth" => Ok(Resampling::Smooth),
            other => Err(Error::InvalidConfiguration(format!(
                "unknown resampling '{other}', expected 'plain' or 'smooth'"
            ))),
        }
    }
}

/// Gaussian kernel parameters for the smoothed bootstrap
///
/// Bandwidth follows Silverman's rule of thumb
/// `h = 0.9 * min(std, IQR / 1.34) * n^(-1/5)`. Resampled values are shrunk
/// about the sample mean by `1 / sqrt(1 + h^2 / variance)` so the noise does
/// not inflate the variance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SmoothKernel {
    pub mean: f64,
    pub bandwidth: f64,
    pub shrink: f64,
}

impl SmoothKernel {
    /// Derive the kernel from a sample
    ///
    /// Fails with `DegenerateSample` when either the standard deviation or the
    /// interquartile range is zero.
    pub fn from_sample(data: &[f64]) -> Result<Self> {
        sample::check_min_len(data, 2)?;
        let (mean, variance) = sample::mean_variance(data)?;
        let std_dev = variance.sqrt();
        if std_dev == 0.0 {
            return Err(Error::DegenerateSample(
                "smooth bootstrap requires a sample with non-zero standard deviation".to_string(),
            ));
        }

        let sorted = sample::sorted_copy(data);
        let quartiles = percentiles_sorted(&sorted, &[25.0, 75.0], Interpolation::Linear)?;
        let iqr = quartiles[1] - quartiles[0];
        if iqr <= 0.0 {
            return Err(Error::DegenerateSample(
                "smooth bootstrap requires a sample with non-zero interquartile range".to_string(),
            ));
        }

        let effective_sigma = std_dev.min(iqr / 1.34);
        let bandwidth = 0.9 * effective_sigma * (data.len() as f64).powf(-0.2);
        let shrink = 1.0 / (1.0 + bandwidth * bandwidth / variance).sqrt();
        Ok(Self {
            mean,
            bandwidth,
            shrink,
        })
    }

    #[inline]
    fn apply(&self, value: f64, noise: f64) -> f64 {
        self.mean + (value - self.mean + self.bandwidth * noise) * self.shrink
    }
}

/// Fill `out` with a plain resample of `data`
pub fn resample_into<R: Rng + ?Sized>(data: &[f64], rng: &mut R, out: &mut [f64]) {
    debug_assert_eq!(out.len(), data.len());
    let n = data.len();
    for slot in out.iter_mut() {
        *slot = data[rng.gen_range(0..n)];
    }
}

/// Fill `out` with a smoothed resample of `data`
pub fn smooth_resample_into<R: Rng + ?Sized>(
    data: &[f64],
    kernel: &SmoothKernel,
    rng: &mut R,
    out: &mut [f64],
) {
    debug_assert_eq!(out.len(), data.len());
    let n = data.len();
    for slot in out.iter_mut() {
        let value = data[rng.gen_range(0..n)];
        let noise: f64 = StandardNormal.sample(rng);
        *slot = kernel.apply(value, noise);
    }
}
