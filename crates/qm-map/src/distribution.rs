//! Distributions usable by parametric quantile mapping

use qm_core::{sample, Error, Result};
use qm_quantile::{Interpolation, Percentile, QuantileEstimator};
use statrs::distribution::{ContinuousCDF, Normal};

/// A distribution with a CDF and its inverse
pub trait QuantileFunction {
    /// `P(X <= x)`
    fn cdf(&self, x: f64) -> f64;

    /// Smallest `x` with `cdf(x) >= p`; `p` must lie in `[0, 1]`
    fn ppf(&self, p: f64) -> Result<f64>;
}

impl<D: QuantileFunction + ?Sized> QuantileFunction for &D {
    fn cdf(&self, x: f64) -> f64 {
        (**self).cdf(x)
    }

    fn ppf(&self, p: f64) -> Result<f64> {
        (**self).ppf(p)
    }
}

fn check_probability(p: f64) -> Result<()> {
    if !(0.0..=1.0).contains(&p) {
        return Err(Error::Domain(format!(
            "inverse CDF needs a probability in [0, 1], got {p}"
        )));
    }
    Ok(())
}

impl QuantileFunction for Normal {
    fn cdf(&self, x: f64) -> f64 {
        ContinuousCDF::cdf(self, x)
    }

    fn ppf(&self, p: f64) -> Result<f64> {
        check_probability(p)?;
        Ok(self.inverse_cdf(p))
    }
}

/// Log-normal distribution: `ln X ~ Normal(mu, sigma)`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LogNormal {
    log_space: Normal,
}

impl LogNormal {
    pub fn new(mu: f64, sigma: f64) -> Result<Self> {
        let log_space = Normal::new(mu, sigma).map_err(|e| {
            Error::InvalidParameter(format!("log-normal(mu={mu}, sigma={sigma}): {e}"))
        })?;
        Ok(Self { log_space })
    }
}

impl QuantileFunction for LogNormal {
    fn cdf(&self, x: f64) -> f64 {
        if x <= 0.0 {
            0.0
        } else {
            ContinuousCDF::cdf(&self.log_space, x.ln())
        }
    }

    fn ppf(&self, p: f64) -> Result<f64> {
        check_probability(p)?;
        Ok(self.log_space.inverse_cdf(p).exp())
    }
}

/// `inner` translated by `loc`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Shifted<D> {
    inner: D,
    loc: f64,
}

impl<D> Shifted<D> {
    pub fn new(inner: D, loc: f64) -> Self {
        Self { inner, loc }
    }

    pub fn inner(&self) -> &D {
        &self.inner
    }

    pub fn loc(&self) -> f64 {
        self.loc
    }
}

impl<D: QuantileFunction> QuantileFunction for Shifted<D> {
    fn cdf(&self, x: f64) -> f64 {
        self.inner.cdf(x - self.loc)
    }

    fn ppf(&self, p: f64) -> Result<f64> {
        Ok(self.inner.ppf(p)? + self.loc)
    }
}

/// Step CDF of a sample, with linearly interpolated percentiles as inverse
#[derive(Debug, Clone, PartialEq)]
pub struct EmpiricalDistribution {
    sorted: Vec<f64>,
}

impl EmpiricalDistribution {
    pub fn new(data: &[f64]) -> Result<Self> {
        sample::check_finite(data, "empirical distribution")?;
        Ok(Self {
            sorted: sample::sorted_copy(data),
        })
    }

    pub fn len(&self) -> usize {
        self.sorted.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sorted.is_empty()
    }

    pub fn sorted(&self) -> &[f64] {
        &self.sorted
    }
}

impl QuantileFunction for EmpiricalDistribution {
    fn cdf(&self, x: f64) -> f64 {
        let below = self.sorted.partition_point(|&v| v <= x);
        below as f64 / self.sorted.len() as f64
    }

    fn ppf(&self, p: f64) -> Result<f64> {
        check_probability(p)?;
        Percentile::new(Interpolation::Linear).percentile_sorted(&self.sorted, 100.0 * p)
    }
}
