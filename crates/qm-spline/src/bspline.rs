//! B-spline representation and evaluation
//!
//! A spline of degree `k` is stored as a knot vector `t` and coefficients
//! `c` with `t.len() == c.len() + k + 1`. Fitted splines use clamped knot
//! vectors: the boundary knots are repeated `k + 1` times.

use qm_core::{Error, Result};

/// Highest supported degree
pub const MAX_DEGREE: usize = 5;

/// Piecewise polynomial in B-spline form
#[derive(Debug, Clone, PartialEq)]
pub struct BSpline {
    knots: Vec<f64>,
    coefficients: Vec<f64>,
    degree: usize,
}

impl BSpline {
    /// Build a spline from its knot vector and coefficients
    ///
    /// Knots must be non-decreasing with `knots.len() == coefficients.len() + degree + 1`
    /// and the base interval `[t[k], t[n]]` must be non-empty.
    pub fn new(knots: Vec<f64>, coefficients: Vec<f64>, degree: usize) -> Result<Self> {
        if degree > MAX_DEGREE {
            return Err(Error::InvalidParameter(format!(
                "spline degree must be at most {MAX_DEGREE}, got {degree}"
            )));
        }
        if coefficients.is_empty() || coefficients.len() < degree + 1 {
            return Err(Error::InsufficientData {
                expected: degree + 1,
                actual: coefficients.len(),
            });
        }
        if knots.len() != coefficients.len() + degree + 1 {
            return Err(Error::size_mismatch(
                coefficients.len() + degree + 1,
                knots.len(),
                "spline knot vector",
            ));
        }
        if knots.iter().chain(&coefficients).any(|v| !v.is_finite()) {
            return Err(Error::NonFinite("spline knots or coefficients"));
        }
        if let Some(i) = knots.windows(2).position(|w| w[1] < w[0]) {
            return Err(Error::NonMonotonicInput {
                index: i + 1,
                previous: knots[i],
                current: knots[i + 1],
            });
        }
        let spline = Self {
            knots,
            coefficients,
            degree,
        };
        let (lo, hi) = spline.base_interval();
        if !(lo < hi) {
            return Err(Error::InvalidParameter(format!(
                "spline base interval [{lo}, {hi}] is empty"
            )));
        }
        Ok(spline)
    }

    pub fn degree(&self) -> usize {
        self.degree
    }

    pub fn knots(&self) -> &[f64] {
        &self.knots
    }

    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    /// Interval `[t[k], t[n]]` on which the B-spline basis sums to one
    pub fn base_interval(&self) -> (f64, f64) {
        (
            self.knots[self.degree],
            self.knots[self.coefficients.len()],
        )
    }

    /// Knot span index `mu` with `t[mu] <= x < t[mu + 1]`
    ///
    /// Clamped to the first and last non-empty spans, so points outside the
    /// base interval continue the end polynomial pieces.
    pub(crate) fn span(&self, x: f64) -> usize {
        let k = self.degree;
        let n = self.coefficients.len();
        if x >= self.knots[n] {
            // Last span with positive width
            let mut mu = n - 1;
            while mu > k && self.knots[mu] >= self.knots[mu + 1] {
                mu -= 1;
            }
            return mu;
        }
        if x <= self.knots[k] {
            let mut mu = k;
            while mu < n - 1 && self.knots[mu] >= self.knots[mu + 1] {
                mu += 1;
            }
            return mu;
        }
        // Largest mu in [k, n - 1] with t[mu] <= x
        let upper = self.knots[k + 1..n].partition_point(|&t| t <= x);
        k + upper
    }

    /// Values of the `k + 1` basis functions that are non-zero on span `mu`
    ///
    /// `out[r]` is the basis function with index `mu - k + r`.
    pub(crate) fn basis(&self, mu: usize, x: f64, out: &mut [f64]) {
        let k = self.degree;
        debug_assert!(out.len() > k);
        let t = &self.knots;
        let mut left = [0.0; MAX_DEGREE + 1];
        let mut right = [0.0; MAX_DEGREE + 1];
        out[0] = 1.0;
        for j in 1..=k {
            left[j] = x - t[mu + 1 - j];
            right[j] = t[mu + j] - x;
            let mut saved = 0.0;
            for r in 0..j {
                let denom = right[r + 1] + left[j - r];
                let temp = if denom != 0.0 { out[r] / denom } else { 0.0 };
                out[r] = saved + right[r + 1] * temp;
                saved = left[j - r] * temp;
            }
            out[j] = saved;
        }
    }

    /// Spline value at `x`; outside the base interval the end pieces are
    /// continued polynomially
    pub fn eval(&self, x: f64) -> f64 {
        let k = self.degree;
        let mu = self.span(x);
        let mut n = [0.0; MAX_DEGREE + 1];
        self.basis(mu, x, &mut n);
        (0..=k)
            .map(|r| self.coefficients[mu - k + r] * n[r])
            .sum()
    }

    /// First derivative as a spline of degree `k - 1`
    pub fn derivative(&self) -> Result<BSpline> {
        let k = self.degree;
        if k == 0 {
            return Err(Error::InvalidParameter(
                "cannot differentiate a piecewise constant spline".to_string(),
            ));
        }
        let t = &self.knots;
        let c = &self.coefficients;
        let kf = k as f64;
        let coefficients = (0..c.len() - 1)
            .map(|i| {
                let width = t[i + k + 1] - t[i + 1];
                if width > 0.0 {
                    kf * (c[i + 1] - c[i]) / width
                } else {
                    0.0
                }
            })
            .collect();
        let knots = t[1..t.len() - 1].to_vec();
        BSpline::new(knots, coefficients, k - 1)
    }
}

/// Clamped knot vector: `lo` and `hi` repeated `degree + 1` times around
/// `interior`
pub fn clamped_knots(lo: f64, hi: f64, interior: &[f64], degree: usize) -> Vec<f64> {
    let mut knots = Vec::with_capacity(interior.len() + 2 * (degree + 1));
    knots.extend(std::iter::repeat(lo).take(degree + 1));
    knots.extend_from_slice(interior);
    knots.extend(std::iter::repeat(hi).take(degree + 1));
    knots
}
