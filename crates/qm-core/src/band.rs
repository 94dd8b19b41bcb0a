//! Nominal values with a lower/upper uncertainty band

use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Three aligned arrays `nominal`, `down`, `up`
///
/// Invariant: equal lengths and `down[i] <= nominal[i] <= up[i]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuantileBand {
    nominal: Vec<f64>,
    down: Vec<f64>,
    up: Vec<f64>,
}

impl QuantileBand {
    /// Build a band, validating lengths and ordering
    pub fn new(nominal: Vec<f64>, down: Vec<f64>, up: Vec<f64>) -> Result<Self> {
        if down.len() != nominal.len() {
            return Err(Error::size_mismatch(nominal.len(), down.len(), "band lower edge"));
        }
        if up.len() != nominal.len() {
            return Err(Error::size_mismatch(nominal.len(), up.len(), "band upper edge"));
        }
        for (i, ((&n, &d), &u)) in nominal.iter().zip(&down).zip(&up).enumerate() {
            if !(d <= n && n <= u) {
                return Err(Error::Numerical(format!(
                    "band ordering violated at index {i}: down={d}, nominal={n}, up={u}"
                )));
            }
        }
        Ok(Self { nominal, down, up })
    }

    /// Zero-width band around point estimates
    pub fn point(values: Vec<f64>) -> Self {
        Self {
            down: values.clone(),
            up: values.clone(),
            nominal: values,
        }
    }

    /// Band around `nominal` with edges widened to contain it
    ///
    /// Used for interval estimates whose edges are not guaranteed to straddle
    /// the point estimate (order-statistic bounds, bootstrap of another
    /// statistic).
    pub fn enclosing(nominal: Vec<f64>, down: Vec<f64>, up: Vec<f64>) -> Result<Self> {
        if down.len() != nominal.len() || up.len() != nominal.len() {
            return Err(Error::size_mismatch(
                nominal.len(),
                down.len().min(up.len()),
                "band edges",
            ));
        }
        let down = down.iter().zip(&nominal).map(|(&d, &n)| d.min(n)).collect();
        let up = up.iter().zip(&nominal).map(|(&u, &n)| u.max(n)).collect();
        Ok(Self { nominal, down, up })
    }

    /// Midpoint band: nominal is `(down + up) / 2`
    pub fn from_edges(down: Vec<f64>, up: Vec<f64>) -> Result<Self> {
        if down.len() != up.len() {
            return Err(Error::size_mismatch(down.len(), up.len(), "band edges"));
        }
        let nominal = down.iter().zip(&up).map(|(&d, &u)| 0.5 * (d + u)).collect();
        Self::new(nominal, down, up)
    }

    pub fn nominal(&self) -> &[f64] {
        &self.nominal
    }

    pub fn down(&self) -> &[f64] {
        &self.down
    }

    pub fn up(&self) -> &[f64] {
        &self.up
    }

    pub fn len(&self) -> usize {
        self.nominal.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nominal.is_empty()
    }

    /// True when every point has zero width
    pub fn is_point(&self) -> bool {
        self.down.iter().zip(&self.up).all(|(d, u)| d == u)
    }

    /// Distance from nominal down to the lower edge
    pub fn minus(&self) -> Vec<f64> {
        self.nominal.iter().zip(&self.down).map(|(n, d)| n - d).collect()
    }

    /// Distance from nominal up to the upper edge
    pub fn plus(&self) -> Vec<f64> {
        self.up.iter().zip(&self.nominal).map(|(u, n)| u - n).collect()
    }

    pub fn into_parts(self) -> (Vec<f64>, Vec<f64>, Vec<f64>) {
        (self.nominal, self.down, self.up)
    }
}
