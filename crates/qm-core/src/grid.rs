//! Percentile grids
//!
//! A grid is the ordered set of target percentages shared by both sides of a
//! q-q map. Entry `i` of every derived array refers to `percentages()[i]`.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Strictly ascending target percentages in `[0, 100]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "Vec<f64>")]
pub struct PercentileGrid(Vec<f64>);

impl PercentileGrid {
    /// Build a grid from explicit percentages
    ///
    /// Fails with `InvalidRange` for values outside `[0, 100]` and with
    /// `InvalidParameter` if the values are not strictly ascending.
    pub fn new(percentages: Vec<f64>) -> Result<Self> {
        if percentages.is_empty() {
            return Err(Error::InvalidParameter(
                "percentile grid must not be empty".to_string(),
            ));
        }
        for &p in &percentages {
            Error::check_percentage(p)?;
        }
        if let Some(i) = percentages.windows(2).position(|w| w[0] >= w[1]) {
            return Err(Error::InvalidParameter(format!(
                "percentile grid must be strictly ascending: {} >= {} at index {}",
                percentages[i],
                percentages[i + 1],
                i + 1
            )));
        }
        Ok(Self(percentages))
    }

    /// `num_points` equally spaced percentages from `start` to `end` inclusive
    pub fn linspace(start: f64, end: f64, num_points: usize) -> Result<Self> {
        Error::check_percentage(start)?;
        Error::check_percentage(end)?;
        match num_points {
            0 => Err(Error::InvalidParameter(
                "number of grid points must be positive".to_string(),
            )),
            1 => Ok(Self(vec![start])),
            _ => {
                if start >= end {
                    return Err(Error::InvalidParameter(format!(
                        "grid start {start} must be below grid end {end}"
                    )));
                }
                let step = (end - start) / (num_points - 1) as f64;
                let mut points: Vec<f64> =
                    (0..num_points).map(|i| start + step * i as f64).collect();
                // Pin the last point so rounding never pushes it past `end`
                points[num_points - 1] = end;
                Ok(Self(points))
            }
        }
    }

    pub fn percentages(&self) -> &[f64] {
        &self.0
    }

    /// Grid expressed as fractions in `[0, 1]`
    pub fn as_fractions(&self) -> Vec<f64> {
        self.0.iter().map(|p| p / 100.0).collect()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn first(&self) -> f64 {
        self.0[0]
    }

    pub fn last(&self) -> f64 {
        self.0[self.0.len() - 1]
    }
}

impl TryFrom<Vec<f64>> for PercentileGrid {
    type Error = Error;

    fn try_from(value: Vec<f64>) -> Result<Self> {
        Self::new(value)
    }
}

impl From<PercentileGrid> for Vec<f64> {
    fn from(grid: PercentileGrid) -> Self {
        grid.0
    }
}

impl AsRef<[f64]> for PercentileGrid {
    fn as_ref(&self) -> &[f64] {
        &self.0
    }
}
