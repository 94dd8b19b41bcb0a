//! Storage for per-trial percentile replicates

use qm_core::{Error, QuantileBand, Result};
use qm_quantile::{Interpolation, Percentile, QuantileEstimator};

/// Row-major `trials x points` matrix of bootstrap percentiles
///
/// Row `t` holds the percentiles of resample `t`; column `j` is the
/// bootstrap distribution of target percentage `j`.
#[derive(Debug, Clone, PartialEq)]
pub struct BootstrapMatrix {
    trials: usize,
    points: usize,
    values: Vec<f64>,
}

impl BootstrapMatrix {
    /// Zero-filled matrix
    pub fn zeros(trials: usize, points: usize) -> Self {
        Self {
            trials,
            points,
            values: vec![0.0; trials * points],
        }
    }

    /// Wrap existing row-major values
    pub fn from_rows(trials: usize, points: usize, values: Vec<f64>) -> Result<Self> {
        if values.len() != trials * points {
            return Err(Error::size_mismatch(
                trials * points,
                values.len(),
                "bootstrap matrix",
            ));
        }
        Ok(Self {
            trials,
            points,
            values,
        })
    }

    pub fn trials(&self) -> usize {
        self.trials
    }

    pub fn points(&self) -> usize {
        self.points
    }

    pub fn row(&self, trial: usize) -> &[f64] {
        &self.values[trial * self.points..(trial + 1) * self.points]
    }

    pub(crate) fn values_mut(&mut self) -> &mut [f64] {
        &mut self.values
    }

    /// Copy of column `point` across all trials
    pub fn column(&self, point: usize) -> Vec<f64> {
        (0..self.trials)
            .map(|t| self.values[t * self.points + point])
            .collect()
    }

    /// Percentile interval of every column
    ///
    /// Edges sit at `(1 - level) / 2` and `(1 + level) / 2`; the nominal value
    /// is their midpoint.
    pub fn percentile_band(
        &self,
        confidence_level: f64,
        interpolation: Interpolation,
    ) -> Result<QuantileBand> {
        if self.trials == 0 {
            return Err(Error::EmptySample("bootstrap matrix"));
        }
        if !(confidence_level > 0.0 && confidence_level < 1.0) {
            return Err(Error::InvalidRange {
                value: confidence_level,
                min: 0.0,
                max: 1.0,
            });
        }

        let edges = [
            50.0 * (1.0 - confidence_level),
            50.0 * (1.0 + confidence_level),
        ];
        let estimator = Percentile::new(interpolation);
        let mut down = Vec::with_capacity(self.points);
        let mut up = Vec::with_capacity(self.points);
        let mut column = Vec::with_capacity(self.trials);
        for j in 0..self.points {
            column.clear();
            column.extend((0..self.trials).map(|t| self.values[t * self.points + j]));
            column.sort_by(f64::total_cmp);
            let bounds = estimator.percentiles_sorted(&column, &edges)?;
            down.push(bounds[0]);
            up.push(bounds[1]);
        }
        QuantileBand::from_edges(down, up)
    }
}
