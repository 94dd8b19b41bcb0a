//! Quantile-quantile maps between a simulated and a reference sample

use crate::config::{BootstrapTarget, QqMapConfig, Uncertainty};
use qm_bootstrap::BootstrapEngine;
use qm_core::{sample, Error, PercentileGrid, QuantileBand, Result};
use qm_quantile::{order_statistic_interval, Percentile, QuantileEstimator};
use qm_spline::{linear_interpolant, BSplineCorrection, BandCorrection, Extrapolation, SplineCorrector};
use rand::{thread_rng, Rng};
use tracing::{debug, instrument};

/// Added to the data seed for the independent bootstrap of `simul`
const SIMUL_SEED_OFFSET: u64 = 0x5851_f42d_4c95_7f2d;

/// Widest percentage range usable with `n` observations
///
/// Percentiles closer to 0 or 100 than `100 / n` rest on fewer than one
/// observation in the tail.
pub fn feasible_range(n: usize) -> (f64, f64) {
    let margin = 100.0 / n as f64;
    (margin, 100.0 - margin)
}

/// Paired percentiles `X = P(simul)`, `Y = P(data)` on a common grid
///
/// `x()[i]`, `y()[i]` and `targets()[i]` always refer to the same target
/// percentage. The bands satisfy `low <= nominal <= up` at every point.
#[derive(Debug, Clone, PartialEq)]
pub struct QqMap {
    grid: PercentileGrid,
    x: QuantileBand,
    y: QuantileBand,
}

impl QqMap {
    /// Build a map on `num_points` equally spaced percentages
    ///
    /// # Errors
    /// - `RangeTooExtreme` when `start < 100/n` or `end > 100 - 100/n`,
    ///   `n` being the smaller sample size
    /// - `InvalidParameter` for fewer than two points or `start >= end`
    /// - `EmptySample`, `InsufficientData`, `NonFinite` for unusable samples
    #[instrument(skip(simul, data, config), fields(n_simul = simul.len(), n_data = data.len(), points = config.num_points, mode = %config.uncertainty.mode()))]
    pub fn build(simul: &[f64], data: &[f64], config: &QqMapConfig) -> Result<Self> {
        check_samples(simul, data)?;
        let n = simul.len().min(data.len());
        let (min_allowed, max_allowed) = feasible_range(n);
        let start = config.start.unwrap_or(min_allowed);
        let end = config.end.unwrap_or(max_allowed);

        if config.num_points < 2 {
            return Err(Error::InvalidParameter(format!(
                "a q-q map needs at least 2 points, got {}",
                config.num_points
            )));
        }
        if !(start < end) {
            return Err(Error::InvalidParameter(format!(
                "start percentage {start} must be below end percentage {end}"
            )));
        }
        Error::check_percentage(start)?;
        Error::check_percentage(end)?;
        check_feasible(start, end, n)?;

        let grid = PercentileGrid::linspace(start, end, config.num_points)?;
        Self::compute(simul, data, grid, config)
    }

    /// Build a map on a caller-supplied grid
    ///
    /// `config.start`, `config.end` and `config.num_points` are ignored.
    pub fn from_grid(
        simul: &[f64],
        data: &[f64],
        grid: PercentileGrid,
        config: &QqMapConfig,
    ) -> Result<Self> {
        check_samples(simul, data)?;
        if grid.is_empty() {
            return Err(Error::InvalidParameter("empty percentile grid".to_string()));
        }
        check_feasible(grid.first(), grid.last(), simul.len().min(data.len()))?;
        Self::compute(simul, data, grid, config)
    }

    /// Assemble a map from precomputed bands
    pub fn from_parts(grid: PercentileGrid, x: QuantileBand, y: QuantileBand) -> Result<Self> {
        if x.len() != grid.len() {
            return Err(Error::size_mismatch(grid.len(), x.len(), "q-q map X"));
        }
        if y.len() != grid.len() {
            return Err(Error::size_mismatch(grid.len(), y.len(), "q-q map Y"));
        }
        Ok(Self { grid, x, y })
    }

    fn compute(
        simul: &[f64],
        data: &[f64],
        grid: PercentileGrid,
        config: &QqMapConfig,
    ) -> Result<Self> {
        let targets = grid.percentages();
        let estimator = Percentile::new(config.interpolation);
        let x_nominal = estimator.percentiles(simul, targets)?;

        let (x, y) = match &config.uncertainty {
            Uncertainty::None => (
                QuantileBand::point(x_nominal),
                QuantileBand::point(estimator.percentiles(data, targets)?),
            ),
            Uncertainty::Bootstrap {
                target,
                trials,
                resampling,
                confidence_level,
                seed,
            } => {
                let seed = seed.unwrap_or_else(|| thread_rng().gen());
                let engine = BootstrapEngine::new()
                    .with_trials(*trials)
                    .with_resampling(*resampling)
                    .with_interpolation(config.interpolation)
                    .with_confidence_level(*confidence_level)
                    .with_seed(seed);
                let y = engine.run(data, targets)?;
                let x = match target {
                    BootstrapTarget::Data => QuantileBand::point(x_nominal),
                    BootstrapTarget::Both => {
                        let simul_band = engine
                            .with_seed(seed.wrapping_add(SIMUL_SEED_OFFSET))
                            .run(simul, targets)?;
                        let (_, down, up) = simul_band.into_parts();
                        QuantileBand::enclosing(x_nominal, down, up)?
                    }
                };
                (x, y)
            }
            Uncertainty::Analytic { sigma } => {
                let fractions = grid.as_fractions();
                let sorted_simul = sample::sorted_copy(simul);
                let sorted_data = sample::sorted_copy(data);
                let y_nominal = estimator.percentiles_sorted(&sorted_data, targets)?;
                let (x_low, x_up) = order_statistic_interval(&sorted_simul, &fractions, *sigma)?;
                let (y_low, y_up) = order_statistic_interval(&sorted_data, &fractions, *sigma)?;
                (
                    QuantileBand::enclosing(x_nominal, x_low, x_up)?,
                    QuantileBand::enclosing(y_nominal, y_low, y_up)?,
                )
            }
        };
        debug!("Built q-q map with {} points", grid.len());
        Self::from_parts(grid, x, y)
    }

    pub fn grid(&self) -> &PercentileGrid {
        &self.grid
    }

    /// Target percentages
    pub fn targets(&self) -> &[f64] {
        self.grid.percentages()
    }

    pub fn len(&self) -> usize {
        self.grid.len()
    }

    pub fn is_empty(&self) -> bool {
        self.grid.is_empty()
    }

    /// Nominal percentiles of `simul`
    pub fn x(&self) -> &[f64] {
        self.x.nominal()
    }

    /// Nominal percentiles of `data`
    pub fn y(&self) -> &[f64] {
        self.y.nominal()
    }

    pub fn x_band(&self) -> &QuantileBand {
        &self.x
    }

    pub fn y_band(&self) -> &QuantileBand {
        &self.y
    }

    pub fn x_low(&self) -> &[f64] {
        self.x.down()
    }

    pub fn x_up(&self) -> &[f64] {
        self.x.up()
    }

    pub fn y_low(&self) -> &[f64] {
        self.y.down()
    }

    pub fn y_up(&self) -> &[f64] {
        self.y.up()
    }

    pub fn into_parts(self) -> (PercentileGrid, QuantileBand, QuantileBand) {
        (self.grid, self.x, self.y)
    }

    /// Spline through `(X, Y)` as configured by `corrector`
    pub fn correction(&self, corrector: &SplineCorrector) -> Result<BSplineCorrection> {
        corrector.fit(self.x(), self.y())
    }

    /// Spline through `(X, Y)` weighted by the Y band
    pub fn weighted_correction(&self, corrector: &SplineCorrector) -> Result<BSplineCorrection> {
        corrector.fit_band(self.x(), &self.y)
    }

    /// Piecewise linear interpolant through `(X, Y)`
    pub fn linear_correction(&self, extrapolation: Extrapolation) -> Result<BSplineCorrection> {
        linear_interpolant(self.x(), self.y(), extrapolation)
    }

    /// Splines through the lower and upper Y edges
    pub fn band_correction(&self, corrector: &SplineCorrector) -> Result<BandCorrection> {
        BandCorrection::fit(self.x(), &self.y, corrector)
    }
}

fn check_samples(simul: &[f64], data: &[f64]) -> Result<()> {
    sample::check_finite(simul, "simul")?;
    sample::check_finite(data, "data")?;
    sample::check_min_len(simul, 2)?;
    sample::check_min_len(data, 2)
}

fn check_feasible(start: f64, end: f64, n: usize) -> Result<()> {
    let (min_allowed, max_allowed) = feasible_range(n);
    if start < min_allowed || end > max_allowed {
        return Err(Error::RangeTooExtreme {
            start,
            end,
            n,
            min_allowed,
            max_allowed,
        });
    }
    Ok(())
}
