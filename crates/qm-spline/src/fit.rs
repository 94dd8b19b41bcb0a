//! Spline fitting through q-q points

use crate::bspline::{clamped_knots, BSpline, MAX_DEGREE};
use crate::correction::BSplineCorrection;
use crate::extrapolation::Extrapolation;
use crate::weights::band_weights;
use nalgebra::{DMatrix, DVector};
use qm_core::{Error, QuantileBand, Result};
use tracing::{debug, instrument};

/// Singular values below this (relative) are treated as zero
const SVD_EPS: f64 = 1e-12;

/// How closely the spline follows the points
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Smoothing {
    /// Pass through every point
    Interpolate,
    /// Weighted least-squares spline with this many interior knots
    InteriorKnots(usize),
    /// Add knots until the weighted residual sum of squares drops to `s`
    ///
    /// `None` uses `m - sqrt(2 m)`, suitable when the weights are inverse
    /// standard deviations.
    Residual(Option<f64>),
}

/// Builder for spline corrections
///
/// # Example
/// ```rust
/// use qm_spline::{Correction, Extrapolation, SplineCorrector};
///
/// let x: Vec<f64> = (0..10).map(|i| i as f64).collect();
/// let y: Vec<f64> = x.iter().map(|v| 2.0 * v + 1.0).collect();
/// let correction = SplineCorrector::new()
///     .with_degree(3)
///     .with_extrapolation(Extrapolation::Linear)
///     .fit(&x, &y)
///     .unwrap();
/// assert!((correction.eval(4.5).unwrap() - 10.0).abs() < 1e-9);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SplineCorrector {
    degree: usize,
    extrapolation: Extrapolation,
    smoothing: Option<Smoothing>,
    weights: Option<Vec<f64>>,
}

impl Default for SplineCorrector {
    fn default() -> Self {
        Self::new()
    }
}

impl SplineCorrector {
    /// Cubic spline, polynomial extrapolation, no weights
    pub fn new() -> Self {
        Self {
            degree: 3,
            extrapolation: Extrapolation::default(),
            smoothing: None,
            weights: None,
        }
    }

    /// Spline degree in `1..=5`, checked when fitting
    pub fn with_degree(mut self, degree: usize) -> Self {
        self.degree = degree;
        self
    }

    pub fn with_extrapolation(mut self, extrapolation: Extrapolation) -> Self {
        self.extrapolation = extrapolation;
        self
    }

    pub fn with_smoothing(mut self, smoothing: Smoothing) -> Self {
        self.smoothing = Some(smoothing);
        self
    }

    /// Per-point weights (larger means the spline stays closer to the point)
    pub fn with_weights(mut self, weights: Vec<f64>) -> Self {
        self.weights = Some(weights);
        self
    }

    pub fn degree(&self) -> usize {
        self.degree
    }

    pub fn extrapolation(&self) -> Extrapolation {
        self.extrapolation
    }

    pub fn weights(&self) -> Option<&[f64]> {
        self.weights.as_deref()
    }

    /// Smoothing used by `fit`: `Interpolate` without weights,
    /// `Residual(None)` with weights, unless set explicitly
    pub fn smoothing(&self) -> Smoothing {
        self.smoothing.unwrap_or(if self.weights.is_some() {
            Smoothing::Residual(None)
        } else {
            Smoothing::Interpolate
        })
    }

    /// Fit a spline through the nominal values of `band`, weighted by
    /// [`barlow_weights`](crate::barlow_weights) of its uncertainties
    pub fn fit_band(&self, x: &[f64], band: &QuantileBand) -> Result<BSplineCorrection> {
        let weights = band_weights(band)?;
        self.clone().with_weights(weights).fit(x, band.nominal())
    }

    /// Fit the correction `x -> y`
    #[instrument(skip(self, x, y), fields(m = x.len(), degree = self.degree, extrapolation = %self.extrapolation))]
    pub fn fit(&self, x: &[f64], y: &[f64]) -> Result<BSplineCorrection> {
        let k = self.degree;
        if !(1..=MAX_DEGREE).contains(&k) {
            return Err(Error::InvalidParameter(format!(
                "spline degree must be in 1..={MAX_DEGREE}, got {k}"
            )));
        }
        validate_points(x, y, k)?;
        let m = x.len();
        let weights = match &self.weights {
            Some(w) => {
                validate_weights(w, m)?;
                w.clone()
            }
            None => vec![1.0; m],
        };
        let max_interior = m - k - 1;

        let spline = match self.smoothing() {
            Smoothing::Interpolate => {
                let interior = interpolation_knots(x, k);
                least_squares(x, y, &weights, &interior, k)?
            }
            Smoothing::InteriorKnots(n) => {
                let interior = if n >= max_interior {
                    interpolation_knots(x, k)
                } else {
                    rank_knots(x, n)
                };
                least_squares(x, y, &weights, &interior, k)?
            }
            Smoothing::Residual(target) => {
                let target = target.unwrap_or_else(|| {
                    let mf = m as f64;
                    (mf - (2.0 * mf).sqrt()).max(0.0)
                });
                if !(target.is_finite() && target >= 0.0) {
                    return Err(Error::InvalidParameter(format!(
                        "smoothing target must be finite and non-negative, got {target}"
                    )));
                }
                fit_to_residual(x, y, &weights, k, target)?
            }
        };
        debug!(
            "Fitted degree {} spline with {} coefficients",
            k,
            spline.coefficients().len()
        );
        BSplineCorrection::new(spline, x[0], x[m - 1], self.extrapolation)
    }
}

/// Check lengths, finiteness, point count and strict ordering of `x`
pub(crate) fn validate_points(x: &[f64], y: &[f64], degree: usize) -> Result<()> {
    if x.len() != y.len() {
        return Err(Error::size_mismatch(x.len(), y.len(), "spline ordinates"));
    }
    let needed = (degree + 1).max(2);
    if x.len() < needed {
        return Err(Error::InsufficientData {
            expected: needed,
            actual: x.len(),
        });
    }
    if x.iter().any(|v| !v.is_finite()) {
        return Err(Error::NonFinite("spline abscissae"));
    }
    if y.iter().any(|v| !v.is_finite()) {
        return Err(Error::NonFinite("spline ordinates"));
    }
    if let Some(i) = x.windows(2).position(|w| w[1] <= w[0]) {
        return Err(Error::NonMonotonicInput {
            index: i + 1,
            previous: x[i],
            current: x[i + 1],
        });
    }
    Ok(())
}

fn validate_weights(weights: &[f64], m: usize) -> Result<()> {
    if weights.len() != m {
        return Err(Error::size_mismatch(m, weights.len(), "spline weights"));
    }
    if let Some(w) = weights.iter().find(|w| !(w.is_finite() && **w > 0.0)) {
        return Err(Error::InvalidParameter(format!(
            "spline weights must be finite and positive, got {w}"
        )));
    }
    Ok(())
}

/// Interior knots for an interpolating spline of degree `k`
///
/// Odd degrees put knots on the interior data points, even degrees between
/// them, which keeps the collocation system non-singular.
fn interpolation_knots(x: &[f64], k: usize) -> Vec<f64> {
    let count = x.len() - k - 1;
    if k % 2 == 1 {
        let offset = (k + 1) / 2;
        x[offset..offset + count].to_vec()
    } else {
        let offset = k / 2;
        (0..count)
            .map(|j| 0.5 * (x[offset + j] + x[offset + j + 1]))
            .collect()
    }
}

/// `n` interior knots at evenly spaced ranks of `x`
fn rank_knots(x: &[f64], n: usize) -> Vec<f64> {
    let last = (x.len() - 1) as f64;
    (1..=n)
        .map(|j| {
            let pos = j as f64 * last / (n + 1) as f64;
            let lo = pos.floor() as usize;
            let frac = pos - lo as f64;
            if frac == 0.0 {
                x[lo]
            } else {
                x[lo] + frac * (x[lo + 1] - x[lo])
            }
        })
        .collect()
}

/// Weighted least-squares spline on the given interior knots
fn least_squares(
    x: &[f64],
    y: &[f64],
    weights: &[f64],
    interior: &[f64],
    k: usize,
) -> Result<BSpline> {
    let m = x.len();
    let knots = clamped_knots(x[0], x[m - 1], interior, k);
    let ncoef = interior.len() + k + 1;
    // Placeholder coefficients so the basis can be evaluated
    let shape = BSpline::new(knots.clone(), vec![0.0; ncoef], k)?;

    let mut design = DMatrix::<f64>::zeros(m, ncoef);
    let mut basis = [0.0; MAX_DEGREE + 1];
    for i in 0..m {
        let mu = shape.span(x[i]);
        shape.basis(mu, x[i], &mut basis);
        for r in 0..=k {
            design[(i, mu - k + r)] = weights[i] * basis[r];
        }
    }
    let rhs = DVector::from_iterator(m, y.iter().zip(weights).map(|(v, w)| v * w));

    let solution = if m == ncoef {
        match design.clone().lu().solve(&rhs) {
            Some(c) => c,
            None => solve_svd(design, &rhs)?,
        }
    } else {
        let gram = design.transpose() * &design;
        let moment = design.transpose() * &rhs;
        match gram.cholesky() {
            Some(chol) => chol.solve(&moment),
            None => solve_svd(design, &rhs)?,
        }
    };

    if solution.iter().any(|c| !c.is_finite()) {
        return Err(Error::Numerical(
            "spline coefficients are not finite".to_string(),
        ));
    }
    BSpline::new(knots, solution.as_slice().to_vec(), k)
}

fn solve_svd(design: DMatrix<f64>, rhs: &DVector<f64>) -> Result<DVector<f64>> {
    design
        .svd(true, true)
        .solve(rhs, SVD_EPS)
        .map_err(|e| Error::Numerical(format!("spline least squares failed: {e}")))
}

fn weighted_ssr(spline: &BSpline, x: &[f64], y: &[f64], weights: &[f64]) -> f64 {
    x.iter()
        .zip(y)
        .zip(weights)
        .map(|((&xi, &yi), &wi)| {
            let r = wi * (yi - spline.eval(xi));
            r * r
        })
        .sum()
}

/// Grow the knot count until the weighted residual reaches `target`
fn fit_to_residual(
    x: &[f64],
    y: &[f64],
    weights: &[f64],
    k: usize,
    target: f64,
) -> Result<BSpline> {
    let max_interior = x.len() - k - 1;
    let mut interior = 0;
    loop {
        if interior >= max_interior {
            debug!("Residual target {} needs an interpolating spline", target);
            return least_squares(x, y, weights, &interpolation_knots(x, k), k);
        }
        let spline = least_squares(x, y, weights, &rank_knots(x, interior), k)?;
        let ssr = weighted_ssr(&spline, x, y, weights);
        debug!("{} interior knots: weighted SSR {:.6} (target {:.6})", interior, ssr, target);
        if ssr <= target {
            return Ok(spline);
        }
        interior = (interior * 2).max(1);
    }
}
