//! Evaluable correction functions

use crate::bspline::{clamped_knots, BSpline};
use crate::extrapolation::Extrapolation;
use qm_core::{Error, Result};

/// A fitted map from simulated values to corrected values
///
/// Implementations are immutable after construction, so evaluation can be
/// shared across threads.
pub trait Correction: Send + Sync {
    /// Corrected value of `x`
    fn eval(&self, x: f64) -> Result<f64>;

    /// Corrected values of every element of `xs`
    fn eval_many(&self, xs: &[f64]) -> Result<Vec<f64>> {
        xs.iter().map(|&x| self.eval(x)).collect()
    }
}

impl<C: Correction + ?Sized> Correction for &C {
    fn eval(&self, x: f64) -> Result<f64> {
        (**self).eval(x)
    }
}

impl<C: Correction + ?Sized> Correction for Box<C> {
    fn eval(&self, x: f64) -> Result<f64> {
        (**self).eval(x)
    }
}

/// Value and slope of the spline at one end of the domain
#[derive(Debug, Clone, Copy, PartialEq)]
struct Boundary {
    x: f64,
    value: f64,
    slope: f64,
}

/// B-spline correction with an extrapolation policy
#[derive(Debug, Clone, PartialEq)]
pub struct BSplineCorrection {
    spline: BSpline,
    extrapolation: Extrapolation,
    lower: Boundary,
    upper: Boundary,
}

impl BSplineCorrection {
    /// Wrap a spline; the domain is `[lower, upper]`
    pub fn new(
        spline: BSpline,
        lower: f64,
        upper: f64,
        extrapolation: Extrapolation,
    ) -> Result<Self> {
        if !(lower < upper) {
            return Err(Error::InvalidParameter(format!(
                "correction domain [{lower}, {upper}] is empty"
            )));
        }
        let boundary = |x: f64, derivative: Option<&BSpline>| Boundary {
            x,
            value: spline.eval(x),
            slope: derivative.map_or(0.0, |d| d.eval(x)),
        };
        let derivative = if spline.degree() > 0 {
            Some(spline.derivative()?)
        } else {
            None
        };
        let lower = boundary(lower, derivative.as_ref());
        let upper = boundary(upper, derivative.as_ref());
        Ok(Self {
            spline,
            extrapolation,
            lower,
            upper,
        })
    }

    pub fn spline(&self) -> &BSpline {
        &self.spline
    }

    pub fn degree(&self) -> usize {
        self.spline.degree()
    }

    pub fn knots(&self) -> &[f64] {
        self.spline.knots()
    }

    pub fn coefficients(&self) -> &[f64] {
        self.spline.coefficients()
    }

    pub fn extrapolation(&self) -> Extrapolation {
        self.extrapolation
    }

    /// Fitted input range `(x_first, x_last)`
    pub fn domain(&self) -> (f64, f64) {
        (self.lower.x, self.upper.x)
    }

    /// Same correction with another extrapolation policy
    pub fn with_extrapolation(mut self, extrapolation: Extrapolation) -> Self {
        self.extrapolation = extrapolation;
        self
    }

    /// Derivative of the correction as a new correction
    ///
    /// The derivative inherits the extrapolation policy.
    pub fn derivative(&self) -> Result<BSplineCorrection> {
        BSplineCorrection::new(
            self.spline.derivative()?,
            self.lower.x,
            self.upper.x,
            self.extrapolation,
        )
    }

    fn outside(&self, x: f64, edge: &Boundary) -> Result<f64> {
        match self.extrapolation {
            Extrapolation::Raise => Err(Error::OutOfDomain {
                x,
                lower: self.lower.x,
                upper: self.upper.x,
            }),
            Extrapolation::Clamp => Ok(edge.value),
            Extrapolation::Linear => Ok(edge.value + edge.slope * (x - edge.x)),
            Extrapolation::Polynomial => Ok(self.spline.eval(x)),
            Extrapolation::Nan => Ok(f64::NAN),
        }
    }
}

impl Correction for BSplineCorrection {
    fn eval(&self, x: f64) -> Result<f64> {
        if x.is_nan() {
            return Err(Error::NonFinite("correction input"));
        }
        if x < self.lower.x {
            self.outside(x, &self.lower)
        } else if x > self.upper.x {
            self.outside(x, &self.upper)
        } else {
            Ok(self.spline.eval(x))
        }
    }
}

/// Piecewise linear interpolant through `(x[i], y[i])`
///
/// `x` must be strictly increasing with at least two points.
pub fn linear_interpolant(
    x: &[f64],
    y: &[f64],
    extrapolation: Extrapolation,
) -> Result<BSplineCorrection> {
    crate::fit::validate_points(x, y, 1)?;
    let m = x.len();
    // Degree-1 B-spline coefficients are the ordinates at the knots
    let knots = clamped_knots(x[0], x[m - 1], &x[1..m - 1], 1);
    let spline = BSpline::new(knots, y.to_vec(), 1)?;
    BSplineCorrection::new(spline, x[0], x[m - 1], extrapolation)
}
