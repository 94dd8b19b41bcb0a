//! Corrections carrying their own uncertainty band

use crate::correction::{BSplineCorrection, Correction};
use crate::fit::SplineCorrector;
use qm_core::{Error, QuantileBand, Result};

/// Separate splines through the lower and upper band edges
///
/// The nominal correction is the average of the two edge splines, so it
/// always sits halfway between them.
#[derive(Debug, Clone, PartialEq)]
pub struct BandCorrection {
    down: BSplineCorrection,
    up: BSplineCorrection,
}

impl BandCorrection {
    /// Fit `corrector` through `(x, band.down)` and `(x, band.up)`
    pub fn fit(x: &[f64], band: &QuantileBand, corrector: &SplineCorrector) -> Result<Self> {
        if band.len() != x.len() {
            return Err(Error::size_mismatch(x.len(), band.len(), "band correction"));
        }
        Ok(Self {
            down: corrector.fit(x, band.down())?,
            up: corrector.fit(x, band.up())?,
        })
    }

    /// Build from two already fitted edge corrections
    pub fn from_edges(down: BSplineCorrection, up: BSplineCorrection) -> Self {
        Self { down, up }
    }

    pub fn down(&self) -> &BSplineCorrection {
        &self.down
    }

    pub fn up(&self) -> &BSplineCorrection {
        &self.up
    }

    /// `(down(x) + up(x)) / 2`
    pub fn nominal(&self, x: f64) -> Result<f64> {
        Ok(0.5 * (self.down.eval(x)? + self.up.eval(x)?))
    }

    /// Band of corrected values at every input
    ///
    /// Where the edge splines cross, the band edges are swapped so that
    /// `down <= nominal <= up` holds.
    pub fn eval_band(&self, xs: &[f64]) -> Result<QuantileBand> {
        let mut nominal = Vec::with_capacity(xs.len());
        let mut down = Vec::with_capacity(xs.len());
        let mut up = Vec::with_capacity(xs.len());
        for &x in xs {
            let d = self.down.eval(x)?;
            let u = self.up.eval(x)?;
            // Nan extrapolation policy
            if d.is_nan() || u.is_nan() {
                return Err(Error::Domain(format!(
                    "band correction undefined at {x}, outside its domain"
                )));
            }
            nominal.push(0.5 * (d + u));
            down.push(d.min(u));
            up.push(d.max(u));
        }
        QuantileBand::new(nominal, down, up)
    }
}

impl Correction for BandCorrection {
    fn eval(&self, x: f64) -> Result<f64> {
        self.nominal(x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Extrapolation;
    use approx::assert_relative_eq;

    fn band() -> (Vec<f64>, QuantileBand) {
        let x: Vec<f64> = (0..10).map(|i| i as f64).collect();
        let nominal: Vec<f64> = x.iter().map(|v| 2.0 * v).collect();
        let down: Vec<f64> = x.iter().map(|v| 2.0 * v - 1.0).collect();
        let up: Vec<f64> = x.iter().map(|v| 2.0 * v + 3.0).collect();
        (x, QuantileBand::new(nominal, down, up).unwrap())
    }

    #[test]
    fn test_nominal_is_edge_average() {
        let (x, band) = band();
        let bc = BandCorrection::fit(&x, &band, &SplineCorrector::new()).unwrap();
        assert_relative_eq!(bc.down().eval(4.5).unwrap(), 8.0, epsilon = 1e-9);
        assert_relative_eq!(bc.up().eval(4.5).unwrap(), 12.0, epsilon = 1e-9);
        assert_relative_eq!(bc.nominal(4.5).unwrap(), 10.0, epsilon = 1e-9);
        assert_relative_eq!(bc.eval(4.5).unwrap(), 10.0, epsilon = 1e-9);
    }

    #[test]
    fn test_eval_band_is_ordered() {
        let (x, band) = band();
        let bc = BandCorrection::fit(&x, &band, &SplineCorrector::new().with_degree(1)).unwrap();
        let out = bc.eval_band(&[0.5, 3.0, 8.25]).unwrap();
        for i in 0..3 {
            assert!(out.down()[i] <= out.nominal()[i] && out.nominal()[i] <= out.up()[i]);
        }
        assert_relative_eq!(out.nominal()[1], 7.0, epsilon = 1e-12);
    }

    #[test]
    fn test_propagates_extrapolation_errors() {
        let (x, band) = band();
        let corrector = SplineCorrector::new().with_extrapolation(Extrapolation::Raise);
        let bc = BandCorrection::fit(&x, &band, &corrector).unwrap();
        assert!(matches!(bc.nominal(-1.0), Err(Error::OutOfDomain { .. })));

        let nan = BandCorrection::fit(
            &x,
            &band,
            &SplineCorrector::new().with_extrapolation(Extrapolation::Nan),
        )
        .unwrap();
        assert!(nan.nominal(20.0).unwrap().is_nan());
        assert!(matches!(nan.eval_band(&[20.0]), Err(Error::Domain(_))));
    }

    #[test]
    fn test_length_mismatch() {
        let (x, band) = band();
        assert!(BandCorrection::fit(&x[..5], &band, &SplineCorrector::new()).is_err());
    }
}
