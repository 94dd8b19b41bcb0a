//! Continuous corrections fitted through q-q points
//!
//! - [`SplineCorrector`]: weighted interpolating or smoothing B-splines of
//!   degree 1 to 5
//! - [`barlow_weights`]: per-point weights from asymmetric uncertainties
//! - [`Extrapolation`]: behaviour outside the fitted range
//! - [`BandCorrection`]: edge splines through a band, nominal is their mean
//!
//! Every fitted object implements [`Correction`] and is immutable, so it
//! can be evaluated concurrently.
//!
//! # Example
//!
//! ```rust
//! use qm_spline::{linear_interpolant, Correction, Extrapolation};
//!
//! let c = linear_interpolant(&[0.0, 1.0, 2.0], &[0.0, 10.0, 30.0], Extrapolation::Clamp).unwrap();
//! assert_eq!(c.eval(1.5).unwrap(), 20.0);
//! assert_eq!(c.eval(5.0).unwrap(), 30.0);
//! ```

pub mod band;
pub mod bspline;
pub mod correction;
pub mod extrapolation;
pub mod fit;
pub mod weights;

pub use band::BandCorrection;
pub use bspline::{BSpline, MAX_DEGREE};
pub use correction::{linear_interpolant, BSplineCorrection, Correction};
pub use extrapolation::Extrapolation;
pub use fit::{Smoothing, SplineCorrector};
pub use weights::{band_weights, barlow_weights};

pub use qm_core::{Error, Result};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{
        BandCorrection, Correction, Error, Extrapolation, Result, Smoothing, SplineCorrector,
    };
}
