//! Quantile mapping with bootstrap uncertainty
//!
//! Corrects a simulated sample so that its distribution matches a reference
//! ("data") sample. The workspace is split into:
//!
//! - [`core`]: errors, percentile grids, uncertainty bands
//! - [`quantile`]: empirical percentiles and order-statistic intervals
//! - [`bootstrap`]: resampled percentile bands, optionally on rayon
//! - [`spline`]: weighted B-spline corrections and extrapolation policies
//! - [`map`]: q-q maps, parametric mapping, variance scaling, tables and
//!   goodness-of-fit diagnostics
//!
//! # Example
//!
//! ```rust
//! use quantile_mapping::prelude::*;
//!
//! let simul: Vec<f64> = (0..400).map(|i| 2.0 * i as f64 + 1.0).collect();
//! let data: Vec<f64> = (0..400).map(|i| i as f64).collect();
//!
//! let config = QqMapConfig::new()
//!     .with_range(5.0, 95.0)
//!     .with_points(20)
//!     .with_uncertainty(Uncertainty::bootstrap(BootstrapTarget::Data, 200).with_seed(7));
//! let map = QqMap::build(&simul, &data, &config).unwrap();
//!
//! let correction = map.weighted_correction(&SplineCorrector::new()).unwrap();
//! let corrected = correction.eval(201.0).unwrap();
//! assert!((corrected - 100.0).abs() < 5.0);
//! ```

pub use qm_bootstrap as bootstrap;
pub use qm_core as core;
pub use qm_map as map;
pub use qm_quantile as quantile;
pub use qm_spline as spline;

pub use qm_bootstrap::{BootstrapEngine, Resampling};
pub use qm_core::{Error, PercentileGrid, QuantileBand, Result};
pub use qm_map::{
    feasible_range, ks_test, linear_fit, parametric_qm, variance_scaling, BootstrapTarget,
    Delimiter, Layout, QqMap, QqMapConfig, QuantileFunction, Table, Uncertainty,
};
pub use qm_quantile::{percentiles, Interpolation};
pub use qm_spline::{
    BandCorrection, BSplineCorrection, Correction, Extrapolation, Smoothing, SplineCorrector,
};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{
        parametric_qm, variance_scaling, BootstrapTarget, Correction, Error, Extrapolation,
        Interpolation, QqMap, QqMapConfig, QuantileFunction, Result, SplineCorrector,
        Uncertainty,
    };
}
