//! Quantile mapping between a simulated and a reference sample
//!
//! - [`QqMap`]: paired percentiles of both samples on a common grid, with
//!   bootstrap or analytic uncertainty bands
//! - [`parametric_qm`]: the closed-form map between two known distributions
//! - [`variance_scaling`]: shift and scale correction
//! - [`table`]: plain-text lookup tables
//! - [`diagnostics`]: Kolmogorov-Smirnov test and straight-line fit
//!
//! # Example
//!
//! ```rust
//! use qm_map::{QqMap, QqMapConfig, Uncertainty};
//! use qm_spline::{Correction, SplineCorrector};
//!
//! let simul: Vec<f64> = (0..1000).map(|i| 1.0 + 0.002 * i as f64).collect();
//! let data: Vec<f64> = (0..1000).map(|i| 0.001 * i as f64).collect();
//! let config = QqMapConfig::new()
//!     .with_range(1.0, 99.0)
//!     .with_points(25)
//!     .with_uncertainty(Uncertainty::None);
//! let map = QqMap::build(&simul, &data, &config).unwrap();
//! let correction = map.correction(&SplineCorrector::new()).unwrap();
//! assert!((correction.eval(2.0).unwrap() - 0.5).abs() < 1e-9);
//! ```

pub mod config;
pub mod diagnostics;
pub mod distribution;
pub mod parametric;
pub mod qq_map;
pub mod scaling;
pub mod table;

pub use config::{BootstrapTarget, QqMapConfig, Uncertainty, UncertaintyMode, DEFAULT_NUM_POINTS};
pub use diagnostics::{kolmogorov_survival, ks_test, linear_fit, KsResult, LinearFit};
pub use distribution::{EmpiricalDistribution, LogNormal, QuantileFunction, Shifted};
pub use parametric::{parametric_qm, parametric_qm_many};
pub use qq_map::{feasible_range, QqMap};
pub use scaling::variance_scaling;
pub use table::{write_qq_map, Delimiter, Layout, Table};

pub use qm_core::{Error, Result};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{
        parametric_qm, variance_scaling, BootstrapTarget, Error, QqMap, QqMapConfig,
        QuantileFunction, Result, Uncertainty,
    };
}
