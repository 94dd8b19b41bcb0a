//! Empirical quantile estimation
//!
//! This crate provides the percentile machinery used to build q-q maps:
//!
//! - **Percentiles**: order-statistic percentiles with five interpolation
//!   rules (`linear`, `lower`, `higher`, `nearest`, `midpoint`)
//! - **Order-statistic intervals**: closed-form confidence bounds for a
//!   quantile from the binomial normal approximation
//!
//! # Example
//!
//! ```rust
//! use qm_quantile::{order_statistic_interval, percentiles, Interpolation, DEFAULT_SIGMA};
//!
//! let data: Vec<f64> = (0..100).map(|x| x as f64).collect();
//! let median = percentiles(&data, &[50.0], Interpolation::Linear).unwrap();
//! assert_eq!(median, vec![49.5]);
//!
//! let (lower, upper) = order_statistic_interval(&data, &[0.5], DEFAULT_SIGMA).unwrap();
//! assert!(lower[0] < median[0] && median[0] < upper[0]);
//! ```

pub mod confidence;
pub mod interpolation;
pub mod percentile;
pub mod traits;

pub use confidence::{
    order_statistic_indices, order_statistic_interval, sigma_for_confidence, DEFAULT_SIGMA,
};
pub use interpolation::Interpolation;
pub use percentile::{percentile, percentiles, percentiles_sorted, Percentile};
pub use traits::QuantileEstimator;

pub use qm_core::{Error, Result};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{percentiles, Error, Interpolation, Percentile, QuantileEstimator, Result};
}
