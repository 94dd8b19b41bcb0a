//! Core types for quantile mapping
//!
//! This crate holds the pieces every other qm crate shares:
//!
//! - **Errors**: one `Error` enum covering range, monotonicity, domain and
//!   degenerate-sample failures
//! - **Samples**: validation and moment helpers over borrowed `&[f64]`
//! - **Grids**: `PercentileGrid`, the strictly ascending target percentages
//! - **Bands**: `QuantileBand`, aligned nominal/down/up arrays
//!
//! # Example
//!
//! ```rust
//! use qm_core::{PercentileGrid, QuantileBand};
//!
//! let grid = PercentileGrid::linspace(1.0, 99.0, 50).unwrap();
//! assert_eq!(grid.len(), 50);
//!
//! let band = QuantileBand::from_edges(vec![0.5, 1.5], vec![1.5, 2.5]).unwrap();
//! assert_eq!(band.nominal(), &[1.0, 2.0]);
//! ```

pub mod band;
pub mod error;
pub mod grid;
pub mod sample;

pub use band::QuantileBand;
pub use error::{Error, Result};
pub use grid::PercentileGrid;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{Error, PercentileGrid, QuantileBand, Result};
}
