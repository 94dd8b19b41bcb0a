//! Bootstrap uncertainty bands for empirical percentiles
//!
//! A [`BootstrapEngine`] resamples a sample `trials` times, computes the
//! requested percentiles of every resample and reduces each column of the
//! resulting [`BootstrapMatrix`] to a percentile interval.
//!
//! Trials are seeded independently from one base seed, so a seeded run gives
//! the same band whether it executes sequentially or on the rayon pool
//! (`parallel` feature).

pub mod engine;
pub mod matrix;
pub mod resample;

pub use engine::{trial_seed, BootstrapEngine, DEFAULT_CONFIDENCE_LEVEL, DEFAULT_TRIALS};
pub use matrix::BootstrapMatrix;
pub use resample::{resample_into, smooth_resample_into, Resampling, SmoothKernel};

pub use qm_core::{Error, Result};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{BootstrapEngine, Error, Resampling, Result};
}
