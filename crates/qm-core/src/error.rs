//! Error types for quantile mapping
//!
//! Provides a unified error type for all qm crates.

use thiserror::Error;

/// Core error type for quantile mapping operations
#[derive(Error, Debug)]
pub enum Error {
    /// Percentile or probability outside its valid range
    #[error("Invalid range: {value} must be in [{min}, {max}]")]
    InvalidRange { value: f64, min: f64, max: f64 },

    /// Requested grid bounds violate the 1/n feasibility margin
    #[error(
        "Percentile range [{start}, {end}] too extreme for {n} samples: \
         allowed range is [{min_allowed}, {max_allowed}]"
    )]
    RangeTooExtreme {
        start: f64,
        end: f64,
        n: usize,
        min_allowed: f64,
        max_allowed: f64,
    },

    /// Abscissae passed to a fit are not strictly increasing
    #[error("Input not strictly increasing at index {index}: {previous} >= {current}")]
    NonMonotonicInput {
        index: usize,
        previous: f64,
        current: f64,
    },

    /// Distribution CDF/PPF evaluated outside its domain
    #[error("Domain error: {0}")]
    Domain(String),

    /// Zero variance (or zero spread) where a ratio is required
    #[error("Degenerate sample: {0}")]
    DegenerateSample(String),

    /// Unrecognised configuration value
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Invalid parameter provided to a function
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Empty sample
    #[error("Cannot compute {0} of an empty sample")]
    EmptySample(&'static str),

    /// Insufficient data for the requested operation
    #[error("Insufficient data: expected at least {expected} samples, got {actual}")]
    InsufficientData { expected: usize, actual: usize },

    /// NaN or infinite input values
    #[error("{0} contains NaN or infinite values")]
    NonFinite(&'static str),

    /// Correction function evaluated outside its fitted domain
    #[error("Value {x} outside fitted domain [{lower}, {upper}]")]
    OutOfDomain { x: f64, lower: f64, upper: f64 },

    /// Long-running computation stopped through its cancellation flag
    #[error("Computation cancelled after {completed} of {requested} trials")]
    Cancelled { completed: usize, requested: usize },

    /// Numerical computation error
    #[error("Numerical error: {0}")]
    Numerical(String),

    /// Lookup table parse or write error
    #[error("Table error: {0}")]
    Table(String),

    /// Configuration document could not be parsed
    #[error("Config error: {0}")]
    Config(String),

    /// IO error (for file operations)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Other errors
    #[error("Other error: {0}")]
    Other(#[from] anyhow::Error),
}

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Error for a percentage outside `[0, 100]`
    pub fn invalid_percentage(p: f64) -> Self {
        Self::InvalidRange {
            value: p,
            min: 0.0,
            max: 100.0,
        }
    }

    /// Error for a probability outside `[0, 1]`
    pub fn invalid_probability(q: f64) -> Self {
        Self::InvalidRange {
            value: q,
            min: 0.0,
            max: 1.0,
        }
    }

    /// Create an error for size mismatch
    pub fn size_mismatch(expected: usize, actual: usize, context: &str) -> Self {
        Self::InvalidParameter(format!(
            "Size mismatch in {context}: expected {expected}, got {actual}"
        ))
    }

    /// Check that a percentage lies in `[0, 100]`
    pub fn check_percentage(p: f64) -> Result<()> {
        if !(0.0..=100.0).contains(&p) {
            return Err(Self::invalid_percentage(p));
        }
        Ok(())
    }

    /// Check that a probability lies in `[0, 1]`
    pub fn check_probability(q: f64) -> Result<()> {
        if !(0.0..=1.0).contains(&q) {
            return Err(Self::invalid_probability(q));
        }
        Ok(())
    }
}
