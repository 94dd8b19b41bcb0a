//! Rules for resolving a fractional order-statistic position

use qm_core::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How a percentile falling between two order statistics is resolved
///
/// The position of percentage `p` in a sorted sample of size `n` is
/// `h = p / 100 * (n - 1)`. With `lo = floor(h)` and `hi = ceil(h)`:
///
/// | Rule | Value |
/// |------|-------|
/// | `Linear` | `x[lo] + (h - lo) * (x[hi] - x[lo])` |
/// | `Lower` | `x[lo]` |
/// | `Higher` | `x[hi]` |
/// | `Nearest` | `x[round(h)]`, ties to the even index |
/// | `Midpoint` | `(x[lo] + x[hi]) / 2` |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Interpolation {
    #[default]
    Linear,
    Lower,
    Higher,
    Nearest,
    Midpoint,
}

impl Interpolation {
    pub const ALL: [Interpolation; 5] = [
        Interpolation::Linear,
        Interpolation::Lower,
        Interpolation::Higher,
        Interpolation::Nearest,
        Interpolation::Midpoint,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Interpolation::Linear => "linear",
            Interpolation::Lower => "lower",
            Interpolation::Higher => "higher",
            Interpolation::Nearest => "nearest",
            Interpolation::Midpoint => "midpoint",
        }
    }

    /// Value at fractional position `h` of an ascending slice
    ///
    /// `h` must lie in `[0, n - 1]`.
    #[inline]
    pub(crate) fn resolve(&self, sorted: &[f64], h: f64) -> f64 {
        let last = sorted.len() - 1;
        let lo = (h.floor() as usize).min(last);
        let hi = (h.ceil() as usize).min(last);
        let (a, b) = (sorted[lo], sorted[hi]);
        match self {
            Interpolation::Linear => lerp(a, b, h - lo as f64),
            Interpolation::Lower => a,
            Interpolation::Higher => b,
            Interpolation::Nearest => sorted[(h.round_ties_even() as usize).min(last)],
            Interpolation::Midpoint => 0.5 * (a + b),
        }
    }
}

/// Interpolate from whichever end is closer so the result never leaves `[a, b]`
#[inline]
fn lerp(a: f64, b: f64, t: f64) -> f64 {
    let diff = b - a;
    if t < 0.5 {
        a + diff * t
    } else {
        b - diff * (1.0 - t)
    }
}

impl fmt::Display for Interpolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Interpolation {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|rule| rule.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                Error::InvalidConfiguration(format!(
                    "unknown interpolation '{s}', expected one of linear, lower, higher, nearest, midpoint"
                ))
            })
    }
}
