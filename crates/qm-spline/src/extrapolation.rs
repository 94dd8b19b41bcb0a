//! Behaviour of a correction outside its fitted domain

use qm_core::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// What to return for inputs outside `[x_first, x_last]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Extrapolation {
    /// Fail with `Error::OutOfDomain`
    Raise,
    /// Value at the nearest boundary
    Clamp,
    /// Tangent line at the nearest boundary
    Linear,
    /// Continue the end polynomial pieces
    #[default]
    Polynomial,
    /// Return NaN
    Nan,
}

impl Extrapolation {
    pub const ALL: [Extrapolation; 5] = [
        Extrapolation::Raise,
        Extrapolation::Clamp,
        Extrapolation::Linear,
        Extrapolation::Polynomial,
        Extrapolation::Nan,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Extrapolation::Raise => "raise",
            Extrapolation::Clamp => "clamp",
            Extrapolation::Linear => "linear",
            Extrapolation::Polynomial => "polynomial",
            Extrapolation::Nan => "nan",
        }
    }
}

impl fmt::Display for Extrapolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Extrapolation {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|e| e.name() == wanted)
            .ok_or_else(|| {
                Error::InvalidConfiguration(format!(
                    "unknown extrapolation '{s}', expected one of raise, clamp, linear, polynomial, nan"
                ))
            })
    }
}
