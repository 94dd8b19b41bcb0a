//! Configuration of q-q map construction

use qm_bootstrap::{Resampling, DEFAULT_CONFIDENCE_LEVEL, DEFAULT_TRIALS};
use qm_core::{Error, Result};
use qm_quantile::{Interpolation, DEFAULT_SIGMA};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Default number of grid points
pub const DEFAULT_NUM_POINTS: usize = 500;

/// Which samples the bootstrap runs on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BootstrapTarget {
    /// Only `data`; X keeps a zero-width band
    Data,
    /// `data` for Y and `simul` for the X band
    Both,
}

impl FromStr for BootstrapTarget {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "data" => Ok(BootstrapTarget::Data),
            "both" => Ok(BootstrapTarget::Both),
            other => Err(Error::InvalidConfiguration(format!(
                "unknown bootstrap target '{other}', expected 'data' or 'both'"
            ))),
        }
    }
}

/// Uncertainty mode name, as used in configuration files
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UncertaintyMode {
    None,
    Data,
    Both,
    Analytic,
}

impl UncertaintyMode {
    pub fn name(&self) -> &'static str {
        match self {
            UncertaintyMode::None => "none",
            UncertaintyMode::Data => "data",
            UncertaintyMode::Both => "both",
            UncertaintyMode::Analytic => "analytic",
        }
    }
}

impl fmt::Display for UncertaintyMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for UncertaintyMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(UncertaintyMode::None),
            "data" => Ok(UncertaintyMode::Data),
            "both" => Ok(UncertaintyMode::Both),
            "analytic" => Ok(UncertaintyMode::Analytic),
            other => Err(Error::InvalidConfiguration(format!(
                "unknown uncertainty mode '{other}', expected one of none, data, both, analytic"
            ))),
        }
    }
}

/// How the bands of a q-q map are produced
#[derive(Debug, Clone, PartialEq)]
pub enum Uncertainty {
    /// Direct percentiles, zero-width bands
    None,
    /// Percentile bootstrap
    Bootstrap {
        target: BootstrapTarget,
        trials: usize,
        resampling: Resampling,
        confidence_level: f64,
        seed: Option<u64>,
    },
    /// Order-statistic interval with normal quantile `sigma`
    Analytic { sigma: f64 },
}

impl Default for Uncertainty {
    fn default() -> Self {
        Uncertainty::bootstrap(BootstrapTarget::Data, DEFAULT_TRIALS)
    }
}

impl Uncertainty {
    /// Plain bootstrap at the default confidence level, unseeded
    pub fn bootstrap(target: BootstrapTarget, trials: usize) -> Self {
        Uncertainty::Bootstrap {
            target,
            trials,
            resampling: Resampling::Plain,
            confidence_level: DEFAULT_CONFIDENCE_LEVEL,
            seed: None,
        }
    }

    /// Analytic interval at roughly 95% confidence
    pub fn analytic() -> Self {
        Uncertainty::Analytic {
            sigma: DEFAULT_SIGMA,
        }
    }

    /// Set the bootstrap seed; other modes are unchanged
    pub fn with_seed(mut self, new_seed: u64) -> Self {
        if let Uncertainty::Bootstrap { seed, .. } = &mut self {
            *seed = Some(new_seed);
        }
        self
    }

    /// Set the bootstrap resampling scheme; other modes are unchanged
    pub fn with_resampling(mut self, scheme: Resampling) -> Self {
        if let Uncertainty::Bootstrap { resampling, .. } = &mut self {
            *resampling = scheme;
        }
        self
    }

    pub fn mode(&self) -> UncertaintyMode {
        match self {
            Uncertainty::None => UncertaintyMode::None,
            Uncertainty::Bootstrap {
                target: BootstrapTarget::Data,
                ..
            } => UncertaintyMode::Data,
            Uncertainty::Bootstrap {
                target: BootstrapTarget::Both,
                ..
            } => UncertaintyMode::Both,
            Uncertainty::Analytic { .. } => UncertaintyMode::Analytic,
        }
    }
}

/// Parameters of [`QqMap::build`](crate::QqMap::build)
///
/// `start` and `end` default to the widest range the sample sizes allow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawQqMapConfig", into = "RawQqMapConfig")]
pub struct QqMapConfig {
    pub start: Option<f64>,
    pub end: Option<f64>,
    pub num_points: usize,
    pub interpolation: Interpolation,
    pub uncertainty: Uncertainty,
}

impl Default for QqMapConfig {
    fn default() -> Self {
        Self {
            start: None,
            end: None,
            num_points: DEFAULT_NUM_POINTS,
            interpolation: Interpolation::Linear,
            uncertainty: Uncertainty::default(),
        }
    }
}

impl QqMapConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Percentage range of the grid
    pub fn with_range(mut self, start: f64, end: f64) -> Self {
        self.start = Some(start);
        self.end = Some(end);
        self
    }

    pub fn with_points(mut self, num_points: usize) -> Self {
        self.num_points = num_points;
        self
    }

    pub fn with_interpolation(mut self, interpolation: Interpolation) -> Self {
        self.interpolation = interpolation;
        self
    }

    pub fn with_uncertainty(mut self, uncertainty: Uncertainty) -> Self {
        self.uncertainty = uncertainty;
        self
    }

    /// Parse a JSON document; missing fields take their defaults
    ///
    /// ```rust
    /// use qm_map::{QqMapConfig, UncertaintyMode};
    ///
    /// let config = QqMapConfig::from_json_str(r#"{"start": 1, "end": 99, "mode": "analytic"}"#).unwrap();
    /// assert_eq!(config.uncertainty.mode(), UncertaintyMode::Analytic);
    /// assert_eq!(config.num_points, 500);
    /// ```
    pub fn from_json_str(json: &str) -> Result<Self> {
        let raw: RawQqMapConfig =
            serde_json::from_str(json).map_err(|e| Error::Config(e.to_string()))?;
        Self::try_from(raw)
    }

    pub fn to_json_string(&self) -> Result<String> {
        serde_json::to_string_pretty(&RawQqMapConfig::from(self.clone()))
            .map_err(|e| Error::Config(e.to_string()))
    }
}

/// Flat on-disk form of [`QqMapConfig`]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RawQqMapConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    start: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    end: Option<f64>,
    num_points: usize,
    interpolation: String,
    mode: String,
    trials: usize,
    resampling: String,
    confidence_level: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    seed: Option<u64>,
    sigma: f64,
}

impl Default for RawQqMapConfig {
    fn default() -> Self {
        Self {
            start: None,
            end: None,
            num_points: DEFAULT_NUM_POINTS,
            interpolation: Interpolation::Linear.to_string(),
            mode: UncertaintyMode::Data.to_string(),
            trials: DEFAULT_TRIALS,
            resampling: Resampling::Plain.to_string(),
            confidence_level: DEFAULT_CONFIDENCE_LEVEL,
            seed: None,
            sigma: DEFAULT_SIGMA,
        }
    }
}

impl TryFrom<RawQqMapConfig> for QqMapConfig {
    type Error = Error;

    fn try_from(raw: RawQqMapConfig) -> Result<Self> {
        let interpolation = raw.interpolation.parse::<Interpolation>()?;
        let resampling = raw.resampling.parse::<Resampling>()?;
        let bootstrap = |target| Uncertainty::Bootstrap {
            target,
            trials: raw.trials,
            resampling,
            confidence_level: raw.confidence_level,
            seed: raw.seed,
        };
        let uncertainty = match raw.mode.parse::<UncertaintyMode>()? {
            UncertaintyMode::None => Uncertainty::None,
            UncertaintyMode::Data => bootstrap(BootstrapTarget::Data),
            UncertaintyMode::Both => bootstrap(BootstrapTarget::Both),
            UncertaintyMode::Analytic => Uncertainty::Analytic { sigma: raw.sigma },
        };
        Ok(Self {
            start: raw.start,
            end: raw.end,
            num_points: raw.num_points,
            interpolation,
            uncertainty,
        })
    }
}

impl From<QqMapConfig> for RawQqMapConfig {
    fn from(config: QqMapConfig) -> Self {
        let mut raw = RawQqMapConfig {
            start: config.start,
            end: config.end,
            num_points: config.num_points,
            interpolation: config.interpolation.to_string(),
            mode: config.uncertainty.mode().to_string(),
            ..RawQqMapConfig::default()
        };
        match config.uncertainty {
            Uncertainty::None => {}
            Uncertainty::Bootstrap {
                trials,
                resampling,
                confidence_level,
                seed,
                ..
            } => {
                raw.trials = trials;
                raw.resampling = resampling.to_string();
                raw.confidence_level = confidence_level;
                raw.seed = seed;
            }
            Uncertainty::Analytic { sigma } => raw.sigma = sigma,
        }
        raw
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = QqMapConfig::default();
        assert_eq!(config.num_points, 500);
        assert_eq!(config.start, None);
        assert_eq!(config.uncertainty.mode(), UncertaintyMode::Data);
        assert!(matches!(
            config.uncertainty,
            Uncertainty::Bootstrap { trials: 2000, .. }
        ));

        let empty = QqMapConfig::from_json_str("{}").unwrap();
        assert_eq!(empty, config);
    }

    #[test]
    fn test_parse_full_document() {
        let json = r#"{
            "start": 1.0,
            "end": 99.0,
            "num_points": 50,
            "interpolation": "nearest",
            "mode": "both",
            "trials": 400,
            "resampling": "smooth",
            "confidence_level": 0.68,
            "seed": 7
        }"#;
        let config = QqMapConfig::from_json_str(json).unwrap();
        assert_eq!(config.start, Some(1.0));
        assert_eq!(config.interpolation, Interpolation::Nearest);
        assert_eq!(
            config.uncertainty,
            Uncertainty::Bootstrap {
                target: BootstrapTarget::Both,
                trials: 400,
                resampling: Resampling::Smooth,
                confidence_level: 0.68,
                seed: Some(7),
            }
        );
    }

    #[test]
    fn test_unknown_mode_is_invalid_configuration() {
        assert!(matches!(
            QqMapConfig::from_json_str(r#"{"mode": "simul"}"#),
            Err(Error::InvalidConfiguration(_))
        ));
        assert!(matches!(
            "Both".parse::<UncertaintyMode>(),
            Ok(UncertaintyMode::Both)
        ));
        assert!(matches!(
            "neither".parse::<BootstrapTarget>(),
            Err(Error::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_malformed_json_is_config_error() {
        assert!(matches!(
            QqMapConfig::from_json_str("{ not json"),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            QqMapConfig::from_json_str(r#"{"points": 3}"#),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_json_round_trip() {
        let config = QqMapConfig::new()
            .with_range(2.0, 98.0)
            .with_points(30)
            .with_uncertainty(Uncertainty::analytic());
        let json = config.to_json_string().unwrap();
        assert_eq!(QqMapConfig::from_json_str(&json).unwrap(), config);

        let serde_value = serde_json::to_value(&config).unwrap();
        assert_eq!(serde_value["mode"], "analytic");
        let back: QqMapConfig = serde_json::from_value(serde_value).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn test_uncertainty_helpers() {
        let u = Uncertainty::bootstrap(BootstrapTarget::Data, 10)
            .with_seed(3)
            .with_resampling(Resampling::Smooth);
        assert!(matches!(
            u,
            Uncertainty::Bootstrap {
                seed: Some(3),
                resampling: Resampling::Smooth,
                ..
            }
        ));
        assert_eq!(Uncertainty::None.with_seed(3), Uncertainty::None);
    }
}
