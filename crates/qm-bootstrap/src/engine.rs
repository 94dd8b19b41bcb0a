//! Bootstrap engine for percentile uncertainty

use crate::matrix::BootstrapMatrix;
use crate::resample::{resample_into, smooth_resample_into, Resampling, SmoothKernel};
use qm_core::{sample, Error, PercentileGrid, QuantileBand, Result};
use qm_quantile::{Interpolation, Percentile, QuantileEstimator};
use rand::prelude::*;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// Default number of bootstrap trials
pub const DEFAULT_TRIALS: usize = 2000;

/// Default two-sided confidence level of the percentile interval
pub const DEFAULT_CONFIDENCE_LEVEL: f64 = 0.95;

/// Fewer trials than this give noisy interval edges
const MIN_RECOMMENDED_TRIALS: usize = 100;

/// Independent seed for trial `trial` derived from `base` (SplitMix64)
///
/// Every trial owns its generator, so results do not depend on how trials
/// are scheduled across threads.
pub fn trial_seed(base: u64, trial: u64) -> u64 {
    let mut z = base.wrapping_add(trial.wrapping_add(1).wrapping_mul(0x9e37_79b9_7f4a_7c15));
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}

/// Percentile bootstrap over a single sample
///
/// Each trial resamples the data, computes the target percentiles, and
/// the per-column percentile interval becomes the band. The band's nominal
/// value is the interval midpoint.
///
/// # Example
/// ```rust
/// use qm_bootstrap::BootstrapEngine;
///
/// let data: Vec<f64> = (0..200).map(|x| x as f64).collect();
/// let band = BootstrapEngine::new()
///     .with_trials(500)
///     .with_seed(42)
///     .run(&data, &[25.0, 50.0, 75.0])
///     .unwrap();
/// assert!(band.down()[1] <= 99.5 && 99.5 <= band.up()[1]);
/// ```
#[derive(Debug, Clone)]
pub struct BootstrapEngine {
    trials: usize,
    resampling: Resampling,
    interpolation: Interpolation,
    confidence_level: f64,
    seed: Option<u64>,
    cancel: Option<Arc<AtomicBool>>,
    parallel: bool,
}

impl Default for BootstrapEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl BootstrapEngine {
    pub fn new() -> Self {
        Self {
            trials: DEFAULT_TRIALS,
            resampling: Resampling::Plain,
            interpolation: Interpolation::Linear,
            confidence_level: DEFAULT_CONFIDENCE_LEVEL,
            seed: None,
            cancel: None,
            parallel: cfg!(feature = "parallel"),
        }
    }

    /// Number of trials; `0` or `1` disables resampling
    pub fn with_trials(mut self, trials: usize) -> Self {
        self.trials = trials;
        self
    }

    pub fn with_resampling(mut self, resampling: Resampling) -> Self {
        self.resampling = resampling;
        self
    }

    /// Interpolation used for both the per-trial percentiles and the
    /// interval edges
    pub fn with_interpolation(mut self, interpolation: Interpolation) -> Self {
        self.interpolation = interpolation;
        self
    }

    /// Two-sided confidence level in `(0, 1)`, checked when the engine runs
    pub fn with_confidence_level(mut self, confidence_level: f64) -> Self {
        self.confidence_level = confidence_level;
        self
    }

    /// Set random seed for reproducibility
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Flag polled between trials; setting it aborts with `Error::Cancelled`
    pub fn with_cancellation(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    /// Spread trials over the rayon pool (no effect without the `parallel`
    /// feature)
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn trials(&self) -> usize {
        self.trials
    }

    pub fn resampling(&self) -> Resampling {
        self.resampling
    }

    pub fn interpolation(&self) -> Interpolation {
        self.interpolation
    }

    pub fn confidence_level(&self) -> f64 {
        self.confidence_level
    }

    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    /// Whether trials run on the rayon pool
    pub fn is_parallel(&self) -> bool {
        cfg!(feature = "parallel") && self.parallel
    }

    /// Whether this configuration resamples at all
    pub fn is_resampling(&self) -> bool {
        self.trials > 1
    }

    /// Band of `percentages` of `sample`
    ///
    /// With one trial or fewer the band collapses onto the direct
    /// percentiles.
    pub fn run(&self, sample: &[f64], percentages: &[f64]) -> Result<QuantileBand> {
        let seed = self.seed.unwrap_or_else(|| thread_rng().gen());
        self.run_seeded(sample, percentages, seed)
    }

    /// Same as [`run`](Self::run) over a validated grid
    pub fn run_grid(&self, sample: &[f64], grid: &PercentileGrid) -> Result<QuantileBand> {
        self.run(sample, grid.percentages())
    }

    /// Draw the base seed from `rng` instead of the configured seed
    pub fn run_with_rng<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        sample: &[f64],
        percentages: &[f64],
    ) -> Result<QuantileBand> {
        let seed = rng.gen();
        self.run_seeded(sample, percentages, seed)
    }

    #[instrument(skip(self, sample, percentages), fields(n = sample.len(), points = percentages.len(), trials = self.trials, resampling = %self.resampling))]
    fn run_seeded(&self, sample: &[f64], percentages: &[f64], seed: u64) -> Result<QuantileBand> {
        self.validate(sample, percentages)?;
        if !self.is_resampling() {
            debug!("Bootstrap disabled (trials = {}), using direct percentiles", self.trials);
            let direct = Percentile::new(self.interpolation).percentiles(sample, percentages)?;
            return Ok(QuantileBand::point(direct));
        }
        let matrix = self.replicates_seeded(sample, percentages, seed)?;
        matrix.percentile_band(self.confidence_level, self.interpolation)
    }

    /// Raw `trials x points` replicate matrix
    pub fn replicates(&self, sample: &[f64], percentages: &[f64]) -> Result<BootstrapMatrix> {
        self.validate(sample, percentages)?;
        let seed = self.seed.unwrap_or_else(|| thread_rng().gen());
        self.replicates_seeded(sample, percentages, seed)
    }

    fn validate(&self, sample: &[f64], percentages: &[f64]) -> Result<()> {
        sample::check_finite(sample, "bootstrap sample")?;
        for &p in percentages {
            Error::check_percentage(p)?;
        }
        if !(self.confidence_level > 0.0 && self.confidence_level < 1.0) {
            return Err(Error::InvalidRange {
                value: self.confidence_level,
                min: 0.0,
                max: 1.0,
            });
        }
        Ok(())
    }

    fn replicates_seeded(
        &self,
        sample: &[f64],
        percentages: &[f64],
        seed: u64,
    ) -> Result<BootstrapMatrix> {
        let trials = self.trials.max(1);
        if trials < MIN_RECOMMENDED_TRIALS {
            warn!(
                "Only {} bootstrap trials requested, interval edges will be noisy",
                trials
            );
        }

        let kernel = match self.resampling {
            Resampling::Plain => None,
            Resampling::Smooth => Some(SmoothKernel::from_sample(sample)?),
        };
        if let Some(k) = &kernel {
            debug!("Smooth bootstrap kernel: bandwidth={:.6}, shrink={:.6}", k.bandwidth, k.shrink);
        }

        let mut matrix = BootstrapMatrix::zeros(trials, percentages.len());
        let completed = AtomicUsize::new(0);
        let estimator = Percentile::new(self.interpolation);

        let fill_row = |trial: usize, buffer: &mut Vec<f64>, row: &mut [f64]| -> Result<()> {
            if self.is_cancelled() {
                return Err(Error::Cancelled {
                    completed: completed.load(Ordering::Relaxed),
                    requested: trials,
                });
            }
            let mut rng = StdRng::seed_from_u64(trial_seed(seed, trial as u64));
            match &kernel {
                None => resample_into(sample, &mut rng, buffer),
                Some(k) => smooth_resample_into(sample, k, &mut rng, buffer),
            }
            buffer.sort_by(f64::total_cmp);
            let values = estimator.percentiles_sorted(buffer, percentages)?;
            row.copy_from_slice(&values);
            completed.fetch_add(1, Ordering::Relaxed);
            Ok(())
        };

        let points = percentages.len().max(1);
        let n = sample.len();
        debug!("Running {} bootstrap trials (base seed {})", trials, seed);

        #[cfg(feature = "parallel")]
        {
            if self.parallel {
                use rayon::prelude::*;
                matrix
                    .values_mut()
                    .par_chunks_mut(points)
                    .enumerate()
                    .try_for_each_init(
                        || vec![0.0; n],
                        |buffer, (trial, row)| fill_row(trial, buffer, row),
                    )?;
                return Ok(matrix);
            }
        }

        let mut buffer = vec![0.0; n];
        for (trial, row) in matrix.values_mut().chunks_mut(points).enumerate() {
            fill_row(trial, &mut buffer, row)?;
        }
        Ok(matrix)
    }

    fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }
}
