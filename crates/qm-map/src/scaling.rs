//! Two-moment (shift and scale) correction

use qm_core::{sample, Error, Result};
use tracing::debug;

/// Shift `simul` to the mean of `data`, then rescale it about that mean by
/// `std(data) / std(simul)`
///
/// Standard deviations are population values (divide by `n`). Fails with
/// `DegenerateSample` when `simul` has zero spread.
pub fn variance_scaling(simul: &[f64], data: &[f64]) -> Result<Vec<f64>> {
    sample::check_finite(simul, "simul")?;
    sample::check_finite(data, "data")?;
    sample::check_min_len(simul, 2)?;
    sample::check_min_len(data, 2)?;

    let (mean_simul, var_simul) = sample::mean_variance(simul)?;
    let (mean_data, var_data) = sample::mean_variance(data)?;
    if var_simul <= 0.0 {
        return Err(Error::DegenerateSample(
            "variance scaling needs a simulated sample with non-zero standard deviation"
                .to_string(),
        ));
    }

    let shift = mean_data - mean_simul;
    let ratio = (var_data / var_simul).sqrt();
    debug!("Variance scaling: shift={:.6}, ratio={:.6}", shift, ratio);

    // After the shift the simulated mean equals `mean_data`
    Ok(simul
        .iter()
        .map(|&v| (v - mean_simul) * ratio + mean_data)
        .collect())
}
