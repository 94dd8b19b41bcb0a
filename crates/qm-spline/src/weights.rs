//! Point weights from asymmetric uncertainties

use qm_core::{Error, QuantileBand, Result};

/// Inverse-sigma weights from asymmetric errors (Barlow's combination)
///
/// With `sigma_plus = up - nominal` and `sigma_minus = nominal - down`:
///
/// ```text
/// mean = (sigma_plus + sigma_minus) / 2
/// diff = (sigma_plus - sigma_minus) / 2
/// V    = mean^2 + 2 diff^2
/// w    = 1 / sqrt(V)
/// ```
///
/// R. Barlow, "Asymmetric Errors", PHYSTAT2003.
///
/// Fails with `DegenerateSample` where a point has zero combined variance.
pub fn barlow_weights(nominal: &[f64], down: &[f64], up: &[f64]) -> Result<Vec<f64>> {
    if down.len() != nominal.len() {
        return Err(Error::size_mismatch(nominal.len(), down.len(), "lower uncertainties"));
    }
    if up.len() != nominal.len() {
        return Err(Error::size_mismatch(nominal.len(), up.len(), "upper uncertainties"));
    }

    nominal
        .iter()
        .zip(down)
        .zip(up)
        .enumerate()
        .map(|(i, ((&n, &d), &u))| {
            let plus = u - n;
            let minus = n - d;
            let mean = 0.5 * (plus + minus);
            let diff = 0.5 * (plus - minus);
            let variance = mean * mean + 2.0 * diff * diff;
            if !variance.is_finite() {
                return Err(Error::NonFinite("uncertainty band"));
            }
            if variance <= 0.0 {
                return Err(Error::DegenerateSample(format!(
                    "zero uncertainty at point {i}, cannot derive a weight"
                )));
            }
            Ok(1.0 / variance.sqrt())
        })
        .collect()
}

/// [`barlow_weights`] of a whole band
pub fn band_weights(band: &QuantileBand) -> Result<Vec<f64>> {
    barlow_weights(band.nominal(), band.down(), band.up())
}
