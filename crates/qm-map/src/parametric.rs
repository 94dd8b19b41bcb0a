//! Quantile mapping between two known distributions

use crate::distribution::QuantileFunction;
use qm_core::{Error, Result};

/// `correction.ppf(simul.cdf(x))`
///
/// Maps `x` to the value with the same rank under `correction`. Fails with
/// `Domain` when the CDF leaves `[0, 1]` or the inverse is not finite (for
/// example at probability 0 or 1 of an unbounded distribution).
///
/// ```rust
/// use qm_map::parametric_qm;
/// use statrs::distribution::Normal;
///
/// let simul = Normal::new(0.5, 1.2).unwrap();
/// let truth = Normal::new(0.0, 1.0).unwrap();
/// let corrected = parametric_qm(0.5 + 1.2, &truth, &simul).unwrap();
/// assert!((corrected - 1.0).abs() < 1e-9);
/// ```
pub fn parametric_qm<C, S>(x: f64, correction: &C, simul: &S) -> Result<f64>
where
    C: QuantileFunction + ?Sized,
    S: QuantileFunction + ?Sized,
{
    let p = simul.cdf(x);
    if !(0.0..=1.0).contains(&p) {
        return Err(Error::Domain(format!(
            "CDF of {x} is {p}, outside [0, 1]"
        )));
    }
    let y = correction.ppf(p)?;
    if !y.is_finite() {
        return Err(Error::Domain(format!(
            "inverse CDF undefined at probability {p} (input {x})"
        )));
    }
    Ok(y)
}

/// [`parametric_qm`] of every element
pub fn parametric_qm_many<C, S>(xs: &[f64], correction: &C, simul: &S) -> Result<Vec<f64>>
where
    C: QuantileFunction + ?Sized,
    S: QuantileFunction + ?Sized,
{
    xs.iter()
        .map(|&x| parametric_qm(x, correction, simul))
        .collect()
}
