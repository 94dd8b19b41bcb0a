//! Goodness-of-fit checks for corrected samples

use qm_core::{sample, Error, Result};

/// Result of a one-sample Kolmogorov-Smirnov test
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KsResult {
    /// Largest distance between the empirical and the reference CDF
    pub statistic: f64,
    /// Asymptotic p-value
    pub p_value: f64,
}

impl KsResult {
    /// Whether the sample is compatible with the reference at level `alpha`
    pub fn accepts(&self, alpha: f64) -> bool {
        self.p_value >= alpha
    }
}

/// One-sample Kolmogorov-Smirnov test of `data` against `cdf`
///
/// The p-value uses the Kolmogorov limit distribution with Stephens'
/// small-sample correction `(sqrt(n) + 0.12 + 0.11 / sqrt(n)) D`.
pub fn ks_test<F>(data: &[f64], cdf: F) -> Result<KsResult>
where
    F: Fn(f64) -> f64,
{
    sample::check_finite(data, "KS sample")?;
    let sorted = sample::sorted_copy(data);
    let n = sorted.len() as f64;

    let mut statistic: f64 = 0.0;
    for (i, &x) in sorted.iter().enumerate() {
        let f = cdf(x);
        if !(0.0..=1.0).contains(&f) {
            return Err(Error::Domain(format!("CDF of {x} is {f}, outside [0, 1]")));
        }
        let above = (i + 1) as f64 / n - f;
        let below = f - i as f64 / n;
        statistic = statistic.max(above).max(below);
    }

    let root_n = n.sqrt();
    let lambda = (root_n + 0.12 + 0.11 / root_n) * statistic;
    Ok(KsResult {
        statistic,
        p_value: kolmogorov_survival(lambda),
    })
}

/// `P(K > lambda)` for the Kolmogorov distribution
pub fn kolmogorov_survival(lambda: f64) -> f64 {
    if lambda < 1e-3 {
        return 1.0;
    }
    let a = -2.0 * lambda * lambda;
    let mut sum = 0.0;
    let mut sign = 1.0;
    let mut previous_term = 0.0;
    for j in 1..=100 {
        let jf = j as f64;
        let term = sign * 2.0 * (a * jf * jf).exp();
        sum += term;
        if term.abs() <= 1e-10 * previous_term || term.abs() <= 1e-12 * sum.abs() {
            return sum.clamp(0.0, 1.0);
        }
        sign = -sign;
        previous_term = term.abs();
    }
    // Series failed to converge, only happens for tiny lambda
    1.0
}

/// Ordinary least-squares line with parameter standard errors
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
    pub slope_se: f64,
    pub intercept_se: f64,
    /// Residual standard deviation (`n - 2` degrees of freedom)
    pub residual_sd: f64,
}

impl LinearFit {
    pub fn predict(&self, x: f64) -> f64 {
        self.intercept + self.slope * x
    }
}

/// Fit `y = intercept + slope * x`
pub fn linear_fit(x: &[f64], y: &[f64]) -> Result<LinearFit> {
    if x.len() != y.len() {
        return Err(Error::size_mismatch(x.len(), y.len(), "linear fit"));
    }
    sample::check_min_len(x, 3)?;
    sample::check_finite(x, "linear fit x")?;
    sample::check_finite(y, "linear fit y")?;

    let n = x.len() as f64;
    let mean_x = sample::mean(x)?;
    let mean_y = sample::mean(y)?;
    let sxx: f64 = x.iter().map(|v| (v - mean_x).powi(2)).sum();
    if sxx <= 0.0 {
        return Err(Error::DegenerateSample(
            "linear fit needs at least two distinct x values".to_string(),
        ));
    }
    let sxy: f64 = x
        .iter()
        .zip(y)
        .map(|(a, b)| (a - mean_x) * (b - mean_y))
        .sum();
    let slope = sxy / sxx;
    let intercept = mean_y - slope * mean_x;

    let ssr: f64 = x
        .iter()
        .zip(y)
        .map(|(a, b)| (b - intercept - slope * a).powi(2))
        .sum();
    let residual_var = ssr / (n - 2.0);
    let slope_se = (residual_var / sxx).sqrt();
    let intercept_se = (residual_var * (1.0 / n + mean_x * mean_x / sxx)).sqrt();

    Ok(LinearFit {
        slope,
        intercept,
        slope_se,
        intercept_se,
        residual_sd: residual_var.sqrt(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use rand_distr::{Distribution, Normal as NormalDist};
    use statrs::distribution::{ContinuousCDF, Normal};

    #[test]
    fn test_kolmogorov_survival_reference_values() {
        // Critical values of the Kolmogorov distribution
        assert_relative_eq!(kolmogorov_survival(1.3581), 0.05, epsilon = 1e-3);
        assert_relative_eq!(kolmogorov_survival(1.6276), 0.01, epsilon = 1e-3);
        assert_eq!(kolmogorov_survival(0.0), 1.0);
        assert!(kolmogorov_survival(5.0) < 1e-10);
    }

    #[test]
    fn test_ks_accepts_matching_distribution() {
        let mut rng = ChaCha8Rng::seed_from_u64(17);
        let dist = NormalDist::new(0.0, 1.0).unwrap();
        let data: Vec<f64> = (0..2000).map(|_| dist.sample(&mut rng)).collect();
        let reference = Normal::new(0.0, 1.0).unwrap();

        let good = ks_test(&data, |x| reference.cdf(x)).unwrap();
        assert!(good.accepts(0.01), "p = {}", good.p_value);

        let shifted = Normal::new(0.3, 1.0).unwrap();
        let bad = ks_test(&data, |x| shifted.cdf(x)).unwrap();
        assert!(!bad.accepts(0.05));
        assert!(bad.statistic > good.statistic);
    }

    #[test]
    fn test_ks_statistic_small_sample() {
        // Uniform CDF on [0, 1], sample {0.5}: D = 0.5
        let r = ks_test(&[0.5], |x| x.clamp(0.0, 1.0)).unwrap();
        assert_relative_eq!(r.statistic, 0.5);
        assert!(matches!(ks_test(&[0.5], |_| 2.0), Err(Error::Domain(_))));
    }

    #[test]
    fn test_linear_fit_exact_line() {
        let x = [0.0, 1.0, 2.0, 3.0, 4.0];
        let y: Vec<f64> = x.iter().map(|v| 2.5 * v - 1.0).collect();
        let fit = linear_fit(&x, &y).unwrap();
        assert_relative_eq!(fit.slope, 2.5, epsilon = 1e-12);
        assert_relative_eq!(fit.intercept, -1.0, epsilon = 1e-12);
        assert!(fit.slope_se < 1e-12);
        assert_relative_eq!(fit.predict(10.0), 24.0, epsilon = 1e-10);
    }

    #[test]
    fn test_linear_fit_standard_errors() {
        // Residuals +1, -1, -1, +1 around y = x
        let x = [0.0, 1.0, 2.0, 3.0];
        let y = [1.0, 0.0, 1.0, 4.0];
        let fit = linear_fit(&x, &y).unwrap();
        // sxx = 5, sxy = 5, ssr = 4 on 2 degrees of freedom
        assert_relative_eq!(fit.slope, 1.0, epsilon = 1e-12);
        assert_relative_eq!(fit.intercept, 0.0, epsilon = 1e-12);
        assert_relative_eq!(fit.residual_sd, 2f64.sqrt(), epsilon = 1e-12);
        assert_relative_eq!(fit.slope_se, (2.0f64 / 5.0).sqrt(), epsilon = 1e-12);
        assert_relative_eq!(
            fit.intercept_se,
            (2.0f64 * (0.25 + 2.25 / 5.0)).sqrt(),
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_linear_fit_degenerate() {
        assert!(matches!(
            linear_fit(&[1.0, 1.0, 1.0], &[0.0, 1.0, 2.0]),
            Err(Error::DegenerateSample(_))
        ));
        assert!(matches!(
            linear_fit(&[1.0, 2.0], &[0.0, 1.0]),
            Err(Error::InsufficientData { .. })
        ));
    }
}
