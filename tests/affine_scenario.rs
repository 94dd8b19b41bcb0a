//! Recovering a known affine distortion through the q-q map

mod common;

use common::{init_tracing, mean, normal_sample, population_std};
use quantile_mapping::prelude::*;
use quantile_mapping::{linear_fit, Table};

const SHIFT: f64 = 0.5;
const SCALE: f64 = 1.2;

fn samples() -> (Vec<f64>, Vec<f64>) {
    let simul = normal_sample(80_000, SHIFT, SCALE, 2024);
    let data = normal_sample(40_000, 0.0, 1.0, 7);
    (simul, data)
}

fn config(uncertainty: Uncertainty) -> QqMapConfig {
    QqMapConfig::new()
        .with_range(1.0, 99.0)
        .with_points(50)
        .with_uncertainty(uncertainty)
}

#[test]
fn test_linear_fit_recovers_inverse_distortion() {
    init_tracing();
    let (simul, data) = samples();
    let map = QqMap::build(&simul, &data, &config(Uncertainty::None)).unwrap();
    assert_eq!(map.len(), 50);

    // Y ~ (X - 0.5) / 1.2
    let fit = linear_fit(map.x(), map.y()).unwrap();
    println!(
        "slope = {:.4} +- {:.4}, intercept = {:.4} +- {:.4}",
        fit.slope, fit.slope_se, fit.intercept, fit.intercept_se
    );
    assert!((fit.slope - 1.0 / SCALE).abs() < 0.03, "slope {}", fit.slope);
    assert!(
        (fit.intercept + SHIFT / SCALE).abs() < 0.03,
        "intercept {}",
        fit.intercept
    );

    // Same relation read the other way: X ~ 1.2 Y + 0.5
    let inverse = linear_fit(map.y(), map.x()).unwrap();
    assert!((inverse.slope - SCALE).abs() < 0.04, "slope {}", inverse.slope);
    assert!((inverse.intercept - SHIFT).abs() < 0.03, "intercept {}", inverse.intercept);
}

#[test]
fn test_bootstrap_bands_are_ordered_and_cover_the_direct_map() {
    init_tracing();
    let (simul, data) = samples();
    let direct = QqMap::build(&simul, &data, &config(Uncertainty::None)).unwrap();
    let uncertainty = Uncertainty::bootstrap(BootstrapTarget::Both, 200).with_seed(99);
    let map = QqMap::build(&simul, &data, &config(uncertainty)).unwrap();

    assert_eq!(map.x(), direct.x());
    for band in [map.x_band(), map.y_band()] {
        for i in 0..band.len() {
            assert!(band.down()[i] <= band.nominal()[i]);
            assert!(band.nominal()[i] <= band.up()[i]);
        }
    }
    let covered = (0..map.len())
        .filter(|&i| map.y_low()[i] <= direct.y()[i] && direct.y()[i] <= map.y_up()[i])
        .count();
    assert!(covered >= 45, "direct Y inside the band at {covered} of 50 points");
}

#[test]
fn test_spline_correction_matches_reference_moments() {
    init_tracing();
    let (simul, data) = samples();
    let uncertainty = Uncertainty::bootstrap(BootstrapTarget::Data, 200).with_seed(3);
    let map = QqMap::build(&simul, &data, &config(uncertainty)).unwrap();

    let correction = map
        .weighted_correction(&SplineCorrector::new().with_extrapolation(Extrapolation::Linear))
        .unwrap();
    let corrected = correction.eval_many(&simul).unwrap();

    assert!((mean(&corrected) - mean(&data)).abs() < 0.03);
    assert!((population_std(&corrected) - population_std(&data)).abs() < 0.03);

    // Every entry of the correction table is a finite value of the fitted curve
    let band = quantile_mapping::QuantileBand::point(correction.eval_many(map.x()).unwrap());
    let table = Table::correction(map.x(), &band).unwrap();
    assert_eq!(table.len(), 50);
    assert!(table.column("nominal").unwrap().iter().all(|v| v.is_finite()));
}
