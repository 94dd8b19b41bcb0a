//! End-to-end properties of q-q maps, bootstrap bands and lookup tables

mod common;

use common::normal_sample;
use proptest::prelude::*;
use quantile_mapping::bootstrap::BootstrapEngine;
use quantile_mapping::map::{write_qq_map, UncertaintyMode};
use quantile_mapping::prelude::*;
use quantile_mapping::{percentiles, Delimiter, Layout, Resampling, Table};

fn all_modes() -> Vec<Uncertainty> {
    vec![
        Uncertainty::None,
        Uncertainty::bootstrap(BootstrapTarget::Data, 150).with_seed(1),
        Uncertainty::bootstrap(BootstrapTarget::Both, 150).with_seed(2),
        Uncertainty::bootstrap(BootstrapTarget::Data, 150)
            .with_seed(3)
            .with_resampling(Resampling::Smooth),
        Uncertainty::analytic(),
    ]
}

#[test]
fn test_bands_are_ordered_in_every_mode() {
    let simul = normal_sample(500, 1.0, 2.0, 11);
    let data = normal_sample(300, 0.0, 1.0, 12);
    for uncertainty in all_modes() {
        let mode = uncertainty.mode();
        let config = QqMapConfig::new()
            .with_range(2.0, 98.0)
            .with_points(30)
            .with_uncertainty(uncertainty);
        let map = QqMap::build(&simul, &data, &config).unwrap();
        for i in 0..map.len() {
            assert!(map.x_low()[i] <= map.x()[i] && map.x()[i] <= map.x_up()[i], "{mode} X at {i}");
            assert!(map.y_low()[i] <= map.y()[i] && map.y()[i] <= map.y_up()[i], "{mode} Y at {i}");
        }
        if mode == UncertaintyMode::None || mode == UncertaintyMode::Data {
            assert!(map.x_band().is_point());
        }
    }
}

#[test]
fn test_range_too_extreme() {
    let simul = normal_sample(50, 0.0, 1.0, 1);
    let data = normal_sample(100, 0.0, 1.0, 2);

    // min(n) = 50, so percentages must stay inside [2, 98]
    let config = QqMapConfig::new()
        .with_range(1.0, 50.0)
        .with_uncertainty(Uncertainty::None);
    match QqMap::build(&simul, &data, &config) {
        Err(Error::RangeTooExtreme {
            n,
            min_allowed,
            max_allowed,
            ..
        }) => {
            assert_eq!(n, 50);
            assert!((min_allowed - 2.0).abs() < 1e-12);
            assert!((max_allowed - 98.0).abs() < 1e-12);
        }
        other => panic!("expected RangeTooExtreme, got {other:?}"),
    }

    let upper = QqMapConfig::new()
        .with_range(10.0, 99.0)
        .with_uncertainty(Uncertainty::None);
    assert!(matches!(
        QqMap::build(&simul, &data, &upper),
        Err(Error::RangeTooExtreme { .. })
    ));

    let inside = QqMapConfig::new()
        .with_range(2.0, 98.0)
        .with_uncertainty(Uncertainty::None);
    assert!(QqMap::build(&simul, &data, &inside).is_ok());
}

#[test]
fn test_table_round_trip_through_file() {
    let simul = normal_sample(400, 0.3, 1.5, 21);
    let data = normal_sample(400, 0.0, 1.0, 22);
    let config = QqMapConfig::new()
        .with_range(5.0, 95.0)
        .with_points(40)
        .with_uncertainty(Uncertainty::bootstrap(BootstrapTarget::Both, 150).with_seed(5));
    let map = QqMap::build(&simul, &data, &config).unwrap();

    let path = std::env::temp_dir().join(format!("qq_map_round_trip_{}.txt", std::process::id()));
    Table::from_qq_map(&map).save(&path, Delimiter::Space).unwrap();
    let loaded = Table::load(&path, Layout::QqMap);
    let _ = std::fs::remove_file(&path);

    let (x, y) = loaded.unwrap().into_qq_bands().unwrap();
    assert_eq!(&x, map.x_band());
    assert_eq!(&y, map.y_band());

    let mut buf = Vec::new();
    write_qq_map(&map, &mut buf, Delimiter::Comma).unwrap();
    let text = String::from_utf8(buf).unwrap();
    assert!(text.starts_with("# X,Y,Xlow,Xup,Ylow,Yup\n"));
    assert_eq!(text.lines().count(), 41);
}

#[test]
fn test_config_from_json_drives_the_map() {
    let simul = normal_sample(300, 0.0, 1.0, 31);
    let data = normal_sample(300, 0.0, 1.0, 32);
    let config = QqMapConfig::from_json_str(
        r#"{"start": 5.0, "end": 95.0, "num_points": 10, "mode": "analytic"}"#,
    )
    .unwrap();
    let map = QqMap::build(&simul, &data, &config).unwrap();
    assert_eq!(map.len(), 10);
    assert_eq!(map.targets()[0], 5.0);

    assert!(matches!(
        QqMapConfig::from_json_str(r#"{"mode": "bayesian"}"#),
        Err(Error::InvalidConfiguration(_))
    ));
}

#[test]
fn test_bootstrap_interval_contains_direct_estimate() {
    let targets = [10.0, 25.0, 50.0, 75.0, 90.0];
    let mut inside = 0;
    let mut total = 0;
    for seed in 0..20u64 {
        let sample = normal_sample(200, 0.0, 1.0, 500 + seed);
        let direct = percentiles(&sample, &targets, Interpolation::Linear).unwrap();
        let band = BootstrapEngine::new()
            .with_trials(500)
            .with_seed(seed)
            .run(&sample, &targets)
            .unwrap();
        for (i, d) in direct.iter().enumerate() {
            total += 1;
            if band.down()[i] <= *d && *d <= band.up()[i] {
                inside += 1;
            }
        }
    }
    assert!(
        inside as f64 >= 0.95 * total as f64,
        "direct estimate inside {inside} of {total} bands"
    );
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn percentiles_stay_within_sample_range(
        sample in prop::collection::vec(-1e6f64..1e6, 1..200),
        p in 0.0f64..=100.0,
    ) {
        let min = sample.iter().cloned().fold(f64::INFINITY, f64::min);
        let max = sample.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        for interpolation in [
            Interpolation::Linear,
            Interpolation::Lower,
            Interpolation::Higher,
            Interpolation::Nearest,
            Interpolation::Midpoint,
        ] {
            let v = percentiles(&sample, &[p], interpolation).unwrap()[0];
            prop_assert!(min <= v && v <= max);
        }
    }

    #[test]
    fn median_of_symmetric_sample_is_centre(
        half in prop::collection::vec(0.0f64..100.0, 1..100),
        centre in -50.0f64..50.0,
    ) {
        let mut sample: Vec<f64> = half.iter().map(|d| centre + d).collect();
        sample.extend(half.iter().map(|d| centre - d));
        let median = percentiles(&sample, &[50.0], Interpolation::Linear).unwrap()[0];
        prop_assert!((median - centre).abs() < 1e-9);
    }
}
