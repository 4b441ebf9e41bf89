//! JSON configuration.

use std::fs;

use tms_regression::lm::Bounds;
use tms_regression::{FitConfig, FitError, FitModel, Regression};

use crate::test_helpers::{X, Y};

#[test]
fn test_config_file_round_trip() {
    let config = FitConfig::default()
        .with_samples(25)
        .with_max_evaluations(1000)
        .with_bounds(
            FitModel::Boltzmann,
            vec![
                Bounds::new(0.0, 10.0).unwrap(),
                Bounds::unbounded(),
                Bounds::new(0.0, 1.0).unwrap(),
                Bounds::unbounded(),
            ],
        );

    let path = std::env::temp_dir().join(format!(
        "tms-regression-config-{}.json",
        std::process::id()
    ));
    fs::write(&path, serde_json::to_string_pretty(&config).unwrap()).unwrap();
    let loaded = FitConfig::from_json_file(&path).unwrap();
    fs::remove_file(&path).unwrap();

    assert_eq!(loaded, config);
    assert_eq!(loaded.bounds[&FitModel::Boltzmann][1], Bounds::unbounded());
}

#[test]
fn test_samples_setting_reaches_the_curve() {
    let config = FitConfig::from_json_str(r#"{"samples": 25}"#).unwrap();
    let (xx, yy) = Regression::with_config(config)
        .run_regression(&X, &Y, None)
        .unwrap();
    assert_eq!(xx.len(), 25);
    assert_eq!(yy.len(), 25);
    assert_eq!(xx[24], 140.0);
}

#[test]
fn test_invalid_config_is_rejected() {
    assert!(matches!(
        FitConfig::from_json_str(r#"{"max_evaluations": 0}"#),
        Err(FitError::Config(_))
    ));
    let inverted = r#"{"bounds": {"Boltzmann": [{"min": 2.0, "max": 1.0}, {}, {}, {}]}}"#;
    assert!(matches!(
        FitConfig::from_json_str(inverted),
        Err(FitError::Config(_))
    ));
    assert!(matches!(
        FitConfig::from_json_str(r#"{"bounds": {"Sigmoid": []}}"#),
        Err(FitError::Config(_))
    ));
}
