//! Current model and scoped overrides.

use tms_regression::{FitModel, Regression};

use crate::test_helpers::{X, Y};

#[test]
fn test_override_does_not_persist() {
    let regression = Regression::new();
    regression.set_model(FitModel::Cubic);

    let result = regression
        .fit_result(&X, &Y, Some(FitModel::Boltzmann))
        .unwrap();
    assert_eq!(result.requested, FitModel::Boltzmann);
    assert_eq!(regression.current_model(), FitModel::Cubic);

    let result = regression.fit_result(&X, &Y, None).unwrap();
    assert_eq!(result.requested, FitModel::Cubic);
}

#[test]
fn test_override_is_restored_when_the_fit_fails() {
    let regression = Regression::new();
    regression.set_model(FitModel::Gompertz);

    assert!(regression
        .run_regression(&[100], &[1.0], Some(FitModel::Logistic))
        .is_err());
    assert_eq!(regression.current_model(), FitModel::Gompertz);

    assert!(regression
        .run_regression(&[1, 2], &[1.0], Some(FitModel::Logistic))
        .is_err());
    assert_eq!(regression.current_model(), FitModel::Gompertz);
}

#[test]
fn test_labels_drive_the_selection() {
    let regression = Regression::new();
    regression.set_model("ReverseGombertz".parse().unwrap());
    assert_eq!(regression.current_model(), FitModel::ReverseGompertz);
    assert_eq!(regression.current_model().to_string(), "Reverse Gompertz");
}
