//! Reproducible noisy recruitment data.

use approx::assert_relative_eq;
use tms_regression::{FitEngine, FitModel, Regression};

use crate::test_helpers::{is_non_decreasing, noisy_recruitment};

#[test]
fn test_boltzmann_recovers_noisy_parameters() {
    let engine = FitEngine::new();
    for seed in 0..10 {
        let (x, y) = noisy_recruitment(seed, 0.05);
        let outcome = engine.fit_single(FitModel::Boltzmann, &x, &y).unwrap();

        assert_relative_eq!(outcome.params[0], 2.0, epsilon = 0.2);
        assert_relative_eq!(outcome.params[1], 115.0, epsilon = 3.0);
        assert_relative_eq!(outcome.params[2], 0.15, epsilon = 0.05);
        assert!(is_non_decreasing(&outcome.yy));
    }
}

#[test]
fn test_logistic_follows_noisy_data() {
    let (x, y) = noisy_recruitment(42, 0.05);
    let result = FitEngine::new().fit(FitModel::Logistic, &x, &y).unwrap();

    assert_eq!(result.model, FitModel::Logistic);
    assert_relative_eq!(result.yy[0], 0.1, epsilon = 0.1);
    assert_relative_eq!(result.yy[99], 2.1, epsilon = 0.1);
}

#[test]
fn test_same_seed_same_curve() {
    let (x, y) = noisy_recruitment(7, 0.1);
    let (x2, y2) = noisy_recruitment(7, 0.1);
    assert_eq!(x, x2);
    assert_eq!(y, y2);

    let first = Regression::new().run_regression(&x, &y, None).unwrap();
    let second = Regression::new().run_regression(&x2, &y2, None).unwrap();
    assert_eq!(first, second);
}
