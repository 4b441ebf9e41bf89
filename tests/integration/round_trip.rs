//! Fitting the reference recruitment series.

use approx::assert_relative_eq;
use tms_regression::{FitEngine, FitModel, RecruitmentMetrics, Regression};

use crate::test_helpers::{init_tracing, is_evenly_spaced, is_non_decreasing, X, Y};

#[test]
fn test_boltzmann_round_trip() {
    init_tracing();
    let regression = Regression::new();
    let (xx, yy) = regression
        .run_regression(&X, &Y, Some(FitModel::Boltzmann))
        .unwrap();

    assert_eq!(xx.len(), 100);
    assert_eq!(yy.len(), 100);
    assert!(is_non_decreasing(&yy));
    assert_relative_eq!(yy[0], 0.2, epsilon = 0.05);
    assert_relative_eq!(yy[99], 2.1, epsilon = 0.05);
}

#[test]
fn test_output_shape() {
    let regression = Regression::new();
    // unsorted input still spans [min, max]
    let x = [130, 90, 140, 100, 120, 110];
    let y = [2.0, 0.2, 2.1, 0.5, 1.8, 1.1];
    let (xx, _) = regression.run_regression(&x, &y, None).unwrap();

    assert_eq!(xx.len(), 100);
    assert_eq!(xx[0], 90.0);
    assert_eq!(xx[99], 140.0);
    assert!(is_evenly_spaced(&xx, 1e-9));
}

#[test]
fn test_every_model_fits_the_reference_series() {
    let engine = FitEngine::new();
    for model in FitModel::ALL {
        let result = engine.fit(model, &X, &Y).unwrap();
        assert_eq!(result.requested, model);
        assert_eq!(result.model, model, "{} fell back", model);
        assert!(result.failed_attempts.is_empty());
        assert_eq!(result.params.len(), model.parameter_names().len());
        assert!(result.yy.iter().all(|v| v.is_finite()));
    }
}

#[test]
fn test_boltzmann_parameters() {
    let outcome = FitEngine::new()
        .fit_single(FitModel::Boltzmann, &X, &Y)
        .unwrap();
    let (amplitude, x0, k, baseline) = (
        outcome.params[0],
        outcome.params[1],
        outcome.params[2],
        outcome.params[3],
    );
    assert_relative_eq!(amplitude, 1.982, epsilon = 0.01);
    assert_relative_eq!(x0, 109.9, epsilon = 0.1);
    assert_relative_eq!(k, 0.156, epsilon = 0.01);
    assert_relative_eq!(baseline, 0.127, epsilon = 0.01);
}

#[test]
fn test_recruitment_metrics() {
    let regression = Regression::new();
    let metrics = regression.recruitment_metrics(&X, &Y, None).unwrap();

    assert!(metrics.s50 > 109.0 && metrics.s50 < 111.5);
    assert_relative_eq!(metrics.slope, 0.077, epsilon = 0.005);
    assert!(metrics.baseline < metrics.half_response);
    assert!(metrics.half_response < metrics.plateau);

    let result = regression.fit_result(&X, &Y, None).unwrap();
    assert_eq!(RecruitmentMetrics::from_result(&result).unwrap(), metrics);
}

#[test]
fn test_determinism() {
    let engine = FitEngine::new();
    for model in FitModel::ALL {
        let first = engine.fit_single(model, &X, &Y).unwrap();
        let second = engine.fit_single(model, &X, &Y).unwrap();
        assert_eq!(first.params, second.params);
        assert_eq!(first.yy, second.yy);
    }
}
