//! Fallback ordering and terminal failures.

use std::time::Duration;

use tms_regression::{FitConfig, FitEngine, FitError, FitModel, Regression};

use crate::test_helpers::{init_tracing, X, Y};

/// Far-off first sample: the logistic seed overflows `exp` and its Jacobian
/// turns into NaN, while the Gompertz fit converges.
const STEEP_X: [i64; 7] = [0, 5000, 5001, 5002, 5003, 5004, 5005];
const STEEP_Y: [f64; 7] = [3.0, 2.9, 2.6, 1.8, 1.0, 0.6, 0.5];

#[test]
fn test_logistic_falls_back_to_gompertz() {
    init_tracing();
    let result = FitEngine::new()
        .fit(FitModel::Logistic, &STEEP_X, &STEEP_Y)
        .unwrap();

    assert_eq!(result.requested, FitModel::Logistic);
    assert_eq!(result.model, FitModel::Gompertz);
    assert!(result.fell_back());
    assert_eq!(result.failed_attempts.len(), 1);
    assert_eq!(result.failed_attempts[0].model, FitModel::Logistic);
    assert!(matches!(
        result.failed_attempts[0].error,
        FitError::NumericalError(_)
    ));
}

#[test]
fn test_logistic_alone_fails_on_steep_data() {
    let err = FitEngine::new()
        .fit_single(FitModel::Logistic, &STEEP_X, &STEEP_Y)
        .unwrap_err();
    assert!(matches!(err, FitError::NumericalError(_)));
}

#[test]
fn test_fallback_result_is_cached_under_the_requested_model() {
    let regression = Regression::new();
    let result = regression
        .fit_result(&STEEP_X, &STEEP_Y, Some(FitModel::Logistic))
        .unwrap();
    assert_eq!(result.model, FitModel::Gompertz);

    assert!(regression
        .cache()
        .lookup(&STEEP_X, &STEEP_Y, FitModel::Logistic)
        .is_some());
    assert!(regression
        .cache()
        .lookup(&STEEP_X, &STEEP_Y, FitModel::Gompertz)
        .is_none());
}

#[test]
fn test_single_point_exhausts_the_chain() {
    let err = FitEngine::new()
        .fit(FitModel::Boltzmann, &[100], &[1.0])
        .unwrap_err();

    match err {
        FitError::NoModelConverged {
            requested,
            attempts,
        } => {
            assert_eq!(requested, FitModel::Boltzmann);
            let models: Vec<FitModel> = attempts.iter().map(|a| a.model).collect();
            assert_eq!(models, vec![FitModel::Boltzmann, FitModel::Cubic]);
            assert!(attempts
                .iter()
                .all(|a| matches!(a.error, FitError::Underdetermined { points: 1, .. })));
        }
        other => panic!("Expected NoModelConverged, got {:?}", other),
    }
}

#[test]
fn test_logistic_chain_tries_every_model_once() {
    let err = FitEngine::new()
        .fit(FitModel::Logistic, &[100], &[1.0])
        .unwrap_err();
    match err {
        FitError::NoModelConverged { attempts, .. } => {
            let models: Vec<FitModel> = attempts.iter().map(|a| a.model).collect();
            assert_eq!(
                models,
                vec![
                    FitModel::Logistic,
                    FitModel::Gompertz,
                    FitModel::Boltzmann,
                    FitModel::Cubic
                ]
            );
        }
        other => panic!("Expected NoModelConverged, got {:?}", other),
    }
}

#[test]
fn test_reverse_gompertz_skips_gompertz() {
    let err = FitEngine::new()
        .fit(FitModel::ReverseGompertz, &[100], &[1.0])
        .unwrap_err();
    match err {
        FitError::NoModelConverged { attempts, .. } => {
            let models: Vec<FitModel> = attempts.iter().map(|a| a.model).collect();
            assert_eq!(
                models,
                vec![FitModel::ReverseGompertz, FitModel::Boltzmann, FitModel::Cubic]
            );
        }
        other => panic!("Expected NoModelConverged, got {:?}", other),
    }
}

#[test]
fn test_timeout_feeds_the_chain() {
    let config = FitConfig::default().with_timeout(Duration::ZERO);
    let err = FitEngine::with_config(config)
        .fit(FitModel::Gompertz, &X, &Y)
        .unwrap_err();
    match err {
        FitError::NoModelConverged { attempts, .. } => {
            assert_eq!(attempts.len(), 3);
            assert!(attempts
                .iter()
                .all(|a| matches!(a.error, FitError::Timeout { limit_ms: 0, .. })));
        }
        other => panic!("Expected NoModelConverged, got {:?}", other),
    }
}

#[test]
fn test_invalid_input_is_not_a_fallback() {
    let engine = FitEngine::new();
    assert!(matches!(
        engine.fit(FitModel::Boltzmann, &[], &[]),
        Err(FitError::InvalidInput(_))
    ));
    assert!(matches!(
        engine.fit(FitModel::Boltzmann, &[1, 2, 3], &[1.0, 2.0]),
        Err(FitError::DimensionMismatch(_))
    ));
    assert!(matches!(
        engine.fit(FitModel::Boltzmann, &[1, 2], &[1.0, f64::INFINITY]),
        Err(FitError::InvalidInput(_))
    ));
}
