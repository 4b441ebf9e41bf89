//! Memoization through the regression entry point.

use std::sync::Arc;
use std::thread;

use tms_regression::{FitModel, Regression};

use crate::test_helpers::{X, Y};

#[test]
fn test_hit_requires_exact_input() {
    let regression = Regression::new();
    let first = regression.fit_result(&X, &Y, None).unwrap();
    let again = regression.fit_result(&X, &Y, None).unwrap();
    assert!(Arc::ptr_eq(&first, &again));
    assert_eq!(regression.cache().len(), 1);

    // one amplitude changed by the smallest representable amount
    let mut y = Y;
    y[3] = f64::from_bits(y[3].to_bits() + 1);
    let changed = regression.fit_result(&X, &y, None).unwrap();
    assert!(!Arc::ptr_eq(&first, &changed));
    assert_eq!(regression.cache().len(), 2);

    // one intensity changed
    let mut x = X;
    x[0] = 91;
    regression.fit_result(&x, &Y, None).unwrap();
    assert_eq!(regression.cache().len(), 3);

    // same data, different model
    regression
        .fit_result(&X, &Y, Some(FitModel::Logistic))
        .unwrap();
    assert_eq!(regression.cache().len(), 4);

    assert!(Arc::ptr_eq(
        &regression.fit_result(&X, &Y, None).unwrap(),
        &first
    ));
}

#[test]
fn test_failures_are_retried() {
    let regression = Regression::new();
    assert!(regression.run_regression(&[100], &[1.0], None).is_err());
    assert!(regression.run_regression(&[100], &[1.0], None).is_err());
    assert!(regression.cache().is_empty());
}

#[test]
fn test_concurrent_regressions_share_the_cache() {
    let regression = Regression::new();
    let curves: Vec<(Vec<f64>, Vec<f64>)> = thread::scope(|s| {
        let handles: Vec<_> = (0..4)
            .map(|_| s.spawn(|| regression.run_regression(&X, &Y, None).unwrap()))
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(regression.cache().len(), 1);
    assert!(curves.iter().all(|c| *c == curves[0]));
}
