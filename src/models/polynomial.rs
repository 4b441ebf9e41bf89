//! Polynomial recruitment curve.

use ndarray::{Array1, Array2};

use crate::error::Result;
use crate::model::{CurveFunction, FitModel};

/// A two-parameter cubic sharing one coefficient across all powers.
///
/// f(x) = a*x^3 + a*x^2 + a*x + b
///
/// The model is linear in `a` and `b`, so its Jacobian is exact and does not
/// depend on the parameters. It is supplied analytically instead of being
/// left to finite differences; both give the same fit up to rounding, and
/// the analytic form needs no extra residual evaluations.
#[derive(Debug, Clone, Copy, Default)]
pub struct CubicModel;

impl CurveFunction for CubicModel {
    fn model(&self) -> FitModel {
        FitModel::Cubic
    }

    fn parameter_names(&self) -> &'static [&'static str] {
        &["a", "b"]
    }

    fn value(&self, x: f64, params: &[f64]) -> f64 {
        let (a, b) = (params[0], params[1]);
        a * x.powi(3) + a * x.powi(2) + a * x + b
    }

    fn jacobian(&self, x: &Array1<f64>, _params: &Array1<f64>) -> Option<Array2<f64>> {
        let mut jac = Array2::zeros((x.len(), 2));
        for (i, &xi) in x.iter().enumerate() {
            jac[[i, 0]] = xi.powi(3) + xi.powi(2) + xi;
            jac[[i, 1]] = 1.0;
        }
        Some(jac)
    }

    fn initial_guess(&self, _x: &Array1<f64>, _y: &Array1<f64>) -> Result<Array1<f64>> {
        Ok(Array1::zeros(2))
    }
}
