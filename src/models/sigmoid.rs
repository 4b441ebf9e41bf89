//! Sigmoid recruitment curves.
//!
//! The logistic and Boltzmann functions describe the same S-shape with
//! different parameterisations. The logistic runs between the asymptotes `a`
//! and `c` with a signed steepness `b`, while the Boltzmann form adds an
//! amplitude `L` to a baseline `b`.

use ndarray::{Array1, Array2};

use super::SeriesSummary;
use crate::error::Result;
use crate::lm::SolverMethod;
use crate::model::{CurveFunction, FitModel};

/// Logistic curve.
///
/// f(x) = a + (c - a) / (1 + exp(b*(x - d)))
///
/// Fitted with the unconstrained method. When `b*(x - d)` overflows, the
/// Jacobian becomes non-finite and the fit fails as a numerical error.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogisticModel;

impl CurveFunction for LogisticModel {
    fn model(&self) -> FitModel {
        FitModel::Logistic
    }

    fn parameter_names(&self) -> &'static [&'static str] {
        &["a", "b", "c", "d"]
    }

    fn value(&self, x: f64, params: &[f64]) -> f64 {
        let (a, b, c, d) = (params[0], params[1], params[2], params[3]);
        a + (c - a) / (1.0 + (b * (x - d)).exp())
    }

    fn jacobian(&self, x: &Array1<f64>, params: &Array1<f64>) -> Option<Array2<f64>> {
        let (a, b, c, d) = (params[0], params[1], params[2], params[3]);
        let mut jac = Array2::zeros((x.len(), 4));
        for (i, &xi) in x.iter().enumerate() {
            let e = (b * (xi - d)).exp();
            let s = 1.0 / (1.0 + e);
            let q = e / ((1.0 + e) * (1.0 + e));
            jac[[i, 0]] = 1.0 - s;
            jac[[i, 1]] = -(c - a) * (xi - d) * q;
            jac[[i, 2]] = s;
            jac[[i, 3]] = (c - a) * b * q;
        }
        Some(jac)
    }

    fn initial_guess(&self, x: &Array1<f64>, y: &Array1<f64>) -> Result<Array1<f64>> {
        let summary = SeriesSummary::from_series(x, y)?;
        Ok(Array1::from(vec![0.0, -0.2, summary.y_max + 5.0, summary.x_median]))
    }
}

/// Boltzmann sigmoid.
///
/// f(x) = L / (1 + exp(-k*(x - x0))) + b
///
/// Parameters:
///
/// * `L` - amplitude between the baseline and the plateau
/// * `x0` - stimulus intensity at half amplitude
/// * `k` - steepness
/// * `b` - baseline
#[derive(Debug, Clone, Copy, Default)]
pub struct BoltzmannModel;

impl CurveFunction for BoltzmannModel {
    fn model(&self) -> FitModel {
        FitModel::Boltzmann
    }

    fn parameter_names(&self) -> &'static [&'static str] {
        &["L", "x0", "k", "b"]
    }

    fn value(&self, x: f64, params: &[f64]) -> f64 {
        let (l, x0, k, b) = (params[0], params[1], params[2], params[3]);
        l / (1.0 + (-k * (x - x0)).exp()) + b
    }

    fn jacobian(&self, x: &Array1<f64>, params: &Array1<f64>) -> Option<Array2<f64>> {
        let (l, x0, k) = (params[0], params[1], params[2]);
        let mut jac = Array2::zeros((x.len(), 4));
        for (i, &xi) in x.iter().enumerate() {
            let e = (-k * (xi - x0)).exp();
            let s = 1.0 / (1.0 + e);
            // ds/du for u = k*(x - x0); vanishes once exp overflows
            let ds = if e.is_finite() { e * s * s } else { 0.0 };
            jac[[i, 0]] = s;
            jac[[i, 1]] = -l * k * ds;
            jac[[i, 2]] = l * (xi - x0) * ds;
            jac[[i, 3]] = 1.0;
        }
        Some(jac)
    }

    fn initial_guess(&self, x: &Array1<f64>, y: &Array1<f64>) -> Result<Array1<f64>> {
        let summary = SeriesSummary::from_series(x, y)?;
        Ok(Array1::from(vec![summary.y_max, summary.x_median, 0.1, summary.y_min]))
    }

    fn method(&self) -> SolverMethod {
        SolverMethod::BoundedTrustRegion
    }
}
