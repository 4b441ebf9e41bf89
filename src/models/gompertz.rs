//! Gompertz recruitment curves.

use ndarray::{Array1, Array2};

use super::SeriesSummary;
use crate::error::Result;
use crate::lm::SolverMethod;
use crate::model::{CurveFunction, FitModel};

/// Gompertz curve, optionally mirrored.
///
/// Forward form:
///
/// f(x) = a + (c - a) * exp(-exp(b*(x - d)))
///
/// Reverse form:
///
/// f(x) = a + (c - a) * (1 - exp(-exp(-b*(x - d))))
///
/// Both are fitted with the bounded trust-region method from the same seed.
#[derive(Debug, Clone, Copy, Default)]
pub struct GompertzModel {
    reverse: bool,
}

impl GompertzModel {
    /// Creates the forward (`reverse == false`) or reverse Gompertz curve.
    pub const fn new(reverse: bool) -> Self {
        Self { reverse }
    }

    /// Whether this is the reverse form.
    pub fn is_reverse(&self) -> bool {
        self.reverse
    }

    /// Exponent `u` of the inner exponential.
    fn exponent(&self, x: f64, b: f64, d: f64) -> f64 {
        if self.reverse {
            -b * (x - d)
        } else {
            b * (x - d)
        }
    }
}

impl CurveFunction for GompertzModel {
    fn model(&self) -> FitModel {
        if self.reverse {
            FitModel::ReverseGompertz
        } else {
            FitModel::Gompertz
        }
    }

    fn parameter_names(&self) -> &'static [&'static str] {
        &["a", "b", "c", "d"]
    }

    fn value(&self, x: f64, params: &[f64]) -> f64 {
        let (a, b, c, d) = (params[0], params[1], params[2], params[3]);
        let g = (-self.exponent(x, b, d).exp()).exp();
        if self.reverse {
            a + (c - a) * (1.0 - g)
        } else {
            a + (c - a) * g
        }
    }

    fn jacobian(&self, x: &Array1<f64>, params: &Array1<f64>) -> Option<Array2<f64>> {
        let (a, b, c, d) = (params[0], params[1], params[2], params[3]);
        let mut jac = Array2::zeros((x.len(), 4));
        for (i, &xi) in x.iter().enumerate() {
            let u = self.exponent(xi, b, d);
            let e = u.exp();
            let g = (-e).exp();
            // e * g without the inf * 0 product
            let w = (u - e).exp();
            if self.reverse {
                jac[[i, 0]] = g;
                jac[[i, 1]] = -(c - a) * (xi - d) * w;
                jac[[i, 2]] = 1.0 - g;
                jac[[i, 3]] = (c - a) * b * w;
            } else {
                jac[[i, 0]] = 1.0 - g;
                jac[[i, 1]] = -(c - a) * (xi - d) * w;
                jac[[i, 2]] = g;
                jac[[i, 3]] = (c - a) * b * w;
            }
        }
        Some(jac)
    }

    fn initial_guess(&self, x: &Array1<f64>, y: &Array1<f64>) -> Result<Array1<f64>> {
        let summary = SeriesSummary::from_series(x, y)?;
        Ok(Array1::from(vec![
            summary.y_min,
            0.2,
            summary.y_max + 5.0,
            summary.x_median,
        ]))
    }

    fn method(&self) -> SolverMethod {
        SolverMethod::BoundedTrustRegion
    }
}
