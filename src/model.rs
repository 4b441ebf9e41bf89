//! Model identities and the curve-function interface.
//!
//! This module defines [`FitModel`], the closed set of recruitment-curve
//! families, the [`CurveFunction`] trait every family implements, and
//! [`CurveProblem`], the adapter that turns a curve plus a data series into a
//! least-squares [`Problem`].

use std::fmt;
use std::str::FromStr;

use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

use crate::error::{FitError, Result};
use crate::lm::{Bounds, SolverMethod};
use crate::models;
use crate::problem::Problem;
use crate::utils::finite_difference;

/// One of the parametric families a recruitment curve can be fitted with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FitModel {
    /// `a·x³ + a·x² + a·x + b`
    Cubic,
    /// `a + (c − a) / (1 + exp(b·(x − d)))`
    Logistic,
    /// `a + (c − a)·exp(−exp(b·(x − d)))`
    #[serde(alias = "Gombertz")]
    Gompertz,
    /// `a + (c − a)·(1 − exp(−exp(−b·(x − d))))`
    #[serde(alias = "ReverseGombertz")]
    ReverseGompertz,
    /// `L / (1 + exp(−k·(x − x0))) + b`
    Boltzmann,
}

impl FitModel {
    /// Every model, in declaration order.
    pub const ALL: [FitModel; 5] = [
        FitModel::Cubic,
        FitModel::Logistic,
        FitModel::Gompertz,
        FitModel::ReverseGompertz,
        FitModel::Boltzmann,
    ];

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            FitModel::Cubic => "Cubic",
            FitModel::Logistic => "Logistic",
            FitModel::Gompertz => "Gompertz",
            FitModel::ReverseGompertz => "Reverse Gompertz",
            FitModel::Boltzmann => "Boltzmann",
        }
    }

    /// The model tried next when a fit with this one fails.
    ///
    /// Cubic is the end of every chain and has no successor.
    pub fn fallback(&self) -> Option<FitModel> {
        match self {
            FitModel::Logistic => Some(FitModel::Gompertz),
            FitModel::Gompertz => Some(FitModel::Boltzmann),
            FitModel::ReverseGompertz => Some(FitModel::Boltzmann),
            FitModel::Boltzmann => Some(FitModel::Cubic),
            FitModel::Cubic => None,
        }
    }

    /// The curve function implementing this model.
    pub fn curve(&self) -> &'static dyn CurveFunction {
        models::curve_for(*self)
    }

    /// Names of the model's parameters, in solver order.
    pub fn parameter_names(&self) -> &'static [&'static str] {
        self.curve().parameter_names()
    }

    /// Solver method the model is fitted with.
    pub fn method(&self) -> SolverMethod {
        self.curve().method()
    }
}

impl Default for FitModel {
    fn default() -> Self {
        FitModel::Boltzmann
    }
}

impl fmt::Display for FitModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for FitModel {
    type Err = FitError;

    /// Parses labels case-insensitively, ignoring spaces, `-` and `_`.
    /// The "Gombertz" spellings used by the recording UI are accepted.
    fn from_str(s: &str) -> Result<Self> {
        let key: String = s
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '_'))
            .flat_map(char::to_lowercase)
            .collect();

        match key.as_str() {
            "cubic" => Ok(FitModel::Cubic),
            "logistic" => Ok(FitModel::Logistic),
            "gompertz" | "gombertz" => Ok(FitModel::Gompertz),
            "reversegompertz" | "reversegombertz" => Ok(FitModel::ReverseGompertz),
            "boltzmann" | "boltzman" => Ok(FitModel::Boltzmann),
            _ => Err(FitError::InvalidInput(format!("Unknown model '{}'", s))),
        }
    }
}

/// A parametric curve `f(x; p)` that can be fitted by least squares.
///
/// Implementations are stateless; parameters are passed to every call in the
/// order given by [`CurveFunction::parameter_names`].
pub trait CurveFunction: Send + Sync {
    /// The model this curve implements.
    fn model(&self) -> FitModel;

    /// Names of the parameters, in solver order.
    fn parameter_names(&self) -> &'static [&'static str];

    /// Number of free parameters.
    fn parameter_count(&self) -> usize {
        self.parameter_names().len()
    }

    /// Evaluates the curve at a single point.
    ///
    /// Overflowing exponentials produce non-finite values rather than panicking.
    fn value(&self, x: f64, params: &[f64]) -> f64;

    /// Evaluates the curve at every point of `x`.
    fn eval(&self, x: &Array1<f64>, params: &Array1<f64>) -> Result<Array1<f64>> {
        let params = self.check_params(params)?;
        Ok(x.mapv(|xi| self.value(xi, params)))
    }

    /// Analytic Jacobian of the curve with respect to its parameters, one row
    /// per point of `x`. `None` means the caller should differentiate
    /// numerically.
    fn jacobian(&self, _x: &Array1<f64>, _params: &Array1<f64>) -> Option<Array2<f64>> {
        None
    }

    /// Starting parameters derived from the data.
    fn initial_guess(&self, x: &Array1<f64>, y: &Array1<f64>) -> Result<Array1<f64>>;

    /// Solver method the curve is fitted with.
    fn method(&self) -> SolverMethod {
        SolverMethod::Unconstrained
    }

    /// Default parameter bounds; `None` leaves every parameter free.
    fn bounds(&self) -> Option<Vec<Bounds>> {
        None
    }

    /// Checks the parameter vector length and exposes it as a slice.
    fn check_params<'a>(&self, params: &'a Array1<f64>) -> Result<&'a [f64]> {
        if params.len() != self.parameter_count() {
            return Err(FitError::DimensionMismatch(format!(
                "{} expects {} parameters, got {}",
                self.model(),
                self.parameter_count(),
                params.len()
            )));
        }
        params.as_slice().ok_or_else(|| {
            FitError::DimensionMismatch("Parameter vector is not contiguous".to_string())
        })
    }
}

/// Adapter fitting a [`CurveFunction`] to an observed series.
///
/// Residuals are `f(x_i; p) − y_i`.
pub struct CurveProblem<'a> {
    curve: &'a dyn CurveFunction,
    x: Array1<f64>,
    y: Array1<f64>,
}

impl<'a> CurveProblem<'a> {
    /// Creates a problem for `curve` over the series `(x, y)`.
    pub fn new(curve: &'a dyn CurveFunction, x: Array1<f64>, y: Array1<f64>) -> Result<Self> {
        if x.len() != y.len() {
            return Err(FitError::DimensionMismatch(format!(
                "x has {} values, y has {}",
                x.len(),
                y.len()
            )));
        }
        Ok(Self { curve, x, y })
    }

    /// The curve being fitted.
    pub fn curve(&self) -> &dyn CurveFunction {
        self.curve
    }

    /// Independent variable values.
    pub fn x(&self) -> &Array1<f64> {
        &self.x
    }

    /// Observed values.
    pub fn y(&self) -> &Array1<f64> {
        &self.y
    }
}

impl Problem for CurveProblem<'_> {
    fn eval(&self, params: &Array1<f64>) -> Result<Array1<f64>> {
        let predicted = self.curve.eval(&self.x, params)?;
        Ok(predicted - &self.y)
    }

    fn parameter_count(&self) -> usize {
        self.curve.parameter_count()
    }

    fn residual_count(&self) -> usize {
        self.x.len()
    }

    fn jacobian(&self, params: &Array1<f64>) -> Result<Array2<f64>> {
        self.curve.check_params(params)?;
        match self.curve.jacobian(&self.x, params) {
            Some(jacobian) => Ok(jacobian),
            None => finite_difference::jacobian(self, params, None),
        }
    }

    fn has_custom_jacobian(&self) -> bool {
        self.curve.jacobian(&self.x, &Array1::zeros(self.parameter_count())).is_some()
    }
}
