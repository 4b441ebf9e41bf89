//! Problem definition trait.
//!
//! This module defines the `Problem` trait, which represents a nonlinear
//! least squares problem to be solved with the Levenberg-Marquardt algorithm.

use crate::error::Result;
use ndarray::{Array1, Array2};

/// A trait representing a nonlinear least squares problem.
///
/// This trait defines the interface for problems that can be solved using
/// the Levenberg-Marquardt algorithm.
pub trait Problem {
    /// Evaluate the residuals (model minus data) at the given parameters.
    fn eval(&self, params: &Array1<f64>) -> Result<Array1<f64>>;

    /// Get the number of parameters in the problem.
    fn parameter_count(&self) -> usize;

    /// Get the number of residuals in the problem.
    fn residual_count(&self) -> usize;

    /// Evaluate the Jacobian matrix at the given parameters.
    ///
    /// The Jacobian is the matrix of partial derivatives of the residuals with respect
    /// to the parameters, one row per residual.
    ///
    /// # Default Implementation
    ///
    /// Forward finite differences over [`Problem::eval`].
    fn jacobian(&self, params: &Array1<f64>) -> Result<Array2<f64>>
    where
        Self: Sized,
    {
        crate::utils::finite_difference::jacobian(self, params, None)
    }

    /// Check if this problem provides a custom Jacobian implementation.
    fn has_custom_jacobian(&self) -> bool {
        false
    }

    /// Evaluate the sum of squared residuals at the given parameters.
    fn eval_cost(&self, params: &Array1<f64>) -> Result<f64> {
        let residuals = self.eval(params)?;
        Ok(residuals.iter().map(|r| r.powi(2)).sum())
    }
}
