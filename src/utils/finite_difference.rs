//! Finite difference methods for numerical differentiation.
//!
//! Used as the Jacobian of last resort for problems that do not supply an
//! analytic one.

use crate::error::{FitError, Result};
use crate::problem::Problem;
use ndarray::{Array1, Array2};

/// Relative step size of the forward differences.
const DEFAULT_EPSILON: f64 = 1e-8;

/// Forward-difference Jacobian of `problem`'s residuals, one row per residual.
///
/// The step for parameter `j` is `epsilon * |p_j|`, or `epsilon` itself when
/// `|p_j|` is below it.
pub fn jacobian(
    problem: &dyn Problem,
    params: &Array1<f64>,
    epsilon: Option<f64>,
) -> Result<Array2<f64>> {
    let eps = epsilon.unwrap_or(DEFAULT_EPSILON);
    let base = problem.eval(params)?;
    if base.len() != problem.residual_count() {
        return Err(FitError::DimensionMismatch(format!(
            "Problem reports {} residuals but evaluated {}",
            problem.residual_count(),
            base.len()
        )));
    }

    let mut jac = Array2::zeros((base.len(), params.len()));
    let mut shifted = params.clone();
    for (j, mut column) in jac.columns_mut().into_iter().enumerate() {
        let scale = params[j].abs();
        let h = if scale > eps { eps * scale } else { eps };
        shifted[j] = params[j] + h;
        let forward = problem.eval(&shifted)?;
        shifted[j] = params[j];
        column.assign(&((forward - &base) / h));
    }

    Ok(jac)
}
