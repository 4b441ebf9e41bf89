//! Step calculation for the Levenberg-Marquardt algorithm.
//!
//! This module solves the damped normal equations
//! `(JᵀJ + λ·D) δ = −Jᵀr` for the step `δ`, where `D` is the identity for the
//! unconstrained method and `diag(JᵀJ)` for the bounded trust-region method.

use nalgebra::DMatrix;
use ndarray::{Array1, Array2};

use super::config::{DecompositionMethod, SolverMethod};
use crate::error::{FitError, Result};
use crate::utils::{nalgebra_vec_to_ndarray, ndarray_to_nalgebra, ndarray_vec_to_nalgebra};

/// Floor for diagonal scaling entries so flat directions still get damped.
const MIN_SCALE: f64 = 1e-12;

/// Relative singular value cut-off for the SVD solve.
const SVD_EPS: f64 = 1e-14;

/// Handles step calculation for the Levenberg-Marquardt algorithm.
pub struct LmStep;

impl LmStep {
    /// Calculates the Levenberg-Marquardt step `δ`.
    ///
    /// # Arguments
    ///
    /// * `j_t_j` - `JᵀJ` at the current position
    /// * `gradient` - `Jᵀr` at the current position
    /// * `lambda` - The damping parameter
    /// * `method` - Selects the damping matrix
    /// * `decomposition` - The linear solver
    pub fn calculate_step(
        j_t_j: &Array2<f64>,
        gradient: &Array1<f64>,
        lambda: f64,
        method: SolverMethod,
        decomposition: DecompositionMethod,
    ) -> Result<Array1<f64>> {
        let mut augmented = j_t_j.clone();
        for i in 0..augmented.nrows() {
            let scale = match method {
                SolverMethod::Unconstrained => 1.0,
                SolverMethod::BoundedTrustRegion => j_t_j[[i, i]].max(MIN_SCALE),
            };
            augmented[[i, i]] += lambda * scale;
        }

        let a = ndarray_to_nalgebra(&augmented);
        let b = -ndarray_vec_to_nalgebra(gradient);

        let solution = match decomposition {
            DecompositionMethod::Cholesky => Self::solve_cholesky(a, &b),
            DecompositionMethod::SVD => Self::solve_svd(a, &b),
            DecompositionMethod::Auto => {
                Self::solve_cholesky(a.clone(), &b).or_else(|_| Self::solve_svd(a, &b))
            }
        }?;

        let step = nalgebra_vec_to_ndarray(&solution);
        if step.iter().any(|v| !v.is_finite()) {
            return Err(FitError::LinearAlgebraError(
                "Step contains non-finite values".to_string(),
            ));
        }

        Ok(step)
    }

    fn solve_cholesky(
        a: DMatrix<f64>,
        b: &nalgebra::DVector<f64>,
    ) -> Result<nalgebra::DVector<f64>> {
        a.cholesky()
            .map(|chol| chol.solve(b))
            .ok_or_else(|| {
                FitError::LinearAlgebraError(
                    "Damped normal matrix is not positive definite".to_string(),
                )
            })
    }

    fn solve_svd(a: DMatrix<f64>, b: &nalgebra::DVector<f64>) -> Result<nalgebra::DVector<f64>> {
        let svd = a.svd(true, true);
        let largest = svd.singular_values.iter().fold(0.0f64, |acc, s| acc.max(*s));
        svd.solve(b, largest * SVD_EPS)
            .map_err(|e| FitError::LinearAlgebraError(format!("SVD solve failed: {}", e)))
    }

    /// Predicted reduction of `‖r‖²` for a step under the linearized model.
    ///
    /// `‖r‖² − ‖r + Jδ‖² = −(2·δᵀJᵀr + δᵀJᵀJδ)`
    pub fn predicted_reduction(
        j_t_j: &Array2<f64>,
        gradient: &Array1<f64>,
        step: &Array1<f64>,
    ) -> f64 {
        -(2.0 * step.dot(gradient) + step.dot(&j_t_j.dot(step)))
    }
}
