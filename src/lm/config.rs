//! Configuration options for the Levenberg-Marquardt algorithm.
//!
//! This module defines the search method, the linear solver used for the
//! damped normal equations, and the tolerances and budgets that decide when a
//! fit has converged or failed.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Search method used by the solver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SolverMethod {
    /// Classic Levenberg-Marquardt: damping `λ·I`, no parameter bounds.
    Unconstrained,

    /// Trust-region-reflective style: damping scaled by `diag(JᵀJ)` and
    /// candidate steps reflected back into the parameter bounds.
    BoundedTrustRegion,
}

impl Default for SolverMethod {
    fn default() -> Self {
        SolverMethod::Unconstrained
    }
}

/// Method for solving the linear system in the Levenberg-Marquardt step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DecompositionMethod {
    /// Use Cholesky decomposition (fastest but requires positive definite matrix)
    Cholesky,

    /// Use SVD decomposition (slowest, handles rank-deficient matrices)
    SVD,

    /// Cholesky first, SVD when the damped matrix is not positive definite
    Auto,
}

impl Default for DecompositionMethod {
    fn default() -> Self {
        DecompositionMethod::Auto
    }
}

/// Configuration options for the Levenberg-Marquardt algorithm.
#[derive(Debug, Clone, PartialEq)]
pub struct LmConfig {
    /// Maximum number of residual evaluations. Default: 50000
    pub max_evaluations: usize,

    /// Tolerance for relative reduction of the cost. Default: 1e-8
    pub ftol: f64,

    /// Tolerance for relative change in parameter values. Default: 1e-8
    pub xtol: f64,

    /// Tolerance for the gradient's largest component. Default: 1e-8
    pub gtol: f64,

    /// Initial value for the damping parameter. Default: 1e-3
    pub initial_lambda: f64,

    /// Factor by which to increase lambda. Default: 10.0
    pub lambda_up_factor: f64,

    /// Factor by which to decrease lambda. Default: 0.1
    pub lambda_down_factor: f64,

    /// Minimum value for lambda. Default: 1e-15
    pub min_lambda: f64,

    /// Maximum value for lambda; reaching it ends the fit. Default: 1e16
    pub max_lambda: f64,

    /// Search method. Default: Unconstrained
    pub method: SolverMethod,

    /// Method to use for solving the linear system. Default: Auto
    pub decomposition_method: DecompositionMethod,

    /// Wall-clock budget for one minimization. Default: none
    pub timeout: Option<Duration>,
}

impl Default for LmConfig {
    fn default() -> Self {
        Self {
            max_evaluations: 50_000,
            ftol: 1e-8,
            xtol: 1e-8,
            gtol: 1e-8,
            initial_lambda: 1e-3,
            lambda_up_factor: 10.0,
            lambda_down_factor: 0.1,
            min_lambda: 1e-15,
            max_lambda: 1e16,
            method: SolverMethod::default(),
            decomposition_method: DecompositionMethod::default(),
            timeout: None,
        }
    }
}
