//! Convergence criteria for the Levenberg-Marquardt solver.
//!
//! This module defines the criteria used to determine when the solver has
//! converged to a solution.

use ndarray::Array1;

use super::config::LmConfig;

/// The criterion that ended a successful solve.
///
/// Budget exhaustion, timeouts and numerical failures are reported as
/// [`FitError`](crate::error::FitError) values, never as a status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConvergenceStatus {
    /// The algorithm has converged due to a small parameter change.
    ParameterConvergence,

    /// The algorithm has converged due to a small function value change.
    FunctionValueConvergence,

    /// The algorithm has converged due to a small gradient.
    GradientConvergence,
}

impl ConvergenceStatus {
    /// Returns a description of the convergence status.
    pub fn description(&self) -> &'static str {
        match self {
            ConvergenceStatus::ParameterConvergence => "Converged: small parameter change",
            ConvergenceStatus::FunctionValueConvergence => "Converged: small function value change",
            ConvergenceStatus::GradientConvergence => "Converged: small gradient",
        }
    }
}

/// Criteria for determining when the solver has converged.
#[derive(Debug, Clone)]
pub struct ConvergenceCriteria {
    /// Tolerance for relative change in parameter values.
    pub xtol: f64,

    /// Tolerance for relative reduction of the cost.
    pub ftol: f64,

    /// Tolerance for the gradient's largest component.
    pub gtol: f64,

    /// Maximum number of residual evaluations.
    pub max_evaluations: usize,
}

impl Default for ConvergenceCriteria {
    fn default() -> Self {
        Self::from(&LmConfig::default())
    }
}

impl From<&LmConfig> for ConvergenceCriteria {
    fn from(config: &LmConfig) -> Self {
        Self {
            xtol: config.xtol,
            ftol: config.ftol,
            gtol: config.gtol,
            max_evaluations: config.max_evaluations,
        }
    }
}

impl ConvergenceCriteria {
    /// Creates a new set of convergence criteria with the given tolerances.
    pub fn new(xtol: f64, ftol: f64, gtol: f64, max_evaluations: usize) -> Self {
        Self {
            xtol,
            ftol,
            gtol,
            max_evaluations,
        }
    }

    /// `max |g_i| <= gtol`
    pub fn gradient_converged(&self, gradient: &Array1<f64>) -> bool {
        gradient.iter().fold(0.0f64, |acc, g| acc.max(g.abs())) <= self.gtol
    }

    /// `‖δ‖ <= xtol · (xtol + ‖p‖)`
    pub fn step_converged(&self, step_norm: f64, param_norm: f64) -> bool {
        step_norm <= self.xtol * (self.xtol + param_norm)
    }

    /// Relative cost reduction of an accepted step below `ftol`.
    pub fn cost_converged(&self, reduction: f64, previous_cost: f64) -> bool {
        reduction <= self.ftol * previous_cost
    }

    /// True once `func_evals` has used up the evaluation budget.
    pub fn budget_exhausted(&self, func_evals: usize) -> bool {
        func_evals >= self.max_evaluations
    }
}
