//! Implementation of the Levenberg-Marquardt algorithm.
//!
//! This module contains the core damped least-squares loop used by every
//! curve fit. Failure to converge is reported as an error so that callers can
//! move on to another model.

use std::fmt;
use std::time::{Duration, Instant};

use ndarray::{Array1, Array2};
use tracing::debug;

use crate::error::{FitError, Result};
use crate::problem::Problem;

use super::bounds::{self, Bounds};
use super::config::{DecompositionMethod, LmConfig, SolverMethod};
use super::convergence::{ConvergenceCriteria, ConvergenceStatus};
use super::step::LmStep;
use super::trust_region::TrustRegion;

/// Result of a converged Levenberg-Marquardt minimization.
#[derive(Debug, Clone)]
pub struct LmResult {
    /// Optimized parameter values
    pub params: Array1<f64>,

    /// Residuals at the solution
    pub residuals: Array1<f64>,

    /// Sum of squared residuals
    pub cost: f64,

    /// Number of accepted steps
    pub iterations: usize,

    /// Number of residual evaluations
    pub func_evals: usize,

    /// Which criterion ended the run
    pub status: ConvergenceStatus,
}

impl fmt::Display for LmResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Optimization Result:")?;
        writeln!(f, "  Status: {}", self.status.description())?;
        writeln!(f, "  Cost: {:.6e}", self.cost)?;
        writeln!(f, "  Iterations: {}", self.iterations)?;
        writeln!(f, "  Function evaluations: {}", self.func_evals)?;
        writeln!(f, "  Parameters: {:?}", self.params)?;
        Ok(())
    }
}

/// The Levenberg-Marquardt optimizer.
#[derive(Debug, Clone, Default)]
pub struct LevenbergMarquardt {
    /// Configuration options
    config: LmConfig,
}

impl LevenbergMarquardt {
    /// Create a new Levenberg-Marquardt optimizer with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new Levenberg-Marquardt optimizer with the given configuration.
    pub fn with_config(config: LmConfig) -> Self {
        Self { config }
    }

    /// The active configuration.
    pub fn config(&self) -> &LmConfig {
        &self.config
    }

    /// Set the maximum number of residual evaluations.
    pub fn with_max_evaluations(mut self, max_evaluations: usize) -> Self {
        self.config.max_evaluations = max_evaluations;
        self
    }

    /// Set the tolerance for relative cost reduction.
    pub fn with_ftol(mut self, ftol: f64) -> Self {
        self.config.ftol = ftol;
        self
    }

    /// Set the tolerance for change in parameter values.
    pub fn with_xtol(mut self, xtol: f64) -> Self {
        self.config.xtol = xtol;
        self
    }

    /// Set the tolerance for gradient norm.
    pub fn with_gtol(mut self, gtol: f64) -> Self {
        self.config.gtol = gtol;
        self
    }

    /// Set the initial value for the damping parameter.
    pub fn with_lambda(mut self, lambda: f64) -> Self {
        self.config.initial_lambda = lambda;
        self
    }

    /// Set the search method.
    pub fn with_method(mut self, method: SolverMethod) -> Self {
        self.config.method = method;
        self
    }

    /// Set the method used for solving the linear system.
    pub fn with_decomposition_method(mut self, method: DecompositionMethod) -> Self {
        self.config.decomposition_method = method;
        self
    }

    /// Set the wall-clock budget.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = Some(timeout);
        self
    }

    /// Minimize the sum of squared residuals for the given problem.
    pub fn minimize<P: Problem>(
        &self,
        problem: &P,
        initial_params: Array1<f64>,
    ) -> Result<LmResult> {
        self.minimize_bounded(problem, initial_params, None)
    }

    /// Minimize the sum of squared residuals, keeping parameters inside
    /// `bounds` when given.
    ///
    /// # Errors
    ///
    /// * `Underdetermined` when the problem has fewer residuals than parameters
    /// * `NumericalError` when the start point or a Jacobian is not finite
    /// * `ConvergenceFailure` when the evaluation budget or damping is exhausted
    /// * `Timeout` when the configured wall-clock budget is exceeded
    pub fn minimize_bounded<P: Problem>(
        &self,
        problem: &P,
        initial_params: Array1<f64>,
        bounds: Option<&[Bounds]>,
    ) -> Result<LmResult> {
        let n_params = problem.parameter_count();
        if initial_params.len() != n_params {
            return Err(FitError::DimensionMismatch(format!(
                "Expected {} parameters, got {}",
                n_params,
                initial_params.len()
            )));
        }

        let n_residuals = problem.residual_count();
        if n_residuals < n_params {
            return Err(FitError::Underdetermined {
                points: n_residuals,
                parameters: n_params,
            });
        }

        let started = Instant::now();
        let criteria = ConvergenceCriteria::from(&self.config);
        let mut trust_region = TrustRegion::from_config(&self.config);

        let mut params = initial_params;
        if let Some(bounds) = bounds {
            bounds::check_len(bounds, n_params)?;
            bounds::project(bounds, &mut params);
        }

        let mut residuals = problem.eval(&params)?;
        let mut func_evals = 1;
        if residuals.iter().any(|r| !r.is_finite()) {
            return Err(FitError::NumericalError(
                "Residuals are not finite at the initial parameters".to_string(),
            ));
        }
        let mut cost = sum_of_squares(&residuals);
        let mut iterations = 0;

        loop {
            self.check_timeout(started)?;

            let jacobian = problem.jacobian(&params)?;
            if jacobian.iter().any(|v| !v.is_finite()) {
                return Err(FitError::NumericalError(format!(
                    "Jacobian is not finite after {} iterations",
                    iterations
                )));
            }
            let j_t_j: Array2<f64> = jacobian.t().dot(&jacobian);
            let gradient = jacobian.t().dot(&residuals);

            if criteria.gradient_converged(&gradient) {
                return Ok(self.finish(
                    params,
                    residuals,
                    cost,
                    iterations,
                    func_evals,
                    ConvergenceStatus::GradientConvergence,
                ));
            }

            // Inner loop: raise the damping until a step is accepted.
            loop {
                if criteria.budget_exhausted(func_evals) {
                    return Err(FitError::ConvergenceFailure(format!(
                        "Maximum number of function evaluations ({}) exceeded",
                        criteria.max_evaluations
                    )));
                }
                self.check_timeout(started)?;

                let step = match LmStep::calculate_step(
                    &j_t_j,
                    &gradient,
                    trust_region.lambda,
                    self.config.method,
                    self.config.decomposition_method,
                ) {
                    Ok(step) => step,
                    Err(err) => {
                        trust_region.update_lambda(0.0);
                        if trust_region.is_exhausted() {
                            return Err(err);
                        }
                        continue;
                    }
                };

                let mut candidate = &params + &step;
                if let Some(bounds) = bounds {
                    bounds::reflect(bounds, &mut candidate);
                }
                let applied = &candidate - &params;
                let small_step = criteria.step_converged(norm(&applied), norm(&params));

                let new_residuals = problem.eval(&candidate)?;
                func_evals += 1;
                let new_cost = if new_residuals.iter().all(|r| r.is_finite()) {
                    sum_of_squares(&new_residuals)
                } else {
                    f64::INFINITY
                };

                let predicted = LmStep::predicted_reduction(&j_t_j, &gradient, &applied);
                let gain = TrustRegion::gain_ratio(cost, new_cost, predicted);

                if trust_region.update_lambda(gain) {
                    let previous_cost = cost;
                    params = candidate;
                    residuals = new_residuals;
                    cost = new_cost;
                    iterations += 1;

                    if criteria.cost_converged(previous_cost - cost, previous_cost) {
                        return Ok(self.finish(
                            params,
                            residuals,
                            cost,
                            iterations,
                            func_evals,
                            ConvergenceStatus::FunctionValueConvergence,
                        ));
                    }
                    if small_step {
                        return Ok(self.finish(
                            params,
                            residuals,
                            cost,
                            iterations,
                            func_evals,
                            ConvergenceStatus::ParameterConvergence,
                        ));
                    }
                    break;
                }

                // A rejected step this small means no representable improvement is left.
                if small_step {
                    return Ok(self.finish(
                        params,
                        residuals,
                        cost,
                        iterations,
                        func_evals,
                        ConvergenceStatus::ParameterConvergence,
                    ));
                }
                if trust_region.is_exhausted() {
                    return Err(FitError::ConvergenceFailure(
                        "Failed to decrease cost, and damping reached maximum".to_string(),
                    ));
                }
            }
        }
    }

    fn check_timeout(&self, started: Instant) -> Result<()> {
        if let Some(limit) = self.config.timeout {
            let elapsed = started.elapsed();
            if elapsed >= limit {
                return Err(FitError::Timeout {
                    elapsed_ms: saturating_millis(elapsed),
                    limit_ms: saturating_millis(limit),
                });
            }
        }
        Ok(())
    }

    fn finish(
        &self,
        params: Array1<f64>,
        residuals: Array1<f64>,
        cost: f64,
        iterations: usize,
        func_evals: usize,
        status: ConvergenceStatus,
    ) -> LmResult {
        debug!(
            cost,
            iterations,
            func_evals,
            status = status.description(),
            "least-squares solve finished"
        );
        LmResult {
            params,
            residuals,
            cost,
            iterations,
            func_evals,
            status,
        }
    }
}

fn saturating_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

fn sum_of_squares(values: &Array1<f64>) -> f64 {
    values.iter().map(|v| v * v).sum()
}

fn norm(values: &Array1<f64>) -> f64 {
    sum_of_squares(values).sqrt()
}
