//! Fit engine: seeds, solves and resamples recruitment curves.
//!
//! [`FitEngine::fit_single`] fits exactly one model. [`FitEngine::fit`] runs
//! the fallback chain starting at the requested model and returns a
//! [`FitResult`] tagged with both the requested and the effective model.

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::time::Duration;

use ndarray::Array1;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{FitError, Result};
use crate::fallback::{FailedAttempt, FallbackChain};
use crate::lm::{Bounds, ConvergenceStatus, LevenbergMarquardt, LmConfig, SolverMethod};
use crate::model::{CurveProblem, FitModel};
use crate::utils::{linspace, min_max};

/// Number of samples in a fitted curve.
pub const DEFAULT_SAMPLES: usize = 100;

/// Maximum number of residual evaluations per model fit.
pub const DEFAULT_MAX_EVALUATIONS: usize = 50_000;

/// Fit engine configuration.
///
/// Missing fields take their defaults when deserializing, so a JSON document
/// only needs to name what it changes:
///
/// ```
/// use tms_regression::{FitConfig, FitModel};
///
/// let config = FitConfig::from_json_str(r#"{
///     "timeout_ms": 250,
///     "bounds": { "Boltzmann": [
///         { "min": 0.0 }, {}, { "min": 0.0, "max": 5.0 }, { "max": null }
///     ] }
/// }"#).unwrap();
/// assert_eq!(config.samples, 100);
/// assert_eq!(config.bounds[&FitModel::Boltzmann].len(), 4);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FitConfig {
    /// Maximum number of residual evaluations per model. Default: 50000
    pub max_evaluations: usize,

    /// Relative cost reduction tolerance. Default: 1e-8
    pub ftol: f64,

    /// Relative parameter step tolerance. Default: 1e-8
    pub xtol: f64,

    /// Gradient tolerance. Default: 1e-8
    pub gtol: f64,

    /// Wall-clock budget per model fit in milliseconds. Default: none
    pub timeout_ms: Option<u64>,

    /// Number of samples in the fitted curve. Default: 100
    pub samples: usize,

    /// Parameter bounds per model, overriding the model's own.
    pub bounds: HashMap<FitModel, Vec<Bounds>>,
}

impl Default for FitConfig {
    fn default() -> Self {
        Self {
            max_evaluations: DEFAULT_MAX_EVALUATIONS,
            ftol: 1e-8,
            xtol: 1e-8,
            gtol: 1e-8,
            timeout_ms: None,
            samples: DEFAULT_SAMPLES,
            bounds: HashMap::new(),
        }
    }
}

impl FitConfig {
    /// Parses and validates a JSON configuration.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: FitConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a JSON configuration file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Checks that budgets and tolerances are usable.
    pub fn validate(&self) -> Result<()> {
        if self.max_evaluations == 0 {
            return Err(FitError::Config(
                "max_evaluations must be positive".to_string(),
            ));
        }
        if self.samples < 2 {
            return Err(FitError::Config(format!(
                "samples must be at least 2, got {}",
                self.samples
            )));
        }
        for (name, tol) in [("ftol", self.ftol), ("xtol", self.xtol), ("gtol", self.gtol)] {
            if !tol.is_finite() || tol < 0.0 {
                return Err(FitError::Config(format!(
                    "{} must be a non-negative number, got {}",
                    name, tol
                )));
            }
        }
        for (model, bounds) in &self.bounds {
            if bounds.len() != model.curve().parameter_count() {
                return Err(FitError::Config(format!(
                    "{} has {} parameters, but {} bounds were given",
                    model,
                    model.curve().parameter_count(),
                    bounds.len()
                )));
            }
        }
        Ok(())
    }

    /// Set the evaluation budget.
    pub fn with_max_evaluations(mut self, max_evaluations: usize) -> Self {
        self.max_evaluations = max_evaluations;
        self
    }

    /// Set the cost reduction tolerance.
    pub fn with_ftol(mut self, ftol: f64) -> Self {
        self.ftol = ftol;
        self
    }

    /// Set the parameter step tolerance.
    pub fn with_xtol(mut self, xtol: f64) -> Self {
        self.xtol = xtol;
        self
    }

    /// Set the gradient tolerance.
    pub fn with_gtol(mut self, gtol: f64) -> Self {
        self.gtol = gtol;
        self
    }

    /// Set the wall-clock budget per model fit.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = Some(u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX));
        self
    }

    /// Set the number of curve samples.
    pub fn with_samples(mut self, samples: usize) -> Self {
        self.samples = samples;
        self
    }

    /// Set the parameter bounds used for `model`.
    pub fn with_bounds(mut self, model: FitModel, bounds: Vec<Bounds>) -> Self {
        self.bounds.insert(model, bounds);
        self
    }

    /// The wall-clock budget per model fit.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }

    /// Solver configuration for a model fitted with `method`.
    pub fn lm_config(&self, method: SolverMethod) -> LmConfig {
        LmConfig {
            max_evaluations: self.max_evaluations,
            ftol: self.ftol,
            xtol: self.xtol,
            gtol: self.gtol,
            method,
            timeout: self.timeout(),
            ..LmConfig::default()
        }
    }
}

/// The fit of a single model.
#[derive(Debug, Clone, PartialEq)]
pub struct FitOutcome {
    /// The fitted model.
    pub model: FitModel,
    /// Fitted parameter values, in [`FitModel::parameter_names`] order.
    pub params: Vec<f64>,
    /// Fitted minus observed response at each input point.
    pub residuals: Vec<f64>,
    /// Final sum of squared residuals.
    pub cost: f64,
    /// Accepted solver steps.
    pub iterations: usize,
    /// Residual evaluations.
    pub func_evals: usize,
    /// Why the solver stopped.
    pub status: ConvergenceStatus,
    /// Evenly spaced stimulus intensities over the input range.
    pub xx: Vec<f64>,
    /// Fitted curve at `xx`.
    pub yy: Vec<f64>,
}

/// A fitted recruitment curve together with the request that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct FitResult {
    /// Input stimulus intensities.
    pub x: Vec<i64>,
    /// Input response amplitudes.
    pub y: Vec<f64>,
    /// The model that was asked for. This is the cache identity.
    pub requested: FitModel,
    /// The model that produced the curve.
    pub model: FitModel,
    /// Fitted parameter values of `model`.
    pub params: Vec<f64>,
    /// Final sum of squared residuals.
    pub cost: f64,
    /// Accepted solver steps of the successful fit.
    pub iterations: usize,
    /// Residual evaluations of the successful fit.
    pub func_evals: usize,
    /// Models that failed before `model` succeeded.
    pub failed_attempts: Vec<FailedAttempt>,
    /// Evenly spaced stimulus intensities over `[min(x), max(x)]`.
    pub xx: Vec<f64>,
    /// Fitted curve at `xx`.
    pub yy: Vec<f64>,
}

impl FitResult {
    fn new(
        x: &[i64],
        y: &[f64],
        requested: FitModel,
        outcome: FitOutcome,
        failed_attempts: Vec<FailedAttempt>,
    ) -> Self {
        Self {
            x: x.to_vec(),
            y: y.to_vec(),
            requested,
            model: outcome.model,
            params: outcome.params,
            cost: outcome.cost,
            iterations: outcome.iterations,
            func_evals: outcome.func_evals,
            failed_attempts,
            xx: outcome.xx,
            yy: outcome.yy,
        }
    }

    /// Whether this result answers a request for `(x, y, model)`.
    ///
    /// Amplitudes are compared with `==`; no tolerance is applied.
    pub fn matches(&self, x: &[i64], y: &[f64], model: FitModel) -> bool {
        self.requested == model && self.x == x && self.y == y
    }

    /// Whether the curve comes from a fallback model.
    pub fn fell_back(&self) -> bool {
        self.model != self.requested
    }

    /// The fitted curve as `(xx, yy)`.
    pub fn curve(&self) -> (Vec<f64>, Vec<f64>) {
        (self.xx.clone(), self.yy.clone())
    }
}

/// Fits recruitment curves to stimulus/response series.
#[derive(Debug, Clone, Default)]
pub struct FitEngine {
    config: FitConfig,
    initial_guesses: HashMap<FitModel, Array1<f64>>,
}

impl FitEngine {
    /// Create an engine with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an engine with the given configuration.
    pub fn with_config(config: FitConfig) -> Self {
        Self {
            config,
            initial_guesses: HashMap::new(),
        }
    }

    /// Get the configuration.
    pub fn config(&self) -> &FitConfig {
        &self.config
    }

    /// Start every fit of `model` from `params` instead of the model's seed.
    pub fn with_initial_guess(mut self, model: FitModel, params: Array1<f64>) -> Self {
        self.initial_guesses.insert(model, params);
        self
    }

    /// Fit `model` to the series without falling back.
    pub fn fit_single(&self, model: FitModel, x: &[i64], y: &[f64]) -> Result<FitOutcome> {
        let (x, y) = self.prepare(x, y)?;
        self.solve(model, &x, &y)
    }

    /// Fit `model` to the series, falling back along the model chain until a
    /// fit succeeds.
    ///
    /// # Errors
    ///
    /// * `InvalidInput` / `DimensionMismatch` for malformed series
    /// * `Config` for an invalid configuration
    /// * `NoModelConverged` when every model of the chain failed
    pub fn fit(&self, model: FitModel, x: &[i64], y: &[f64]) -> Result<FitResult> {
        let (xf, yf) = self.prepare(x, y)?;
        let chain = FallbackChain::for_model(model, |step| self.solve(step, &xf, &yf));
        let outcome = chain.run()?;
        Ok(FitResult::new(x, y, model, outcome.value, outcome.attempts))
    }

    /// Validates the request and converts it to solver arrays.
    fn prepare(&self, x: &[i64], y: &[f64]) -> Result<(Array1<f64>, Array1<f64>)> {
        self.config.validate()?;
        validate_series(x, y)?;
        Ok((
            x.iter().map(|&xi| xi as f64).collect(),
            Array1::from(y.to_vec()),
        ))
    }

    fn solve(&self, model: FitModel, x: &Array1<f64>, y: &Array1<f64>) -> Result<FitOutcome> {
        let curve = model.curve();
        let problem = CurveProblem::new(curve, x.clone(), y.clone())?;

        let initial = match self.initial_guesses.get(&model) {
            Some(params) => params.clone(),
            None => curve.initial_guess(x, y)?,
        };
        let bounds = self
            .config
            .bounds
            .get(&model)
            .cloned()
            .or_else(|| curve.bounds());

        let solver = LevenbergMarquardt::with_config(self.config.lm_config(curve.method()));
        let result = solver.minimize_bounded(&problem, initial, bounds.as_deref())?;

        let x_values = x.to_vec();
        let (lo, hi) = min_max(&x_values)
            .ok_or_else(|| FitError::InvalidInput("Empty stimulus series".to_string()))?;
        let xx = linspace(lo, hi, self.config.samples);
        let yy = curve.eval(&xx, &result.params)?;
        if yy.iter().any(|v| !v.is_finite()) {
            return Err(FitError::NumericalError(format!(
                "{} curve is not finite over [{}, {}]",
                model, lo, hi
            )));
        }

        debug!(
            model = %model,
            cost = result.cost,
            iterations = result.iterations,
            "model fit converged"
        );
        Ok(FitOutcome {
            model,
            params: result.params.to_vec(),
            residuals: result.residuals.to_vec(),
            cost: result.cost,
            iterations: result.iterations,
            func_evals: result.func_evals,
            status: result.status,
            xx: xx.to_vec(),
            yy: yy.to_vec(),
        })
    }
}

/// Checks a stimulus/response series before any model is tried.
pub fn validate_series(x: &[i64], y: &[f64]) -> Result<()> {
    if x.is_empty() {
        return Err(FitError::InvalidInput("Empty stimulus series".to_string()));
    }
    if x.len() != y.len() {
        return Err(FitError::DimensionMismatch(format!(
            "x has {} values, y has {}",
            x.len(),
            y.len()
        )));
    }
    if let Some(i) = y.iter().position(|v| !v.is_finite()) {
        return Err(FitError::InvalidInput(format!(
            "Response amplitude {} is not finite ({})",
            i, y[i]
        )));
    }
    Ok(())
}
