use thiserror::Error;

use crate::fallback::FailedAttempt;
use crate::model::FitModel;

/// Error types for the tms-regression library.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FitError {
    /// Error indicating a mismatch in series or matrix dimensions.
    #[error("Dimension mismatch: {0}")]
    DimensionMismatch(String),

    /// Invalid input data (empty series, non-finite amplitudes, ...).
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Fewer samples than free parameters.
    #[error("Underdetermined problem: {points} data points for {parameters} parameters")]
    Underdetermined { points: usize, parameters: usize },

    /// Error indicating the solver failed to converge.
    #[error("Algorithm failed to converge: {0}")]
    ConvergenceFailure(String),

    /// Non-finite residuals, Jacobian entries or curve samples.
    #[error("Numerical error: {0}")]
    NumericalError(String),

    /// Linear algebra error.
    #[error("Linear algebra error: {0}")]
    LinearAlgebraError(String),

    /// The solver exceeded its wall-clock budget.
    #[error("Solver timed out after {elapsed_ms} ms (limit {limit_ms} ms)")]
    Timeout { elapsed_ms: u64, limit_ms: u64 },

    /// Every model in the fallback chain failed.
    #[error("No model converged for {requested} ({} attempts)", attempts.len())]
    NoModelConverged {
        requested: FitModel,
        attempts: Vec<FailedAttempt>,
    },

    /// Invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl FitError {
    /// Returns true for failures the fallback chain may recover from.
    ///
    /// Malformed input is rejected before any model is tried, so it is never
    /// handed to the next model.
    pub fn is_recoverable(&self) -> bool {
        !matches!(
            self,
            FitError::InvalidInput(_) | FitError::DimensionMismatch(_) | FitError::Config(_)
        )
    }
}

impl From<serde_json::Error> for FitError {
    fn from(err: serde_json::Error) -> Self {
        FitError::Config(err.to_string())
    }
}

impl From<std::io::Error> for FitError {
    fn from(err: std::io::Error) -> Self {
        FitError::Config(err.to_string())
    }
}

/// Result type alias for tms-regression operations.
pub type Result<T> = std::result::Result<T, FitError>;
