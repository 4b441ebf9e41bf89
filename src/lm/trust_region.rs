//! Damping control for the Levenberg-Marquardt algorithm.
//!
//! The damping parameter adapts to the agreement between predicted and actual
//! reduction in cost.

use super::config::LmConfig;

/// Trust region state for the Levenberg-Marquardt algorithm.
#[derive(Debug, Clone)]
pub struct TrustRegion {
    /// Current value of the damping parameter
    pub lambda: f64,

    /// Minimum allowed value for the damping parameter
    pub lambda_min: f64,

    /// Maximum allowed value for the damping parameter
    pub lambda_max: f64,

    /// Factor to increase lambda by when step is rejected
    pub lambda_increase_factor: f64,

    /// Factor to decrease lambda by when step is accepted
    pub lambda_decrease_factor: f64,

    /// Minimum gain ratio required to accept a step
    pub min_gain_ratio: f64,

    /// Gain ratio above which lambda is decreased
    pub good_gain_ratio: f64,
}

impl Default for TrustRegion {
    fn default() -> Self {
        Self::from_config(&LmConfig::default())
    }
}

impl TrustRegion {
    /// Creates a trust region from the solver configuration.
    pub fn from_config(config: &LmConfig) -> Self {
        Self {
            lambda: config.initial_lambda,
            lambda_min: config.min_lambda,
            lambda_max: config.max_lambda,
            lambda_increase_factor: config.lambda_up_factor,
            lambda_decrease_factor: config.lambda_down_factor,
            min_gain_ratio: 1e-3,
            good_gain_ratio: 0.75,
        }
    }

    /// Updates the damping parameter based on the gain ratio.
    ///
    /// Returns whether the step is accepted.
    pub fn update_lambda(&mut self, gain_ratio: f64) -> bool {
        if gain_ratio > self.min_gain_ratio {
            if gain_ratio > self.good_gain_ratio {
                self.lambda = (self.lambda * self.lambda_decrease_factor).max(self.lambda_min);
            }
            true
        } else {
            self.lambda = (self.lambda * self.lambda_increase_factor).min(self.lambda_max);
            false
        }
    }

    /// True once rejected steps have driven lambda to its maximum.
    pub fn is_exhausted(&self) -> bool {
        self.lambda >= self.lambda_max
    }

    /// Calculates the gain ratio between actual and predicted reduction.
    ///
    /// A non-finite new cost yields a negative ratio so the step is rejected.
    pub fn gain_ratio(current_cost: f64, new_cost: f64, predicted_reduction: f64) -> f64 {
        if !new_cost.is_finite() {
            return -1.0;
        }
        let actual_reduction = current_cost - new_cost;

        if predicted_reduction.abs() < f64::MIN_POSITIVE {
            if actual_reduction.abs() < f64::MIN_POSITIVE {
                1.0
            } else {
                0.0
            }
        } else {
            actual_reduction / predicted_reduction
        }
    }
}
