//! Box constraints for the bounded trust-region method.
//!
//! Each fitted parameter may carry a `[min, max]` interval. Candidate steps
//! that leave the box are reflected back off the violated bound, and initial
//! guesses are clipped into it.

use std::f64::{INFINITY, NEG_INFINITY};

use serde::{Deserialize, Serialize};

use crate::error::{FitError, Result};
use ndarray::Array1;

/// Represents the bounds constraints on a parameter.
///
/// Infinite limits serialize as `null` since JSON has no infinity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    /// Minimum allowed value for the parameter
    pub min: f64,

    /// Maximum allowed value for the parameter
    pub max: f64,
}

impl Serialize for Bounds {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeStruct;

        let mut state = serializer.serialize_struct("Bounds", 2)?;
        let min = self.min.is_finite().then_some(self.min);
        let max = self.max.is_finite().then_some(self.max);
        state.serialize_field("min", &min)?;
        state.serialize_field("max", &max)?;
        state.end()
    }
}

impl<'de> Deserialize<'de> for Bounds {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct BoundsHelper {
            #[serde(default)]
            min: Option<f64>,

            #[serde(default)]
            max: Option<f64>,
        }

        let helper = BoundsHelper::deserialize(deserializer)?;
        let bounds = Bounds {
            min: helper.min.unwrap_or(NEG_INFINITY),
            max: helper.max.unwrap_or(INFINITY),
        };
        if bounds.min > bounds.max {
            return Err(serde::de::Error::custom(format!(
                "min ({}) must not exceed max ({})",
                bounds.min, bounds.max
            )));
        }
        Ok(bounds)
    }
}

impl Default for Bounds {
    fn default() -> Self {
        Self {
            min: NEG_INFINITY,
            max: INFINITY,
        }
    }
}

impl Bounds {
    /// Create a new bounds constraint; fails if `min > max`.
    pub fn new(min: f64, max: f64) -> Result<Self> {
        if min.is_nan() || max.is_nan() || min > max {
            return Err(FitError::Config(format!(
                "Invalid bounds: min ({}) must not exceed max ({})",
                min, max
            )));
        }
        Ok(Self { min, max })
    }

    /// Create an unbounded constraint (negative infinity to positive infinity)
    pub fn unbounded() -> Self {
        Self::default()
    }

    /// Check if a value is within the bounds
    pub fn is_within_bounds(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    /// Both limits infinite.
    pub fn is_unbounded(&self) -> bool {
        self.min == NEG_INFINITY && self.max == INFINITY
    }

    /// Clip a value into the interval.
    pub fn clamp(&self, value: f64) -> f64 {
        value.max(self.min).min(self.max)
    }

    /// Reflect a value that left the interval back off the violated limit.
    ///
    /// With two finite limits the reflection is periodic, so arbitrarily long
    /// steps still land inside.
    pub fn reflect(&self, value: f64) -> f64 {
        if value.is_nan() || self.is_within_bounds(value) {
            return value;
        }
        match (self.min.is_finite(), self.max.is_finite()) {
            (true, true) => {
                let width = self.max - self.min;
                if width <= 0.0 {
                    return self.min;
                }
                let t = (value - self.min).rem_euclid(2.0 * width);
                if t <= width {
                    self.min + t
                } else {
                    self.max - (t - width)
                }
            }
            (true, false) => self.min + (self.min - value),
            (false, true) => self.max - (value - self.max),
            (false, false) => value,
        }
    }
}

/// Check that one `Bounds` is given per parameter.
pub fn check_len(bounds: &[Bounds], n_params: usize) -> Result<()> {
    if bounds.len() != n_params {
        return Err(FitError::DimensionMismatch(format!(
            "Expected bounds for {} parameters, got {}",
            n_params,
            bounds.len()
        )));
    }
    Ok(())
}

/// Clip every parameter into its interval.
pub fn project(bounds: &[Bounds], params: &mut Array1<f64>) {
    for (p, b) in params.iter_mut().zip(bounds) {
        *p = b.clamp(*p);
    }
}

/// Reflect every parameter into its interval.
pub fn reflect(bounds: &[Bounds], params: &mut Array1<f64>) {
    for (p, b) in params.iter_mut().zip(bounds) {
        *p = b.reflect(*p);
    }
}
