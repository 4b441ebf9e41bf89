//! Summary metrics of a fitted recruitment curve.

use serde::{Deserialize, Serialize};

use crate::error::{FitError, Result};
use crate::fit::FitResult;
use crate::utils::min_max;

/// Metrics derived from a sampled recruitment curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RecruitmentMetrics {
    /// Lowest response of the curve.
    pub baseline: f64,
    /// Highest response of the curve.
    pub plateau: f64,
    /// Midpoint between baseline and plateau.
    pub half_response: f64,
    /// Stimulus intensity at which the curve first reaches `half_response`.
    pub s50: f64,
    /// Slope of the curve at `s50`.
    pub slope: f64,
}

impl RecruitmentMetrics {
    /// Derives the metrics of a curve sampled at `xx`.
    ///
    /// S50 is linearly interpolated between the two samples that bracket the
    /// half response, and the slope is that segment's finite difference.
    ///
    /// # Errors
    ///
    /// * `InvalidInput` for mismatched, too short, non-finite or flat curves
    pub fn from_curve(xx: &[f64], yy: &[f64]) -> Result<Self> {
        if xx.len() != yy.len() {
            return Err(FitError::InvalidInput(format!(
                "Curve has {} intensities and {} responses",
                xx.len(),
                yy.len()
            )));
        }
        if xx.len() < 2 {
            return Err(FitError::InvalidInput(
                "Curve needs at least two samples".to_string(),
            ));
        }
        if xx.iter().chain(yy).any(|v| !v.is_finite()) {
            return Err(FitError::InvalidInput("Curve is not finite".to_string()));
        }

        let (baseline, plateau) = min_max(yy)
            .ok_or_else(|| FitError::InvalidInput("Curve is empty".to_string()))?;
        if plateau == baseline {
            return Err(FitError::InvalidInput(
                "Curve is flat, S50 is undefined".to_string(),
            ));
        }
        let half_response = (baseline + plateau) / 2.0;

        for i in 0..xx.len() - 1 {
            let (x0, x1) = (xx[i], xx[i + 1]);
            let (d0, d1) = (yy[i] - half_response, yy[i + 1] - half_response);
            if d0 == 0.0 || d1 == 0.0 || d0 * d1 < 0.0 {
                let t = if d0 == 0.0 { 0.0 } else { d0 / (d0 - d1) };
                let slope = if x1 != x0 {
                    (yy[i + 1] - yy[i]) / (x1 - x0)
                } else {
                    0.0
                };
                return Ok(Self {
                    baseline,
                    plateau,
                    half_response,
                    s50: x0 + t * (x1 - x0),
                    slope,
                });
            }
        }

        Err(FitError::NumericalError(
            "Curve never crosses its half response".to_string(),
        ))
    }

    /// Derives the metrics of a fitted result.
    pub fn from_result(result: &FitResult) -> Result<Self> {
        Self::from_curve(&result.xx, &result.yy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_linear_ramp() {
        let xx = [0.0, 1.0, 2.0, 3.0, 4.0];
        let yy = [0.0, 1.0, 2.0, 3.0, 4.0];
        let metrics = RecruitmentMetrics::from_curve(&xx, &yy).unwrap();
        assert_eq!(metrics.baseline, 0.0);
        assert_eq!(metrics.plateau, 4.0);
        assert_eq!(metrics.half_response, 2.0);
        assert_relative_eq!(metrics.s50, 2.0);
        assert_relative_eq!(metrics.slope, 1.0);
    }

    #[test]
    fn test_interpolates_between_samples() {
        let metrics =
            RecruitmentMetrics::from_curve(&[100.0, 110.0, 120.0], &[0.0, 0.5, 3.0]).unwrap();
        // half response 1.5 lies 40% of the way from 110 to 120
        assert_relative_eq!(metrics.s50, 114.0);
        assert_relative_eq!(metrics.slope, 0.25);
    }

    #[test]
    fn test_decreasing_curve() {
        let metrics = RecruitmentMetrics::from_curve(&[0.0, 10.0], &[3.0, 1.0]).unwrap();
        assert_relative_eq!(metrics.s50, 5.0);
        assert_relative_eq!(metrics.slope, -0.2);
    }

    #[test]
    fn test_rejects_degenerate_curves() {
        assert!(matches!(
            RecruitmentMetrics::from_curve(&[1.0, 2.0], &[1.0, 1.0]),
            Err(FitError::InvalidInput(_))
        ));
        assert!(matches!(
            RecruitmentMetrics::from_curve(&[1.0], &[1.0]),
            Err(FitError::InvalidInput(_))
        ));
        assert!(matches!(
            RecruitmentMetrics::from_curve(&[1.0, 2.0], &[1.0]),
            Err(FitError::InvalidInput(_))
        ));
        assert!(matches!(
            RecruitmentMetrics::from_curve(&[1.0, 2.0], &[1.0, f64::NAN]),
            Err(FitError::InvalidInput(_))
        ));
    }
}
