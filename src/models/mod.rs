//! Built-in recruitment-curve families.
//!
//! This module provides the five curve functions a recruitment curve can be
//! fitted with: the two-parameter cubic, the logistic and Boltzmann sigmoids,
//! and the Gompertz curve with its reversed form.

use ndarray::Array1;

use crate::error::{FitError, Result};
use crate::model::{CurveFunction, FitModel};
use crate::utils::{median, min_max};

mod gompertz;
mod polynomial;
mod sigmoid;

pub use gompertz::GompertzModel;
pub use polynomial::CubicModel;
pub use sigmoid::{BoltzmannModel, LogisticModel};

static CUBIC: CubicModel = CubicModel;
static LOGISTIC: LogisticModel = LogisticModel;
static GOMPERTZ: GompertzModel = GompertzModel::new(false);
static REVERSE_GOMPERTZ: GompertzModel = GompertzModel::new(true);
static BOLTZMANN: BoltzmannModel = BoltzmannModel;

/// The curve function implementing `model`.
pub fn curve_for(model: FitModel) -> &'static dyn CurveFunction {
    match model {
        FitModel::Cubic => &CUBIC,
        FitModel::Logistic => &LOGISTIC,
        FitModel::Gompertz => &GOMPERTZ,
        FitModel::ReverseGompertz => &REVERSE_GOMPERTZ,
        FitModel::Boltzmann => &BOLTZMANN,
    }
}

/// Data summary the sigmoid seeds are built from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct SeriesSummary {
    pub y_min: f64,
    pub y_max: f64,
    pub x_median: f64,
}

impl SeriesSummary {
    pub(crate) fn from_series(x: &Array1<f64>, y: &Array1<f64>) -> Result<Self> {
        let x_median = median(&x.to_vec()).ok_or_else(|| {
            FitError::InvalidInput(
                "Cannot seed parameters from an empty or NaN x series".to_string(),
            )
        })?;
        let (y_min, y_max) = min_max(&y.to_vec()).ok_or_else(|| {
            FitError::InvalidInput("Cannot seed parameters from an empty y series".to_string())
        })?;
        Ok(Self {
            y_min,
            y_max,
            x_median,
        })
    }
}
