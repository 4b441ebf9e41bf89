//! # tms-regression
//!
//! `tms-regression` fits recruitment curves to transcranial magnetic
//! stimulation (TMS) data: stimulus intensities on the x axis, motor-evoked
//! potential amplitudes on the y axis.
//!
//! The library provides:
//! - Five curve families (cubic, logistic, Gompertz, reverse Gompertz, Boltzmann)
//!   with analytic Jacobians and data-driven starting points
//! - A Levenberg-Marquardt least-squares solver with unconstrained and bounded
//!   trust-region methods
//! - A fallback chain that moves to a simpler model when a fit fails
//! - A result cache keyed by the exact input series and requested model
//! - Recruitment metrics (S50 and the slope at S50) of a fitted curve
//!
//! ## Basic Usage
//!
//! ```
//! use tms_regression::{FitModel, Regression};
//!
//! let regression = Regression::new();
//! let x = [90, 100, 110, 120, 130, 140];
//! let y = [0.2, 0.5, 1.1, 1.8, 2.0, 2.1];
//!
//! let (xx, yy) = regression.run_regression(&x, &y, Some(FitModel::Boltzmann)).unwrap();
//! assert_eq!(xx.len(), 100);
//! assert_eq!(xx[0], 90.0);
//! assert_eq!(xx[99], 140.0);
//! assert!(yy.windows(2).all(|w| w[0] <= w[1]));
//! ```

pub mod cache;
pub mod error;
pub mod fallback;
pub mod fit;
pub mod lm;
pub mod metrics;
pub mod model;
pub mod models;
pub mod problem;
pub mod regression;
pub mod selection;
pub mod utils;

// Re-exports for convenience
pub use cache::ResultCache;
pub use error::{FitError, Result};
pub use fallback::{FailedAttempt, FallbackChain};
pub use fit::{FitConfig, FitEngine, FitOutcome, FitResult};
pub use lm::LevenbergMarquardt;
pub use metrics::RecruitmentMetrics;
pub use model::{CurveFunction, FitModel};
pub use problem::Problem;
pub use regression::Regression;
pub use selection::{ModelOverride, SelectionMode};

/// Version of the library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
