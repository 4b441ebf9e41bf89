//! Levenberg-Marquardt algorithm implementation.
//!
//! This module provides the nonlinear least-squares solver used for every
//! curve fit, with an unconstrained method and a bounded trust-region method.

pub mod algorithm;
pub mod bounds;
pub mod config;
pub mod convergence;
pub mod step;
pub mod trust_region;

// Re-export key types
pub use algorithm::{LevenbergMarquardt, LmResult};
pub use bounds::Bounds;
pub use config::{DecompositionMethod, LmConfig, SolverMethod};
pub use convergence::{ConvergenceCriteria, ConvergenceStatus};
pub use step::LmStep;
pub use trust_region::TrustRegion;
