//! Integration tests for the tms-regression library
//!
//! This module organizes all integration tests that test the library as a whole,
//! rather than individual components.

// Least-squares solver on hand-written problems
pub mod solver;

// Fitting the reference recruitment series with every model
pub mod round_trip;

// Fallback ordering and terminal failures
pub mod fallback;

// Memoization through the regression entry point
pub mod cache;

// Current model and scoped overrides
pub mod selection;

// Reproducible noisy recruitment data
pub mod noisy_data;

// JSON configuration
pub mod config;
