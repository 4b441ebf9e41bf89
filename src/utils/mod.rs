//! Utility functions and helpers for the tms-regression library.

pub mod finite_difference;
pub mod matrix_convert;
pub mod series;

pub use matrix_convert::{ndarray_to_nalgebra, ndarray_vec_to_nalgebra, nalgebra_vec_to_ndarray};
pub use series::{linspace, median, min_max};
