//! Small statistics over sample series used for seeding and resampling.

use ndarray::Array1;

/// Median of the values; the mean of the two central values for even lengths.
///
/// Returns `None` for an empty slice or when a value is NaN.
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() || values.iter().any(|v| v.is_nan()) {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

/// Minimum and maximum of the values, `None` when empty.
pub fn min_max(values: &[f64]) -> Option<(f64, f64)> {
    let first = *values.first()?;
    Some(
        values
            .iter()
            .fold((first, first), |(lo, hi), &v| (lo.min(v), hi.max(v))),
    )
}

/// `n` evenly spaced samples over `[start, end]`, endpoints included.
pub fn linspace(start: f64, end: f64, n: usize) -> Array1<f64> {
    let mut samples = Array1::linspace(start, end, n);
    // pin the last sample so the span is exact
    if let Some(last) = samples.iter_mut().last() {
        *last = end;
    }
    samples
}
