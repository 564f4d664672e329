//! Small numeric helpers for per-subject summaries.

/// Median of the values; the mean of the two middle values for even counts.
///
/// NaN values are ignored. Returns `None` when nothing is left.
pub fn median(values: impl IntoIterator<Item = f64>) -> Option<f64> {
    let mut sorted: Vec<f64> = values.into_iter().filter(|v| !v.is_nan()).collect();
    if sorted.is_empty() {
        return None;
    }
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

/// Round to the nearest integer, ties to even (`0.5 -> 0`, `1.5 -> 2`).
pub fn round_half_even(value: f64) -> f64 {
    value.round_ties_even()
}
