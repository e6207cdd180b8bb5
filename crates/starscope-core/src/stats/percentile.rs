/// Sort a sample in ascending order using IEEE total ordering.
pub fn sort_values(values: &mut [f64]) {
    values.sort_unstable_by(|a, b| a.total_cmp(b));
}

/// Nearest-rank-below percentile of an ascending slice:
/// `sorted[clamp(floor(p * (n - 1)), 0, n - 1)]`.
///
/// Returns `None` for an empty slice.
pub fn percentile_sorted(sorted: &[f64], p: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let last = sorted.len() - 1;
    let idx = (p * last as f64).floor();
    let idx = if idx.is_nan() || idx < 0.0 {
        0
    } else {
        (idx as usize).min(last)
    };
    Some(sorted[idx])
}
