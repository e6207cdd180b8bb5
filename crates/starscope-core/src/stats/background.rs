use ndarray::Array2;
use serde::Serialize;

use crate::consts::{
    BACKGROUND_SAMPLE_LIMIT, EPSILON, MAD_TO_SIGMA, MAX_BACKGROUND_NOISE, MIN_BACKGROUND_NOISE,
    NOISE_HIGH_PERCENTILE, NOISE_LOW_PERCENTILE,
};

use super::percentile::{percentile_sorted, sort_values};

/// Robust background estimate for one tile.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct BackgroundStats {
    /// Median of the sample.
    pub median: f64,
    /// Median absolute deviation from `median`.
    pub mad: f64,
    /// `mad * 1.4826`.
    pub sigma: f64,
    /// Detection threshold, `median + k_sigma * sigma`.
    pub threshold: f64,
    pub p05: f64,
    pub p95: f64,
    /// `sigma / (p95 - p05)`, clamped to `[0.005, 0.25]`.
    pub noise: f64,
}

/// Estimate background level and noise from a systematic sample of `data`.
///
/// At most [`BACKGROUND_SAMPLE_LIMIT`] samples are drawn (every `stride`-th
/// pixel in row-major order). Non-finite samples are ignored.
pub fn estimate_background(data: &Array2<f32>, k_sigma: f32) -> BackgroundStats {
    let stride = data.len().div_ceil(BACKGROUND_SAMPLE_LIMIT).max(1);
    let mut sample: Vec<f64> = data
        .iter()
        .step_by(stride)
        .map(|&v| v as f64)
        .filter(|v| v.is_finite())
        .collect();

    if sample.is_empty() {
        return BackgroundStats {
            median: 0.0,
            mad: 0.0,
            sigma: 0.0,
            threshold: 0.0,
            p05: 0.0,
            p95: 0.0,
            noise: MIN_BACKGROUND_NOISE,
        };
    }

    sort_values(&mut sample);
    let median = percentile_sorted(&sample, 0.5).unwrap_or(0.0);
    let p05 = percentile_sorted(&sample, NOISE_LOW_PERCENTILE).unwrap_or(median);
    let p95 = percentile_sorted(&sample, NOISE_HIGH_PERCENTILE).unwrap_or(median);

    // Reuse the sample buffer for absolute deviations.
    for v in sample.iter_mut() {
        *v = (*v - median).abs();
    }
    sort_values(&mut sample);
    let mad = percentile_sorted(&sample, 0.5).unwrap_or(0.0);

    let sigma = mad * MAD_TO_SIGMA;
    let threshold = median + k_sigma as f64 * sigma;
    let noise = (sigma / (p95 - p05).max(EPSILON)).clamp(MIN_BACKGROUND_NOISE, MAX_BACKGROUND_NOISE);

    BackgroundStats {
        median,
        mad,
        sigma,
        threshold,
        p05,
        p95,
        noise,
    }
}
