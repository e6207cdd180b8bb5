use ndarray::Array2;

use crate::consts::{EPSILON, FWHM_PER_SIGMA, MAX_ELONGATION, MIN_SIGMA_MINOR};

/// Intensity-weighted second central moments of a blob.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Moments {
    pub mxx: f64,
    pub myy: f64,
    pub mxy: f64,
}

/// Ellipse fit derived from [`Moments`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShapeFit {
    pub sigma_major: f64,
    pub sigma_minor: f64,
    /// `major / minor`, clamped to `[1, 8]`.
    pub elongation: f64,
    /// `2.355 * sqrt(major * minor)`.
    pub fwhm: f64,
}

/// Second central moments about (`cy`, `cx`) over the inclusive bounding box
/// `(min_row, max_row, min_col, max_col)`, weighting each pixel by
/// `max(0, value - background)`.
///
/// Returns `None` when the box carries no weight.
pub fn weighted_moments(
    data: &Array2<f32>,
    bbox: (usize, usize, usize, usize),
    centroid: (f64, f64),
    background: f64,
) -> Option<Moments> {
    let (min_row, max_row, min_col, max_col) = bbox;
    let (cy, cx) = centroid;

    let mut sum_w = 0.0_f64;
    let mut sxx = 0.0_f64;
    let mut syy = 0.0_f64;
    let mut sxy = 0.0_f64;

    for row in min_row..=max_row {
        let dy = row as f64 - cy;
        for col in min_col..=max_col {
            let w = (data[[row, col]] as f64 - background).max(0.0);
            if w > 0.0 {
                let dx = col as f64 - cx;
                sum_w += w;
                sxx += w * dx * dx;
                syy += w * dy * dy;
                sxy += w * dx * dy;
            }
        }
    }

    if sum_w > 0.0 {
        Some(Moments {
            mxx: sxx / sum_w,
            myy: syy / sum_w,
            mxy: sxy / sum_w,
        })
    } else {
        None
    }
}

/// Eigenvalues `(λ1, λ2)`, `λ1 >= λ2`, of the symmetric moment matrix
/// `[[mxx, mxy], [mxy, myy]]`.
pub fn principal_variances(m: &Moments) -> (f64, f64) {
    let half_trace = 0.5 * (m.mxx + m.myy);
    let det = m.mxx * m.myy - m.mxy * m.mxy;
    let disc = (half_trace * half_trace - det).max(0.0).sqrt();
    (half_trace + disc, half_trace - disc)
}

/// Fit an ellipse to the moments. Returns `None` for line-like blobs
/// (`sigma_minor < 0.4`) and degenerate fits.
pub fn fit_shape(m: &Moments) -> Option<ShapeFit> {
    let (l1, l2) = principal_variances(m);
    let sigma_major = l1.max(EPSILON).sqrt();
    let sigma_minor = l2.max(EPSILON).sqrt();

    if !sigma_major.is_finite() || !sigma_minor.is_finite() || sigma_minor < MIN_SIGMA_MINOR {
        return None;
    }

    let elongation = (sigma_major / sigma_minor).clamp(1.0, MAX_ELONGATION);
    let fwhm = FWHM_PER_SIGMA * (sigma_major * sigma_minor).sqrt();

    Some(ShapeFit {
        sigma_major,
        sigma_minor,
        elongation,
        fwhm,
    })
}
