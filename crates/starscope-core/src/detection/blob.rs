use ndarray::Array2;
use serde::Serialize;

use crate::consts::{ELONGATION_PERCENTILE, MIN_REGION_EXTENT, MIN_REGION_PIXELS};
use crate::stats::{percentile_sorted, sort_values, BackgroundStats};

use super::components::{below, grow_region, is_local_maximum, touches_border, Region};
use super::shape::{fit_shape, weighted_moments};

/// A star accepted by the detector.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StarDetection {
    /// Weighted centroid column, tile coordinates.
    pub x: f64,
    /// Weighted centroid row, tile coordinates.
    pub y: f64,
    /// Pixels in the grown region.
    pub pixels: usize,
    /// Major/minor sigma ratio, in `[1, 8]`.
    pub elongation: f64,
    pub fwhm: f64,
}

/// All detections in one tile plus their elongation summary.
#[derive(Clone, Debug, PartialEq)]
pub struct TileDetections {
    pub stars: Vec<StarDetection>,
    /// 1.0 when no star was found.
    pub max_elongation: f64,
    /// 90th percentile elongation, 1.0 when no star was found.
    pub p90_elongation: f64,
}

/// Detect and measure star-like blobs in one tile.
///
/// Seeds are strict local maxima at or above `background.threshold`. Each
/// seed grows a bounded region; regions that are too small, truncated by the
/// tile edge, or line-shaped are discarded.
pub fn detect_stars(data: &Array2<f32>, background: &BackgroundStats) -> TileDetections {
    let (h, w) = data.dim();
    let mut visited = Array2::from_elem((h, w), false);
    let mut stack: Vec<(usize, usize)> = Vec::with_capacity(64);
    let mut stars = Vec::new();

    for row in 0..h {
        for col in 0..w {
            if visited[[row, col]] || below(data[[row, col]] as f64, background.threshold) {
                continue;
            }
            if !is_local_maximum(data, row, col) {
                continue;
            }

            let region = grow_region(
                data,
                &mut visited,
                &mut stack,
                (row, col),
                background.threshold,
                background.median,
            );
            if let Some(star) = measure_region(data, &region, background.median) {
                stars.push(star);
            }
        }
    }

    summarize(stars)
}

fn measure_region(data: &Array2<f32>, region: &Region, background: f64) -> Option<StarDetection> {
    let (h, w) = data.dim();
    if region.pixels < MIN_REGION_PIXELS {
        return None;
    }
    if touches_border(region.bbox, h, w) {
        return None;
    }
    if region.bbox_width() < MIN_REGION_EXTENT || region.bbox_height() < MIN_REGION_EXTENT {
        return None;
    }

    let centroid = region.centroid()?;
    let moments = weighted_moments(data, region.bbox, centroid, background)?;
    let fit = fit_shape(&moments)?;

    Some(StarDetection {
        x: centroid.1,
        y: centroid.0,
        pixels: region.pixels,
        elongation: fit.elongation,
        fwhm: fit.fwhm,
    })
}

fn summarize(stars: Vec<StarDetection>) -> TileDetections {
    let mut elongations: Vec<f64> = stars.iter().map(|s| s.elongation).collect();
    sort_values(&mut elongations);

    TileDetections {
        max_elongation: elongations.last().copied().unwrap_or(1.0),
        p90_elongation: percentile_sorted(&elongations, ELONGATION_PERCENTILE).unwrap_or(1.0),
        stars,
    }
}
