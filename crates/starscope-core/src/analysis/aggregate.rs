use serde::{Deserialize, Serialize};

use crate::consts::{
    DEFAULT_BACKGROUND_NOISE, ELONGATION_PERCENTILE, TRACKING_ELONGATION_CAP, TRACKING_ERROR_GAIN,
};
use crate::detection::TileDetections;
use crate::io::tile::Tile;
use crate::stats::{percentile_sorted, sort_values, BackgroundStats};

/// Everything measured for one tile.
#[derive(Clone, Debug)]
pub struct TileAnalysis {
    pub tile: Tile,
    pub background: BackgroundStats,
    pub detections: TileDetections,
}

/// Per-tile diagnostics included in the frame result.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TileSummary {
    pub x: usize,
    pub y: usize,
    pub w: usize,
    pub h: usize,
    pub star_count: usize,
    pub max_elongation: f64,
    pub p90_elongation: f64,
}

/// Whole-frame star-field quality result.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameAnalysis {
    pub star_count: usize,
    /// Median FWHM in pixels, 0 when no star was found.
    pub fwhm: f64,
    /// Same value as `star_elongation_p90`.
    pub star_elongation: f64,
    pub star_elongation_p90: f64,
    pub star_elongation_max: f64,
    /// Mean of the per-tile normalized noise proxies.
    pub background_noise: f64,
    pub tracking_error: f64,
    pub tiles: Vec<TileSummary>,
}

impl From<&TileAnalysis> for TileSummary {
    fn from(t: &TileAnalysis) -> Self {
        Self {
            x: t.tile.x,
            y: t.tile.y,
            w: t.tile.w,
            h: t.tile.h,
            star_count: t.detections.stars.len(),
            max_elongation: t.detections.max_elongation,
            p90_elongation: t.detections.p90_elongation,
        }
    }
}

/// Tracking-error proxy: 0 for round stars, rising linearly with the p90
/// elongation and flat from 2.5 upwards.
pub fn tracking_error(p90_elongation: f64) -> f64 {
    ((p90_elongation.min(TRACKING_ELONGATION_CAP) - 1.0) * TRACKING_ERROR_GAIN).max(0.0)
}

/// Combine per-tile results into frame statistics.
pub fn aggregate(tiles: &[TileAnalysis]) -> FrameAnalysis {
    let summaries: Vec<TileSummary> = tiles.iter().map(TileSummary::from).collect();

    let background_noise = if tiles.is_empty() {
        DEFAULT_BACKGROUND_NOISE
    } else {
        tiles.iter().map(|t| t.background.noise).sum::<f64>() / tiles.len() as f64
    };

    let mut fwhms: Vec<f64> = Vec::new();
    let mut elongations: Vec<f64> = Vec::new();
    for star in tiles.iter().flat_map(|t| &t.detections.stars) {
        fwhms.push(star.fwhm);
        elongations.push(star.elongation);
    }

    if fwhms.is_empty() {
        return FrameAnalysis {
            star_count: 0,
            fwhm: 0.0,
            star_elongation: 1.0,
            star_elongation_p90: 1.0,
            star_elongation_max: 1.0,
            background_noise,
            tracking_error: 0.0,
            tiles: summaries,
        };
    }

    sort_values(&mut fwhms);
    sort_values(&mut elongations);

    let fwhm = percentile_sorted(&fwhms, 0.5).unwrap_or(0.0);
    let p90 = percentile_sorted(&elongations, ELONGATION_PERCENTILE).unwrap_or(1.0);
    let max = elongations.last().copied().unwrap_or(1.0);

    FrameAnalysis {
        star_count: fwhms.len(),
        fwhm,
        star_elongation: p90,
        star_elongation_p90: p90,
        star_elongation_max: max,
        background_noise,
        tracking_error: tracking_error(p90),
        tiles: summaries,
    }
}
