use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::consts::MIN_TILE_SIDE;

/// A caller-supplied analysis region in image pixel coordinates.
///
/// Coordinates are signed and unchecked; [`TileRequest::clamp_to`] turns a
/// request into a [`Tile`] that lies inside the image.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileRequest {
    pub x: i64,
    pub y: i64,
    pub w: i64,
    pub h: i64,
}

/// A tile clamped to the image bounds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Tile {
    pub x: usize,
    pub y: usize,
    pub w: usize,
    pub h: usize,
}

impl TileRequest {
    pub fn new(x: i64, y: i64, w: i64, h: i64) -> Self {
        Self { x, y, w, h }
    }

    /// Intersect with `[0, width) x [0, height)`, then grow to the minimum side
    /// length (shifting back inside the image if needed).
    ///
    /// `width` and `height` must be non-zero.
    pub fn clamp_to(&self, width: usize, height: usize) -> Tile {
        let (x, w) = clamp_span(self.x, self.w, width);
        let (y, h) = clamp_span(self.y, self.h, height);
        Tile { x, y, w, h }
    }
}

fn clamp_span(start: i64, len: i64, extent: usize) -> (usize, usize) {
    let extent = extent as i64;
    let min_len = (MIN_TILE_SIDE as i64).min(extent);

    let mut lo = start.clamp(0, extent - 1);
    let mut hi = start.saturating_add(len.max(0)).clamp(lo, extent);

    if hi - lo < min_len {
        if lo + min_len <= extent {
            hi = lo + min_len;
        } else {
            lo = extent - min_len;
            hi = extent;
        }
    }
    (lo as usize, (hi - lo) as usize)
}

/// Center plus four corners, each at most `crop_size` and at most half the
/// image in either direction.
///
/// Large frames are only sampled: pixels outside these five regions are never
/// read.
pub fn default_tiles(width: usize, height: usize, crop_size: usize) -> Vec<Tile> {
    let w = side_length(width, crop_size);
    let h = side_length(height, crop_size);
    let right = width - w;
    let bottom = height - h;

    vec![
        Tile { x: right / 2, y: bottom / 2, w, h },
        Tile { x: 0, y: 0, w, h },
        Tile { x: right, y: 0, w, h },
        Tile { x: 0, y: bottom, w, h },
        Tile { x: right, y: bottom, w, h },
    ]
}

fn side_length(extent: usize, crop_size: usize) -> usize {
    crop_size
        .min(extent / 2)
        .max(MIN_TILE_SIDE)
        .min(extent)
}

impl fmt::Display for TileRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{},{}", self.x, self.y, self.w, self.h)
    }
}

impl FromStr for TileRequest {
    type Err = String;

    /// Parse `x,y,w,h`.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let parts: Vec<i64> = s
            .split(',')
            .map(|p| p.trim().parse::<i64>())
            .collect::<std::result::Result<_, _>>()
            .map_err(|e| format!("invalid tile '{s}': {e}"))?;
        match parts.as_slice() {
            [x, y, w, h] => Ok(TileRequest::new(*x, *y, *w, *h)),
            _ => Err(format!("invalid tile '{s}': expected x,y,w,h")),
        }
    }
}
