use std::cmp::Ordering;

use ndarray::Array2;

use crate::consts::REGION_RADIUS;

/// 8-connected neighbour offsets as (row, col).
const NEIGHBORS: [(isize, isize); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

/// Statistics accumulated while growing one region.
#[derive(Clone, Debug, PartialEq)]
pub struct Region {
    /// Number of pixels in the region.
    pub pixels: usize,
    /// Bounding box: (min_row, max_row, min_col, max_col).
    pub bbox: (usize, usize, usize, usize),
    sum_weight: f64,
    sum_row: f64,
    sum_col: f64,
}

impl Region {
    fn new(row: usize, col: usize) -> Self {
        Self {
            pixels: 0,
            bbox: (row, row, col, col),
            sum_weight: 0.0,
            sum_row: 0.0,
            sum_col: 0.0,
        }
    }

    fn add(&mut self, row: usize, col: usize, weight: f64) {
        self.pixels += 1;
        self.bbox.0 = self.bbox.0.min(row);
        self.bbox.1 = self.bbox.1.max(row);
        self.bbox.2 = self.bbox.2.min(col);
        self.bbox.3 = self.bbox.3.max(col);
        self.sum_weight += weight;
        self.sum_row += row as f64 * weight;
        self.sum_col += col as f64 * weight;
    }

    pub fn bbox_width(&self) -> usize {
        self.bbox.3 - self.bbox.2 + 1
    }

    pub fn bbox_height(&self) -> usize {
        self.bbox.1 - self.bbox.0 + 1
    }

    /// Weighted centroid `(row, col)`, or `None` when every pixel had zero
    /// weight.
    pub fn centroid(&self) -> Option<(f64, f64)> {
        if self.sum_weight > 0.0 {
            Some((self.sum_row / self.sum_weight, self.sum_col / self.sum_weight))
        } else {
            None
        }
    }
}

/// True when the value at (`row`, `col`) is strictly greater than every
/// in-bounds 8-neighbour. Ties lose.
pub fn is_local_maximum(data: &Array2<f32>, row: usize, col: usize) -> bool {
    let (h, w) = data.dim();
    let center = data[[row, col]];
    NEIGHBORS.iter().all(|&(dr, dc)| {
        match (row.checked_add_signed(dr), col.checked_add_signed(dc)) {
            (Some(r), Some(c)) if r < h && c < w => below(data[[r, c]] as f64, center as f64),
            _ => true,
        }
    })
}

/// Grow an 8-connected region from `seed` over pixels `>= threshold`, staying
/// within [`REGION_RADIUS`] (Chebyshev distance) of the seed.
///
/// Pixels are marked in `visited` as they are accepted. Centroid sums use
/// `max(0, value - background)` as weight. `stack` is scratch space reused
/// across seeds.
pub fn grow_region(
    data: &Array2<f32>,
    visited: &mut Array2<bool>,
    stack: &mut Vec<(usize, usize)>,
    seed: (usize, usize),
    threshold: f64,
    background: f64,
) -> Region {
    let (h, w) = data.dim();
    let (seed_row, seed_col) = seed;
    let mut region = Region::new(seed_row, seed_col);

    stack.clear();
    visited[[seed_row, seed_col]] = true;
    stack.push(seed);

    while let Some((row, col)) = stack.pop() {
        let weight = (data[[row, col]] as f64 - background).max(0.0);
        region.add(row, col, weight);

        for &(dr, dc) in &NEIGHBORS {
            let (Some(r), Some(c)) = (row.checked_add_signed(dr), col.checked_add_signed(dc)) else {
                continue;
            };
            if r >= h || c >= w {
                continue;
            }
            if r.abs_diff(seed_row) > REGION_RADIUS || c.abs_diff(seed_col) > REGION_RADIUS {
                continue;
            }
            if visited[[r, c]] || below(data[[r, c]] as f64, threshold) {
                continue;
            }
            visited[[r, c]] = true;
            stack.push((r, c));
        }
    }

    region
}

/// `value < limit`, with NaN counting as below.
pub fn below(value: f64, limit: f64) -> bool {
    matches!(value.partial_cmp(&limit), Some(Ordering::Less) | None)
}

/// Returns true if the bounding box touches any edge of the tile.
pub fn touches_border(bbox: (usize, usize, usize, usize), height: usize, width: usize) -> bool {
    let (min_row, max_row, min_col, max_col) = bbox;
    min_row == 0 || max_row >= height - 1 || min_col == 0 || max_col >= width - 1
}
