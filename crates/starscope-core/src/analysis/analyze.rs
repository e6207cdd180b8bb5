use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

use ndarray::Array2;
use rayon::prelude::*;
use tracing::{debug, info};

use crate::detection::detect_stars;
use crate::error::Result;
use crate::io::geometry::ImageGeometry;
use crate::io::header::read_header;
use crate::io::source::FitsSource;
use crate::io::tile::{default_tiles, Tile};
use crate::io::tile_reader::read_tile;
use crate::stats::estimate_background;

use super::aggregate::{aggregate, FrameAnalysis, TileAnalysis};
use super::config::AnalysisOptions;

/// Analyze the star field of a FITS file.
///
/// The file is opened for the duration of the call only and closed on every
/// return path.
pub fn analyze_stars(path: &Path, options: &AnalysisOptions) -> Result<FrameAnalysis> {
    options.validate()?;
    let mut source = FitsSource::open(path, options.memory_map)?;
    info!(path = %path.display(), mmap = options.memory_map, "Analyzing star field");
    analyze_impl(&mut source, options)
}

/// Analyze a FITS stream held in any seekable source, starting at offset 0.
pub fn analyze_source<S: Read + Seek>(source: &mut S, options: &AnalysisOptions) -> Result<FrameAnalysis> {
    options.validate()?;
    analyze_impl(source, options)
}

fn analyze_impl<S: Read + Seek>(source: &mut S, options: &AnalysisOptions) -> Result<FrameAnalysis> {
    source.seek(SeekFrom::Start(0))?;
    let header = read_header(source)?;
    let geometry = ImageGeometry::from_header(&header)?;
    info!(
        width = geometry.width,
        height = geometry.height,
        bitpix = geometry.bitpix.code(),
        "FITS geometry"
    );

    let tiles = resolve_tiles(&geometry, options);

    // Reads are sequential on the single handle; measurement fans out. At most
    // one batch of tile buffers is alive at a time.
    let batch_size = rayon::current_num_threads().max(1);
    let mut analyses: Vec<TileAnalysis> = Vec::with_capacity(tiles.len());
    for batch in tiles.chunks(batch_size) {
        let buffers = batch
            .iter()
            .map(|tile| Ok((*tile, read_tile(source, &geometry, tile)?)))
            .collect::<Result<Vec<(Tile, Array2<f32>)>>>()?;

        let measured: Vec<TileAnalysis> = buffers
            .into_par_iter()
            .map(|(tile, data)| analyze_tile(tile, &data, options.k_sigma))
            .collect();
        analyses.extend(measured);
    }

    let result = aggregate(&analyses);
    info!(
        stars = result.star_count,
        fwhm = result.fwhm,
        elongation_p90 = result.star_elongation_p90,
        tracking_error = result.tracking_error,
        "Star field analyzed"
    );
    Ok(result)
}

/// Background statistics and star detection for one tile buffer.
pub fn analyze_tile(tile: Tile, data: &Array2<f32>, k_sigma: f32) -> TileAnalysis {
    let background = estimate_background(data, k_sigma);
    let detections = detect_stars(data, &background);
    debug!(
        x = tile.x,
        y = tile.y,
        w = tile.w,
        h = tile.h,
        median = background.median,
        sigma = background.sigma,
        threshold = background.threshold,
        stars = detections.stars.len(),
        "Tile analyzed"
    );
    TileAnalysis {
        tile,
        background,
        detections,
    }
}

/// Clamp caller-supplied tiles to the image, or build the default layout.
pub fn resolve_tiles(geometry: &ImageGeometry, options: &AnalysisOptions) -> Vec<Tile> {
    match &options.tiles {
        Some(requests) => requests
            .iter()
            .map(|r| r.clamp_to(geometry.width, geometry.height))
            .collect(),
        None => default_tiles(geometry.width, geometry.height, options.crop_size),
    }
}
