/// FITS logical record (block) size in bytes.
pub const FITS_BLOCK_SIZE: usize = 2880;

/// FITS header card size in bytes.
pub const FITS_CARD_SIZE: usize = 80;

/// Maximum number of header blocks scanned for the END card (11520 bytes).
pub const MAX_HEADER_BLOCKS: usize = 4;

/// Width of the keyword field at the start of a header card.
pub const FITS_KEYWORD_WIDTH: usize = 8;

/// Default maximum tile side length in pixels.
pub const DEFAULT_CROP_SIZE: usize = 768;

/// Default detection threshold multiplier (threshold = median + k * sigma).
pub const DEFAULT_K_SIGMA: f32 = 4.0;

/// Minimum tile side length after clamping.
pub const MIN_TILE_SIDE: usize = 8;

/// Upper bound on the number of samples drawn for background statistics.
pub const BACKGROUND_SAMPLE_LIMIT: usize = 20_000;

/// Scale factor making the MAD a consistent estimator of a Gaussian sigma.
pub const MAD_TO_SIGMA: f64 = 1.4826;

/// Lower percentile used for noise normalization.
pub const NOISE_LOW_PERCENTILE: f64 = 0.05;

/// Upper percentile used for noise normalization.
pub const NOISE_HIGH_PERCENTILE: f64 = 0.95;

/// Clamp range for the normalized background noise proxy.
pub const MIN_BACKGROUND_NOISE: f64 = 0.005;
pub const MAX_BACKGROUND_NOISE: f64 = 0.25;

/// Background noise reported when no tile was analyzed.
pub const DEFAULT_BACKGROUND_NOISE: f64 = 0.02;

/// Region growing stops this many pixels (Chebyshev distance) from the seed.
pub const REGION_RADIUS: usize = 8;

/// Regions with fewer pixels are discarded.
pub const MIN_REGION_PIXELS: usize = 12;

/// Regions whose bounding box is narrower or shorter than this are discarded.
pub const MIN_REGION_EXTENT: usize = 3;

/// Minor-axis sigma below which a blob is treated as a line or cosmic ray.
pub const MIN_SIGMA_MINOR: f64 = 0.4;

/// Upper clamp for reported elongation.
pub const MAX_ELONGATION: f64 = 8.0;

/// Gaussian FWHM = 2.355 * sigma.
pub const FWHM_PER_SIGMA: f64 = 2.355;

/// Elongation at which the tracking-error proxy saturates.
pub const TRACKING_ELONGATION_CAP: f64 = 2.5;

/// Tracking-error units per unit of excess elongation.
pub const TRACKING_ERROR_GAIN: f64 = 4.0;

/// Percentile used for elongation summaries.
pub const ELONGATION_PERCENTILE: f64 = 0.9;

/// Small epsilon to avoid division by zero and sqrt of non-positive values.
pub const EPSILON: f64 = 1e-6;
