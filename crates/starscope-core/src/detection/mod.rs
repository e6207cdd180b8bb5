pub mod blob;
pub mod components;
pub mod shape;

pub use blob::{detect_stars, StarDetection, TileDetections};
pub use shape::{fit_shape, weighted_moments, Moments, ShapeFit};
