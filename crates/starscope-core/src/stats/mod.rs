pub mod background;
pub mod percentile;

pub use background::{estimate_background, BackgroundStats};
pub use percentile::{percentile_sorted, sort_values};
