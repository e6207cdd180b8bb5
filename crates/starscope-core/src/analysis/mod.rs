pub mod aggregate;
pub mod analyze;
pub mod config;

pub use aggregate::{aggregate, tracking_error, FrameAnalysis, TileAnalysis, TileSummary};
pub use analyze::{analyze_source, analyze_stars, analyze_tile, resolve_tiles};
pub use config::AnalysisOptions;
