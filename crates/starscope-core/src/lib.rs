pub mod analysis;
pub mod consts;
pub mod detection;
pub mod error;
pub mod io;
pub mod stats;

pub use analysis::{analyze_source, analyze_stars, AnalysisOptions, FrameAnalysis, TileSummary};
pub use error::{Result, StarscopeError};
