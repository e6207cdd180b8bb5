use serde::{Deserialize, Serialize};

use crate::consts::{DEFAULT_CROP_SIZE, DEFAULT_K_SIGMA};
use crate::error::{Result, StarscopeError};
use crate::io::tile::TileRequest;

/// Options for a single star-field analysis.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnalysisOptions {
    /// Maximum tile side length in pixels.
    #[serde(default = "default_crop_size")]
    pub crop_size: usize,
    /// Detection threshold = background median + k_sigma * robust sigma.
    #[serde(default = "default_k_sigma")]
    pub k_sigma: f32,
    /// Explicit analysis regions. When absent the center and four corners
    /// are analyzed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tiles: Option<Vec<TileRequest>>,
    /// Read pixel rows through a memory map instead of seek + read.
    #[serde(default)]
    pub memory_map: bool,
}

fn default_crop_size() -> usize {
    DEFAULT_CROP_SIZE
}
fn default_k_sigma() -> f32 {
    DEFAULT_K_SIGMA
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            crop_size: DEFAULT_CROP_SIZE,
            k_sigma: DEFAULT_K_SIGMA,
            tiles: None,
            memory_map: false,
        }
    }
}

impl AnalysisOptions {
    pub fn validate(&self) -> Result<()> {
        if self.crop_size == 0 {
            return Err(StarscopeError::InvalidOptions(
                "crop_size must be greater than 0".into(),
            ));
        }
        if !self.k_sigma.is_finite() || self.k_sigma < 0.0 {
            return Err(StarscopeError::InvalidOptions(format!(
                "k_sigma must be a finite, non-negative number, got {}",
                self.k_sigma
            )));
        }
        if matches!(&self.tiles, Some(t) if t.is_empty()) {
            return Err(StarscopeError::InvalidOptions(
                "explicit tile list is empty".into(),
            ));
        }
        Ok(())
    }
}
