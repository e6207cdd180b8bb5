use starscope_core::analysis::{aggregate, tracking_error, TileAnalysis};
use starscope_core::detection::{StarDetection, TileDetections};
use starscope_core::io::{Tile, TileRequest};
use starscope_core::stats::BackgroundStats;
use starscope_core::{AnalysisOptions, StarscopeError};

fn background(noise: f64) -> BackgroundStats {
    BackgroundStats {
        median: 100.0,
        mad: 1.0,
        sigma: 1.4826,
        threshold: 106.0,
        p05: 98.0,
        p95: 102.0,
        noise,
    }
}

fn star(elongation: f64, fwhm: f64) -> StarDetection {
    StarDetection {
        x: 10.0,
        y: 10.0,
        pixels: 40,
        elongation,
        fwhm,
    }
}

fn tile_with(stars: Vec<StarDetection>, noise: f64) -> TileAnalysis {
    let max = stars.iter().map(|s| s.elongation).fold(1.0, f64::max);
    TileAnalysis {
        tile: Tile { x: 0, y: 0, w: 64, h: 64 },
        background: background(noise),
        detections: TileDetections {
            stars,
            max_elongation: max,
            p90_elongation: max,
        },
    }
}

// ---------------------------------------------------------------------------
// AnalysisOptions
// ---------------------------------------------------------------------------

#[test]
fn test_options_default() {
    let o = AnalysisOptions::default();
    assert_eq!(o.crop_size, 768);
    assert_eq!(o.k_sigma, 4.0);
    assert!(o.tiles.is_none());
    assert!(!o.memory_map);
    assert!(o.validate().is_ok());
}

#[test]
fn test_options_validate_rejects_negative_sigma() {
    let o = AnalysisOptions {
        k_sigma: -1.0,
        ..Default::default()
    };
    assert!(matches!(o.validate(), Err(StarscopeError::InvalidOptions(_))));
}

#[test]
fn test_options_zero_sigma_is_allowed() {
    let o = AnalysisOptions {
        k_sigma: 0.0,
        ..Default::default()
    };
    assert!(o.validate().is_ok());
}

#[test]
fn test_options_toml_round_trip() {
    let o = AnalysisOptions {
        crop_size: 512,
        k_sigma: 5.5,
        tiles: Some(vec![TileRequest::new(0, 0, 256, 256), TileRequest::new(-8, 40, 100, 90)]),
        memory_map: true,
    };
    let text = toml::to_string(&o).unwrap();
    let back: AnalysisOptions = toml::from_str(&text).unwrap();
    assert_eq!(back, o);
}

#[test]
fn test_options_toml_partial_uses_defaults() {
    let o: AnalysisOptions = toml::from_str("k_sigma = 6.0\n").unwrap();
    assert_eq!(o.k_sigma, 6.0);
    assert_eq!(o.crop_size, 768);
    assert!(o.tiles.is_none());
    assert!(!o.memory_map);
}

#[test]
fn test_options_toml_without_tiles_omits_key() {
    let text = toml::to_string(&AnalysisOptions::default()).unwrap();
    assert!(!text.contains("tiles"));
    assert!(text.contains("crop_size = 768"));
}

// ---------------------------------------------------------------------------
// Tracking error
// ---------------------------------------------------------------------------

#[test]
fn test_tracking_error_zero_for_round_stars() {
    assert_eq!(tracking_error(1.0), 0.0);
    assert_eq!(tracking_error(0.5), 0.0);
}

#[test]
fn test_tracking_error_increases_until_cap() {
    let mut prev = tracking_error(1.0);
    for i in 1..=15 {
        let e = 1.0 + i as f64 * 0.1;
        let t = tracking_error(e);
        assert!(t > prev, "not increasing at {e}");
        prev = t;
    }
    assert!((tracking_error(2.5) - 6.0).abs() < 1e-12);
}

#[test]
fn test_tracking_error_flat_beyond_cap() {
    assert_eq!(tracking_error(3.0), tracking_error(2.5));
    assert_eq!(tracking_error(8.0), tracking_error(2.5));
}

// ---------------------------------------------------------------------------
// Aggregation
// ---------------------------------------------------------------------------

#[test]
fn test_aggregate_without_tiles() {
    let result = aggregate(&[]);
    assert_eq!(result.star_count, 0);
    assert_eq!(result.fwhm, 0.0);
    assert_eq!(result.background_noise, 0.02);
    assert_eq!(result.star_elongation_max, 1.0);
    assert!(result.tiles.is_empty());
}

#[test]
fn test_aggregate_pools_stars_across_tiles() {
    let a = tile_with(vec![star(1.0, 2.0), star(1.2, 3.0)], 0.01);
    let b = tile_with(vec![star(1.1, 4.0), star(2.0, 5.0), star(1.05, 6.0)], 0.03);
    let result = aggregate(&[a, b]);

    assert_eq!(result.star_count, 5);
    // Sorted FWHM 2..6: index floor(0.5 * 4) = 2.
    assert_eq!(result.fwhm, 4.0);
    // Sorted elongation [1.0, 1.05, 1.1, 1.2, 2.0]: index floor(0.9 * 4) = 3.
    assert_eq!(result.star_elongation_p90, 1.2);
    assert_eq!(result.star_elongation, 1.2);
    assert_eq!(result.star_elongation_max, 2.0);
    assert!((result.background_noise - 0.02).abs() < 1e-12);
    assert!((result.tracking_error - tracking_error(1.2)).abs() < 1e-12);
    assert_eq!(result.tiles.len(), 2);
    assert_eq!(result.tiles[1].star_count, 3);
}

#[test]
fn test_aggregate_tiles_without_stars() {
    let result = aggregate(&[tile_with(Vec::new(), 0.1), tile_with(Vec::new(), 0.2)]);
    assert_eq!(result.star_count, 0);
    assert_eq!(result.star_elongation_p90, 1.0);
    assert_eq!(result.tracking_error, 0.0);
    assert!((result.background_noise - 0.15).abs() < 1e-12);
}
