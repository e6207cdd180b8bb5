use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use serde::Serialize;
use starscope_core::io::TileRequest;
use starscope_core::{analyze_stars, AnalysisOptions, FrameAnalysis};
use tracing::warn;

use super::config::load_options;
use crate::summary;

#[derive(Args)]
pub struct AnalyzeArgs {
    /// Input FITS files
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Analysis options file (TOML)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Maximum tile side in pixels
    #[arg(long)]
    pub crop_size: Option<usize>,

    /// Detection threshold in robust sigmas above the background median
    #[arg(long)]
    pub k_sigma: Option<f32>,

    /// Analyze this region instead of the default center and corners (repeatable)
    #[arg(long = "tile", value_name = "X,Y,W,H")]
    pub tiles: Vec<TileRequest>,

    /// Read pixel data through a memory map
    #[arg(long)]
    pub mmap: bool,

    /// Print results as JSON
    #[arg(long)]
    pub json: bool,

    /// Include per-tile statistics in the table output
    #[arg(long = "tiles")]
    pub show_tiles: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FileReport {
    file: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    analysis: Option<FrameAnalysis>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

pub fn run(args: &AnalyzeArgs) -> Result<()> {
    let options = build_options(args)?;
    options.validate().context("Invalid analysis options")?;

    let pb = if args.files.len() > 1 && !args.json {
        let pb = ProgressBar::new(args.files.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{msg} [{bar:40}] {pos}/{len}")?
                .progress_chars("=> "),
        );
        pb.set_message("Analyzing");
        pb
    } else {
        ProgressBar::hidden()
    };

    // Each file gets its own handle; results keep the input order.
    let results: Vec<(&Path, Result<FrameAnalysis>)> = args
        .files
        .par_iter()
        .map(|path| {
            let result = analyze_stars(path, &options)
                .with_context(|| format!("Failed to analyze {}", path.display()));
            pb.inc(1);
            (path.as_path(), result)
        })
        .collect();
    pb.finish_and_clear();

    let failures = results.iter().filter(|(_, r)| r.is_err()).count();

    if args.json {
        print_json(results)?;
    } else {
        for (path, result) in &results {
            match result {
                Ok(analysis) => summary::print_frame_analysis(path, analysis, args.show_tiles),
                Err(e) => summary::print_failure(path, e),
            }
        }
    }

    if failures > 0 {
        bail!("{failures} of {} files failed", args.files.len());
    }
    Ok(())
}

/// Options file (if any) first, then explicit flags on top.
fn build_options(args: &AnalyzeArgs) -> Result<AnalysisOptions> {
    let mut options = match args.config {
        Some(ref path) => load_options(path)?,
        None => AnalysisOptions::default(),
    };

    if let Some(crop_size) = args.crop_size {
        options.crop_size = crop_size;
    }
    if let Some(k_sigma) = args.k_sigma {
        options.k_sigma = k_sigma;
    }
    if !args.tiles.is_empty() {
        options.tiles = Some(args.tiles.clone());
    }
    if args.mmap {
        options.memory_map = true;
    }
    Ok(options)
}

fn print_json(results: Vec<(&Path, Result<FrameAnalysis>)>) -> Result<()> {
    let reports: Vec<FileReport> = results
        .into_iter()
        .map(|(path, result)| match result {
            Ok(analysis) => FileReport {
                file: path.to_path_buf(),
                analysis: Some(analysis),
                error: None,
            },
            Err(e) => {
                warn!(path = %path.display(), "{e:#}");
                FileReport {
                    file: path.to_path_buf(),
                    analysis: None,
                    error: Some(format!("{e:#}")),
                }
            }
        })
        .collect();

    println!("{}", serde_json::to_string_pretty(&reports)?);
    Ok(())
}
