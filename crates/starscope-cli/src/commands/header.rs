use std::io::BufReader;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use starscope_core::io::{read_header, ImageGeometry};

use crate::summary;

#[derive(Args)]
pub struct HeaderArgs {
    /// Input FITS file
    pub file: PathBuf,
}

pub fn run(args: &HeaderArgs) -> Result<()> {
    let file = std::fs::File::open(&args.file)
        .with_context(|| format!("Failed to open {}", args.file.display()))?;
    let header = read_header(&mut BufReader::new(file))
        .with_context(|| format!("Failed to read FITS header from {}", args.file.display()))?;

    // Header cards are still worth showing when the geometry is unusable.
    let geometry = ImageGeometry::from_header(&header);
    summary::print_header(&args.file, &header, geometry.as_ref().ok());
    if let Err(e) = geometry {
        println!("Geometry:    {e}");
    }

    Ok(())
}
