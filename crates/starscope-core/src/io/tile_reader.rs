use byteorder::{BigEndian, ByteOrder};
use ndarray::Array2;
use tracing::warn;

use crate::error::Result;

use super::geometry::{BitPix, ImageGeometry};
use super::source::ByteSource;
use super::tile::Tile;

/// Read one tile from the pixel plane, applying `raw * BSCALE + BZERO`.
///
/// Only the tile's own row segments are read. A short read (truncated file)
/// stops decoding of that row; the remaining samples keep their zero value.
///
/// `tile` must already be clamped to the geometry's bounds.
pub fn read_tile<S: ByteSource + ?Sized>(
    source: &mut S,
    geometry: &ImageGeometry,
    tile: &Tile,
) -> Result<Array2<f32>> {
    let bpp = geometry.bitpix.bytes_per_pixel();
    let mut data = Array2::<f32>::zeros((tile.h, tile.w));
    let mut row_bytes = vec![0u8; tile.w * bpp];
    let mut row_values = vec![0f32; tile.w];
    let mut short_rows = 0usize;

    for (r, mut out) in data.rows_mut().into_iter().enumerate() {
        let offset = geometry.pixel_offset(tile.x, tile.y + r);
        let n = source.read_at(offset, &mut row_bytes)?;
        if n < row_bytes.len() {
            short_rows += 1;
        }

        let complete = n / bpp;
        decode_samples(
            &row_bytes[..complete * bpp],
            geometry.bitpix,
            geometry.bscale,
            geometry.bzero,
            &mut row_values[..complete],
        );
        for (dst, &v) in out.iter_mut().zip(&row_values[..complete]) {
            *dst = v;
        }
    }

    if short_rows > 0 {
        warn!(
            x = tile.x,
            y = tile.y,
            short_rows,
            "Pixel data truncated, tile partially zero-filled"
        );
    }

    Ok(data)
}

/// Decode big-endian samples into `out` with linear rescaling.
///
/// `raw.len()` must equal `out.len() * bitpix.bytes_per_pixel()`.
pub fn decode_samples(raw: &[u8], bitpix: BitPix, bscale: f64, bzero: f64, out: &mut [f32]) {
    let bpp = bitpix.bytes_per_pixel();
    for (dst, bytes) in out.iter_mut().zip(raw.chunks_exact(bpp)) {
        let value = match bitpix {
            BitPix::U8 => bytes[0] as f64,
            BitPix::I16 => BigEndian::read_i16(bytes) as f64,
            BitPix::I32 => BigEndian::read_i32(bytes) as f64,
            BitPix::F32 => BigEndian::read_f32(bytes) as f64,
        };
        *dst = (value * bscale + bzero) as f32;
    }
}
