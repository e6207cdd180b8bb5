use ndarray::Array2;

use starscope_core::consts::{FITS_BLOCK_SIZE, FITS_CARD_SIZE};

/// Format one 80-byte header card: `KEY     = value`.
pub fn card(key: &str, value: &str) -> Vec<u8> {
    let mut c = format!("{key:<8}= {value:>20}").into_bytes();
    c.resize(FITS_CARD_SIZE, b' ');
    c
}

/// Pad `buf` with `fill` up to the next FITS block boundary.
pub fn pad_to_block(buf: &mut Vec<u8>, fill: u8) {
    let len = buf.len().div_ceil(FITS_BLOCK_SIZE) * FITS_BLOCK_SIZE;
    buf.resize(len, fill);
}

/// Build a complete header: SIMPLE/BITPIX/NAXIS/NAXIS1/NAXIS2, then `extra`
/// cards, then END, padded to a whole block.
pub fn build_fits_header(width: i64, height: i64, bitpix: i32, extra: &[(&str, &str)]) -> Vec<u8> {
    let mut buf = Vec::new();
    buf.extend(card("SIMPLE", "T"));
    buf.extend(card("BITPIX", &bitpix.to_string()));
    buf.extend(card("NAXIS", "2"));
    buf.extend(card("NAXIS1", &width.to_string()));
    buf.extend(card("NAXIS2", &height.to_string()));
    for (k, v) in extra {
        buf.extend(card(k, v));
    }
    let mut end = b"END".to_vec();
    end.resize(FITS_CARD_SIZE, b' ');
    buf.extend(end);
    pad_to_block(&mut buf, b' ');
    buf
}

/// Encode stored (pre-BSCALE/BZERO) values big-endian for `bitpix`.
pub fn encode_raw(bitpix: i32, values: &[f64]) -> Vec<u8> {
    let mut out = Vec::new();
    for &v in values {
        match bitpix {
            8 => out.push(v.round().clamp(0.0, 255.0) as u8),
            16 => out.extend_from_slice(&(v.round() as i16).to_be_bytes()),
            32 => out.extend_from_slice(&(v.round() as i32).to_be_bytes()),
            -32 => out.extend_from_slice(&(v as f32).to_be_bytes()),
            other => panic!("unsupported test BITPIX {other}"),
        }
    }
    out
}

/// Build a full FITS file from a physical-value image, storing
/// `(value - bzero) / bscale`.
pub fn build_fits(image: &Array2<f32>, bitpix: i32, bscale: f64, bzero: f64) -> Vec<u8> {
    let (h, w) = image.dim();
    let bscale_s = format!("{bscale:.1}");
    let bzero_s = format!("{bzero:.1}");
    let mut buf = build_fits_header(
        w as i64,
        h as i64,
        bitpix,
        &[("BSCALE", &bscale_s), ("BZERO", &bzero_s)],
    );
    let raw: Vec<f64> = image
        .iter()
        .map(|&v| (v as f64 - bzero) / bscale)
        .collect();
    buf.extend(encode_raw(bitpix, &raw));
    pad_to_block(&mut buf, 0);
    buf
}

/// Shortcut for the common 16-bit, unscaled case.
pub fn build_fits_i16(image: &Array2<f32>) -> Vec<u8> {
    build_fits(image, 16, 1.0, 0.0)
}

/// Add an elliptical Gaussian (axis-aligned) centered at (`cy`, `cx`),
/// evaluated within `radius` pixels of the center.
pub fn add_gaussian(
    image: &mut Array2<f32>,
    cy: f64,
    cx: f64,
    sigma_y: f64,
    sigma_x: f64,
    amplitude: f64,
    radius: usize,
) {
    let (h, w) = image.dim();
    let r0 = (cy.round() as usize).saturating_sub(radius);
    let c0 = (cx.round() as usize).saturating_sub(radius);
    let r1 = (cy.round() as usize + radius).min(h - 1);
    let c1 = (cx.round() as usize + radius).min(w - 1);
    for r in r0..=r1 {
        for c in c0..=c1 {
            let dy = (r as f64 - cy) / sigma_y;
            let dx = (c as f64 - cx) / sigma_x;
            image[[r, c]] += (amplitude * (-0.5 * (dx * dx + dy * dy)).exp()) as f32;
        }
    }
}

/// Deterministic pseudo-random noise in `[-amplitude, amplitude]`.
pub fn add_noise(image: &mut Array2<f32>, amplitude: f32, seed: u64) {
    let mut state = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
    for v in image.iter_mut() {
        state = state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        let unit = ((state >> 33) as f64) / ((1u64 << 31) as f64);
        *v += ((unit * 2.0 - 1.0) as f32) * amplitude;
    }
}

/// Write bytes to a temporary file that lives as long as the handle.
pub fn write_test_fits(data: &[u8]) -> tempfile::NamedTempFile {
    use std::io::Write;
    let mut f = tempfile::NamedTempFile::new().expect("create temp file");
    f.write_all(data).expect("write FITS data");
    f.flush().expect("flush");
    f
}
