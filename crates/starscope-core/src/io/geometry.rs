use std::fmt;

use serde::Serialize;

use crate::error::{Result, StarscopeError};

use super::header::FitsHeader;

/// Pixel storage type from the BITPIX keyword.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum BitPix {
    /// 8-bit unsigned integer.
    U8,
    /// 16-bit signed big-endian integer.
    I16,
    /// 32-bit signed big-endian integer.
    I32,
    /// 32-bit IEEE float, big-endian.
    F32,
}

impl BitPix {
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            8 => Some(BitPix::U8),
            16 => Some(BitPix::I16),
            32 => Some(BitPix::I32),
            -32 => Some(BitPix::F32),
            _ => None,
        }
    }

    pub fn code(self) -> i32 {
        match self {
            BitPix::U8 => 8,
            BitPix::I16 => 16,
            BitPix::I32 => 32,
            BitPix::F32 => -32,
        }
    }

    pub fn bytes_per_pixel(self) -> usize {
        match self {
            BitPix::U8 => 1,
            BitPix::I16 => 2,
            BitPix::I32 | BitPix::F32 => 4,
        }
    }
}

impl fmt::Display for BitPix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BitPix::U8 => write!(f, "8-bit unsigned"),
            BitPix::I16 => write!(f, "16-bit signed"),
            BitPix::I32 => write!(f, "32-bit signed"),
            BitPix::F32 => write!(f, "32-bit float"),
        }
    }
}

/// Everything the tile reader needs to locate and decode pixels.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ImageGeometry {
    pub width: usize,
    pub height: usize,
    pub bitpix: BitPix,
    pub bscale: f64,
    pub bzero: f64,
    pub data_offset: u64,
}

impl ImageGeometry {
    /// Validate the required keywords and derive the pixel layout.
    pub fn from_header(header: &FitsHeader) -> Result<Self> {
        let width = required_int(header, "NAXIS1")?;
        let height = required_int(header, "NAXIS2")?;
        let bitpix_code = required_int(header, "BITPIX")?;

        let bitpix = BitPix::from_code(bitpix_code).ok_or_else(|| {
            StarscopeError::UnsupportedFormat(format!("BITPIX = {bitpix_code}"))
        })?;

        if width <= 0 || height <= 0 {
            return Err(StarscopeError::InvalidDimensions { width, height });
        }

        // Every pixel offset must be addressable: data_offset + width * height * bpp.
        let data_offset = header.data_offset();
        let addressable = (width as u64)
            .checked_mul(bitpix.bytes_per_pixel() as u64)
            .filter(|stride| usize::try_from(*stride).is_ok())
            .and_then(|stride| stride.checked_mul(height as u64))
            .and_then(|plane| plane.checked_add(data_offset))
            .is_some();
        if !addressable || usize::try_from(height).is_err() {
            return Err(StarscopeError::InvalidDimensions { width, height });
        }

        Ok(Self {
            width: width as usize,
            height: height as usize,
            bitpix,
            bscale: header.number("BSCALE").unwrap_or(1.0),
            bzero: header.number("BZERO").unwrap_or(0.0),
            data_offset,
        })
    }

    /// Bytes per image row.
    pub fn row_stride(&self) -> u64 {
        (self.width * self.bitpix.bytes_per_pixel()) as u64
    }

    /// Byte offset of pixel (`col`, `row`) in the file.
    pub fn pixel_offset(&self, col: usize, row: usize) -> u64 {
        self.data_offset
            + row as u64 * self.row_stride()
            + (col * self.bitpix.bytes_per_pixel()) as u64
    }
}

fn required_int(header: &FitsHeader, key: &str) -> Result<i64> {
    let value = header
        .number(key)
        .ok_or_else(|| StarscopeError::HeaderParse(format!("missing required keyword {key}")))?;
    if value.fract() != 0.0 || !value.is_finite() {
        return Err(StarscopeError::HeaderParse(format!(
            "{key} must be an integer, got {value}"
        )));
    }
    Ok(value as i64)
}
