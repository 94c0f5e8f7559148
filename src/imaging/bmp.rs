//! BMP header parsing.
//!
//! Reads the 14-byte file header and the 40-byte `BITMAPINFOHEADER` that every
//! Windows BMP written since 3.x carries (later V4/V5 headers extend it, so the
//! first 40 bytes are always laid out the same way). All fields are
//! little-endian.
//!
//! ```text
//! offset  size  field
//!      0     2  "BM"
//!      2     4  file size
//!      6     2  reserved 1
//!      8     2  reserved 2
//!     10     4  pixel data offset
//!     14     4  DIB header size
//!     18     4  width (signed)
//!     22     4  height (signed, negative = top-down)
//!     26     2  colour planes
//!     28     2  bits per pixel
//!     30     4  compression scheme
//!     34     4  image size
//!     38     4  horizontal resolution (px/m)
//!     42     4  vertical resolution (px/m)
//!     46     4  palette colours
//!     50     4  important colours
//! ```

use super::backend::BackendError;
use std::fs::File;
use std::io::Read;
use std::path::Path;

const FILE_HEADER_LEN: usize = 14;
const INFO_HEADER_LEN: usize = 40;
pub const HEADER_LEN: usize = FILE_HEADER_LEN + INFO_HEADER_LEN;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileHeader {
    pub id: [u8; 2],
    pub file_size: u32,
    pub reserved1: u16,
    pub reserved2: u16,
    pub pixel_offset: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DibHeader {
    pub header_size: u32,
    pub width: i32,
    pub height: i32,
    pub planes: u16,
    pub bits_per_pixel: u16,
    pub compression: u32,
    pub image_size: u32,
    pub h_resolution: i32,
    pub v_resolution: i32,
    pub palette_colors: u32,
    pub important_colors: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BmpHeader {
    pub file: FileHeader,
    pub dib: DibHeader,
}

impl BmpHeader {
    /// Reject anything but uncompressed 24-bit pixels.
    pub fn require_true_color(&self) -> Result<(), BackendError> {
        if self.dib.bits_per_pixel != 24 || self.dib.compression != 0 {
            return Err(BackendError::UnsupportedMode {
                mode: format!(
                    "{}-bit BMP (compression {}), need uncompressed 24-bit",
                    self.dib.bits_per_pixel, self.dib.compression
                ),
            });
        }
        Ok(())
    }
}

fn u16_at(b: &[u8], at: usize) -> u16 {
    u16::from_le_bytes([b[at], b[at + 1]])
}

fn u32_at(b: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([b[at], b[at + 1], b[at + 2], b[at + 3]])
}

fn i32_at(b: &[u8], at: usize) -> i32 {
    u32_at(b, at) as i32
}

/// Parse the leading bytes of a BMP file.
pub fn parse_header(bytes: &[u8]) -> Result<BmpHeader, String> {
    if bytes.len() < HEADER_LEN {
        return Err(format!(
            "{} bytes is too short for a BMP header ({HEADER_LEN} needed)",
            bytes.len()
        ));
    }
    if &bytes[..2] != b"BM" {
        return Err("missing BM signature".to_string());
    }

    let header_size = u32_at(bytes, 14);
    if (header_size as usize) < INFO_HEADER_LEN {
        return Err(format!(
            "DIB header of {header_size} bytes is not supported (need at least {INFO_HEADER_LEN})"
        ));
    }

    Ok(BmpHeader {
        file: FileHeader {
            id: [bytes[0], bytes[1]],
            file_size: u32_at(bytes, 2),
            reserved1: u16_at(bytes, 6),
            reserved2: u16_at(bytes, 8),
            pixel_offset: u32_at(bytes, 10),
        },
        dib: DibHeader {
            header_size,
            width: i32_at(bytes, 18),
            height: i32_at(bytes, 22),
            planes: u16_at(bytes, 26),
            bits_per_pixel: u16_at(bytes, 28),
            compression: u32_at(bytes, 30),
            image_size: u32_at(bytes, 34),
            h_resolution: i32_at(bytes, 38),
            v_resolution: i32_at(bytes, 42),
            palette_colors: u32_at(bytes, 46),
            important_colors: u32_at(bytes, 50),
        },
    })
}

/// Read and parse the header of the BMP file at `path`.
pub fn read_header(path: &Path) -> Result<BmpHeader, BackendError> {
    let mut file = File::open(path).map_err(|e| BackendError::filesystem(path, e))?;
    let mut bytes = Vec::with_capacity(HEADER_LEN);
    file.by_ref()
        .take(HEADER_LEN as u64)
        .read_to_end(&mut bytes)
        .map_err(|e| BackendError::filesystem(path, e))?;
    parse_header(&bytes).map_err(|reason| BackendError::decode(path, reason))
}
