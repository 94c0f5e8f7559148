//! Shared test utilities for the bmpfit test suite.
//!
//! Builds small synthetic source images and injects the kind of auxiliary
//! metadata cameras and editors leave behind, so strip tests can check it is
//! gone afterwards.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = tempfile::TempDir::new().unwrap();
//! let path = tmp.path().join("phone.jpg");
//! create_test_jpeg(&path, 64, 48);
//! insert_jpeg_segment(&path, 0xE1, b"Exif\0\0");
//! assert!(jpeg_has_marker(&std::fs::read(&path).unwrap(), 0xE1));
//! ```

use image::{ExtendedColorType, ImageEncoder, RgbImage};
use std::path::Path;

// =========================================================================
// Synthetic images
// =========================================================================

/// Gradient pattern so resizes and crops are distinguishable.
pub fn gradient(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    })
}

/// Create a small valid JPEG file with the given dimensions.
pub fn create_test_jpeg(path: &Path, width: u32, height: u32) {
    let img = gradient(width, height);
    let file = std::fs::File::create(path).unwrap();
    let writer = std::io::BufWriter::new(file);
    image::codecs::jpeg::JpegEncoder::new(writer)
        .write_image(img.as_raw(), width, height, ExtendedColorType::Rgb8)
        .unwrap();
}

/// Create a solid-colour RGB PNG.
pub fn create_test_png(path: &Path, width: u32, height: u32, color: [u8; 3]) {
    RgbImage::from_pixel(width, height, image::Rgb(color))
        .save(path)
        .unwrap();
}

/// Decode any image file to RGB8.
pub fn decode_rgb(path: &Path) -> RgbImage {
    image::open(path).unwrap().to_rgb8()
}

// =========================================================================
// JPEG metadata injection
// =========================================================================

/// Insert a marker segment right after SOI.
pub fn insert_jpeg_segment(path: &Path, marker: u8, payload: &[u8]) {
    let data = std::fs::read(path).unwrap();
    assert_eq!(&data[..2], &[0xFF, 0xD8], "not a JPEG");

    let mut out = data[..2].to_vec();
    out.extend_from_slice(&[0xFF, marker]);
    out.extend_from_slice(&((payload.len() + 2) as u16).to_be_bytes());
    out.extend_from_slice(payload);
    out.extend_from_slice(&data[2..]);
    std::fs::write(path, out).unwrap();
}

/// Whether any segment before SOS uses `marker`.
pub fn jpeg_has_marker(data: &[u8], marker: u8) -> bool {
    let mut pos = 2;
    while pos + 4 <= data.len() && data[pos] == 0xFF {
        let m = data[pos + 1];
        if m == 0xDA {
            return false;
        }
        if m == marker {
            return true;
        }
        let len = u16::from_be_bytes([data[pos + 2], data[pos + 3]]) as usize;
        pos += 2 + len;
    }
    false
}

// =========================================================================
// PNG metadata injection
// =========================================================================

/// CRC-32 (ISO 3309) as used by PNG chunk trailers.
fn png_crc(bytes: &[u8]) -> u32 {
    let mut crc = 0xFFFF_FFFFu32;
    for &b in bytes {
        crc ^= b as u32;
        for _ in 0..8 {
            let mask = (crc & 1).wrapping_neg();
            crc = (crc >> 1) ^ (0xEDB8_8320 & mask);
        }
    }
    !crc
}

/// Insert a `tEXt` chunk just before IEND.
pub fn insert_png_text_chunk(path: &Path, keyword: &str, text: &str) {
    let data = std::fs::read(path).unwrap();
    let iend = data.len() - 12;
    assert_eq!(&data[iend + 4..iend + 8], b"IEND", "PNG must end with IEND");

    let mut body = b"tEXt".to_vec();
    body.extend_from_slice(keyword.as_bytes());
    body.push(0);
    body.extend_from_slice(text.as_bytes());

    let mut out = data[..iend].to_vec();
    out.extend_from_slice(&((body.len() - 4) as u32).to_be_bytes());
    out.extend_from_slice(&body);
    out.extend_from_slice(&png_crc(&body).to_be_bytes());
    out.extend_from_slice(&data[iend..]);
    std::fs::write(path, out).unwrap();
}

/// Whether the PNG contains a chunk of type `kind`.
pub fn png_has_chunk(data: &[u8], kind: &[u8; 4]) -> bool {
    let mut pos = 8;
    while pos + 8 <= data.len() {
        let len = u32::from_be_bytes([data[pos], data[pos + 1], data[pos + 2], data[pos + 3]])
            as usize;
        if &data[pos + 4..pos + 8] == kind {
            return true;
        }
        pos += 12 + len;
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn png_crc_matches_known_iend() {
        // Every PNG ends with IEND whose CRC is AE 42 60 82
        assert_eq!(png_crc(b"IEND"), 0xAE42_6082);
    }
}
