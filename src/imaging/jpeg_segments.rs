//! Lossless JPEG metadata removal at the marker-segment level.
//!
//! Walks the marker segments that precede the first SOS (start of scan) and
//! drops the ones that only carry auxiliary data:
//!
//! | Marker | Typical payload | Kept? |
//! |---|---|---|
//! | APP0 (`FFE0`) | JFIF | yes |
//! | APP1 (`FFE1`) | Exif, XMP | no |
//! | APP2 (`FFE2`) | ICC profile | no |
//! | APP3–APP12 | vendor data | no |
//! | APP13 (`FFED`) | Photoshop / IPTC | no |
//! | APP14 (`FFEE`) | Adobe colour transform | yes (changes decoding) |
//! | APP15 (`FFEF`) | vendor data | no |
//! | COM (`FFFE`) | comment | no |
//!
//! Everything from SOS onwards, including the entropy-coded data, is copied
//! byte for byte, so the stripped file decodes to identical pixels.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum JpegError {
    #[error("missing JPEG start-of-image marker")]
    NotJpeg,
    #[error("expected a marker at byte {0}")]
    BadMarker(usize),
    #[error("segment at byte {0} runs past end of file")]
    Truncated(usize),
}

/// Result of a segment-level strip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StrippedJpeg {
    pub data: Vec<u8>,
    /// Labels of removed segments, in file order.
    pub removed: Vec<String>,
}

const SOI: u8 = 0xD8;
const EOI: u8 = 0xD9;
const SOS: u8 = 0xDA;
const APP0: u8 = 0xE0;
const APP14: u8 = 0xEE;
const APP15: u8 = 0xEF;
const COM: u8 = 0xFE;

fn is_auxiliary(marker: u8) -> bool {
    matches!(marker, APP0..=APP15 | COM) && marker != APP0 && marker != APP14
}

/// Markers that stand alone without a length field.
fn is_standalone(marker: u8) -> bool {
    marker == 0x01 || (0xD0..=0xD7).contains(&marker) || marker == SOI || marker == EOI
}

/// Human-readable label for a removed segment.
fn label(marker: u8, payload: &[u8]) -> String {
    match marker {
        0xE1 if payload.starts_with(b"Exif\0") => "APP1 Exif".to_string(),
        0xE1 if payload.starts_with(b"http://ns.adobe.com/xap/") => "APP1 XMP".to_string(),
        0xE2 if payload.starts_with(b"ICC_PROFILE\0") => "APP2 ICC".to_string(),
        0xED if payload.starts_with(b"Photoshop 3.0\0") => "APP13 IPTC".to_string(),
        COM => "COM".to_string(),
        m => format!("APP{}", m - APP0),
    }
}

/// Remove auxiliary segments from a JPEG byte stream.
pub fn strip_metadata_segments(data: &[u8]) -> Result<StrippedJpeg, JpegError> {
    if data.len() < 2 || data[0] != 0xFF || data[1] != SOI {
        return Err(JpegError::NotJpeg);
    }

    let mut out = Vec::with_capacity(data.len());
    out.extend_from_slice(&data[..2]);
    let mut removed = Vec::new();
    let mut pos = 2;

    while pos < data.len() {
        if data[pos] != 0xFF {
            return Err(JpegError::BadMarker(pos));
        }
        // Any number of 0xFF fill bytes may precede a marker
        let mut marker_pos = pos + 1;
        while marker_pos < data.len() && data[marker_pos] == 0xFF {
            marker_pos += 1;
        }
        if marker_pos >= data.len() {
            return Err(JpegError::Truncated(pos));
        }
        let marker = data[marker_pos];

        if marker == SOS {
            // Scan data and every later segment are copied untouched
            out.extend_from_slice(&data[pos..]);
            break;
        }
        if is_standalone(marker) {
            out.extend_from_slice(&data[pos..=marker_pos]);
            pos = marker_pos + 1;
            if marker == EOI {
                break;
            }
            continue;
        }

        if marker_pos + 3 > data.len() {
            return Err(JpegError::Truncated(pos));
        }
        let len = u16::from_be_bytes([data[marker_pos + 1], data[marker_pos + 2]]) as usize;
        let end = marker_pos + 1 + len;
        if len < 2 || end > data.len() {
            return Err(JpegError::Truncated(pos));
        }

        if is_auxiliary(marker) {
            removed.push(label(marker, &data[marker_pos + 3..end]));
        } else {
            out.extend_from_slice(&data[pos..end]);
        }
        pos = end;
    }

    Ok(StrippedJpeg { data: out, removed })
}
