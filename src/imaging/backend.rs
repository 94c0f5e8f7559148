//! Image processing backend trait and shared types.
//!
//! The [`ImageBackend`] trait defines the operations the normalizer needs:
//! identify, strip_metadata and normalize.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend), built on the `image`
//! crate. Tests use a recording mock so operation logic can be checked
//! without touching pixels.

use super::calculations::CropRect;
use super::params::{NormalizeParams, StripParams};
use super::pixel_mode::PixelMode;
use image::error::UnsupportedErrorKind;
use image::{ImageError, ImageFormat};
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Everything that can go wrong while normalizing one image.
///
/// The set is closed: unreadable input, filesystem trouble, or a pixel layout
/// the conversion table does not cover.
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("Failed to decode {}: {reason}", path.display())]
    Decode { path: PathBuf, reason: String },
    #[error("Filesystem error on {}", path.display())]
    Filesystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Unsupported pixel mode: {mode}")]
    UnsupportedMode { mode: String },
}

impl BackendError {
    pub(crate) fn filesystem(path: &Path, source: std::io::Error) -> Self {
        Self::Filesystem {
            path: path.to_path_buf(),
            source,
        }
    }

    pub(crate) fn decode(path: &Path, reason: impl Into<String>) -> Self {
        Self::Decode {
            path: path.to_path_buf(),
            reason: reason.into(),
        }
    }

    /// Classify an error raised while reading or decoding `path`.
    ///
    /// A short read inside the decoder is a corrupt file, not a filesystem
    /// fault, so `UnexpectedEof` stays a decode error.
    pub(crate) fn from_decode(path: &Path, err: ImageError) -> Self {
        match err {
            ImageError::Unsupported(e) if matches!(e.kind(), UnsupportedErrorKind::Color(_)) => {
                Self::UnsupportedMode {
                    mode: e.to_string(),
                }
            }
            ImageError::IoError(e) if e.kind() != std::io::ErrorKind::UnexpectedEof => {
                Self::filesystem(path, e)
            }
            other => Self::decode(path, other.to_string()),
        }
    }

    /// Classify an error raised while encoding to `path`.
    pub(crate) fn from_encode(path: &Path, err: ImageError) -> Self {
        match err {
            ImageError::IoError(e) => Self::filesystem(path, e),
            other => Self::UnsupportedMode {
                mode: format!("cannot encode {}: {other}", path.display()),
            },
        }
    }
}

/// Pixel dimensions of an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl From<(u32, u32)> for Dimensions {
    fn from((width, height): (u32, u32)) -> Self {
        Self { width, height }
    }
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Container format, size and pixel layout of an image file, read without
/// decoding its pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageInfo {
    pub format: ImageFormat,
    pub dims: Dimensions,
    pub mode: PixelMode,
}

/// What a normalize run did, for reporting.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizeOutcome {
    pub source: PathBuf,
    pub output: PathBuf,
    pub source_dims: Dimensions,
    pub source_mode: PixelMode,
    /// Size after the bounding-box shrink, before cropping.
    pub thumbnail: Dimensions,
    pub crop: CropRect,
    /// True when part of the crop window fell outside the thumbnail.
    pub padded: bool,
}

/// How a metadata strip rebuilt the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StripMethod {
    /// JPEG marker segments dropped; entropy-coded data copied untouched.
    JpegSegments,
    /// Decoded and re-encoded in the same format.
    Reencoded(ImageFormat),
}

/// What a metadata strip did, for reporting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StripOutcome {
    pub path: PathBuf,
    pub method: StripMethod,
    /// Labels of removed blocks (`APP1 Exif`, `COM`, ...). Only known for
    /// segment-level stripping; re-encoding drops everything implicitly.
    pub removed: Vec<String>,
    pub bytes_before: u64,
    pub bytes_after: u64,
}

/// Trait for image processing backends.
///
/// Operations are path-in, path-out so a mock can record them without
/// holding any pixels.
pub trait ImageBackend {
    /// Read format, dimensions and pixel layout from the file header.
    fn identify(&self, path: &Path) -> Result<ImageInfo, BackendError>;

    /// Rewrite `params.path` without auxiliary metadata blocks.
    ///
    /// The replacement is written to a temporary file first; the original is
    /// only replaced once the new content is fully on disk.
    fn strip_metadata(&self, params: &StripParams) -> Result<StripOutcome, BackendError>;

    /// Decode, convert to RGB8, shrink into the bounds, center-crop (padding
    /// if needed), and write a 24-bit BMP.
    fn normalize(&self, params: &NormalizeParams) -> Result<NormalizeOutcome, BackendError>;
}
