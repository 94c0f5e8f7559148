//! Source pixel layouts and their conversion to 24-bit RGB.
//!
//! Decoders hand back whatever layout the file stores. Palette images are
//! expanded to literal colours by the decoder, so they arrive here as RGB or
//! RGBA. Every layout below has an explicit rule for reaching `Rgb8`:
//!
//! | Mode | Steps |
//! |---|---|
//! | `L8` | expand gray |
//! | `La8` | expand gray, drop alpha |
//! | `Rgb8` | none |
//! | `Rgba8` | drop alpha |
//! | `L16` | expand gray, narrow depth |
//! | `La16` | expand gray, drop alpha, narrow depth |
//! | `Rgb16` | narrow depth |
//! | `Rgba16` | drop alpha, narrow depth |
//! | `Rgb32F` | narrow depth |
//! | `Rgba32F` | drop alpha, narrow depth |
//!
//! Alpha is discarded, not composited: a fully transparent red pixel becomes
//! opaque red.

use super::backend::BackendError;
use image::{ColorType, DynamicImage, ImageBuffer, Pixel, Rgb, RgbImage};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelMode {
    L8,
    La8,
    Rgb8,
    Rgba8,
    L16,
    La16,
    Rgb16,
    Rgba16,
    Rgb32F,
    Rgba32F,
}

/// One step of a conversion to `Rgb8`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversionStep {
    /// Replicate the luma channel into R, G and B.
    ExpandGray,
    /// Discard the alpha channel.
    DropAlpha,
    /// Scale 16-bit or float samples down to 8 bits.
    NarrowDepth,
}

use ConversionStep::{DropAlpha, ExpandGray, NarrowDepth};

impl PixelMode {
    /// Identify the layout of a decoded image.
    pub fn of(image: &DynamicImage) -> Result<Self, BackendError> {
        Self::from_color_type(image.color())
    }

    /// Map a decoder colour type onto the table.
    pub fn from_color_type(color: ColorType) -> Result<Self, BackendError> {
        Ok(match color {
            ColorType::L8 => Self::L8,
            ColorType::La8 => Self::La8,
            ColorType::Rgb8 => Self::Rgb8,
            ColorType::Rgba8 => Self::Rgba8,
            ColorType::L16 => Self::L16,
            ColorType::La16 => Self::La16,
            ColorType::Rgb16 => Self::Rgb16,
            ColorType::Rgba16 => Self::Rgba16,
            ColorType::Rgb32F => Self::Rgb32F,
            ColorType::Rgba32F => Self::Rgba32F,
            other => {
                return Err(BackendError::UnsupportedMode {
                    mode: format!("{other:?}"),
                });
            }
        })
    }

    /// Steps needed to reach `Rgb8`, in the order they are applied.
    pub fn rgb_conversion(self) -> &'static [ConversionStep] {
        match self {
            Self::L8 => &[ExpandGray],
            Self::La8 => &[ExpandGray, DropAlpha],
            Self::Rgb8 => &[],
            Self::Rgba8 => &[DropAlpha],
            Self::L16 => &[ExpandGray, NarrowDepth],
            Self::La16 => &[ExpandGray, DropAlpha, NarrowDepth],
            Self::Rgb16 | Self::Rgb32F => &[NarrowDepth],
            Self::Rgba16 | Self::Rgba32F => &[DropAlpha, NarrowDepth],
        }
    }

    /// Convert a decoded image to `Rgb8` following this mode's table entry.
    ///
    /// `image` must be the image this mode was read from.
    pub fn to_rgb8(self, image: DynamicImage) -> Result<RgbImage, BackendError> {
        let rgb = match (self, image) {
            (Self::Rgb8, DynamicImage::ImageRgb8(buf)) => buf,
            (Self::L8, DynamicImage::ImageLuma8(buf)) => map_pixels(&buf, |c| [c[0]; 3]),
            (Self::La8, DynamicImage::ImageLumaA8(buf)) => map_pixels(&buf, |c| [c[0]; 3]),
            (Self::Rgba8, DynamicImage::ImageRgba8(buf)) => {
                map_pixels(&buf, |c| [c[0], c[1], c[2]])
            }
            (Self::L16, DynamicImage::ImageLuma16(buf)) => {
                map_pixels(&buf, |c| [narrow_u16(c[0]); 3])
            }
            (Self::La16, DynamicImage::ImageLumaA16(buf)) => {
                map_pixels(&buf, |c| [narrow_u16(c[0]); 3])
            }
            (Self::Rgb16, DynamicImage::ImageRgb16(buf)) => map_pixels(&buf, |c| {
                [narrow_u16(c[0]), narrow_u16(c[1]), narrow_u16(c[2])]
            }),
            (Self::Rgba16, DynamicImage::ImageRgba16(buf)) => map_pixels(&buf, |c| {
                [narrow_u16(c[0]), narrow_u16(c[1]), narrow_u16(c[2])]
            }),
            (Self::Rgb32F, DynamicImage::ImageRgb32F(buf)) => map_pixels(&buf, |c| {
                [narrow_f32(c[0]), narrow_f32(c[1]), narrow_f32(c[2])]
            }),
            (Self::Rgba32F, DynamicImage::ImageRgba32F(buf)) => map_pixels(&buf, |c| {
                [narrow_f32(c[0]), narrow_f32(c[1]), narrow_f32(c[2])]
            }),
            (mode, other) => {
                return Err(BackendError::UnsupportedMode {
                    mode: format!("{mode} does not match decoded {:?}", other.color()),
                });
            }
        };
        Ok(rgb)
    }
}

impl fmt::Display for PixelMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::L8 => "L8",
            Self::La8 => "LA8",
            Self::Rgb8 => "RGB8",
            Self::Rgba8 => "RGBA8",
            Self::L16 => "L16",
            Self::La16 => "LA16",
            Self::Rgb16 => "RGB16",
            Self::Rgba16 => "RGBA16",
            Self::Rgb32F => "RGB32F",
            Self::Rgba32F => "RGBA32F",
        };
        f.write_str(name)
    }
}

impl fmt::Display for ConversionStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ExpandGray => "expand gray",
            DropAlpha => "drop alpha",
            NarrowDepth => "narrow depth",
        })
    }
}

fn map_pixels<P: Pixel>(
    src: &ImageBuffer<P, Vec<P::Subpixel>>,
    to_rgb: impl Fn(&[P::Subpixel]) -> [u8; 3],
) -> RgbImage {
    RgbImage::from_fn(src.width(), src.height(), |x, y| {
        Rgb(to_rgb(src.get_pixel(x, y).channels()))
    })
}

/// 16-bit → 8-bit with rounding (65535 → 255, 128 → 0, 129 → 1).
fn narrow_u16(v: u16) -> u8 {
    ((v as u32 + 128) / 257) as u8
}

/// Linear float → 8-bit, clamped to `[0, 1]`.
fn narrow_f32(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}
