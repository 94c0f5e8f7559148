//! Nibble steganography on 24-bit BMP files.
//!
//! A hidden image is stored in the low four bits of every colour byte of a
//! carrier image of the same size:
//!
//! ```text
//! carrier  1011 0110
//! hidden   0101 1100
//! result   1011 0101   (carrier high nibble, hidden high nibble)
//! ```
//!
//! Revealing swaps the two nibbles of every byte, so the hidden image becomes
//! the visible high nibble. Swapping is its own inverse: revealing twice
//! restores the original pixels.
//!
//! The same files can be retouched in place with [`retouch`]: colour
//! inversion, grayscale and a horizontal mirror.
//!
//! Only uncompressed 24-bit BMPs are accepted. Files produced by
//! [`normalize`](crate::imaging::normalize) qualify, and two normalized images
//! with the same target size always have matching dimensions.

use crate::imaging::bmp::read_header;
use crate::imaging::rust_backend::{load_image, save_bmp};
use crate::imaging::{BackendError, Dimensions};
use image::{DynamicImage, Pixel, Rgb, RgbImage, imageops};
use std::path::Path;
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum StegoError {
    #[error(transparent)]
    Backend(#[from] BackendError),
    #[error("Hidden image is {hidden} but carrier is {carrier}; sizes must match")]
    DimensionMismatch {
        carrier: Dimensions,
        hidden: Dimensions,
    },
}

/// Exchange the high and low nibble of a byte.
pub fn swap_nibbles(byte: u8) -> u8 {
    byte.rotate_left(4)
}

/// Keep the carrier's high nibble and store the hidden byte's high nibble
/// in the low bits.
pub fn combine_high_nibbles(carrier: u8, hidden: u8) -> u8 {
    (carrier & 0xF0) | (hidden >> 4)
}

/// Swap nibbles of every colour byte in place.
pub fn reveal_pixels(img: &mut RgbImage) {
    for byte in img.iter_mut() {
        *byte = swap_nibbles(*byte);
    }
}

/// Embed `hidden` into the low nibbles of `carrier`.
pub fn hide_pixels(carrier: &mut RgbImage, hidden: &RgbImage) -> Result<(), StegoError> {
    if carrier.dimensions() != hidden.dimensions() {
        return Err(StegoError::DimensionMismatch {
            carrier: carrier.dimensions().into(),
            hidden: hidden.dimensions().into(),
        });
    }
    for (c, h) in carrier.iter_mut().zip(hidden.iter()) {
        *c = combine_high_nibbles(*c, *h);
    }
    Ok(())
}

/// Whole-image pixel operations on 24-bit BMPs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Retouch {
    /// Replace every colour byte `b` with `255 - b`
    Invert,
    /// Set every channel to the pixel's luma
    Grayscale,
    /// Mirror left to right
    Hflip,
}

impl Retouch {
    pub fn apply(self, img: &mut RgbImage) {
        match self {
            Retouch::Invert => imageops::invert(img),
            Retouch::Grayscale => grayscale_pixels(img),
            Retouch::Hflip => imageops::flip_horizontal_in_place(img),
        }
    }
}

impl std::fmt::Display for Retouch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Retouch::Invert => "Inverted",
            Retouch::Grayscale => "Grayscaled",
            Retouch::Hflip => "Flipped",
        })
    }
}

/// Collapse every pixel to its luma, keeping three equal channels.
pub fn grayscale_pixels(img: &mut RgbImage) {
    for pixel in img.pixels_mut() {
        let [luma] = pixel.to_luma().0;
        *pixel = Rgb([luma; 3]);
    }
}

/// Load an uncompressed 24-bit BMP as RGB8.
fn load_true_color_bmp(path: &Path) -> Result<RgbImage, BackendError> {
    read_header(path)?.require_true_color()?;
    let (img, _) = load_image(path)?;
    Ok(match img {
        DynamicImage::ImageRgb8(rgb) => rgb,
        other => other.to_rgb8(),
    })
}

/// Reveal the image hidden in `path`, writing the result to `output`.
///
/// `output` may equal `path`; the file is replaced atomically.
pub fn reveal(path: &Path, output: &Path) -> Result<(), StegoError> {
    let mut img = load_true_color_bmp(path)?;
    reveal_pixels(&mut img);
    save_bmp(&img, output)?;
    info!(source = %path.display(), output = %output.display(), "Hidden image revealed");
    Ok(())
}

/// Hide `hidden` inside `carrier`, writing the result to `output`.
pub fn hide(carrier: &Path, hidden: &Path, output: &Path) -> Result<(), StegoError> {
    let mut carrier_img = load_true_color_bmp(carrier)?;
    let hidden_img = load_true_color_bmp(hidden)?;
    hide_pixels(&mut carrier_img, &hidden_img)?;
    save_bmp(&carrier_img, output)?;
    info!(
        carrier = %carrier.display(),
        hidden = %hidden.display(),
        output = %output.display(),
        "Image hidden"
    );
    Ok(())
}

/// Apply `op` to the BMP at `path`, writing the result to `output`.
pub fn retouch(op: Retouch, path: &Path, output: &Path) -> Result<(), StegoError> {
    let mut img = load_true_color_bmp(path)?;
    op.apply(&mut img);
    save_bmp(&img, output)?;
    info!(source = %path.display(), output = %output.display(), ?op, "Image retouched");
    Ok(())
}
