//! # bmpfit
//!
//! Turns arbitrary photos into fixed-size 24-bit BMP files. Every output is
//! exactly the configured width and height (900x900 by default), whatever the
//! source's size, aspect ratio or pixel format.
//!
//! # Pipeline
//!
//! ```text
//! 1. Strip      (optional) rewrite the source without EXIF/ICC/text blocks
//! 2. Decode     content-sniffed; any supported layout → RGB8
//! 3. Thumbnail  shrink into the bounding box, never enlarge
//! 4. Crop       centered target-size window, padded where it leaves the image
//! 5. Encode     24-bit BMP beside the source, written atomically
//! ```
//!
//! The geometry in steps 3 and 4 is pure arithmetic in
//! [`imaging::calculate_thumbnail_size`] and [`imaging::calculate_center_crop`];
//! pixel work sits behind the [`imaging::ImageBackend`] trait so the driver
//! logic can be tested against a recording mock.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`imaging`] | Geometry, pixel-mode conversion, BMP encode, metadata strip |
//! | [`interactive`] | Prompt loop that normalizes one path per answer |
//! | [`stego`] | Nibble steganography and retouching on 24-bit BMPs |
//! | [`config`] | `bmpfit.toml` loading and validation |
//! | [`types`] | Validated target dimensions |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Exact Output Size
//!
//! A source smaller than the target is never upscaled. The crop window then
//! extends past the image and the uncovered area is filled with a solid
//! colour (black unless configured), so the output is still exactly the
//! target size.
//!
//! ## Literal Extension Rule
//!
//! The output path replaces everything after the last `.` in the source path
//! with `bmp`: `archive.tar.jpg` becomes `archive.tar.bmp`. A path with no dot
//! gets `.bmp` appended.
//!
//! ## No Partial Writes
//!
//! Both the stripped source and the BMP are written to a temporary sibling
//! file and renamed over the destination. An interrupted run leaves the
//! previous file intact.

pub mod config;
pub mod imaging;
pub mod interactive;
pub mod output;
pub mod stego;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
