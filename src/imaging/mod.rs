//! Image processing: decode, shrink, center-crop, write 24-bit BMP.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Decode** | `image::ImageReader` (content-sniffed) |
//! | **RGB conversion** | explicit [`PixelMode`] table |
//! | **Thumbnail** | `imageops::resize`, never enlarging |
//! | **Center crop** | `imageops::crop_imm`, padded canvas when out of bounds |
//! | **Encode** | `BmpEncoder`, 24 bits per pixel |
//! | **Metadata strip** | JPEG segment filter, or re-encode in place |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for bounds, thumbnail size, crop window, output path
//! - **Parameters**: Data structures describing image operations
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Operations**: High-level functions combining calculations + backend
//! - **Support**: atomic file replacement, JPEG segments, BMP headers

pub(crate) mod atomic;
pub mod backend;
pub mod bmp;
mod calculations;
pub(crate) mod jpeg_segments;
pub mod operations;
mod params;
pub mod pixel_mode;
pub mod rust_backend;

pub use backend::{
    BackendError, Dimensions, ImageBackend, ImageInfo, NormalizeOutcome, StripMethod,
    StripOutcome,
};
pub use calculations::{
    CropRect, bmp_output_path, bounding_box, calculate_center_crop, calculate_thumbnail_size,
};
pub use operations::{NormalizeConfig, NormalizeReport, normalize, plan_normalize};
pub use params::{BoundsPolicy, NormalizeParams, ResampleFilter, StripParams};
pub use pixel_mode::{ConversionStep, PixelMode};
pub use rust_backend::RustBackend;
