//! Pure Rust image processing backend.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Identify | `ImageReader::into_decoder`, header only |
//! | Decode (JPEG, PNG, GIF, BMP, TIFF, WebP) | `image::ImageReader` with content sniffing |
//! | RGB conversion | [`PixelMode`] table |
//! | Shrink | `image::imageops::resize` (filter from config) |
//! | Crop / pad | `imageops::crop_imm` or `imageops::replace` onto a filled canvas |
//! | Encode → BMP | `image::codecs::bmp::BmpEncoder` (24-bit, uncompressed) |
//! | Strip (JPEG) | segment filter in [`jpeg_segments`](super::jpeg_segments) |
//! | Strip (other) | decode + `DynamicImage::write_to` in the same format |
//!
//! Every file written goes through [`write_atomically`].

use super::atomic::{AtomicWriter, write_atomically};
use super::backend::{
    BackendError, Dimensions, ImageBackend, ImageInfo, NormalizeOutcome, StripMethod,
    StripOutcome,
};
use super::calculations::{CropRect, calculate_center_crop, calculate_thumbnail_size};
use super::jpeg_segments::strip_metadata_segments;
use super::params::{NormalizeParams, StripParams};
use super::pixel_mode::PixelMode;
use image::codecs::bmp::BmpEncoder;
use image::{
    DynamicImage, ExtendedColorType, ImageDecoder, ImageEncoder, ImageFormat, ImageReader, Rgb,
    RgbImage, imageops,
};
use std::fs::File;
use std::io::{BufReader, Cursor, Write};
use std::path::Path;
use tracing::{debug, info, instrument};

/// Backend using the `image` crate ecosystem.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// Open `path` with the format sniffed from its content.
fn open_reader(path: &Path) -> Result<(ImageReader<BufReader<File>>, ImageFormat), BackendError> {
    let reader = ImageReader::open(path)
        .map_err(|e| BackendError::filesystem(path, e))?
        .with_guessed_format()
        .map_err(|e| BackendError::filesystem(path, e))?;
    let format = reader
        .format()
        .ok_or_else(|| BackendError::decode(path, "unrecognized image format"))?;
    Ok((reader, format))
}

/// Load and decode an image from disk, sniffing the format from its content.
pub(crate) fn load_image(path: &Path) -> Result<(DynamicImage, ImageFormat), BackendError> {
    let (reader, format) = open_reader(path)?;
    let img = reader
        .decode()
        .map_err(|e| BackendError::from_decode(path, e))?;
    Ok((img, format))
}

/// Encode `img` as an uncompressed 24-bit BMP.
pub(crate) fn encode_bmp(img: &RgbImage, writer: &mut AtomicWriter<'_>) -> image::ImageResult<()> {
    BmpEncoder::new(writer).write_image(
        img.as_raw(),
        img.width(),
        img.height(),
        ExtendedColorType::Rgb8,
    )
}

/// Write `img` to `path` as a 24-bit BMP, replacing any existing file atomically.
pub(crate) fn save_bmp(img: &RgbImage, path: &Path) -> Result<(), BackendError> {
    write_atomically(path, |w| {
        encode_bmp(img, w).map_err(|e| BackendError::from_encode(path, e))
    })
}

/// Cut `crop` out of `thumb`, padding with `fill` wherever the window leaves it.
/// Returns the result and whether any padding was needed.
fn crop_or_pad(thumb: &RgbImage, crop: CropRect, fill: [u8; 3]) -> (RgbImage, bool) {
    if crop.fits_within(thumb.dimensions()) {
        let cropped = imageops::crop_imm(
            thumb,
            crop.left as u32,
            crop.top as u32,
            crop.width,
            crop.height,
        )
        .to_image();
        return (cropped, false);
    }

    let mut canvas = RgbImage::from_pixel(crop.width, crop.height, Rgb(fill));
    imageops::replace(&mut canvas, thumb, -crop.left, -crop.top);
    (canvas, true)
}

impl ImageBackend for RustBackend {
    fn identify(&self, path: &Path) -> Result<ImageInfo, BackendError> {
        let (reader, format) = open_reader(path)?;
        let decoder = reader
            .into_decoder()
            .map_err(|e| BackendError::from_decode(path, e))?;
        Ok(ImageInfo {
            format,
            dims: decoder.dimensions().into(),
            mode: PixelMode::from_color_type(decoder.color_type())?,
        })
    }

    #[instrument(skip_all, fields(path = %params.path.display()))]
    fn strip_metadata(&self, params: &StripParams) -> Result<StripOutcome, BackendError> {
        let path = params.path.as_path();
        strip_file(path, |w, data| {
            w.write_all(data)
                .map_err(|e| BackendError::filesystem(path, e))
        })
    }

    #[instrument(skip_all, fields(source = %params.source.display(), target = %params.target))]
    fn normalize(&self, params: &NormalizeParams) -> Result<NormalizeOutcome, BackendError> {
        let (img, format) = load_image(&params.source)?;
        let source_dims = Dimensions::from((img.width(), img.height()));
        let mode = PixelMode::of(&img)?;
        debug!(?format, %mode, %source_dims, "Image decoded");

        let rgb = mode.to_rgb8(img)?;

        let (thumb_w, thumb_h) = calculate_thumbnail_size(rgb.dimensions(), params.bounds);
        let thumb = if (thumb_w, thumb_h) == rgb.dimensions() {
            rgb
        } else {
            debug!(thumb_w, thumb_h, "Shrinking into bounds");
            imageops::resize(&rgb, thumb_w, thumb_h, params.filter.into())
        };

        let crop = calculate_center_crop(thumb.dimensions(), params.target);
        let (normalized, padded) = crop_or_pad(&thumb, crop, params.fill);
        if padded {
            info!(
                left = crop.left,
                top = crop.top,
                "Crop window exceeds the image, padding with fill colour"
            );
        }

        save_bmp(&normalized, &params.output)?;
        info!(output = %params.output.display(), "Normalized image saved");

        Ok(NormalizeOutcome {
            source: params.source.clone(),
            output: params.output.clone(),
            source_dims,
            source_mode: mode,
            thumbnail: Dimensions::from((thumb_w, thumb_h)),
            crop,
            padded,
        })
    }
}

/// Strip `path` in place. `write` streams the stripped bytes into the
/// temporary file; the original is only replaced once it succeeds.
fn strip_file(
    path: &Path,
    write: impl FnOnce(&mut AtomicWriter<'_>, &[u8]) -> Result<(), BackendError>,
) -> Result<StripOutcome, BackendError> {
    let bytes = std::fs::read(path).map_err(|e| BackendError::filesystem(path, e))?;
    let format =
        image::guess_format(&bytes).map_err(|e| BackendError::from_decode(path, e))?;

    let (data, method, removed) = if format == ImageFormat::Jpeg {
        let stripped = strip_metadata_segments(&bytes)
            .map_err(|e| BackendError::decode(path, e.to_string()))?;
        (stripped.data, StripMethod::JpegSegments, stripped.removed)
    } else {
        let img = image::load_from_memory_with_format(&bytes, format)
            .map_err(|e| BackendError::from_decode(path, e))?;
        let mut encoded = Cursor::new(Vec::with_capacity(bytes.len()));
        img.write_to(&mut encoded, format)
            .map_err(|e| BackendError::from_encode(path, e))?;
        (encoded.into_inner(), StripMethod::Reencoded(format), Vec::new())
    };

    write_atomically(path, |w| write(w, &data))?;

    info!(
        ?method,
        removed = removed.len(),
        bytes_before = bytes.len(),
        bytes_after = data.len(),
        "Metadata stripped"
    );
    Ok(StripOutcome {
        path: path.to_path_buf(),
        method,
        removed,
        bytes_before: bytes.len() as u64,
        bytes_after: data.len() as u64,
    })
}
