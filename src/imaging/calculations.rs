//! Pure calculation functions for normalization geometry.
//!
//! All functions here are pure and testable without any I/O or images.

use super::params::BoundsPolicy;
use crate::types::TargetDimensions;
use std::path::{Path, PathBuf};

/// Bounding box the source is shrunk into before cropping.
///
/// # Examples
/// ```
/// # use bmpfit::imaging::{BoundsPolicy, bounding_box};
/// # use bmpfit::types::TargetDimensions;
/// let target = TargetDimensions::new(900, 600).unwrap();
/// assert_eq!(bounding_box(target, BoundsPolicy::Fit), (900, 600));
/// assert_eq!(bounding_box(target, BoundsPolicy::Margin), (1200, 800));
/// ```
pub fn bounding_box(target: TargetDimensions, policy: BoundsPolicy) -> (u32, u32) {
    let (w, h) = target.as_tuple();
    match policy {
        BoundsPolicy::Fit => (w, h),
        BoundsPolicy::Margin => (w.saturating_add(w / 3), h.saturating_add(h / 3)),
    }
}

/// Calculate the size of a bounding-box thumbnail.
///
/// Never enlarges: a source that already fits inside `bounds` keeps its size.
/// Otherwise one edge matches the box and the other is the integer (floor or
/// ceil, never below 1) whose resulting aspect ratio is closest to the
/// source's.
///
/// # Arguments
/// * `source` - Decoded image dimensions (width, height)
/// * `bounds` - Bounding box (width, height)
pub fn calculate_thumbnail_size(source: (u32, u32), bounds: (u32, u32)) -> (u32, u32) {
    let (src_w, src_h) = source;
    let (box_w, box_h) = bounds;

    if src_w <= box_w && src_h <= box_h {
        return source;
    }

    let aspect = src_w as f64 / src_h as f64;
    let box_w_f = box_w as f64;
    let box_h_f = box_h as f64;

    if box_w_f / box_h_f >= aspect {
        // Box is relatively wider: height is the binding edge
        let w = round_to_aspect(box_h_f * aspect, |n| (aspect - n / box_h_f).abs());
        (w, box_h)
    } else {
        // Box is relatively taller: width is the binding edge
        let h = round_to_aspect(box_w_f / aspect, |n| {
            if n == 0.0 {
                0.0
            } else {
                (aspect - box_w_f / n).abs()
            }
        });
        (box_w, h)
    }
}

/// Pick floor or ceil of `value`, whichever has the lower aspect error.
/// Ties go to floor.
fn round_to_aspect(value: f64, error: impl Fn(f64) -> f64) -> u32 {
    let lo = value.floor();
    let hi = value.ceil();
    let picked = if error(hi) < error(lo) { hi } else { lo };
    (picked as u32).max(1)
}

/// A crop window in source coordinates. `left`/`top` may be negative and the
/// window may extend past the right/bottom edge; those areas are padded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropRect {
    pub left: i64,
    pub top: i64,
    pub width: u32,
    pub height: u32,
}

impl CropRect {
    pub fn right(&self) -> i64 {
        self.left + self.width as i64
    }

    pub fn bottom(&self) -> i64 {
        self.top + self.height as i64
    }

    /// Whether the window lies entirely inside an image of size `dims`.
    pub fn fits_within(&self, dims: (u32, u32)) -> bool {
        self.left >= 0
            && self.top >= 0
            && self.right() <= dims.0 as i64
            && self.bottom() <= dims.1 as i64
    }
}

/// Calculate a centered crop window of exactly `target` size.
///
/// Half-pixel offsets are floored, so the window is always exactly
/// `target.width() x target.height()` regardless of parity.
pub fn calculate_center_crop(image: (u32, u32), target: TargetDimensions) -> CropRect {
    let (img_w, img_h) = image;
    let (tgt_w, tgt_h) = target.as_tuple();

    CropRect {
        left: (img_w as i64 - tgt_w as i64).div_euclid(2),
        top: (img_h as i64 - tgt_h as i64).div_euclid(2),
        width: tgt_w,
        height: tgt_h,
    }
}

/// Output path for a normalized image.
///
/// Everything after the last `.` of the whole path string is replaced with
/// `bmp`; a path with no `.` gets `.bmp` appended. The dot search is not
/// limited to the file name, so `shots.v2/photo` becomes `shots.bmp`.
pub fn bmp_output_path(input: &Path) -> PathBuf {
    let Some(raw) = input.to_str() else {
        return input.with_extension("bmp");
    };
    let base = match raw.rfind('.') {
        Some(dot) => &raw[..dot],
        None => raw,
    };
    PathBuf::from(format!("{base}.bmp"))
}
