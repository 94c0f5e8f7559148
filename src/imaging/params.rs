//! Parameter types for image operations.
//!
//! These structs describe *what* to do, not *how* to do it. They are the
//! interface between the high-level [`operations`](super::operations) module
//! (which resolves paths and geometry from configuration) and the
//! [`backend`](super::backend) (which does the actual pixel work). Tests swap
//! in a recording mock backend without touching operation logic.
//!
//! ## Types
//!
//! - [`BoundsPolicy`]: How the thumbnail bounding box relates to the target size.
//! - [`ResampleFilter`]: Resampling kernel used when shrinking.
//! - [`NormalizeParams`]: Everything needed for one resize + crop + BMP encode.
//! - [`StripParams`]: Everything needed for an in-place metadata strip.

use crate::types::TargetDimensions;
use image::imageops::FilterType;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Bounding box used by the thumbnail step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum BoundsPolicy {
    /// Shrink into exactly the target size. Non-matching aspect ratios are
    /// letterboxed by the crop padding.
    #[default]
    Fit,
    /// Shrink into the target plus a third on each axis, then crop away the
    /// excess. Trades some edge content for less padding.
    Margin,
}

/// Resampling kernel for the thumbnail step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ResampleFilter {
    Nearest,
    Triangle,
    CatmullRom,
    Gaussian,
    #[default]
    Lanczos3,
}

impl From<ResampleFilter> for FilterType {
    fn from(filter: ResampleFilter) -> Self {
        match filter {
            ResampleFilter::Nearest => FilterType::Nearest,
            ResampleFilter::Triangle => FilterType::Triangle,
            ResampleFilter::CatmullRom => FilterType::CatmullRom,
            ResampleFilter::Gaussian => FilterType::Gaussian,
            ResampleFilter::Lanczos3 => FilterType::Lanczos3,
        }
    }
}

/// Parameters for a normalize operation (thumbnail + center crop + BMP).
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizeParams {
    pub source: PathBuf,
    pub output: PathBuf,
    pub target: TargetDimensions,
    /// Thumbnail bounding box, already resolved from the [`BoundsPolicy`].
    pub bounds: (u32, u32),
    pub filter: ResampleFilter,
    /// RGB colour for crop areas outside the thumbnail.
    pub fill: [u8; 3],
}

/// Parameters for rewriting a file without its auxiliary metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct StripParams {
    /// File to strip; it is replaced in place.
    pub path: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_policy_default_is_fit() {
        assert_eq!(BoundsPolicy::default(), BoundsPolicy::Fit);
    }

    #[test]
    fn filter_default_is_lanczos3() {
        assert_eq!(FilterType::from(ResampleFilter::default()), FilterType::Lanczos3);
    }
}
