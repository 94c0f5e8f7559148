//! Tool configuration.
//!
//! Handles loading and validating `bmpfit.toml`. Every key is optional; the
//! stock defaults reproduce the original 900x900 behaviour.
//!
//! ## Config File Location
//!
//! `bmpfit.toml` in the working directory is picked up automatically. Use
//! `--config <FILE>` to point somewhere else; an explicit file must exist.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! width = 900               # Output width in pixels
//! height = 900              # Output height in pixels
//! bounds = "fit"            # "fit" or "margin" (target + 1/3 per axis)
//! filter = "lanczos3"       # nearest | triangle | catmull-rom | gaussian | lanczos3
//! fill = [0, 0, 0]          # RGB padding where the crop leaves the image
//! strip_metadata = false    # Rewrite the source without EXIF/ICC/text first
//! ```
//!
//! Unknown keys are rejected to catch typos early. Command-line flags
//! override file values.

use crate::imaging::{BoundsPolicy, NormalizeConfig, ResampleFilter};
use crate::types::TargetDimensions;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// File picked up from the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "bmpfit.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Configuration loaded from `bmpfit.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BmpfitConfig {
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
    /// Bounding box used before cropping.
    pub bounds: BoundsPolicy,
    /// Resampling kernel for shrinking.
    pub filter: ResampleFilter,
    /// Padding colour for crop areas outside the image.
    pub fill: [u8; 3],
    /// Strip auxiliary metadata from the source before normalizing.
    pub strip_metadata: bool,
}

impl Default for BmpfitConfig {
    fn default() -> Self {
        let target = TargetDimensions::default();
        Self {
            width: target.width(),
            height: target.height(),
            bounds: BoundsPolicy::default(),
            filter: ResampleFilter::default(),
            fill: [0, 0, 0],
            strip_metadata: false,
        }
    }
}

impl BmpfitConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.target().map(|_| ())
    }

    /// Output dimensions, rejecting out-of-range edges.
    pub fn target(&self) -> Result<TargetDimensions, ConfigError> {
        TargetDimensions::new(self.width, self.height)
            .map_err(|e| ConfigError::Validation(e.to_string()))
    }

    /// Resolve into the settings the imaging layer consumes.
    pub fn normalize_config(&self) -> Result<NormalizeConfig, ConfigError> {
        Ok(NormalizeConfig {
            target: self.target()?,
            bounds: self.bounds,
            filter: self.filter,
            fill: self.fill,
            strip_metadata: self.strip_metadata,
        })
    }
}

/// Parse and validate a config from TOML text.
pub fn parse_config(content: &str) -> Result<BmpfitConfig, ConfigError> {
    let config: BmpfitConfig = toml::from_str(content)?;
    config.validate()?;
    Ok(config)
}

/// Load and validate the config file at `path`.
pub fn load_config(path: &Path) -> Result<BmpfitConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

/// Resolve the config for a run.
///
/// - `Some(path)` → that file, which must exist
/// - `None` → [`DEFAULT_CONFIG_FILE`] in `dir` if present, stock defaults otherwise
pub fn discover_config(explicit: Option<&Path>, dir: &Path) -> Result<BmpfitConfig, ConfigError> {
    if let Some(path) = explicit {
        return load_config(path);
    }
    let candidate = dir.join(DEFAULT_CONFIG_FILE);
    if candidate.is_file() {
        return load_config(&candidate);
    }
    Ok(BmpfitConfig::default())
}

/// Returns a fully-commented stock `bmpfit.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# bmpfit configuration
# =====================
# Every key is optional. Values shown are the defaults.

# Output size in pixels. Every normalized BMP is exactly width x height.
width = 900
height = 900

# Bounding box the image is shrunk into before the center crop:
#   "fit"    - exactly width x height; other aspect ratios get padded bands
#   "margin" - width + width/3 by height + height/3; less padding, more
#              of the edges cropped away
bounds = "fit"

# Resampling kernel used when shrinking:
#   nearest | triangle | catmull-rom | gaussian | lanczos3
filter = "lanczos3"

# RGB colour used where the crop window extends past the image.
fill = [0, 0, 0]

# Rewrite the source file without EXIF, ICC, XMP or text blocks before
# normalizing it. JPEGs are stripped losslessly; other formats are re-encoded.
# The original is only replaced once the stripped copy is fully written.
strip_metadata = false
"##
}
