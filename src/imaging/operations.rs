//! High-level image operations.
//!
//! These functions combine calculations with backend execution.
//! They take configuration, compute parameters, and call the backend.

use super::backend::{BackendError, ImageBackend, NormalizeOutcome, StripOutcome};
use super::calculations::{bmp_output_path, bounding_box};
use super::params::{BoundsPolicy, NormalizeParams, ResampleFilter, StripParams};
use crate::types::TargetDimensions;
use std::path::Path;
use tracing::info;

/// Result type for image operations.
pub type Result<T> = std::result::Result<T, BackendError>;

/// Resolved settings for normalizing one image.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizeConfig {
    pub target: TargetDimensions,
    pub bounds: BoundsPolicy,
    pub filter: ResampleFilter,
    pub fill: [u8; 3],
    /// Rewrite the source without metadata before normalizing it.
    pub strip_metadata: bool,
}

impl Default for NormalizeConfig {
    fn default() -> Self {
        Self {
            target: TargetDimensions::default(),
            bounds: BoundsPolicy::default(),
            filter: ResampleFilter::default(),
            fill: [0, 0, 0],
            strip_metadata: false,
        }
    }
}

/// Everything one normalize call did.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizeReport {
    /// Present only when metadata stripping was enabled.
    pub strip: Option<StripOutcome>,
    pub outcome: NormalizeOutcome,
}

/// Plan a normalize operation without executing it.
pub fn plan_normalize(source: &Path, config: &NormalizeConfig) -> NormalizeParams {
    NormalizeParams {
        source: source.to_path_buf(),
        output: bmp_output_path(source),
        target: config.target,
        bounds: bounding_box(config.target, config.bounds),
        filter: config.filter,
        fill: config.fill,
    }
}

/// Normalize `source` into a `target`-sized 24-bit BMP beside it.
///
/// When `config.strip_metadata` is set the source is first rewritten in place
/// without auxiliary metadata; a failure there aborts before anything else is
/// written.
pub fn normalize(
    backend: &impl ImageBackend,
    source: &Path,
    config: &NormalizeConfig,
) -> Result<NormalizeReport> {
    let strip = if config.strip_metadata {
        Some(backend.strip_metadata(&StripParams {
            path: source.to_path_buf(),
        })?)
    } else {
        None
    };

    let params = plan_normalize(source, config);
    info!(
        source = %params.source.display(),
        output = %params.output.display(),
        bounds = ?params.bounds,
        "Normalizing"
    );
    let outcome = backend.normalize(&params)?;

    Ok(NormalizeReport { strip, outcome })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::backend::tests::{MockBackend, RecordedOp};

    fn config(w: u32, h: u32) -> NormalizeConfig {
        NormalizeConfig {
            target: TargetDimensions::new(w, h).unwrap(),
            ..NormalizeConfig::default()
        }
    }

    #[test]
    fn plan_uses_bmp_sibling_path() {
        let params = plan_normalize(Path::new("/photos/goat.jpg"), &NormalizeConfig::default());
        assert_eq!(params.output, Path::new("/photos/goat.bmp"));
        assert_eq!(params.target.as_tuple(), (900, 900));
        assert_eq!(params.bounds, (900, 900));
    }

    #[test]
    fn plan_margin_bounds() {
        let config = NormalizeConfig {
            bounds: BoundsPolicy::Margin,
            ..config(600, 300)
        };
        let params = plan_normalize(Path::new("a.png"), &config);
        assert_eq!(params.bounds, (800, 400));
    }

    #[test]
    fn normalize_without_strip_calls_backend_once() {
        let backend = MockBackend::new();
        let report = normalize(&backend, Path::new("/in/photo.jpeg"), &config(640, 480)).unwrap();

        assert!(report.strip.is_none());
        assert_eq!(report.outcome.output, Path::new("/in/photo.bmp"));
        assert_eq!(
            backend.get_operations(),
            vec![RecordedOp::Normalize {
                source: "/in/photo.jpeg".to_string(),
                output: "/in/photo.bmp".to_string(),
                target: (640, 480),
                bounds: (640, 480),
                fill: [0, 0, 0],
            }]
        );
    }

    #[test]
    fn normalize_strips_first_when_enabled() {
        let backend = MockBackend::new();
        let config = NormalizeConfig {
            strip_metadata: true,
            ..NormalizeConfig::default()
        };
        let report = normalize(&backend, Path::new("goat.jpg"), &config).unwrap();

        assert!(report.strip.is_some());
        let ops = backend.get_operations();
        assert_eq!(ops.len(), 2);
        assert_eq!(ops[0], RecordedOp::Strip("goat.jpg".to_string()));
        assert!(matches!(&ops[1], RecordedOp::Normalize { .. }));
    }

    #[test]
    fn failed_strip_skips_normalize() {
        let backend = MockBackend::failing_strip();
        let config = NormalizeConfig {
            strip_metadata: true,
            ..NormalizeConfig::default()
        };
        let err = normalize(&backend, Path::new("goat.jpg"), &config).unwrap_err();

        assert!(matches!(err, BackendError::Filesystem { .. }));
        assert_eq!(backend.get_operations().len(), 1);
    }

    #[test]
    fn normalize_error_propagates() {
        let backend = MockBackend::failing_normalize();
        let err = normalize(&backend, Path::new("x.jpg"), &NormalizeConfig::default()).unwrap_err();
        assert!(matches!(err, BackendError::Decode { .. }));
    }
}
