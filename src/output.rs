//! CLI output formatting.
//!
//! # Output Format
//!
//! ## Normalize
//!
//! ```text
//! photo.jpg → photo.bmp
//!     Source: 4000x3000 RGB8
//!     Thumbnail: 900x675
//!     Crop: 900x900 at (0, -112), padded
//! ```
//!
//! With `--strip-metadata` a strip block comes first:
//!
//! ```text
//! Stripped photo.jpg (segments, 48213 → 1920 bytes)
//!     Removed: APP1 Exif, APP2 ICC
//! ```
//!
//! ## Inspect
//!
//! ```text
//! goat.bmp: Bmp 900x900 RGB8
//! === BMP Header ===
//! ID: BM
//! File Size: 2430054
//! ...
//! === DIB Header ===
//! Header Size: 40
//! ...
//! ```
//!
//! # Architecture
//!
//! Each report has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format functions
//! are pure: no I/O, no side effects.

use crate::imaging::bmp::BmpHeader;
use crate::imaging::{ImageInfo, NormalizeOutcome, NormalizeReport, StripMethod, StripOutcome};
use crate::interactive::SessionSummary;
use crate::stego::Retouch;
use std::error::Error;
use std::path::Path;

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Final path component, falling back to the whole path.
fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|f| f.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

// ============================================================================
// Normalize
// ============================================================================

/// Format a metadata strip result.
///
/// ```text
/// Stripped photo.jpg (segments, 48213 → 1920 bytes)
///     Removed: APP1 Exif, COM
/// ```
pub fn format_strip_outcome(strip: &StripOutcome) -> Vec<String> {
    let method = match strip.method {
        StripMethod::JpegSegments => "segments".to_string(),
        StripMethod::Reencoded(format) => format!("re-encoded {format:?}"),
    };
    let mut lines = vec![format!(
        "Stripped {} ({}, {} → {} bytes)",
        display_name(&strip.path),
        method,
        strip.bytes_before,
        strip.bytes_after
    )];
    if !strip.removed.is_empty() {
        lines.push(format!("{}Removed: {}", indent(1), strip.removed.join(", ")));
    }
    lines
}

/// Format the geometry of a finished normalize.
pub fn format_normalize_outcome(outcome: &NormalizeOutcome) -> Vec<String> {
    let crop = outcome.crop;
    let padded = if outcome.padded { ", padded" } else { "" };
    vec![
        format!(
            "{} → {}",
            display_name(&outcome.source),
            display_name(&outcome.output)
        ),
        format!(
            "{}Source: {} {}",
            indent(1),
            outcome.source_dims,
            outcome.source_mode
        ),
        format!("{}Thumbnail: {}", indent(1), outcome.thumbnail),
        format!(
            "{}Crop: {}x{} at ({}, {}){}",
            indent(1),
            crop.width,
            crop.height,
            crop.left,
            crop.top,
            padded
        ),
    ]
}

/// Format a full normalize report: strip block (if any) then geometry.
pub fn format_normalize_report(report: &NormalizeReport) -> Vec<String> {
    let mut lines = report
        .strip
        .as_ref()
        .map(format_strip_outcome)
        .unwrap_or_default();
    lines.extend(format_normalize_outcome(&report.outcome));
    lines
}

/// Print a normalize report to stdout.
pub fn print_normalize_report(report: &NormalizeReport) {
    for line in format_normalize_report(report) {
        println!("{}", line);
    }
}

// ============================================================================
// Inspect
// ============================================================================

/// One-line summary of an identified image.
///
/// ```text
/// photo.jpg: Jpeg 4000x3000 RGB8
/// ```
pub fn format_image_info(path: &Path, info: &ImageInfo) -> Vec<String> {
    vec![format!(
        "{}: {:?} {} {}",
        display_name(path),
        info.format,
        info.dims,
        info.mode
    )]
}

/// Format a BMP header as a labelled field dump.
pub fn format_bmp_header(header: &BmpHeader) -> Vec<String> {
    let file = &header.file;
    let dib = &header.dib;
    vec![
        "=== BMP Header ===".to_string(),
        format!("ID: {}", String::from_utf8_lossy(&file.id)),
        format!("File Size: {}", file.file_size),
        format!("Reserved 1: {}", file.reserved1),
        format!("Reserved 2: {}", file.reserved2),
        format!("Pixel Data Offset: {}", file.pixel_offset),
        "=== DIB Header ===".to_string(),
        format!("Header Size: {}", dib.header_size),
        format!("Width: {}", dib.width),
        format!("Height: {}", dib.height),
        format!("Planes: {}", dib.planes),
        format!("Bits Per Pixel: {}", dib.bits_per_pixel),
        format!("Compression: {}", dib.compression),
        format!("Image Size: {}", dib.image_size),
        format!("Horizontal Resolution: {}", dib.h_resolution),
        format!("Vertical Resolution: {}", dib.v_resolution),
        format!("Palette Colors: {}", dib.palette_colors),
        format!("Important Colors: {}", dib.important_colors),
    ]
}

/// Print a BMP header dump to stdout.
pub fn print_bmp_header(header: &BmpHeader) {
    for line in format_bmp_header(header) {
        println!("{}", line);
    }
}

// ============================================================================
// Steganography
// ============================================================================

pub fn format_reveal_result(source: &Path, output: &Path) -> Vec<String> {
    vec![format!(
        "Revealed {} → {}",
        display_name(source),
        display_name(output)
    )]
}

pub fn format_hide_result(carrier: &Path, hidden: &Path, output: &Path) -> Vec<String> {
    vec![format!(
        "Hid {} in {} → {}",
        display_name(hidden),
        display_name(carrier),
        display_name(output)
    )]
}

pub fn format_retouch_result(op: Retouch, source: &Path, output: &Path) -> Vec<String> {
    vec![format!(
        "{} {} → {}",
        op,
        display_name(source),
        display_name(output)
    )]
}

pub fn print_lines(lines: &[String]) {
    for line in lines {
        println!("{}", line);
    }
}

// ============================================================================
// Errors and sessions
// ============================================================================

/// Format an error with its chain of causes, one per indented line.
///
/// ```text
/// Error: Filesystem error on /in/a.jpg
///     Caused by: No such file or directory (os error 2)
/// ```
pub fn format_error(err: &dyn Error) -> Vec<String> {
    let mut lines = vec![format!("Error: {}", err)];
    let mut cause = err.source();
    while let Some(e) = cause {
        lines.push(format!("{}Caused by: {}", indent(1), e));
        cause = e.source();
    }
    lines
}

/// Print an error chain to stderr.
pub fn print_error(err: &dyn Error) {
    for line in format_error(err) {
        eprintln!("{}", line);
    }
}

/// Format the closing line of an interactive session.
pub fn format_session_summary(summary: &SessionSummary) -> Vec<String> {
    let noun = |n: usize| if n == 1 { "image" } else { "images" };
    vec![format!(
        "Normalized {} {}, {} failed",
        summary.succeeded,
        noun(summary.succeeded),
        summary.failed
    )]
}
