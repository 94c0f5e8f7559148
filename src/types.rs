//! Value types shared by configuration, imaging, and the CLI.

use std::fmt;

/// Exact output size of a normalized image.
///
/// The only way to build one is through [`TargetDimensions::new`], which
/// keeps every edge in `1..=MAX_EDGE` and the RGB8 buffer addressable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetDimensions {
    width: u32,
    height: u32,
}

/// Largest edge a BMP header can describe (width and height are signed 32-bit).
pub const MAX_EDGE: u32 = i32::MAX as u32;

/// Returned when [`TargetDimensions::new`] is given a zero edge, an edge above
/// [`MAX_EDGE`], or a size whose RGB8 buffer would not fit in memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("target dimensions {width}x{height} are out of range (each edge 1..={MAX_EDGE})")]
pub struct InvalidDimensions {
    pub width: u32,
    pub height: u32,
}

impl TargetDimensions {
    pub fn new(width: u32, height: u32) -> Result<Self, InvalidDimensions> {
        let in_range = |edge: u32| (1..=MAX_EDGE).contains(&edge);
        let buffer_len = (width as usize)
            .checked_mul(height as usize)
            .and_then(|pixels| pixels.checked_mul(3));
        if !in_range(width) || !in_range(height) || buffer_len.is_none() {
            return Err(InvalidDimensions { width, height });
        }
        Ok(Self { width, height })
    }

    pub fn width(self) -> u32 {
        self.width
    }

    pub fn height(self) -> u32 {
        self.height
    }

    pub fn as_tuple(self) -> (u32, u32) {
        (self.width, self.height)
    }
}

impl Default for TargetDimensions {
    /// 900x900, the size the interactive tool has always produced.
    fn default() -> Self {
        Self {
            width: 900,
            height: 900,
        }
    }
}

impl fmt::Display for TargetDimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_zero_width() {
        assert_eq!(
            TargetDimensions::new(0, 900),
            Err(InvalidDimensions {
                width: 0,
                height: 900
            })
        );
    }

    #[test]
    fn rejects_zero_height() {
        assert!(TargetDimensions::new(900, 0).is_err());
    }

    #[test]
    fn rejects_edges_beyond_bmp_range() {
        assert!(TargetDimensions::new(u32::MAX, u32::MAX).is_err());
        assert!(TargetDimensions::new(MAX_EDGE + 1, 1).is_err());
        assert!(TargetDimensions::new(1, MAX_EDGE + 1).is_err());
        assert!(TargetDimensions::new(MAX_EDGE, 1).is_ok());
    }

    #[test]
    fn error_names_the_range() {
        let err = TargetDimensions::new(0, 5).unwrap_err();
        assert_eq!(
            err.to_string(),
            "target dimensions 0x5 are out of range (each edge 1..=2147483647)"
        );
    }

    #[test]
    fn accepts_positive_edges() {
        let target = TargetDimensions::new(900, 600).unwrap();
        assert_eq!(target.as_tuple(), (900, 600));
        assert_eq!(target.to_string(), "900x600");
    }
}
