//! Rectangles exchanged with the compositor.
//!
//! Destination rectangles are in screen pixels. Source rectangles are in
//! 16.16 fixed point, which is what the compositor's element API expects on
//! the wire. Both travel as signed 32-bit fields, so a source dimension must
//! stay below `2^15` pixels.

use crate::error::SurfaceError;

/// Number of fractional bits in a compositor source coordinate.
pub const FIXED_POINT_SHIFT: u32 = 16;

/// Largest pixel dimension whose fixed-point form still fits an `i32`.
pub const MAX_LAYER_DIMENSION: u32 = (i32::MAX as u32) >> FIXED_POINT_SHIFT;

/// Converts a pixel count into 16.16 fixed point.
///
/// Returns `None` if the result does not fit the compositor's signed field.
pub fn to_fixed_16(pixels: u32) -> Option<u32> {
    if pixels > MAX_LAYER_DIMENSION {
        return None;
    }
    Some(pixels << FIXED_POINT_SHIFT)
}

/// Screen-space rectangle in whole pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }
}

/// Source rectangle with every field in 16.16 fixed point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct FixedRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl FixedRect {
    /// Source rectangle covering `width` x `height` pixels from the origin.
    pub fn from_pixels(width: u32, height: u32) -> Option<Self> {
        Some(Self {
            x: 0,
            y: 0,
            width: to_fixed_16(width)?,
            height: to_fixed_16(height)?,
        })
    }

    /// Width rounded down to whole pixels.
    pub fn pixel_width(&self) -> u32 {
        self.width >> FIXED_POINT_SHIFT
    }

    /// Height rounded down to whole pixels.
    pub fn pixel_height(&self) -> u32 {
        self.height >> FIXED_POINT_SHIFT
    }
}

/// Destination and source rectangles of one compositor element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LayerGeometry {
    pub destination: Rect,
    pub source: FixedRect,
}

impl LayerGeometry {
    /// Geometry of a layer covering the whole screen at `width` x `height`.
    pub fn full_screen(width: u32, height: u32) -> Result<Self, SurfaceError> {
        let source =
            FixedRect::from_pixels(width, height).ok_or(SurfaceError::Geometry { width, height })?;
        Ok(Self {
            destination: Rect::new(0, 0, width, height),
            source,
        })
    }

    pub fn width(&self) -> u32 {
        self.destination.width
    }

    pub fn height(&self) -> u32 {
        self.destination.height
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_hd_source_width_is_shifted_by_sixteen() {
        let geometry = LayerGeometry::full_screen(1920, 1080).unwrap();
        assert_eq!(geometry.destination, Rect::new(0, 0, 1920, 1080));
        assert_eq!(geometry.source.width, 125_829_120);
        assert_eq!(geometry.source.height, 1080 << 16);
        assert_eq!(geometry.source.x, 0);
        assert_eq!(geometry.source.y, 0);
    }

    #[test]
    fn fixed_point_round_trips_to_pixels() {
        let source = FixedRect::from_pixels(1280, 720).unwrap();
        assert_eq!(source.pixel_width(), 1280);
        assert_eq!(source.pixel_height(), 720);
    }

    #[test]
    fn largest_dimension_still_fits_signed_field() {
        let fixed = to_fixed_16(MAX_LAYER_DIMENSION).unwrap();
        assert!(i32::try_from(fixed).is_ok());
        assert_eq!(to_fixed_16(MAX_LAYER_DIMENSION + 1), None);
    }

    #[test]
    fn oversized_layer_is_rejected() {
        let err = LayerGeometry::full_screen(40_000, 1080).unwrap_err();
        assert!(matches!(
            err,
            SurfaceError::Geometry {
                width: 40_000,
                height: 1080
            }
        ));
    }

    #[test]
    fn zero_sized_layer_is_representable() {
        let geometry = LayerGeometry::full_screen(0, 0).unwrap();
        assert_eq!(geometry.source, FixedRect::default());
    }
}
