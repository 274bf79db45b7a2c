//! Grid separator lines drawn between the four quadrants.

use image::{Rgba, RgbaImage};

use super::OverlayError;

/// Thickness of each separator line in pixels.
pub const GRID_LINE_WIDTH: u32 = 4;

/// Semi-transparent white.
pub const GRID_LINE_COLOR: Rgba<u8> = Rgba([255, 255, 255, 110]);

/// A flat-colour `width` x `height` rectangle built from a raw pixel buffer.
pub fn solid_rect(width: u32, height: u32, color: Rgba<u8>) -> Result<RgbaImage, OverlayError> {
    if width == 0 || height == 0 {
        return Err(OverlayError::EmptyGeometry { width, height });
    }

    let raw: Vec<u8> = color
        .0
        .iter()
        .copied()
        .cycle()
        .take(width as usize * height as usize * 4)
        .collect();

    RgbaImage::from_raw(width, height, raw).ok_or(OverlayError::BufferMismatch { width, height })
}

/// Vertical line spanning the full canvas height.
pub fn vertical_line(canvas_height: u32) -> Result<RgbaImage, OverlayError> {
    solid_rect(GRID_LINE_WIDTH, canvas_height, GRID_LINE_COLOR)
}

/// Horizontal line spanning the full canvas width.
pub fn horizontal_line(canvas_width: u32) -> Result<RgbaImage, OverlayError> {
    solid_rect(canvas_width, GRID_LINE_WIDTH, GRID_LINE_COLOR)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertical_line_shape() {
        let line = vertical_line(300).unwrap();
        assert_eq!(line.dimensions(), (GRID_LINE_WIDTH, 300));
        assert!(line.pixels().all(|p| *p == GRID_LINE_COLOR));
    }

    #[test]
    fn test_horizontal_line_shape() {
        let line = horizontal_line(500).unwrap();
        assert_eq!(line.dimensions(), (500, GRID_LINE_WIDTH));
    }

    #[test]
    fn test_empty_rect_rejected() {
        assert!(matches!(
            solid_rect(0, 10, GRID_LINE_COLOR),
            Err(OverlayError::EmptyGeometry { .. })
        ));
    }
}
