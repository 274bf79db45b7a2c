//! Flattening of positioned layers onto one raster, and PNG encoding.

use std::io::Cursor;
use std::sync::Arc;

use image::imageops::{self, FilterType};
use image::{ImageFormat, RgbaImage};

use crate::error::{RenderError, Result};

// == Composite Input ==
/// One image positioned on the canvas.
#[derive(Debug, Clone)]
pub struct CompositeInput {
    /// Layer or overlay name, for logging and inspection
    pub key: String,
    pub image: Arc<RgbaImage>,
    /// Offset of the image's top-left corner on the canvas
    pub x: i64,
    pub y: i64,
}

impl CompositeInput {
    pub fn new(key: impl Into<String>, image: Arc<RgbaImage>, x: i64, y: i64) -> Self {
        Self {
            key: key.into(),
            image,
            x,
            y,
        }
    }

    /// A full-canvas layer anchored at the origin.
    pub fn full(key: impl Into<String>, image: RgbaImage) -> Self {
        Self::new(key, Arc::new(image), 0, 0)
    }
}

/// Decodes encoded layer bytes into RGBA.
pub fn decode(bytes: &[u8]) -> std::result::Result<RgbaImage, image::ImageError> {
    Ok(image::load_from_memory(bytes)?.to_rgba8())
}

/// Resizes `image` to `width` x `height` unless it already has that size.
pub fn fit_to_canvas(image: RgbaImage, width: u32, height: u32) -> RgbaImage {
    if image.dimensions() == (width, height) {
        image
    } else {
        imageops::resize(&image, width, height, FilterType::Triangle)
    }
}

/// Alpha-blends every input onto `canvas`, in order (first = lowest).
///
/// Parts of an input that fall outside the canvas are clipped.
pub fn flatten(canvas: &mut RgbaImage, inputs: &[CompositeInput]) {
    for input in inputs {
        imageops::overlay(canvas, input.image.as_ref(), input.x, input.y);
    }
}

/// Encodes the finished raster as PNG.
pub fn encode_png(canvas: &RgbaImage) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    canvas
        .write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)
        .map_err(|e| RenderError::Encoding(e.to_string()))?;
    Ok(buffer)
}
