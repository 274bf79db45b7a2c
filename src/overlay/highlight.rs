//! Border drawn around the viewer's current quadrant.
//!
//! Built per request since the highlighted quadrant varies.

use std::sync::Arc;

use image::Rgba;
use tracing::warn;

use super::grid::solid_rect;
use crate::render::CompositeInput;
use crate::square::QuadrantRect;

/// Border thickness in pixels.
pub const HIGHLIGHT_WIDTH: u32 = 8;

/// Gold at high opacity.
pub const HIGHLIGHT_COLOR: Rgba<u8> = Rgba([255, 213, 74, 230]);

/// Four flat strips (top, bottom, left, right) outlining `rect`.
///
/// The side strips sit between the top and bottom strips so corners are not
/// painted twice. `width` is clamped to half the rect's shorter side.
pub fn border_strips(rect: QuadrantRect, width: u32, color: Rgba<u8>) -> Vec<CompositeInput> {
    let w = width.min(rect.width / 2).min(rect.height / 2);
    if w == 0 {
        return Vec::new();
    }

    let inner_height = rect.height - 2 * w;
    let strips = [
        ("highlight-top", rect.x, rect.y, rect.width, w),
        ("highlight-bottom", rect.x, rect.y + rect.height - w, rect.width, w),
        ("highlight-left", rect.x, rect.y + w, w, inner_height),
        ("highlight-right", rect.x + rect.width - w, rect.y + w, w, inner_height),
    ];

    strips
        .into_iter()
        .filter(|&(_, _, _, sw, sh)| sw > 0 && sh > 0)
        .filter_map(|(key, x, y, sw, sh)| match solid_rect(sw, sh, color) {
            Ok(image) => Some(CompositeInput::new(key, Arc::new(image), x as i64, y as i64)),
            Err(e) => {
                warn!(strip = key, error = %e, "Skipping highlight strip");
                None
            }
        })
        .collect()
}
