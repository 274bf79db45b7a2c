//! Overlay Module
//!
//! Bitmaps drawn on top of the fetched layers: grid lines and quadrant
//! badges (generated once and cached for the process) and the per-request
//! highlight border.

pub mod badge;
pub mod grid;
pub mod highlight;

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};

use image::RgbaImage;
use thiserror::Error;
use tracing::{debug, warn};

use crate::render::CompositeInput;
use crate::square::QuadrantId;
use badge::{render_badge, ACCENT_COLOR, BADGE_MARGIN, BADGE_SIZE, NEUTRAL_COLOR};
use grid::GRID_LINE_WIDTH;

// == Overlay Error ==
/// Why a static overlay could not be generated.
#[derive(Error, Debug)]
pub enum OverlayError {
    #[error("empty geometry {width}x{height}")]
    EmptyGeometry { width: u32, height: u32 },

    #[error("pixel buffer does not match {width}x{height}")]
    BufferMismatch { width: u32, height: u32 },

    #[error("no glyph for digit {0}")]
    UnknownGlyph(u8),
}

// == Overlay Key ==
/// Closed set of process-lifetime overlays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OverlayKey {
    GridVertical,
    GridHorizontal,
    Badge { quadrant: QuadrantId, accent: bool },
}

impl OverlayKey {
    /// Every key, grid lines first.
    pub fn all() -> Vec<OverlayKey> {
        let mut keys = vec![OverlayKey::GridVertical, OverlayKey::GridHorizontal];
        for quadrant in QuadrantId::ALL {
            for accent in [false, true] {
                keys.push(OverlayKey::Badge { quadrant, accent });
            }
        }
        keys
    }

    fn label(&self) -> String {
        match self {
            OverlayKey::GridVertical => "grid-vertical".to_string(),
            OverlayKey::GridHorizontal => "grid-horizontal".to_string(),
            OverlayKey::Badge { quadrant, accent: false } => format!("badge-{quadrant}"),
            OverlayKey::Badge { quadrant, accent: true } => format!("badge-{quadrant}-current"),
        }
    }
}

// == Overlay Cache ==
/// Lazily generated, never-evicted overlays for one canvas size.
///
/// Each key is generated at most once; a failed generation is remembered as
/// absent and that overlay is skipped from then on.
#[derive(Debug)]
pub struct OverlayCache {
    width: u32,
    height: u32,
    slots: HashMap<OverlayKey, OnceLock<Option<Arc<RgbaImage>>>>,
    generations: AtomicUsize,
}

impl OverlayCache {
    /// Creates an empty cache for a `width` x `height` canvas.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            slots: OverlayKey::all().into_iter().map(|k| (k, OnceLock::new())).collect(),
            generations: AtomicUsize::new(0),
        }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// How many generator runs have happened so far.
    pub fn generations(&self) -> usize {
        self.generations.load(Ordering::Relaxed)
    }

    /// Returns the overlay for `key`, generating it on first use.
    pub fn get(&self, key: OverlayKey) -> Option<Arc<RgbaImage>> {
        let slot = self.slots.get(&key)?;
        slot.get_or_init(|| {
            self.generations.fetch_add(1, Ordering::Relaxed);
            match self.generate(key) {
                Ok(image) => {
                    debug!(overlay = %key.label(), "Generated static overlay");
                    Some(Arc::new(image))
                }
                Err(e) => {
                    warn!(overlay = %key.label(), error = %e, "Static overlay generation failed, skipping");
                    None
                }
            }
        })
        .clone()
    }

    fn generate(&self, key: OverlayKey) -> Result<RgbaImage, OverlayError> {
        match key {
            OverlayKey::GridVertical => grid::vertical_line(self.height),
            OverlayKey::GridHorizontal => grid::horizontal_line(self.width),
            OverlayKey::Badge { quadrant, accent } => {
                let color = if accent { ACCENT_COLOR } else { NEUTRAL_COLOR };
                render_badge(quadrant.number(), self.badge_size(), color)
            }
        }
    }

    /// Badges shrink on canvases too small for the full size.
    fn badge_size(&self) -> u32 {
        BADGE_SIZE.min(self.width / 4).min(self.height / 4)
    }

    // == Placements ==
    /// Grid lines then the four badges, positioned on the canvas.
    ///
    /// The badge of `current` uses the accent colour. Overlays that failed to
    /// generate are left out.
    pub fn placements(&self, current: Option<QuadrantId>) -> Vec<CompositeInput> {
        let mut inputs = Vec::with_capacity(6);
        let half_w = (self.width / 2) as i64;
        let half_h = (self.height / 2) as i64;
        let offset = (GRID_LINE_WIDTH / 2) as i64;

        if let Some(line) = self.get(OverlayKey::GridVertical) {
            inputs.push(CompositeInput::new("grid-vertical", line, half_w - offset, 0));
        }
        if let Some(line) = self.get(OverlayKey::GridHorizontal) {
            inputs.push(CompositeInput::new("grid-horizontal", line, 0, half_h - offset));
        }

        for quadrant in QuadrantId::ALL {
            let key = OverlayKey::Badge {
                quadrant,
                accent: current == Some(quadrant),
            };
            if let Some(badge) = self.get(key) {
                let rect = quadrant.rect(self.width, self.height);
                let margin = BADGE_MARGIN.min(rect.width / 8).min(rect.height / 8);
                inputs.push(CompositeInput::new(
                    key.label(),
                    badge,
                    (rect.x + margin) as i64,
                    (rect.y + margin) as i64,
                ));
            }
        }

        inputs
    }
}
