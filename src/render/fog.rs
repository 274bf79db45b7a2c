//! Fog of war: which quadrants are hidden and the fog patches that hide them.

use std::sync::Arc;

use image::imageops;
use image::RgbaImage;

use super::CompositeInput;
use crate::square::{QuadrantId, QuadrantStatuses};

/// Quadrants to obscure, in reading order.
///
/// A quadrant is fogged when it is unexplored or inaccessible, unless it is
/// the `revealed` quadrant the viewer stands in.
pub fn fogged_quadrants(statuses: &QuadrantStatuses, revealed: Option<QuadrantId>) -> Vec<QuadrantId> {
    QuadrantId::ALL
        .into_iter()
        .filter(|&q| statuses.get(q).is_hidden() && Some(q) != revealed)
        .collect()
}

/// Cuts each fogged quadrant's rectangle out of the full-square fog image.
///
/// `fog` must already match the canvas size; each patch is staged at the
/// offset it was cut from.
pub fn extract_fog(fog: &RgbaImage, quadrants: &[QuadrantId]) -> Vec<CompositeInput> {
    let (width, height) = fog.dimensions();
    quadrants
        .iter()
        .map(|&q| {
            let rect = q.rect(width, height);
            let patch = imageops::crop_imm(fog, rect.x, rect.y, rect.width, rect.height).to_image();
            CompositeInput::new(format!("fog-{q}"), Arc::new(patch), rect.x as i64, rect.y as i64)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::square::QuadrantStatus;
    use image::Rgba;

    #[test]
    fn test_default_statuses_fog_everything() {
        let fogged = fogged_quadrants(&QuadrantStatuses::default(), None);
        assert_eq!(fogged, QuadrantId::ALL.to_vec());
    }

    #[test]
    fn test_revealed_quadrant_never_fogged() {
        let fogged = fogged_quadrants(&QuadrantStatuses::default(), Some(QuadrantId::Q3));
        assert_eq!(fogged, vec![QuadrantId::Q1, QuadrantId::Q2, QuadrantId::Q4]);
    }

    #[test]
    fn test_explored_and_secured_visible() {
        let mut statuses = QuadrantStatuses::default();
        statuses.set(QuadrantId::Q1, QuadrantStatus::Explored);
        statuses.set(QuadrantId::Q2, QuadrantStatus::Secured);
        statuses.set(QuadrantId::Q3, QuadrantStatus::Inaccessible);

        let fogged = fogged_quadrants(&statuses, None);
        assert_eq!(fogged, vec![QuadrantId::Q3, QuadrantId::Q4]);
    }

    #[test]
    fn test_inaccessible_revealed_quadrant_shown() {
        let statuses = QuadrantStatuses::uniform(QuadrantStatus::Inaccessible);
        let fogged = fogged_quadrants(&statuses, Some(QuadrantId::Q1));
        assert!(!fogged.contains(&QuadrantId::Q1));
        assert_eq!(fogged.len(), 3);
    }

    #[test]
    fn test_extract_fog_patches() {
        // Each quadrant of the fog image gets a distinct colour
        let fog = RgbaImage::from_fn(10, 8, |x, y| {
            let q = (x >= 5) as u8 + 2 * (y >= 4) as u8;
            Rgba([q * 60, 0, 0, 200])
        });

        let patches = extract_fog(&fog, &[QuadrantId::Q2, QuadrantId::Q3]);
        assert_eq!(patches.len(), 2);

        let q2 = &patches[0];
        assert_eq!(q2.key, "fog-Q2");
        assert_eq!((q2.x, q2.y), (5, 0));
        assert_eq!(q2.image.dimensions(), (5, 4));
        assert!(q2.image.pixels().all(|p| p.0[0] == 60));

        let q3 = &patches[1];
        assert_eq!((q3.x, q3.y), (0, 4));
        assert!(q3.image.pixels().all(|p| p.0[0] == 120));
    }
}
