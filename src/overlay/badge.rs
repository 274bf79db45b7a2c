//! Quadrant number badges.
//!
//! Each badge is a translucent disc carrying a "Q" and the quadrant digit.
//! Glyphs are stroke paths in a unit box, rasterized with anti-aliased
//! distance-to-segment coverage, so they scale with [`BADGE_SIZE`].

use image::{Rgba, RgbaImage};

use super::OverlayError;

/// Badge edge length in pixels.
pub const BADGE_SIZE: u32 = 96;

/// Offset of a badge from its quadrant's top-left corner.
pub const BADGE_MARGIN: u32 = 16;

/// Glyph colour for quadrants the viewer is not in.
pub const NEUTRAL_COLOR: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// Glyph colour for the viewer's current quadrant.
pub const ACCENT_COLOR: Rgba<u8> = Rgba([255, 213, 74, 255]);

const DISC_COLOR: Rgba<u8> = Rgba([12, 16, 24, 160]);

/// Stroke width as a fraction of the badge size.
const STROKE: f32 = 0.075;

type Point = (f32, f32);

/// Glyph box (x0, y0, x1, y1) of the "Q" inside the badge, in unit coordinates.
const Q_BOX: (f32, f32, f32, f32) = (0.14, 0.28, 0.50, 0.72);

/// Glyph box of the digit.
const DIGIT_BOX: (f32, f32, f32, f32) = (0.56, 0.28, 0.84, 0.72);

const DIGIT_ONE: &[&[Point]] = &[
    &[(0.25, 0.22), (0.58, 0.04), (0.58, 0.96)],
    &[(0.25, 0.96), (0.90, 0.96)],
];

const DIGIT_TWO: &[&[Point]] = &[&[
    (0.12, 0.24),
    (0.30, 0.06),
    (0.68, 0.06),
    (0.88, 0.24),
    (0.88, 0.42),
    (0.12, 0.96),
    (0.90, 0.96),
]];

const DIGIT_THREE: &[&[Point]] = &[&[
    (0.12, 0.06),
    (0.88, 0.06),
    (0.42, 0.44),
    (0.72, 0.50),
    (0.90, 0.70),
    (0.74, 0.92),
    (0.44, 0.98),
    (0.12, 0.86),
]];

const DIGIT_FOUR: &[&[Point]] = &[&[(0.70, 0.96), (0.70, 0.04), (0.08, 0.66), (0.94, 0.66)]];

/// Stroke paths of `digit` in its unit box.
fn digit_paths(digit: u8) -> Option<&'static [&'static [Point]]> {
    match digit {
        1 => Some(DIGIT_ONE),
        2 => Some(DIGIT_TWO),
        3 => Some(DIGIT_THREE),
        4 => Some(DIGIT_FOUR),
        _ => None,
    }
}

/// The "Q": a closed ellipse plus a diagonal tail.
fn q_paths() -> Vec<Vec<Point>> {
    const SEGMENTS: usize = 32;
    let ring: Vec<Point> = (0..=SEGMENTS)
        .map(|i| {
            let t = i as f32 / SEGMENTS as f32 * std::f32::consts::TAU;
            (0.5 + 0.44 * t.cos(), 0.5 + 0.46 * t.sin())
        })
        .collect();
    let tail = vec![(0.58, 0.66), (0.98, 1.0)];
    vec![ring, tail]
}

/// Maps unit-box paths into badge pixel space.
fn place(paths: &[Vec<Point>], glyph_box: (f32, f32, f32, f32), size: f32) -> Vec<Vec<Point>> {
    let (x0, y0, x1, y1) = glyph_box;
    paths
        .iter()
        .map(|path| {
            path.iter()
                .map(|&(u, v)| ((x0 + u * (x1 - x0)) * size, (y0 + v * (y1 - y0)) * size))
                .collect()
        })
        .collect()
}

fn distance_to_segment(p: Point, a: Point, b: Point) -> f32 {
    let (abx, aby) = (b.0 - a.0, b.1 - a.1);
    let (apx, apy) = (p.0 - a.0, p.1 - a.1);
    let len_sq = abx * abx + aby * aby;
    let t = if len_sq > 0.0 {
        ((apx * abx + apy * aby) / len_sq).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let (dx, dy) = (apx - t * abx, apy - t * aby);
    (dx * dx + dy * dy).sqrt()
}

/// Source-over blend of `color` at `coverage` onto `dst`.
fn blend(dst: Rgba<u8>, color: Rgba<u8>, coverage: f32) -> Rgba<u8> {
    let src_a = color.0[3] as f32 / 255.0 * coverage;
    let dst_a = dst.0[3] as f32 / 255.0;
    let out_a = src_a + dst_a * (1.0 - src_a);
    if out_a <= 0.0 {
        return Rgba([0, 0, 0, 0]);
    }

    let channel = |i: usize| {
        let s = color.0[i] as f32 * src_a;
        let d = dst.0[i] as f32 * dst_a * (1.0 - src_a);
        ((s + d) / out_a).round().clamp(0.0, 255.0) as u8
    };
    Rgba([
        channel(0),
        channel(1),
        channel(2),
        (out_a * 255.0).round().clamp(0.0, 255.0) as u8,
    ])
}

// == Render ==
/// Renders the badge for quadrant `digit` at `size` pixels in `color`.
pub fn render_badge(digit: u8, size: u32, color: Rgba<u8>) -> Result<RgbaImage, OverlayError> {
    if size == 0 {
        return Err(OverlayError::EmptyGeometry {
            width: size,
            height: size,
        });
    }
    let digit_strokes = digit_paths(digit).ok_or(OverlayError::UnknownGlyph(digit))?;

    let s = size as f32;
    let digit_owned: Vec<Vec<Point>> = digit_strokes.iter().map(|p| p.to_vec()).collect();
    let mut strokes = place(&q_paths(), Q_BOX, s);
    strokes.extend(place(&digit_owned, DIGIT_BOX, s));

    let segments: Vec<(Point, Point)> = strokes
        .iter()
        .flat_map(|path| path.windows(2).map(|w| (w[0], w[1])))
        .collect();

    let half_stroke = STROKE * s / 2.0;
    let center = s / 2.0;
    let radius = center - 1.0;

    Ok(RgbaImage::from_fn(size, size, |x, y| {
        let p = (x as f32 + 0.5, y as f32 + 0.5);

        let from_center = ((p.0 - center).powi(2) + (p.1 - center).powi(2)).sqrt();
        let disc_cov = (radius + 0.5 - from_center).clamp(0.0, 1.0);
        let mut px = blend(Rgba([0, 0, 0, 0]), DISC_COLOR, disc_cov);

        let nearest = segments
            .iter()
            .map(|&(a, b)| distance_to_segment(p, a, b))
            .fold(f32::INFINITY, f32::min);
        let glyph_cov = (half_stroke + 0.5 - nearest).clamp(0.0, 1.0);
        if glyph_cov > 0.0 {
            px = blend(px, color, glyph_cov);
        }
        px
    }))
}
