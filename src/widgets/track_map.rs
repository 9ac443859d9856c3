//! Track position viewport (right side, under the inset).
//!
//! Normalized track coordinates (`x`, `y` in [0, 1]) map linearly into the
//! viewport inside a fixed margin:
//!
//! ```text
//! px = margin + x * (width  - 2 * margin)
//! py = margin + y * (height - 2 * margin)
//! ```
//!
//! Out-of-range coordinates are clamped to the edge of the inner area. No dot
//! is drawn while either coordinate is unknown.

use embedded_graphics::{
    pixelcolor::Rgb888,
    prelude::*,
    primitives::{PrimitiveStyle, Rectangle},
};

use crate::{
    colors::ACCENT,
    config::{INSET_HEIGHT, INSET_ORIGIN, INSET_WIDTH, TRACK_VIEW_MARGIN, TRACK_VIEW_SIZE},
    styles::{LABEL_STYLE_MUTED, LEFT_ALIGNED},
    surface::Canvas,
    telemetry::TrackPosition,
};

use super::primitives::draw_panel;

// =============================================================================
// Layout Constants
// =============================================================================

/// Top-left of the viewport: right-aligned with the inset, 12px below it.
pub const TRACK_VIEW_ORIGIN: Point = Point::new(
    INSET_ORIGIN.x + (INSET_WIDTH - TRACK_VIEW_SIZE.width) as i32,
    INSET_ORIGIN.y + INSET_HEIGHT as i32 + 12,
);

const TRACK_VIEW_RECT: Rectangle = Rectangle::new(TRACK_VIEW_ORIGIN, TRACK_VIEW_SIZE);

const LABEL_POS: Point = Point::new(TRACK_VIEW_ORIGIN.x + 4, TRACK_VIEW_ORIGIN.y + 10);

const DOT_DIAMETER: u32 = 8;

const DOT_STYLE: PrimitiveStyle<Rgb888> = PrimitiveStyle::with_fill(ACCENT);

// =============================================================================
// Geometry
// =============================================================================

/// Dot position relative to the viewport's top-left corner.
pub fn dot_position(x: f32, y: f32) -> Point {
    let margin = TRACK_VIEW_MARGIN as f32;
    let inner_w = (TRACK_VIEW_SIZE.width - 2 * TRACK_VIEW_MARGIN) as f32;
    let inner_h = (TRACK_VIEW_SIZE.height - 2 * TRACK_VIEW_MARGIN) as f32;
    let unit = |v: f32| if v.is_nan() { 0.0 } else { v.clamp(0.0, 1.0) };

    Point::new(
        unit(x).mul_add(inner_w, margin).round() as i32,
        unit(y).mul_add(inner_h, margin).round() as i32,
    )
}

// =============================================================================
// Drawing Functions
// =============================================================================

pub fn draw_track_map<C: Canvas>(canvas: &mut C, track: Option<&TrackPosition>) {
    draw_panel(canvas, TRACK_VIEW_RECT);
    canvas.text("TRACK", LABEL_POS, LABEL_STYLE_MUTED, LEFT_ALIGNED);

    if let Some((x, y)) = track.and_then(|t| t.x.zip(t.y)) {
        let center = TRACK_VIEW_ORIGIN + dot_position(x, y);
        canvas.circle(center, DOT_DIAMETER, DOT_STYLE);
    }
}
