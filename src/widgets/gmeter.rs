//! Friction-circle g-meter with the lap progress arc around it.
//!
//! The dial has three concentric rings at radius thirds and crosshair axes.
//! The marker sits at
//!
//! ```text
//! center + clamp(g, -MAX_G, MAX_G) / MAX_G * radius
//! ```
//!
//! on each axis. Screen y grows downward, so the longitudinal axis is inverted:
//! positive `g_long` (acceleration) draws above the center.
//!
//! Lap progress is an arc just outside the dial, starting at 12 o'clock and
//! sweeping clockwise.

use embedded_graphics::{
    pixelcolor::Rgb888,
    prelude::*,
    primitives::{PrimitiveStyle, PrimitiveStyleBuilder},
};

use crate::{
    colors::{ACCENT, BLACK, DIM, WHITE},
    config::MAX_G,
    styles::{CENTERED, LABEL_STYLE_MUTED},
    surface::Canvas,
};

// =============================================================================
// Layout Constants
// =============================================================================

pub const GMETER_CENTER: Point = Point::new(110, 420);

/// Dial radius (full-scale deflection).
pub const GMETER_RADIUS: u32 = 80;

const RING_COUNT: u32 = 3;

const MARKER_DIAMETER: u32 = 12;

/// Progress arc diameter: 8px clear of the dial on each side.
const PROGRESS_DIAMETER: u32 = GMETER_RADIUS * 2 + 16;

const LABEL_POS: Point = Point::new(GMETER_CENTER.x, GMETER_CENTER.y + GMETER_RADIUS as i32 + 22);

// =============================================================================
// Pre-computed Primitive Styles
// =============================================================================

const FACE_STYLE: PrimitiveStyle<Rgb888> = PrimitiveStyle::with_fill(BLACK);
const RING_STYLE: PrimitiveStyle<Rgb888> = PrimitiveStyle::with_stroke(DIM, 1);
const AXIS_STYLE: PrimitiveStyle<Rgb888> = PrimitiveStyle::with_stroke(DIM, 1);
const PROGRESS_TRACK_STYLE: PrimitiveStyle<Rgb888> = PrimitiveStyle::with_stroke(DIM, 3);
const PROGRESS_STYLE: PrimitiveStyle<Rgb888> = PrimitiveStyle::with_stroke(ACCENT, 3);
const MARKER_STYLE: PrimitiveStyle<Rgb888> = PrimitiveStyleBuilder::new()
    .fill_color(ACCENT)
    .stroke_color(WHITE)
    .stroke_width(1)
    .build();

// =============================================================================
// Geometry
// =============================================================================

/// Marker center for the given lateral and longitudinal g.
pub fn marker_position(g_lat: f32, g_long: f32) -> Point {
    let deflect = |g: f32| {
        let g = if g.is_nan() { 0.0 } else { g.clamp(-MAX_G, MAX_G) };
        (g / MAX_G * GMETER_RADIUS as f32).round() as i32
    };
    Point::new(GMETER_CENTER.x + deflect(g_lat), GMETER_CENTER.y - deflect(g_long))
}

/// Ring diameters, innermost first.
pub fn ring_diameters() -> [u32; RING_COUNT as usize] {
    core::array::from_fn(|i| 2 * GMETER_RADIUS * (i as u32 + 1) / RING_COUNT)
}

/// Progress sweep in degrees for a lap fraction.
pub fn progress_sweep(progress: f32) -> f32 {
    if progress.is_nan() { 0.0 } else { progress.clamp(0.0, 1.0) * 360.0 }
}

// =============================================================================
// Drawing Functions
// =============================================================================

pub fn draw_gmeter<C: Canvas>(canvas: &mut C, g_lat: f32, g_long: f32, progress: Option<f32>) {
    let diameter = GMETER_RADIUS * 2;
    canvas.circle(GMETER_CENTER, diameter, FACE_STYLE);
    for ring in ring_diameters() {
        canvas.circle(GMETER_CENTER, ring, RING_STYLE);
    }

    let r = GMETER_RADIUS as i32;
    canvas.line(GMETER_CENTER - Point::new(r, 0), GMETER_CENTER + Point::new(r, 0), AXIS_STYLE);
    canvas.line(GMETER_CENTER - Point::new(0, r), GMETER_CENTER + Point::new(0, r), AXIS_STYLE);

    canvas.circle(GMETER_CENTER, PROGRESS_DIAMETER, PROGRESS_TRACK_STYLE);
    let sweep = progress_sweep(progress.unwrap_or(0.0));
    if sweep > 0.0 {
        canvas.arc(
            GMETER_CENTER,
            PROGRESS_DIAMETER,
            Angle::from_degrees(-90.0),
            Angle::from_degrees(sweep),
            PROGRESS_STYLE,
        );
    }

    canvas.circle(marker_position(g_lat, g_long), MARKER_DIAMETER, MARKER_STYLE);
    canvas.text("G / LAP", LABEL_POS, LABEL_STYLE_MUTED, CENTERED);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::recording::{DrawOp, RecordingCanvas};

    #[test]
    fn test_marker_at_center_for_zero_g() {
        assert_eq!(marker_position(0.0, 0.0), GMETER_CENTER);
    }

    #[test]
    fn test_marker_full_scale() {
        assert_eq!(marker_position(2.0, 0.0), GMETER_CENTER + Point::new(80, 0));
        assert_eq!(marker_position(-1.0, 0.0), GMETER_CENTER - Point::new(40, 0));
    }

    #[test]
    fn test_marker_longitudinal_inverted() {
        let accel = marker_position(0.0, 1.0);
        assert!(accel.y < GMETER_CENTER.y, "positive longitudinal g draws upward");
        assert_eq!(accel, GMETER_CENTER - Point::new(0, 40));
    }

    #[test]
    fn test_marker_clamped_to_dial() {
        assert_eq!(marker_position(5.0, -9.0), GMETER_CENTER + Point::new(80, 80));
        assert_eq!(marker_position(f32::NAN, 0.0), GMETER_CENTER);
    }

    #[test]
    fn test_rings_at_radius_thirds() {
        assert_eq!(ring_diameters(), [53, 106, 160]);
    }

    #[test]
    fn test_progress_sweep() {
        assert_eq!(progress_sweep(0.25), 90.0);
        assert_eq!(progress_sweep(1.4), 360.0);
        assert_eq!(progress_sweep(-0.1), 0.0);
    }

    #[test]
    fn test_no_progress_arc_at_zero() {
        let mut canvas = RecordingCanvas::new(Size::new(960, 540));
        draw_gmeter(&mut canvas, 0.0, 0.0, None);
        assert!(!canvas.ops.iter().any(|op| matches!(op, DrawOp::Arc { .. })));

        let mut canvas = RecordingCanvas::new(Size::new(960, 540));
        draw_gmeter(&mut canvas, 0.0, 0.0, Some(0.5));
        assert!(canvas.ops.contains(&DrawOp::Arc { center: GMETER_CENTER, diameter: PROGRESS_DIAMETER }));
    }

    #[test]
    fn test_marker_drawn_last_among_shapes() {
        let mut canvas = RecordingCanvas::new(Size::new(960, 540));
        draw_gmeter(&mut canvas, 1.0, 1.0, Some(0.3));
        let last_circle = canvas.ops.iter().rev().find(|op| matches!(op, DrawOp::Circle { .. }));
        assert_eq!(
            last_circle,
            Some(&DrawOp::Circle { center: marker_position(1.0, 1.0), diameter: MARKER_DIAMETER }),
            "marker sits on top of rings and arc"
        );
    }
}
