//! Throttle and brake bars (bottom right).
//!
//! Each bar fills from the bottom to `round(value * 100)` percent of its
//! height. Values are the smoothed pedal positions.

use embedded_graphics::{
    pixelcolor::Rgb888,
    prelude::*,
    primitives::{PrimitiveStyle, Rectangle},
};

use crate::{
    colors::{BRAKE, DIM, GREEN},
    format::bar_percent,
    styles::{CENTERED, LABEL_STYLE_MUTED},
    surface::Canvas,
};

// =============================================================================
// Layout Constants
// =============================================================================

const BAR_SIZE: Size = Size::new(24, 140);

pub const THROTTLE_FRAME: Rectangle = Rectangle::new(Point::new(860, 360), BAR_SIZE);
pub const BRAKE_FRAME: Rectangle = Rectangle::new(Point::new(900, 360), BAR_SIZE);

/// Label baseline below the bars.
const LABEL_Y: i32 = 360 + BAR_SIZE.height as i32 + 14;

const FRAME_STYLE: PrimitiveStyle<Rgb888> = PrimitiveStyle::with_stroke(DIM, 1);
const THROTTLE_STYLE: PrimitiveStyle<Rgb888> = PrimitiveStyle::with_fill(GREEN);
const BRAKE_STYLE: PrimitiveStyle<Rgb888> = PrimitiveStyle::with_fill(BRAKE);

// =============================================================================
// Geometry
// =============================================================================

/// Filled part of a bar frame, anchored to its bottom edge.
///
/// Returns a zero-height rectangle at the bottom edge for 0%.
pub fn bar_fill(frame: Rectangle, value: f32) -> Rectangle {
    let height = frame.size.height * bar_percent(value) / 100;
    let top = frame.top_left.y + (frame.size.height - height) as i32;
    Rectangle::new(Point::new(frame.top_left.x, top), Size::new(frame.size.width, height))
}

// =============================================================================
// Drawing Functions
// =============================================================================

pub fn draw_pedals<C: Canvas>(canvas: &mut C, throttle: f32, brake: f32) {
    draw_bar(canvas, THROTTLE_FRAME, throttle, THROTTLE_STYLE, "THR");
    draw_bar(canvas, BRAKE_FRAME, brake, BRAKE_STYLE, "BRK");
}

fn draw_bar<C: Canvas>(canvas: &mut C, frame: Rectangle, value: f32, fill: PrimitiveStyle<Rgb888>, label: &str) {
    let filled = bar_fill(frame, value);
    if !filled.is_zero_sized() {
        canvas.rect(filled, fill);
    }
    canvas.rect(frame, FRAME_STYLE);

    let label_pos = Point::new(frame.center().x, LABEL_Y);
    canvas.text(label, label_pos, LABEL_STYLE_MUTED, CENTERED);
}
