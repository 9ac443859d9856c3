//! Low-level drawing helpers shared across widgets.
//!
//! # Panels
//!
//! Gauges that carry text sit on a [`PANEL`] rectangle with a 1px [`DIM`]
//! border so they stay readable over a bright camera frame. The compositor
//! gradient darkens the image but not enough for small fonts.
//!
//! # Labeled Values
//!
//! A labeled value is a muted label at the left edge of a row and a
//! right-aligned value at the right edge, both on the same baseline.

use embedded_graphics::{
    mono_font::MonoTextStyle,
    pixelcolor::Rgb888,
    prelude::*,
    primitives::{PrimitiveStyle, PrimitiveStyleBuilder, Rectangle},
};

use crate::{
    colors::{DIM, PANEL},
    styles::{LABEL_STYLE_MUTED, LEFT_ALIGNED, RIGHT_ALIGNED},
    surface::Canvas,
};

/// Panel background with a 1px border.
pub const PANEL_STYLE: PrimitiveStyle<Rgb888> = PrimitiveStyleBuilder::new()
    .fill_color(PANEL)
    .stroke_color(DIM)
    .stroke_width(1)
    .build();

/// Draw a gauge panel.
pub fn draw_panel<C: Canvas>(canvas: &mut C, rect: Rectangle) {
    canvas.rect(rect, PANEL_STYLE);
}

/// Draw a label/value row spanning `left_x..right_x` on `baseline_y`.
pub fn draw_labeled_value<C: Canvas>(
    canvas: &mut C,
    label: &str,
    value: &str,
    left_x: i32,
    right_x: i32,
    baseline_y: i32,
    value_style: MonoTextStyle<'static, Rgb888>,
) {
    canvas.text(label, Point::new(left_x, baseline_y), LABEL_STYLE_MUTED, LEFT_ALIGNED);
    canvas.text(value, Point::new(right_x, baseline_y), value_style, RIGHT_ALIGNED);
}
