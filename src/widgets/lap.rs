//! Lap timing panel (top left).
//!
//! ```text
//! +--------------------+
//! | LAP 3              |
//! | CUR     00:42.125  |
//! | LAST    01:36.401  |
//! | BEST    01:35.612  |
//! | DELTA      -0.214  |
//! +--------------------+
//! ```
//!
//! Times come straight from the latest snapshot (not smoothed). Unknown
//! times show `--:--.---`; an unknown delta shows `--`.

use core::fmt::Write;

use embedded_graphics::{mono_font::MonoTextStyle, pixelcolor::Rgb888, prelude::*, primitives::Rectangle};
use heapless::String;

use crate::{
    colors::{GREEN, RED},
    format::{DeltaTag, VALUE_PLACEHOLDER, format_delta, format_lap_opt},
    styles::{LABEL_STYLE_WHITE, LEFT_ALIGNED, TEXT_FONT, TEXT_STYLE_MUTED, TEXT_STYLE_WHITE},
    surface::Canvas,
    telemetry::LapInfo,
};

use super::primitives::{draw_labeled_value, draw_panel};

// =============================================================================
// Layout Constants
// =============================================================================

const PANEL_RECT: Rectangle = Rectangle::new(Point::new(12, 40), Size::new(220, 130));

const LEFT_X: i32 = 24;
const RIGHT_X: i32 = 220;

const TITLE_Y: i32 = 58;
/// Baselines of the CUR / LAST / BEST / DELTA rows.
const ROW_Y: [i32; 4] = [84, 108, 132, 156];

// =============================================================================
// Drawing Functions
// =============================================================================

pub fn draw_lap_panel<C: Canvas>(canvas: &mut C, lap: Option<&LapInfo>) {
    draw_panel(canvas, PANEL_RECT);

    canvas.text(&lap_title(lap.and_then(|l| l.number)), Point::new(LEFT_X, TITLE_Y), LABEL_STYLE_WHITE, LEFT_ALIGNED);

    let times = [
        ("CUR", lap.and_then(|l| l.current_time_s)),
        ("LAST", lap.and_then(|l| l.last_time_s)),
        ("BEST", lap.and_then(|l| l.best_time_s)),
    ];
    for ((label, seconds), y) in times.into_iter().zip(ROW_Y) {
        let style = if seconds.is_some() { TEXT_STYLE_WHITE } else { TEXT_STYLE_MUTED };
        draw_labeled_value(canvas, label, &format_lap_opt(seconds), LEFT_X, RIGHT_X, y, style);
    }

    let delta_y = ROW_Y[3];
    match lap.and_then(|l| l.predicted_delta_s) {
        Some(delta) => {
            let (text, tag) = format_delta(delta);
            let style = MonoTextStyle::new(TEXT_FONT, delta_color(tag));
            draw_labeled_value(canvas, "DELTA", &text, LEFT_X, RIGHT_X, delta_y, style);
        }
        None => draw_labeled_value(canvas, "DELTA", VALUE_PLACEHOLDER, LEFT_X, RIGHT_X, delta_y, TEXT_STYLE_MUTED),
    }
}

/// `LAP <n>`, or `LAP --`.
pub fn lap_title(number: Option<u32>) -> String<16> {
    let mut s = String::new();
    match number {
        Some(n) => write!(s, "LAP {n}").ok(),
        None => s.push_str("LAP --").ok(),
    };
    s
}

/// Faster than reference is green, slower (or equal) is red.
pub const fn delta_color(tag: DeltaTag) -> Rgb888 {
    match tag {
        DeltaTag::Negative => GREEN,
        DeltaTag::Positive => RED,
    }
}
