//! Speed and gear readouts (bottom center).

use embedded_graphics::prelude::*;

use crate::{
    format::{format_gear, format_speed},
    styles::{CENTERED, LABEL_STYLE_MUTED, VALUE_STYLE_WHITE},
    surface::Canvas,
};

const SPEED_POS: Point = Point::new(440, 470);
const SPEED_UNIT_POS: Point = Point::new(440, 488);
const GEAR_POS: Point = Point::new(540, 470);
const GEAR_LABEL_POS: Point = Point::new(540, 488);

pub fn draw_readouts<C: Canvas>(canvas: &mut C, speed: f32, gear: Option<&str>) {
    canvas.text(&format_speed(speed), SPEED_POS, VALUE_STYLE_WHITE, CENTERED);
    canvas.text("MPH", SPEED_UNIT_POS, LABEL_STYLE_MUTED, CENTERED);

    canvas.text(format_gear(gear), GEAR_POS, VALUE_STYLE_WHITE, CENTERED);
    canvas.text("GEAR", GEAR_LABEL_POS, LABEL_STYLE_MUTED, CENTERED);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::recording::RecordingCanvas;

    #[test]
    fn test_readouts_text() {
        let mut canvas = RecordingCanvas::new(Size::new(960, 540));
        draw_readouts(&mut canvas, 96.4, None);
        assert_eq!(canvas.texts(), vec!["096", "MPH", "N", "GEAR"]);
    }
}
