//! Header strip: feed info, status line and camera indicator.
//!
//! ```text
//! | SRC webcam  TGT 30 FPS        live 59 fps             CAM LIVE |
//! ```
//!
//! Source and target FPS come from the bootstrap config and are display-only.
//! The status line and camera indicator change color with link health.

use core::fmt::Write;

use embedded_graphics::{
    mono_font::MonoTextStyle,
    pixelcolor::Rgb888,
    prelude::*,
    primitives::{PrimitiveStyle, Rectangle},
};
use heapless::String;

use crate::{
    colors::{AMBER, GREEN, MUTED, PANEL, RED},
    config::{BootstrapConfig, MAIN_WIDTH},
    render::StatusLine,
    state::CameraIndicator,
    styles::{CENTERED, LABEL_FONT, LABEL_STYLE_MUTED, LEFT_ALIGNED, RIGHT_ALIGNED},
    surface::Canvas,
};

// =============================================================================
// Header Layout Constants
// =============================================================================

/// Height of the header strip.
pub const HEADER_HEIGHT: u32 = 28;

const HEADER_RECT: Rectangle = Rectangle::new(Point::new(0, 0), Size::new(MAIN_WIDTH, HEADER_HEIGHT));

/// Shared text baseline (6x10 font, vertically centered in the strip).
const BASELINE_Y: i32 = 18;

const FEED_POS: Point = Point::new(12, BASELINE_Y);
const STATUS_POS: Point = Point::new((MAIN_WIDTH / 2) as i32, BASELINE_Y);
const CAMERA_POS: Point = Point::new((MAIN_WIDTH - 12) as i32, BASELINE_Y);

const HEADER_FILL_STYLE: PrimitiveStyle<Rgb888> = PrimitiveStyle::with_fill(PANEL);

// =============================================================================
// Drawing Functions
// =============================================================================

pub fn draw_header<C: Canvas>(
    canvas: &mut C,
    feed: Option<&BootstrapConfig>,
    status: &StatusLine,
    camera: CameraIndicator,
) {
    canvas.rect(HEADER_RECT, HEADER_FILL_STYLE);

    canvas.text(&feed_text(feed), FEED_POS, LABEL_STYLE_MUTED, LEFT_ALIGNED);

    let status_style = MonoTextStyle::new(LABEL_FONT, status_color(status));
    canvas.text(&status.text(), STATUS_POS, status_style, CENTERED);

    let (camera_text, camera_color) = camera_label(camera);
    canvas.text(camera_text, CAMERA_POS, MonoTextStyle::new(LABEL_FONT, camera_color), RIGHT_ALIGNED);
}

/// `SRC <source>  TGT <fps> FPS`, with placeholders before bootstrap completes.
pub fn feed_text(feed: Option<&BootstrapConfig>) -> String<64> {
    let mut s = String::new();
    match feed {
        Some(feed) => {
            // Long source names are cut, not dropped
            s.push_str("SRC ").ok();
            for c in feed.source.chars().take(24) {
                s.push(c).ok();
            }
            write!(s, "  TGT {} FPS", feed.target_fps).ok();
        }
        None => {
            s.push_str("SRC --  TGT --").ok();
        }
    }
    s
}

pub const fn status_color(status: &StatusLine) -> Rgb888 {
    match status {
        StatusLine::Connecting => MUTED,
        StatusLine::Live(_) => GREEN,
        StatusLine::Reconnecting => AMBER,
        StatusLine::InitFailed => RED,
    }
}

pub const fn camera_label(camera: CameraIndicator) -> (&'static str, Rgb888) {
    match camera {
        CameraIndicator::Live => ("CAM LIVE", GREEN),
        CameraIndicator::Stale => ("CAM STALE", AMBER),
        CameraIndicator::Retry => ("CAM RETRY", RED),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::recording::RecordingCanvas;

    fn feed(source: &str) -> BootstrapConfig {
        BootstrapConfig {
            source: source.to_owned(),
            target_fps: 30,
            camera_url: "/camera/live.mjpg".to_owned(),
            telemetry_url: "/api/telemetry/stream".to_owned(),
        }
    }

    #[test]
    fn test_feed_text() {
        assert_eq!(feed_text(Some(&feed("webcam"))).as_str(), "SRC webcam  TGT 30 FPS");
        assert_eq!(feed_text(None).as_str(), "SRC --  TGT --");
    }

    #[test]
    fn test_feed_text_truncates_long_source() {
        let text = feed_text(Some(&feed(&"x".repeat(200))));
        assert!(text.ends_with("TGT 30 FPS"), "target fps survives a long source name");
    }

    #[test]
    fn test_header_draws_status_and_camera() {
        let mut canvas = RecordingCanvas::new(Size::new(MAIN_WIDTH, 540));
        draw_header(&mut canvas, None, &StatusLine::Live(58), CameraIndicator::Stale);
        let texts = canvas.texts();
        assert!(texts.contains(&"live 58 fps"));
        assert!(texts.contains(&"CAM STALE"));
    }

    #[test]
    fn test_status_colors() {
        assert_eq!(status_color(&StatusLine::Live(60)), GREEN);
        assert_eq!(status_color(&StatusLine::Reconnecting), AMBER);
        assert_eq!(status_color(&StatusLine::InitFailed), RED);
    }
}
