//! RPM ladder: 30 segments left to right, the top third flagged as redline.
//!
//! Segment geometry and the redline flag are fixed at compile time in
//! [`RPM_LADDER`]. Each frame only the active count changes:
//!
//! ```text
//! active = round(clamp(rpm / 9000, 0, 1) * 30)
//! ```
//!
//! Segments grow 1px taller per step and share a common bottom edge, so the
//! ladder reads as a rising ramp.

use embedded_graphics::{
    pixelcolor::Rgb888,
    prelude::*,
    primitives::{PrimitiveStyle, Rectangle},
};

use crate::{
    colors::{ACCENT, DIM, DIM_RED, RED},
    config::{RPM_REDLINE_START, RPM_SEGMENTS},
    format::{format_rpm_thousands, rpm_active_segments},
    styles::{LABEL_STYLE_MUTED, LEFT_ALIGNED, VALUE_STYLE_MEDIUM},
    surface::Canvas,
};

// =============================================================================
// Layout Constants
// =============================================================================

const LADDER_X: i32 = 300;
/// Common bottom edge of all segments.
const LADDER_BOTTOM: i32 = 400;
const SEGMENT_WIDTH: u32 = 10;
const SEGMENT_GAP: u32 = 2;
const SEGMENT_BASE_HEIGHT: u32 = 16;

const READOUT_X: i32 = LADDER_X + (RPM_SEGMENTS as u32 * (SEGMENT_WIDTH + SEGMENT_GAP)) as i32 + 12;
const READOUT_POS: Point = Point::new(READOUT_X, LADDER_BOTTOM);
const UNIT_POS: Point = Point::new(READOUT_X, LADDER_BOTTOM + 14);

// =============================================================================
// Pre-computed Primitive Styles
// =============================================================================

const ACTIVE_STYLE: PrimitiveStyle<Rgb888> = PrimitiveStyle::with_fill(ACCENT);
const ACTIVE_REDLINE_STYLE: PrimitiveStyle<Rgb888> = PrimitiveStyle::with_fill(RED);
const INACTIVE_STYLE: PrimitiveStyle<Rgb888> = PrimitiveStyle::with_fill(DIM);
const INACTIVE_REDLINE_STYLE: PrimitiveStyle<Rgb888> = PrimitiveStyle::with_fill(DIM_RED);

// =============================================================================
// Ladder
// =============================================================================

/// One ladder segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    pub rect: Rectangle,
    pub redline: bool,
}

impl Segment {
    const fn style(self, active: bool) -> PrimitiveStyle<Rgb888> {
        match (active, self.redline) {
            (true, false) => ACTIVE_STYLE,
            (true, true) => ACTIVE_REDLINE_STYLE,
            (false, false) => INACTIVE_STYLE,
            (false, true) => INACTIVE_REDLINE_STYLE,
        }
    }
}

/// The fixed, ordered segment sequence.
pub struct RpmLadder {
    segments: [Segment; RPM_SEGMENTS],
}

/// The ladder drawn on the main surface.
pub const RPM_LADDER: RpmLadder = RpmLadder::new();

impl RpmLadder {
    pub const fn new() -> Self {
        let mut segments = [Segment {
            rect: Rectangle::new(Point::zero(), Size::zero()),
            redline: false,
        }; RPM_SEGMENTS];

        let mut i = 0;
        while i < RPM_SEGMENTS {
            let height = SEGMENT_BASE_HEIGHT + i as u32;
            let x = LADDER_X + (i as u32 * (SEGMENT_WIDTH + SEGMENT_GAP)) as i32;
            segments[i] = Segment {
                rect: Rectangle::new(Point::new(x, LADDER_BOTTOM - height as i32), Size::new(SEGMENT_WIDTH, height)),
                redline: i >= RPM_REDLINE_START,
            };
            i += 1;
        }

        Self { segments }
    }

    pub const fn segments(&self) -> &[Segment; RPM_SEGMENTS] {
        &self.segments
    }

    /// Number of segments lit from the start for `rpm`.
    pub fn active_count(rpm: f32) -> usize {
        rpm_active_segments(rpm)
    }

    pub fn draw<C: Canvas>(&self, canvas: &mut C, rpm: f32) {
        let active = Self::active_count(rpm);
        for (i, segment) in self.segments.iter().enumerate() {
            canvas.rect(segment.rect, segment.style(i < active));
        }

        canvas.text(&format_rpm_thousands(rpm), READOUT_POS, VALUE_STYLE_MEDIUM, LEFT_ALIGNED);
        canvas.text("x1000 RPM", UNIT_POS, LABEL_STYLE_MUTED, LEFT_ALIGNED);
    }
}

impl Default for RpmLadder {
    fn default() -> Self {
        Self::new()
    }
}
