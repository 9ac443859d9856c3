//! Color constants for the HUD.
//!
//! Surfaces are `Rgb888`: camera frames arrive as 8-bit RGB and the simulator
//! window presents `Rgb888` natively, so there is no conversion on the blit
//! path. Standard colors come from the `RgbColor` trait constants.

use embedded_graphics::pixelcolor::{Rgb888, RgbColor};

// =============================================================================
// Standard Colors
// =============================================================================

/// Pure black. Gauge backgrounds and the g-meter face.
pub const BLACK: Rgb888 = Rgb888::BLACK;

/// Pure white. Primary text.
pub const WHITE: Rgb888 = Rgb888::WHITE;

/// Pure red. Redline segments and positive (slower) deltas.
pub const RED: Rgb888 = Rgb888::RED;

/// Pure green. Throttle and negative (faster) deltas.
pub const GREEN: Rgb888 = Rgb888::GREEN;

// =============================================================================
// HUD Colors
// =============================================================================

/// Background of the "NO SIGNAL" placeholder.
pub const NO_SIGNAL_BG: Rgb888 = Rgb888::new(10, 12, 16);

/// "NO SIGNAL" label.
pub const NO_SIGNAL_TEXT: Rgb888 = Rgb888::new(120, 128, 140);

/// Header strip and gauge panel fill.
pub const PANEL: Rgb888 = Rgb888::new(14, 16, 22);

/// Accent for the active RPM segments, g-meter marker and track dot.
pub const ACCENT: Rgb888 = Rgb888::new(0, 210, 255);

/// Amber for warnings (stale camera, reconnecting).
pub const AMBER: Rgb888 = Rgb888::new(255, 176, 0);

/// Inactive RPM segment, rings and crosshair.
pub const DIM: Rgb888 = Rgb888::new(52, 56, 66);

/// Inactive redline segment.
pub const DIM_RED: Rgb888 = Rgb888::new(72, 18, 18);

/// Secondary text (labels, units, placeholders).
pub const MUTED: Rgb888 = Rgb888::new(150, 156, 168);

/// Brake bar.
pub const BRAKE: Rgb888 = Rgb888::new(255, 60, 48);
