//! Application configuration.
//!
//! Two kinds of configuration live here:
//!
//! - **Compile-time constants**: surface sizes, smoothing factors, link timing
//!   and gauge scales. Layout values are pre-computed as `const` so widgets do
//!   not redo the arithmetic every frame.
//! - **[`BootstrapConfig`]**: the runtime configuration served by the overlay
//!   server at `/api/config`, fetched once at startup (see [`crate::bootstrap`]).

use std::time::Duration;

use embedded_graphics::prelude::{Point, Size};
use serde::Deserialize;

// =============================================================================
// Surface Configuration
// =============================================================================

/// Main surface width in pixels.
pub const MAIN_WIDTH: u32 = 960;

/// Main surface height in pixels.
pub const MAIN_HEIGHT: u32 = 540;

/// Inset (picture-in-picture) surface width. Same 16:9 aspect as the main surface.
pub const INSET_WIDTH: u32 = 256;

/// Inset surface height.
pub const INSET_HEIGHT: u32 = 144;

/// Top-left corner of the inset when presented over the main surface.
pub const INSET_ORIGIN: Point = Point::new((MAIN_WIDTH - INSET_WIDTH - 16) as i32, 40);

pub const MAIN_SIZE: Size = Size::new(MAIN_WIDTH, MAIN_HEIGHT);
pub const INSET_SIZE: Size = Size::new(INSET_WIDTH, INSET_HEIGHT);

// =============================================================================
// Compositor Configuration
// =============================================================================

/// Darkening at the top edge of every composited surface (0.0 = none, 1.0 = black).
pub const GRADIENT_TOP_ALPHA: f32 = 0.05;

/// Darkening at the bottom edge of the main surface.
pub const GRADIENT_MAIN_BOTTOM_ALPHA: f32 = 0.45;

/// Darkening at the bottom edge of the inset. Darker than main, the inset
/// carries its own label over a smaller image.
pub const GRADIENT_INSET_BOTTOM_ALPHA: f32 = 0.65;

/// "NO SIGNAL" glyph height as a fraction of the destination height.
pub const NO_SIGNAL_TEXT_RATIO: f32 = 0.08;

// =============================================================================
// Timing Configuration
// =============================================================================

/// Default frame clock rate when no display refresh signal is available.
pub const DEFAULT_FRAME_RATE: u32 = 60;

/// Length of the rolling FPS window.
pub const FPS_WINDOW: Duration = Duration::from_secs(1);

// =============================================================================
// Smoothing Factors
// =============================================================================
//
// Fraction of the remaining distance covered per rendered frame.
// Higher = more responsive, lower = smoother. All must lie in (0, 1).

pub const SMOOTH_SPEED: f32 = 0.18;
pub const SMOOTH_RPM: f32 = 0.25;
pub const SMOOTH_G_LAT: f32 = 0.15;
pub const SMOOTH_G_LONG: f32 = 0.15;
pub const SMOOTH_THROTTLE: f32 = 0.30;
pub const SMOOTH_BRAKE: f32 = 0.30;

// =============================================================================
// Camera Link Configuration
// =============================================================================

/// Fixed delay between a camera failure and the next request. Never grows.
pub const CAMERA_RETRY_DELAY: Duration = Duration::from_millis(600);

/// A camera stream that delivers no frame for this long counts as failed.
pub const CAMERA_READ_TIMEOUT: Duration = Duration::from_secs(8);

/// A connected camera with no new frame for this long is shown as stale.
pub const CAMERA_STALE_AFTER: Duration = Duration::from_secs(2);

/// Pause before re-requesting a still image that loaded successfully.
pub const CAMERA_STILL_REFRESH: Duration = Duration::from_millis(33);

// =============================================================================
// Telemetry Link Configuration
// =============================================================================

/// First reconnect delay after the event stream drops.
pub const RECONNECT_INITIAL: Duration = Duration::from_millis(500);

/// Upper bound for the reconnect delay.
pub const RECONNECT_MAX: Duration = Duration::from_secs(8);

/// Growth factor applied after every failed attempt.
pub const RECONNECT_FACTOR: u32 = 2;

/// Lower bound for a server-requested (`retry:`) reconnect delay.
pub const RECONNECT_FLOOR: Duration = Duration::from_millis(100);

/// An event stream with no event or keep-alive for this long counts as dropped.
pub const TELEMETRY_IDLE_TIMEOUT: Duration = Duration::from_secs(15);

/// Name of the server-sent event carrying a snapshot.
pub const TELEMETRY_EVENT: &str = "telemetry";

// =============================================================================
// Bootstrap Configuration
// =============================================================================

/// Default overlay server base URL.
pub const DEFAULT_SERVER: &str = "http://127.0.0.1:8080";

/// Path of the bootstrap config endpoint, relative to the server base.
pub const CONFIG_PATH: &str = "/api/config";

/// Timeout for the one-shot bootstrap request.
pub const BOOTSTRAP_TIMEOUT: Duration = Duration::from_secs(5);

/// Connect timeout for the camera and telemetry clients.
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

// =============================================================================
// Gauge Scales
// =============================================================================

/// RPM at which the ladder is full.
pub const RPM_MAX: f32 = 9000.0;

/// Number of segments in the RPM ladder.
pub const RPM_SEGMENTS: usize = 30;

/// Segments from this index on belong to the redline zone (top third).
pub const RPM_REDLINE_START: usize = RPM_SEGMENTS - RPM_SEGMENTS / 3;

/// Full-scale deflection of the g-meter, in g.
pub const MAX_G: f32 = 2.0;

/// Track map viewport size in pixels.
pub const TRACK_VIEW_SIZE: Size = Size::new(200, 120);

/// Margin inside the track map viewport.
pub const TRACK_VIEW_MARGIN: u32 = 12;

// =============================================================================
// Bootstrap Config (runtime)
// =============================================================================

/// Runtime configuration served by the overlay server.
///
/// `source` and `target_fps` are display-only. `camera_url` and
/// `telemetry_url` may be absolute or relative to the server base.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BootstrapConfig {
    #[serde(default = "unknown_source")]
    pub source: String,
    #[serde(default)]
    pub target_fps: u32,
    pub camera_url: String,
    pub telemetry_url: String,
}

fn unknown_source() -> String {
    "unknown".to_owned()
}

// =============================================================================
// Unit Tests
// =============================================================================
