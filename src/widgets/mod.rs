//! Gauge renderer: every non-raster HUD element drawn over the camera image.
//!
//! One sub-module per gauge:
//!
//! - [`header`]: feed info, status line, camera indicator
//! - [`lap`]: lap number, current/last/best times, predicted delta
//! - [`track_map`]: track position dot
//! - [`gmeter`]: friction circle and the lap progress arc
//! - [`rpm_ladder`]: 30-segment RPM ladder with redline zone
//! - [`readouts`]: speed and gear
//! - [`pedals`]: throttle and brake bars
//! - [`system`]: host health strip
//! - [`primitives`]: panels and labeled values shared by the above
//!
//! # Inputs
//!
//! Gauges read two things: the [`SmoothedState`] for noisy channels (speed,
//! RPM, g, pedals) and the latest raw [`TelemetrySnapshot`] for everything
//! else (gear, lap, track, system). Neither is required: with no snapshot yet
//! every gauge draws its placeholder.
//!
//! # Layout
//!
//! Positions are `const` in each module, laid out for the 960x540 main
//! surface with the inset in the top-right corner.

pub mod gmeter;
pub mod header;
pub mod lap;
pub mod pedals;
pub mod primitives;
pub mod readouts;
pub mod rpm_ladder;
pub mod system;
pub mod track_map;

use crate::{
    config::BootstrapConfig,
    render::StatusLine,
    smoothing::SmoothedState,
    state::CameraIndicator,
    surface::Canvas,
    telemetry::TelemetrySnapshot,
};

pub use header::draw_header;
pub use rpm_ladder::{RPM_LADDER, RpmLadder};

/// Everything one gauge pass reads.
#[derive(Debug, Clone, Copy)]
pub struct GaugeInputs<'a> {
    pub smoothed: &'a SmoothedState,
    pub snapshot: Option<&'a TelemetrySnapshot>,
    pub status: &'a StatusLine,
    pub camera: CameraIndicator,
    pub feed: Option<&'a BootstrapConfig>,
}

/// Draw every gauge onto the main surface.
pub fn draw_gauges<C: Canvas>(canvas: &mut C, inputs: &GaugeInputs<'_>) {
    let smoothed = inputs.smoothed;
    let snapshot = inputs.snapshot;

    header::draw_header(canvas, inputs.feed, inputs.status, inputs.camera);
    lap::draw_lap_panel(canvas, snapshot.map(|s| &s.lap));
    track_map::draw_track_map(canvas, snapshot.map(|s| &s.track));
    gmeter::draw_gmeter(
        canvas,
        smoothed.g_lat.value(),
        smoothed.g_long.value(),
        snapshot.and_then(|s| s.lap.progress),
    );
    RPM_LADDER.draw(canvas, smoothed.rpm.value());
    readouts::draw_readouts(canvas, smoothed.speed.value(), snapshot.and_then(|s| s.gear.as_deref()));
    pedals::draw_pedals(canvas, smoothed.throttle.value(), smoothed.brake.value());
    system::draw_system_strip(canvas, snapshot.map(|s| &s.system));
}
