//! Shared HUD state and the context object injected into every task.
//!
//! The Camera Link, the Telemetry Link and the render loop all run as local
//! tasks on one current-thread runtime, so the shared state is a plain
//! `Rc<RefCell<HudState>>`: last write wins, no locks. Borrows are never held
//! across an `.await`.
//!
//! Writers:
//! - Camera Link: `frame`, `connection.camera_connected`, `connection.camera_phase`,
//!   `connection.last_frame_at`
//! - Telemetry Link: `latest`, `connection.telemetry_connected`
//! - bootstrap: `feed`
//!
//! The render loop only reads.

use std::{cell::RefCell, rc::Rc, sync::Arc, time::Duration};

use tokio::{sync::watch, time::Instant};

use crate::{camera::CameraPhase, config::BootstrapConfig, surface::Bitmap, telemetry::TelemetrySnapshot};

// =============================================================================
// Connection State
// =============================================================================

/// Link health as last reported by the links.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConnectionState {
    pub camera_connected: bool,
    pub telemetry_connected: bool,
    /// Where the Camera Link's request loop currently is.
    pub camera_phase: CameraPhase,
    /// When the Camera Link last delivered a decoded frame.
    pub last_frame_at: Option<Instant>,
}

/// Camera health as shown in the header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraIndicator {
    /// Connected and frames are arriving.
    Live,
    /// Connected but no frame for longer than the stale threshold.
    Stale,
    /// Not connected; the link is retrying.
    Retry,
}

impl ConnectionState {
    pub fn camera_indicator(&self, now: Instant, stale_after: Duration) -> CameraIndicator {
        if !self.camera_connected {
            return CameraIndicator::Retry;
        }
        match self.last_frame_at {
            Some(at) if now.saturating_duration_since(at) <= stale_after => CameraIndicator::Live,
            _ => CameraIndicator::Stale,
        }
    }
}

// =============================================================================
// HUD State
// =============================================================================

/// Everything the links publish for the render loop.
#[derive(Debug, Default)]
pub struct HudState {
    pub connection: ConnectionState,
    /// Latest telemetry snapshot. Replaced whole on arrival, never merged.
    pub latest: Option<Rc<TelemetrySnapshot>>,
    /// Latest decoded camera frame.
    pub frame: Option<Rc<Bitmap>>,
    /// Bootstrap configuration, once fetched. Display-only fields are read from here.
    pub feed: Option<BootstrapConfig>,
}

impl HudState {
    /// Adopt a parsed snapshot as the new latest and mark telemetry connected.
    pub fn adopt_snapshot(&mut self, snapshot: Rc<TelemetrySnapshot>) {
        self.latest = Some(snapshot);
        self.connection.telemetry_connected = true;
    }

    /// Publish a decoded camera frame.
    pub fn publish_frame(&mut self, frame: Rc<Bitmap>, at: Instant) {
        self.frame = Some(frame);
        self.connection.camera_connected = true;
        self.connection.last_frame_at = Some(at);
    }
}

pub type SharedState = Rc<RefCell<HudState>>;

// =============================================================================
// Stop Handle
// =============================================================================

/// Clonable handle that asks every task to finish.
#[derive(Debug, Clone)]
pub struct StopHandle {
    tx: Arc<watch::Sender<bool>>,
}

impl StopHandle {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    pub fn stop(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_stopped(&self) -> bool {
        *self.tx.borrow()
    }

    pub fn subscribe(&self) -> StopSignal {
        StopSignal { rx: self.tx.subscribe() }
    }
}

impl Default for StopHandle {
    fn default() -> Self {
        Self::new()
    }
}

/// Receiving side of a [`StopHandle`].
#[derive(Debug)]
pub struct StopSignal {
    rx: watch::Receiver<bool>,
}

impl StopSignal {
    /// Resolves once stop has been requested (or every handle is gone).
    pub async fn stopped(&mut self) {
        while !*self.rx.borrow_and_update() {
            if self.rx.changed().await.is_err() {
                return;
            }
        }
    }
}

// =============================================================================
// HUD Context
// =============================================================================

/// Explicit context passed to the links and the render loop.
#[derive(Debug, Clone, Default)]
pub struct HudContext {
    pub state: SharedState,
    pub stop: StopHandle,
}

impl HudContext {
    pub fn new() -> Self {
        Self::default()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
