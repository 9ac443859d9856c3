//! Per-frame rendering and the render loop.
//!
//! # Frame Order
//!
//! Every tick of the [`FrameClock`], in this order:
//!
//! | Step | Surface | Work |
//! |------|---------|------|
//! | 1 | main | composite camera frame (or NO SIGNAL) |
//! | 2 | inset | composite camera frame (or NO SIGNAL) |
//! | 3 | main | smoothing update, then every gauge |
//! | 4 | - | frame accounting; once per second: FPS + status line |
//!
//! Gauges always reflect the freshest snapshot the links have published by
//! the time the frame starts.
//!
//! # Status Line
//!
//! `connecting` until the first FPS window closes, then `live {fps} fps`
//! while telemetry is connected or `reconnecting` while it is not.
//! `init failed` is terminal.
//!
//! # Shutdown
//!
//! The loop ends when the presenter reports [`PresentOutcome::Quit`] (window
//! closed) or the shared stop handle fires (Ctrl-C). Nothing upstream can
//! stop it otherwise: link failures only change what is drawn.

use core::fmt::Write;
use std::time::Instant as WallInstant;

use heapless::String;
use log::{debug, info};
use tokio::time::Instant;

use crate::{
    clock::FrameClock,
    compositor::{SurfaceVariant, composite},
    config::{CAMERA_STALE_AFTER, INSET_SIZE, MAIN_SIZE},
    profiling::{FrameCounter, FrameMetrics},
    smoothing::SmoothedState,
    state::{HudContext, HudState},
    surface::{Canvas, FrameBuffer},
    widgets::{GaugeInputs, draw_gauges},
};

// =============================================================================
// Status Line
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLine {
    /// No FPS window has closed yet.
    Connecting,
    /// Telemetry connected, with the FPS of the last window.
    Live(u32),
    /// Telemetry link down.
    Reconnecting,
    /// Bootstrap failed. Never left.
    InitFailed,
}

impl StatusLine {
    /// Status after an FPS window closes.
    pub const fn after_window(self, fps: u32, telemetry_connected: bool) -> Self {
        match self {
            Self::InitFailed => Self::InitFailed,
            _ if telemetry_connected => Self::Live(fps),
            _ => Self::Reconnecting,
        }
    }

    pub fn text(&self) -> String<24> {
        let mut s = String::new();
        match self {
            Self::Connecting => s.push_str("connecting").ok(),
            Self::Live(fps) => write!(s, "live {fps} fps").ok(),
            Self::Reconnecting => s.push_str("reconnecting").ok(),
            Self::InitFailed => s.push_str("init failed").ok(),
        };
        s
    }

    const fn same_kind(self, other: Self) -> bool {
        matches!(
            (self, other),
            (Self::Connecting, Self::Connecting)
                | (Self::Live(_), Self::Live(_))
                | (Self::Reconnecting, Self::Reconnecting)
                | (Self::InitFailed, Self::InitFailed)
        )
    }
}

// =============================================================================
// HUD Renderer
// =============================================================================

/// Render-loop-owned state: smoothing, frame accounting, status line.
pub struct HudRenderer {
    smoothed: SmoothedState,
    counter: FrameCounter,
    metrics: FrameMetrics,
    status: StatusLine,
    fps: Option<u32>,
}

impl HudRenderer {
    pub fn new(now: Instant) -> Self {
        Self {
            smoothed: SmoothedState::new(),
            counter: FrameCounter::new(now),
            metrics: FrameMetrics::new(),
            status: StatusLine::Connecting,
            fps: None,
        }
    }

    /// Switch to the terminal `init failed` status.
    pub fn fail_init(&mut self) {
        self.status = StatusLine::InitFailed;
    }

    #[inline]
    pub const fn status(&self) -> StatusLine {
        self.status
    }

    /// FPS of the last closed window.
    #[inline]
    pub const fn fps(&self) -> Option<u32> {
        self.fps
    }

    #[inline]
    pub const fn smoothed(&self) -> &SmoothedState {
        &self.smoothed
    }

    #[inline]
    pub const fn metrics(&self) -> &FrameMetrics {
        &self.metrics
    }

    /// Render one frame from the current shared state.
    pub fn render_frame<M: Canvas, I: Canvas>(&mut self, state: &HudState, main: &mut M, inset: &mut I, now: Instant) {
        let started = WallInstant::now();
        let frame = state.frame.as_deref();

        composite(main, frame, SurfaceVariant::Main);
        composite(inset, frame, SurfaceVariant::Inset);

        let latest = state.latest.as_deref();
        self.smoothed.update(latest);
        let inputs = GaugeInputs {
            smoothed: &self.smoothed,
            snapshot: latest,
            status: &self.status,
            camera: state.connection.camera_indicator(now, CAMERA_STALE_AFTER),
            feed: state.feed.as_ref(),
        };
        draw_gauges(main, &inputs);

        self.metrics.record(started.elapsed());

        if let Some(fps) = self.counter.record(now) {
            self.fps = Some(fps);
            let next = self.status.after_window(fps, state.connection.telemetry_connected);
            if !next.same_kind(self.status) {
                info!("status: {}", next.text());
            }
            self.status = next;
            debug!("{fps} fps, {}", self.metrics.summary());
        }
    }
}

// =============================================================================
// Presenters
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresentOutcome {
    Continue,
    Quit,
}

/// Shows rendered surfaces. The inset is placed over the main surface by the
/// presenter.
pub trait Presenter {
    fn present(&mut self, main: &FrameBuffer, inset: &FrameBuffer) -> PresentOutcome;
}

/// Presenter without a window. Renders are counted and discarded.
#[derive(Debug, Default)]
pub struct HeadlessPresenter {
    presented: u64,
    limit: Option<u64>,
}

impl HeadlessPresenter {
    pub const fn new() -> Self {
        Self { presented: 0, limit: None }
    }

    /// Quit after `frames` presented frames.
    pub const fn with_limit(frames: u64) -> Self {
        Self {
            presented: 0,
            limit: Some(frames),
        }
    }

    pub const fn presented(&self) -> u64 {
        self.presented
    }
}

impl Presenter for HeadlessPresenter {
    fn present(&mut self, _main: &FrameBuffer, _inset: &FrameBuffer) -> PresentOutcome {
        self.presented += 1;
        match self.limit {
            Some(limit) if self.presented >= limit => PresentOutcome::Quit,
            _ => PresentOutcome::Continue,
        }
    }
}

// =============================================================================
// Render Loop
// =============================================================================

pub struct RenderLoop<P: Presenter> {
    ctx: HudContext,
    renderer: HudRenderer,
    clock: FrameClock,
    main: FrameBuffer,
    inset: FrameBuffer,
    presenter: P,
}

impl<P: Presenter> RenderLoop<P> {
    pub fn new(ctx: HudContext, presenter: P, frame_rate: u32) -> Self {
        Self {
            ctx,
            renderer: HudRenderer::new(Instant::now()),
            clock: FrameClock::new(frame_rate),
            main: FrameBuffer::new(MAIN_SIZE),
            inset: FrameBuffer::new(INSET_SIZE),
            presenter,
        }
    }

    pub fn renderer_mut(&mut self) -> &mut HudRenderer {
        &mut self.renderer
    }

    /// Run until the presenter quits or stop is requested.
    ///
    /// Returns the renderer and presenter for inspection.
    pub async fn run(mut self) -> (HudRenderer, P) {
        let mut stop = self.ctx.stop.subscribe();
        info!("render loop started at {:?} per frame", self.clock.period());

        loop {
            tokio::select! {
                biased;
                () = stop.stopped() => {
                    info!("render loop stopping");
                    break;
                }
                _ = self.clock.tick() => {}
            }

            let now = Instant::now();
            {
                let state = self.ctx.state.borrow();
                self.renderer.render_frame(&state, &mut self.main, &mut self.inset, now);
            }

            if self.presenter.present(&self.main, &self.inset) == PresentOutcome::Quit {
                info!("presenter closed, stopping");
                self.ctx.stop.stop();
                break;
            }
        }

        (self.renderer, self.presenter)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
