//! Frame accounting and render-time metrics.
//!
//! - [`FrameCounter`]: counts rendered frames per rolling window and yields the
//!   displayed FPS once per window.
//! - [`FrameMetrics`]: per-frame render time with min/max and an exponential
//!   moving average, logged at debug level once per FPS window.
//!
//! # Usage
//!
//! ```ignore
//! let mut counter = FrameCounter::new(Instant::now());
//! let mut metrics = FrameMetrics::new();
//!
//! // In the render loop:
//! let frame_start = std::time::Instant::now();
//! // ... composite + gauges ...
//! metrics.record(frame_start.elapsed());
//! if let Some(fps) = counter.record(Instant::now()) {
//!     log::debug!("{fps} fps, {}", metrics.summary());
//! }
//! ```

use core::fmt::Write;
use std::time::Duration;

use heapless::String;
use tokio::time::Instant;

use crate::config::FPS_WINDOW;

// =============================================================================
// Frame Counter
// =============================================================================

/// Frames rendered since `window_start`.
#[derive(Debug, Clone, Copy)]
pub struct FrameCounter {
    count: u32,
    window_start: Instant,
}

impl FrameCounter {
    pub const fn new(now: Instant) -> Self {
        Self { count: 0, window_start: now }
    }

    /// Count one rendered frame.
    ///
    /// Once at least a full window has elapsed since the window started,
    /// returns the number of frames in it and starts a new window at `now`.
    pub fn record(&mut self, now: Instant) -> Option<u32> {
        self.count += 1;
        if now.saturating_duration_since(self.window_start) < FPS_WINDOW {
            return None;
        }
        let fps = self.count;
        self.count = 0;
        self.window_start = now;
        Some(fps)
    }

    #[inline]
    pub const fn count(&self) -> u32 {
        self.count
    }
}

// =============================================================================
// Frame Metrics
// =============================================================================

/// Render-time statistics.
#[derive(Debug, Clone)]
pub struct FrameMetrics {
    /// Render time of the most recent frame.
    pub render_time_us: u32,
    pub render_time_min_us: u32,
    pub render_time_max_us: u32,
    render_time_avg_us: f32,
    /// Total frames rendered since startup.
    pub total_frames: u64,
}

impl FrameMetrics {
    /// Exponential moving average alpha (0.1 for smooth updates).
    const EMA_ALPHA: f32 = 0.1;

    pub const fn new() -> Self {
        Self {
            render_time_us: 0,
            render_time_min_us: u32::MAX,
            render_time_max_us: 0,
            render_time_avg_us: 0.0,
            total_frames: 0,
        }
    }

    /// Record how long one frame took to render.
    pub fn record(&mut self, render_time: Duration) {
        let us = u32::try_from(render_time.as_micros()).unwrap_or(u32::MAX);

        self.render_time_us = us;
        self.render_time_min_us = self.render_time_min_us.min(us);
        self.render_time_max_us = self.render_time_max_us.max(us);

        if self.total_frames == 0 {
            self.render_time_avg_us = us as f32;
        } else {
            self.render_time_avg_us =
                Self::EMA_ALPHA.mul_add(us as f32, (1.0 - Self::EMA_ALPHA) * self.render_time_avg_us);
        }

        self.total_frames += 1;
    }

    #[inline]
    pub const fn render_time_avg_us(&self) -> u32 {
        self.render_time_avg_us as u32
    }

    /// One-line summary for the debug log.
    pub fn summary(&self) -> String<64> {
        let mut s = String::new();
        if self.total_frames == 0 {
            s.push_str("no frames").ok();
        } else {
            write!(
                s,
                "render avg {}us min {}us max {}us",
                self.render_time_avg_us(),
                self.render_time_min_us,
                self.render_time_max_us
            )
            .ok();
        }
        s
    }
}

impl Default for FrameMetrics {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Tests
// =============================================================================
