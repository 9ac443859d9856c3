//! Camera Link: keeps the latest camera bitmap in shared state.
//!
//! ```text
//!              ┌────────────── frame ──────────────┐
//!              v                                   │
//!   Connecting ──first frame──> Connected ─────────┘
//!       ^  │                        │
//!       │  │ failure                ├─ stream ended ──> Connecting (33 ms)
//!       │  v                        │
//!       │ Retrying <──── failure ───┘
//!       │  │
//!       └──┘ 600 ms
//! ```
//!
//! The loop is driven by [`CameraPhase`], which is also published in the
//! shared [`ConnectionState`](crate::state::ConnectionState).
//!
//! A failure is anything that prevents a frame: connect error, non-2xx
//! status, decode error, a stream that ends before its first frame, or no
//! response or frame for [`CAMERA_READ_TIMEOUT`]. It clears `camera_connected`
//! immediately and schedules exactly one new request after
//! [`CAMERA_RETRY_DELAY`]. The delay never grows and attempts are unbounded:
//! the camera is expected back quickly after a replug or source restart.
//!
//! Every request carries a fresh `t=<epoch-ms>` query parameter so no cache
//! between the HUD and the camera can serve an old image.

pub mod http;
pub mod mjpeg;

use std::{
    rc::Rc,
    time::{SystemTime, UNIX_EPOCH},
};

use async_trait::async_trait;
use futures::{StreamExt, stream::LocalBoxStream};
use log::{debug, info, warn};
use tokio::time::Instant;
use url::Url;

use crate::{
    config::{CAMERA_READ_TIMEOUT, CAMERA_RETRY_DELAY, CAMERA_STILL_REFRESH},
    error::HudError,
    state::HudContext,
    surface::Bitmap,
};

/// Decoded frames of one camera request. Ends when the response body ends.
pub type BitmapStream = LocalBoxStream<'static, Result<Bitmap, HudError>>;

/// Opens camera requests.
#[async_trait(?Send)]
pub trait CameraSource {
    async fn open(&self, url: &Url) -> Result<BitmapStream, HudError>;
}

// =============================================================================
// Camera Phase
// =============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CameraPhase {
    /// Request issued, no frame yet.
    #[default]
    Connecting,
    /// At least one frame delivered by the current request.
    Connected,
    /// Waiting out the fixed retry delay.
    Retrying,
}

impl CameraPhase {
    #[must_use]
    pub const fn on_frame(self) -> Self {
        match self {
            Self::Connecting | Self::Connected => Self::Connected,
            Self::Retrying => Self::Retrying,
        }
    }

    #[must_use]
    pub const fn on_failure(self) -> Self {
        Self::Retrying
    }

    #[must_use]
    pub const fn on_retry_elapsed(self) -> Self {
        match self {
            Self::Retrying => Self::Connecting,
            other => other,
        }
    }

    /// Body ended normally. Only a request that delivered frames is re-issued
    /// without a retry; an empty one counts as a failure.
    #[must_use]
    pub const fn on_stream_end(self) -> Self {
        match self {
            Self::Connected => Self::Connecting,
            Self::Connecting | Self::Retrying => Self::Retrying,
        }
    }
}

// =============================================================================
// Freshness Parameter
// =============================================================================

/// Name of the cache-busting query parameter.
pub const FRESHNESS_PARAM: &str = "t";

/// Hands out strictly increasing millisecond stamps.
#[derive(Debug, Default)]
pub struct Freshness {
    last: u64,
}

impl Freshness {
    pub const fn new() -> Self {
        Self { last: 0 }
    }

    /// Next stamp: the current epoch millisecond, or one past the previous stamp.
    pub fn next_stamp(&mut self, now_ms: u64) -> u64 {
        self.last = now_ms.max(self.last + 1);
        self.last
    }

    /// `base` with `t=<stamp>` replacing any previous `t`, other pairs kept.
    pub fn stamp(&mut self, base: &Url) -> Url {
        let stamp = self.next_stamp(epoch_ms());
        with_freshness(base, stamp)
    }
}

pub fn with_freshness(base: &Url, stamp: u64) -> Url {
    let kept: Vec<(String, String)> = base
        .query_pairs()
        .filter(|(k, _)| k != FRESHNESS_PARAM)
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    let mut url = base.clone();
    url.set_query(None);
    {
        let mut pairs = url.query_pairs_mut();
        pairs.extend_pairs(&kept);
        pairs.append_pair(FRESHNESS_PARAM, &stamp.to_string());
    }
    url
}

fn epoch_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
}

// =============================================================================
// Camera Link
// =============================================================================

pub struct CameraLink<S> {
    source: S,
    url: Url,
    ctx: HudContext,
    phase: CameraPhase,
    freshness: Freshness,
}

impl<S: CameraSource> CameraLink<S> {
    pub fn new(source: S, url: Url, ctx: HudContext) -> Self {
        Self {
            source,
            url,
            ctx,
            phase: CameraPhase::Connecting,
            freshness: Freshness::new(),
        }
    }

    /// Run until stop is requested.
    pub async fn run(mut self) {
        let mut stop = self.ctx.stop.subscribe();
        tokio::select! {
            biased;
            () = stop.stopped() => info!("camera: stopped"),
            () = self.supervise() => {}
        }
    }

    async fn supervise(&mut self) {
        loop {
            let next = match self.phase {
                CameraPhase::Retrying => {
                    tokio::time::sleep(CAMERA_RETRY_DELAY).await;
                    self.phase.on_retry_elapsed()
                }
                CameraPhase::Connecting | CameraPhase::Connected => self.attempt().await,
            };
            self.set_phase(next);
        }
    }

    /// One request, including the refresh pause after a clean end.
    async fn attempt(&mut self) -> CameraPhase {
        let url = self.freshness.stamp(&self.url);
        debug!("camera: requesting {url}");

        match self.request(&url).await {
            Ok(frames) => match self.phase.on_stream_end() {
                CameraPhase::Retrying => self.fail(&HudError::EmptyStream),
                next => {
                    debug!("camera: response ended after {frames} frames");
                    tokio::time::sleep(CAMERA_STILL_REFRESH).await;
                    next
                }
            },
            Err(e) => self.fail(&e),
        }
    }

    fn fail(&mut self, e: &HudError) -> CameraPhase {
        self.ctx.state.borrow_mut().connection.camera_connected = false;
        warn!("camera: {e}, retrying in {CAMERA_RETRY_DELAY:?}");
        self.phase.on_failure()
    }

    fn set_phase(&mut self, phase: CameraPhase) {
        if phase != self.phase {
            debug!("camera: {:?} -> {phase:?}", self.phase);
        }
        self.phase = phase;
        self.ctx.state.borrow_mut().connection.camera_phase = phase;
    }

    /// One request. Returns the number of frames delivered before the body ended.
    async fn request(&mut self, url: &Url) -> Result<u32, HudError> {
        let mut stream = tokio::time::timeout(CAMERA_READ_TIMEOUT, self.source.open(url))
            .await
            .map_err(|_| HudError::Stalled(CAMERA_READ_TIMEOUT))??;
        let mut frames = 0u32;

        loop {
            let next = tokio::time::timeout(CAMERA_READ_TIMEOUT, stream.next())
                .await
                .map_err(|_| HudError::Stalled(CAMERA_READ_TIMEOUT))?;

            match next {
                Some(frame) => {
                    self.publish(frame?);
                    frames = frames.saturating_add(1);
                }
                None => return Ok(frames),
            }
        }
    }

    fn publish(&mut self, frame: Bitmap) {
        self.set_phase(self.phase.on_frame());
        let mut state = self.ctx.state.borrow_mut();
        if !state.connection.camera_connected {
            info!("camera: connected ({}x{})", frame.size().width, frame.size().height);
        }
        state.publish_frame(Rc::new(frame), Instant::now());
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
