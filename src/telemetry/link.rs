//! Telemetry Link: one long-lived event-stream subscription.
//!
//! ```text
//!   subscribe ──ok──> read frames ──end/error──┐
//!      │                  │                     │
//!      └──error───────────┼─────────────────────┤
//!                         │                     v
//!            "telemetry" event parses     connected = false
//!            -> latest = snapshot         sleep(policy delay)
//!            -> connected = true          └──> subscribe
//!            -> policy reset
//! ```
//!
//! A native HTTP client does not reconnect on its own, so the link owns an
//! explicit [`ReconnectPolicy`]: exponential backoff from 500 ms doubling up
//! to 8 s, reset after every adopted snapshot. A server `retry:` field
//! replaces the initial delay, floored at [`RECONNECT_FLOOR`].
//!
//! A subscription that delivers neither an event nor a keep-alive comment
//! for [`TELEMETRY_IDLE_TIMEOUT`] is treated as dropped, so a peer that
//! vanished without closing the connection still shows as disconnected.
//!
//! A payload that fails to parse is logged and skipped: the previous
//! snapshot stays latest and the connected flag does not change.

use std::{rc::Rc, time::Duration};

use async_trait::async_trait;
use futures::{StreamExt, stream::LocalBoxStream};
use log::{debug, info, trace, warn};
use url::Url;

use super::{
    TelemetrySnapshot,
    sse::{SseEvent, SseFrame},
};
use crate::{
    config::{
        RECONNECT_FACTOR,
        RECONNECT_FLOOR,
        RECONNECT_INITIAL,
        RECONNECT_MAX,
        TELEMETRY_EVENT,
        TELEMETRY_IDLE_TIMEOUT,
    },
    error::HudError,
    state::HudContext,
};

/// Decoded frames of one subscription. Ends when the server closes it.
pub type FrameStream = LocalBoxStream<'static, Result<SseFrame, HudError>>;

/// Opens event-stream subscriptions.
#[async_trait(?Send)]
pub trait EventSource {
    async fn subscribe(&self, url: &Url) -> Result<FrameStream, HudError>;
}

// =============================================================================
// Reconnect Policy
// =============================================================================

/// Exponential reconnect backoff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconnectPolicy {
    initial: Duration,
    max: Duration,
    factor: u32,
    current: Duration,
}

impl ReconnectPolicy {
    pub const fn new(initial: Duration, max: Duration, factor: u32) -> Self {
        Self {
            initial,
            max,
            factor,
            current: initial,
        }
    }

    /// Delay before the next attempt. Grows the following one.
    pub fn next_delay(&mut self) -> Duration {
        let delay = self.current;
        let cap = self.max.max(self.initial);
        self.current = self.current.saturating_mul(self.factor).min(cap);
        delay
    }

    /// Back to the initial delay.
    pub fn reset(&mut self) {
        self.current = self.initial;
    }

    /// Server-requested delay (`retry:` field) becomes the new initial delay.
    /// Never below [`RECONNECT_FLOOR`], so `retry: 0` cannot spin.
    pub fn set_initial(&mut self, initial: Duration) {
        let initial = initial.max(RECONNECT_FLOOR);
        self.initial = initial;
        self.current = initial;
    }
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self::new(RECONNECT_INITIAL, RECONNECT_MAX, RECONNECT_FACTOR)
    }
}

// =============================================================================
// Telemetry Link
// =============================================================================

pub struct TelemetryLink<S> {
    source: S,
    url: Url,
    ctx: HudContext,
    policy: ReconnectPolicy,
}

impl<S: EventSource> TelemetryLink<S> {
    pub fn new(source: S, url: Url, ctx: HudContext) -> Self {
        Self {
            source,
            url,
            ctx,
            policy: ReconnectPolicy::default(),
        }
    }

    /// Run until stop is requested.
    pub async fn run(mut self) {
        let mut stop = self.ctx.stop.subscribe();
        tokio::select! {
            biased;
            () = stop.stopped() => info!("telemetry: stopped"),
            () = self.supervise() => {}
        }
    }

    async fn supervise(&mut self) {
        loop {
            info!("telemetry: subscribing to {}", self.url);
            match self.source.subscribe(&self.url).await {
                Ok(stream) => match self.consume(stream).await {
                    Ok(()) => warn!("telemetry: stream closed by server"),
                    Err(e) => warn!("telemetry: stream failed: {e}"),
                },
                Err(e) => warn!("telemetry: subscribe failed: {e}"),
            }

            self.set_disconnected();
            let delay = self.policy.next_delay();
            info!("telemetry: reconnecting in {delay:?}");
            tokio::time::sleep(delay).await;
        }
    }

    async fn consume(&mut self, mut stream: FrameStream) -> Result<(), HudError> {
        loop {
            let next = tokio::time::timeout(TELEMETRY_IDLE_TIMEOUT, stream.next())
                .await
                .map_err(|_| HudError::Stalled(TELEMETRY_IDLE_TIMEOUT))?;

            let Some(frame) = next else {
                return Ok(());
            };
            match frame? {
                SseFrame::Retry(delay) => {
                    debug!("telemetry: server retry {delay:?}");
                    self.policy.set_initial(delay);
                }
                SseFrame::Event(event) if event.event == TELEMETRY_EVENT => self.adopt(&event),
                SseFrame::Event(event) => trace!("telemetry: ignoring '{}' event", event.event),
                SseFrame::Comment => trace!("telemetry: keep-alive"),
            }
        }
    }

    fn adopt(&mut self, event: &SseEvent) {
        let snapshot = match TelemetrySnapshot::from_json(&event.data) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!("telemetry: dropping payload: {e}");
                return;
            }
        };

        let mut state = self.ctx.state.borrow_mut();
        if !state.connection.telemetry_connected {
            info!("telemetry: connected");
        }
        state.adopt_snapshot(Rc::new(snapshot));
        self.policy.reset();
    }

    fn set_disconnected(&self) {
        self.ctx.state.borrow_mut().connection.telemetry_connected = false;
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, collections::VecDeque};

    use futures::stream;
    use tokio::{task::LocalSet, time::Instant};

    use super::*;

    /// One scripted subscription.
    enum Step {
        /// Subscribe fails.
        Fail(HudError),
        /// Stream yields the frames, then the server closes it.
        End(Vec<Result<SseFrame, HudError>>),
        /// Stream yields the frames, then stays open.
        Hold(Vec<Result<SseFrame, HudError>>),
    }

    /// Replays scripted subscriptions, then hangs forever.
    struct FakeSource {
        script: RefCell<VecDeque<Step>>,
        attempts: Rc<RefCell<Vec<Instant>>>,
    }

    impl FakeSource {
        fn new(script: Vec<Step>) -> (Self, Rc<RefCell<Vec<Instant>>>) {
            let attempts = Rc::default();
            let source = Self {
                script: RefCell::new(script.into()),
                attempts: Rc::clone(&attempts),
            };
            (source, attempts)
        }
    }

    #[async_trait(?Send)]
    impl EventSource for FakeSource {
        async fn subscribe(&self, _url: &Url) -> Result<FrameStream, HudError> {
            self.attempts.borrow_mut().push(Instant::now());
            match self.script.borrow_mut().pop_front() {
                Some(Step::Fail(e)) => Err(e),
                Some(Step::End(frames)) => Ok(stream::iter(frames).boxed_local()),
                Some(Step::Hold(frames)) => Ok(stream::iter(frames).chain(stream::pending()).boxed_local()),
                None => Ok(stream::pending().boxed_local()),
            }
        }
    }

    fn telemetry(data: &str) -> Result<SseFrame, HudError> {
        Ok(SseFrame::Event(SseEvent {
            event: TELEMETRY_EVENT.to_owned(),
            data: data.to_owned(),
            id: None,
        }))
    }

    fn unavailable() -> HudError {
        HudError::Status {
            url: "http://hud.test/api/telemetry/stream".to_owned(),
            status: 503,
        }
    }

    fn url() -> Url {
        Url::parse("http://hud.test/api/telemetry/stream").unwrap()
    }

    /// Run the link for `duration` of (paused) time, then stop it.
    async fn run_for<S: EventSource + 'static>(source: S, ctx: &HudContext, duration: Duration) {
        let link = TelemetryLink::new(source, url(), ctx.clone());
        let stop = ctx.stop.clone();
        LocalSet::new()
            .run_until(async move {
                let handle = tokio::task::spawn_local(link.run());
                tokio::time::sleep(duration).await;
                stop.stop();
                handle.await.unwrap();
            })
            .await;
    }

    #[test]
    fn test_policy_doubles_up_to_max() {
        let mut policy = ReconnectPolicy::default();
        let delays: Vec<_> = (0..7).map(|_| policy.next_delay().as_millis()).collect();
        assert_eq!(delays, vec![500, 1000, 2000, 4000, 8000, 8000, 8000]);
    }

    #[test]
    fn test_policy_reset_and_server_retry() {
        let mut policy = ReconnectPolicy::default();
        policy.next_delay();
        policy.next_delay();
        policy.reset();
        assert_eq!(policy.next_delay(), Duration::from_millis(500));

        policy.set_initial(Duration::from_millis(3000));
        assert_eq!(policy.next_delay(), Duration::from_millis(3000));
        assert_eq!(policy.next_delay(), Duration::from_millis(6000));
        assert_eq!(policy.next_delay(), Duration::from_millis(8000), "still capped");
    }

    #[test]
    fn test_policy_server_retry_floored() {
        let mut policy = ReconnectPolicy::default();
        policy.set_initial(Duration::ZERO);
        assert_eq!(policy.next_delay(), RECONNECT_FLOOR);
        assert_eq!(policy.next_delay(), RECONNECT_FLOOR * 2, "backoff still grows");
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_snapshot_replaces_first() {
        let (source, _) = FakeSource::new(vec![Step::Hold(vec![
            telemetry(r#"{"rpm": 3000, "speed_mph": 40}"#),
            telemetry(r#"{"rpm": 5000}"#),
        ])]);
        let ctx = HudContext::new();
        run_for(source, &ctx, Duration::from_millis(10)).await;

        let state = ctx.state.borrow();
        let latest = state.latest.as_deref().unwrap();
        assert_eq!(latest.rpm, Some(5000.0));
        assert_eq!(latest.speed, None, "no merge with the previous snapshot");
        assert!(state.connection.telemetry_connected);
    }

    #[tokio::test(start_paused = true)]
    async fn test_not_connected_before_first_event() {
        let (source, _) = FakeSource::new(vec![Step::Hold(vec![])]);
        let ctx = HudContext::new();
        run_for(source, &ctx, Duration::from_millis(10)).await;
        assert!(!ctx.state.borrow().connection.telemetry_connected, "an open stream alone is not connected");
    }

    #[tokio::test(start_paused = true)]
    async fn test_malformed_payload_not_adopted() {
        let (source, _) = FakeSource::new(vec![Step::Hold(vec![
            telemetry(r#"{"rpm": 4000}"#),
            telemetry("{not json"),
            telemetry(r#"{"rpm": "fast"}"#),
        ])]);
        let ctx = HudContext::new();
        run_for(source, &ctx, Duration::from_millis(10)).await;

        let state = ctx.state.borrow();
        assert_eq!(state.latest.as_deref().unwrap().rpm, Some(4000.0), "prior snapshot remains latest");
        assert!(state.connection.telemetry_connected, "flag unchanged by bad payloads");
    }

    #[tokio::test(start_paused = true)]
    async fn test_malformed_payload_does_not_connect() {
        let (source, _) = FakeSource::new(vec![Step::Hold(vec![telemetry("{not json")])]);
        let ctx = HudContext::new();
        run_for(source, &ctx, Duration::from_millis(10)).await;

        let state = ctx.state.borrow();
        assert!(state.latest.is_none());
        assert!(!state.connection.telemetry_connected);
    }

    #[tokio::test(start_paused = true)]
    async fn test_other_events_ignored() {
        let (source, _) = FakeSource::new(vec![Step::Hold(vec![Ok(SseFrame::Event(SseEvent {
            event: "heartbeat".to_owned(),
            data: r#"{"rpm": 1}"#.to_owned(),
            id: None,
        }))])]);
        let ctx = HudContext::new();
        run_for(source, &ctx, Duration::from_millis(10)).await;
        assert!(ctx.state.borrow().latest.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stream_end_marks_disconnected() {
        let (source, _) = FakeSource::new(vec![Step::End(vec![telemetry(r#"{"rpm": 4000}"#)])]);
        let ctx = HudContext::new();
        run_for(source, &ctx, Duration::from_millis(10)).await;

        let state = ctx.state.borrow();
        assert!(!state.connection.telemetry_connected, "stream ended, link is down");
        assert!(state.latest.is_some(), "last snapshot kept for display");
    }

    #[tokio::test(start_paused = true)]
    async fn test_stream_error_marks_disconnected() {
        let (source, _) = FakeSource::new(vec![Step::Hold(vec![telemetry(r#"{"rpm": 4000}"#), Err(unavailable())])]);
        let ctx = HudContext::new();
        run_for(source, &ctx, Duration::from_millis(10)).await;
        assert!(!ctx.state.borrow().connection.telemetry_connected);
    }

    #[tokio::test(start_paused = true)]
    async fn test_backoff_grows_and_resets_on_adoption() {
        let (source, attempts) = FakeSource::new(vec![
            Step::Fail(unavailable()),
            Step::End(vec![telemetry(r#"{"rpm": 4000}"#)]),
            Step::Fail(unavailable()),
        ]);
        let ctx = HudContext::new();
        let start = Instant::now();
        run_for(source, &ctx, Duration::from_millis(2500)).await;

        let offsets: Vec<_> = attempts.borrow().iter().map(|t| (*t - start).as_millis()).collect();
        // fail -> 500 ms, adopt + end -> reset -> 500 ms, fail -> 1000 ms
        assert_eq!(offsets, vec![0, 500, 1000, 2000]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_server_retry_sets_delay() {
        let (source, attempts) = FakeSource::new(vec![Step::End(vec![Ok(SseFrame::Retry(Duration::from_millis(3000)))])]);
        let ctx = HudContext::new();
        let start = Instant::now();
        run_for(source, &ctx, Duration::from_millis(3500)).await;

        let offsets: Vec<_> = attempts.borrow().iter().map(|t| (*t - start).as_millis()).collect();
        assert_eq!(offsets, vec![0, 3000]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_server_retry_zero_does_not_spin() {
        let script = (0..50).map(|_| Step::End(vec![Ok(SseFrame::Retry(Duration::ZERO))])).collect();
        let (source, attempts) = FakeSource::new(script);
        let ctx = HudContext::new();
        let start = Instant::now();
        run_for(source, &ctx, Duration::from_millis(1050)).await;

        let offsets: Vec<_> = attempts.borrow().iter().map(|t| (*t - start).as_millis()).collect();
        let expected: Vec<u128> = (0..=10).map(|i| i * 100).collect();
        assert_eq!(offsets, expected, "each reconnect waits at least the floor");
    }

    #[tokio::test(start_paused = true)]
    async fn test_silent_stream_times_out() {
        let (source, attempts) = FakeSource::new(vec![Step::Hold(vec![telemetry(r#"{"rpm": 4000}"#)])]);
        let ctx = HudContext::new();
        let start = Instant::now();

        run_for(source, &ctx, TELEMETRY_IDLE_TIMEOUT + Duration::from_millis(100)).await;
        assert!(!ctx.state.borrow().connection.telemetry_connected, "half-open stream reported down");

        let offsets: Vec<_> = attempts.borrow().iter().map(|t| (*t - start).as_millis()).collect();
        assert_eq!(offsets, vec![0], "reconnect waits out the policy delay");
    }

    #[tokio::test(start_paused = true)]
    async fn test_keep_alive_holds_stream_open() {
        let mut frames = vec![telemetry(r#"{"rpm": 4000}"#)];
        frames.extend((0..5).map(|_| Ok(SseFrame::Comment)));
        let source = DelayedSource {
            frames: RefCell::new(Some(frames)),
            gap: TELEMETRY_IDLE_TIMEOUT / 2,
            attempts: Rc::default(),
        };
        let attempts = Rc::clone(&source.attempts);
        let ctx = HudContext::new();
        run_for(source, &ctx, TELEMETRY_IDLE_TIMEOUT * 2).await;

        assert_eq!(attempts.borrow().len(), 1, "comments reset the idle timer");
        assert!(ctx.state.borrow().connection.telemetry_connected);
    }

    /// Yields its frames spaced `gap` apart, then stays open.
    struct DelayedSource {
        frames: RefCell<Option<Vec<Result<SseFrame, HudError>>>>,
        gap: Duration,
        attempts: Rc<RefCell<Vec<Instant>>>,
    }

    #[async_trait(?Send)]
    impl EventSource for DelayedSource {
        async fn subscribe(&self, _url: &Url) -> Result<FrameStream, HudError> {
            self.attempts.borrow_mut().push(Instant::now());
            let frames = self.frames.borrow_mut().take().unwrap_or_default();
            let gap = self.gap;
            Ok(stream::iter(frames)
                .then(move |frame| async move {
                    tokio::time::sleep(gap).await;
                    frame
                })
                .chain(stream::pending())
                .boxed_local())
        }
    }
}
