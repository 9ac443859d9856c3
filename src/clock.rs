//! Fixed-rate frame clock.
//!
//! Native hosts have no display refresh callback, so the render loop is
//! driven by a tokio interval. A frame that overruns its slot delays the next
//! tick instead of triggering a burst of catch-up frames.

use std::time::Duration;

use tokio::time::{Instant, Interval, MissedTickBehavior, interval};

pub struct FrameClock {
    interval: Interval,
    period: Duration,
}

impl FrameClock {
    /// Clock ticking `rate` times per second. A rate of 0 is treated as 1.
    pub fn new(rate: u32) -> Self {
        let period = Self::period_for(rate);
        let mut interval = interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Self { interval, period }
    }

    pub fn period_for(rate: u32) -> Duration {
        Duration::from_secs(1) / rate.max(1)
    }

    #[inline]
    pub const fn period(&self) -> Duration {
        self.period
    }

    /// Wait for the next frame. The first tick completes immediately.
    pub async fn tick(&mut self) -> Instant {
        self.interval.tick().await
    }
}
