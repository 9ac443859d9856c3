//! Exponential smoothing of noisy telemetry channels.
//!
//! Every rendered frame each channel moves a fixed fraction of the way from
//! its current value toward the latest raw sample:
//!
//! ```text
//! v = v + (raw - v) * alpha
//! ```
//!
//! `alpha` is per channel (see the smoothing factors in [`crate::config`]).
//! Higher values react faster, lower values look smoother. For any `alpha` in
//! (0, 1) the value converges monotonically toward a constant input and never
//! overshoots it.
//!
//! A missing raw value counts as 0, so with no telemetry every gauge decays
//! toward rest instead of freezing. Non-finite raw values count as missing.

use crate::{
    config::{SMOOTH_BRAKE, SMOOTH_G_LAT, SMOOTH_G_LONG, SMOOTH_RPM, SMOOTH_SPEED, SMOOTH_THROTTLE},
    telemetry::TelemetrySnapshot,
};

// =============================================================================
// Single Channel
// =============================================================================

/// One smoothed scalar. Only ever nudged, never set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Smoothed {
    value: f32,
    alpha: f32,
}

impl Smoothed {
    pub const fn new(alpha: f32) -> Self {
        Self { value: 0.0, alpha }
    }

    /// Advance one frame toward `raw`.
    #[inline]
    pub fn step(&mut self, raw: Option<f32>) {
        let target = raw.filter(|v| v.is_finite()).unwrap_or(0.0);
        self.value = (target - self.value).mul_add(self.alpha, self.value);
    }

    #[inline]
    pub const fn value(&self) -> f32 {
        self.value
    }
}

// =============================================================================
// Smoothed State
// =============================================================================

/// Smoothed values for every noisy channel the gauges display.
#[derive(Debug, Clone, PartialEq)]
pub struct SmoothedState {
    pub speed: Smoothed,
    pub rpm: Smoothed,
    pub g_lat: Smoothed,
    pub g_long: Smoothed,
    pub throttle: Smoothed,
    pub brake: Smoothed,
}

impl SmoothedState {
    /// All channels at rest (0).
    pub const fn new() -> Self {
        Self {
            speed: Smoothed::new(SMOOTH_SPEED),
            rpm: Smoothed::new(SMOOTH_RPM),
            g_lat: Smoothed::new(SMOOTH_G_LAT),
            g_long: Smoothed::new(SMOOTH_G_LONG),
            throttle: Smoothed::new(SMOOTH_THROTTLE),
            brake: Smoothed::new(SMOOTH_BRAKE),
        }
    }

    /// Advance every channel one frame toward `latest`.
    ///
    /// `None` (no snapshot received yet) decays every channel toward 0.
    pub fn update(&mut self, latest: Option<&TelemetrySnapshot>) {
        let raw = |field: fn(&TelemetrySnapshot) -> Option<f32>| latest.and_then(field);

        self.speed.step(raw(|s| s.speed));
        self.rpm.step(raw(|s| s.rpm));
        self.g_lat.step(raw(|s| s.g_lat));
        self.g_long.step(raw(|s| s.g_long));
        self.throttle.step(raw(|s| s.throttle));
        self.brake.step(raw(|s| s.brake));
    }
}

impl Default for SmoothedState {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(speed: f32, rpm: f32) -> TelemetrySnapshot {
        TelemetrySnapshot {
            speed: Some(speed),
            rpm: Some(rpm),
            ..TelemetrySnapshot::default()
        }
    }

    #[test]
    fn test_step_moves_fixed_fraction() {
        let mut ch = Smoothed::new(0.25);
        ch.step(Some(100.0));
        assert!((ch.value() - 25.0).abs() < 1e-4, "first step covers alpha of the distance");
        ch.step(Some(100.0));
        assert!((ch.value() - 43.75).abs() < 1e-4, "second step covers alpha of the remainder");
    }

    #[test]
    fn test_converges_monotonically_without_overshoot() {
        for alpha in [0.01, 0.15, 0.5, 0.99] {
            for target in [-3.0_f32, 0.5, 9000.0] {
                let mut ch = Smoothed::new(alpha);
                let mut prev_dist = target.abs();
                for frame in 0..2000 {
                    ch.step(Some(target));
                    let dist = (target - ch.value()).abs();
                    assert!(dist <= prev_dist, "alpha {alpha}: frame {frame} moved away from {target}");
                    assert!(ch.value().signum() == target.signum() || ch.value() == 0.0);
                    assert!(ch.value().abs() <= target.abs(), "alpha {alpha}: overshoot past {target}");
                    prev_dist = dist;
                }
                assert!((target - ch.value()).abs() < target.abs() * 0.01 + 1e-3, "alpha {alpha} did not converge");
            }
        }
    }

    #[test]
    fn test_missing_value_decays_toward_zero() {
        let mut state = SmoothedState::new();
        for _ in 0..50 {
            state.update(Some(&snapshot(100.0, 6000.0)));
        }
        let before = state.speed.value();

        let empty = TelemetrySnapshot::default();
        state.update(Some(&empty));
        assert!(state.speed.value() < before, "absent field pulls toward 0");
        assert!(state.speed.value() > 0.0);
    }

    #[test]
    fn test_no_snapshot_keeps_rest_state() {
        let mut state = SmoothedState::new();
        state.update(None);
        assert_eq!(state, SmoothedState::new(), "0 stays 0 without telemetry");
    }

    #[test]
    fn test_non_finite_treated_as_missing() {
        let mut ch = Smoothed::new(0.5);
        ch.step(Some(10.0));
        ch.step(Some(f32::NAN));
        assert!((ch.value() - 2.5).abs() < 1e-4, "NaN behaves like 0");
        ch.step(Some(f32::INFINITY));
        assert!(ch.value().is_finite());
    }

    #[test]
    fn test_channels_use_their_own_factor() {
        let mut state = SmoothedState::new();
        state.update(Some(&snapshot(100.0, 100.0)));
        assert!((state.speed.value() - 100.0 * SMOOTH_SPEED).abs() < 1e-3);
        assert!((state.rpm.value() - 100.0 * SMOOTH_RPM).abs() < 1e-3);
        assert!(state.rpm.value() > state.speed.value(), "rpm reacts faster than speed");
    }

    #[test]
    fn test_repeated_update_is_stable() {
        let mut state = SmoothedState::new();
        let snap = snapshot(55.0, 3000.0);
        for _ in 0..500 {
            state.update(Some(&snap));
        }
        let settled = state.clone();
        state.update(Some(&snap));
        assert!((state.speed.value() - settled.speed.value()).abs() < 1e-3, "settled value does not oscillate");
    }
}
