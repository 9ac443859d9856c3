//! Text formatting for gauge readouts.
//!
//! All helpers return fixed-capacity `heapless::String`s so the per-frame
//! gauge pass does not allocate. Capacities cover every realistic value; a
//! value too wide to fit renders as the readout's placeholder instead of a
//! truncated label.
//!
//! Placeholders:
//! - lap times: `--:--.---`
//! - system readouts: `--`

use core::fmt::{Arguments, Write};

use heapless::String;

use crate::config::{RPM_MAX, RPM_SEGMENTS};

/// Placeholder for an unknown lap time.
pub const LAP_PLACEHOLDER: &str = "--:--.---";

/// Placeholder for an unknown system readout.
pub const VALUE_PLACEHOLDER: &str = "--";

/// Gear shown when the snapshot carries none.
pub const DEFAULT_GEAR: &str = "N";

/// Format into a fixed-capacity string, or `placeholder` when it does not fit.
fn fit<const N: usize>(args: Arguments<'_>, placeholder: &str) -> String<N> {
    let mut s = String::new();
    if s.write_fmt(args).is_err() {
        s.clear();
        s.push_str(placeholder).ok();
    }
    s
}

// =============================================================================
// Drivetrain
// =============================================================================

/// Speed rounded and zero-padded to 3 digits (`7.4` -> `"007"`).
pub fn format_speed(speed: f32) -> String<8> {
    let rounded = if speed.is_finite() { speed.round().max(0.0) as u32 } else { 0 };
    fit(format_args!("{rounded:03}"), VALUE_PLACEHOLDER)
}

/// RPM in thousands with one decimal (`7420` -> `"7.4"`).
pub fn format_rpm_thousands(rpm: f32) -> String<8> {
    let rpm = if rpm.is_finite() { rpm.max(0.0) } else { 0.0 };
    fit(format_args!("{:.1}", rpm / 1000.0), VALUE_PLACEHOLDER)
}

/// Gear label, `"N"` when absent or blank.
pub fn format_gear(gear: Option<&str>) -> &str {
    match gear.map(str::trim) {
        Some(label) if !label.is_empty() => label,
        _ => DEFAULT_GEAR,
    }
}

/// Number of active RPM ladder segments: `round(clamp(rpm / 9000, 0, 1) * 30)`.
pub fn rpm_active_segments(rpm: f32) -> usize {
    let ratio = if rpm.is_nan() { 0.0 } else { (rpm / RPM_MAX).clamp(0.0, 1.0) };
    (ratio * RPM_SEGMENTS as f32).round() as usize
}

/// Bar fill percentage: `round(clamp(value, 0, 1) * 100)`.
pub fn bar_percent(value: f32) -> u32 {
    if value.is_nan() {
        return 0;
    }
    (value.clamp(0.0, 1.0) * 100.0).round() as u32
}

// =============================================================================
// Lap Timing
// =============================================================================

/// `MM:SS.mmm`. Negative or non-finite times render as zero.
///
/// Rounds to whole milliseconds first so `59.9996` carries into the minute.
pub fn format_lap(seconds: f64) -> String<16> {
    let total_ms = if seconds.is_finite() && seconds > 0.0 { (seconds * 1000.0).round() as u64 } else { 0 };
    let minutes = total_ms / 60_000;
    let secs = (total_ms % 60_000) / 1000;
    let millis = total_ms % 1000;
    fit(format_args!("{minutes:02}:{secs:02}.{millis:03}"), LAP_PLACEHOLDER)
}

/// [`format_lap`], or the placeholder when unknown.
pub fn format_lap_opt(seconds: Option<f64>) -> String<16> {
    match seconds {
        Some(secs) => format_lap(secs),
        None => {
            let mut s = String::new();
            s.push_str(LAP_PLACEHOLDER).ok();
            s
        }
    }
}

/// Whether a lap delta is ahead of or behind the reference lap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeltaTag {
    /// Zero or slower.
    Positive,
    /// Faster.
    Negative,
}

/// Signed delta with 3 decimals and an explicit `+` for non-negative values.
pub fn format_delta(delta: f64) -> (String<16>, DeltaTag) {
    let delta = if delta.is_finite() { delta } else { 0.0 };
    let (sign, tag) = if delta >= 0.0 { ('+', DeltaTag::Positive) } else { ('-', DeltaTag::Negative) };
    (fit(format_args!("{sign}{:.3}", delta.abs()), VALUE_PLACEHOLDER), tag)
}

// =============================================================================
// System Health
// =============================================================================

/// Whole percent (`"23%"`), or `"--"`.
pub fn format_percent(value: Option<f32>) -> String<8> {
    match value.filter(|v| v.is_finite()) {
        Some(v) => fit(format_args!("{v:.0}%"), VALUE_PLACEHOLDER),
        None => fit(format_args!("{VALUE_PLACEHOLDER}"), VALUE_PLACEHOLDER),
    }
}

/// Temperature with one decimal (`"51.2°C"`), or `"--"`.
pub fn format_temp(celsius: Option<f32>) -> String<12> {
    match celsius.filter(|v| v.is_finite()) {
        Some(v) => fit(format_args!("{v:.1}\u{b0}C"), VALUE_PLACEHOLDER),
        None => fit(format_args!("{VALUE_PLACEHOLDER}"), VALUE_PLACEHOLDER),
    }
}

/// One-minute load average with the core count when known (`"1.27/6"`), or `"--"`.
pub fn format_load(load: Option<f32>, cores: Option<u32>) -> String<16> {
    match (load.filter(|v| v.is_finite()), cores) {
        (Some(load), Some(cores)) => fit(format_args!("{load:.2}/{cores}"), VALUE_PLACEHOLDER),
        (Some(load), None) => fit(format_args!("{load:.2}"), VALUE_PLACEHOLDER),
        (None, _) => fit(format_args!("{VALUE_PLACEHOLDER}"), VALUE_PLACEHOLDER),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
