//! Telemetry snapshot model, event-stream codec and the Telemetry Link.
//!
//! - [`TelemetrySnapshot`]: one server-pushed sample, immutable once received
//! - [`sse`]: incremental `text/event-stream` decoder
//! - [`link`]: subscription, snapshot adoption and reconnect policy
//! - [`http`]: reqwest-backed event source
//!
//! # Tolerant Parsing
//!
//! Every field is optional. Missing fields and JSON `null` both mean
//! "unknown": smoothing treats them as 0 and the gauges show a placeholder.
//! Unknown fields are ignored. A payload that is not a JSON object, or has a
//! field of the wrong type, fails to parse and is simply not adopted.

pub mod http;
pub mod link;
pub mod sse;

use serde::{Deserialize, Deserializer};

use crate::error::HudError;

/// One telemetry sample as published by the overlay server.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct TelemetrySnapshot {
    #[serde(rename = "speed_mph", alias = "speed")]
    pub speed: Option<f32>,
    pub rpm: Option<f32>,
    #[serde(deserialize_with = "gear_label")]
    pub gear: Option<String>,
    /// Pedal position in [0, 1].
    pub throttle: Option<f32>,
    /// Pedal position in [0, 1].
    pub brake: Option<f32>,
    pub g_lat: Option<f32>,
    pub g_long: Option<f32>,
    pub lap: LapInfo,
    pub track: TrackPosition,
    pub system: SystemHealth,
    pub meta: Meta,
    pub ts_epoch_s: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct LapInfo {
    pub number: Option<u32>,
    pub current_time_s: Option<f64>,
    pub last_time_s: Option<f64>,
    pub best_time_s: Option<f64>,
    pub predicted_delta_s: Option<f64>,
    /// Fraction of the lap completed, [0, 1].
    pub progress: Option<f32>,
}

/// Normalized track coordinates, both in [0, 1].
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct TrackPosition {
    pub x: Option<f32>,
    pub y: Option<f32>,
}

/// Host health readouts. Each may be absent independently of the others.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct SystemHealth {
    pub cpu_percent: Option<f32>,
    pub cpu_load_1m: Option<f32>,
    pub cpu_cores: Option<u32>,
    pub gpu_percent: Option<f32>,
    pub temp_c: Option<f32>,
    pub mem_used_percent: Option<f32>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Meta {
    pub source: Option<String>,
    pub updated_at: Option<String>,
}

impl TelemetrySnapshot {
    /// Parse an event payload.
    pub fn from_json(payload: &str) -> Result<Self, HudError> {
        Ok(serde_json::from_str(payload)?)
    }
}

/// Gear arrives as a label (`"N"`, `"3"`) from the simulator, but integer
/// gears are common in other sources.
fn gear_label<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Gear {
        Label(String),
        Number(i64),
    }

    Ok(Option::<Gear>::deserialize(deserializer)?.map(|gear| match gear {
        Gear::Label(label) => label,
        Gear::Number(0) => "N".to_owned(),
        Gear::Number(n) if n < 0 => "R".to_owned(),
        Gear::Number(n) => n.to_string(),
    }))
}

// =============================================================================
// Unit Tests
// =============================================================================
