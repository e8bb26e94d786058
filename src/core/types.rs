//! Shared value types crossing the receiver/consumer boundary

use nalgebra::Vector3;
use std::collections::HashMap;

/// One decoded telemetry datagram.
///
/// Azimuth, altitude and validity travel together as a single immutable
/// value so a reader can never observe a half-updated pointing solution.
/// `error` is populated only when `valid` is false.
#[derive(Debug, Clone, PartialEq)]
pub struct TelemetryFrame {
    pub azimuth_deg: f64,
    pub altitude_deg: f64,
    pub valid: bool,
    pub error: Option<String>,
}

impl TelemetryFrame {
    /// Frame carrying a usable pointing solution.
    pub fn pointing(azimuth_deg: f64, altitude_deg: f64) -> Self {
        Self {
            azimuth_deg,
            altitude_deg,
            valid: true,
            error: None,
        }
    }

    /// Frame marking telemetry invalid with a user-visible message.
    pub fn fault(message: impl Into<String>) -> Self {
        Self {
            azimuth_deg: 0.0,
            altitude_deg: 0.0,
            valid: false,
            error: Some(message.into()),
        }
    }
}

impl Default for TelemetryFrame {
    /// Startup state: nothing received yet, motion must not run.
    fn default() -> Self {
        Self {
            azimuth_deg: 0.0,
            altitude_deg: 0.0,
            valid: false,
            error: None,
        }
    }
}

/// One fully-parsed position-feed record.
///
/// Keys are canonical lower-case body names; coordinates are already in
/// render-space units. Each record replaces the previous snapshot wholesale.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PositionSnapshot {
    /// Producer-side timestamp of the record, carried for display only.
    pub timestamp_utc: Option<String>,
    pub bodies: HashMap<String, Vector3<f64>>,
}
