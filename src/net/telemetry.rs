//! Datagram telemetry receiver
//!
//! The upstream pointing process sends small UTF-8 datagrams, classified
//! by a short text prefix: `AZ:<az> ALT:<alt>` carries a pointing
//! solution, `ERROR...` marks the current target unobservable, anything
//! else is ignored. Two independent instances of this receiver run in the
//! system, one feeding the mount driver and one feeding the camera's
//! validity latch, differing only in which cell they publish into.

use crate::core::constants::{ERROR_PREFIX, POINTING_PREFIX, TARGET_NOT_OBSERVABLE};
use crate::core::TelemetryFrame;
use crate::sync::{LatestSender, RunFlag};
use std::fmt;
use std::io::ErrorKind;
use std::net::UdpSocket;

/// Errors from a classified datagram that fails to parse.
#[derive(Debug, Clone, PartialEq)]
pub enum TelemetryParseError {
    /// A required `key:value` pair was absent.
    MissingField { field: &'static str },
    /// A value was present but not a decimal number.
    InvalidNumber { field: &'static str, value: String },
}

impl fmt::Display for TelemetryParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TelemetryParseError::MissingField { field } => {
                write!(f, "missing field {}", field)
            }
            TelemetryParseError::InvalidNumber { field, value } => {
                write!(f, "invalid number for {}: '{}'", field, value)
            }
        }
    }
}

impl std::error::Error for TelemetryParseError {}

/// Classify and parse one datagram payload.
///
/// Returns `Ok(None)` for payloads with an unrecognized prefix. Float
/// parsing goes through `f64::from_str`, which always uses `.` as the
/// decimal separator regardless of process locale.
pub fn parse_telemetry(text: &str) -> Result<Option<TelemetryFrame>, TelemetryParseError> {
    let text = text.trim();
    if text.starts_with(ERROR_PREFIX) {
        return Ok(Some(TelemetryFrame::fault(TARGET_NOT_OBSERVABLE)));
    }
    if !text.starts_with(POINTING_PREFIX) {
        return Ok(None);
    }

    let mut azimuth = None;
    let mut altitude = None;
    for pair in text.split_whitespace() {
        let Some((key, value)) = pair.split_once(':') else {
            continue;
        };
        match key {
            "AZ" => azimuth = Some(parse_field("AZ", value)?),
            "ALT" => altitude = Some(parse_field("ALT", value)?),
            _ => {}
        }
    }

    let azimuth = azimuth.ok_or(TelemetryParseError::MissingField { field: "AZ" })?;
    let altitude = altitude.ok_or(TelemetryParseError::MissingField { field: "ALT" })?;
    Ok(Some(TelemetryFrame::pointing(azimuth, altitude)))
}

fn parse_field(field: &'static str, value: &str) -> Result<f64, TelemetryParseError> {
    value
        .parse::<f64>()
        .map_err(|_| TelemetryParseError::InvalidNumber {
            field,
            value: value.to_string(),
        })
}

/// Body of a telemetry receiver thread.
///
/// `socket` is already bound with a read timeout; the timeout is the
/// loop's cancellation point. One undecodable datagram is logged and
/// skipped. Receive errors after the run flag has dropped are the expected
/// result of shutdown and stay silent.
pub fn run_telemetry_receiver(
    label: &'static str,
    socket: UdpSocket,
    sender: LatestSender<TelemetryFrame>,
    flag: RunFlag,
) {
    let mut buf = [0u8; 1024];
    while flag.is_running() {
        match socket.recv_from(&mut buf) {
            Ok((len, _peer)) => {
                let text = match std::str::from_utf8(&buf[..len]) {
                    Ok(text) => text,
                    Err(e) => {
                        log::warn!("{}: dropping non-utf8 datagram: {}", label, e);
                        continue;
                    }
                };
                if text.trim_start().starts_with(ERROR_PREFIX) {
                    log::warn!("{}: upstream reported: {}", label, text.trim());
                }
                match parse_telemetry(text) {
                    Ok(Some(frame)) => sender.publish(frame),
                    Ok(None) => {}
                    Err(e) => log::warn!("{}: dropping malformed datagram: {}", label, e),
                }
            }
            Err(e) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => continue,
            Err(e) => {
                if flag.is_running() {
                    log::error!("{}: receive error: {}", label, e);
                }
                break;
            }
        }
    }
    log::info!("{}: receiver stopped", label);
}
