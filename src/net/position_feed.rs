//! Position feed receiver
//!
//! Consumes newline-delimited JSON records from the ephemeris producer and
//! publishes one [`PositionSnapshot`] per fully-parsed record. Body names
//! are matched case-insensitively against the set of scene objects known
//! at startup; anything else in a record is skipped silently so newer
//! producers can send extra bodies without breaking older scenes.

use crate::core::PositionSnapshot;
use crate::net::framing::LineDecoder;
use crate::sync::{LatestSender, RunFlag};
use nalgebra::Vector3;
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::io::{ErrorKind, Read};
use std::net::TcpStream;
use std::time::Duration;

/// Wire shape of one feed record.
#[derive(Debug, Deserialize)]
struct FeedRecord {
    #[serde(default)]
    timestamp_utc: Option<String>,
    positions: HashMap<String, FeedCoord>,
}

#[derive(Debug, Deserialize)]
struct FeedCoord {
    x: f64,
    y: f64,
    z: f64,
}

/// Parse one feed record into a snapshot.
///
/// Coordinates are scaled from simulation units into render units by
/// `scale`; keys are canonicalized to lower case. Unknown bodies are
/// dropped, malformed JSON or missing coordinate fields fail the whole
/// record.
pub fn parse_position_record(
    text: &str,
    scale: f64,
    known: &HashSet<String>,
) -> Result<PositionSnapshot, serde_json::Error> {
    let record: FeedRecord = serde_json::from_str(text)?;

    let mut bodies = HashMap::new();
    for (name, coord) in record.positions {
        let key = name.to_lowercase();
        if !known.contains(&key) {
            continue;
        }
        bodies.insert(
            key,
            Vector3::new(coord.x * scale, coord.y * scale, coord.z * scale),
        );
    }

    Ok(PositionSnapshot {
        timestamp_utc: record.timestamp_utc,
        bodies,
    })
}

/// Body of the position feed receiver thread.
///
/// Connects to the producer, then loops on blocking reads until the run
/// flag drops or the connection dies. The read timeout only exists so the
/// loop can observe the flag; a timed-out read is not an error. A record
/// that fails to parse is logged and dropped, the connection stays up.
pub fn run_position_feed(
    endpoint: String,
    scale: f64,
    known: HashSet<String>,
    read_timeout: Duration,
    sender: LatestSender<PositionSnapshot>,
    flag: RunFlag,
) {
    let mut stream = match TcpStream::connect(&endpoint) {
        Ok(stream) => stream,
        Err(e) => {
            log::error!("position feed: connect to {} failed: {}", endpoint, e);
            return;
        }
    };
    if let Err(e) = stream.set_read_timeout(Some(read_timeout)) {
        log::error!("position feed: setting read timeout failed: {}", e);
        return;
    }
    log::info!("position feed: connected to {}", endpoint);

    let mut decoder = LineDecoder::new();
    let mut buf = [0u8; 4096];
    while flag.is_running() {
        match stream.read(&mut buf) {
            Ok(0) => {
                log::info!("position feed: producer closed the connection");
                break;
            }
            Ok(n) => {
                for record in decoder.feed(&buf[..n]) {
                    match parse_position_record(&record, scale, &known) {
                        Ok(snapshot) => sender.publish(snapshot),
                        Err(e) => log::warn!("position feed: dropping malformed record: {}", e),
                    }
                }
            }
            Err(e) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => continue,
            Err(e) => {
                if flag.is_running() {
                    log::error!("position feed: read error: {}", e);
                }
                break;
            }
        }
    }
    log::info!("position feed: receiver stopped");
}
