//! Core data model shared between receiver threads and the frame loop

pub mod constants;
pub mod types;

pub use types::{PositionSnapshot, TelemetryFrame};
