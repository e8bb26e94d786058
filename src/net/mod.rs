//! Network layer: inbound receivers and the outbound selection uplink
//!
//! Each inbound channel gets a dedicated thread doing blocking I/O in a
//! loop; decoded values cross to the frame loop through latest-value
//! cells. Socket read timeouts are the cancellation points for the
//! process-wide run flag.

pub mod error;
pub mod framing;
pub mod position_feed;
pub mod telemetry;
pub mod uplink;

pub use error::{NetError, NetResult};
pub use framing::LineDecoder;
pub use position_feed::{parse_position_record, run_position_feed};
pub use telemetry::{parse_telemetry, run_telemetry_receiver, TelemetryParseError};
pub use uplink::SelectionUplink;
