//! Telescope Visualization Sync Core
//!
//! Ingests the state of a live astronomical simulation over the network
//! (a stream of planetary positions plus azimuth/altitude pointing
//! telemetry) and drives frame-by-frame motion of on-screen objects: the
//! planets, a telescope mount with decorative gear cylinders, and a
//! tracking camera. Receivers run on background threads and hand the
//! latest state to a non-blocking per-frame consumer; selections flow back
//! upstream as raw datagrams.

pub mod core;
pub mod kinematics;
pub mod net;
pub mod runtime;
pub mod scene;
pub mod sync;
pub mod utils;

// Re-export commonly used types
pub use crate::core::{PositionSnapshot, TelemetryFrame};
pub use crate::kinematics::angles::{delta_angle, move_towards_angle, normalize_deg};
pub use crate::kinematics::mount::MountDriver;
pub use crate::kinematics::stepper::StepperProfile;
pub use crate::net::framing::LineDecoder;
pub use crate::net::uplink::SelectionUplink;
pub use crate::net::{NetError, NetResult};
pub use crate::runtime::Subsystem;
pub use crate::scene::camera::CameraFollower;
pub use crate::scene::rotation::BodySpin;
pub use crate::scene::{RecordingSink, SceneRegistry, StatusSink, Transform};
pub use crate::utils::config::{ConfigError, SystemConfig};
