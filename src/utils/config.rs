//! System configuration
//!
//! Every tunable the sync core consumes lives here: upstream endpoints and
//! ports, the render scale applied to incoming positions, stepper drive
//! constants, motion and camera interpolation speeds, and per-body
//! rotation parameters. Defaults reproduce the reference deployment; a
//! JSON file can override any section.

use crate::scene::rotation::BodySpin;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;

/// Top-level configuration for the whole subsystem.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemConfig {
    pub network: NetworkConfig,
    pub feed: FeedConfig,
    pub kinematics: KinematicsConfig,
    pub camera: CameraConfig,
    pub rotation: RotationConfig,
}

/// Upstream endpoints and socket behavior.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Host of the upstream simulation process.
    pub host: String,
    /// Stream port serving position-feed records.
    pub position_port: u16,
    /// Datagram port carrying mount pointing telemetry.
    pub mount_telemetry_port: u16,
    /// Datagram port carrying camera target-reachability telemetry.
    pub camera_telemetry_port: u16,
    /// Datagram port selections are sent to.
    pub selection_port: u16,
    /// Receive timeout acting as the shutdown-flag check interval.
    pub read_timeout_ms: u64,
    /// Upper bound on waiting for a receiver thread at shutdown.
    pub join_timeout_ms: u64,
}

impl NetworkConfig {
    pub fn position_endpoint(&self) -> String {
        format!("{}:{}", self.host, self.position_port)
    }

    pub fn selection_endpoint(&self) -> String {
        format!("{}:{}", self.host, self.selection_port)
    }
}

/// Position feed interpretation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedConfig {
    /// Multiplier from simulation units to render units.
    pub position_scale: f64,
    /// Body the camera stand-off line is anchored at (the observer site).
    pub reference_body: String,
}

/// Stepper drive constants and mount motion tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KinematicsConfig {
    pub steps_per_revolution: f64,
    pub gear_ratio: f64,
    pub microstepping: f64,
    /// Maximum slew rate of the mount, degrees per second.
    pub slew_rate_deg_per_sec: f64,
    /// Fixed spin rate of the decorative gear cylinders.
    pub cylinder_spin_deg_per_sec: f64,
    /// Per-frame angular delta below which the cylinders stay still.
    pub spin_deadband_deg: f64,
    /// Registry names of the driven transforms.
    pub mount_body: String,
    pub azimuth_cylinder: String,
    pub altitude_cylinder: String,
}

/// Tracking camera tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraConfig {
    pub camera_name: String,
    /// Interpolation rate toward the stand-off point, per second.
    pub follow_rate: f64,
    /// Stand-off distance as a multiple of the target's visual radius.
    pub standoff_factor: f64,
}

/// Body rotation simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RotationConfig {
    /// Simulated hours elapsing per real second.
    pub sim_hours_per_real_second: f64,
    pub bodies: Vec<BodySpin>,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            network: NetworkConfig::default(),
            feed: FeedConfig::default(),
            kinematics: KinematicsConfig::default(),
            camera: CameraConfig::default(),
            rotation: RotationConfig::default(),
        }
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            position_port: 65432,
            mount_telemetry_port: 5006,
            camera_telemetry_port: 5008,
            selection_port: 5005,
            read_timeout_ms: 250,
            join_timeout_ms: 500,
        }
    }
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            position_scale: 10.0,
            reference_body: "ankara".to_string(),
        }
    }
}

impl Default for KinematicsConfig {
    fn default() -> Self {
        Self {
            steps_per_revolution: 200.0,
            gear_ratio: 10.0,
            microstepping: 16.0,
            slew_rate_deg_per_sec: 30.0,
            cylinder_spin_deg_per_sec: 500.0,
            spin_deadband_deg: 0.01,
            mount_body: "telescope".to_string(),
            azimuth_cylinder: "azimuth_cylinder".to_string(),
            altitude_cylinder: "altitude_cylinder".to_string(),
        }
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            camera_name: "telescope_camera".to_string(),
            follow_rate: 2.0,
            standoff_factor: 4.0,
        }
    }
}

impl Default for RotationConfig {
    fn default() -> Self {
        Self {
            // The reference deployment advances 0.005 simulated hours per
            // 0.1 real seconds.
            sim_hours_per_real_second: 0.05,
            bodies: vec![
                BodySpin::new("sun", 609.1, false),
                BodySpin::new("mercury", 1407.6, false),
                BodySpin::new("venus", 5832.5, true),
                BodySpin::new("earth", 23.9, false),
                BodySpin::new("moon", 655.7, false),
                BodySpin::new("mars", 24.6, false),
                BodySpin::new("jupiter", 9.9, false),
                BodySpin::new("saturn", 10.7, false),
                BodySpin::new("uranus", 17.2, true),
                BodySpin::new("neptune", 16.1, false),
            ],
        }
    }
}

/// Configuration errors.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// A parameter value fails validation.
    InvalidParameter {
        parameter: String,
        value: String,
        reason: String,
    },
    /// Configuration file I/O error.
    Io { message: String },
    /// JSON serialization/deserialization error.
    Serialization { message: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidParameter {
                parameter,
                value,
                reason,
            } => write!(f, "invalid parameter '{}' = '{}': {}", parameter, value, reason),
            ConfigError::Io { message } => write!(f, "I/O error: {}", message),
            ConfigError::Serialization { message } => {
                write!(f, "serialization error: {}", message)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

fn invalid(parameter: &str, value: impl fmt::Display, reason: &str) -> ConfigError {
    ConfigError::InvalidParameter {
        parameter: parameter.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

impl SystemConfig {
    /// Load and validate a configuration file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path_str = path.as_ref().to_string_lossy().to_string();
        let content = fs::read_to_string(&path).map_err(|e| ConfigError::Io {
            message: format!("failed to read config file '{}': {}", path_str, e),
        })?;
        let config: SystemConfig =
            serde_json::from_str(&content).map_err(|e| ConfigError::Serialization {
                message: format!("failed to parse config file '{}': {}", path_str, e),
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Write the configuration as pretty-printed JSON.
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let path_str = path.as_ref().to_string_lossy().to_string();
        let content =
            serde_json::to_string_pretty(self).map_err(|e| ConfigError::Serialization {
                message: format!("failed to serialize config: {}", e),
            })?;
        fs::write(&path, content).map_err(|e| ConfigError::Io {
            message: format!("failed to write config file '{}': {}", path_str, e),
        })
    }

    /// Validate the whole configuration, returning the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let net = &self.network;
        if net.host.is_empty() {
            return Err(invalid("network.host", "", "host must not be empty"));
        }
        for (name, port) in [
            ("network.position_port", net.position_port),
            ("network.mount_telemetry_port", net.mount_telemetry_port),
            ("network.camera_telemetry_port", net.camera_telemetry_port),
            ("network.selection_port", net.selection_port),
        ] {
            if port == 0 {
                return Err(invalid(name, port, "port must be non-zero"));
            }
        }
        if net.mount_telemetry_port == net.camera_telemetry_port {
            return Err(invalid(
                "network.camera_telemetry_port",
                net.camera_telemetry_port,
                "mount and camera telemetry ports must differ",
            ));
        }
        if net.read_timeout_ms == 0 {
            return Err(invalid(
                "network.read_timeout_ms",
                net.read_timeout_ms,
                "read timeout must be positive",
            ));
        }

        if self.feed.position_scale <= 0.0 {
            return Err(invalid(
                "feed.position_scale",
                self.feed.position_scale,
                "render scale must be positive",
            ));
        }
        if self.feed.reference_body.is_empty() {
            return Err(invalid(
                "feed.reference_body",
                "",
                "reference body must not be empty",
            ));
        }

        let kin = &self.kinematics;
        for (name, value) in [
            ("kinematics.steps_per_revolution", kin.steps_per_revolution),
            ("kinematics.gear_ratio", kin.gear_ratio),
            ("kinematics.microstepping", kin.microstepping),
            ("kinematics.slew_rate_deg_per_sec", kin.slew_rate_deg_per_sec),
            (
                "kinematics.cylinder_spin_deg_per_sec",
                kin.cylinder_spin_deg_per_sec,
            ),
        ] {
            if value <= 0.0 {
                return Err(invalid(name, value, "must be positive"));
            }
        }
        if kin.spin_deadband_deg < 0.0 {
            return Err(invalid(
                "kinematics.spin_deadband_deg",
                kin.spin_deadband_deg,
                "dead-band must not be negative",
            ));
        }
        for (name, value) in [
            ("kinematics.mount_body", &kin.mount_body),
            ("kinematics.azimuth_cylinder", &kin.azimuth_cylinder),
            ("kinematics.altitude_cylinder", &kin.altitude_cylinder),
            ("camera.camera_name", &self.camera.camera_name),
        ] {
            if value.is_empty() {
                return Err(invalid(name, "", "transform name must not be empty"));
            }
        }

        if self.camera.follow_rate <= 0.0 {
            return Err(invalid(
                "camera.follow_rate",
                self.camera.follow_rate,
                "follow rate must be positive",
            ));
        }
        if self.camera.standoff_factor <= 0.0 {
            return Err(invalid(
                "camera.standoff_factor",
                self.camera.standoff_factor,
                "stand-off factor must be positive",
            ));
        }

        if self.rotation.sim_hours_per_real_second <= 0.0 {
            return Err(invalid(
                "rotation.sim_hours_per_real_second",
                self.rotation.sim_hours_per_real_second,
                "time scale must be positive",
            ));
        }
        for body in &self.rotation.bodies {
            if body.body.is_empty() {
                return Err(invalid("rotation.bodies.body", "", "body name must not be empty"));
            }
            if body.period_hours <= 0.0 {
                return Err(invalid(
                    "rotation.bodies.period_hours",
                    body.period_hours,
                    "rotation period must be positive",
                ));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = SystemConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.network.position_endpoint(), "127.0.0.1:65432");
        assert_eq!(config.network.selection_endpoint(), "127.0.0.1:5005");
        assert_eq!(config.feed.position_scale, 10.0);
        assert_eq!(config.camera.standoff_factor, 4.0);
    }

    #[test]
    fn test_zero_port_is_rejected() {
        let mut config = SystemConfig::default();
        config.network.position_port = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_duplicate_telemetry_ports_are_rejected() {
        let mut config = SystemConfig::default();
        config.network.camera_telemetry_port = config.network.mount_telemetry_port;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_non_positive_scale_is_rejected() {
        let mut config = SystemConfig::default();
        config.feed.position_scale = 0.0;
        assert!(config.validate().is_err());
        config.feed.position_scale = -1.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_negative_deadband_is_rejected() {
        let mut config = SystemConfig::default();
        config.kinematics.spin_deadband_deg = -0.01;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_rotation_period_is_rejected() {
        let mut config = SystemConfig::default();
        config.rotation.bodies.push(BodySpin::new("pluto", 0.0, false));
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_file_round_trip() {
        let mut config = SystemConfig::default();
        config.network.host = "10.0.0.7".to_string();
        config.camera.follow_rate = 3.5;

        let path = std::env::temp_dir().join("skybridge_config_round_trip.json");
        config.save_to_file(&path).unwrap();
        let loaded = SystemConfig::load_from_file(&path).unwrap();
        let _ = fs::remove_file(&path);

        assert_eq!(loaded, config);
    }

    #[test]
    fn test_invalid_file_is_rejected_on_load() {
        let path = std::env::temp_dir().join("skybridge_config_invalid.json");
        fs::write(&path, "{\"network\": {}}").unwrap();
        let result = SystemConfig::load_from_file(&path);
        let _ = fs::remove_file(&path);
        assert!(matches!(result, Err(ConfigError::Serialization { .. })));
    }

    #[test]
    fn test_missing_file_is_an_io_error() {
        let result = SystemConfig::load_from_file("/nonexistent/skybridge.json");
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }
}
