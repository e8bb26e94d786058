//! Tracking camera and target selection protocol
//!
//! Two states: idle (no target) and tracking. A selection event resolves
//! the name through the registry, recomputes the stand-off point on the
//! line from the reference site through the target, and reports the
//! selection upstream. While tracking with valid telemetry the camera
//! eases toward the stand-off point and keeps facing the target's live
//! position, so it follows a moving body.

use crate::core::TelemetryFrame;
use crate::kinematics::angles::normalize_deg;
use crate::net::uplink::SelectionUplink;
use crate::scene::{SceneRegistry, Transform};
use crate::utils::config::CameraConfig;
use nalgebra::Vector3;

/// Hook invoked when a selection fails to resolve to a scene object.
pub type UnresolvedHook = Box<dyn Fn(&str) + Send>;

/// Frame-loop camera controller.
pub struct CameraFollower {
    camera_name: String,
    reference_body: String,
    follow_rate: f64,
    standoff_factor: f64,
    /// Lower-cased registry key of the tracked target, if any. The name is
    /// re-resolved every frame; a handle is never cached across frames.
    target: Option<String>,
    standoff_point: Vector3<f64>,
    /// Latched from the camera telemetry channel; motion is gated on it.
    telemetry_valid: bool,
    on_unresolved: Option<UnresolvedHook>,
}

impl CameraFollower {
    pub fn new(config: &CameraConfig, reference_body: &str) -> Self {
        Self {
            camera_name: config.camera_name.clone(),
            reference_body: reference_body.to_lowercase(),
            follow_rate: config.follow_rate,
            standoff_factor: config.standoff_factor,
            target: None,
            standoff_point: Vector3::zeros(),
            telemetry_valid: false,
            on_unresolved: None,
        }
    }

    /// Install an observer for selections that resolve to nothing. The
    /// selection itself stays a silent no-op either way.
    pub fn set_unresolved_hook(&mut self, hook: UnresolvedHook) {
        self.on_unresolved = Some(hook);
    }

    pub fn is_tracking(&self) -> bool {
        self.target.is_some()
    }

    pub fn target(&self) -> Option<&str> {
        self.target.as_deref()
    }

    pub fn standoff_point(&self) -> Vector3<f64> {
        self.standoff_point
    }

    /// Handle a selection event.
    ///
    /// An unknown name leaves the previous state untouched. A resolved
    /// name switches tracking to it, drops the validity latch until fresh
    /// telemetry confirms the new target is observable, and sends the
    /// display name upstream.
    pub fn select(&mut self, scene: &SceneRegistry, name: &str, uplink: &SelectionUplink) {
        let key = name.trim().to_lowercase();
        if !scene.contains(&key) {
            log::debug!("selection '{}' does not resolve to a scene object", name);
            if let Some(hook) = &self.on_unresolved {
                hook(name);
            }
            return;
        }

        self.telemetry_valid = false;
        self.target = Some(key.clone());
        self.refresh_standoff(scene);

        let display = scene.display_name(&key).unwrap_or(name);
        if let Err(e) = uplink.send_selection(display) {
            log::warn!("selection uplink: {}", e);
        }
    }

    /// Latch the validity of the most recent camera telemetry frame.
    pub fn note_telemetry(&mut self, frame: &TelemetryFrame) {
        self.telemetry_valid = frame.valid;
    }

    /// Ease toward the stand-off point and face the target. Holds still
    /// while idle, while telemetry is invalid, or while the target name no
    /// longer resolves (stale selection after a scene change).
    pub fn update(&mut self, scene: &mut SceneRegistry, dt_seconds: f64) {
        let Some(target_key) = self.target.clone() else {
            return;
        };
        if !self.telemetry_valid {
            return;
        }
        let Some(target_pos) = scene.position(&target_key) else {
            return;
        };

        let blend = (dt_seconds * self.follow_rate).clamp(0.0, 1.0);
        let standoff = self.standoff_point;
        let Some(camera) = scene.get_mut(&self.camera_name) else {
            return;
        };
        camera.position += (standoff - camera.position) * blend;
        look_at(camera, target_pos);
    }

    /// Recompute the stand-off point and snap straight to it, bypassing
    /// interpolation. Used for manual re-centering.
    pub fn teleport(&mut self, scene: &mut SceneRegistry) {
        let Some(target_key) = self.target.clone() else {
            return;
        };
        self.refresh_standoff(scene);
        let Some(target_pos) = scene.position(&target_key) else {
            return;
        };
        let standoff = self.standoff_point;
        let Some(camera) = scene.get_mut(&self.camera_name) else {
            return;
        };
        camera.position = standoff;
        look_at(camera, target_pos);
    }

    /// Stand-off point: back off from the target along the line from the
    /// reference site through it, by the target's visual radius times the
    /// configured factor. A degenerate direction (target sitting on the
    /// reference point) keeps the previous stand-off point.
    fn refresh_standoff(&mut self, scene: &SceneRegistry) {
        let Some(target_key) = &self.target else {
            return;
        };
        let Some(target) = scene.get(target_key) else {
            return;
        };
        let Some(reference_pos) = scene.position(&self.reference_body) else {
            return;
        };
        let Some(direction) = (target.position - reference_pos).try_normalize(1e-9) else {
            return;
        };
        self.standoff_point =
            target.position - direction * target.max_scale() * self.standoff_factor;
    }
}

/// Point the camera's forward axis at `target`: yaw about the vertical,
/// then pitch; roll stays zero.
fn look_at(camera: &mut Transform, target: Vector3<f64>) {
    let dir = target - camera.position;
    let horizontal = (dir.x * dir.x + dir.z * dir.z).sqrt();
    if horizontal < 1e-12 && dir.y.abs() < 1e-12 {
        return;
    }
    camera.yaw_deg = normalize_deg(dir.x.atan2(dir.z).to_degrees());
    camera.pitch_deg = dir.y.atan2(horizontal).to_degrees();
}
