//! Mount motion driver
//!
//! Runs once per frame on the consumer side. Slews the telescope body
//! toward the latest telemetry target along the shortest angular path at a
//! capped rate, spins the decorative gear cylinders while an axis is
//! actually moving, and produces the operator status readout. While
//! telemetry is invalid the mount holds its last angle and the readout
//! shows the upstream message instead.

use crate::core::constants::WAITING_FOR_TELEMETRY;
use crate::core::TelemetryFrame;
use crate::kinematics::angles::{delta_angle, move_towards_angle, normalize_deg};
use crate::kinematics::stepper::StepperProfile;
use crate::scene::SceneRegistry;
use crate::utils::config::KinematicsConfig;

/// Per-frame mount driver. Owns the previous-frame angles; never touched
/// by receiver threads.
pub struct MountDriver {
    profile: StepperProfile,
    slew_rate_deg_per_sec: f64,
    cylinder_spin_deg_per_sec: f64,
    spin_deadband_deg: f64,
    mount_body: String,
    azimuth_cylinder: String,
    altitude_cylinder: String,
    prev_azimuth_deg: f64,
    prev_altitude_deg: f64,
}

impl MountDriver {
    /// Previous angles start at the mount's current orientation so the
    /// first frame does not register a phantom delta.
    pub fn new(config: &KinematicsConfig, scene: &SceneRegistry) -> Self {
        let (prev_azimuth_deg, prev_altitude_deg) = scene
            .get(&config.mount_body)
            .map(|t| (t.yaw_deg, t.pitch_deg))
            .unwrap_or((0.0, 0.0));

        Self {
            profile: StepperProfile::new(
                config.steps_per_revolution,
                config.gear_ratio,
                config.microstepping,
            ),
            slew_rate_deg_per_sec: config.slew_rate_deg_per_sec,
            cylinder_spin_deg_per_sec: config.cylinder_spin_deg_per_sec,
            spin_deadband_deg: config.spin_deadband_deg,
            mount_body: config.mount_body.clone(),
            azimuth_cylinder: config.azimuth_cylinder.clone(),
            altitude_cylinder: config.altitude_cylinder.clone(),
            prev_azimuth_deg,
            prev_altitude_deg,
        }
    }

    /// Advance one frame and return the status readout.
    pub fn update(
        &mut self,
        scene: &mut SceneRegistry,
        telemetry: &TelemetryFrame,
        dt_seconds: f64,
    ) -> String {
        if !telemetry.valid {
            // Hold position; stale angles must not move the mount.
            return telemetry
                .error
                .clone()
                .unwrap_or_else(|| WAITING_FOR_TELEMETRY.to_string());
        }

        let target_az = telemetry.azimuth_deg;
        let target_alt = telemetry.altitude_deg;
        let max_step = self.slew_rate_deg_per_sec * dt_seconds;

        let (new_az, new_alt, az_steps, alt_steps) = {
            let Some(body) = scene.get_mut(&self.mount_body) else {
                return String::new();
            };

            // Remaining stepper travel is reported from the pre-slew angle.
            let az_steps = self.profile.steps_for(delta_angle(body.yaw_deg, target_az));
            let alt_steps = self
                .profile
                .steps_for(delta_angle(body.pitch_deg, target_alt));

            body.yaw_deg = move_towards_angle(body.yaw_deg, target_az, max_step);
            body.pitch_deg = move_towards_angle(body.pitch_deg, target_alt, max_step);
            (body.yaw_deg, body.pitch_deg, az_steps, alt_steps)
        };

        let az_delta = delta_angle(self.prev_azimuth_deg, new_az);
        let alt_delta = delta_angle(self.prev_altitude_deg, new_alt);
        self.spin_cylinder_for(scene, az_delta, dt_seconds, true);
        self.spin_cylinder_for(scene, alt_delta, dt_seconds, false);

        self.prev_azimuth_deg = new_az;
        self.prev_altitude_deg = new_alt;

        let az_turns = self.profile.turns_for(az_steps);
        let alt_turns = self.profile.turns_for(alt_steps);
        format!(
            "Azimuth: {:.1}° → {:.1}° | {:.0} steps ({:.2} turns)\n\
             Altitude: {:.1}° → {:.1}° | {:.0} steps ({:.2} turns)",
            new_az, target_az, az_steps, az_turns, new_alt, target_alt, alt_steps, alt_turns
        )
    }

    /// Spin one gear cylinder if its axis moved past the dead-band this
    /// frame. Direction follows the sign of the motion; speed is fixed.
    fn spin_cylinder_for(
        &self,
        scene: &mut SceneRegistry,
        axis_delta: f64,
        dt_seconds: f64,
        azimuth: bool,
    ) {
        if axis_delta.abs() <= self.spin_deadband_deg {
            return;
        }
        let name = if azimuth {
            &self.azimuth_cylinder
        } else {
            &self.altitude_cylinder
        };
        if let Some(cylinder) = scene.get_mut(name) {
            cylinder.spin_deg = normalize_deg(
                cylinder.spin_deg
                    + axis_delta.signum() * self.cylinder_spin_deg_per_sec * dt_seconds,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::constants::TARGET_NOT_OBSERVABLE;
    use crate::scene::Transform;

    fn test_scene() -> SceneRegistry {
        let mut scene = SceneRegistry::new();
        scene.register("telescope", Transform::default());
        scene.register("azimuth_cylinder", Transform::default());
        scene.register("altitude_cylinder", Transform::default());
        scene
    }

    fn driver(scene: &SceneRegistry) -> MountDriver {
        MountDriver::new(&KinematicsConfig::default(), scene)
    }

    #[test]
    fn test_invalid_telemetry_freezes_the_mount() {
        let mut scene = test_scene();
        scene.get_mut("telescope").unwrap().yaw_deg = 120.0;
        let mut driver = driver(&scene);

        // A stale pointing target is in the frame, but validity is off.
        let frame = TelemetryFrame {
            azimuth_deg: 200.0,
            altitude_deg: 40.0,
            valid: false,
            error: Some(TARGET_NOT_OBSERVABLE.to_string()),
        };
        let status = driver.update(&mut scene, &frame, 0.1);

        assert_eq!(scene.get("telescope").unwrap().yaw_deg, 120.0);
        assert_eq!(status, TARGET_NOT_OBSERVABLE);
    }

    #[test]
    fn test_startup_without_telemetry_shows_waiting_text() {
        let mut scene = test_scene();
        let mut driver = driver(&scene);
        let status = driver.update(&mut scene, &TelemetryFrame::default(), 0.1);
        assert_eq!(status, WAITING_FOR_TELEMETRY);
    }

    #[test]
    fn test_motion_resumes_after_error_clears() {
        let mut scene = test_scene();
        let mut driver = driver(&scene);

        driver.update(&mut scene, &TelemetryFrame::fault(TARGET_NOT_OBSERVABLE), 0.1);
        assert_eq!(scene.get("telescope").unwrap().yaw_deg, 0.0);

        driver.update(&mut scene, &TelemetryFrame::pointing(10.0, 5.0), 0.1);
        // 30°/s for 0.1 s.
        assert!((scene.get("telescope").unwrap().yaw_deg - 3.0).abs() < 1e-9);
        assert!((scene.get("telescope").unwrap().pitch_deg - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_convergence_is_monotonic_without_overshoot() {
        let mut scene = test_scene();
        let mut driver = driver(&scene);
        let frame = TelemetryFrame::pointing(45.0, 30.0);

        let mut remaining_az = 45.0;
        for _ in 0..40 {
            driver.update(&mut scene, &frame, 0.1);
            let yaw = scene.get("telescope").unwrap().yaw_deg;
            let next_remaining = delta_angle(yaw, 45.0).abs();
            assert!(next_remaining <= remaining_az + 1e-9);
            assert!(yaw <= 45.0 + 1e-9);
            remaining_az = next_remaining;
        }
        assert!((scene.get("telescope").unwrap().yaw_deg - 45.0).abs() < 1e-9);
        assert!((scene.get("telescope").unwrap().pitch_deg - 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_slew_takes_the_short_way_through_north() {
        let mut scene = test_scene();
        scene.get_mut("telescope").unwrap().yaw_deg = 350.0;
        let mut driver = driver(&scene);

        driver.update(&mut scene, &TelemetryFrame::pointing(10.0, 0.0), 0.1);
        // +3° through 0°, never -340° the long way.
        assert!((scene.get("telescope").unwrap().yaw_deg - 353.0).abs() < 1e-9);

        for _ in 0..10 {
            driver.update(&mut scene, &TelemetryFrame::pointing(10.0, 0.0), 0.1);
        }
        assert!((scene.get("telescope").unwrap().yaw_deg - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_status_reports_steps_and_turns() {
        let mut scene = test_scene();
        let mut driver = driver(&scene);

        // 90° of azimuth travel: 90*200*10*16/360 = 8000 steps, 2.5 turns.
        let status = driver.update(&mut scene, &TelemetryFrame::pointing(90.0, 0.0), 0.1);
        assert!(status.contains("8000 steps"), "status was: {}", status);
        assert!(status.contains("(2.50 turns)"), "status was: {}", status);
        assert!(status.contains("Azimuth: 3.0° → 90.0°"), "status was: {}", status);
    }

    #[test]
    fn test_deadband_gates_the_cylinder_spin() {
        let mut scene = test_scene();
        let mut driver = driver(&scene);

        // 0.005° of motion in one frame: below the 0.01° dead-band.
        driver.update(&mut scene, &TelemetryFrame::pointing(0.005, 0.0), 1.0);
        assert_eq!(scene.get("azimuth_cylinder").unwrap().spin_deg, 0.0);

        // 0.02° of motion: cylinder spins at the fixed rate.
        driver.update(&mut scene, &TelemetryFrame::pointing(0.025, 0.0), 1.0);
        let spin = scene.get("azimuth_cylinder").unwrap().spin_deg;
        assert!(spin > 0.0, "cylinder did not spin, spin_deg = {}", spin);
        // Altitude never moved, so its cylinder stays still.
        assert_eq!(scene.get("altitude_cylinder").unwrap().spin_deg, 0.0);
    }

    #[test]
    fn test_cylinder_spin_direction_follows_motion_sign() {
        let mut scene = test_scene();
        scene.get_mut("telescope").unwrap().yaw_deg = 10.0;
        let mut driver = driver(&scene);

        // Slewing downward: negative delta, cylinder spins backwards.
        driver.update(&mut scene, &TelemetryFrame::pointing(5.0, 0.0), 0.1);
        let spin = scene.get("azimuth_cylinder").unwrap().spin_deg;
        // 500°/s * 0.1 s backwards, wrapped into [0, 360).
        assert!((spin - 310.0).abs() < 1e-9, "spin_deg = {}", spin);
    }
}
