//! Axial body rotation
//!
//! Each body spins about its own vertical axis at a rate derived from its
//! real-world rotation period and the simulation's time compression. This
//! runs independently of all network state and has no failure modes.

use crate::kinematics::angles::normalize_deg;
use crate::scene::SceneRegistry;
use serde::{Deserialize, Serialize};

/// Per-body rotation parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BodySpin {
    /// Registry name of the spun body.
    pub body: String,
    /// Real-world rotation period, hours.
    pub period_hours: f64,
    /// Spin direction; retrograde bodies (Venus, Uranus) turn backwards.
    #[serde(default)]
    pub retrograde: bool,
}

impl BodySpin {
    pub fn new(body: impl Into<String>, period_hours: f64, retrograde: bool) -> Self {
        Self {
            body: body.into(),
            period_hours,
            retrograde,
        }
    }

    /// Degrees of spin accumulated over `dt_seconds` of real time, with
    /// `sim_hours_per_real_second` compressing real seconds into simulated
    /// hours.
    pub fn degrees_for(&self, sim_hours_per_real_second: f64, dt_seconds: f64) -> f64 {
        let direction = if self.retrograde { -1.0 } else { 1.0 };
        360.0 / self.period_hours * sim_hours_per_real_second * dt_seconds * direction
    }

    /// Apply this frame's spin to the body's transform. A body missing
    /// from the registry is a no-op.
    pub fn step(&self, scene: &mut SceneRegistry, sim_hours_per_real_second: f64, dt_seconds: f64) {
        if let Some(transform) = scene.get_mut(&self.body) {
            transform.spin_deg = normalize_deg(
                transform.spin_deg + self.degrees_for(sim_hours_per_real_second, dt_seconds),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::Transform;

    #[test]
    fn test_earth_day_rate() {
        let spin = BodySpin::new("earth", 24.0, false);
        // 0.05 simulated hours per real second over one second.
        let degrees = spin.degrees_for(0.05, 1.0);
        assert!((degrees - 0.75).abs() < 1e-12);
    }

    #[test]
    fn test_retrograde_reverses_direction() {
        let prograde = BodySpin::new("earth", 24.0, false);
        let retrograde = BodySpin::new("venus", 24.0, true);
        assert_eq!(
            prograde.degrees_for(0.05, 1.0),
            -retrograde.degrees_for(0.05, 1.0)
        );
    }

    #[test]
    fn test_spin_accumulates_and_wraps() {
        let mut scene = SceneRegistry::new();
        scene.register("Earth", Transform::default());
        let spin = BodySpin::new("earth", 1.0, false);

        // 360°/hour at 1 sim-hour per real second: half a turn per half second.
        spin.step(&mut scene, 1.0, 0.5);
        assert!((scene.get("earth").unwrap().spin_deg - 180.0).abs() < 1e-9);
        spin.step(&mut scene, 1.0, 0.75);
        assert!((scene.get("earth").unwrap().spin_deg - 90.0).abs() < 1e-9);
    }

    #[test]
    fn test_unknown_body_is_a_no_op() {
        let mut scene = SceneRegistry::new();
        let spin = BodySpin::new("phantom", 24.0, false);
        spin.step(&mut scene, 0.05, 1.0);
        assert!(scene.is_empty());
    }
}
