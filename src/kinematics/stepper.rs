//! Stepper-equivalent step and turn arithmetic
//!
//! The mount is driven by continuous angles; step and turn counts are
//! derived purely for the operator readout, reporting how far the real
//! stepper motor would have to move to reach the target.

/// Mechanical constants of the simulated stepper drive train.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepperProfile {
    pub steps_per_revolution: f64,
    pub gear_ratio: f64,
    pub microstepping: f64,
}

impl StepperProfile {
    pub fn new(steps_per_revolution: f64, gear_ratio: f64, microstepping: f64) -> Self {
        Self {
            steps_per_revolution,
            gear_ratio,
            microstepping,
        }
    }

    /// Microsteps equivalent to an angular distance. Sign-insensitive.
    pub fn steps_for(&self, angular_distance_deg: f64) -> f64 {
        angular_distance_deg.abs() * self.steps_per_revolution * self.gear_ratio
            * self.microstepping
            / 360.0
    }

    /// Full motor turns equivalent to a step count.
    pub fn turns_for(&self, steps: f64) -> f64 {
        steps / (self.steps_per_revolution * self.microstepping)
    }
}

impl Default for StepperProfile {
    fn default() -> Self {
        Self {
            steps_per_revolution: 200.0,
            gear_ratio: 10.0,
            microstepping: 16.0,
        }
    }
}
