//! Angle/step kinematics for the telescope mount

pub mod angles;
pub mod mount;
pub mod stepper;

pub use angles::{delta_angle, move_towards_angle, normalize_deg};
pub use mount::MountDriver;
pub use stepper::StepperProfile;
