//! Scene registry and transform handles
//!
//! The rendering engine itself is an external collaborator: all it
//! consumes are Cartesian positions and Euler angles. This module holds
//! the minimal transform state the sync core drives, plus an explicit
//! name-to-handle registry populated once at startup so components never
//! re-query the world by string through a global lookup.

pub mod camera;
pub mod rotation;

use nalgebra::Vector3;
use std::collections::{HashMap, HashSet};

/// Position/orientation/scale state of one driven scene object.
#[derive(Debug, Clone, PartialEq)]
pub struct Transform {
    pub position: Vector3<f64>,
    /// Rotation about the vertical axis, degrees in `[0, 360)`.
    pub yaw_deg: f64,
    /// Elevation rotation, degrees.
    pub pitch_deg: f64,
    /// Accumulated rotation about the object's own vertical axis
    /// (body day/night spin, gear cylinder spin).
    pub spin_deg: f64,
    pub scale: Vector3<f64>,
}

impl Transform {
    pub fn new() -> Self {
        Self {
            position: Vector3::zeros(),
            yaw_deg: 0.0,
            pitch_deg: 0.0,
            spin_deg: 0.0,
            scale: Vector3::new(1.0, 1.0, 1.0),
        }
    }

    /// Uniformly scaled transform at the origin.
    pub fn with_scale(scale: f64) -> Self {
        Self {
            scale: Vector3::new(scale, scale, scale),
            ..Self::new()
        }
    }

    /// Largest scale component, used as the body's visual radius.
    pub fn max_scale(&self) -> f64 {
        self.scale.x.max(self.scale.y).max(self.scale.z)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::new()
    }
}

struct Entry {
    display_name: String,
    transform: Transform,
}

/// Map from stable lower-cased object name to its transform.
///
/// Populated once at startup; lookups are case-insensitive and the
/// original display casing is retained for outbound messages.
#[derive(Default)]
pub struct SceneRegistry {
    entries: HashMap<String, Entry>,
}

impl SceneRegistry {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Register an object under its display name. A repeated name replaces
    /// the earlier registration.
    pub fn register(&mut self, display_name: &str, transform: Transform) {
        self.entries.insert(
            display_name.to_lowercase(),
            Entry {
                display_name: display_name.to_string(),
                transform,
            },
        );
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(&name.to_lowercase())
    }

    pub fn get(&self, name: &str) -> Option<&Transform> {
        self.entries.get(&name.to_lowercase()).map(|e| &e.transform)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Transform> {
        self.entries
            .get_mut(&name.to_lowercase())
            .map(|e| &mut e.transform)
    }

    /// Display casing as registered, for outbound selection messages.
    pub fn display_name(&self, name: &str) -> Option<&str> {
        self.entries
            .get(&name.to_lowercase())
            .map(|e| e.display_name.as_str())
    }

    pub fn position(&self, name: &str) -> Option<Vector3<f64>> {
        self.get(name).map(|t| t.position)
    }

    /// Snapshot of all known lower-cased names, captured at startup by the
    /// position feed to filter incoming records.
    pub fn known_names(&self) -> HashSet<String> {
        self.entries.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Capability of the status text widget: the sync core only ever pushes a
/// string at it.
pub trait StatusSink {
    fn display(&mut self, text: &str);
}

/// Recording sink for tests and headless runs.
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub messages: Vec<String>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last(&self) -> Option<&str> {
        self.messages.last().map(String::as_str)
    }
}

impl StatusSink for RecordingSink {
    fn display(&mut self, text: &str) {
        self.messages.push(text.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_is_case_insensitive() {
        let mut scene = SceneRegistry::new();
        scene.register("Mars", Transform::with_scale(2.0));

        assert!(scene.contains("mars"));
        assert!(scene.contains("MARS"));
        assert_eq!(scene.display_name("mars"), Some("Mars"));
        assert_eq!(scene.get("Mars").unwrap().max_scale(), 2.0);
    }

    #[test]
    fn test_known_names_are_lower_case() {
        let mut scene = SceneRegistry::new();
        scene.register("Earth", Transform::default());
        scene.register("Polaris", Transform::default());

        let names = scene.known_names();
        assert!(names.contains("earth"));
        assert!(names.contains("polaris"));
        assert_eq!(names.len(), 2);
    }

    #[test]
    fn test_get_mut_updates_in_place() {
        let mut scene = SceneRegistry::new();
        scene.register("Earth", Transform::default());
        scene.get_mut("earth").unwrap().position = Vector3::new(1.0, 2.0, 3.0);
        assert_eq!(scene.position("earth"), Some(Vector3::new(1.0, 2.0, 3.0)));
    }

    #[test]
    fn test_missing_object_is_none() {
        let scene = SceneRegistry::new();
        assert!(scene.get("nothing").is_none());
        assert!(scene.is_empty());
    }
}
