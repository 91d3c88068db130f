//! Widget shapes for control bone visualization.
//!
//! Shape creation is owned by the host; the graph only records which named
//! shape a bone displays and at what scale.

use serde::{Deserialize, Serialize};

/// Widget shapes assigned to control bones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WidgetShape {
    /// Wire circle (rotation controls, eye masters).
    #[default]
    Circle,
    /// Wire sphere (tweaks, lid controls, pole targets).
    Sphere,
    /// Wire cube (position controls).
    Cube,
    /// Single eye target.
    Eye,
    /// Shared target for an eye pair.
    Eyes,
    /// Long limb segment (FK controls).
    Limb,
    /// Arrow along the bone (IK limb controls).
    IkArrow,
    /// Hand IK control.
    Hand,
    /// Foot IK control.
    Foot,
    /// Ball-and-socket (heel roll).
    BallSocket,
    /// Gear (limb parent settings control).
    Gear,
}

impl WidgetShape {
    /// Returns the host object name for this shape.
    pub fn object_name(&self) -> &'static str {
        match self {
            WidgetShape::Circle => "WGT_circle",
            WidgetShape::Sphere => "WGT_sphere",
            WidgetShape::Cube => "WGT_cube",
            WidgetShape::Eye => "WGT_eye",
            WidgetShape::Eyes => "WGT_eyes",
            WidgetShape::Limb => "WGT_limb",
            WidgetShape::IkArrow => "WGT_ikarrow",
            WidgetShape::Hand => "WGT_hand",
            WidgetShape::Foot => "WGT_foot",
            WidgetShape::BallSocket => "WGT_ballsocket",
            WidgetShape::Gear => "WGT_gear",
        }
    }
}

/// A widget assigned to a pose bone.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WidgetAssignment {
    pub shape: WidgetShape,
    /// Display scale relative to bone length.
    #[serde(default = "default_size")]
    pub size: f64,
}

fn default_size() -> f64 {
    1.0
}

impl WidgetAssignment {
    pub fn new(shape: WidgetShape, size: f64) -> Self {
        Self { shape, size }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_names() {
        assert_eq!(WidgetShape::Eyes.object_name(), "WGT_eyes");
        assert_eq!(WidgetShape::default(), WidgetShape::Circle);
    }

    #[test]
    fn test_assignment_serde_default_size() {
        let w: WidgetAssignment = serde_json::from_str(r#"{"shape":"ball_socket"}"#).unwrap();
        assert_eq!(w, WidgetAssignment::new(WidgetShape::BallSocket, 1.0));
    }
}
