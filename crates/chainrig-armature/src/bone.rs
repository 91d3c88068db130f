//! Bone records: edit-space data plus the pose-space sibling record.

use serde::{Deserialize, Serialize};

use crate::constraint::Constraint;
use crate::math::{bone_axes, BoneAxes, Vec3};
use crate::property::CustomProperty;
use crate::widget::WidgetAssignment;

fn default_true() -> bool {
    true
}

/// B-bone (curved bone) segment settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BBone {
    /// Number of curve segments (1 = straight bone).
    pub segments: u32,
    /// Ease in at the head.
    pub ease_in: f64,
    /// Ease out at the tail.
    pub ease_out: f64,
}

impl Default for BBone {
    fn default() -> Self {
        Self {
            segments: 1,
            ease_in: 1.0,
            ease_out: 1.0,
        }
    }
}

/// Rotation channel order used by a pose bone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RotationMode {
    #[default]
    Quaternion,
    Xyz,
    Xzy,
    Yxz,
    Yzx,
    Zxy,
    Zyx,
}

/// Per-axis transform channel locks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChannelLocks {
    pub location: [bool; 3],
    pub rotation: [bool; 3],
    pub scale: [bool; 3],
}

/// IK solver settings on a pose bone.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IkSettings {
    /// Axes the IK solver may not rotate.
    pub lock: [bool; 3],
    /// Allowed IK stretch (0 = none).
    pub stretch: f64,
    /// Optional rotation limits per axis, radians.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit_z: Option<[f64; 2]>,
}

/// Pose-space sibling of a bone.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PoseBone {
    /// Ordered constraint stack; later entries blend over earlier ones.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub constraints: Vec<Constraint>,
    /// Custom scalar properties.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub properties: Vec<CustomProperty>,
    #[serde(default)]
    pub locks: ChannelLocks,
    #[serde(default)]
    pub rotation_mode: RotationMode,
    #[serde(default)]
    pub ik: IkSettings,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub widget: Option<WidgetAssignment>,
    /// Bone group (color theme) name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
}

impl PoseBone {
    /// Looks up a custom property by name.
    pub fn property(&self, name: &str) -> Option<&CustomProperty> {
        self.properties.iter().find(|p| p.name == name)
    }
}

/// A named bone of an armature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Bone {
    pub name: String,
    pub head: Vec3,
    pub tail: Vec3,
    #[serde(default)]
    pub roll: f64,
    /// Parent bone name (back-reference, never ownership).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    /// Head is locked to the parent's tail.
    #[serde(default)]
    pub connected: bool,
    #[serde(default = "default_true")]
    pub deform: bool,
    #[serde(default)]
    pub hide: bool,
    #[serde(default)]
    pub bbone: BBone,
    /// Bone collection the bone is displayed in.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection: Option<String>,
    /// Rig generator assigned to this bone by the artist.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rig_type: Option<String>,
    /// Raw generator parameters; interpreted by the rig.
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub rig_params: serde_json::Value,
    #[serde(default)]
    pub pose: PoseBone,
}

impl Bone {
    /// Creates a bone between two points.
    pub fn new(name: impl Into<String>, head: Vec3, tail: Vec3) -> Self {
        Self {
            name: name.into(),
            head,
            tail,
            roll: 0.0,
            parent: None,
            connected: false,
            deform: true,
            hide: false,
            bbone: BBone::default(),
            collection: None,
            rig_type: None,
            rig_params: serde_json::Value::Null,
            pose: PoseBone::default(),
        }
    }

    /// Sets the roll.
    pub fn with_roll(mut self, roll: f64) -> Self {
        self.roll = roll;
        self
    }

    /// Sets the parent and connection flag.
    pub fn with_parent(mut self, parent: impl Into<String>, connected: bool) -> Self {
        self.parent = Some(parent.into());
        self.connected = connected;
        self
    }

    /// Assigns a rig type.
    pub fn with_rig_type(mut self, rig_type: impl Into<String>) -> Self {
        self.rig_type = Some(rig_type.into());
        self
    }

    /// Sets the raw rig parameters.
    pub fn with_rig_params(mut self, params: serde_json::Value) -> Self {
        self.rig_params = params;
        self
    }

    /// Head-to-tail vector.
    pub fn vector(&self) -> Vec3 {
        self.tail - self.head
    }

    /// Distance from head to tail.
    pub fn length(&self) -> f64 {
        self.vector().norm()
    }

    /// Local axes derived from head, tail and roll.
    pub fn axes(&self) -> BoneAxes {
        bone_axes(&self.head, &self.tail, self.roll)
    }

    pub fn x_axis(&self) -> Vec3 {
        self.axes().x
    }

    pub fn y_axis(&self) -> Vec3 {
        self.axes().y
    }

    pub fn z_axis(&self) -> Vec3 {
        self.axes().z
    }

    /// Returns true if the artist assigned a rig type to this bone.
    pub fn has_rig_type(&self) -> bool {
        self.rig_type.as_deref().is_some_and(|t| !t.is_empty())
    }
}
