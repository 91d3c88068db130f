//! Pose-bone constraint types.
//!
//! Constraints map onto the host's constraint system one-to-one. Each carries
//! the common header (target, influence, spaces, mute) plus a kind-specific
//! payload in [`ConstraintKind`].

use serde::{Deserialize, Serialize};

// =============================================================================
// Shared enums
// =============================================================================

/// Coordinate space a constraint reads or writes in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Space {
    #[default]
    World,
    Local,
    Pose,
}

impl Space {
    /// Returns the host enum name for this space.
    pub fn host_name(&self) -> &'static str {
        match self {
            Space::World => "WORLD",
            Space::Local => "LOCAL",
            Space::Pose => "POSE",
        }
    }
}

/// Axis a tracking constraint points along.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TrackAxis {
    #[serde(rename = "X")]
    X,
    #[default]
    #[serde(rename = "Y")]
    Y,
    #[serde(rename = "Z")]
    Z,
    #[serde(rename = "-X")]
    NegX,
    #[serde(rename = "-Y")]
    NegY,
    #[serde(rename = "-Z")]
    NegZ,
}

/// Per-axis flag triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AxisMask {
    pub x: bool,
    pub y: bool,
    pub z: bool,
}

impl AxisMask {
    pub const ALL: AxisMask = AxisMask {
        x: true,
        y: true,
        z: true,
    };
    pub const NONE: AxisMask = AxisMask {
        x: false,
        y: false,
        z: false,
    };

    pub fn only_x() -> Self {
        Self {
            x: true,
            ..Self::NONE
        }
    }

    pub fn only_y() -> Self {
        Self {
            y: true,
            ..Self::NONE
        }
    }
}

impl Default for AxisMask {
    fn default() -> Self {
        Self::ALL
    }
}

/// Min/max limit pair. `None` means the side is not limited.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Limit {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
}

impl Limit {
    pub fn range(min: f64, max: f64) -> Self {
        Self {
            min: Some(min),
            max: Some(max),
        }
    }
}

/// Volume handling for stretch-to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StretchVolume {
    #[default]
    VolumeXz,
    NoVolume,
}

/// Rotation plane kept by stretch-to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeepAxis {
    #[default]
    PlaneX,
    PlaneZ,
}

/// IK pole target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PoleTarget {
    pub bone: String,
    /// Pole angle in radians.
    pub angle: f64,
}

// =============================================================================
// Constraint
// =============================================================================

/// Constraint type tag, used for filtering stacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConstraintType {
    CopyLocation,
    CopyRotation,
    CopyScale,
    CopyTransforms,
    DampedTrack,
    StretchTo,
    LimitRotation,
    LimitScale,
    Ik,
}

/// Kind-specific constraint payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", deny_unknown_fields)]
pub enum ConstraintKind {
    CopyLocation {
        #[serde(default)]
        head_tail: f64,
        #[serde(default)]
        axes: AxisMask,
    },
    CopyRotation {
        #[serde(default)]
        axes: AxisMask,
        #[serde(default = "no_axes")]
        invert: AxisMask,
    },
    CopyScale {
        #[serde(default)]
        axes: AxisMask,
    },
    CopyTransforms {
        #[serde(default)]
        head_tail: f64,
    },
    DampedTrack {
        #[serde(default)]
        head_tail: f64,
        #[serde(default)]
        track: TrackAxis,
    },
    StretchTo {
        #[serde(default)]
        head_tail: f64,
        /// Rest length; 0 means "use the length at creation".
        #[serde(default)]
        rest_length: f64,
        #[serde(default)]
        volume: StretchVolume,
        #[serde(default)]
        keep_axis: KeepAxis,
    },
    LimitRotation {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        x: Option<Limit>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        y: Option<Limit>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        z: Option<Limit>,
    },
    LimitScale {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        x: Option<Limit>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        y: Option<Limit>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        z: Option<Limit>,
    },
    Ik {
        chain_count: u32,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pole: Option<PoleTarget>,
    },
}

fn no_axes() -> AxisMask {
    AxisMask::NONE
}

fn default_influence() -> f64 {
    1.0
}

/// A constraint on a pose bone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Constraint {
    /// Graph-assigned identifier, stable for the constraint's lifetime.
    #[serde(default)]
    pub id: u64,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    /// Target bone within the same armature.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    #[serde(default = "default_influence")]
    pub influence: f64,
    #[serde(default)]
    pub mute: bool,
    #[serde(default)]
    pub owner_space: Space,
    #[serde(default)]
    pub target_space: Space,
    pub kind: ConstraintKind,
}

impl Constraint {
    fn with_kind(target: Option<String>, kind: ConstraintKind) -> Self {
        Self {
            id: 0,
            name: String::new(),
            target,
            influence: 1.0,
            mute: false,
            owner_space: Space::World,
            target_space: Space::World,
            kind,
        }
    }

    pub fn copy_location(target: impl Into<String>) -> Self {
        Self::with_kind(
            Some(target.into()),
            ConstraintKind::CopyLocation {
                head_tail: 0.0,
                axes: AxisMask::ALL,
            },
        )
    }

    pub fn copy_rotation(target: impl Into<String>) -> Self {
        Self::with_kind(
            Some(target.into()),
            ConstraintKind::CopyRotation {
                axes: AxisMask::ALL,
                invert: AxisMask::NONE,
            },
        )
    }

    pub fn copy_scale(target: impl Into<String>) -> Self {
        Self::with_kind(
            Some(target.into()),
            ConstraintKind::CopyScale {
                axes: AxisMask::ALL,
            },
        )
    }

    pub fn copy_transforms(target: impl Into<String>) -> Self {
        Self::with_kind(
            Some(target.into()),
            ConstraintKind::CopyTransforms { head_tail: 0.0 },
        )
    }

    pub fn damped_track(target: impl Into<String>) -> Self {
        Self::with_kind(
            Some(target.into()),
            ConstraintKind::DampedTrack {
                head_tail: 0.0,
                track: TrackAxis::Y,
            },
        )
    }

    pub fn stretch_to(target: impl Into<String>) -> Self {
        Self::with_kind(
            Some(target.into()),
            ConstraintKind::StretchTo {
                head_tail: 0.0,
                rest_length: 0.0,
                volume: StretchVolume::VolumeXz,
                keep_axis: KeepAxis::PlaneX,
            },
        )
    }

    pub fn limit_rotation(x: Option<Limit>, y: Option<Limit>, z: Option<Limit>) -> Self {
        Self::with_kind(None, ConstraintKind::LimitRotation { x, y, z })
    }

    pub fn limit_scale(x: Option<Limit>, y: Option<Limit>, z: Option<Limit>) -> Self {
        Self::with_kind(None, ConstraintKind::LimitScale { x, y, z })
    }

    pub fn ik(target: impl Into<String>, chain_count: u32) -> Self {
        Self::with_kind(
            Some(target.into()),
            ConstraintKind::Ik {
                chain_count,
                pole: None,
            },
        )
    }

    /// Sets the constraint name.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the influence, clamped to [0, 1].
    pub fn with_influence(mut self, influence: f64) -> Self {
        self.influence = influence.clamp(0.0, 1.0);
        self
    }

    /// Sets owner and target space.
    pub fn in_space(mut self, owner: Space, target: Space) -> Self {
        self.owner_space = owner;
        self.target_space = target;
        self
    }

    /// Sets only the owner space.
    pub fn in_owner_space(mut self, owner: Space) -> Self {
        self.owner_space = owner;
        self
    }

    /// Sets the head/tail fraction on kinds that have one; others ignore it.
    pub fn with_head_tail(mut self, value: f64) -> Self {
        self.set_head_tail(value);
        self
    }

    /// Restricts the axes read by copy-location/rotation/scale.
    pub fn with_axes(mut self, mask: AxisMask) -> Self {
        match &mut self.kind {
            ConstraintKind::CopyLocation { axes, .. }
            | ConstraintKind::CopyRotation { axes, .. }
            | ConstraintKind::CopyScale { axes } => *axes = mask,
            _ => {}
        }
        self
    }

    /// Inverts axes of a copy-rotation.
    pub fn with_inverted(mut self, mask: AxisMask) -> Self {
        if let ConstraintKind::CopyRotation { invert, .. } = &mut self.kind {
            *invert = mask;
        }
        self
    }

    /// Sets the track axis of a damped-track.
    pub fn with_track(mut self, axis: TrackAxis) -> Self {
        if let ConstraintKind::DampedTrack { track, .. } = &mut self.kind {
            *track = axis;
        }
        self
    }

    /// Sets the pole target of an IK constraint.
    pub fn with_pole(mut self, bone: impl Into<String>, angle: f64) -> Self {
        if let ConstraintKind::Ik { pole, .. } = &mut self.kind {
            *pole = Some(PoleTarget {
                bone: bone.into(),
                angle,
            });
        }
        self
    }

    /// Sets stretch-to volume, keep-axis and rest length.
    pub fn with_stretch(mut self, vol: StretchVolume, keep: KeepAxis, rest: f64) -> Self {
        if let ConstraintKind::StretchTo {
            volume,
            keep_axis,
            rest_length,
            ..
        } = &mut self.kind
        {
            *volume = vol;
            *keep_axis = keep;
            *rest_length = rest;
        }
        self
    }

    /// Returns the type tag.
    pub fn constraint_type(&self) -> ConstraintType {
        match self.kind {
            ConstraintKind::CopyLocation { .. } => ConstraintType::CopyLocation,
            ConstraintKind::CopyRotation { .. } => ConstraintType::CopyRotation,
            ConstraintKind::CopyScale { .. } => ConstraintType::CopyScale,
            ConstraintKind::CopyTransforms { .. } => ConstraintType::CopyTransforms,
            ConstraintKind::DampedTrack { .. } => ConstraintType::DampedTrack,
            ConstraintKind::StretchTo { .. } => ConstraintType::StretchTo,
            ConstraintKind::LimitRotation { .. } => ConstraintType::LimitRotation,
            ConstraintKind::LimitScale { .. } => ConstraintType::LimitScale,
            ConstraintKind::Ik { .. } => ConstraintType::Ik,
        }
    }

    /// Head/tail fraction, if the kind has one.
    pub fn head_tail(&self) -> Option<f64> {
        match self.kind {
            ConstraintKind::CopyLocation { head_tail, .. }
            | ConstraintKind::CopyTransforms { head_tail }
            | ConstraintKind::DampedTrack { head_tail, .. }
            | ConstraintKind::StretchTo { head_tail, .. } => Some(head_tail),
            _ => None,
        }
    }

    /// Sets the head/tail fraction, clamped to [0, 1].
    pub fn set_head_tail(&mut self, value: f64) {
        let value = value.clamp(0.0, 1.0);
        match &mut self.kind {
            ConstraintKind::CopyLocation { head_tail, .. }
            | ConstraintKind::CopyTransforms { head_tail }
            | ConstraintKind::DampedTrack { head_tail, .. }
            | ConstraintKind::StretchTo { head_tail, .. } => *head_tail = value,
            _ => {}
        }
    }
}

impl ConstraintType {
    /// Returns the host enum name.
    pub fn host_name(&self) -> &'static str {
        match self {
            ConstraintType::CopyLocation => "COPY_LOCATION",
            ConstraintType::CopyRotation => "COPY_ROTATION",
            ConstraintType::CopyScale => "COPY_SCALE",
            ConstraintType::CopyTransforms => "COPY_TRANSFORMS",
            ConstraintType::DampedTrack => "DAMPED_TRACK",
            ConstraintType::StretchTo => "STRETCH_TO",
            ConstraintType::LimitRotation => "LIMIT_ROTATION",
            ConstraintType::LimitScale => "LIMIT_SCALE",
            ConstraintType::Ik => "IK",
        }
    }
}

/// Stable handle to a constraint on a bone.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConstraintHandle {
    pub bone: String,
    pub id: u64,
}
