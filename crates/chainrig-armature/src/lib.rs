//! Armature graph for the chainrig generators.
//!
//! This crate holds the data side of rig generation:
//!
//! - [`BoneGraph`]: the mutable named-bone graph the generators drive
//! - [`Armature`]: an in-memory, serializable implementation of it
//! - [`EditPhase`] / [`PosePhase`]: phase-tagged handles that keep structural
//!   edits and pose edits apart
//! - [`Transaction`]: snapshot guard that restores the graph on failure
//! - [`BoneName`]: structured `ORG-`/`MCH-`/`DEF-`/control names
//! - [`Metarig`]: the JSON document artists hand in

pub mod armature;
pub mod bone;
pub mod bone_group;
pub mod constraint;
pub mod error;
pub mod graph;
pub mod math;
pub mod metarig;
pub mod naming;
pub mod phase;
pub mod property;
pub mod widget;

pub use armature::Armature;
pub use bone::{BBone, Bone, ChannelLocks, IkSettings, PoseBone, RotationMode};
pub use bone_group::{BoneGroup, ColorTheme};
pub use constraint::{
    AxisMask, Constraint, ConstraintHandle, ConstraintKind, ConstraintType, KeepAxis, Limit,
    Space, StretchVolume, TrackAxis,
};
pub use error::{CodedError, GraphError, GraphResult, MetarigError, MetarigResult};
pub use graph::BoneGraph;
pub use math::Vec3;
pub use metarig::{Metarig, MetarigBone};
pub use naming::{BoneName, Role, Side};
pub use phase::{EditPhase, PosePhase, Transaction, WorldAxis};
pub use property::{CustomProperty, Driver, DriverFormula, DriverTarget, PropertyKind, PropertyRef};
pub use widget::{WidgetAssignment, WidgetShape};
