//! The mutable bone graph contract.
//!
//! Rig generators only ever talk to a `&mut dyn BoneGraph`, usually through
//! the phase handles in [`crate::phase`]. [`crate::Armature`] is the in-memory
//! implementation.

use crate::bone::{BBone, Bone, PoseBone};
use crate::bone_group::BoneGroup;
use crate::constraint::{Constraint, ConstraintHandle};
use crate::error::GraphResult;
use crate::math::Vec3;
use crate::property::{CustomProperty, DriverFormula, DriverTarget, PropertyRef};
use crate::widget::WidgetShape;

/// Mutable graph of uniquely named bones plus their pose-space data.
pub trait BoneGraph {
    // -------------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------------

    /// Looks up a bone by exact name.
    fn bone(&self, name: &str) -> Option<&Bone>;

    /// All bone names in insertion order.
    fn bone_names(&self) -> Vec<String>;

    /// Direct children of a bone, in insertion order.
    fn children_of(&self, name: &str) -> GraphResult<Vec<String>>;

    /// Whether the bone's head is locked to its parent's tail.
    fn is_connected(&self, name: &str) -> GraphResult<bool>;

    /// Rig type assigned to a bone; empty assignments read as `None`.
    fn rig_type(&self, name: &str) -> Option<&str> {
        self.bone(name)
            .and_then(|b| b.rig_type.as_deref())
            .filter(|t| !t.is_empty())
    }

    /// True once any constraint exists; structural edits are refused after.
    fn structure_locked(&self) -> bool;

    /// Follows the first connected child from `name` down the chain.
    ///
    /// Does not include `name` itself.
    fn connected_children(&self, name: &str) -> GraphResult<Vec<String>> {
        let mut chain = Vec::new();
        let mut current = name.to_string();
        loop {
            let mut next = None;
            for child in self.children_of(&current)? {
                if self.is_connected(&child)? {
                    next = Some(child);
                    break;
                }
            }
            match next {
                Some(child) => {
                    chain.push(child.clone());
                    current = child;
                }
                None => return Ok(chain),
            }
        }
    }

    // -------------------------------------------------------------------------
    // Structural edits
    // -------------------------------------------------------------------------

    /// Copies `source` into a new bone named `new_name`, uniquified the way the
    /// host does (`name.001`, ...). The copy keeps the parent but is never
    /// connected. Returns the final name.
    fn create_bone(&mut self, source: &str, new_name: &str) -> GraphResult<String>;

    /// Creates an unparented unit bone along +Y at the origin.
    fn new_bone(&mut self, name: &str) -> GraphResult<String>;

    /// Renames a bone, updating every reference to it.
    fn rename_bone(&mut self, old: &str, new: &str) -> GraphResult<()>;

    /// Sets or clears the parent. A connected bone's head snaps to the parent
    /// tail.
    fn set_parent(&mut self, bone: &str, parent: Option<&str>, connected: bool)
        -> GraphResult<()>;

    fn set_head(&mut self, bone: &str, head: Vec3) -> GraphResult<()>;

    fn set_tail(&mut self, bone: &str, tail: Vec3) -> GraphResult<()>;

    fn set_roll(&mut self, bone: &str, roll: f64) -> GraphResult<()>;

    /// Moves the tail along the current direction.
    fn set_length(&mut self, bone: &str, length: f64) -> GraphResult<()>;

    fn set_bbone(&mut self, bone: &str, bbone: BBone) -> GraphResult<()>;

    fn set_deform(&mut self, bone: &str, deform: bool) -> GraphResult<()>;

    fn set_collection(&mut self, bone: &str, collection: Option<&str>) -> GraphResult<()>;

    // -------------------------------------------------------------------------
    // Pose edits
    // -------------------------------------------------------------------------

    /// Appends a constraint to a bone's stack.
    fn add_constraint(&mut self, bone: &str, constraint: Constraint)
        -> GraphResult<ConstraintHandle>;

    fn constraint(&self, handle: &ConstraintHandle) -> GraphResult<&Constraint>;

    fn constraint_mut(&mut self, handle: &ConstraintHandle) -> GraphResult<&mut Constraint>;

    fn remove_constraint(&mut self, handle: &ConstraintHandle) -> GraphResult<Constraint>;

    /// Registers a custom property, replacing one with the same name.
    fn add_driven_property(&mut self, bone: &str, property: CustomProperty)
        -> GraphResult<PropertyRef>;

    /// Drives a pose attribute from a property, replacing any driver already
    /// bound to that attribute.
    fn bind_driver(
        &mut self,
        target: DriverTarget,
        source: PropertyRef,
        formula: DriverFormula,
    ) -> GraphResult<()>;

    fn assign_widget_shape(&mut self, bone: &str, shape: WidgetShape, size: f64)
        -> GraphResult<()>;

    /// Registers a bone group; existing groups with the same name are kept.
    fn add_bone_group(&mut self, group: BoneGroup);

    /// Locks, rotation mode, IK settings and group of a pose bone.
    fn pose_settings_mut(&mut self, bone: &str) -> GraphResult<&mut PoseBone>;
}
