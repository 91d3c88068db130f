//! Phase-tagged access to a bone graph.
//!
//! Generation has two strict phases. [`EditPhase`] exposes only structural
//! operations (create, position, parent); [`PosePhase`] exposes only pose
//! operations (constraints, properties, drivers, widgets, locks). The only way
//! from one to the other is [`EditPhase::into_pose`], which consumes the edit
//! handle, so a structural edit after posing does not compile.
//!
//! [`Transaction`] snapshots a graph and restores it unless committed.

use tracing::debug;

use crate::bone::{BBone, Bone, ChannelLocks, IkSettings, RotationMode};
use crate::bone_group::BoneGroup;
use crate::constraint::{Constraint, ConstraintHandle, ConstraintType};
use crate::error::{GraphError, GraphResult};
use crate::graph::BoneGraph;
use crate::math::{roll_for_x_axis, Vec3, EPSILON};
use crate::property::{CustomProperty, DriverFormula, DriverTarget, PropertyRef};
use crate::widget::WidgetShape;

/// World axis used by [`EditPhase::orient_to_world_axis`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorldAxis {
    X,
    Y,
    Z,
}

impl WorldAxis {
    pub fn vector(&self) -> Vec3 {
        match self {
            WorldAxis::X => Vec3::x(),
            WorldAxis::Y => Vec3::y(),
            WorldAxis::Z => Vec3::z(),
        }
    }
}

// =============================================================================
// Edit phase
// =============================================================================

/// Structural access to a graph.
pub struct EditPhase<'g> {
    graph: &'g mut (dyn BoneGraph + 'g),
    created: usize,
}

impl<'g> EditPhase<'g> {
    pub fn new(graph: &'g mut (dyn BoneGraph + 'g)) -> Self {
        Self { graph, created: 0 }
    }

    /// Read-only view of the graph.
    pub fn graph(&self) -> &dyn BoneGraph {
        &*self.graph
    }

    /// Looks up a bone, failing if it does not exist.
    pub fn bone(&self, name: &str) -> GraphResult<&Bone> {
        self.graph
            .bone(name)
            .ok_or_else(|| GraphError::unknown_bone(name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.graph.bone(name).is_some()
    }

    /// Number of bones created through this handle.
    pub fn created(&self) -> usize {
        self.created
    }

    /// Copies a bone. Returns the uniquified name.
    pub fn copy_bone(&mut self, source: &str, name: &str) -> GraphResult<String> {
        let name = self.graph.create_bone(source, name)?;
        self.created += 1;
        Ok(name)
    }

    /// Creates a fresh bone. Returns the uniquified name.
    pub fn new_bone(&mut self, name: &str) -> GraphResult<String> {
        let name = self.graph.new_bone(name)?;
        self.created += 1;
        Ok(name)
    }

    pub fn rename_bone(&mut self, old: &str, new: &str) -> GraphResult<()> {
        self.graph.rename_bone(old, new)
    }

    pub fn set_parent(&mut self, bone: &str, parent: &str, connected: bool) -> GraphResult<()> {
        self.graph.set_parent(bone, Some(parent), connected)
    }

    pub fn clear_parent(&mut self, bone: &str) -> GraphResult<()> {
        self.graph.set_parent(bone, None, false)
    }

    pub fn set_head(&mut self, bone: &str, head: Vec3) -> GraphResult<()> {
        self.graph.set_head(bone, head)
    }

    pub fn set_tail(&mut self, bone: &str, tail: Vec3) -> GraphResult<()> {
        self.graph.set_tail(bone, tail)
    }

    pub fn set_roll(&mut self, bone: &str, roll: f64) -> GraphResult<()> {
        self.graph.set_roll(bone, roll)
    }

    pub fn set_length(&mut self, bone: &str, length: f64) -> GraphResult<()> {
        self.graph.set_length(bone, length)
    }

    /// Multiplies the bone length.
    pub fn scale_length(&mut self, bone: &str, factor: f64) -> GraphResult<()> {
        let length = self.bone(bone)?.length();
        self.graph.set_length(bone, length * factor)
    }

    /// Moves a bone so its head sits at `pos`, keeping its vector.
    pub fn put_bone(&mut self, bone: &str, pos: Vec3) -> GraphResult<()> {
        let vector = self.bone(bone)?.vector();
        self.graph.set_head(bone, pos)?;
        self.graph.set_tail(bone, pos + vector)
    }

    /// Swaps head and tail.
    pub fn flip_bone(&mut self, bone: &str) -> GraphResult<()> {
        let (head, tail) = {
            let b = self.bone(bone)?;
            (b.head, b.tail)
        };
        self.graph.set_head(bone, tail)?;
        self.graph.set_tail(bone, head)
    }

    /// Points the bone along `direction`, keeping head and length.
    pub fn align_y_axis(&mut self, bone: &str, direction: Vec3) -> GraphResult<()> {
        let dir = direction
            .try_normalize(EPSILON)
            .ok_or_else(|| GraphError::invalid_geometry(bone, "cannot align to a zero vector"))?;
        let (head, length) = {
            let b = self.bone(bone)?;
            (b.head, b.length())
        };
        self.graph.set_tail(bone, head + dir * length)
    }

    /// Rolls the bone so its X axis follows `direction`. A direction parallel
    /// to the bone leaves the roll unchanged.
    pub fn align_x_axis(&mut self, bone: &str, direction: Vec3) -> GraphResult<()> {
        let (head, tail) = {
            let b = self.bone(bone)?;
            (b.head, b.tail)
        };
        match roll_for_x_axis(&head, &tail, &direction) {
            Some(roll) => self.graph.set_roll(bone, roll),
            None => Ok(()),
        }
    }

    /// Points the bone along a world axis with `scale` times its length.
    pub fn orient_to_world_axis(
        &mut self,
        bone: &str,
        axis: WorldAxis,
        scale: f64,
        reverse: bool,
    ) -> GraphResult<()> {
        let (head, length) = {
            let b = self.bone(bone)?;
            (b.head, b.length())
        };
        let dir = if reverse { -axis.vector() } else { axis.vector() };
        self.graph.set_tail(bone, head + dir * length * scale)
    }

    pub fn set_bbone(&mut self, bone: &str, bbone: BBone) -> GraphResult<()> {
        self.graph.set_bbone(bone, bbone)
    }

    pub fn set_deform(&mut self, bone: &str, deform: bool) -> GraphResult<()> {
        self.graph.set_deform(bone, deform)
    }

    pub fn set_collection(&mut self, bone: &str, collection: Option<&str>) -> GraphResult<()> {
        self.graph.set_collection(bone, collection)
    }

    /// Closes the structural phase.
    pub fn into_pose(self) -> PosePhase<'g> {
        debug!(created = self.created, "entering pose phase");
        PosePhase { graph: self.graph }
    }
}

// =============================================================================
// Pose phase
// =============================================================================

/// Pose-space access to a graph.
pub struct PosePhase<'g> {
    graph: &'g mut (dyn BoneGraph + 'g),
}

impl<'g> PosePhase<'g> {
    pub fn graph(&self) -> &dyn BoneGraph {
        &*self.graph
    }

    pub fn bone(&self, name: &str) -> GraphResult<&Bone> {
        self.graph
            .bone(name)
            .ok_or_else(|| GraphError::unknown_bone(name))
    }

    pub fn add_constraint(
        &mut self,
        bone: &str,
        constraint: Constraint,
    ) -> GraphResult<ConstraintHandle> {
        self.graph.add_constraint(bone, constraint)
    }

    pub fn constraint(&self, handle: &ConstraintHandle) -> GraphResult<&Constraint> {
        self.graph.constraint(handle)
    }

    pub fn constraint_mut(&mut self, handle: &ConstraintHandle) -> GraphResult<&mut Constraint> {
        self.graph.constraint_mut(handle)
    }

    pub fn remove_constraint(&mut self, handle: &ConstraintHandle) -> GraphResult<Constraint> {
        self.graph.remove_constraint(handle)
    }

    /// Handles of a bone's constraints, in stack order.
    pub fn constraint_handles(&self, bone: &str) -> GraphResult<Vec<ConstraintHandle>> {
        Ok(self
            .bone(bone)?
            .pose
            .constraints
            .iter()
            .map(|c| ConstraintHandle {
                bone: bone.to_string(),
                id: c.id,
            })
            .collect())
    }

    /// Handles of a bone's constraints of the given types.
    pub fn constraints_of_type(
        &self,
        bone: &str,
        types: &[ConstraintType],
    ) -> GraphResult<Vec<ConstraintHandle>> {
        let mut handles = Vec::new();
        for handle in self.constraint_handles(bone)? {
            if types.contains(&self.graph.constraint(&handle)?.constraint_type()) {
                handles.push(handle);
            }
        }
        Ok(handles)
    }

    pub fn add_property(&mut self, bone: &str, property: CustomProperty) -> GraphResult<PropertyRef> {
        self.graph.add_driven_property(bone, property)
    }

    pub fn bind_driver(
        &mut self,
        target: DriverTarget,
        source: &PropertyRef,
        formula: DriverFormula,
    ) -> GraphResult<()> {
        self.graph.bind_driver(target, source.clone(), formula)
    }

    /// Drives a constraint's influence.
    pub fn drive_influence(
        &mut self,
        constraint: &ConstraintHandle,
        source: &PropertyRef,
        formula: DriverFormula,
    ) -> GraphResult<()> {
        self.bind_driver(
            DriverTarget::ConstraintInfluence {
                constraint: constraint.clone(),
            },
            source,
            formula,
        )
    }

    /// Drives a constraint's mute flag.
    pub fn drive_mute(
        &mut self,
        constraint: &ConstraintHandle,
        source: &PropertyRef,
        formula: DriverFormula,
    ) -> GraphResult<()> {
        self.bind_driver(
            DriverTarget::ConstraintMute {
                constraint: constraint.clone(),
            },
            source,
            formula,
        )
    }

    pub fn assign_widget(&mut self, bone: &str, shape: WidgetShape, size: f64) -> GraphResult<()> {
        self.graph.assign_widget_shape(bone, shape, size)
    }

    pub fn set_locks(&mut self, bone: &str, locks: ChannelLocks) -> GraphResult<()> {
        self.graph.pose_settings_mut(bone)?.locks = locks;
        Ok(())
    }

    pub fn set_rotation_mode(&mut self, bone: &str, mode: RotationMode) -> GraphResult<()> {
        self.graph.pose_settings_mut(bone)?.rotation_mode = mode;
        Ok(())
    }

    pub fn set_ik(&mut self, bone: &str, ik: IkSettings) -> GraphResult<()> {
        self.graph.pose_settings_mut(bone)?.ik = ik;
        Ok(())
    }

    /// Registers `group` if needed and puts `bone` in it.
    pub fn set_group(&mut self, bone: &str, group: &BoneGroup) -> GraphResult<()> {
        self.graph.add_bone_group(group.clone());
        self.graph.pose_settings_mut(bone)?.group = Some(group.name.clone());
        Ok(())
    }
}

// =============================================================================
// Transaction
// =============================================================================

/// Snapshot guard: the graph is restored on drop unless [`commit`] ran.
///
/// [`commit`]: Transaction::commit
pub struct Transaction<'g, G: BoneGraph + Clone> {
    graph: &'g mut G,
    snapshot: Option<G>,
}

impl<'g, G: BoneGraph + Clone> Transaction<'g, G> {
    pub fn begin(graph: &'g mut G) -> Self {
        let snapshot = Some(graph.clone());
        Self { graph, snapshot }
    }

    /// Opens the structural phase on the guarded graph.
    pub fn edit(&mut self) -> EditPhase<'_> {
        EditPhase::new(&mut *self.graph)
    }

    /// Read-only view of the guarded graph.
    pub fn graph(&self) -> &G {
        self.graph
    }

    /// Keeps all changes.
    pub fn commit(mut self) {
        self.snapshot = None;
    }
}

impl<G: BoneGraph + Clone> Drop for Transaction<'_, G> {
    fn drop(&mut self) {
        if let Some(snapshot) = self.snapshot.take() {
            debug!("rolling back bone graph");
            *self.graph = snapshot;
        }
    }
}
