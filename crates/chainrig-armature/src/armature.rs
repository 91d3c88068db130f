//! In-memory armature implementing [`BoneGraph`].

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::bone::{BBone, Bone, PoseBone};
use crate::bone_group::BoneGroup;
use crate::constraint::{Constraint, ConstraintHandle, ConstraintKind};
use crate::error::{GraphError, GraphResult};
use crate::graph::BoneGraph;
use crate::math::{Vec3, EPSILON};
use crate::naming::split_index;
use crate::property::{CustomProperty, Driver, DriverFormula, DriverTarget, PropertyRef};
use crate::widget::{WidgetAssignment, WidgetShape};

/// Serialized form of an [`Armature`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct ArmatureData {
    name: String,
    bones: Vec<Bone>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    groups: Vec<BoneGroup>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    drivers: Vec<Driver>,
}

/// A named collection of bones in insertion order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ArmatureData", into = "ArmatureData")]
pub struct Armature {
    name: String,
    bones: Vec<Bone>,
    index: HashMap<String, usize>,
    groups: Vec<BoneGroup>,
    drivers: Vec<Driver>,
    next_constraint_id: u64,
}

impl TryFrom<ArmatureData> for Armature {
    type Error = String;

    fn try_from(data: ArmatureData) -> Result<Self, Self::Error> {
        let mut index = HashMap::with_capacity(data.bones.len());
        for (i, bone) in data.bones.iter().enumerate() {
            if index.insert(bone.name.clone(), i).is_some() {
                return Err(format!("duplicate bone '{}'", bone.name));
            }
        }
        let next_constraint_id = data
            .bones
            .iter()
            .flat_map(|b| b.pose.constraints.iter().map(|c| c.id))
            .max()
            .map_or(1, |id| id + 1);
        Ok(Self {
            name: data.name,
            bones: data.bones,
            index,
            groups: data.groups,
            drivers: data.drivers,
            next_constraint_id,
        })
    }
}

impl From<Armature> for ArmatureData {
    fn from(armature: Armature) -> Self {
        Self {
            name: armature.name,
            bones: armature.bones,
            groups: armature.groups,
            drivers: armature.drivers,
        }
    }
}

impl Armature {
    /// Creates an empty armature.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            bones: Vec::new(),
            index: HashMap::new(),
            groups: Vec::new(),
            drivers: Vec::new(),
            next_constraint_id: 1,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bones(&self) -> impl Iterator<Item = &Bone> {
        self.bones.iter()
    }

    pub fn len(&self) -> usize {
        self.bones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bones.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn groups(&self) -> &[BoneGroup] {
        &self.groups
    }

    pub fn drivers(&self) -> &[Driver] {
        &self.drivers
    }

    /// Inserts a fully formed bone. The parent, if any, must already exist.
    pub fn add_bone(&mut self, bone: Bone) -> GraphResult<()> {
        self.check_unlocked("add", &bone.name)?;
        if self.contains(&bone.name) {
            return Err(GraphError::DuplicateBone { name: bone.name });
        }
        if let Some(parent) = &bone.parent {
            if !self.contains(parent) {
                return Err(GraphError::unknown_bone(parent.clone()));
            }
        }
        self.index.insert(bone.name.clone(), self.bones.len());
        self.bones.push(bone);
        Ok(())
    }

    /// Driver bound to a pose attribute, if any.
    pub fn driver_for(&self, target: &DriverTarget) -> Option<&Driver> {
        self.drivers.iter().find(|d| &d.target == target)
    }

    /// Looks up a custom property.
    pub fn property(&self, property: &PropertyRef) -> GraphResult<&CustomProperty> {
        self.require(&property.bone)?
            .pose
            .property(&property.name)
            .ok_or_else(|| GraphError::unknown_property(&property.bone, &property.name))
    }

    /// Sets a property value, clamped to its range. Returns the stored value.
    pub fn set_property_value(&mut self, property: &PropertyRef, value: f64) -> GraphResult<f64> {
        let idx = self.position(&property.bone)?;
        let prop = self.bones[idx]
            .pose
            .properties
            .iter_mut()
            .find(|p| p.name == property.name)
            .ok_or_else(|| GraphError::unknown_property(&property.bone, &property.name))?;
        prop.value = prop.clamp(value);
        Ok(prop.value)
    }

    /// Evaluates whatever drives `target` with the current property values.
    ///
    /// Returns `None` when the attribute is not driven.
    pub fn driven_value(&self, target: &DriverTarget) -> GraphResult<Option<f64>> {
        match self.driver_for(target) {
            Some(driver) => {
                let prop = self.property(&driver.source)?;
                Ok(Some(driver.evaluate(prop, prop.value)))
            }
            None => Ok(None),
        }
    }

    /// Constraint influence after drivers are applied.
    pub fn effective_influence(&self, handle: &ConstraintHandle) -> GraphResult<f64> {
        let stored = self.constraint(handle)?.influence;
        let target = DriverTarget::ConstraintInfluence {
            constraint: handle.clone(),
        };
        Ok(self.driven_value(&target)?.unwrap_or(stored).clamp(0.0, 1.0))
    }

    /// Constraint mute state after drivers are applied.
    pub fn effective_mute(&self, handle: &ConstraintHandle) -> GraphResult<bool> {
        let stored = self.constraint(handle)?.mute;
        let target = DriverTarget::ConstraintMute {
            constraint: handle.clone(),
        };
        Ok(self.driven_value(&target)?.map_or(stored, |v| v > 0.5))
    }

    /// Bone visibility after drivers are applied.
    pub fn effective_hide(&self, bone: &str) -> GraphResult<bool> {
        let stored = self.require(bone)?.hide;
        let target = DriverTarget::BoneHide {
            bone: bone.to_string(),
        };
        Ok(self.driven_value(&target)?.map_or(stored, |v| v > 0.5))
    }

    // -------------------------------------------------------------------------
    // Internals
    // -------------------------------------------------------------------------

    fn position(&self, name: &str) -> GraphResult<usize> {
        self.index
            .get(name)
            .copied()
            .ok_or_else(|| GraphError::unknown_bone(name))
    }

    fn require(&self, name: &str) -> GraphResult<&Bone> {
        Ok(&self.bones[self.position(name)?])
    }

    fn require_mut(&mut self, name: &str) -> GraphResult<&mut Bone> {
        let idx = self.position(name)?;
        Ok(&mut self.bones[idx])
    }

    fn check_unlocked(&self, operation: &str, bone: &str) -> GraphResult<()> {
        if self.structure_locked() {
            return Err(GraphError::structure_locked(operation, bone));
        }
        Ok(())
    }

    fn unique_name(&self, wanted: &str) -> String {
        if !self.contains(wanted) {
            return wanted.to_string();
        }
        let (base, index) = split_index(wanted);
        let mut n = index.unwrap_or(0) + 1;
        loop {
            let candidate = format!("{}.{:03}", base, n);
            if !self.contains(&candidate) {
                return candidate;
            }
            n += 1;
        }
    }

    fn insert_unique(&mut self, mut bone: Bone, wanted: &str) -> String {
        let name = self.unique_name(wanted);
        bone.name = name.clone();
        self.index.insert(name.clone(), self.bones.len());
        self.bones.push(bone);
        name
    }

    /// Moves a tail and drags connected children's heads along.
    fn move_tail(&mut self, idx: usize, tail: Vec3) {
        self.bones[idx].tail = tail;
        let name = self.bones[idx].name.clone();
        for child in self.bones.iter_mut() {
            if child.connected && child.parent.as_deref() == Some(name.as_str()) {
                child.head = tail;
            }
        }
    }

    fn locate_constraint(&self, handle: &ConstraintHandle) -> GraphResult<(usize, usize)> {
        let idx = self.position(&handle.bone)?;
        let pos = self.bones[idx]
            .pose
            .constraints
            .iter()
            .position(|c| c.id == handle.id)
            .ok_or_else(|| GraphError::UnknownConstraint {
                bone: handle.bone.clone(),
                id: handle.id,
            })?;
        Ok((idx, pos))
    }

    fn check_constraint_targets(&self, constraint: &Constraint) -> GraphResult<()> {
        if let Some(target) = &constraint.target {
            self.require(target)?;
        }
        if let ConstraintKind::Ik {
            pole: Some(pole), ..
        } = &constraint.kind
        {
            self.require(&pole.bone)?;
        }
        Ok(())
    }

    fn check_driver_target(&self, target: &DriverTarget) -> GraphResult<()> {
        match target {
            DriverTarget::ConstraintInfluence { constraint }
            | DriverTarget::ConstraintMute { constraint } => {
                self.locate_constraint(constraint).map(|_| ())
            }
            DriverTarget::BoneHide { bone }
            | DriverTarget::BBoneEaseIn { bone }
            | DriverTarget::BBoneEaseOut { bone } => self.require(bone).map(|_| ()),
        }
    }
}

fn rename_in(slot: &mut String, old: &str, new: &str) {
    if slot == old {
        *slot = new.to_string();
    }
}

impl BoneGraph for Armature {
    fn bone(&self, name: &str) -> Option<&Bone> {
        self.index.get(name).map(|&i| &self.bones[i])
    }

    fn bone_names(&self) -> Vec<String> {
        self.bones.iter().map(|b| b.name.clone()).collect()
    }

    fn children_of(&self, name: &str) -> GraphResult<Vec<String>> {
        self.require(name)?;
        Ok(self
            .bones
            .iter()
            .filter(|b| b.parent.as_deref() == Some(name))
            .map(|b| b.name.clone())
            .collect())
    }

    fn is_connected(&self, name: &str) -> GraphResult<bool> {
        Ok(self.require(name)?.connected)
    }

    fn structure_locked(&self) -> bool {
        self.bones.iter().any(|b| !b.pose.constraints.is_empty())
    }

    fn create_bone(&mut self, source: &str, new_name: &str) -> GraphResult<String> {
        self.check_unlocked("create", new_name)?;
        let src = self.require(source)?;
        let mut bone = Bone::new(new_name, src.head, src.tail).with_roll(src.roll);
        // Copies keep the parent, never the connection.
        bone.parent = src.parent.clone();
        bone.deform = src.deform;
        bone.bbone = src.bbone;
        bone.collection = src.collection.clone();
        bone.pose = PoseBone {
            locks: src.pose.locks,
            rotation_mode: src.pose.rotation_mode,
            ..PoseBone::default()
        };
        let name = self.insert_unique(bone, new_name);
        trace!(source, bone = %name, "copied bone");
        Ok(name)
    }

    fn new_bone(&mut self, name: &str) -> GraphResult<String> {
        self.check_unlocked("create", name)?;
        let bone = Bone::new(name, Vec3::zeros(), Vec3::y());
        Ok(self.insert_unique(bone, name))
    }

    fn rename_bone(&mut self, old: &str, new: &str) -> GraphResult<()> {
        if old == new {
            self.require(old)?;
            return Ok(());
        }
        if self.contains(new) {
            return Err(GraphError::DuplicateBone {
                name: new.to_string(),
            });
        }
        let idx = self.position(old)?;
        self.index.remove(old);
        self.index.insert(new.to_string(), idx);
        self.bones[idx].name = new.to_string();

        for bone in self.bones.iter_mut() {
            if let Some(parent) = bone.parent.as_mut() {
                rename_in(parent, old, new);
            }
            for c in bone.pose.constraints.iter_mut() {
                if let Some(target) = c.target.as_mut() {
                    rename_in(target, old, new);
                }
                if let ConstraintKind::Ik {
                    pole: Some(pole), ..
                } = &mut c.kind
                {
                    rename_in(&mut pole.bone, old, new);
                }
            }
        }
        for driver in self.drivers.iter_mut() {
            rename_in(&mut driver.source.bone, old, new);
            match &mut driver.target {
                DriverTarget::ConstraintInfluence { constraint }
                | DriverTarget::ConstraintMute { constraint } => {
                    rename_in(&mut constraint.bone, old, new)
                }
                DriverTarget::BoneHide { bone }
                | DriverTarget::BBoneEaseIn { bone }
                | DriverTarget::BBoneEaseOut { bone } => rename_in(bone, old, new),
            }
        }
        Ok(())
    }

    fn set_parent(
        &mut self,
        bone: &str,
        parent: Option<&str>,
        connected: bool,
    ) -> GraphResult<()> {
        self.check_unlocked("reparent", bone)?;
        let idx = self.position(bone)?;
        let Some(parent) = parent else {
            let b = &mut self.bones[idx];
            b.parent = None;
            b.connected = false;
            return Ok(());
        };

        // Walk up from the new parent; meeting `bone` means a cycle.
        let mut cursor = Some(parent.to_string());
        while let Some(current) = cursor {
            if current == bone {
                return Err(GraphError::ParentCycle {
                    bone: bone.to_string(),
                    parent: parent.to_string(),
                });
            }
            cursor = self.require(&current)?.parent.clone();
        }

        let parent_tail = self.require(parent)?.tail;
        let b = &mut self.bones[idx];
        b.parent = Some(parent.to_string());
        b.connected = connected;
        if connected {
            b.head = parent_tail;
        }
        Ok(())
    }

    fn set_head(&mut self, bone: &str, head: Vec3) -> GraphResult<()> {
        self.check_unlocked("move", bone)?;
        let idx = self.position(bone)?;
        if self.bones[idx].connected {
            if let Some(parent) = self.bones[idx].parent.clone() {
                let pidx = self.position(&parent)?;
                self.move_tail(pidx, head);
            }
        }
        self.bones[idx].head = head;
        Ok(())
    }

    fn set_tail(&mut self, bone: &str, tail: Vec3) -> GraphResult<()> {
        self.check_unlocked("move", bone)?;
        let idx = self.position(bone)?;
        self.move_tail(idx, tail);
        Ok(())
    }

    fn set_roll(&mut self, bone: &str, roll: f64) -> GraphResult<()> {
        self.check_unlocked("roll", bone)?;
        self.require_mut(bone)?.roll = roll;
        Ok(())
    }

    fn set_length(&mut self, bone: &str, length: f64) -> GraphResult<()> {
        self.check_unlocked("resize", bone)?;
        if !(length.is_finite() && length > EPSILON) {
            return Err(GraphError::invalid_geometry(
                bone,
                format!("length must be positive, got {}", length),
            ));
        }
        let idx = self.position(bone)?;
        let b = &self.bones[idx];
        let dir = b
            .vector()
            .try_normalize(EPSILON)
            .ok_or_else(|| GraphError::invalid_geometry(bone, "zero-length bone has no direction"))?;
        let tail = b.head + dir * length;
        self.move_tail(idx, tail);
        Ok(())
    }

    fn set_bbone(&mut self, bone: &str, bbone: BBone) -> GraphResult<()> {
        self.require_mut(bone)?.bbone = bbone;
        Ok(())
    }

    fn set_deform(&mut self, bone: &str, deform: bool) -> GraphResult<()> {
        self.require_mut(bone)?.deform = deform;
        Ok(())
    }

    fn set_collection(&mut self, bone: &str, collection: Option<&str>) -> GraphResult<()> {
        self.require_mut(bone)?.collection = collection.map(str::to_string);
        Ok(())
    }

    fn add_constraint(
        &mut self,
        bone: &str,
        mut constraint: Constraint,
    ) -> GraphResult<ConstraintHandle> {
        let idx = self.position(bone)?;
        self.check_constraint_targets(&constraint)?;
        constraint.id = self.next_constraint_id;
        self.next_constraint_id += 1;
        let handle = ConstraintHandle {
            bone: bone.to_string(),
            id: constraint.id,
        };
        trace!(bone, kind = constraint.constraint_type().host_name(), "added constraint");
        self.bones[idx].pose.constraints.push(constraint);
        Ok(handle)
    }

    fn constraint(&self, handle: &ConstraintHandle) -> GraphResult<&Constraint> {
        let (idx, pos) = self.locate_constraint(handle)?;
        Ok(&self.bones[idx].pose.constraints[pos])
    }

    fn constraint_mut(&mut self, handle: &ConstraintHandle) -> GraphResult<&mut Constraint> {
        let (idx, pos) = self.locate_constraint(handle)?;
        Ok(&mut self.bones[idx].pose.constraints[pos])
    }

    fn remove_constraint(&mut self, handle: &ConstraintHandle) -> GraphResult<Constraint> {
        let (idx, pos) = self.locate_constraint(handle)?;
        self.drivers.retain(|d| match &d.target {
            DriverTarget::ConstraintInfluence { constraint }
            | DriverTarget::ConstraintMute { constraint } => constraint != handle,
            _ => true,
        });
        Ok(self.bones[idx].pose.constraints.remove(pos))
    }

    fn add_driven_property(
        &mut self,
        bone: &str,
        property: CustomProperty,
    ) -> GraphResult<PropertyRef> {
        let reference = PropertyRef::new(bone, property.name.clone());
        let props = &mut self.require_mut(bone)?.pose.properties;
        match props.iter_mut().find(|p| p.name == property.name) {
            Some(existing) => *existing = property,
            None => props.push(property),
        }
        Ok(reference)
    }

    fn bind_driver(
        &mut self,
        target: DriverTarget,
        source: PropertyRef,
        formula: DriverFormula,
    ) -> GraphResult<()> {
        self.property(&source)?;
        self.check_driver_target(&target)?;
        self.drivers.retain(|d| d.target != target);
        self.drivers.push(Driver {
            target,
            source,
            formula,
        });
        Ok(())
    }

    fn assign_widget_shape(&mut self, bone: &str, shape: WidgetShape, size: f64) -> GraphResult<()> {
        self.require_mut(bone)?.pose.widget = Some(WidgetAssignment::new(shape, size));
        Ok(())
    }

    fn add_bone_group(&mut self, group: BoneGroup) {
        if !self.groups.iter().any(|g| g.name == group.name) {
            self.groups.push(group);
        }
    }

    fn pose_settings_mut(&mut self, bone: &str) -> GraphResult<&mut PoseBone> {
        Ok(&mut self.require_mut(bone)?.pose)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn leg() -> Armature {
        let mut arm = Armature::new("rig");
        arm.add_bone(Bone::new(
            "thigh.L",
            Vec3::new(0.1, 0.0, 1.0),
            Vec3::new(0.1, 0.0, 0.5),
        ))
        .unwrap();
        arm.add_bone(
            Bone::new("shin.L", Vec3::new(0.1, 0.0, 0.5), Vec3::new(0.1, 0.0, 0.1))
                .with_parent("thigh.L", true),
        )
        .unwrap();
        arm
    }

    #[test]
    fn test_create_bone_uniquifies() {
        let mut arm = leg();
        assert_eq!(arm.create_bone("thigh.L", "ctrl").unwrap(), "ctrl");
        assert_eq!(arm.create_bone("thigh.L", "ctrl").unwrap(), "ctrl.001");
        assert_eq!(arm.create_bone("thigh.L", "ctrl").unwrap(), "ctrl.002");
        assert_eq!(arm.create_bone("thigh.L", "lid.L.002").unwrap(), "lid.L.002");
        assert_eq!(arm.create_bone("thigh.L", "lid.L.002").unwrap(), "lid.L.003");
    }

    #[test]
    fn test_create_bone_copies_geometry_not_rig_type() {
        let mut arm = leg();
        arm.bones[0].rig_type = Some("leg".into());
        let name = arm.create_bone("shin.L", "MCH-shin.L").unwrap();
        let copy = arm.bone(&name).unwrap();
        assert_eq!(copy.head, Vec3::new(0.1, 0.0, 0.5));
        assert_eq!(copy.parent.as_deref(), Some("thigh.L"));
        assert!(!copy.connected);
        assert_eq!(arm.connected_children("thigh.L").unwrap(), vec!["shin.L"]);
        assert!(!arm.bone("MCH-shin.L").unwrap().has_rig_type());
    }

    #[test]
    fn test_children_and_connected_chain() {
        let arm = leg();
        assert_eq!(arm.children_of("thigh.L").unwrap(), vec!["shin.L"]);
        assert_eq!(arm.connected_children("thigh.L").unwrap(), vec!["shin.L"]);
        assert!(arm.children_of("nope").is_err());
    }

    #[test]
    fn test_connected_parent_snaps_head() {
        let mut arm = leg();
        let n = arm.new_bone("toe.L").unwrap();
        arm.set_parent(&n, Some("shin.L"), true).unwrap();
        assert_eq!(arm.bone(&n).unwrap().head, Vec3::new(0.1, 0.0, 0.1));
    }

    #[test]
    fn test_set_tail_drags_connected_children() {
        let mut arm = leg();
        arm.set_tail("thigh.L", Vec3::new(0.2, 0.0, 0.5)).unwrap();
        assert_eq!(arm.bone("shin.L").unwrap().head, Vec3::new(0.2, 0.0, 0.5));
    }

    #[test]
    fn test_parent_cycle_rejected() {
        let mut arm = leg();
        let err = arm.set_parent("thigh.L", Some("shin.L"), false).unwrap_err();
        assert!(matches!(err, GraphError::ParentCycle { .. }));
    }

    #[test]
    fn test_set_length_keeps_direction() {
        let mut arm = leg();
        arm.set_length("thigh.L", 0.25).unwrap();
        let b = arm.bone("thigh.L").unwrap();
        assert!((b.length() - 0.25).abs() < 1e-12);
        assert!((b.tail - Vec3::new(0.1, 0.0, 0.75)).norm() < 1e-12);
        assert!(arm.set_length("thigh.L", 0.0).is_err());
    }

    #[test]
    fn test_structure_locked_after_constraint() {
        let mut arm = leg();
        arm.add_constraint("shin.L", Constraint::copy_location("thigh.L"))
            .unwrap();
        assert!(arm.structure_locked());
        let err = arm.create_bone("thigh.L", "late").unwrap_err();
        assert!(matches!(err, GraphError::StructureLocked { .. }));
        assert!(arm.set_parent("shin.L", None, false).is_err());
        // Data-level settings stay editable.
        arm.set_deform("shin.L", false).unwrap();
    }

    #[test]
    fn test_constraint_target_must_exist() {
        let mut arm = leg();
        let err = arm
            .add_constraint("shin.L", Constraint::damped_track("ghost"))
            .unwrap_err();
        assert_eq!(err, GraphError::unknown_bone("ghost"));
    }

    #[test]
    fn test_remove_constraint_drops_its_drivers() {
        let mut arm = leg();
        let prop = arm
            .add_driven_property("thigh.L", CustomProperty::float("IK/FK", 0.0, 0.0, 1.0))
            .unwrap();
        let handle = arm
            .add_constraint("shin.L", Constraint::copy_transforms("thigh.L"))
            .unwrap();
        arm.bind_driver(
            DriverTarget::ConstraintInfluence {
                constraint: handle.clone(),
            },
            prop,
            DriverFormula::Direct,
        )
        .unwrap();
        assert_eq!(arm.drivers().len(), 1);
        arm.remove_constraint(&handle).unwrap();
        assert!(arm.drivers().is_empty());
        assert!(arm.constraint(&handle).is_err());
    }

    #[test]
    fn test_effective_influence_follows_clamped_property() {
        let mut arm = leg();
        let prop = arm
            .add_driven_property("thigh.L", CustomProperty::float("IK/FK", 0.0, 0.0, 1.0))
            .unwrap();
        let handle = arm
            .add_constraint("shin.L", Constraint::copy_transforms("thigh.L"))
            .unwrap();
        arm.bind_driver(
            DriverTarget::ConstraintInfluence {
                constraint: handle.clone(),
            },
            prop.clone(),
            DriverFormula::Complement,
        )
        .unwrap();
        assert_eq!(arm.effective_influence(&handle).unwrap(), 1.0);
        assert_eq!(arm.set_property_value(&prop, 7.0).unwrap(), 1.0);
        assert_eq!(arm.effective_influence(&handle).unwrap(), 0.0);
    }

    #[test]
    fn test_rename_updates_references() {
        let mut arm = leg();
        arm.rename_bone("thigh.L", "ORG-thigh.L").unwrap();
        assert_eq!(arm.bone("shin.L").unwrap().parent.as_deref(), Some("ORG-thigh.L"));
        assert!(arm.bone("thigh.L").is_none());
        assert!(arm.rename_bone("shin.L", "ORG-thigh.L").is_err());
    }

    #[test]
    fn test_serde_round_trip_preserves_ids() {
        let mut arm = leg();
        arm.add_constraint("shin.L", Constraint::copy_location("thigh.L"))
            .unwrap();
        let json = serde_json::to_string(&arm).unwrap();
        let mut back: Armature = serde_json::from_str(&json).unwrap();
        assert_eq!(back, arm);
        let h = back
            .add_constraint("thigh.L", Constraint::copy_scale("shin.L"))
            .unwrap();
        assert_eq!(h.id, 2);
    }
}
