//! IK end control (hand or foot) and its space sockets.
//!
//! The control sits under a socket that copies either the root-space
//! mechanism or, when the limb has a parent, the parent-space mechanism.

use chainrig_armature::naming::{qualified, Role};
use chainrig_armature::{
    Constraint, CustomProperty, DriverFormula, EditPhase, Limit, PosePhase, Space, WidgetShape,
};

use super::drivers::IK_STRETCH;
use super::{LimbBones, LimbKind, LimbPlan, TerminalBones};
use crate::error::GenerateResult;
use crate::pipeline::ROOT_BONE;

const SOCKET_SCALE: f64 = 0.8;
const SOCKET_ROOT_SCALE: f64 = 0.7;
const SOCKET_PARENT_SCALE: f64 = 0.6;

/// Maximum Y scale of the stretch mechanism when IK stretch is off.
pub(crate) const STRETCH_LIMIT: f64 = 1.05;

pub(super) fn build(edit: &mut EditPhase<'_>, plan: &LimbPlan) -> GenerateResult<TerminalBones> {
    let end = plan.end();

    let ctrl = edit.copy_bone(end, &qualified(end, Role::Ctrl, "ik"))?;
    let socket = edit.copy_bone(end, &qualified(end, Role::Mch, "ik_socket"))?;
    edit.scale_length(&socket, SOCKET_SCALE)?;
    edit.clear_parent(&socket)?;
    edit.set_parent(&ctrl, &socket, false)?;

    let socket_root = edit.copy_bone(end, &qualified(end, Role::Mch, "ik_root"))?;
    edit.scale_length(&socket_root, SOCKET_ROOT_SCALE)?;
    edit.set_parent(&socket_root, ROOT_BONE, false)?;

    let socket_parent = if plan.has_parent {
        let name = edit.copy_bone(end, &qualified(end, Role::Mch, "ik_parent"))?;
        edit.scale_length(&name, SOCKET_PARENT_SCALE)?;
        let top = topmost_ancestor(edit, plan.upper())?;
        edit.set_parent(&name, &top, false)?;
        Some(name)
    } else {
        None
    };

    Ok(TerminalBones {
        ctrl,
        socket,
        socket_root,
        socket_parent,
    })
}

/// Outermost ancestor of `bone`, excluding `bone` itself.
fn topmost_ancestor(edit: &EditPhase<'_>, bone: &str) -> GenerateResult<String> {
    let mut current = bone.to_string();
    while let Some(parent) = edit.bone(&current)?.parent.clone() {
        current = parent;
    }
    Ok(current)
}

pub(super) fn pose(pose: &mut PosePhase<'_>, plan: &LimbPlan, bones: &LimbBones) -> GenerateResult<()> {
    let t = &bones.terminal;
    pose.add_constraint(&t.socket, Constraint::copy_transforms(&t.socket_root))?;
    if let Some(parent) = &t.socket_parent {
        pose.add_constraint(
            &t.socket,
            Constraint::copy_transforms(parent).with_influence(0.0),
        )?;
    }

    // The IK target follows the stretch mechanism's tail, which aims at the
    // end control and only stretches past the limit when IK_Stretch is on.
    let ik = &bones.ik;
    let target = bones.stretch_target();
    pose.add_constraint(
        &ik.mch_target,
        Constraint::copy_location(&ik.mch_stretch).with_head_tail(1.0),
    )?;
    pose.add_constraint(
        &ik.mch_stretch,
        Constraint::damped_track(target).with_head_tail(1.0),
    )?;
    pose.add_constraint(
        &ik.mch_stretch,
        Constraint::stretch_to(target).with_head_tail(1.0),
    )?;
    let limit = pose.add_constraint(
        &ik.mch_stretch,
        Constraint::limit_scale(
            None,
            Some(Limit {
                min: None,
                max: Some(STRETCH_LIMIT),
            }),
            None,
        )
        .in_owner_space(Space::Local),
    )?;
    let stretch = pose.add_property(
        &bones.parent.ctrl,
        CustomProperty::float(IK_STRETCH, 1.0, 0.0, 1.0).with_description("IK Stretch"),
    )?;
    pose.drive_influence(&limit, &stretch, DriverFormula::Complement)?;

    let shape = match plan.kind {
        LimbKind::Leg => WidgetShape::Foot,
        LimbKind::Limb => WidgetShape::Hand,
    };
    pose.assign_widget(&t.ctrl, shape, 1.0)?;
    Ok(())
}
