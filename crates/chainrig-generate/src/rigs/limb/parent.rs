//! Limb parent mechanism and the settings control.

use chainrig_armature::naming::{qualified, Role};
use chainrig_armature::{
    Constraint, CustomProperty, DriverFormula, EditPhase, PosePhase, WidgetShape, WorldAxis,
};

use super::drivers::FK_LIMB_FOLLOW;
use super::{LimbPlan, ParentBones};
use crate::error::GenerateResult;
use crate::pipeline::ROOT_BONE;

pub(super) fn build(edit: &mut EditPhase<'_>, plan: &LimbPlan) -> GenerateResult<ParentBones> {
    let upper = plan.upper();
    let quarter = edit.bone(upper)?.length() / 4.0;

    // Copies keep the upper bone's parent.
    let mch = edit.copy_bone(upper, &qualified(upper, Role::Mch, "parent"))?;
    edit.orient_to_world_axis(&mch, WorldAxis::Y, 1.0, false)?;
    edit.set_length(&mch, quarter)?;
    edit.set_roll(&mch, 0.0)?;

    let ctrl = edit.copy_bone(upper, &qualified(upper, Role::Ctrl, "parent"))?;
    edit.set_length(&ctrl, quarter)?;
    edit.set_parent(&ctrl, upper, false)?;
    edit.set_roll(&ctrl, 0.0)?;

    Ok(ParentBones { mch, ctrl })
}

/// The parent mechanism follows root rotation by `FK_limb_follow` and root
/// scale always.
pub(super) fn pose(pose: &mut PosePhase<'_>, bones: &ParentBones) -> GenerateResult<()> {
    let rotation = pose.add_constraint(&bones.mch, Constraint::copy_rotation(ROOT_BONE))?;
    pose.add_constraint(&bones.mch, Constraint::copy_scale(ROOT_BONE))?;

    let follow = pose.add_property(
        &bones.ctrl,
        CustomProperty::float(FK_LIMB_FOLLOW, 0.0, 0.0, 1.0).with_description(FK_LIMB_FOLLOW),
    )?;
    pose.drive_influence(&rotation, &follow, DriverFormula::Direct)?;
    pose.assign_widget(&bones.ctrl, WidgetShape::Gear, 1.0)?;
    Ok(())
}
