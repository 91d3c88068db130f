//! FK controls.

use chainrig_armature::naming::{qualified, Role};
use chainrig_armature::{ChannelLocks, Constraint, EditPhase, PosePhase, WidgetShape};

use super::{FkBones, LimbPlan};
use crate::error::GenerateResult;
use crate::pipeline::ROOT_BONE;

pub(super) fn build(
    edit: &mut EditPhase<'_>,
    plan: &LimbPlan,
    parent: &str,
) -> GenerateResult<FkBones> {
    let mut ctrl = Vec::with_capacity(plan.org.len());
    for org in &plan.org {
        let name = edit.copy_bone(org, &qualified(org, Role::Ctrl, "fk"))?;
        edit.set_collection(&name, plan.params.fk_collection.as_deref())?;
        ctrl.push(name);
    }

    // The end control hangs off a scale-isolating mechanism.
    let end = plan.end();
    let mch = edit.copy_bone(end, &qualified(end, Role::Mch, "fk"))?;
    edit.scale_length(&mch, 0.25)?;

    edit.set_parent(&ctrl[0], parent, false)?;
    edit.set_parent(&ctrl[1], &ctrl[0], true)?;
    edit.set_parent(&mch, &ctrl[1], true)?;
    edit.set_parent(&ctrl[2], &mch, false)?;

    Ok(FkBones { ctrl, mch })
}

pub(super) fn pose(pose: &mut PosePhase<'_>, fk: &FkBones) -> GenerateResult<()> {
    pose.add_constraint(&fk.mch, Constraint::copy_scale(ROOT_BONE))?;

    pose.set_locks(
        &fk.ctrl[2],
        ChannelLocks {
            location: [true; 3],
            ..ChannelLocks::default()
        },
    )?;
    pose.assign_widget(&fk.ctrl[0], WidgetShape::Limb, 1.0)?;
    pose.assign_widget(&fk.ctrl[1], WidgetShape::Limb, 1.0)?;
    pose.assign_widget(&fk.ctrl[2], WidgetShape::Circle, 0.4)?;
    Ok(())
}
