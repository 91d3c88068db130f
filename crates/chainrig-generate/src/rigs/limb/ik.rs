//! Two-bone IK chain with pole target.

use std::f64::consts::FRAC_PI_2;

use chainrig_armature::math::EPSILON;
use chainrig_armature::naming::{qualified, Role};
use chainrig_armature::{
    ChannelLocks, Constraint, EditPhase, IkSettings, PosePhase, RotationMode, Vec3, WidgetShape,
};
use tracing::warn;

use super::{IkBones, LimbPlan};
use crate::error::GenerateResult;

pub(crate) const IK_STRETCH_AMOUNT: f64 = 0.1;
pub(crate) const POLE_ANGLE: f64 = -FRAC_PI_2;

/// Direction from the knee/elbow to the pole target: against the summed Z
/// axes of the upper and lower bones. Falls back to the upper bone's -Z when
/// the two cancel out.
pub(crate) fn pole_direction(upper_z: Vec3, lower_z: Vec3) -> Vec3 {
    match (-(upper_z + lower_z)).try_normalize(EPSILON) {
        Some(dir) => dir,
        None => {
            warn!("limb Z axes cancel out, pole falls back to the upper bone's -Z");
            -upper_z.try_normalize(EPSILON).unwrap_or_else(Vec3::z)
        }
    }
}

pub(super) fn build(
    edit: &mut EditPhase<'_>,
    plan: &LimbPlan,
    parent: &str,
) -> GenerateResult<IkBones> {
    let [upper, lower, end] = &plan.org;

    let ctrl = edit.copy_bone(upper, &qualified(upper, Role::Ctrl, "ik"))?;
    let mch_ik = edit.copy_bone(lower, &qualified(upper, Role::Mch, "ik"))?;
    let mch_target = edit.copy_bone(end, &qualified(upper, Role::Mch, "ik_target"))?;
    edit.scale_length(&mch_target, 0.25)?;

    let mch_stretch = edit.copy_bone(upper, &qualified(upper, Role::Mch, "ik_stretch"))?;
    let end_head = edit.bone(end)?.head;
    edit.set_tail(&mch_stretch, end_head)?;

    edit.set_parent(&ctrl, parent, false)?;
    edit.set_parent(&mch_stretch, parent, false)?;
    edit.set_parent(&mch_ik, &ctrl, false)?;

    let (upper_tail, upper_len, upper_z) = {
        let b = edit.bone(upper)?;
        (b.tail, b.length(), b.z_axis())
    };
    let lower_z = edit.bone(lower)?.z_axis();
    let offset = pole_direction(upper_z, lower_z) * (upper_len / 2.0);

    let pole = edit.copy_bone(upper, &qualified(upper, Role::Ctrl, "ik_target"))?;
    edit.set_parent(&pole, &mch_stretch, false)?;
    edit.set_tail(&pole, upper_tail)?;
    edit.set_head(&pole, upper_tail + offset)?;

    Ok(IkBones {
        ctrl,
        mch_ik,
        mch_target,
        mch_stretch,
        pole,
    })
}

/// Two IK constraints on the IK mechanism: without and with the pole. The
/// `pole_vector` switch mutes one of them.
pub(super) fn pose(pose: &mut PosePhase<'_>, plan: &LimbPlan, ik: &IkBones) -> GenerateResult<()> {
    pose.add_constraint(&ik.mch_ik, Constraint::ik(&ik.mch_target, 2))?;
    pose.add_constraint(
        &ik.mch_ik,
        Constraint::ik(&ik.mch_target, 2).with_pole(&ik.pole, POLE_ANGLE),
    )?;

    let mut lock = [true; 3];
    lock[plan.params.rot_axis.index()] = false;
    pose.set_ik(
        &ik.mch_ik,
        IkSettings {
            lock,
            stretch: IK_STRETCH_AMOUNT,
            limit_z: None,
        },
    )?;
    pose.set_ik(
        &ik.ctrl,
        IkSettings {
            stretch: IK_STRETCH_AMOUNT,
            ..IkSettings::default()
        },
    )?;

    pose.set_locks(
        &ik.ctrl,
        ChannelLocks {
            rotation: [true, false, true],
            ..ChannelLocks::default()
        },
    )?;
    pose.set_rotation_mode(&ik.ctrl, RotationMode::Zxy)?;
    pose.assign_widget(&ik.ctrl, WidgetShape::IkArrow, 1.0)?;
    pose.assign_widget(&ik.pole, WidgetShape::Sphere, 1.0)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pole_points_against_bend() {
        let dir = pole_direction(Vec3::new(0.0, 1.0, 0.0), Vec3::new(0.0, 1.0, 0.0));
        assert!((dir - Vec3::new(0.0, -1.0, 0.0)).norm() < 1e-9);
    }

    #[test]
    fn test_degenerate_pole_falls_back() {
        let dir = pole_direction(Vec3::new(0.0, 0.0, 1.0), Vec3::new(0.0, 0.0, -1.0));
        assert!((dir - Vec3::new(0.0, 0.0, -1.0)).norm() < 1e-9);
    }
}
