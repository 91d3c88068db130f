//! Leg foot: heel control, roll and rock mechanism, toe control.
//!
//! The mechanism chain is roll1 → roll2 → rock1 → rock2 → foot IK control.
//! Rolling the heel control forward lifts the heel (roll1), backward pivots
//! on the heel (roll2); rocking it sideways pivots on either foot edge.

use std::f64::consts::TAU;

use chainrig_armature::math::{midpoint, EPSILON};
use chainrig_armature::naming::{ctrl, deform, qualified, BoneName, Role, Side};
use chainrig_armature::{
    AxisMask, ChannelLocks, Constraint, DriverFormula, EditPhase, Limit, PosePhase, PropertyRef,
    Space, WidgetShape, WorldAxis,
};
use tracing::warn;

use super::drivers::IK_FK;
use super::{FootBones, LimbBones, LimbPlan, TerminalBones};
use crate::error::{ConfigError, GenerateResult};

pub(super) fn build(
    edit: &mut EditPhase<'_>,
    plan: &LimbPlan,
    terminal: &TerminalBones,
    defs: &mut Vec<String>,
) -> GenerateResult<FootBones> {
    let foot = plan.end();
    let (Some(toe), Some(heel)) = (plan.toe.as_deref(), plan.heel.as_deref()) else {
        return Err(ConfigError::missing_bone(plan.rig_type(), plan.upper(), "a toe and a heel").into());
    };

    let (foot_head, foot_tail, foot_len, foot_x) = {
        let b = edit.bone(foot)?;
        (b.head, b.tail, b.length(), b.x_axis())
    };
    let mut flat = foot_head - foot_tail;
    flat.z = 0.0;
    let has_flat = flat.norm() > EPSILON;
    if !has_flat {
        warn!(foot, "foot points straight down, heel keeps the foot orientation");
    }

    let heel_ctrl = edit.copy_bone(foot, &qualified(foot, Role::Ctrl, "heel_ik"))?;
    if has_flat {
        edit.align_y_axis(&heel_ctrl, flat)?;
    }
    edit.align_x_axis(&heel_ctrl, foot_x)?;
    edit.set_length(&heel_ctrl, foot_len / 2.0)?;

    // The foot control points backwards along world Y.
    edit.orient_to_world_axis(&terminal.ctrl, WorldAxis::Y, 1.0, true)?;
    edit.set_parent(&heel_ctrl, &terminal.ctrl, false)?;

    let (heel_head, heel_tail, heel_len) = {
        let b = edit.bone(heel)?;
        (b.head, b.tail, b.length())
    };

    let roll1 = edit.copy_bone(foot, &qualified(heel, Role::Mch, "roll"))?;
    edit.flip_bone(&roll1)?;
    edit.align_x_axis(&roll1, foot_x)?;

    let roll2 = edit.copy_bone(toe, &qualified(heel, Role::Mch, "roll"))?;
    edit.put_bone(&roll2, midpoint(&heel_head, &heel_tail))?;
    edit.scale_length(&roll2, 0.25)?;

    let rock1 = edit.copy_bone(heel, &qualified(heel, Role::Mch, "rock"))?;
    edit.orient_to_world_axis(&rock1, WorldAxis::Y, 1.0, true)?;
    let rock2 = edit.copy_bone(heel, &qualified(heel, Role::Mch, "rock"))?;
    for rock in [&rock1, &rock2] {
        if has_flat {
            edit.align_y_axis(rock, flat)?;
        }
        edit.set_length(rock, heel_len / 2.0)?;
    }

    edit.set_parent(&roll1, &roll2, false)?;
    edit.set_parent(&roll2, &rock1, false)?;
    edit.set_parent(&rock1, &rock2, false)?;
    edit.set_parent(&rock2, &terminal.ctrl, false)?;

    let toe_def = edit.copy_bone(toe, &deform(toe))?;
    edit.set_deform(&toe_def, true)?;
    if let Some(last) = defs.last() {
        edit.set_parent(&toe_def, last, true)?;
    }
    defs.push(toe_def);

    let toe_ctrl = edit.copy_bone(toe, &ctrl(toe))?;
    edit.set_parent(&toe_ctrl, toe, false)?;

    Ok(FootBones {
        heel_ctrl,
        roll: [roll1, roll2],
        rock: [rock1, rock2],
        toe_ctrl,
    })
}

/// Y rotation limits of rock bone `index`. Each rock bone pivots one way;
/// anything but a left leg swaps the directions.
pub(crate) fn rock_limits(index: usize, side: Option<Side>) -> Limit {
    let outward = (index == 0) == (side == Some(Side::L));
    if outward {
        Limit::range(0.0, TAU)
    } else {
        Limit::range(-TAU, 0.0)
    }
}

fn local_rotation_limit(x: Option<Limit>, y: Option<Limit>) -> Constraint {
    Constraint::limit_rotation(x, y, None).in_owner_space(Space::Local)
}

pub(super) fn pose(
    pose: &mut PosePhase<'_>,
    plan: &LimbPlan,
    bones: &LimbBones,
    foot: &FootBones,
) -> GenerateResult<()> {
    let heel = &foot.heel_ctrl;
    let [roll1, roll2] = &foot.roll;

    pose.add_constraint(
        roll1,
        Constraint::copy_rotation(heel).in_space(Space::Local, Space::Local),
    )?;
    pose.add_constraint(roll1, local_rotation_limit(Some(Limit::range(0.0, TAU)), None))?;
    pose.add_constraint(
        roll2,
        Constraint::copy_rotation(heel)
            .with_axes(AxisMask::only_x())
            .with_inverted(AxisMask::only_x())
            .in_space(Space::Local, Space::Local),
    )?;
    pose.add_constraint(roll2, local_rotation_limit(Some(Limit::range(0.0, TAU)), None))?;

    for (i, rock) in foot.rock.iter().enumerate() {
        let side = BoneName::parse(rock).side;
        pose.add_constraint(
            rock,
            Constraint::copy_rotation(heel)
                .with_axes(AxisMask::only_y())
                .in_space(Space::Local, Space::Local),
        )?;
        pose.add_constraint(rock, local_rotation_limit(None, Some(rock_limits(i, side))))?;
    }

    // The toe follows the roll only in IK.
    if let Some(toe) = plan.toe.as_deref() {
        let follow = pose.add_constraint(toe, Constraint::copy_transforms(roll2))?;
        let switch = PropertyRef::new(&bones.parent.ctrl, IK_FK);
        pose.drive_influence(&follow, &switch, DriverFormula::Direct)?;
    }

    if let [.., foot_def, toe_def] = bones.def.as_slice() {
        pose.add_constraint(foot_def, Constraint::damped_track(&foot.toe_ctrl))?;
        pose.add_constraint(foot_def, Constraint::stretch_to(&foot.toe_ctrl))?;
        pose.add_constraint(toe_def, Constraint::copy_transforms(&foot.toe_ctrl))?;
    }

    pose.set_locks(
        heel,
        ChannelLocks {
            location: [true; 3],
            rotation: [false, false, true],
            scale: [true; 3],
        },
    )?;
    pose.assign_widget(heel, WidgetShape::BallSocket, 1.0)?;
    pose.assign_widget(&foot.toe_ctrl, WidgetShape::Circle, 0.4)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rock_limits_mirror_by_side() {
        assert_eq!(rock_limits(0, Some(Side::L)), Limit::range(0.0, TAU));
        assert_eq!(rock_limits(1, Some(Side::L)), Limit::range(-TAU, 0.0));
        assert_eq!(rock_limits(0, Some(Side::R)), Limit::range(-TAU, 0.0));
        assert_eq!(rock_limits(1, Some(Side::R)), Limit::range(0.0, TAU));
    }

    #[test]
    fn test_unsided_reads_as_right() {
        assert_eq!(rock_limits(0, None), rock_limits(0, Some(Side::R)));
        assert_eq!(rock_limits(1, None), rock_limits(1, Some(Side::R)));
    }
}
