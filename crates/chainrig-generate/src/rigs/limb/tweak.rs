//! Tweak controls: `segments` sub-joints per non-terminal bone plus one at
//! the end bone's head.

use chainrig_armature::naming::{qualified, Role};
use chainrig_armature::{ChannelLocks, Constraint, EditPhase, PosePhase, RotationMode, WidgetShape};

use super::{LimbPlan, TweakBones};
use crate::error::GenerateResult;
use crate::pipeline::ROOT_BONE;

pub(super) fn build(edit: &mut EditPhase<'_>, plan: &LimbPlan) -> GenerateResult<TweakBones> {
    let segments = plan.params.segments as f64;
    let mut tweaks = TweakBones::default();

    for (i, org) in plan.org.iter().enumerate() {
        if i + 1 < plan.org.len() {
            for j in 0..plan.params.segments {
                let mch = edit.copy_bone(org, &qualified(org, Role::Mch, "tweak"))?;
                let ctrl = edit.copy_bone(org, &qualified(org, Role::Ctrl, "tweak"))?;
                edit.scale_length(&mch, 1.0 / segments)?;
                edit.scale_length(&ctrl, 1.0 / segments)?;
                if j > 0 {
                    if let (Some(prev_mch), Some(prev_ctrl)) = (tweaks.mch.last(), tweaks.ctrl.last()) {
                        let mch_pos = edit.bone(prev_mch)?.tail;
                        let ctrl_pos = edit.bone(prev_ctrl)?.tail;
                        edit.put_bone(&mch, mch_pos)?;
                        edit.put_bone(&ctrl, ctrl_pos)?;
                    }
                }
                edit.set_parent(&mch, org, false)?;
                edit.set_parent(&ctrl, &mch, false)?;
                tweaks.mch.push(mch);
                tweaks.ctrl.push(ctrl);
            }
        } else {
            // The end bone is not subdivided; its tweak sits on its head.
            let prev = &plan.org[i - 1];
            let length = edit.bone(org)?.length();
            let mch = edit.copy_bone(prev, &qualified(org, Role::Mch, "tweak"))?;
            edit.set_length(&mch, length / 4.0)?;
            let pos = edit.bone(prev)?.tail;
            edit.put_bone(&mch, pos)?;

            let ctrl = edit.copy_bone(org, &qualified(org, Role::Ctrl, "tweak"))?;
            edit.set_length(&ctrl, length / 2.0)?;

            edit.set_parent(&mch, org, false)?;
            edit.set_parent(&ctrl, &mch, false)?;
            tweaks.mch.push(mch);
            tweaks.ctrl.push(ctrl);
        }
    }

    for (mch, ctrl) in tweaks.mch.iter().zip(&tweaks.ctrl) {
        edit.scale_length(mch, 0.25)?;
        edit.scale_length(ctrl, 0.5)?;
        edit.set_collection(ctrl, plan.params.tweak_collection.as_deref())?;
    }
    Ok(tweaks)
}

/// Interior tweak mechanism `i`: copies the near flanking control fully, the
/// far one by `(i - offset) / segments`, and tracks the far one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum TweakLink {
    /// First and middle tweaks follow root scale.
    RootScale,
    Blend {
        near: usize,
        far: usize,
        influence: f64,
    },
    /// The last tweak follows its org bone only.
    Free,
}

/// Constraint layout of `count` tweak mechanisms.
pub(crate) fn tweak_links(count: usize, segments: u32) -> Vec<TweakLink> {
    let first = 0;
    let middle = count / 2;
    let last = count.saturating_sub(1);
    let segments = segments.max(1) as f64;
    (0..count)
        .map(|i| {
            if i == first || i == middle {
                TweakLink::RootScale
            } else if i == last {
                TweakLink::Free
            } else if i < middle {
                TweakLink::Blend {
                    near: first,
                    far: middle,
                    influence: i as f64 / segments,
                }
            } else {
                TweakLink::Blend {
                    near: middle,
                    far: last,
                    influence: (i as f64 - segments) / segments,
                }
            }
        })
        .collect()
}

pub(super) fn pose(pose: &mut PosePhase<'_>, plan: &LimbPlan, tweaks: &TweakBones) -> GenerateResult<()> {
    for (i, link) in tweak_links(tweaks.mch.len(), plan.params.segments)
        .into_iter()
        .enumerate()
    {
        let mch = &tweaks.mch[i];
        match link {
            TweakLink::RootScale => {
                pose.add_constraint(mch, Constraint::copy_scale(ROOT_BONE))?;
            }
            TweakLink::Blend {
                near,
                far,
                influence,
            } => {
                pose.add_constraint(mch, Constraint::copy_transforms(&tweaks.ctrl[near]))?;
                pose.add_constraint(
                    mch,
                    Constraint::copy_transforms(&tweaks.ctrl[far]).with_influence(influence),
                )?;
                pose.add_constraint(mch, Constraint::damped_track(&tweaks.ctrl[far]))?;
            }
            TweakLink::Free => {}
        }
    }

    let locks = ChannelLocks {
        location: [false; 3],
        rotation: [true, false, true],
        scale: [false, true, false],
    };
    for ctrl in &tweaks.ctrl {
        pose.set_locks(ctrl, locks)?;
        pose.set_rotation_mode(ctrl, RotationMode::Zxy)?;
        pose.assign_widget(ctrl, WidgetShape::Sphere, 1.0)?;
    }
    Ok(())
}
