//! Limb settings properties and the drivers bound to them.

use chainrig_armature::{
    ConstraintKind, ConstraintType, CustomProperty, DriverFormula, DriverTarget, PosePhase,
    PropertyRef,
};

use super::LimbBones;
use crate::error::GenerateResult;

/// Parent mechanism follows root rotation.
pub const FK_LIMB_FOLLOW: &str = "FK_limb_follow";
/// IK/FK blend: 0 = FK, 1 = IK.
pub const IK_FK: &str = "IK/FK";
/// IK stretch past the rest length.
pub const IK_STRETCH: &str = "IK_Stretch";
/// IK end control follows its sockets.
pub const IK_FOLLOW: &str = "IK_follow";
/// Root space vs limb parent space for the IK end control.
pub const ROOT_PARENT: &str = "root/parent";
/// Use the pole target instead of the upper IK control's rotation.
pub const POLE_VECTOR: &str = "pole_vector";
/// B-bone ease at an interior tweak.
pub const RUBBER_TWEAK: &str = "rubber_tweak";

/// Adds the follow, space and pole switches. Returns the property names the
/// settings control carries, in panel order.
pub(super) fn pose(pose: &mut PosePhase<'_>, bones: &LimbBones) -> GenerateResult<Vec<String>> {
    let owner = &bones.parent.ctrl;
    let mut properties = vec![
        IK_FK.to_string(),
        FK_LIMB_FOLLOW.to_string(),
        IK_STRETCH.to_string(),
    ];

    // Socket constraints: [root] or [root, parent].
    let socket = pose.constraint_handles(&bones.terminal.socket)?;

    let follow = pose.add_property(
        owner,
        CustomProperty::toggle(IK_FOLLOW, true).with_description(IK_FOLLOW),
    )?;
    for handle in socket.iter().take(2) {
        pose.drive_mute(handle, &follow, DriverFormula::Complement)?;
    }
    properties.push(IK_FOLLOW.to_string());

    if let Some(parent_space) = socket.get(1) {
        let space = pose.add_property(
            owner,
            CustomProperty::float(ROOT_PARENT, 0.0, 0.0, 1.0).with_description(ROOT_PARENT),
        )?;
        pose.drive_influence(parent_space, &space, DriverFormula::Direct)?;
        properties.push(ROOT_PARENT.to_string());
    }

    let pole = pose.add_property(
        owner,
        CustomProperty::toggle(POLE_VECTOR, false).with_description(POLE_VECTOR),
    )?;
    bind_pole_vector(pose, bones, &pole)?;
    properties.push(POLE_VECTOR.to_string());

    Ok(properties)
}

/// With the pole on, the pole IK runs and the upper IK control hides; with it
/// off, the plain IK runs and the pole target hides.
fn bind_pole_vector(
    pose: &mut PosePhase<'_>,
    bones: &LimbBones,
    pole: &PropertyRef,
) -> GenerateResult<()> {
    pose.bind_driver(
        DriverTarget::BoneHide {
            bone: bones.ik.pole.clone(),
        },
        pole,
        DriverFormula::Complement,
    )?;
    pose.bind_driver(
        DriverTarget::BoneHide {
            bone: bones.ik.ctrl.clone(),
        },
        pole,
        DriverFormula::Direct,
    )?;

    for handle in pose.constraints_of_type(&bones.ik.mch_ik, &[ConstraintType::Ik])? {
        let has_pole = matches!(
            &pose.constraint(&handle)?.kind,
            ConstraintKind::Ik { pole: Some(_), .. }
        );
        let formula = if has_pole {
            DriverFormula::Complement
        } else {
            DriverFormula::Direct
        };
        pose.drive_mute(&handle, pole, formula)?;
    }
    Ok(())
}
