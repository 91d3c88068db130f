//! IK/FK switch on the org chain.

use chainrig_armature::{Constraint, CustomProperty, DriverFormula, PosePhase};

use super::drivers::IK_FK;
use super::{LimbBones, LimbPlan};
use crate::error::GenerateResult;

/// Each org bone copies its IK bone weighted by `IK/FK`, then its FK control
/// weighted by `1 - IK/FK`. 0 is pure FK, 1 is pure IK.
pub(super) fn pose(pose: &mut PosePhase<'_>, plan: &LimbPlan, bones: &LimbBones) -> GenerateResult<()> {
    let switch = pose.add_property(
        &bones.parent.ctrl,
        CustomProperty::float(IK_FK, 0.0, 0.0, 1.0).with_description("IK/FK Switch"),
    )?;

    let iks = [&bones.ik.ctrl, &bones.ik.mch_ik, &bones.ik.mch_target];
    for ((org, ik), fk) in plan.org.iter().zip(iks).zip(&bones.fk.ctrl) {
        let to_ik = pose.add_constraint(org, Constraint::copy_transforms(ik))?;
        pose.drive_influence(&to_ik, &switch, DriverFormula::Direct)?;
        let to_fk = pose.add_constraint(org, Constraint::copy_transforms(fk))?;
        pose.drive_influence(&to_fk, &switch, DriverFormula::Complement)?;
    }
    Ok(())
}
