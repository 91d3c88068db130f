//! Constraint weaving: DEF bones follow MCH bones and aim at the next control.

use chainrig_armature::{Constraint, ConstraintHandle, PosePhase, WidgetShape};

use crate::error::GenerateResult;
use crate::roles::RoleSet;

/// Engine `constrain` stage.
///
/// DEF[i] copies the location of MCH[i]; when CTRL[i+1] exists it then
/// damped-tracks and stretches to it, in that order.
pub fn weave_def_constraints(
    pose: &mut PosePhase<'_>,
    roles: &RoleSet,
) -> GenerateResult<Vec<ConstraintHandle>> {
    let mut handles = Vec::new();
    for (chain, defs) in roles.def.iter() {
        for (i, def) in defs.iter().enumerate() {
            if let Some(mch) = roles.get_mch_by_index(chain, i) {
                handles.push(pose.add_constraint(def, Constraint::copy_location(mch))?);
            }
            if let Some(next) = roles.get_ctrl_by_index(chain, i + 1) {
                handles.push(pose.add_constraint(def, Constraint::damped_track(next))?);
                handles.push(pose.add_constraint(def, Constraint::stretch_to(next))?);
            }
        }
    }
    Ok(handles)
}

/// Engine `widget` stage: every control gets a sphere.
pub fn assign_ctrl_widgets(pose: &mut PosePhase<'_>, roles: &RoleSet) -> GenerateResult<()> {
    for ctrl in roles.ctrl.bones() {
        pose.assign_widget(ctrl, WidgetShape::Sphere, 1.0)?;
    }
    Ok(())
}
