//! Segmented deform chain with rubber-hose B-bones.

use chainrig_armature::naming::deform;
use chainrig_armature::{
    BBone, Constraint, CustomProperty, DriverFormula, DriverTarget, EditPhase, PosePhase,
};

use super::drivers::RUBBER_TWEAK;
use super::LimbPlan;
use crate::error::GenerateResult;

/// `segments` deform bones per non-terminal org bone and one for the end,
/// connected head to tail.
pub(super) fn build(edit: &mut EditPhase<'_>, plan: &LimbPlan) -> GenerateResult<Vec<String>> {
    let segments = plan.params.segments;
    let mut defs: Vec<String> = Vec::new();

    for (i, org) in plan.org.iter().enumerate() {
        let pieces = if i + 1 < plan.org.len() { segments } else { 1 };
        for j in 0..pieces {
            let name = edit.copy_bone(org, &deform(org))?;
            edit.set_deform(&name, true)?;
            if pieces > 1 {
                edit.scale_length(&name, 1.0 / pieces as f64)?;
            }
            if j > 0 {
                if let Some(prev) = defs.last() {
                    let pos = edit.bone(prev)?.tail;
                    edit.put_bone(&name, pos)?;
                }
            }
            defs.push(name);
        }
    }

    for i in 1..defs.len() {
        edit.set_parent(&defs[i], &defs[i - 1], true)?;
    }

    let n = defs.len();
    for (i, name) in defs.iter().enumerate() {
        let mut bbone = BBone::default();
        if i + 1 < n {
            bbone.segments = plan.params.bbones;
        }
        if i == 0 || i + 1 == n {
            bbone.ease_in = 0.0;
        }
        if i + 2 >= n {
            bbone.ease_out = 0.0;
        }
        edit.set_bbone(name, bbone)?;
    }
    Ok(defs)
}

/// Rubber-tweak default for interior tweak `i` of `count`: the middle one
/// starts stiff.
pub(crate) fn rubber_default(i: usize, count: usize) -> f64 {
    if i == count / 2 {
        0.0
    } else {
        1.0
    }
}

/// DEF[i] copies tweak[i] and stretches to tweak[i+1]; interior tweaks carry a
/// `rubber_tweak` property driving the ease of the deform bones around them.
pub(super) fn pose(pose: &mut PosePhase<'_>, defs: &[String], tweaks: &[String]) -> GenerateResult<()> {
    for (i, (def, tweak)) in defs.iter().zip(tweaks).enumerate() {
        pose.add_constraint(def, Constraint::copy_transforms(tweak))?;
        if let Some(next) = tweaks.get(i + 1) {
            pose.add_constraint(def, Constraint::damped_track(next))?;
            pose.add_constraint(def, Constraint::stretch_to(next))?;
        }
    }

    let Some(interior) = tweaks.get(1..tweaks.len().saturating_sub(1)) else {
        return Ok(());
    };
    let mut rubber = Vec::with_capacity(interior.len());
    for (i, tweak) in interior.iter().enumerate() {
        let mut property =
            CustomProperty::float(RUBBER_TWEAK, rubber_default(i, interior.len()), 0.0, 2.0)
                .with_description(RUBBER_TWEAK);
        property.soft_max = 1.0;
        rubber.push(pose.add_property(tweak, property)?);
    }

    // Deform bones bent by the tweak chain, excluding the end bone.
    let bendy = tweaks.len().saturating_sub(1).min(defs.len());
    for (j, def) in defs[..bendy].iter().enumerate() {
        if j != 0 {
            if let Some(source) = rubber.get(j - 1) {
                pose.bind_driver(
                    DriverTarget::BBoneEaseIn { bone: def.clone() },
                    source,
                    DriverFormula::Direct,
                )?;
            }
        }
        if j + 1 != bendy {
            if let Some(source) = rubber.get(j) {
                pose.bind_driver(
                    DriverTarget::BBoneEaseOut { bone: def.clone() },
                    source,
                    DriverFormula::Direct,
                )?;
            }
        }
    }
    Ok(())
}
