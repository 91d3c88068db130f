//! Whole-armature generation.
//!
//! Runs every typed bone's rig through discovery, the structural phase and
//! the pose phase, in that order, inside one transaction. Any failure leaves
//! the armature exactly as it was handed in.

use chainrig_armature::naming::org;
use chainrig_armature::{Armature, BoneGraph, Transaction};
use tracing::{debug, info, info_span};

use crate::error::{ConfigError, GenerateResult};
use crate::report::{GenerationReport, RigReport};
use crate::rigs::{RigBuilder, RigRegistry};

/// Name of the armature-wide root bone. A metarig bone with this name is
/// kept as is.
pub const ROOT_BONE: &str = "root";

/// A rig-typed bone and its discovered plan.
struct Planned {
    base: String,
    rig_type: String,
    builder: Box<dyn RigBuilder>,
}

/// Typed bones in armature order with their rig type.
pub fn typed_bones(graph: &dyn BoneGraph) -> Vec<(String, String)> {
    graph
        .bone_names()
        .into_iter()
        .filter_map(|name| {
            let rig_type = graph.rig_type(&name)?.to_string();
            Some((name, rig_type))
        })
        .collect()
}

/// Runs discovery for every typed bone without touching the graph.
///
/// This is everything `generate` checks before its first mutation.
pub fn discover_all(
    graph: &dyn BoneGraph,
    registry: &RigRegistry,
) -> GenerateResult<Vec<(String, String, Box<dyn RigBuilder>)>> {
    let mut planned = Vec::new();
    for (base, rig_type) in typed_bones(graph) {
        let generator = registry.get(&rig_type).ok_or_else(|| ConfigError::UnknownRigType {
            bone: base.clone(),
            rig_type: rig_type.clone(),
        })?;
        let builder = generator.discover(graph, &base)?;
        debug!(base = %base, rig_type = %rig_type, chains = builder.chain_set().chains.len(), "discovered");
        planned.push((base, rig_type, builder));
    }
    Ok(planned)
}

/// Generates every rig on `armature`.
///
/// Original bones are renamed to their `ORG-` form and stop deforming, a
/// `root` bone is added when missing, and every parentless bone ends up under
/// it. On error the armature is restored.
pub fn generate(armature: &mut Armature, registry: &RigRegistry) -> GenerateResult<GenerationReport> {
    let span = info_span!("generate", armature = %armature.name());
    let _guard = span.enter();

    let planned: Vec<Planned> = discover_all(&*armature, registry)?
        .into_iter()
        .map(|(base, rig_type, builder)| Planned {
            base,
            rig_type,
            builder,
        })
        .collect();

    let armature_name = armature.name().to_string();
    let mut txn = Transaction::begin(armature);
    let mut rigs = Vec::with_capacity(planned.len());
    let mut posers = Vec::with_capacity(planned.len());
    {
        let mut edit = txn.edit();

        for name in edit.graph().bone_names() {
            if name == ROOT_BONE {
                continue;
            }
            let renamed = org(&name);
            edit.rename_bone(&name, &renamed)?;
            edit.set_deform(&renamed, false)?;
        }
        if !edit.contains(ROOT_BONE) {
            let root = edit.new_bone(ROOT_BONE)?;
            edit.set_deform(&root, false)?;
        }

        for Planned {
            base,
            rig_type,
            builder,
        } in planned
        {
            let generator = registry.get(&rig_type).ok_or_else(|| ConfigError::UnknownRigType {
                bone: base.clone(),
                rig_type: rig_type.clone(),
            })?;
            let chains = builder.chain_set().clone();
            let before = edit.created();
            let poser = builder.build(&mut edit)?;
            let bones_created = edit.created() - before;
            debug!(base = %base, rig_type = %rig_type, bones_created, "built");
            rigs.push(RigReport {
                base: chains.base.clone(),
                rig_type,
                stages: generator.stages().to_vec(),
                chains,
                controls: Vec::new(),
                ui_panel: None,
                bones_created,
            });
            posers.push(poser);
        }

        for name in edit.graph().bone_names() {
            if name != ROOT_BONE && edit.bone(&name)?.parent.is_none() {
                edit.set_parent(&name, ROOT_BONE, false)?;
            }
        }

        let mut pose = edit.into_pose();
        for (report, poser) in rigs.iter_mut().zip(posers) {
            let output = poser.pose(&mut pose)?;
            info!(
                base = %report.base,
                rig_type = %report.rig_type,
                controls = output.controls.len(),
                "generated rig"
            );
            report.controls = output.controls;
            report.ui_panel = output.ui;
        }
    }

    let total_bones = txn.graph().bone_names().len();
    txn.commit();
    Ok(GenerationReport {
        armature: armature_name,
        rigs,
        total_bones,
    })
}
