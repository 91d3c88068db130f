//! Eyelid rig.
//!
//! An eye bone with exactly two lid chains. The eye gets an aim mechanism and
//! a target control; each lid gets a mechanism per bone that swings from the
//! eye center, plus the engine's controls and deform bones. Lid controls
//! follow a lid master with a falloff that weakens toward the corners.

use chainrig_armature::math::{midpoint, EPSILON};
use chainrig_armature::naming::{ctrl, mch, org, qualified, BoneName, Role};
use chainrig_armature::{
    BoneGraph, ConstraintType, EditPhase, PosePhase, Vec3, WidgetShape,
};
use serde::Serialize;
use tracing::{debug, warn};

use crate::discovery::{discover_lid_chains, paired_bone, ChainSet, LidPair};
use crate::error::{ConfigError, GenerateResult};
use crate::params::{read_params, EyelidParams};
use crate::recipe::apply_recipe;
use crate::report::RigOutput;
use crate::rigs::{RigBuilder, RigGenerator, RigPoser};
use crate::roles::RoleSet;
use crate::stage::{Binding, Stage, StageBinding};
use crate::synth::{collect_org, parent_subchain_ctrls, synthesize_ctrl, synthesize_def, CTRL_SCALE};
use crate::weave::{assign_ctrl_widgets, weave_def_constraints};

pub const RIG_TYPE: &str = "eyelid";

const STAGES: &[StageBinding] = &[
    StageBinding::new(Stage::Discover, Binding::Extended),
    StageBinding::new(Stage::SynthesizeMch, Binding::Replaced),
    StageBinding::new(Stage::SynthesizeDef, Binding::Engine),
    StageBinding::new(Stage::SynthesizeCtrl, Binding::Extended),
    StageBinding::new(Stage::Parent, Binding::Extended),
    StageBinding::new(Stage::Constrain, Binding::Extended),
    StageBinding::new(Stage::Widget, Binding::Extended),
];

/// Eye target distance from the master tail, in master lengths.
const TARGET_DISTANCE: f64 = 5.0;
const TIP_SCALE: f64 = 0.25;
const TARGET_SCALE: f64 = 0.5;
const MASTER_SCALE: f64 = 1.5;

const TIP_RECIPE: &str = "CL1.0WW1.0";
const AIM_RECIPE: &str = "DT1.0Y0.0";
const MASTER_RECIPE: &str = "CL0.5LL0.0";

// =============================================================================
// Lid layout
// =============================================================================

/// Which control drives a lid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LidMaster {
    /// An extra control placed between two lid controls (odd lid length).
    Extra { between: (usize, usize) },
    /// An existing lid control, enlarged (even lid length).
    Ctrl(usize),
}

/// A lid control pulled toward the master.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FalloffLink {
    pub ctrl: usize,
    pub weight: f64,
}

/// Master placement and falloff for a lid of a given length.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LidLayout {
    pub mid: usize,
    pub master: LidMaster,
    pub falloff: Vec<FalloffLink>,
}

impl LidLayout {
    /// Distinct falloff weights, nearest hop first.
    pub fn weights(&self) -> Vec<f64> {
        let mut out: Vec<f64> = Vec::new();
        for link in &self.falloff {
            if out.last().map_or(true, |w| (w - link.weight).abs() > 1e-9) {
                out.push(link.weight);
            }
        }
        out
    }
}

fn hop_weight(hop: usize) -> f64 {
    (6usize.saturating_sub(hop)) as f64 / 10.0
}

/// Computes the master and falloff for `lid_len` bones (`lid_len + 1`
/// controls).
///
/// Odd lengths get an extra master between controls `mid - 1` and `mid`, and
/// hop `k` from 0 pulls controls `mid + k` and `mid - 1 - k` while
/// `mid + k < lid_len`. Even lengths use control `mid` as master, and hop `k`
/// from 1 pulls `mid + k` and `mid - k` while `mid + k <= lid_len`. Weights
/// start at 0.6 and drop by 0.1 per hop, never below 0.
pub fn lid_layout(lid_len: usize) -> LidLayout {
    let mut falloff = Vec::new();
    if lid_len % 2 == 1 {
        let mid = (lid_len + 1) / 2;
        let mut k = 0;
        while mid + k < lid_len {
            let weight = hop_weight(k);
            falloff.push(FalloffLink {
                ctrl: mid + k,
                weight,
            });
            falloff.push(FalloffLink {
                ctrl: mid - 1 - k,
                weight,
            });
            k += 1;
        }
        LidLayout {
            mid,
            master: LidMaster::Extra {
                between: (mid - 1, mid),
            },
            falloff,
        }
    } else {
        let mid = lid_len / 2;
        let mut k = 1;
        while mid + k <= lid_len {
            let weight = hop_weight(k - 1);
            falloff.push(FalloffLink {
                ctrl: mid + k,
                weight,
            });
            falloff.push(FalloffLink {
                ctrl: mid - k,
                weight,
            });
            k += 1;
        }
        LidLayout {
            mid,
            master: LidMaster::Ctrl(mid),
            falloff,
        }
    }
}

// =============================================================================
// Generator
// =============================================================================

/// Eye aim plus bendy eyelids.
#[derive(Debug, Clone, Copy, Default)]
pub struct EyelidRig;

impl RigGenerator for EyelidRig {
    fn rig_type(&self) -> &'static str {
        RIG_TYPE
    }

    fn stages(&self) -> &'static [StageBinding] {
        STAGES
    }

    fn discover(&self, graph: &dyn BoneGraph, base: &str) -> GenerateResult<Box<dyn RigBuilder>> {
        let params: EyelidParams = read_params(graph, RIG_TYPE, base)?;
        let (lids, chains) = discover_lid_chains(graph, base)?;
        let paired = paired_bone(graph, base)?.map(|p| org(&p));

        let orientation = match params.orientation_bone.as_deref() {
            Some(name) => {
                let org_name = org(name);
                if graph.bone(name).is_none() && graph.bone(&org_name).is_none() {
                    return Err(ConfigError::missing_bone(
                        RIG_TYPE,
                        base,
                        format!("orientation bone '{}'", name),
                    )
                    .into());
                }
                org_name
            }
            None => chains.base.clone(),
        };

        debug!(
            eye = %chains.base,
            top = %lids.top,
            bottom = %lids.bottom,
            lid_len = lids.lid_len,
            "discovered eyelids"
        );
        Ok(Box::new(EyelidBuilder {
            chains,
            lids,
            orientation,
            paired,
        }))
    }
}

struct EyelidBuilder {
    chains: ChainSet,
    lids: LidPair,
    orientation: String,
    paired: Option<String>,
}

impl RigBuilder for EyelidBuilder {
    fn chain_set(&self) -> &ChainSet {
        &self.chains
    }

    fn build(self: Box<Self>, edit: &mut EditPhase<'_>) -> GenerateResult<Box<dyn RigPoser>> {
        let Self {
            chains,
            lids,
            orientation,
            paired,
        } = *self;
        let eye = chains.base.clone();
        let lid_roots = [lids.top.clone(), lids.bottom.clone()];
        let orient_is_eye = orientation == eye;

        let mut roles = RoleSet::default();
        collect_org(edit, &chains, &mut roles)?;

        // synthesize-mch: eye aim, eye tip and one swing bone per lid bone.
        let eye_mch = edit.copy_bone(&eye, &mch(&eye))?;
        let tip = edit.copy_bone(&orientation, &qualified(&eye, Role::Mch, "tip"))?;
        let (eye_mch_tail, eye_mch_len) = {
            let b = edit.bone(&eye_mch)?;
            (b.tail, b.length())
        };
        edit.put_bone(&tip, eye_mch_tail)?;
        if orient_is_eye {
            edit.align_y_axis(&tip, Vec3::z())?;
        }
        edit.set_length(&tip, TIP_SCALE * eye_mch_len)?;

        for lid in &lid_roots {
            let org_bones = roles.org.get(lid).unwrap_or_default().to_vec();
            let mut mechs = Vec::with_capacity(org_bones.len());
            for org in &org_bones {
                let name = edit.copy_bone(&eye, &mch(org))?;
                let tail = edit.bone(org)?.tail;
                edit.set_tail(&name, tail)?;
                mechs.push(name);
            }
            roles.mch.insert(lid.clone(), mechs);
        }

        synthesize_def(edit, &mut roles)?;

        // synthesize-ctrl: eye master and target, then the lid controls.
        let axis = if orient_is_eye {
            Vec3::z()
        } else {
            edit.bone(&orientation)?.y_axis()
        };
        let master = edit.copy_bone(&eye, &format!("master_{}", ctrl(&eye)))?;
        let target = edit.copy_bone(&orientation, &ctrl(&eye))?;
        let target_pos = {
            let m = edit.bone(&master)?;
            m.tail + TARGET_DISTANCE * m.length() * m.y_axis()
        };
        let eye_len = edit.bone(&eye)?.length();
        edit.put_bone(&target, target_pos)?;
        edit.set_length(&target, TARGET_SCALE * eye_len)?;
        edit.align_y_axis(&target, axis)?;

        synthesize_ctrl(edit, &eye, &mut roles, CTRL_SCALE)?;

        let layout = lid_layout(lids.lid_len);
        let mut lid_masters = Vec::with_capacity(2);
        for lid in &lid_roots {
            let ctrls = roles.ctrl.get(lid).unwrap_or_default().to_vec();
            let lid_master = match layout.master {
                LidMaster::Extra { between: (a, b) } => {
                    let name = edit.copy_bone(&ctrls[0], &qualified(lid, Role::Ctrl, "master"))?;
                    edit.scale_length(&name, MASTER_SCALE)?;
                    let pos = midpoint(&edit.bone(&ctrls[a])?.head, &edit.bone(&ctrls[b])?.head);
                    edit.put_bone(&name, pos)?;
                    edit.align_y_axis(&name, axis)?;
                    name
                }
                LidMaster::Ctrl(i) => {
                    edit.scale_length(&ctrls[i], MASTER_SCALE)?;
                    ctrls[i].clone()
                }
            };
            lid_masters.push((lid.clone(), lid_master));
        }

        let common = match &paired {
            Some(paired_org) if edit.contains(&ctrl(paired_org)) => {
                Some(make_common_ctrl(edit, &eye, &target, &ctrl(paired_org))?)
            }
            Some(paired_org) => {
                debug!(eye = %eye, pair = %paired_org, "paired eye not built yet, no common control");
                None
            }
            None => None,
        };

        for lid in &lid_roots {
            for c in roles.ctrl.get(lid).unwrap_or_default() {
                edit.align_y_axis(c, axis)?;
            }
        }

        // parent: everything under the master, then the engine's sub-chain
        // parenting, then the lid deform bones onto the swing bones.
        let extra_masters: Vec<String> = match layout.master {
            LidMaster::Extra { .. } => lid_masters.iter().map(|(_, m)| m.clone()).collect(),
            LidMaster::Ctrl(_) => Vec::new(),
        };
        let mut under_master = vec![eye_mch.clone(), tip.clone()];
        for lid in &lid_roots {
            under_master.extend(roles.mch.get(lid).unwrap_or_default().iter().cloned());
        }
        // Extra lid masters keep the eye's own parent, copied from ctrl[0].
        under_master.extend(roles.ctrl.bones().map(str::to_string));
        for bone in &under_master {
            edit.set_parent(bone, &master, false)?;
        }

        parent_subchain_ctrls(edit, &chains, &roles)?;

        for (lid, other) in [(&lid_roots[0], &lid_roots[1]), (&lid_roots[1], &lid_roots[0])] {
            let defs = roles.def.get(lid).unwrap_or_default().to_vec();
            let mechs = roles.mch.get(lid).unwrap_or_default().to_vec();
            let other_last = roles.mch.get(other).and_then(|m| m.last()).cloned();
            for (i, def) in defs.iter().enumerate() {
                let parent = if i == 0 {
                    other_last.clone()
                } else {
                    mechs.get(i - 1).cloned()
                };
                if let Some(parent) = parent {
                    edit.set_parent(def, &parent, false)?;
                }
            }
        }

        Ok(Box::new(EyelidPoser {
            eye,
            lid_roots,
            roles,
            layout,
            eye_mch,
            tip,
            master,
            target,
            lid_masters,
            extra_masters,
            common,
        }))
    }
}

/// Shared target for both eyes, parenting both eye targets.
fn make_common_ctrl(
    edit: &mut EditPhase<'_>,
    eye: &str,
    target: &str,
    other_target: &str,
) -> GenerateResult<String> {
    let name = format!("{}_common", BoneName::parse(eye).base);
    let (pos, direction) = {
        let a = edit.bone(target)?;
        let b = edit.bone(other_target)?;
        (midpoint(&a.head, &b.head), a.y_axis() + b.y_axis())
    };
    let common = edit.copy_bone(target, &name)?;
    edit.put_bone(&common, pos)?;
    if direction.norm() > EPSILON {
        edit.align_y_axis(&common, direction)?;
    } else {
        warn!(bone = %common, "eye targets point in opposite directions, keeping orientation");
    }
    edit.set_parent(other_target, &common, false)?;
    edit.set_parent(target, &common, false)?;
    Ok(common)
}

struct EyelidPoser {
    eye: String,
    lid_roots: [String; 2],
    roles: RoleSet,
    layout: LidLayout,
    eye_mch: String,
    tip: String,
    master: String,
    target: String,
    /// (lid chain root, master control) per lid.
    lid_masters: Vec<(String, String)>,
    extra_masters: Vec<String>,
    common: Option<String>,
}

impl RigPoser for EyelidPoser {
    fn pose(self: Box<Self>, pose: &mut PosePhase<'_>) -> GenerateResult<RigOutput> {
        let this = *self;

        apply_recipe(pose, &this.tip, &this.eye_mch, TIP_RECIPE)?;
        for lid in &this.lid_roots {
            for (i, mech) in this.roles.mch.get(lid).unwrap_or_default().iter().enumerate() {
                if let Some(next) = this.roles.get_ctrl_by_index(lid, i + 1) {
                    apply_recipe(pose, mech, next, AIM_RECIPE)?;
                }
            }
        }
        apply_recipe(pose, &this.eye_mch, &this.target, AIM_RECIPE)?;

        for (lid, lid_master) in &this.lid_masters {
            apply_recipe(pose, lid_master, &this.tip, MASTER_RECIPE)?;
            for link in &this.layout.falloff {
                if let Some(c) = this.roles.get_ctrl_by_index(lid, link.ctrl) {
                    let recipe = format!("CL{:.1}LL0.0", link.weight);
                    apply_recipe(pose, c, lid_master, &recipe)?;
                }
            }
        }

        weave_def_constraints(pose, &this.roles)?;
        retarget_lid_defs(pose, &this.roles, &this.lid_roots)?;

        pose.assign_widget(&this.master, WidgetShape::Circle, 1.0)?;
        pose.assign_widget(&this.target, WidgetShape::Eye, 1.0)?;
        for m in &this.extra_masters {
            pose.assign_widget(m, WidgetShape::Sphere, 1.0)?;
        }
        if let Some(common) = &this.common {
            pose.assign_widget(common, WidgetShape::Eyes, 1.0)?;
        }
        assign_ctrl_widgets(pose, &this.roles)?;

        let mut controls = vec![this.master.clone(), this.target.clone()];
        controls.extend(this.extra_masters.iter().cloned());
        controls.extend(this.common.iter().cloned());
        controls.extend(this.roles.ctrl.bones().map(str::to_string));
        Ok(RigOutput {
            rig_type: RIG_TYPE.to_string(),
            base: this.eye,
            controls,
            ui: None,
        })
    }
}

/// Lid deform bones keep only damped-track and stretch-to, aimed at the tail
/// of the same-index swing bone.
fn retarget_lid_defs(
    pose: &mut PosePhase<'_>,
    roles: &RoleSet,
    lid_roots: &[String; 2],
) -> GenerateResult<()> {
    for lid in lid_roots {
        for (i, def) in roles.def.get(lid).unwrap_or_default().iter().enumerate() {
            let Some(mech) = roles.get_mch_by_index(lid, i) else {
                continue;
            };
            for handle in pose.constraint_handles(def)? {
                let kind = pose.constraint(&handle)?.constraint_type();
                match kind {
                    ConstraintType::DampedTrack | ConstraintType::StretchTo => {
                        let c = pose.constraint_mut(&handle)?;
                        c.target = Some(mech.to_string());
                        c.set_head_tail(1.0);
                    }
                    _ => {
                        pose.remove_constraint(&handle)?;
                    }
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_odd_layout() {
        let layout = lid_layout(5);
        assert_eq!(layout.mid, 3);
        assert_eq!(layout.master, LidMaster::Extra { between: (2, 3) });
        let ctrls: Vec<usize> = layout.falloff.iter().map(|l| l.ctrl).collect();
        assert_eq!(ctrls, vec![3, 2, 4, 1]);
        assert_eq!(layout.weights(), vec![0.6, 0.5]);
    }

    #[test]
    fn test_even_layout_reaches_chain_ends() {
        let layout = lid_layout(4);
        assert_eq!(layout.mid, 2);
        assert_eq!(layout.master, LidMaster::Ctrl(2));
        let ctrls: Vec<usize> = layout.falloff.iter().map(|l| l.ctrl).collect();
        assert_eq!(ctrls, vec![3, 1, 4, 0]);
        assert_eq!(layout.weights(), vec![0.6, 0.5]);
    }

    #[test]
    fn test_parity_partitions_lengths() {
        for n in 2..12 {
            let layout = lid_layout(n);
            match layout.master {
                LidMaster::Extra { .. } => assert_eq!(n % 2, 1),
                LidMaster::Ctrl(i) => {
                    assert_eq!(n % 2, 0);
                    assert!(i <= n);
                }
            }
            for link in &layout.falloff {
                assert!(link.ctrl <= n);
                assert!(link.weight >= 0.0);
            }
        }
    }

    #[test]
    fn test_weights_never_negative() {
        let layout = lid_layout(21);
        assert!(layout.falloff.iter().all(|l| l.weight >= 0.0));
        assert_eq!(layout.weights().last(), Some(&0.0));
    }

    #[test]
    fn test_weight_recipes_parse() {
        for link in lid_layout(7).falloff {
            let recipe = format!("CL{:.1}LL0.0", link.weight);
            assert!(crate::recipe::parse_recipe(&recipe).is_ok());
        }
    }
}
