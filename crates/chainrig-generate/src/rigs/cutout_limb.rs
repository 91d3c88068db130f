//! Cutout IK limb: a stretchy three-bone IK chain for flat, paper-doll
//! characters.
//!
//! The upper IK control and a joint control define the limb; three stretch
//! mechanisms span them and the org bones copy the stretch bones.

use chainrig_armature::naming::{org, qualified, Role};
use chainrig_armature::{
    BoneGraph, Constraint, EditPhase, IkSettings, KeepAxis, PosePhase, Space, StretchVolume, Vec3,
    WidgetShape,
};
use tracing::debug;

use crate::discovery::{chain_bones, ChainDescriptor, ChainSet};
use crate::error::{ConfigError, GenerateResult};
use crate::params::{read_params, CutoutLimbParams};
use crate::report::RigOutput;
use crate::rigs::{RigBuilder, RigGenerator, RigPoser};
use crate::stage::{Binding, Stage, StageBinding};

pub const RIG_TYPE: &str = "cutout_limb";

const STAGES: &[StageBinding] = &[
    StageBinding::new(Stage::Discover, Binding::Extended),
    StageBinding::new(Stage::SynthesizeMch, Binding::Replaced),
    StageBinding::new(Stage::SynthesizeDef, Binding::Replaced),
    StageBinding::new(Stage::SynthesizeCtrl, Binding::Replaced),
    StageBinding::new(Stage::Parent, Binding::Replaced),
    StageBinding::new(Stage::Constrain, Binding::Replaced),
    StageBinding::new(Stage::Widget, Binding::Replaced),
];

/// Stretchy IK limb generator.
#[derive(Debug, Clone, Copy, Default)]
pub struct CutoutLimbRig;

impl RigGenerator for CutoutLimbRig {
    fn rig_type(&self) -> &'static str {
        RIG_TYPE
    }

    fn stages(&self) -> &'static [StageBinding] {
        STAGES
    }

    fn discover(&self, graph: &dyn BoneGraph, base: &str) -> GenerateResult<Box<dyn RigBuilder>> {
        let params: CutoutLimbParams = read_params(graph, RIG_TYPE, base)?;
        let chain = chain_bones(graph, base)?;
        if chain.len() < 3 {
            return Err(ConfigError::ShortChain {
                rig: RIG_TYPE.to_string(),
                bone: base.to_string(),
                expected: 3,
                found: chain.len(),
            }
            .into());
        }
        let parent = graph
            .bone(base)
            .and_then(|b| b.parent.clone())
            .ok_or_else(|| ConfigError::missing_bone(RIG_TYPE, base, "a parent bone"))?;

        Ok(Box::new(CutoutBuilder {
            chains: ChainSet {
                base: org(base),
                chains: vec![ChainDescriptor {
                    root: org(base),
                    subchains: Vec::new(),
                }],
            },
            org: [org(&chain[0]), org(&chain[1]), org(&chain[2])],
            parent: org(&parent),
            params,
        }))
    }
}

struct CutoutBuilder {
    chains: ChainSet,
    org: [String; 3],
    parent: String,
    params: CutoutLimbParams,
}

impl CutoutBuilder {
    fn joint_name(&self) -> String {
        match &self.params.stretch_joint {
            Some(joint) => format!("{}{}", joint, self.params.side_suffix),
            None => qualified(&self.org[1], Role::Ctrl, "joint"),
        }
    }
}

impl RigBuilder for CutoutBuilder {
    fn chain_set(&self) -> &ChainSet {
        &self.chains
    }

    fn build(self: Box<Self>, edit: &mut EditPhase<'_>) -> GenerateResult<Box<dyn RigPoser>> {
        let joint_name = self.joint_name();
        let Self {
            chains,
            org,
            parent,
            params,
        } = *self;
        let [upper, lower, end] = &org;

        let upper_ik = edit.copy_bone(upper, &qualified(upper, Role::Ctrl, "ik"))?;
        let lower_ik = edit.copy_bone(lower, &qualified(lower, Role::Mch, "ik"))?;
        let end_ik = edit.copy_bone(end, &qualified(end, Role::Ctrl, "ik"))?;

        let mut stretch = Vec::with_capacity(3);
        for bone in &org {
            stretch.push(edit.copy_bone(bone, &qualified(bone, Role::Mch, "stretch_ik"))?);
        }

        // Joint control at the lower bone's head, pointing up, X to the left.
        let (joint_head, joint_len) = {
            let b = edit.bone(&stretch[1])?;
            (b.head, b.length() / 2.0)
        };
        let joint = edit.new_bone(&joint_name)?;
        edit.set_head(&joint, joint_head)?;
        edit.set_tail(&joint, joint_head + Vec3::z() * joint_len)?;
        edit.align_x_axis(&joint, -Vec3::x())?;
        edit.set_deform(&joint, false)?;

        edit.set_parent(&upper_ik, &parent, false)?;
        edit.set_parent(&lower_ik, &upper_ik, false)?;
        edit.clear_parent(&end_ik)?;
        edit.set_parent(&stretch[0], &parent, false)?;
        edit.set_parent(&stretch[1], &joint, false)?;
        edit.set_parent(&stretch[2], &lower_ik, true)?;
        edit.set_parent(&joint, &upper_ik, false)?;

        debug!(base = %chains.base, joint = %joint, "built cutout limb");
        Ok(Box::new(CutoutPoser {
            base: chains.base,
            org,
            upper_ik,
            lower_ik,
            end_ik,
            stretch,
            joint,
            params,
        }))
    }
}

struct CutoutPoser {
    base: String,
    org: [String; 3],
    upper_ik: String,
    lower_ik: String,
    end_ik: String,
    /// Upper, lower, end.
    stretch: Vec<String>,
    joint: String,
    params: CutoutLimbParams,
}

/// IK settings for a bone rotating only around Z within `[min, max]`
/// degrees.
fn z_hinge(min: f64, max: f64) -> IkSettings {
    IkSettings {
        lock: [true, true, false],
        stretch: 0.0,
        limit_z: Some([min.to_radians(), max.to_radians()]),
    }
}

impl RigPoser for CutoutPoser {
    fn pose(self: Box<Self>, pose: &mut PosePhase<'_>) -> GenerateResult<RigOutput> {
        let this = *self;
        let [upper_str, lower_str, end_str] = [&this.stretch[0], &this.stretch[1], &this.stretch[2]];

        pose.add_constraint(&this.lower_ik, Constraint::ik(&this.end_ik, 2).named("ik"))?;
        pose.add_constraint(
            upper_str,
            Constraint::copy_location(&this.upper_ik)
                .named("anchor")
                .in_space(Space::Local, Space::Local),
        )?;
        pose.add_constraint(
            end_str,
            Constraint::copy_rotation(&this.end_ik)
                .named("copy rotation")
                .in_space(Space::Pose, Space::Pose),
        )?;

        let upper_len = pose.bone(upper_str)?.length();
        pose.add_constraint(
            upper_str,
            Constraint::stretch_to(&this.joint)
                .named("stretch to")
                .with_stretch(StretchVolume::NoVolume, KeepAxis::PlaneZ, upper_len),
        )?;
        let lower_len = pose.bone(lower_str)?.length();
        pose.add_constraint(
            lower_str,
            Constraint::stretch_to(end_str)
                .named("stretch to")
                .with_stretch(StretchVolume::NoVolume, KeepAxis::PlaneZ, lower_len),
        )?;

        let [a, b, c, d] = this.params.ik_limits;
        pose.set_ik(&this.upper_ik, z_hinge(a, b))?;
        pose.set_ik(&this.lower_ik, z_hinge(c, d))?;

        for (org, stretch) in this.org.iter().zip(&this.stretch) {
            pose.add_constraint(org, Constraint::copy_transforms(stretch))?;
        }

        pose.assign_widget(&this.upper_ik, WidgetShape::Limb, 1.0)?;
        pose.assign_widget(&this.end_ik, WidgetShape::Cube, 1.0)?;
        pose.assign_widget(&this.joint, WidgetShape::Circle, 1.0)?;

        Ok(RigOutput {
            rig_type: RIG_TYPE.to_string(),
            base: this.base,
            controls: vec![this.upper_ik, this.joint, this.end_ik],
            ui: None,
        })
    }
}
