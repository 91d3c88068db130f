//! Limb and leg rigs.
//!
//! A three-bone limb (upper, lower, end) gets:
//!
//! - a parent mechanism and settings control carrying every blend property
//! - tweak controls and a segmented, bendy deform chain
//! - an IK chain with an optional pole target
//! - an FK chain
//! - an IK/FK switch on every org bone
//!
//! Legs also use the toe (fourth chain bone) and a heel: a disconnected,
//! childless child of the foot that drives the roll and rock mechanism.

mod deform;
mod drivers;
mod fk;
mod foot;
mod ik;
mod parent;
mod switch;
mod terminal;
mod tweak;

use chainrig_armature::naming::org;
use chainrig_armature::{BoneGraph, BoneGroup, EditPhase, PosePhase};
use tracing::debug;

use crate::discovery::{chain_bones, ChainDescriptor, ChainSet};
use crate::error::{ConfigError, GenerateResult};
use crate::params::{read_params, LimbParams};
use crate::report::{RigOutput, UiPanel};
use crate::rigs::{RigBuilder, RigGenerator, RigPoser};
use crate::stage::{Binding, Stage, StageBinding};

pub use drivers::{
    FK_LIMB_FOLLOW, IK_FK, IK_FOLLOW, IK_STRETCH, POLE_VECTOR, ROOT_PARENT, RUBBER_TWEAK,
};

pub const LIMB_RIG_TYPE: &str = "limb";
pub const LEG_RIG_TYPE: &str = "leg";

const STAGES: &[StageBinding] = &[
    StageBinding::new(Stage::Discover, Binding::Extended),
    StageBinding::new(Stage::SynthesizeMch, Binding::Replaced),
    StageBinding::new(Stage::SynthesizeDef, Binding::Replaced),
    StageBinding::new(Stage::SynthesizeCtrl, Binding::Replaced),
    StageBinding::new(Stage::Parent, Binding::Replaced),
    StageBinding::new(Stage::Constrain, Binding::Replaced),
    StageBinding::new(Stage::Widget, Binding::Replaced),
];

/// Which limb flavor a [`LimbRig`] builds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LimbKind {
    /// Arm-style limb ending in a hand control.
    Limb,
    /// Leg with heel roll, rock and a toe control.
    Leg,
}

impl LimbKind {
    pub fn rig_type(&self) -> &'static str {
        match self {
            LimbKind::Limb => LIMB_RIG_TYPE,
            LimbKind::Leg => LEG_RIG_TYPE,
        }
    }

    /// Connected bones the chain needs.
    pub fn min_chain(&self) -> usize {
        match self {
            LimbKind::Limb => 3,
            LimbKind::Leg => 4,
        }
    }
}

/// IK/FK limb generator.
#[derive(Debug, Clone, Copy)]
pub struct LimbRig {
    kind: LimbKind,
}

impl LimbRig {
    pub fn new(kind: LimbKind) -> Self {
        Self { kind }
    }

    pub fn kind(&self) -> LimbKind {
        self.kind
    }
}

impl RigGenerator for LimbRig {
    fn rig_type(&self) -> &'static str {
        self.kind.rig_type()
    }

    fn stages(&self) -> &'static [StageBinding] {
        STAGES
    }

    fn discover(&self, graph: &dyn BoneGraph, base: &str) -> GenerateResult<Box<dyn RigBuilder>> {
        let rig = self.kind.rig_type();
        let params: LimbParams = read_params(graph, rig, base)?;
        let chain = chain_bones(graph, base)?;
        if chain.len() < self.kind.min_chain() {
            return Err(ConfigError::ShortChain {
                rig: rig.to_string(),
                bone: base.to_string(),
                expected: self.kind.min_chain(),
                found: chain.len(),
            }
            .into());
        }

        let (toe, heel) = match self.kind {
            LimbKind::Limb => (None, None),
            LimbKind::Leg => {
                let heel = find_heel(graph, &chain[2])?
                    .ok_or_else(|| ConfigError::missing_bone(rig, base, "a heel bone under the foot"))?;
                (Some(org(&chain[3])), Some(org(&heel)))
            }
        };

        let has_parent = graph.bone(base).and_then(|b| b.parent.as_ref()).is_some();
        let plan = LimbPlan {
            kind: self.kind,
            org: [org(&chain[0]), org(&chain[1]), org(&chain[2])],
            toe,
            heel,
            has_parent,
            params,
        };
        debug!(
            rig,
            upper = %plan.org[0],
            segments = plan.params.segments,
            has_parent,
            "discovered limb"
        );

        let chains = ChainSet {
            base: org(base),
            chains: vec![ChainDescriptor {
                root: org(base),
                subchains: Vec::new(),
            }],
        };
        Ok(Box::new(LimbBuilder { chains, plan }))
    }
}

/// The heel is the last disconnected child of the foot without children.
fn find_heel(graph: &dyn BoneGraph, foot: &str) -> GenerateResult<Option<String>> {
    let mut heel = None;
    for child in graph.children_of(foot)? {
        if !graph.is_connected(&child)? && graph.children_of(&child)?.is_empty() {
            heel = Some(child);
        }
    }
    Ok(heel)
}

/// Discovery result, in `ORG-` names.
#[derive(Debug, Clone)]
pub(crate) struct LimbPlan {
    pub kind: LimbKind,
    /// Upper, lower, end.
    pub org: [String; 3],
    pub toe: Option<String>,
    pub heel: Option<String>,
    /// The upper bone has a parent outside the limb.
    pub has_parent: bool,
    pub params: LimbParams,
}

impl LimbPlan {
    pub fn rig_type(&self) -> &'static str {
        self.kind.rig_type()
    }

    pub fn upper(&self) -> &str {
        &self.org[0]
    }

    pub fn end(&self) -> &str {
        &self.org[2]
    }
}

// =============================================================================
// Bone records
// =============================================================================

#[derive(Debug, Clone)]
pub(crate) struct ParentBones {
    pub mch: String,
    /// Settings control; owns every limb property.
    pub ctrl: String,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct TweakBones {
    pub mch: Vec<String>,
    pub ctrl: Vec<String>,
}

#[derive(Debug, Clone)]
pub(crate) struct IkBones {
    /// Upper IK control.
    pub ctrl: String,
    pub mch_ik: String,
    pub mch_target: String,
    pub mch_stretch: String,
    pub pole: String,
}

#[derive(Debug, Clone)]
pub(crate) struct FkBones {
    pub ctrl: Vec<String>,
    pub mch: String,
}

/// IK end control and the sockets that choose its space.
#[derive(Debug, Clone)]
pub(crate) struct TerminalBones {
    /// Hand or foot IK control.
    pub ctrl: String,
    pub socket: String,
    pub socket_root: String,
    pub socket_parent: Option<String>,
}

/// Leg-only heel roll and toe bones.
#[derive(Debug, Clone)]
pub(crate) struct FootBones {
    pub heel_ctrl: String,
    pub roll: [String; 2],
    pub rock: [String; 2],
    pub toe_ctrl: String,
}

/// Everything the structural phase built.
#[derive(Debug, Clone)]
pub(crate) struct LimbBones {
    pub parent: ParentBones,
    pub tweak: TweakBones,
    pub def: Vec<String>,
    pub ik: IkBones,
    pub fk: FkBones,
    pub terminal: TerminalBones,
    pub foot: Option<FootBones>,
}

impl LimbBones {
    /// Bone the IK stretch mechanism aims at.
    pub fn stretch_target(&self) -> &str {
        match &self.foot {
            Some(foot) => &foot.roll[0],
            None => &self.terminal.ctrl,
        }
    }

    /// IK controls at the end of the limb, outermost last.
    pub fn terminal_ctrls(&self) -> Vec<String> {
        let mut out = Vec::new();
        if let Some(foot) = &self.foot {
            out.push(foot.toe_ctrl.clone());
            out.push(foot.heel_ctrl.clone());
        }
        out.push(self.terminal.ctrl.clone());
        out
    }

    /// Every animator-facing control.
    pub fn controls(&self) -> Vec<String> {
        let mut out = vec![self.parent.ctrl.clone()];
        out.extend(self.tweak.ctrl.iter().cloned());
        out.push(self.ik.ctrl.clone());
        out.push(self.ik.pole.clone());
        out.extend(self.fk.ctrl.iter().cloned());
        out.extend(self.terminal_ctrls());
        out
    }
}

// =============================================================================
// Builder and poser
// =============================================================================

struct LimbBuilder {
    chains: ChainSet,
    plan: LimbPlan,
}

impl RigBuilder for LimbBuilder {
    fn chain_set(&self) -> &ChainSet {
        &self.chains
    }

    fn build(self: Box<Self>, edit: &mut EditPhase<'_>) -> GenerateResult<Box<dyn RigPoser>> {
        let Self { plan, .. } = *self;

        let parent = parent::build(edit, &plan)?;
        let tweak = tweak::build(edit, &plan)?;
        let mut def = deform::build(edit, &plan)?;
        let ik = ik::build(edit, &plan, &parent.mch)?;
        let fk = fk::build(edit, &plan, &parent.mch)?;
        let terminal = terminal::build(edit, &plan)?;
        let foot = match plan.kind {
            LimbKind::Leg => Some(foot::build(edit, &plan, &terminal, &mut def)?),
            LimbKind::Limb => None,
        };

        // The IK target rides on the heel for legs, on the hand control
        // otherwise.
        let target_parent = foot
            .as_ref()
            .map_or(terminal.ctrl.as_str(), |f| f.heel_ctrl.as_str());
        edit.set_parent(&ik.mch_target, target_parent, false)?;

        let bones = LimbBones {
            parent,
            tweak,
            def,
            ik,
            fk,
            terminal,
            foot,
        };
        debug!(
            rig = plan.rig_type(),
            tweaks = bones.tweak.ctrl.len(),
            deform = bones.def.len(),
            "built limb"
        );
        Ok(Box::new(LimbPoser { plan, bones }))
    }
}

struct LimbPoser {
    plan: LimbPlan,
    bones: LimbBones,
}

impl RigPoser for LimbPoser {
    fn pose(self: Box<Self>, pose: &mut PosePhase<'_>) -> GenerateResult<RigOutput> {
        let Self { plan, bones } = *self;

        parent::pose(pose, &bones.parent)?;
        tweak::pose(pose, &plan, &bones.tweak)?;
        deform::pose(pose, &bones.def, &bones.tweak.ctrl)?;
        ik::pose(pose, &plan, &bones.ik)?;
        fk::pose(pose, &bones.fk)?;
        switch::pose(pose, &plan, &bones)?;
        terminal::pose(pose, &plan, &bones)?;
        if let Some(foot) = &bones.foot {
            foot::pose(pose, &plan, &bones, foot)?;
        }
        let properties = drivers::pose(pose, &bones)?;
        assign_groups(pose, &bones)?;

        let ui = UiPanel {
            owner: bones.parent.ctrl.clone(),
            properties,
            controls: vec![
                bones.ik.ctrl.clone(),
                bones.terminal.ctrl.clone(),
                bones.parent.ctrl.clone(),
            ],
        };
        Ok(RigOutput {
            rig_type: plan.rig_type().to_string(),
            base: plan.upper().to_string(),
            controls: bones.controls(),
            ui: Some(ui),
        })
    }
}

fn assign_groups(pose: &mut PosePhase<'_>, bones: &LimbBones) -> GenerateResult<()> {
    let tweaks = BoneGroup::tweaks();
    for ctrl in &bones.tweak.ctrl {
        pose.set_group(ctrl, &tweaks)?;
    }
    let ik = BoneGroup::ik();
    pose.set_group(&bones.ik.ctrl, &ik)?;
    for ctrl in bones.terminal_ctrls() {
        pose.set_group(&ctrl, &ik)?;
    }
    let fk = BoneGroup::fk();
    for ctrl in &bones.fk.ctrl {
        pose.set_group(ctrl, &fk)?;
    }
    Ok(())
}
