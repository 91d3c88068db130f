//! The generic chain rig: the engine stages with nothing added.

use chainrig_armature::{BoneGraph, EditPhase, PosePhase};
use tracing::warn;

use crate::discovery::{discover_chains, ChainSet};
use crate::error::GenerateResult;
use crate::params::{read_params, ChainParams};
use crate::report::RigOutput;
use crate::roles::RoleSet;
use crate::rigs::{RigBuilder, RigGenerator, RigPoser};
use crate::stage::{StageBinding, ENGINE_STAGES};
use crate::synth::{
    collect_org, parent_mch_to_ctrl, parent_subchain_ctrls, synthesize_ctrl, synthesize_def,
    synthesize_mch,
};
use crate::weave::{assign_ctrl_widgets, weave_def_constraints};

pub const RIG_TYPE: &str = "chain";

/// Parallel MCH/DEF/control chains for every chain under the base bone.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChainRig;

impl RigGenerator for ChainRig {
    fn rig_type(&self) -> &'static str {
        RIG_TYPE
    }

    fn stages(&self) -> &'static [StageBinding] {
        ENGINE_STAGES
    }

    fn discover(&self, graph: &dyn BoneGraph, base: &str) -> GenerateResult<Box<dyn RigBuilder>> {
        let params: ChainParams = read_params(graph, RIG_TYPE, base)?;
        let chains = discover_chains(graph, base)?;
        if chains.chains.is_empty() {
            warn!(base, "chain rig has no disconnected child chains");
        }
        Ok(Box::new(ChainBuilder { chains, params }))
    }
}

struct ChainBuilder {
    chains: ChainSet,
    params: ChainParams,
}

impl RigBuilder for ChainBuilder {
    fn chain_set(&self) -> &ChainSet {
        &self.chains
    }

    fn build(self: Box<Self>, edit: &mut EditPhase<'_>) -> GenerateResult<Box<dyn RigPoser>> {
        let Self { chains, params } = *self;
        let mut roles = RoleSet::default();
        collect_org(edit, &chains, &mut roles)?;
        synthesize_mch(edit, &mut roles, params.mch_scale)?;
        synthesize_def(edit, &mut roles)?;
        synthesize_ctrl(edit, &chains.base, &mut roles, params.ctrl_scale)?;
        parent_mch_to_ctrl(edit, &roles)?;
        parent_subchain_ctrls(edit, &chains, &roles)?;
        Ok(Box::new(ChainPoser {
            base: chains.base,
            roles,
        }))
    }
}

struct ChainPoser {
    base: String,
    roles: RoleSet,
}

impl RigPoser for ChainPoser {
    fn pose(self: Box<Self>, pose: &mut PosePhase<'_>) -> GenerateResult<RigOutput> {
        let Self { base, roles } = *self;
        weave_def_constraints(pose, &roles)?;
        assign_ctrl_widgets(pose, &roles)?;
        Ok(RigOutput {
            rig_type: RIG_TYPE.to_string(),
            base,
            controls: roles.ctrl.bones().map(str::to_string).collect(),
            ui: None,
        })
    }
}
