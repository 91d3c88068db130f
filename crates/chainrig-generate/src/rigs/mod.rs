//! Rig generators.
//!
//! A generator runs in three steps that line up with the graph phases:
//!
//! 1. [`RigGenerator::discover`] reads the untouched metarig and validates it.
//! 2. [`RigBuilder::build`] creates and places bones in the edit phase.
//! 3. [`RigPoser::pose`] adds constraints, drivers and widgets.
//!
//! Every rig's discovery runs before any graph mutation, and every rig's build
//! runs before any rig poses.

use std::collections::BTreeMap;

use chainrig_armature::{BoneGraph, EditPhase, PosePhase};

use crate::discovery::ChainSet;
use crate::error::GenerateResult;
use crate::report::RigOutput;
use crate::stage::StageBinding;

pub mod chain;
pub mod cutout_limb;
pub mod eyelid;
pub mod limb;

pub use chain::ChainRig;
pub use cutout_limb::CutoutLimbRig;
pub use eyelid::EyelidRig;
pub use limb::{LimbKind, LimbRig};

/// Entry point of a rig type.
pub trait RigGenerator: Send + Sync {
    /// Name used in the metarig `rig_type` field.
    fn rig_type(&self) -> &'static str;

    /// How this rig binds to each engine stage.
    fn stages(&self) -> &'static [StageBinding];

    /// Validates the metarig under `base` and plans the rig. Read-only.
    fn discover(&self, graph: &dyn BoneGraph, base: &str) -> GenerateResult<Box<dyn RigBuilder>>;
}

/// A discovered rig, ready for the structural phase.
pub trait RigBuilder {
    fn chain_set(&self) -> &ChainSet;

    fn build(self: Box<Self>, edit: &mut EditPhase<'_>) -> GenerateResult<Box<dyn RigPoser>>;
}

/// A built rig, ready for the pose phase.
pub trait RigPoser {
    fn pose(self: Box<Self>, pose: &mut PosePhase<'_>) -> GenerateResult<RigOutput>;
}

/// Rig types by name.
pub struct RigRegistry {
    generators: BTreeMap<&'static str, Box<dyn RigGenerator>>,
}

impl RigRegistry {
    /// An empty registry.
    pub fn empty() -> Self {
        Self {
            generators: BTreeMap::new(),
        }
    }

    /// Adds a generator, replacing any with the same rig type.
    pub fn register(&mut self, generator: Box<dyn RigGenerator>) {
        self.generators.insert(generator.rig_type(), generator);
    }

    pub fn get(&self, rig_type: &str) -> Option<&dyn RigGenerator> {
        self.generators.get(rig_type).map(|g| g.as_ref())
    }

    /// Registered rig type names, sorted.
    pub fn rig_types(&self) -> Vec<&'static str> {
        self.generators.keys().copied().collect()
    }
}

impl Default for RigRegistry {
    /// Registry with every built-in rig type.
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register(Box::new(ChainRig));
        registry.register(Box::new(EyelidRig));
        registry.register(Box::new(LimbRig::new(LimbKind::Limb)));
        registry.register(Box::new(LimbRig::new(LimbKind::Leg)));
        registry.register(Box::new(CutoutLimbRig));
        registry
    }
}
