//! Generation output records.

use serde::Serialize;

use crate::discovery::ChainSet;
use crate::stage::StageBinding;

/// Structured stand-in for a generated UI panel: the properties and controls
/// an animator-facing panel should show for one rig.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UiPanel {
    /// Bone carrying the rig's custom properties.
    pub owner: String,
    pub properties: Vec<String>,
    pub controls: Vec<String>,
}

/// What one rig produced in the pose phase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RigOutput {
    pub rig_type: String,
    pub base: String,
    pub controls: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ui: Option<UiPanel>,
}

/// Per-rig section of a [`GenerationReport`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RigReport {
    pub base: String,
    pub rig_type: String,
    pub stages: Vec<StageBinding>,
    pub chains: ChainSet,
    pub controls: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ui_panel: Option<UiPanel>,
    pub bones_created: usize,
}

/// Summary of a whole generation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenerationReport {
    pub armature: String,
    pub rigs: Vec<RigReport>,
    /// Bones in the armature after generation.
    pub total_bones: usize,
}

impl GenerationReport {
    pub fn rig(&self, base: &str) -> Option<&RigReport> {
        self.rigs.iter().find(|r| r.base == base)
    }

    pub fn bones_created(&self) -> usize {
        self.rigs.iter().map(|r| r.bones_created).sum()
    }
}
