//! Generation stages and how each rig binds to them.
//!
//! The engine defines seven stages. A rig declares, per stage, whether it runs
//! the engine's stage function as-is, runs it plus its own additions, or
//! replaces it outright. The declaration is data, so it can be logged and
//! reported.

use std::fmt;

use serde::Serialize;

/// An engine stage, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Stage {
    Discover,
    SynthesizeMch,
    SynthesizeDef,
    SynthesizeCtrl,
    Parent,
    Constrain,
    Widget,
}

impl Stage {
    pub const ALL: [Stage; 7] = [
        Stage::Discover,
        Stage::SynthesizeMch,
        Stage::SynthesizeDef,
        Stage::SynthesizeCtrl,
        Stage::Parent,
        Stage::Constrain,
        Stage::Widget,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Discover => "discover",
            Stage::SynthesizeMch => "synthesize-mch",
            Stage::SynthesizeDef => "synthesize-def",
            Stage::SynthesizeCtrl => "synthesize-ctrl",
            Stage::Parent => "parent",
            Stage::Constrain => "constrain",
            Stage::Widget => "widget",
        }
    }

    /// Whether the stage runs in the structural phase.
    pub fn is_structural(&self) -> bool {
        !matches!(self, Stage::Constrain | Stage::Widget)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a rig uses an engine stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Binding {
    /// The engine stage runs unchanged.
    Engine,
    /// The engine stage runs alongside rig-specific work.
    Extended,
    /// The rig runs its own stage instead.
    Replaced,
}

/// One entry of a rig's stage table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StageBinding {
    pub stage: Stage,
    pub binding: Binding,
}

impl StageBinding {
    pub const fn new(stage: Stage, binding: Binding) -> Self {
        Self { stage, binding }
    }
}

/// Stage table of the plain chain engine.
pub const ENGINE_STAGES: &[StageBinding] = &[
    StageBinding::new(Stage::Discover, Binding::Engine),
    StageBinding::new(Stage::SynthesizeMch, Binding::Engine),
    StageBinding::new(Stage::SynthesizeDef, Binding::Engine),
    StageBinding::new(Stage::SynthesizeCtrl, Binding::Engine),
    StageBinding::new(Stage::Parent, Binding::Engine),
    StageBinding::new(Stage::Constrain, Binding::Engine),
    StageBinding::new(Stage::Widget, Binding::Engine),
];

/// Checks that a table lists every stage exactly once, in order.
pub fn is_complete(bindings: &[StageBinding]) -> bool {
    bindings.len() == Stage::ALL.len()
        && bindings
            .iter()
            .zip(Stage::ALL.iter())
            .all(|(b, s)| b.stage == *s)
}
