//! chainrig rig generators
//!
//! Turns a metarig (an armature whose bones carry rig types and parameters)
//! into a control rig: mechanism (`MCH-`), deform (`DEF-`) and control bones,
//! plus the constraints, drivers and widgets that tie them together.
//!
//! # Rig types
//!
//! - **`chain`** - parallel MCH/DEF/control chains for every chain under the
//!   base bone
//! - **`eyelid`** - eye target, lid masters with falloff, lid tips
//! - **`limb`** / **`leg`** - IK/FK limb with tweaks, B-bone deform and
//!   (for legs) a foot roll mechanism
//! - **`cutout_limb`** - stretchy three-bone IK for flat characters
//!
//! # Example
//!
//! ```ignore
//! use chainrig_armature::Metarig;
//! use chainrig_generate::{generate, RigRegistry};
//!
//! let mut armature = Metarig::from_json(json)?.to_armature()?;
//! let report = generate(&mut armature, &RigRegistry::default())?;
//! println!("{} bones", report.total_bones);
//! ```

pub mod discovery;
pub mod error;
pub mod params;
pub mod pipeline;
pub mod recipe;
pub mod report;
pub mod rigs;
pub mod roles;
pub mod stage;
pub mod synth;
pub mod weave;

pub use discovery::{ChainDescriptor, ChainSet, LidPair};
pub use error::{ConfigError, GenerateError, GenerateResult};
pub use pipeline::{discover_all, generate, typed_bones, ROOT_BONE};
pub use report::{GenerationReport, RigOutput, RigReport, UiPanel};
pub use rigs::{RigBuilder, RigGenerator, RigPoser, RigRegistry};
pub use roles::{ChainMap, RoleSet};
pub use stage::{Binding, Stage, StageBinding};
