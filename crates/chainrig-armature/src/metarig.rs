//! Metarig documents: the sparse artist-placed skeleton in JSON form.
//!
//! ```json
//! {
//!   "name": "face",
//!   "bones": [
//!     { "name": "eye.L", "head": [0.036, -0.069, 0.111], "tail": [0.036, -0.085, 0.111],
//!       "rig_type": "eyelid" },
//!     { "name": "lid.T.L", "head": [...], "tail": [...], "parent": "eye.L" }
//!   ]
//! }
//! ```

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::armature::Armature;
use crate::bone::Bone;
use crate::error::{MetarigError, MetarigResult};
use crate::math::{vec3, EPSILON};

/// One bone of a metarig.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MetarigBone {
    pub name: String,
    pub head: [f64; 3],
    pub tail: [f64; 3],
    #[serde(default)]
    pub roll: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    #[serde(default)]
    pub connected: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rig_type: Option<String>,
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub params: serde_json::Value,
}

impl MetarigBone {
    pub fn new(name: impl Into<String>, head: [f64; 3], tail: [f64; 3]) -> Self {
        Self {
            name: name.into(),
            head,
            tail,
            roll: 0.0,
            parent: None,
            connected: false,
            rig_type: None,
            params: serde_json::Value::Null,
        }
    }

    pub fn with_parent(mut self, parent: impl Into<String>, connected: bool) -> Self {
        self.parent = Some(parent.into());
        self.connected = connected;
        self
    }

    pub fn with_rig_type(mut self, rig_type: impl Into<String>) -> Self {
        self.rig_type = Some(rig_type.into());
        self
    }

    pub fn with_params(mut self, params: serde_json::Value) -> Self {
        self.params = params;
        self
    }

    pub fn with_roll(mut self, roll: f64) -> Self {
        self.roll = roll;
        self
    }
}

/// A complete metarig document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Metarig {
    pub name: String,
    pub bones: Vec<MetarigBone>,
}

impl Metarig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            bones: Vec::new(),
        }
    }

    pub fn with_bone(mut self, bone: MetarigBone) -> Self {
        self.bones.push(bone);
        self
    }

    /// Parses a metarig from JSON.
    pub fn from_json(json: &str) -> MetarigResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads a metarig from a JSON file.
    pub fn from_file(path: &Path) -> MetarigResult<Self> {
        let file = std::fs::File::open(path).map_err(serde_json::Error::io)?;
        Ok(serde_json::from_reader(std::io::BufReader::new(file))?)
    }

    pub fn to_json_pretty(&self) -> MetarigResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Checks names, parent ordering and geometry.
    ///
    /// Parents must be defined before their children, which also rules out
    /// cycles.
    pub fn validate(&self) -> MetarigResult<()> {
        let mut seen = HashSet::new();
        for (index, bone) in self.bones.iter().enumerate() {
            if bone.name.is_empty() {
                return Err(MetarigError::EmptyName { index });
            }
            if let Some(parent) = &bone.parent {
                if !seen.contains(parent.as_str()) {
                    return Err(MetarigError::UnknownParent {
                        bone: bone.name.clone(),
                        parent: parent.clone(),
                    });
                }
            } else if bone.connected {
                return Err(MetarigError::ConnectedWithoutParent {
                    bone: bone.name.clone(),
                });
            }
            if (vec3(bone.tail) - vec3(bone.head)).norm() <= EPSILON {
                return Err(MetarigError::ZeroLength {
                    bone: bone.name.clone(),
                });
            }
            if !seen.insert(bone.name.as_str()) {
                return Err(MetarigError::DuplicateBone {
                    name: bone.name.clone(),
                });
            }
        }
        Ok(())
    }

    /// Validates and builds the in-memory armature.
    pub fn to_armature(&self) -> MetarigResult<Armature> {
        self.validate()?;
        let mut armature = Armature::new(self.name.clone());
        for mb in &self.bones {
            let mut bone = Bone::new(mb.name.clone(), vec3(mb.head), vec3(mb.tail))
                .with_roll(mb.roll)
                .with_rig_params(mb.params.clone());
            if let Some(parent) = &mb.parent {
                bone = bone.with_parent(parent.clone(), mb.connected);
            }
            if let Some(rig_type) = &mb.rig_type {
                bone = bone.with_rig_type(rig_type.clone());
            }
            armature.add_bone(bone)?;
        }
        Ok(armature)
    }
}
