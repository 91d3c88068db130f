//! Per-rig parameter blocks read from the metarig `params` field.

use chainrig_armature::BoneGraph;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::synth::{CTRL_SCALE, MCH_SCALE};

fn default_mch_scale() -> f64 {
    MCH_SCALE
}

fn default_ctrl_scale() -> f64 {
    CTRL_SCALE
}

fn default_segments() -> u32 {
    2
}

fn default_bbones() -> u32 {
    10
}

fn default_ik_limits() -> [f64; 4] {
    [-150.0, 150.0, 0.0, 160.0]
}

/// Deserializes a rig's params, treating `null` as "all defaults", and runs
/// validation.
pub fn parse_params<P>(rig: &str, bone: &str, value: &serde_json::Value) -> Result<P, ConfigError>
where
    P: DeserializeOwned + Default + RigParams,
{
    let params: P = if value.is_null() {
        P::default()
    } else {
        serde_json::from_value(value.clone())
            .map_err(|e| ConfigError::invalid_params(rig, bone, e.to_string()))?
    };
    params
        .validate()
        .map_err(|message| ConfigError::invalid_params(rig, bone, message))?;
    Ok(params)
}

/// Reads and parses the params stored on a metarig bone.
pub fn read_params<P>(graph: &dyn BoneGraph, rig: &str, bone: &str) -> Result<P, ConfigError>
where
    P: DeserializeOwned + Default + RigParams,
{
    match graph.bone(bone) {
        Some(b) => parse_params(rig, bone, &b.rig_params),
        None => parse_params(rig, bone, &serde_json::Value::Null),
    }
}

/// Validation hook shared by all parameter blocks.
pub trait RigParams {
    fn validate(&self) -> Result<(), String> {
        Ok(())
    }
}

/// Parameters of the generic `chain` rig.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChainParams {
    /// MCH bone length relative to the org bone.
    #[serde(default = "default_mch_scale")]
    pub mch_scale: f64,
    /// Control bone length relative to the base bone.
    #[serde(default = "default_ctrl_scale")]
    pub ctrl_scale: f64,
}

impl Default for ChainParams {
    fn default() -> Self {
        Self {
            mch_scale: MCH_SCALE,
            ctrl_scale: CTRL_SCALE,
        }
    }
}

impl RigParams for ChainParams {
    fn validate(&self) -> Result<(), String> {
        if !(self.mch_scale > 0.0) {
            return Err(format!("mch_scale must be positive, got {}", self.mch_scale));
        }
        if !(self.ctrl_scale > 0.0) {
            return Err(format!("ctrl_scale must be positive, got {}", self.ctrl_scale));
        }
        Ok(())
    }
}

/// Parameters of the `eyelid` rig.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EyelidParams {
    /// Bone whose Y axis orients the eye target and lid controls. Defaults to
    /// the eye bone itself, in which case world +Z is used.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orientation_bone: Option<String>,
}

impl RigParams for EyelidParams {}

/// Bone axis the limb bends around.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RotAxis {
    #[default]
    X,
    Y,
    Z,
}

impl RotAxis {
    pub fn index(&self) -> usize {
        match self {
            RotAxis::X => 0,
            RotAxis::Y => 1,
            RotAxis::Z => 2,
        }
    }
}

/// Parameters of the `limb` and `leg` rigs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LimbParams {
    /// Tweak sub-joints per non-terminal bone.
    #[serde(default = "default_segments")]
    pub segments: u32,
    /// B-bone segments on the deform bones.
    #[serde(default = "default_bbones")]
    pub bbones: u32,
    #[serde(default)]
    pub rot_axis: RotAxis,
    /// Bone collection for FK controls.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fk_collection: Option<String>,
    /// Bone collection for tweak controls.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tweak_collection: Option<String>,
}

impl Default for LimbParams {
    fn default() -> Self {
        Self {
            segments: default_segments(),
            bbones: default_bbones(),
            rot_axis: RotAxis::X,
            fk_collection: None,
            tweak_collection: None,
        }
    }
}

impl RigParams for LimbParams {
    fn validate(&self) -> Result<(), String> {
        if self.segments < 1 {
            return Err("segments must be at least 1".to_string());
        }
        if self.bbones < 1 {
            return Err("bbones must be at least 1".to_string());
        }
        Ok(())
    }
}

/// Parameters of the `cutout_limb` rig.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CutoutLimbParams {
    /// Name of the joint control; derived from the lower bone when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stretch_joint: Option<String>,
    /// Suffix appended to the joint name, e.g. `.L`.
    #[serde(default)]
    pub side_suffix: String,
    /// IK rotation limits in degrees: upper min/max, lower min/max.
    #[serde(default = "default_ik_limits")]
    pub ik_limits: [f64; 4],
}

impl Default for CutoutLimbParams {
    fn default() -> Self {
        Self {
            stretch_joint: None,
            side_suffix: String::new(),
            ik_limits: default_ik_limits(),
        }
    }
}

impl RigParams for CutoutLimbParams {
    fn validate(&self) -> Result<(), String> {
        let [a, b, c, d] = self.ik_limits;
        if a > b || c > d {
            return Err(format!(
                "ik_limits must be ordered min/max pairs, got {:?}",
                self.ik_limits
            ));
        }
        Ok(())
    }
}
