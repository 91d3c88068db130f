//! Generation helpers shared by the integration tests.

use chainrig_armature::{Armature, BoneGraph, ConstraintHandle, ConstraintType, Metarig};
use chainrig_generate::{generate, GenerateResult, GenerationReport, RigRegistry};

/// A generated armature and its report.
#[derive(Debug)]
pub struct Generated {
    pub armature: Armature,
    pub report: GenerationReport,
}

impl Generated {
    /// Asserts that every named bone exists.
    pub fn assert_bones(&self, names: &[&str]) {
        for name in names {
            assert!(
                self.armature.contains(name),
                "missing bone '{}'; bones: {:?}",
                name,
                self.armature.bone_names()
            );
        }
    }
}

/// Builds the armature for `metarig` and generates it with the default
/// registry.
pub fn generate_metarig(metarig: &Metarig) -> GenerateResult<Generated> {
    let mut armature = metarig
        .to_armature()
        .expect("fixture metarig should be valid");
    let report = generate(&mut armature, &RigRegistry::default())?;
    Ok(Generated { armature, report })
}

/// Handles of `kind` constraints on `bone` that target `target`.
pub fn constraints_to(
    armature: &Armature,
    bone: &str,
    kind: ConstraintType,
    target: &str,
) -> Vec<ConstraintHandle> {
    let Some(b) = armature.bone(bone) else {
        return Vec::new();
    };
    b.pose
        .constraints
        .iter()
        .filter(|c| c.constraint_type() == kind && c.target.as_deref() == Some(target))
        .map(|c| ConstraintHandle {
            bone: bone.to_string(),
            id: c.id,
        })
        .collect()
}
