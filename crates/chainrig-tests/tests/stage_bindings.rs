//! Each rig's stage table against what the rig actually builds.
//!
//! Every binding a rig declares has a matching check on the generated
//! armature. Changing a table without changing the rig (or the reverse)
//! fails here.

use chainrig_armature::{Armature, BoneGraph, ConstraintType, Vec3, WidgetShape};
use chainrig_generate::{Binding, ConfigError, GenerateError, RigRegistry, Stage, ROOT_BONE};
use chainrig_tests::fixtures;
use chainrig_tests::{constraints_to, generate_metarig};
use pretty_assertions::assert_eq;

/// Runs `check` for every entry of the stage table of `rig_type`.
fn for_each_binding(rig_type: &str, mut check: impl FnMut(Stage, Binding)) {
    let registry = RigRegistry::default();
    let generator = registry.get(rig_type).unwrap();
    for b in generator.stages() {
        check(b.stage, b.binding);
    }
}

fn same_point(a: Vec3, b: Vec3) -> bool {
    (a - b).norm() < 1e-9
}

fn widget(arm: &Armature, bone: &str) -> Option<WidgetShape> {
    arm.bone(bone).unwrap().pose.widget.as_ref().map(|w| w.shape)
}

fn has_constraint(arm: &Armature, bone: &str, kind: ConstraintType) -> bool {
    arm.bone(bone)
        .unwrap()
        .pose
        .constraints
        .iter()
        .any(|c| c.constraint_type() == kind)
}

#[test]
fn chain_runs_every_engine_stage() {
    let generated = generate_metarig(&fixtures::tail_with_subchain()).unwrap();
    let arm = &generated.armature;
    let rig = generated.report.rig("ORG-tail_base").unwrap();

    for_each_binding("chain", |stage, binding| match (stage, binding) {
        (Stage::Discover, Binding::Engine) => {
            assert_eq!(rig.chains.all_roots(), vec!["ORG-fin.C", "ORG-fin_web.C"]);
        }
        (Stage::SynthesizeMch, Binding::Engine) => {
            let ratio = arm.bone("MCH-fin.C").unwrap().length() / arm.bone("ORG-fin.C").unwrap().length();
            assert!((ratio - 0.3).abs() < 1e-9);
        }
        (Stage::SynthesizeDef, Binding::Engine) => {
            assert!(arm.bone("DEF-fin.C.002").unwrap().deform);
        }
        (Stage::SynthesizeCtrl, Binding::Engine) => {
            generated.assert_bones(&["fin.C", "fin.C.003", "fin_web.C.003"]);
        }
        (Stage::Parent, Binding::Engine) => {
            assert_eq!(arm.bone("MCH-fin.C").unwrap().parent.as_deref(), Some("fin.C"));
            assert_eq!(arm.bone("fin_web.C").unwrap().parent.as_deref(), Some("fin.C"));
        }
        (Stage::Constrain, Binding::Engine) => {
            assert_eq!(
                constraints_to(arm, "DEF-fin.C", ConstraintType::CopyLocation, "MCH-fin.C").len(),
                1
            );
        }
        (Stage::Widget, Binding::Engine) => {
            assert_eq!(widget(arm, "fin.C"), Some(WidgetShape::Sphere));
        }
        other => panic!("chain: no check for {:?}", other),
    });
}

#[test]
fn eyelid_stage_table_matches_output() {
    let generated = generate_metarig(&fixtures::single_eye()).unwrap();
    let arm = &generated.armature;
    let bone = |name: &str| arm.bone(name).unwrap();

    for_each_binding("eyelid", |stage, binding| match (stage, binding) {
        (Stage::Discover, Binding::Extended) => {
            // Exactly two lids, top first.
            let rig = generated.report.rig("ORG-eye.L").unwrap();
            assert_eq!(rig.chains.all_roots(), vec!["ORG-lid.T.L", "ORG-lid.B.L"]);
            let err = generate_metarig(&fixtures::eye_with_extra_chain()).unwrap_err();
            assert!(matches!(
                err,
                GenerateError::Config(ConfigError::WrongChainCount { .. })
            ));
        }
        (Stage::SynthesizeMch, Binding::Replaced) => {
            // Swing bones start at the eye and end at the lid bone's tail.
            let mech = bone("MCH-lid.T.L.001");
            assert!(same_point(mech.head, bone("ORG-eye.L").head));
            assert!(same_point(mech.tail, bone("ORG-lid.T.L.001").tail));
        }
        (Stage::SynthesizeDef, Binding::Engine) => {
            let def = bone("DEF-lid.B.L.002");
            assert!(def.deform);
            assert!(same_point(def.head, bone("ORG-lid.B.L.002").head));
        }
        (Stage::SynthesizeCtrl, Binding::Extended) => {
            generated.assert_bones(&["lid.T.L", "lid.T.L.004", "lid.B.L.004", "master_eye.L", "eye.L"]);
        }
        (Stage::Parent, Binding::Extended) => {
            assert_eq!(bone("MCH-lid.T.L.001").parent.as_deref(), Some("master_eye.L"));
            assert_eq!(bone("DEF-lid.T.L.001").parent.as_deref(), Some("MCH-lid.T.L"));
        }
        (Stage::Constrain, Binding::Extended) => {
            assert_eq!(
                constraints_to(arm, "DEF-lid.T.L.001", ConstraintType::StretchTo, "MCH-lid.T.L.001").len(),
                1
            );
            assert_eq!(
                constraints_to(arm, "MCH-eye.L", ConstraintType::DampedTrack, "eye.L").len(),
                1
            );
        }
        (Stage::Widget, Binding::Extended) => {
            assert_eq!(widget(arm, "lid.T.L.001"), Some(WidgetShape::Sphere));
            assert_eq!(widget(arm, "eye.L"), Some(WidgetShape::Eye));
        }
        other => panic!("eyelid: no check for {:?}", other),
    });
}

#[test]
fn limb_stage_table_matches_output() {
    let generated = generate_metarig(&fixtures::arm()).unwrap();
    let arm = &generated.armature;

    for_each_binding("limb", |stage, binding| match (stage, binding) {
        (Stage::Discover, Binding::Extended) => {
            let mut metarig = fixtures::arm();
            metarig.bones.retain(|b| b.name != "hand.L");
            let err = generate_metarig(&metarig).unwrap_err();
            assert!(matches!(
                err,
                GenerateError::Config(ConfigError::ShortChain {
                    expected: 3,
                    found: 2,
                    ..
                })
            ));
        }
        (Stage::SynthesizeMch, Binding::Replaced) => {
            assert!(!arm.contains("MCH-upper_arm.L"));
            generated.assert_bones(&["MCH-upper_arm_ik.L", "MCH-upper_arm_parent.L"]);
        }
        (Stage::SynthesizeDef, Binding::Replaced) => {
            generated.assert_bones(&["DEF-upper_arm.L.001", "DEF-upper_arm.L.002"]);
        }
        (Stage::SynthesizeCtrl, Binding::Replaced) => {
            assert!(!arm.contains("upper_arm.L"));
            generated.assert_bones(&["upper_arm_fk.L", "upper_arm_ik.L", "hand_ik.L"]);
        }
        (Stage::Parent, Binding::Replaced) => {
            let parent = arm.bone("DEF-upper_arm.L.001").unwrap().parent.clone();
            assert_eq!(parent.as_deref(), Some("DEF-upper_arm.L"));
        }
        (Stage::Constrain, Binding::Replaced) => {
            assert!(!has_constraint(arm, "DEF-upper_arm.L", ConstraintType::CopyLocation));
            assert_eq!(
                constraints_to(arm, "ORG-upper_arm.L", ConstraintType::CopyTransforms, "upper_arm_fk.L").len(),
                1
            );
        }
        (Stage::Widget, Binding::Replaced) => {
            assert_eq!(widget(arm, "upper_arm_fk.L"), Some(WidgetShape::Limb));
        }
        other => panic!("limb: no check for {:?}", other),
    });
}

#[test]
fn leg_shares_the_limb_table() {
    let registry = RigRegistry::default();
    let limb = registry.get("limb").unwrap().stages();
    let leg = registry.get("leg").unwrap().stages();
    assert_eq!(limb, leg);

    let mut metarig = fixtures::leg(true);
    metarig.bones.retain(|b| b.name != "heel.02.L");
    let err = generate_metarig(&metarig).unwrap_err();
    assert!(matches!(
        err,
        GenerateError::Config(ConfigError::MissingBone { .. })
    ));
}

#[test]
fn cutout_limb_stage_table_matches_output() {
    let generated = generate_metarig(&fixtures::cutout_arm()).unwrap();
    let arm = &generated.armature;

    for_each_binding("cutout_limb", |stage, binding| match (stage, binding) {
        (Stage::Discover, Binding::Extended) => {
            // The limb needs a parent bone to hang from.
            let mut metarig = fixtures::cutout_arm();
            metarig.bones.retain(|b| b.name != "torso");
            metarig.bones[0].parent = None;
            let err = generate_metarig(&metarig).unwrap_err();
            assert!(matches!(
                err,
                GenerateError::Config(ConfigError::MissingBone { .. })
            ));
        }
        (Stage::SynthesizeMch, Binding::Replaced) => {
            assert!(!arm.contains("MCH-upper_arm.L"));
            generated.assert_bones(&[
                "MCH-upper_arm_stretch_ik.L",
                "MCH-forearm_stretch_ik.L",
                "MCH-hand_stretch_ik.L",
                "MCH-forearm_ik.L",
            ]);
        }
        (Stage::SynthesizeDef, Binding::Replaced) => {
            assert!(!arm.bone_names().iter().any(|n| n.starts_with("DEF-")));
        }
        (Stage::SynthesizeCtrl, Binding::Replaced) => {
            assert!(!arm.contains("upper_arm.L"));
            generated.assert_bones(&["upper_arm_ik.L", "elbow.L", "hand_ik.L"]);
        }
        (Stage::Parent, Binding::Replaced) => {
            assert_eq!(arm.bone("elbow.L").unwrap().parent.as_deref(), Some("upper_arm_ik.L"));
            assert_eq!(arm.bone("hand_ik.L").unwrap().parent.as_deref(), Some(ROOT_BONE));
        }
        (Stage::Constrain, Binding::Replaced) => {
            assert_eq!(
                constraints_to(arm, "ORG-hand.L", ConstraintType::CopyTransforms, "MCH-hand_stretch_ik.L").len(),
                1
            );
        }
        (Stage::Widget, Binding::Replaced) => {
            assert_eq!(widget(arm, "upper_arm_ik.L"), Some(WidgetShape::Limb));
            assert_eq!(widget(arm, "hand_ik.L"), Some(WidgetShape::Cube));
        }
        other => panic!("cutout_limb: no check for {:?}", other),
    });
}
