//! Eyelid rig, end to end.

use chainrig_armature::{BoneGraph, ConstraintType, MetarigBone, WidgetShape};
use chainrig_generate::{generate, ConfigError, GenerateError, RigRegistry, ROOT_BONE};
use chainrig_tests::fixtures;
use chainrig_tests::{constraints_to, generate_metarig};
use pretty_assertions::assert_eq;

#[test]
fn single_eye_builds_aim_and_lids() {
    let generated = generate_metarig(&fixtures::single_eye()).unwrap();
    let rig = generated.report.rig("ORG-eye.L").unwrap();

    assert_eq!(rig.rig_type, "eyelid");
    assert_eq!(rig.chains.all_roots(), vec!["ORG-lid.T.L", "ORG-lid.B.L"]);
    generated.assert_bones(&[
        "master_eye.L",
        "eye.L",
        "MCH-eye.L",
        "MCH-eye_tip.L",
        "MCH-lid.T.L",
        "DEF-lid.T.L.003",
        "DEF-lid.B.L",
        "lid.T.L.004",
        ROOT_BONE,
    ]);
    // master, target, then 5 controls per lid; no extra master for even lids.
    assert_eq!(rig.controls.len(), 2 + 2 * 5);
    assert!(generated.armature.bone("DEF-lid.T.L").unwrap().deform);
}

#[test]
fn eye_target_and_tip_follow_the_aim() {
    let generated = generate_metarig(&fixtures::single_eye()).unwrap();
    let arm = &generated.armature;

    assert_eq!(constraints_to(arm, "MCH-eye.L", ConstraintType::DampedTrack, "eye.L").len(), 1);
    assert_eq!(
        constraints_to(arm, "MCH-eye_tip.L", ConstraintType::CopyLocation, "MCH-eye.L").len(),
        1
    );
    assert_eq!(
        arm.bone("eye.L").unwrap().pose.widget.as_ref().map(|w| w.shape),
        Some(WidgetShape::Eye)
    );
    for bone in ["MCH-eye.L", "MCH-eye_tip.L", "MCH-lid.T.L.002", "lid.B.L.001"] {
        assert_eq!(
            arm.bone(bone).unwrap().parent.as_deref(),
            Some("master_eye.L"),
            "{}",
            bone
        );
    }
}

#[test]
fn even_lid_uses_middle_control_as_master() {
    let generated = generate_metarig(&fixtures::single_eye()).unwrap();
    let arm = &generated.armature;

    let len = |name: &str| arm.bone(name).unwrap().length();
    assert!((len("lid.T.L.002") / len("lid.T.L") - 1.5).abs() < 1e-9);

    let near = constraints_to(arm, "lid.T.L.003", ConstraintType::CopyLocation, "lid.T.L.002");
    assert_eq!(near.len(), 1);
    assert!((arm.constraint(&near[0]).unwrap().influence - 0.6).abs() < 1e-12);

    let far = constraints_to(arm, "lid.T.L", ConstraintType::CopyLocation, "lid.T.L.002");
    assert_eq!(far.len(), 1);
    assert!((arm.constraint(&far[0]).unwrap().influence - 0.5).abs() < 1e-12);
}

#[test]
fn lid_deform_bones_aim_at_their_swing_bone() {
    let generated = generate_metarig(&fixtures::single_eye()).unwrap();
    let arm = &generated.armature;

    let def = arm.bone("DEF-lid.T.L.001").unwrap();
    let kinds: Vec<ConstraintType> = def.pose.constraints.iter().map(|c| c.constraint_type()).collect();
    assert_eq!(kinds, vec![ConstraintType::DampedTrack, ConstraintType::StretchTo]);
    for c in &def.pose.constraints {
        assert_eq!(c.target.as_deref(), Some("MCH-lid.T.L.001"));
        assert_eq!(c.head_tail(), Some(1.0));
    }
    // The first deform bone of a lid hangs off the other lid's last swing bone.
    assert_eq!(
        arm.bone("DEF-lid.T.L").unwrap().parent.as_deref(),
        Some("MCH-lid.B.L.003")
    );
}

#[test]
fn odd_lid_masters_keep_the_eye_parent() {
    let mut metarig = fixtures::single_eye();
    metarig.bones.retain(|b| !b.name.ends_with(".003"));
    metarig
        .bones
        .insert(0, MetarigBone::new("head", [0.0, 0.0, 0.0], [0.0, 0.0, 0.2]));
    let eye = metarig.bones.iter_mut().find(|b| b.name == "eye.L").unwrap();
    eye.parent = Some("head".to_string());

    let generated = generate_metarig(&metarig).unwrap();
    let arm = &generated.armature;

    for lid_master in ["lid.T_master.L", "lid.B_master.L"] {
        assert_eq!(arm.bone(lid_master).unwrap().parent.as_deref(), Some("ORG-head"));
    }
    assert_eq!(
        arm.bone("lid.T.L.001").unwrap().parent.as_deref(),
        Some("master_eye.L")
    );
}

#[test]
fn eye_pair_shares_a_common_target() {
    let generated = generate_metarig(&fixtures::eye_pair()).unwrap();
    let arm = &generated.armature;

    assert_eq!(generated.report.rigs.len(), 2);
    generated.assert_bones(&["eye_common", "eye.L", "eye.R"]);
    assert!(!arm.contains("eye_common.001"));
    for target in ["eye.L", "eye.R"] {
        assert_eq!(arm.bone(target).unwrap().parent.as_deref(), Some("eye_common"));
    }
    let right = generated.report.rig("ORG-eye.R").unwrap();
    assert!(right.controls.iter().any(|c| c == "eye_common"));
}

#[test]
fn extra_chain_fails_without_touching_the_armature() {
    let mut armature = fixtures::eye_with_extra_chain().to_armature().unwrap();
    let before = armature.clone();

    let err = generate(&mut armature, &RigRegistry::default()).unwrap_err();
    assert!(matches!(
        err,
        GenerateError::Config(ConfigError::WrongChainCount { found: 3, .. })
    ));
    assert!(err
        .to_string()
        .contains("exactly 2 disconnected chains must be parented to main bone"));
    assert_eq!(armature, before);
}

#[test]
fn generation_is_repeatable() {
    let a = generate_metarig(&fixtures::eye_pair()).unwrap();
    let b = generate_metarig(&fixtures::eye_pair()).unwrap();
    assert_eq!(a.report, b.report);
    assert_eq!(a.armature.bone_names(), b.armature.bone_names());
}
