//! Limb, leg and cutout limb rigs, end to end.

use chainrig_armature::{BoneGraph, ConstraintType, PropertyRef};
use chainrig_generate::{ConfigError, GenerateError};
use chainrig_tests::fixtures;
use chainrig_tests::{constraints_to, generate_metarig, Generated};
use pretty_assertions::assert_eq;

/// Influences of the IK and FK copies on `org`.
fn switch_influences(generated: &Generated, org: &str, ik: &str, fk: &str) -> (f64, f64) {
    let arm = &generated.armature;
    let to_ik = constraints_to(arm, org, ConstraintType::CopyTransforms, ik);
    let to_fk = constraints_to(arm, org, ConstraintType::CopyTransforms, fk);
    assert_eq!((to_ik.len(), to_fk.len()), (1, 1), "{}", org);
    (
        arm.effective_influence(&to_ik[0]).unwrap(),
        arm.effective_influence(&to_fk[0]).unwrap(),
    )
}

#[test]
fn leg_builds_ik_fk_and_foot() {
    let generated = generate_metarig(&fixtures::leg(true)).unwrap();
    let rig = generated.report.rig("ORG-thigh.L").unwrap();

    assert_eq!(rig.rig_type, "leg");
    generated.assert_bones(&[
        "thigh_parent.L",
        "thigh_ik.L",
        "thigh_ik_target.L",
        "thigh_fk.L",
        "shin_fk.L",
        "foot_fk.L",
        "foot_ik.L",
        "foot_heel_ik.L",
        "toe.L",
        "DEF-thigh.L",
        "DEF-thigh.L.001",
        "DEF-shin.L.001",
        "DEF-foot.L",
        "ORG-heel.02.L",
    ]);
    for ctrl in ["thigh_parent.L", "thigh_ik.L", "foot_ik.L", "foot_heel_ik.L", "toe.L"] {
        assert!(rig.controls.iter().any(|c| c == ctrl), "{}", ctrl);
    }
}

#[test]
fn leg_settings_live_on_the_parent_control() {
    let generated = generate_metarig(&fixtures::leg(true)).unwrap();
    let panel = generated.report.rig("ORG-thigh.L").unwrap().ui_panel.clone().unwrap();

    assert_eq!(panel.owner, "thigh_parent.L");
    for property in ["IK/FK", "IK_Stretch", "IK_follow", "root/parent", "pole_vector"] {
        assert!(panel.properties.iter().any(|p| p == property), "{}", property);
        generated
            .armature
            .property(&PropertyRef::new("thigh_parent.L", property))
            .unwrap();
    }
}

#[test]
fn ik_fk_switch_blends_org_chain() {
    let mut generated = generate_metarig(&fixtures::leg(true)).unwrap();
    let switch = PropertyRef::new("thigh_parent.L", "IK/FK");

    // Defaults to FK.
    assert_eq!(
        switch_influences(&generated, "ORG-thigh.L", "thigh_ik.L", "thigh_fk.L"),
        (0.0, 1.0)
    );

    generated.armature.set_property_value(&switch, 1.0).unwrap();
    assert_eq!(
        switch_influences(&generated, "ORG-thigh.L", "thigh_ik.L", "thigh_fk.L"),
        (1.0, 0.0)
    );

    generated.armature.set_property_value(&switch, 0.25).unwrap();
    let (ik, fk) = switch_influences(&generated, "ORG-foot.L", "MCH-thigh_ik_target.L", "foot_fk.L");
    assert!((ik - 0.25).abs() < 1e-12);
    assert!((fk - 0.75).abs() < 1e-12);

    let stored = generated.armature.set_property_value(&switch, 2.0).unwrap();
    assert_eq!(stored, 1.0);
    assert_eq!(
        switch_influences(&generated, "ORG-thigh.L", "thigh_ik.L", "thigh_fk.L"),
        (1.0, 0.0)
    );
}

#[test]
fn unparented_leg_has_no_parent_space_switch() {
    let generated = generate_metarig(&fixtures::leg(false)).unwrap();
    let panel = generated.report.rig("ORG-thigh.L").unwrap().ui_panel.clone().unwrap();

    assert!(!panel.properties.iter().any(|p| p == "root/parent"));
    assert!(!generated.armature.contains("MCH-foot_ik_parent.L"));
    generated.assert_bones(&["MCH-foot_ik_root.L"]);
}

#[test]
fn leg_without_heel_is_rejected() {
    let mut metarig = fixtures::leg(true);
    metarig.bones.retain(|b| b.name != "heel.02.L");
    let err = generate_metarig(&metarig).unwrap_err();
    assert!(matches!(
        err,
        GenerateError::Config(ConfigError::MissingBone { .. })
    ));
}

#[test]
fn leg_without_toe_is_too_short() {
    let mut metarig = fixtures::leg(true);
    metarig.bones.retain(|b| b.name != "toe.L");
    let err = generate_metarig(&metarig).unwrap_err();
    assert!(matches!(
        err,
        GenerateError::Config(ConfigError::ShortChain {
            expected: 4,
            found: 3,
            ..
        })
    ));
}

#[test]
fn arm_splits_deform_segments() {
    let generated = generate_metarig(&fixtures::arm()).unwrap();
    let arm = &generated.armature;
    let rig = generated.report.rig("ORG-upper_arm.L").unwrap();

    assert_eq!(rig.rig_type, "limb");
    generated.assert_bones(&[
        "upper_arm_parent.L",
        "hand_ik.L",
        "DEF-upper_arm.L.002",
        "DEF-forearm.L.002",
        "DEF-hand.L",
    ]);
    assert!(!arm.contains("DEF-hand.L.001"));
    assert!(!arm.contains("foot_heel_ik.L"));

    for fk in ["upper_arm_fk.L", "forearm_fk.L", "hand_fk.L"] {
        assert_eq!(arm.bone(fk).unwrap().collection.as_deref(), Some("Arm.L (FK)"));
    }
    assert_eq!(
        arm.bone("DEF-upper_arm.L.001").unwrap().parent.as_deref(),
        Some("DEF-upper_arm.L")
    );
}

#[test]
fn cutout_arm_hinges_in_its_plane() {
    let generated = generate_metarig(&fixtures::cutout_arm()).unwrap();
    let arm = &generated.armature;
    let rig = generated.report.rig("ORG-upper_arm.L").unwrap();

    assert_eq!(rig.rig_type, "cutout_limb");
    assert_eq!(rig.controls, vec!["upper_arm_ik.L", "elbow.L", "hand_ik.L"]);
    assert_eq!(
        arm.bone("elbow.L").unwrap().parent.as_deref(),
        Some("upper_arm_ik.L")
    );

    let [min, max] = arm.bone("upper_arm_ik.L").unwrap().pose.ik.limit_z.unwrap();
    assert!((min + 150f64.to_radians()).abs() < 1e-9);
    assert!((max - 150f64.to_radians()).abs() < 1e-9);
    assert_eq!(arm.bone("MCH-forearm_ik.L").unwrap().pose.ik.lock, [true, true, false]);

    assert_eq!(
        constraints_to(arm, "ORG-forearm.L", ConstraintType::CopyTransforms, "MCH-forearm_stretch_ik.L").len(),
        1
    );
}
