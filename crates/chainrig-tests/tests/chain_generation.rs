//! Generic chain rig, end to end.

use chainrig_armature::{BoneGraph, ConstraintType, WidgetShape};
use chainrig_generate::{ConfigError, GenerateError, ROOT_BONE};
use chainrig_tests::fixtures;
use chainrig_tests::{constraints_to, generate_metarig};
use pretty_assertions::assert_eq;

#[test]
fn chain_with_subchain_generates_parallel_tables() {
    let generated = generate_metarig(&fixtures::tail_with_subchain()).unwrap();
    let rig = generated.report.rig("ORG-tail_base").unwrap();

    assert_eq!(rig.rig_type, "chain");
    assert_eq!(rig.chains.all_roots(), vec!["ORG-fin.C", "ORG-fin_web.C"]);
    // Per chain of 3: 3 MCH, 3 DEF, 4 controls.
    assert_eq!(rig.bones_created, 2 * (3 + 3 + 4));
    assert_eq!(rig.controls.len(), 8);
}

#[test]
fn subchain_controls_follow_parent_chain_controls() {
    let generated = generate_metarig(&fixtures::tail_with_subchain()).unwrap();
    let arm = &generated.armature;
    let controls = &generated.report.rig("ORG-tail_base").unwrap().controls;
    let (main, sub) = controls.split_at(4);

    for (sub_ctrl, main_ctrl) in sub.iter().zip(main) {
        let parent = arm.bone(sub_ctrl).unwrap().parent.clone();
        assert_eq!(parent.as_deref(), Some(main_ctrl.as_str()));
    }
    for ctrl in main {
        let parent = arm.bone(ctrl).unwrap().parent.clone();
        assert_eq!(parent.as_deref(), Some(ROOT_BONE));
        let widget = arm.bone(ctrl).unwrap().pose.widget.clone().unwrap();
        assert_eq!(widget.shape, WidgetShape::Sphere);
    }
}

#[test]
fn deform_bones_aim_at_next_control() {
    let generated = generate_metarig(&fixtures::tail_with_subchain()).unwrap();
    let arm = &generated.armature;
    let controls = &generated.report.rig("ORG-tail_base").unwrap().controls;

    let def = "DEF-fin.C";
    assert!(arm.bone(def).unwrap().deform);
    assert_eq!(constraints_to(arm, def, ConstraintType::DampedTrack, &controls[1]).len(), 1);
    assert_eq!(constraints_to(arm, def, ConstraintType::StretchTo, &controls[1]).len(), 1);
    assert_eq!(constraints_to(arm, def, ConstraintType::CopyLocation, "MCH-fin.C").len(), 1);
}

#[test]
fn typed_child_is_its_own_rig() {
    let generated = generate_metarig(&fixtures::tail_with_subchain()).unwrap();
    let spike = generated.report.rig("ORG-spike").unwrap();
    assert!(spike.chains.chains.is_empty());
    assert_eq!(spike.bones_created, 0);
    assert_eq!(generated.report.rigs.len(), 2);
}

#[test]
fn original_bones_become_org_bones() {
    let generated = generate_metarig(&fixtures::tail_with_subchain()).unwrap();
    let arm = &generated.armature;
    generated.assert_bones(&["ORG-tail_base", "ORG-fin.C", "ORG-fin.C.002", ROOT_BONE]);
    // The name is reused by the control at that joint.
    assert!(!arm.bone("fin.C.001").unwrap().deform);
    assert!(!arm.bone("ORG-fin.C").unwrap().deform);
    assert_eq!(generated.report.total_bones, arm.len());
}

#[test]
fn short_subchain_is_rejected_before_mutation() {
    let mut metarig = fixtures::tail_with_subchain();
    metarig.bones.retain(|b| b.name != "fin_web.C.002");
    let err = generate_metarig(&metarig).unwrap_err();
    assert!(matches!(
        err,
        GenerateError::Config(ConfigError::SubchainLengthMismatch { .. })
    ));
}
