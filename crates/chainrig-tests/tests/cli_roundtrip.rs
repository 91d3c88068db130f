//! CLI commands against metarig files on disk.

use std::fs;
use std::process::ExitCode;

use chainrig_armature::{Armature, BoneGraph};
use chainrig_cli::commands::{generate, inspect, validate};
use chainrig_tests::fixtures::{self, MetarigDir};
use pretty_assertions::assert_eq;

#[test]
fn generate_writes_armature_and_report() {
    let dir = MetarigDir::new();
    let metarig = dir.write("legs", &fixtures::leg(true));
    let out = dir.out_path("legs.rig.json");
    let report = dir.out_path("legs.report.json");

    let code = generate::run(
        metarig.to_str().unwrap(),
        Some(out.to_str().unwrap()),
        Some(report.to_str().unwrap()),
        false,
    )
    .unwrap();
    assert_eq!(code, ExitCode::SUCCESS);

    let armature: Armature = serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(armature.name(), "legs");
    for bone in ["root", "ORG-thigh.L", "thigh_parent.L", "foot_heel_ik.L"] {
        assert!(armature.contains(bone), "{}", bone);
    }
    assert!(!armature.bone("thigh_parent.L").unwrap().pose.properties.is_empty());

    let report: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&report).unwrap()).unwrap();
    assert_eq!(report["armature"], "legs");
    assert_eq!(report["rigs"][0]["rig_type"], "leg");
    assert_eq!(report["total_bones"], armature.len());
}

#[test]
fn generate_json_mode_writes_outputs() {
    let dir = MetarigDir::new();
    let metarig = dir.write("tail", &fixtures::tail_with_subchain());
    let out = dir.out_path("tail.rig.json");

    let code = generate::run(metarig.to_str().unwrap(), Some(out.to_str().unwrap()), None, true).unwrap();
    assert_eq!(code, ExitCode::SUCCESS);
    assert!(out.exists());
}

#[test]
fn failed_generation_writes_nothing() {
    let dir = MetarigDir::new();
    let metarig = dir.write("face", &fixtures::eye_with_extra_chain());
    let out = dir.out_path("face.rig.json");

    let code = generate::run(metarig.to_str().unwrap(), Some(out.to_str().unwrap()), None, false).unwrap();
    assert_eq!(code, ExitCode::from(1));
    assert!(!out.exists());
}

#[test]
fn validate_reports_discovery_errors() {
    let dir = MetarigDir::new();
    let good = dir.write("eyes", &fixtures::eye_pair());
    let bad = dir.write("brow", &fixtures::eye_with_extra_chain());

    assert_eq!(validate::run(good.to_str().unwrap(), false).unwrap(), ExitCode::SUCCESS);
    assert_eq!(validate::run(good.to_str().unwrap(), true).unwrap(), ExitCode::SUCCESS);
    assert_eq!(validate::run(bad.to_str().unwrap(), false).unwrap(), ExitCode::from(1));
    assert_eq!(validate::run(bad.to_str().unwrap(), true).unwrap(), ExitCode::from(1));
}

#[test]
fn validate_missing_file_fails() {
    let dir = MetarigDir::new();
    let missing = dir.out_path("nope.json");
    assert_eq!(validate::run(missing.to_str().unwrap(), true).unwrap(), ExitCode::from(1));
}

#[test]
fn inspect_lists_chains() {
    let dir = MetarigDir::new();
    let metarig = dir.write("tail", &fixtures::tail_with_subchain());
    assert_eq!(inspect::run(metarig.to_str().unwrap()).unwrap(), ExitCode::SUCCESS);
}

#[test]
fn inspect_missing_file_is_an_error() {
    let dir = MetarigDir::new();
    assert!(inspect::run(dir.out_path("nope.json").to_str().unwrap()).is_err());
}
