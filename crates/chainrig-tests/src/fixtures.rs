//! Metarig fixtures.
//!
//! Coordinates follow the stock human metarig so the generated geometry is
//! representative.

use std::fs;
use std::path::PathBuf;

use chainrig_armature::{Metarig, MetarigBone};
use serde_json::json;
use tempfile::TempDir;

type Seg = ([f64; 3], [f64; 3]);

const EYE_L: Seg = ([0.0360, -0.0686, 0.1107], [0.0360, -0.0848, 0.1107]);

const LID_T_L: [Seg; 4] = [
    ([0.0515, -0.0692, 0.1104], [0.0474, -0.0785, 0.1136]),
    ([0.0474, -0.0785, 0.1136], [0.0394, -0.0838, 0.1147]),
    ([0.0394, -0.0838, 0.1147], [0.0317, -0.0832, 0.1131]),
    ([0.0317, -0.0832, 0.1131], [0.0237, -0.0826, 0.1058]),
];

const LID_B_L: [Seg; 4] = [
    ([0.0237, -0.0826, 0.1058], [0.0319, -0.0831, 0.1050]),
    ([0.0319, -0.0831, 0.1050], [0.0389, -0.0826, 0.1050]),
    ([0.0389, -0.0826, 0.1050], [0.0472, -0.0781, 0.1068]),
    ([0.0472, -0.0781, 0.1068], [0.0515, -0.0692, 0.1104]),
];

fn mirror(p: [f64; 3], side: &str) -> [f64; 3] {
    if side == "R" {
        [-p[0], p[1], p[2]]
    } else {
        p
    }
}

/// `name.SIDE`, then `name.SIDE.001`, ...
fn chain_name(name: &str, side: &str, index: usize) -> String {
    if index == 0 {
        format!("{}.{}", name, side)
    } else {
        format!("{}.{}.{:03}", name, side, index)
    }
}

/// Appends a connected chain under `parent` (disconnected at its root).
fn push_chain(metarig: &mut Metarig, name: &str, side: &str, segs: &[Seg], parent: &str) {
    let mut prev = parent.to_string();
    for (i, (head, tail)) in segs.iter().enumerate() {
        let bone_name = chain_name(name, side, i);
        metarig.bones.push(
            MetarigBone::new(bone_name.clone(), mirror(*head, side), mirror(*tail, side))
                .with_parent(prev, i > 0),
        );
        prev = bone_name;
    }
}

fn push_eye(metarig: &mut Metarig, side: &str) {
    let eye = format!("eye.{}", side);
    metarig.bones.push(
        MetarigBone::new(eye.clone(), mirror(EYE_L.0, side), mirror(EYE_L.1, side))
            .with_rig_type("eyelid"),
    );
    push_chain(metarig, "lid.T", side, &LID_T_L, &eye);
    push_chain(metarig, "lid.B", side, &LID_B_L, &eye);
}

/// One eye with a four-bone upper and lower lid.
pub fn single_eye() -> Metarig {
    let mut metarig = Metarig::new("face");
    push_eye(&mut metarig, "L");
    metarig
}

/// Both eyes, each an `eyelid` rig.
pub fn eye_pair() -> Metarig {
    let mut metarig = Metarig::new("face");
    push_eye(&mut metarig, "L");
    push_eye(&mut metarig, "R");
    metarig
}

/// One eye with a third lid chain, which eyelid discovery rejects.
pub fn eye_with_extra_chain() -> Metarig {
    let mut metarig = single_eye();
    let brow = [([0.02, -0.09, 0.13], [0.04, -0.09, 0.13])];
    push_chain(&mut metarig, "brow", "L", &brow, "eye.L");
    metarig
}

/// Left leg. With `hips`, the thigh hangs off a hips bone.
pub fn leg(hips: bool) -> Metarig {
    let mut metarig = Metarig::new("legs");
    let mut thigh = MetarigBone::new("thigh.L", [0.098, 0.0124, 1.072], [0.098, -0.0286, 0.5372])
        .with_rig_type("leg")
        .with_params(json!({ "segments": 2, "bbones": 10, "rot_axis": "x" }));
    if hips {
        metarig.bones.push(MetarigBone::new("hips", [0.0, 0.05, 1.03], [0.0, 0.05, 1.15]));
        thigh = thigh.with_parent("hips", false);
    }
    metarig.bones.push(thigh);
    metarig.bones.extend([
        MetarigBone::new("shin.L", [0.098, -0.0286, 0.5372], [0.098, 0.0162, 0.0852])
            .with_parent("thigh.L", true),
        MetarigBone::new("foot.L", [0.098, 0.0162, 0.0852], [0.098, -0.0934, 0.0167])
            .with_parent("shin.L", true),
        MetarigBone::new("toe.L", [0.098, -0.0934, 0.0167], [0.098, -0.1606, 0.0167])
            .with_parent("foot.L", true),
        MetarigBone::new("heel.02.L", [0.06, 0.0459, 0.0], [0.14, 0.0459, 0.0])
            .with_parent("foot.L", false),
    ]);
    metarig
}

/// Left arm as a `limb` rig under a shoulder.
pub fn arm() -> Metarig {
    Metarig::new("arms")
        .with_bone(MetarigBone::new("shoulder.L", [0.02, 0.0, 1.45], [0.17, 0.03, 1.45]))
        .with_bone(
            MetarigBone::new("upper_arm.L", [0.18, 0.03, 1.45], [0.45, 0.05, 1.45])
                .with_parent("shoulder.L", false)
                .with_rig_type("limb")
                .with_params(json!({ "segments": 3, "fk_collection": "Arm.L (FK)" })),
        )
        .with_bone(
            MetarigBone::new("forearm.L", [0.45, 0.05, 1.45], [0.7, 0.03, 1.45])
                .with_parent("upper_arm.L", true),
        )
        .with_bone(
            MetarigBone::new("hand.L", [0.7, 0.03, 1.45], [0.78, 0.03, 1.45])
                .with_parent("forearm.L", true),
        )
}

/// Flat arm for a cutout character, lying in the XZ plane.
pub fn cutout_arm() -> Metarig {
    Metarig::new("puppet")
        .with_bone(MetarigBone::new("torso", [0.0, 0.0, 1.0], [0.0, 0.0, 1.4]))
        .with_bone(
            MetarigBone::new("upper_arm.L", [0.1, 0.0, 1.35], [0.3, 0.0, 1.15])
                .with_parent("torso", false)
                .with_rig_type("cutout_limb")
                .with_params(json!({ "stretch_joint": "elbow", "side_suffix": ".L" })),
        )
        .with_bone(
            MetarigBone::new("forearm.L", [0.3, 0.0, 1.15], [0.5, 0.0, 1.0])
                .with_parent("upper_arm.L", true),
        )
        .with_bone(
            MetarigBone::new("hand.L", [0.5, 0.0, 1.0], [0.58, 0.0, 0.95])
                .with_parent("forearm.L", true),
        )
}

/// A `chain` rig: a three-bone chain with one same-length sub-chain, plus a
/// typed child that must not be taken as a sub-chain.
pub fn tail_with_subchain() -> Metarig {
    let segs = |x: f64| -> [Seg; 3] {
        [
            ([x, 0.1, 0.5], [x, 0.2, 0.5]),
            ([x, 0.2, 0.5], [x, 0.3, 0.5]),
            ([x, 0.3, 0.5], [x, 0.4, 0.5]),
        ]
    };
    let mut metarig = Metarig::new("tail").with_bone(
        MetarigBone::new("tail_base", [0.0, 0.0, 0.5], [0.0, 0.1, 0.5])
            .with_rig_type("chain")
            .with_params(json!({ "mch_scale": 0.3, "ctrl_scale": 0.1 })),
    );
    for (prefix, x, parent) in [("fin", 0.0, "tail_base"), ("fin_web", 0.05, "fin.C")] {
        let mut prev = parent.to_string();
        for (i, (head, tail)) in segs(x).iter().enumerate() {
            let name = chain_name(prefix, "C", i);
            metarig
                .bones
                .push(MetarigBone::new(name.clone(), *head, *tail).with_parent(prev, i > 0));
            prev = name;
        }
    }
    metarig.bones.push(
        MetarigBone::new("spike", [0.0, 0.15, 0.55], [0.0, 0.15, 0.6])
            .with_parent("fin.C", false)
            .with_rig_type("chain"),
    );
    metarig
}

/// A temp directory holding metarig files.
pub struct MetarigDir {
    pub root: TempDir,
}

impl MetarigDir {
    pub fn new() -> Self {
        Self {
            root: TempDir::new().expect("Failed to create temp dir"),
        }
    }

    /// Writes `metarig` as `<name>.json` and returns its path.
    pub fn write(&self, name: &str, metarig: &Metarig) -> PathBuf {
        let path = self.root.path().join(format!("{}.json", name));
        let json = metarig.to_json_pretty().expect("Failed to serialize metarig");
        fs::write(&path, json).expect("Failed to write metarig");
        path
    }

    /// Path for an output file inside the directory.
    pub fn out_path(&self, name: &str) -> PathBuf {
        self.root.path().join(name)
    }
}

impl Default for MetarigDir {
    fn default() -> Self {
        Self::new()
    }
}
