//! Chain synthesis: parallel MCH, DEF and control chains.
//!
//! Each function here is one engine stage. Rigs either call them as-is,
//! wrap them, or swap them out (see [`crate::stage`]).

use chainrig_armature::naming::{ctrl, deform, mch};
use chainrig_armature::EditPhase;
use tracing::debug;

use crate::discovery::{chain_bones, ChainSet};
use crate::error::GenerateResult;
use crate::roles::RoleSet;

/// Default MCH length relative to its org bone.
pub const MCH_SCALE: f64 = 0.3;

/// Default control length relative to the rig's base bone.
pub const CTRL_SCALE: f64 = 0.1;

/// Records the org bones of every chain and sub-chain.
pub fn collect_org(edit: &EditPhase<'_>, chains: &ChainSet, roles: &mut RoleSet) -> GenerateResult<()> {
    for root in chains.all_roots() {
        roles.org.insert(root, chain_bones(edit.graph(), root)?);
    }
    Ok(())
}

/// One unparented MCH per org bone, `scale` times as long.
pub fn make_mch_chain(
    edit: &mut EditPhase<'_>,
    org_bones: &[String],
    scale: f64,
) -> GenerateResult<Vec<String>> {
    let mut out = Vec::with_capacity(org_bones.len());
    for org in org_bones {
        let name = edit.copy_bone(org, &mch(org))?;
        edit.clear_parent(&name)?;
        edit.scale_length(&name, scale)?;
        edit.set_deform(&name, false)?;
        out.push(name);
    }
    Ok(out)
}

/// One unparented deform bone per org bone, full length.
pub fn make_def_chain(edit: &mut EditPhase<'_>, org_bones: &[String]) -> GenerateResult<Vec<String>> {
    let mut out = Vec::with_capacity(org_bones.len());
    for org in org_bones {
        let name = edit.copy_bone(org, &deform(org))?;
        edit.clear_parent(&name)?;
        edit.set_deform(&name, true)?;
        out.push(name);
    }
    Ok(out)
}

/// N+1 controls for N org bones: one at every head plus one at the last
/// tail. Each is a copy of `base` moved to its joint, `scale` times as long.
pub fn make_ctrl_chain(
    edit: &mut EditPhase<'_>,
    base: &str,
    org_bones: &[String],
    scale: f64,
) -> GenerateResult<Vec<String>> {
    let Some(last) = org_bones.last() else {
        return Ok(Vec::new());
    };
    let mut joints = Vec::with_capacity(org_bones.len() + 1);
    for org in org_bones {
        joints.push((ctrl(org), edit.bone(org)?.head));
    }
    joints.push((ctrl(last), edit.bone(last)?.tail));

    let mut out = Vec::with_capacity(joints.len());
    for (wanted, pos) in joints {
        let name = edit.copy_bone(base, &wanted)?;
        edit.put_bone(&name, pos)?;
        edit.scale_length(&name, scale)?;
        edit.set_deform(&name, false)?;
        out.push(name);
    }
    Ok(out)
}

fn org_chains(roles: &RoleSet) -> Vec<(String, Vec<String>)> {
    roles
        .org
        .iter()
        .map(|(chain, bones)| (chain.to_string(), bones.to_vec()))
        .collect()
}

/// Engine `synthesize-mch` stage.
pub fn synthesize_mch(edit: &mut EditPhase<'_>, roles: &mut RoleSet, scale: f64) -> GenerateResult<()> {
    for (chain, bones) in org_chains(roles) {
        let mchs = make_mch_chain(edit, &bones, scale)?;
        debug!(chain = %chain, count = mchs.len(), "created MCH chain");
        roles.mch.insert(chain, mchs);
    }
    Ok(())
}

/// Engine `synthesize-def` stage.
pub fn synthesize_def(edit: &mut EditPhase<'_>, roles: &mut RoleSet) -> GenerateResult<()> {
    for (chain, bones) in org_chains(roles) {
        let defs = make_def_chain(edit, &bones)?;
        debug!(chain = %chain, count = defs.len(), "created DEF chain");
        roles.def.insert(chain, defs);
    }
    Ok(())
}

/// Engine `synthesize-ctrl` stage.
pub fn synthesize_ctrl(
    edit: &mut EditPhase<'_>,
    base: &str,
    roles: &mut RoleSet,
    scale: f64,
) -> GenerateResult<()> {
    for (chain, bones) in org_chains(roles) {
        let ctrls = make_ctrl_chain(edit, base, &bones, scale)?;
        debug!(chain = %chain, count = ctrls.len(), "created control chain");
        roles.ctrl.insert(chain, ctrls);
    }
    Ok(())
}

/// MCH[i] → CTRL[i] of the same chain, where that control exists.
pub fn parent_mch_to_ctrl(edit: &mut EditPhase<'_>, roles: &RoleSet) -> GenerateResult<()> {
    for (chain, mchs) in roles.mch.iter() {
        for (i, name) in mchs.iter().enumerate() {
            if let Some(parent) = roles.get_ctrl_by_index(chain, i) {
                edit.set_parent(name, parent, false)?;
            }
        }
    }
    Ok(())
}

/// Sub-chain CTRL[i] → parent chain CTRL[i], where that control exists.
pub fn parent_subchain_ctrls(
    edit: &mut EditPhase<'_>,
    chains: &ChainSet,
    roles: &RoleSet,
) -> GenerateResult<()> {
    for chain in &chains.chains {
        for sub in &chain.subchains {
            let Some(ctrls) = roles.ctrl.get(sub) else {
                continue;
            };
            for (i, name) in ctrls.iter().enumerate() {
                if let Some(parent) = roles.get_ctrl_by_index(&chain.root, i) {
                    edit.set_parent(name, parent, false)?;
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discovery::discover_chains;
    use chainrig_armature::{Armature, Bone, BoneGraph, Vec3};
    use pretty_assertions::assert_eq;

    /// base + chain a (3 bones) + sub-chain b (3 bones), already in ORG form.
    fn rig() -> Armature {
        let mut arm = Armature::new("rig");
        let mut add = |name: &str, head: [f64; 3], tail: [f64; 3], parent: Option<(&str, bool)>| {
            let mut b = Bone::new(
                name,
                Vec3::new(head[0], head[1], head[2]),
                Vec3::new(tail[0], tail[1], tail[2]),
            );
            if let Some((p, c)) = parent {
                b = b.with_parent(p, c);
            }
            arm.add_bone(b).unwrap();
        };
        add("ORG-base", [0.0; 3], [0.0, 0.0, 1.0], None);
        add("ORG-a", [0.0, 0.0, 1.0], [0.0, 1.0, 1.0], Some(("ORG-base", false)));
        add("ORG-a.001", [0.0, 1.0, 1.0], [0.0, 2.0, 1.0], Some(("ORG-a", true)));
        add("ORG-a.002", [0.0, 2.0, 1.0], [0.0, 3.0, 1.0], Some(("ORG-a.001", true)));
        add("ORG-b", [1.0, 0.0, 1.0], [1.0, 1.0, 1.0], Some(("ORG-a", false)));
        add("ORG-b.001", [1.0, 1.0, 1.0], [1.0, 2.0, 1.0], Some(("ORG-b", true)));
        add("ORG-b.002", [1.0, 2.0, 1.0], [1.0, 3.0, 1.0], Some(("ORG-b.001", true)));
        arm
    }

    fn synthesize(arm: &mut Armature) -> (ChainSet, RoleSet) {
        let chains = discover_chains(&*arm, "ORG-base").unwrap();
        let mut roles = RoleSet::default();
        let mut edit = EditPhase::new(arm);
        collect_org(&edit, &chains, &mut roles).unwrap();
        synthesize_mch(&mut edit, &mut roles, MCH_SCALE).unwrap();
        synthesize_def(&mut edit, &mut roles).unwrap();
        synthesize_ctrl(&mut edit, "ORG-base", &mut roles, CTRL_SCALE).unwrap();
        parent_mch_to_ctrl(&mut edit, &roles).unwrap();
        parent_subchain_ctrls(&mut edit, &chains, &roles).unwrap();
        (chains, roles)
    }

    #[test]
    fn test_role_counts() {
        let mut arm = rig();
        let (_, roles) = synthesize(&mut arm);
        for chain in ["ORG-a", "ORG-b"] {
            assert_eq!(roles.org.get(chain).unwrap().len(), 3);
            assert_eq!(roles.mch.get(chain).unwrap().len(), 3);
            assert_eq!(roles.def.get(chain).unwrap().len(), 3);
            assert_eq!(roles.ctrl.get(chain).unwrap().len(), 4);
        }
    }

    #[test]
    fn test_names_and_geometry() {
        let mut arm = rig();
        let (_, roles) = synthesize(&mut arm);
        assert_eq!(
            roles.mch.get("ORG-a").unwrap(),
            &["MCH-a", "MCH-a.001", "MCH-a.002"].map(String::from)
        );
        assert_eq!(
            roles.ctrl.get("ORG-a").unwrap(),
            &["a", "a.001", "a.002", "a.003"].map(String::from)
        );

        let mch = arm.bone("MCH-a.001").unwrap();
        assert!((mch.length() - 0.3).abs() < 1e-9);
        assert!(!mch.deform);
        assert!(arm.bone("DEF-a").unwrap().deform);

        let last = arm.bone("a.003").unwrap();
        assert!((last.head - Vec3::new(0.0, 3.0, 1.0)).norm() < 1e-9);
        assert!((last.length() - 0.1).abs() < 1e-9);
        // Controls copy the base bone's orientation.
        assert!((last.y_axis() - Vec3::z()).norm() < 1e-9);
    }

    #[test]
    fn test_parenting() {
        let mut arm = rig();
        let (_, roles) = synthesize(&mut arm);
        assert_eq!(arm.bone("MCH-a.002").unwrap().parent.as_deref(), Some("a.002"));
        assert_eq!(arm.bone("MCH-b").unwrap().parent.as_deref(), Some("b"));
        // Sub-chain controls follow the parent chain's controls by index.
        let sub = roles.ctrl.get("ORG-b").unwrap();
        let main = roles.ctrl.get("ORG-a").unwrap();
        for (s, m) in sub.iter().zip(main) {
            assert_eq!(arm.bone(s).unwrap().parent.as_deref(), Some(m.as_str()));
        }
        assert_eq!(arm.bone("DEF-a").unwrap().parent, None);
    }
}
