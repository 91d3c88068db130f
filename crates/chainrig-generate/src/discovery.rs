//! Chain discovery: read-only walks over the metarig.
//!
//! Everything here runs before the graph is touched. Results carry bone names
//! in their `ORG-` form, which is what the bones are called once generation
//! starts.

use chainrig_armature::naming::{mirror_name, org, MirrorName};
use chainrig_armature::{BoneGraph, GraphError};
use serde::Serialize;

use crate::error::{ConfigError, GenerateResult};

/// A chain root plus the roots of its same-length sibling sub-chains.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChainDescriptor {
    pub root: String,
    pub subchains: Vec<String>,
}

impl ChainDescriptor {
    /// Chain root followed by every sub-chain root.
    pub fn roots(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.root.as_str()).chain(self.subchains.iter().map(String::as_str))
    }
}

/// Every chain a rig owns, in discovery order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChainSet {
    /// The rig's base bone.
    pub base: String,
    pub chains: Vec<ChainDescriptor>,
}

impl ChainSet {
    /// All chain and sub-chain roots, each chain followed by its sub-chains.
    pub fn all_roots(&self) -> Vec<&str> {
        self.chains.iter().flat_map(|c| c.roots()).collect()
    }

    /// Parent chain root of a sub-chain root.
    pub fn parent_chain(&self, subchain: &str) -> Option<&str> {
        self.chains
            .iter()
            .find(|c| c.subchains.iter().any(|s| s == subchain))
            .map(|c| c.root.as_str())
    }
}

/// `root` followed by its connected descendants.
pub fn chain_bones(graph: &dyn BoneGraph, root: &str) -> Result<Vec<String>, GraphError> {
    let mut chain = vec![root.to_string()];
    chain.extend(graph.connected_children(root)?);
    Ok(chain)
}

/// Number of bones in the chain starting at `root`.
pub fn chain_length(graph: &dyn BoneGraph, root: &str) -> Result<usize, GraphError> {
    Ok(graph.connected_children(root)?.len() + 1)
}

/// Disconnected children of `bone`. With `untyped_only`, children that carry
/// their own rig type are skipped.
pub fn disconnected_children(
    graph: &dyn BoneGraph,
    bone: &str,
    untyped_only: bool,
) -> Result<Vec<String>, GraphError> {
    let mut out = Vec::new();
    for child in graph.children_of(bone)? {
        if graph.is_connected(&child)? {
            continue;
        }
        if untyped_only && graph.rig_type(&child).is_some() {
            continue;
        }
        out.push(child);
    }
    Ok(out)
}

/// Sub-chain roots of the chain starting at `root`.
///
/// Every untyped disconnected child of `root` must start a chain exactly as
/// long as the parent chain.
pub fn discover_subchains(graph: &dyn BoneGraph, root: &str) -> GenerateResult<Vec<String>> {
    let expected = chain_length(graph, root)?;
    let mut subchains = Vec::new();
    for child in disconnected_children(graph, root, true)? {
        if chain_length(graph, &child)? != expected {
            return Err(ConfigError::SubchainLengthMismatch {
                chain: org(root),
            }
            .into());
        }
        subchains.push(org(&child));
    }
    Ok(subchains)
}

/// Discovers the chains of a rig based on `base`.
///
/// Every untyped disconnected child of the base starts a chain.
pub fn discover_chains(graph: &dyn BoneGraph, base: &str) -> GenerateResult<ChainSet> {
    if graph.bone(base).is_none() {
        return Err(GraphError::unknown_bone(base).into());
    }
    let mut chains = Vec::new();
    for root in disconnected_children(graph, base, true)? {
        let subchains = discover_subchains(graph, &root)?;
        chains.push(ChainDescriptor {
            root: org(&root),
            subchains,
        });
    }
    Ok(ChainSet {
        base: org(base),
        chains,
    })
}

/// The two lid chain roots of an eye, top first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LidPair {
    pub top: String,
    pub bottom: String,
    /// Bones per lid.
    pub lid_len: usize,
}

/// Finds the top and bottom lid chains under an eye bone.
///
/// The eye must have exactly two disconnected children of equal chain length.
/// The one whose tail sits higher is the top lid; on a tie the first child
/// wins.
pub fn discover_lids(graph: &dyn BoneGraph, eye: &str) -> GenerateResult<LidPair> {
    let (top, bottom, lid_len) = find_lids(graph, eye)?;
    Ok(LidPair {
        top: org(&top),
        bottom: org(&bottom),
        lid_len,
    })
}

/// Lid pair plus the chain set of an eyelid rig: top chain first, then
/// bottom, each with its sub-chains.
pub fn discover_lid_chains(graph: &dyn BoneGraph, eye: &str) -> GenerateResult<(LidPair, ChainSet)> {
    let (top, bottom, lid_len) = find_lids(graph, eye)?;
    let mut chains = Vec::with_capacity(2);
    for root in [&top, &bottom] {
        chains.push(ChainDescriptor {
            root: org(root),
            subchains: discover_subchains(graph, root)?,
        });
    }
    let pair = LidPair {
        top: org(&top),
        bottom: org(&bottom),
        lid_len,
    };
    Ok((
        pair,
        ChainSet {
            base: org(eye),
            chains,
        },
    ))
}

fn find_lids(graph: &dyn BoneGraph, eye: &str) -> GenerateResult<(String, String, usize)> {
    let lids = disconnected_children(graph, eye, false)?;
    if lids.len() != 2 {
        return Err(ConfigError::WrongChainCount {
            bone: org(eye),
            found: lids.len(),
        }
        .into());
    }

    let first_len = chain_length(graph, &lids[0])?;
    let second_len = chain_length(graph, &lids[1])?;
    if first_len != second_len {
        return Err(ConfigError::LidLengthMismatch {
            bone: org(eye),
            first: first_len,
            second: second_len,
        }
        .into());
    }

    let tail_z = |name: &str| -> Result<f64, GraphError> {
        graph
            .bone(name)
            .map(|b| b.tail.z)
            .ok_or_else(|| GraphError::unknown_bone(name))
    };
    let (top, bottom) = if tail_z(&lids[0])? < tail_z(&lids[1])? {
        (lids[1].clone(), lids[0].clone())
    } else {
        (lids[0].clone(), lids[1].clone())
    };
    Ok((top, bottom, first_len))
}

/// Mirrored counterpart of a `base.SIDE.rest` name, if it exists in the graph.
///
/// A second dot block that is not `L`/`R`, or a mirrored name that does not
/// resolve, means "no pair". A name without a second dot block is malformed.
pub fn paired_bone(graph: &dyn BoneGraph, name: &str) -> Result<Option<String>, ConfigError> {
    match mirror_name(name) {
        MirrorName::Mirrored(mirrored) => {
            Ok(graph.bone(&mirrored).is_some().then_some(mirrored))
        }
        MirrorName::Unsided => Ok(None),
        MirrorName::Malformed => Err(ConfigError::MalformedPairedName {
            name: name.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chainrig_armature::{Armature, Bone, Vec3};
    use pretty_assertions::assert_eq;

    fn add(arm: &mut Armature, name: &str, head: [f64; 3], tail: [f64; 3], parent: Option<(&str, bool)>) {
        let mut bone = Bone::new(
            name,
            Vec3::new(head[0], head[1], head[2]),
            Vec3::new(tail[0], tail[1], tail[2]),
        );
        if let Some((p, connected)) = parent {
            bone = bone.with_parent(p, connected);
        }
        arm.add_bone(bone).unwrap();
    }

    fn lid(arm: &mut Armature, prefix: &str, z: f64, len: usize, parent: &str) {
        let mut prev: Option<String> = None;
        for i in 0..len {
            let name = if i == 0 {
                format!("{}.L", prefix)
            } else {
                format!("{}.L.{:03}", prefix, i)
            };
            let x = i as f64 * 0.01;
            match &prev {
                None => add(arm, &name, [x, -0.1, z], [x + 0.01, -0.1, z], Some((parent, false))),
                Some(p) => add(arm, &name, [x, -0.1, z], [x + 0.01, -0.1, z], Some((p.as_str(), true))),
            }
            prev = Some(name);
        }
    }

    fn eye(top_len: usize, bottom_len: usize, bottom_first: bool) -> Armature {
        let mut arm = Armature::new("face");
        add(&mut arm, "eye.L", [0.0; 3], [0.0, -0.1, 0.0], None);
        if bottom_first {
            lid(&mut arm, "lid.B", -0.01, bottom_len, "eye.L");
            lid(&mut arm, "lid.T", 0.01, top_len, "eye.L");
        } else {
            lid(&mut arm, "lid.T", 0.01, top_len, "eye.L");
            lid(&mut arm, "lid.B", -0.01, bottom_len, "eye.L");
        }
        arm
    }

    #[test]
    fn test_top_lid_is_higher_regardless_of_order() {
        for bottom_first in [false, true] {
            let arm = eye(4, 4, bottom_first);
            let pair = discover_lids(&arm, "eye.L").unwrap();
            assert_eq!(pair.top, "ORG-lid.T.L");
            assert_eq!(pair.bottom, "ORG-lid.B.L");
            assert_eq!(pair.lid_len, 4);
        }
    }

    #[test]
    fn test_lid_chain_set() {
        let arm = eye(3, 3, true);
        let (pair, set) = discover_lid_chains(&arm, "eye.L").unwrap();
        assert_eq!(pair.lid_len, 3);
        assert_eq!(set.base, "ORG-eye.L");
        assert_eq!(set.all_roots(), vec!["ORG-lid.T.L", "ORG-lid.B.L"]);
    }

    #[test]
    fn test_lid_length_mismatch() {
        let arm = eye(4, 3, false);
        let err = discover_lids(&arm, "eye.L").unwrap_err();
        assert!(matches!(
            err,
            crate::GenerateError::Config(ConfigError::LidLengthMismatch { .. })
        ));
    }

    #[test]
    fn test_three_lids_rejected() {
        let mut arm = eye(2, 2, false);
        add(&mut arm, "brow.L", [0.0, -0.1, 0.05], [0.01, -0.1, 0.05], Some(("eye.L", false)));
        let err = discover_lids(&arm, "eye.L").unwrap_err();
        assert!(err
            .to_string()
            .contains("exactly 2 disconnected chains must be parented to main bone"));
    }

    #[test]
    fn test_discover_chains_with_subchains() {
        let mut arm = Armature::new("tail");
        add(&mut arm, "base", [0.0; 3], [0.0, 0.1, 0.0], None);
        add(&mut arm, "a", [0.0, 0.1, 0.0], [0.0, 0.2, 0.0], Some(("base", false)));
        add(&mut arm, "a.001", [0.0, 0.2, 0.0], [0.0, 0.3, 0.0], Some(("a", true)));
        add(&mut arm, "b", [0.1, 0.1, 0.0], [0.1, 0.2, 0.0], Some(("a", false)));
        add(&mut arm, "b.001", [0.1, 0.2, 0.0], [0.1, 0.3, 0.0], Some(("b", true)));

        let set = discover_chains(&arm, "base").unwrap();
        assert_eq!(set.base, "ORG-base");
        assert_eq!(
            set.chains,
            vec![ChainDescriptor {
                root: "ORG-a".into(),
                subchains: vec!["ORG-b".into()],
            }]
        );
        assert_eq!(set.all_roots(), vec!["ORG-a", "ORG-b"]);
        assert_eq!(set.parent_chain("ORG-b"), Some("ORG-a"));

        // Idempotent.
        assert_eq!(discover_chains(&arm, "base").unwrap(), set);
    }

    #[test]
    fn test_short_subchain_rejected() {
        let mut arm = Armature::new("tail");
        add(&mut arm, "base", [0.0; 3], [0.0, 0.1, 0.0], None);
        add(&mut arm, "a", [0.0, 0.1, 0.0], [0.0, 0.2, 0.0], Some(("base", false)));
        add(&mut arm, "a.001", [0.0, 0.2, 0.0], [0.0, 0.3, 0.0], Some(("a", true)));
        add(&mut arm, "b", [0.1, 0.1, 0.0], [0.1, 0.2, 0.0], Some(("a", false)));
        let err = discover_chains(&arm, "base").unwrap_err();
        assert!(err.to_string().contains("subchains of chain starting with 'ORG-a'"));
    }

    #[test]
    fn test_typed_children_are_not_subchains() {
        let mut arm = Armature::new("tail");
        add(&mut arm, "base", [0.0; 3], [0.0, 0.1, 0.0], None);
        add(&mut arm, "a", [0.0, 0.1, 0.0], [0.0, 0.2, 0.0], Some(("base", false)));
        arm.add_bone(
            Bone::new("other", Vec3::zeros(), Vec3::y())
                .with_parent("a", false)
                .with_rig_type("chain"),
        )
        .unwrap();
        let set = discover_chains(&arm, "base").unwrap();
        assert!(set.chains[0].subchains.is_empty());
    }

    #[test]
    fn test_paired_bone() {
        let mut arm = Armature::new("face");
        add(&mut arm, "ORG-eye.L", [0.0; 3], [0.0, -0.1, 0.0], None);
        add(&mut arm, "ORG-eye.R", [0.1, 0.0, 0.0], [0.1, -0.1, 0.0], None);
        assert_eq!(paired_bone(&arm, "ORG-eye.L").unwrap(), Some("ORG-eye.R".into()));
        assert_eq!(paired_bone(&arm, "ORG-eye.R.001").unwrap(), None);
        assert_eq!(paired_bone(&arm, "ORG-eye.C").unwrap(), None);
        assert!(matches!(
            paired_bone(&arm, "ORG-eye"),
            Err(ConfigError::MalformedPairedName { .. })
        ));
    }
}
