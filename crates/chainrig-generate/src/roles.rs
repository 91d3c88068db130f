//! Parallel role tables built by synthesis.

use serde::Serialize;

/// Chain root → ordered bone names, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ChainMap {
    entries: Vec<(String, Vec<String>)>,
}

impl ChainMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces the bones of a chain.
    pub fn insert(&mut self, chain: impl Into<String>, bones: Vec<String>) {
        let chain = chain.into();
        match self.entries.iter_mut().find(|(name, _)| *name == chain) {
            Some((_, existing)) => *existing = bones,
            None => self.entries.push((chain, bones)),
        }
    }

    pub fn get(&self, chain: &str) -> Option<&[String]> {
        self.entries
            .iter()
            .find(|(name, _)| name == chain)
            .map(|(_, bones)| bones.as_slice())
    }

    pub fn get_mut(&mut self, chain: &str) -> Option<&mut Vec<String>> {
        self.entries
            .iter_mut()
            .find(|(name, _)| name == chain)
            .map(|(_, bones)| bones)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(name, bones)| (name.as_str(), bones.as_slice()))
    }

    pub fn chains(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    /// Every bone of every chain.
    pub fn bones(&self) -> impl Iterator<Item = &str> {
        self.entries
            .iter()
            .flat_map(|(_, bones)| bones.iter().map(String::as_str))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The four parallel role tables of a rig.
///
/// For a chain of N org bones, `mch` and `def` hold N names and `ctrl` N+1.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RoleSet {
    pub org: ChainMap,
    pub mch: ChainMap,
    pub def: ChainMap,
    pub ctrl: ChainMap,
}

impl RoleSet {
    /// The i-th control of a chain, or `None` when the chain is unknown or
    /// the index is out of range.
    pub fn get_ctrl_by_index(&self, chain: &str, index: usize) -> Option<&str> {
        self.ctrl
            .get(chain)
            .and_then(|ctrls| ctrls.get(index))
            .map(String::as_str)
    }

    /// The i-th MCH of a chain, if any.
    pub fn get_mch_by_index(&self, chain: &str, index: usize) -> Option<&str> {
        self.mch
            .get(chain)
            .and_then(|mchs| mchs.get(index))
            .map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(prefix: &str, n: usize) -> Vec<String> {
        (0..n).map(|i| format!("{}{}", prefix, i)).collect()
    }

    #[test]
    fn test_get_ctrl_by_index_is_total() {
        let mut roles = RoleSet::default();
        roles.ctrl.insert("ORG-lid.T.L", names("c", 5));
        assert_eq!(roles.get_ctrl_by_index("ORG-lid.T.L", 0), Some("c0"));
        assert_eq!(roles.get_ctrl_by_index("ORG-lid.T.L", 4), Some("c4"));
        assert_eq!(roles.get_ctrl_by_index("ORG-lid.T.L", 5), None);
        assert_eq!(roles.get_ctrl_by_index("ORG-lid.T.L", usize::MAX), None);
        assert_eq!(roles.get_ctrl_by_index("ORG-missing", 0), None);
    }

    #[test]
    fn test_chain_map_keeps_insertion_order() {
        let mut map = ChainMap::new();
        map.insert("b", names("b", 1));
        map.insert("a", names("a", 2));
        map.insert("b", names("x", 2));
        assert_eq!(map.chains().collect::<Vec<_>>(), vec!["b", "a"]);
        assert_eq!(map.get("b").unwrap(), &["x0".to_string(), "x1".to_string()]);
        assert_eq!(map.bones().count(), 4);
    }
}
