//! Structured bone names.
//!
//! Inside the engine a bone reference is a [`BoneName`]: role, base, side and
//! numeric uniquifier. Strings only appear at the graph boundary, in the host
//! convention `ORG-`/`MCH-`/`DEF-`/(none) + base + `.L`/`.R` + `.NNN`.

use std::fmt;

use serde::{Deserialize, Serialize};

pub const ORG_PREFIX: &str = "ORG-";
pub const MCH_PREFIX: &str = "MCH-";
pub const DEF_PREFIX: &str = "DEF-";

/// Role of a bone in the generated rig.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Original metarig bone.
    Org,
    /// Mechanism helper, never animated directly.
    Mch,
    /// Deformation bone.
    Def,
    /// Animator-facing control (no prefix).
    Ctrl,
}

impl Role {
    pub fn prefix(&self) -> &'static str {
        match self {
            Role::Org => ORG_PREFIX,
            Role::Mch => MCH_PREFIX,
            Role::Def => DEF_PREFIX,
            Role::Ctrl => "",
        }
    }
}

/// Body side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    L,
    R,
}

impl Side {
    pub fn flipped(&self) -> Side {
        match self {
            Side::L => Side::R,
            Side::R => Side::L,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Side::L => "L",
            Side::R => "R",
        }
    }

    fn parse(block: &str) -> Option<Side> {
        match block {
            "L" => Some(Side::L),
            "R" => Some(Side::R),
            _ => None,
        }
    }
}

/// A parsed bone name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BoneName {
    pub role: Role,
    pub base: String,
    pub side: Option<Side>,
    pub index: Option<u32>,
}

impl BoneName {
    pub fn new(role: Role, base: impl Into<String>, side: Option<Side>) -> Self {
        Self {
            role,
            base: base.into(),
            side,
            index: None,
        }
    }

    /// Parses a boundary string. Never fails; unknown shapes land in `base`.
    pub fn parse(name: &str) -> Self {
        let (role, rest) = if let Some(rest) = name.strip_prefix(ORG_PREFIX) {
            (Role::Org, rest)
        } else if let Some(rest) = name.strip_prefix(MCH_PREFIX) {
            (Role::Mch, rest)
        } else if let Some(rest) = name.strip_prefix(DEF_PREFIX) {
            (Role::Def, rest)
        } else {
            (Role::Ctrl, name)
        };

        let mut rest = rest;
        let mut index = None;
        if let Some((head, tail)) = rest.rsplit_once('.') {
            if is_uniquifier(tail) && !head.is_empty() {
                index = tail.parse().ok();
                rest = head;
            }
        }

        let mut side = None;
        if let Some((head, tail)) = rest.rsplit_once('.') {
            if let Some(s) = Side::parse(tail) {
                if !head.is_empty() {
                    side = Some(s);
                    rest = head;
                }
            }
        }

        Self {
            role,
            base: rest.to_string(),
            side,
            index,
        }
    }

    /// Same name in another role.
    pub fn with_role(&self, role: Role) -> Self {
        Self {
            role,
            ..self.clone()
        }
    }

    /// Appends `_qualifier` to the base, keeping side and index.
    pub fn qualified(&self, qualifier: &str) -> Self {
        Self {
            base: format!("{}_{}", self.base, qualifier),
            ..self.clone()
        }
    }

    /// Drops the numeric uniquifier.
    pub fn without_index(&self) -> Self {
        Self {
            index: None,
            ..self.clone()
        }
    }
}

impl fmt::Display for BoneName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.role.prefix(), self.base)?;
        if let Some(side) = self.side {
            write!(f, ".{}", side.as_str())?;
        }
        if let Some(index) = self.index {
            write!(f, ".{:03}", index)?;
        }
        Ok(())
    }
}

/// Returns the `ORG-` form of a name. Idempotent.
pub fn org(name: &str) -> String {
    BoneName::parse(name).with_role(Role::Org).to_string()
}

/// Returns the `MCH-` form of a name.
pub fn mch(name: &str) -> String {
    BoneName::parse(name).with_role(Role::Mch).to_string()
}

/// Returns the `DEF-` form of a name.
pub fn deform(name: &str) -> String {
    BoneName::parse(name).with_role(Role::Def).to_string()
}

/// Returns the control form (no prefix) of a name.
pub fn ctrl(name: &str) -> String {
    BoneName::parse(name).with_role(Role::Ctrl).to_string()
}

/// Builds `<role prefix><base>_<qualifier>.<side>` from any form of `name`.
pub fn qualified(name: &str, role: Role, qualifier: &str) -> String {
    BoneName::parse(name)
        .with_role(role)
        .qualified(qualifier)
        .to_string()
}

/// Result of flipping the side block of a paired name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MirrorName {
    /// The side block was `L` or `R`; this is the flipped name.
    Mirrored(String),
    /// The second block exists but is not a side.
    Unsided,
    /// The name has no second dot block.
    Malformed,
}

/// Flips the side at the second dot block of `base.SIDE.rest`.
pub fn mirror_name(name: &str) -> MirrorName {
    let mut blocks: Vec<&str> = name.split('.').collect();
    if blocks.len() < 2 {
        return MirrorName::Malformed;
    }
    match Side::parse(blocks[1]) {
        Some(side) => {
            blocks[1] = side.flipped().as_str();
            MirrorName::Mirrored(blocks.join("."))
        }
        None => MirrorName::Unsided,
    }
}

/// A uniquifier is exactly three digits. Longer digit blocks belong to the
/// base so that `a.0001` and `a.001` stay distinct names.
fn is_uniquifier(block: &str) -> bool {
    block.len() == 3 && block.bytes().all(|b| b.is_ascii_digit())
}

/// Splits a trailing `.NNN` uniquifier off a name.
pub fn split_index(name: &str) -> (&str, Option<u32>) {
    if let Some((head, tail)) = name.rsplit_once('.') {
        if is_uniquifier(tail) {
            if let Ok(n) = tail.parse() {
                return (head, Some(n));
            }
        }
    }
    (name, None)
}
