//! Bone groups: named color themes applied to pose bones.

use serde::{Deserialize, Serialize};

/// Host color theme identifier (`THEME01` .. `THEME20`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ColorTheme(u8);

impl ColorTheme {
    /// Red-ish theme used for IK controls.
    pub const IK: ColorTheme = ColorTheme(1);
    /// Green-ish theme used for FK controls.
    pub const FK: ColorTheme = ColorTheme(4);
    /// Pale theme used for tweak controls.
    pub const TWEAKS: ColorTheme = ColorTheme(8);

    /// Creates a theme by index; valid indices are 1..=20.
    pub fn new(index: u8) -> Option<Self> {
        (1..=20).contains(&index).then_some(Self(index))
    }

    pub fn index(&self) -> u8 {
        self.0
    }
}

impl std::fmt::Display for ColorTheme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "THEME{:02}", self.0)
    }
}

impl From<ColorTheme> for String {
    fn from(theme: ColorTheme) -> Self {
        theme.to_string()
    }
}

impl TryFrom<String> for ColorTheme {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value
            .strip_prefix("THEME")
            .and_then(|n| n.parse::<u8>().ok())
            .and_then(ColorTheme::new)
            .ok_or_else(|| format!("invalid color theme '{}'", value))
    }
}

/// A named bone group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BoneGroup {
    pub name: String,
    pub theme: ColorTheme,
}

impl BoneGroup {
    pub fn new(name: impl Into<String>, theme: ColorTheme) -> Self {
        Self {
            name: name.into(),
            theme,
        }
    }

    /// Standard limb presets.
    pub fn tweaks() -> Self {
        Self::new("Tweaks", ColorTheme::TWEAKS)
    }

    pub fn ik() -> Self {
        Self::new("IK", ColorTheme::IK)
    }

    pub fn fk() -> Self {
        Self::new("FK", ColorTheme::FK)
    }
}
