//! Custom properties and the drivers that read them.

use serde::{Deserialize, Serialize};

use crate::constraint::ConstraintHandle;

/// Value kind of a custom property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyKind {
    #[default]
    Float,
    /// Boolean stored as 0.0 / 1.0.
    Toggle,
}

/// A scalar custom property registered on a pose bone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CustomProperty {
    pub name: String,
    #[serde(default)]
    pub kind: PropertyKind,
    pub value: f64,
    pub min: f64,
    pub max: f64,
    pub soft_min: f64,
    pub soft_max: f64,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
}

impl CustomProperty {
    /// Creates a float property; soft limits follow the hard range.
    pub fn float(name: impl Into<String>, value: f64, min: f64, max: f64) -> Self {
        Self {
            name: name.into(),
            kind: PropertyKind::Float,
            value: value.clamp(min, max),
            min,
            max,
            soft_min: min,
            soft_max: max,
            description: String::new(),
        }
    }

    /// Creates a boolean toggle property.
    pub fn toggle(name: impl Into<String>, on: bool) -> Self {
        Self {
            kind: PropertyKind::Toggle,
            ..Self::float(name, if on { 1.0 } else { 0.0 }, 0.0, 1.0)
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Clamps a candidate value into the property's hard range.
    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.min, self.max)
    }

    pub fn is_on(&self) -> bool {
        self.value > 0.5
    }
}

/// Reference to a custom property on a bone.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PropertyRef {
    pub bone: String,
    pub name: String,
}

impl PropertyRef {
    pub fn new(bone: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            bone: bone.into(),
            name: name.into(),
        }
    }
}

/// Pose attribute a driver writes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "target", rename_all = "snake_case")]
pub enum DriverTarget {
    ConstraintInfluence { constraint: ConstraintHandle },
    ConstraintMute { constraint: ConstraintHandle },
    BoneHide { bone: String },
    BBoneEaseIn { bone: String },
    BBoneEaseOut { bone: String },
}

impl DriverTarget {
    /// Bone that owns the driven attribute.
    pub fn bone(&self) -> &str {
        match self {
            DriverTarget::ConstraintInfluence { constraint }
            | DriverTarget::ConstraintMute { constraint } => &constraint.bone,
            DriverTarget::BoneHide { bone }
            | DriverTarget::BBoneEaseIn { bone }
            | DriverTarget::BBoneEaseOut { bone } => bone,
        }
    }
}

/// Named formula mapping the source property value onto the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DriverFormula {
    /// `var`
    #[default]
    Direct,
    /// `1 - var`
    Complement,
}

impl DriverFormula {
    pub fn apply(&self, value: f64) -> f64 {
        match self {
            DriverFormula::Direct => value,
            DriverFormula::Complement => 1.0 - value,
        }
    }

    /// Expression string in the host's driver syntax.
    pub fn expression(&self) -> &'static str {
        match self {
            DriverFormula::Direct => "var",
            DriverFormula::Complement => "1 - var",
        }
    }
}

/// A driver binding a property to a pose attribute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Driver {
    #[serde(flatten)]
    pub target: DriverTarget,
    pub source: PropertyRef,
    #[serde(default)]
    pub formula: DriverFormula,
}

impl Driver {
    /// Evaluates the driver for a property value.
    ///
    /// The value is clamped into the property's range before the formula runs.
    pub fn evaluate(&self, property: &CustomProperty, value: f64) -> f64 {
        self.formula.apply(property.clamp(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn switch() -> CustomProperty {
        CustomProperty::float("IK/FK", 0.0, 0.0, 1.0)
    }

    fn handle() -> ConstraintHandle {
        ConstraintHandle {
            bone: "ORG-thigh.L".into(),
            id: 1,
        }
    }

    #[test]
    fn test_float_clamps_initial_value() {
        let p = CustomProperty::float("rubber_tweak", 3.0, 0.0, 2.0);
        assert_eq!(p.value, 2.0);
        assert_eq!(p.soft_max, 2.0);
    }

    #[test]
    fn test_toggle() {
        let p = CustomProperty::toggle("IK_follow", true);
        assert!(p.is_on());
        assert_eq!(p.kind, PropertyKind::Toggle);
        assert!(!CustomProperty::toggle("pole_vector", false).is_on());
    }

    #[test]
    fn test_driver_evaluation_clamps() {
        let driver = Driver {
            target: DriverTarget::ConstraintInfluence {
                constraint: handle(),
            },
            source: PropertyRef::new("thigh_parent.L", "IK/FK"),
            formula: DriverFormula::Complement,
        };
        assert_eq!(driver.evaluate(&switch(), 0.25), 0.75);
        assert_eq!(driver.evaluate(&switch(), 1.5), 0.0);
        assert_eq!(driver.evaluate(&switch(), -2.0), 1.0);
    }

    #[test]
    fn test_driver_target_bone() {
        let t = DriverTarget::ConstraintMute {
            constraint: handle(),
        };
        assert_eq!(t.bone(), "ORG-thigh.L");
        assert_eq!(DriverFormula::Complement.expression(), "1 - var");
    }
}
