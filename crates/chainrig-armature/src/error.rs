//! Error types for bone graph operations.

use thiserror::Error;

/// Result type for bone graph operations.
pub type GraphResult<T> = Result<T, GraphError>;

/// Common interface for reportable errors across the chainrig crates.
///
/// Codes are stable strings like `"GRAPH_001"` or `"RIG_004"` and can be used
/// for programmatic error handling.
pub trait CodedError: std::error::Error {
    /// Stable error code for reporting.
    fn code(&self) -> &'static str;

    /// Human-readable message.
    fn message(&self) -> String {
        self.to_string()
    }

    /// Error category for grouping related errors.
    fn category(&self) -> &'static str;
}

/// Violations of the bone graph contract.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GraphError {
    /// A bone name did not resolve.
    #[error("unknown bone '{name}'")]
    UnknownBone { name: String },

    /// A bone with that exact name already exists.
    #[error("bone '{name}' already exists")]
    DuplicateBone { name: String },

    /// Structural edit attempted after the pose phase began.
    #[error("cannot {operation} '{bone}': structural edits are closed once constraints exist")]
    StructureLocked { operation: String, bone: String },

    /// Parenting would create a cycle.
    #[error("parenting '{bone}' to '{parent}' would create a cycle")]
    ParentCycle { bone: String, parent: String },

    /// A constraint handle no longer resolves.
    #[error("unknown constraint {id} on bone '{bone}'")]
    UnknownConstraint { bone: String, id: u64 },

    /// A custom property did not resolve.
    #[error("unknown property '{property}' on bone '{bone}'")]
    UnknownProperty { bone: String, property: String },

    /// A length or vector argument was degenerate.
    #[error("invalid geometry for '{bone}': {message}")]
    InvalidGeometry { bone: String, message: String },
}

impl GraphError {
    pub fn unknown_bone(name: impl Into<String>) -> Self {
        Self::UnknownBone { name: name.into() }
    }

    pub fn structure_locked(operation: impl Into<String>, bone: impl Into<String>) -> Self {
        Self::StructureLocked {
            operation: operation.into(),
            bone: bone.into(),
        }
    }

    pub fn unknown_property(bone: impl Into<String>, property: impl Into<String>) -> Self {
        Self::UnknownProperty {
            bone: bone.into(),
            property: property.into(),
        }
    }

    pub fn invalid_geometry(bone: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidGeometry {
            bone: bone.into(),
            message: message.into(),
        }
    }
}

impl CodedError for GraphError {
    fn code(&self) -> &'static str {
        match self {
            GraphError::UnknownBone { .. } => "GRAPH_001",
            GraphError::DuplicateBone { .. } => "GRAPH_002",
            GraphError::StructureLocked { .. } => "GRAPH_003",
            GraphError::ParentCycle { .. } => "GRAPH_004",
            GraphError::UnknownConstraint { .. } => "GRAPH_005",
            GraphError::UnknownProperty { .. } => "GRAPH_006",
            GraphError::InvalidGeometry { .. } => "GRAPH_007",
        }
    }

    fn category(&self) -> &'static str {
        "graph"
    }
}

/// Result type for metarig loading.
pub type MetarigResult<T> = Result<T, MetarigError>;

/// Errors raised while loading a metarig document.
#[derive(Debug, Error)]
pub enum MetarigError {
    /// The document is not valid JSON or does not match the schema.
    #[error("failed to parse metarig: {0}")]
    Parse(#[from] serde_json::Error),

    /// A bone has an empty name.
    #[error("metarig bone #{index} has an empty name")]
    EmptyName { index: usize },

    /// Two bones share a name.
    #[error("duplicate metarig bone '{name}'")]
    DuplicateBone { name: String },

    /// A parent does not exist or is listed after its child.
    #[error("bone '{bone}' references parent '{parent}' which is not defined before it")]
    UnknownParent { bone: String, parent: String },

    /// A bone is marked connected but has no parent.
    #[error("bone '{bone}' is connected but has no parent")]
    ConnectedWithoutParent { bone: String },

    /// Head and tail coincide.
    #[error("bone '{bone}' has zero length")]
    ZeroLength { bone: String },

    /// Building the armature failed.
    #[error(transparent)]
    Graph(#[from] GraphError),
}

impl CodedError for MetarigError {
    fn code(&self) -> &'static str {
        match self {
            MetarigError::Parse(_) => "METARIG_001",
            MetarigError::EmptyName { .. } => "METARIG_002",
            MetarigError::DuplicateBone { .. } => "METARIG_003",
            MetarigError::UnknownParent { .. } => "METARIG_004",
            MetarigError::ConnectedWithoutParent { .. } => "METARIG_005",
            MetarigError::ZeroLength { .. } => "METARIG_006",
            MetarigError::Graph(e) => e.code(),
        }
    }

    fn category(&self) -> &'static str {
        "metarig"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_distinct() {
        let errors = [
            GraphError::unknown_bone("a"),
            GraphError::DuplicateBone { name: "a".into() },
            GraphError::structure_locked("reparent", "a"),
            GraphError::ParentCycle {
                bone: "a".into(),
                parent: "b".into(),
            },
            GraphError::UnknownConstraint {
                bone: "a".into(),
                id: 3,
            },
            GraphError::unknown_property("a", "IK/FK"),
            GraphError::invalid_geometry("a", "zero length"),
        ];
        let mut codes: Vec<_> = errors.iter().map(|e| e.code()).collect();
        codes.sort();
        codes.dedup();
        assert_eq!(codes.len(), errors.len());
    }

    #[test]
    fn test_display() {
        let err = GraphError::structure_locked("reparent", "MCH-lid.T.L");
        assert_eq!(
            err.to_string(),
            "cannot reparent 'MCH-lid.T.L': structural edits are closed once constraints exist"
        );
        assert_eq!(err.category(), "graph");
    }
}
