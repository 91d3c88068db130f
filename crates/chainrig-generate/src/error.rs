//! Error types for rig generation.

use chainrig_armature::{CodedError, GraphError};
use thiserror::Error;

/// Result type for rig generation.
pub type GenerateResult<T> = Result<T, GenerateError>;

/// Fatal metarig configuration problems. Raised during discovery, before the
/// graph is touched.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// An eyelid base bone does not have exactly two lid chains.
    #[error("exactly 2 disconnected chains must be parented to main bone '{bone}' (found {found})")]
    WrongChainCount { bone: String, found: usize },

    /// Lid chains differ in length.
    #[error("all lid chains of '{bone}' must be the same length ({first} vs {second})")]
    LidLengthMismatch {
        bone: String,
        first: usize,
        second: usize,
    },

    /// A sub-chain is not as long as its chain.
    #[error("subchains of chain starting with '{chain}' are not the same length; assign a rig type to the unconnected children, or make lengths match")]
    SubchainLengthMismatch { chain: String },

    /// A paired name has no side block.
    #[error("malformed paired name '{name}': expected <base>.<L|R>[.<rest>]")]
    MalformedPairedName { name: String },

    /// A bone the rig requires is absent.
    #[error("rig '{rig}' on '{bone}' requires {what}")]
    MissingBone {
        rig: String,
        bone: String,
        what: String,
    },

    /// The connected chain is too short for the rig.
    #[error("rig '{rig}' on '{bone}' needs a chain of at least {expected} connected bones, found {found}")]
    ShortChain {
        rig: String,
        bone: String,
        expected: usize,
        found: usize,
    },

    /// No generator is registered for a rig type.
    #[error("unknown rig type '{rig_type}' on bone '{bone}'")]
    UnknownRigType { bone: String, rig_type: String },

    /// Rig parameters failed to deserialize or validate.
    #[error("invalid parameters for rig '{rig}' on '{bone}': {message}")]
    InvalidParams {
        rig: String,
        bone: String,
        message: String,
    },

    /// A constraint recipe string is malformed.
    #[error("invalid constraint recipe '{recipe}': {message}")]
    InvalidRecipe { recipe: String, message: String },
}

impl ConfigError {
    pub fn missing_bone(rig: &str, bone: &str, what: impl Into<String>) -> Self {
        Self::MissingBone {
            rig: rig.to_string(),
            bone: bone.to_string(),
            what: what.into(),
        }
    }

    pub fn invalid_params(rig: &str, bone: &str, message: impl Into<String>) -> Self {
        Self::InvalidParams {
            rig: rig.to_string(),
            bone: bone.to_string(),
            message: message.into(),
        }
    }

    pub fn invalid_recipe(recipe: &str, message: impl Into<String>) -> Self {
        Self::InvalidRecipe {
            recipe: recipe.to_string(),
            message: message.into(),
        }
    }
}

impl CodedError for ConfigError {
    fn code(&self) -> &'static str {
        match self {
            ConfigError::WrongChainCount { .. } => "RIG_001",
            ConfigError::LidLengthMismatch { .. } => "RIG_002",
            ConfigError::SubchainLengthMismatch { .. } => "RIG_003",
            ConfigError::MalformedPairedName { .. } => "RIG_004",
            ConfigError::MissingBone { .. } => "RIG_005",
            ConfigError::ShortChain { .. } => "RIG_006",
            ConfigError::UnknownRigType { .. } => "RIG_007",
            ConfigError::InvalidParams { .. } => "RIG_008",
            ConfigError::InvalidRecipe { .. } => "RIG_009",
        }
    }

    fn category(&self) -> &'static str {
        "config"
    }
}

/// Any failure while generating a rig.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GenerateError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Graph(#[from] GraphError),
}

impl GenerateError {
    /// True for metarig configuration errors.
    pub fn is_config(&self) -> bool {
        matches!(self, GenerateError::Config(_))
    }
}

impl CodedError for GenerateError {
    fn code(&self) -> &'static str {
        match self {
            GenerateError::Config(e) => e.code(),
            GenerateError::Graph(e) => e.code(),
        }
    }

    fn category(&self) -> &'static str {
        match self {
            GenerateError::Config(e) => e.category(),
            GenerateError::Graph(e) => e.category(),
        }
    }
}
