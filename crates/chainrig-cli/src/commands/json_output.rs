//! JSON output types for the `--json` flag.
//!
//! Errors carry a stable code: `CLI_xxx` for CLI-level failures, otherwise the
//! code of the underlying metarig, graph or rig configuration error.

use chainrig_armature::CodedError;
use chainrig_generate::{ChainSet, GenerationReport, StageBinding};
use serde::Serialize;

/// CLI-level error codes.
pub mod error_codes {
    /// Output file could not be written.
    pub const FILE_WRITE: &str = "CLI_001";
    /// JSON serialization error.
    pub const JSON_SERIALIZE: &str = "CLI_002";
}

/// A structured error in JSON output.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct JsonError {
    pub code: String,
    pub message: String,
    /// Error family: `metarig`, `graph`, `config` or `cli`.
    pub category: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
}

impl JsonError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            category: "cli".to_string(),
            file: None,
        }
    }

    pub fn with_file(mut self, file: impl Into<String>) -> Self {
        self.file = Some(file.into());
        self
    }
}

/// Converts any coded error from the library crates.
pub fn coded_error_to_json(err: &dyn CodedError) -> JsonError {
    JsonError {
        code: err.code().to_string(),
        message: err.message(),
        category: err.category().to_string(),
        file: None,
    }
}

/// One rig as seen by discovery.
#[derive(Debug, Clone, Serialize)]
pub struct DiscoveredRig {
    pub base: String,
    pub rig_type: String,
    pub stages: Vec<StageBinding>,
    pub chains: ChainSet,
}

/// JSON output for the `validate` command.
#[derive(Debug, Clone, Serialize)]
pub struct ValidateOutput {
    pub success: bool,
    pub errors: Vec<JsonError>,
    pub rigs: Vec<DiscoveredRig>,
}

impl ValidateOutput {
    pub fn success(rigs: Vec<DiscoveredRig>) -> Self {
        Self {
            success: true,
            errors: Vec::new(),
            rigs,
        }
    }

    pub fn failure(errors: Vec<JsonError>) -> Self {
        Self {
            success: false,
            errors,
            rigs: Vec::new(),
        }
    }
}

/// JSON output for the `generate` command.
#[derive(Debug, Clone, Serialize)]
pub struct GenerateOutput {
    pub success: bool,
    pub errors: Vec<JsonError>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<GenerationReport>,
    /// Where the generated armature was written, if anywhere.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub out: Option<String>,
}

impl GenerateOutput {
    pub fn success(report: GenerationReport, out: Option<String>) -> Self {
        Self {
            success: true,
            errors: Vec::new(),
            report: Some(report),
            out,
        }
    }

    pub fn failure(errors: Vec<JsonError>) -> Self {
        Self {
            success: false,
            errors,
            report: None,
            out: None,
        }
    }
}

/// Prints a JSON value to stdout.
pub(crate) fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
