#![deny(missing_docs)]

//! # CLI Errors
//!
//! Error types for the CLI crate.

use clientgen_core::AppError;
use derive_more::{Display, From};
use serde_json::Value;

/// Main error enum for CLI operations.
#[derive(Debug, Display, From)]
pub enum CliError {
    /// Failure raised by the resolution core.
    #[display("{_0}")]
    Core(AppError),

    /// IO Error wrapper.
    #[display("IO Error: {_0}")]
    Io(std::io::Error),

    /// The manifest could not be encoded as JSON.
    #[display("Failed to encode manifest as JSON: {_0}")]
    Json(serde_json::Error),

    /// The manifest could not be encoded as YAML.
    #[display("Failed to encode manifest as YAML: {_0}")]
    Yaml(serde_yaml::Error),
}

impl CliError {
    /// Raw document fragment behind the failure, when the core recorded one.
    pub fn fragment(&self) -> Option<&Value> {
        match self {
            CliError::Core(err) => err.fragment(),
            _ => None,
        }
    }
}

impl std::error::Error for CliError {}

/// Result type alias.
pub type CliResult<T> = Result<T, CliError>;
