//! Error types for rule actions

use thiserror::Error;

use crate::domain::{
    batch::errors::SendBatchError, contacts::errors::DirectoryError, rules::RuleActionId,
};

/// Errors validating a stored rule action configuration map
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// The stored map was written by an unknown format version
    #[error("Unsupported rule action configuration version: {0}")]
    UnsupportedVersion(String),

    /// A required field is absent or empty
    #[error("Missing rule action configuration field: {0}")]
    MissingField(&'static str),

    /// A field is present but does not parse
    #[error("Malformed rule action configuration field {field}: {value}")]
    MalformedField {
        /// The offending field
        field: &'static str,

        /// The stored value that did not parse
        value: String,
    },
}

/// Errors loading or saving a rule action configuration
#[derive(Debug, Error)]
pub enum RuleStoreError {
    /// No configuration is stored under the given id
    #[error("Could not find rule action with ID: {0}")]
    RuleActionNotFound(RuleActionId),

    /// Unknown error
    #[error("Unknown error: {0}")]
    UnknownError(#[from] anyhow::Error),
}

/// Errors executing a rule action
#[derive(Debug, Error)]
pub enum ExecuteRuleError {
    /// The stored configuration failed validation
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The configuration could not be loaded or saved
    #[error(transparent)]
    Store(#[from] RuleStoreError),

    /// Related contacts could not be resolved
    #[error(transparent)]
    Directory(#[from] DirectoryError),

    /// The delegated batch send failed
    #[error(transparent)]
    Send(#[from] SendBatchError),
}
