//! Error types for plugins and the plugin registry.

use crate::registry::PluginKind;
use fenrir_types::ContextError;
use thiserror::Error;

/// Result type for plugin operations.
pub type PluginResult<T> = Result<T, PluginError>;

#[derive(Debug, Error)]
pub enum PluginError {
    #[error("no {kind} plugin registered as '{name}'")]
    NotFound { kind: PluginKind, name: String },

    #[error("{kind} plugin '{name}' is already registered")]
    AlreadyRegistered { kind: PluginKind, name: String },

    #[error("invalid builder spec: {0}")]
    InvalidSpec(String),

    #[error("configuration error: {0}")]
    Config(String),

    /// A hook refused the operation.
    #[error("rejected: {0}")]
    Rejected(String),

    #[error(transparent)]
    Context(#[from] ContextError),

    #[error(transparent)]
    Type(#[from] fenrir_types::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
