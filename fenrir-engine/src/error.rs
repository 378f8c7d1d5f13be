//! Error types for the engine.

use fenrir_plugins::PluginError;
use fenrir_types::{ContextError, PrimitiveType, WriteOperation};
use thiserror::Error;

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Errors surfaced to engine callers.
///
/// Existence and validation failures are distinct variants so callers can
/// branch with `matches!` instead of inspecting messages.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("feature already exists: {0}")]
    AlreadyExists(String),

    #[error("feature not found: {0}")]
    NotFound(String),

    #[error("data source not found: {0}")]
    DataSourceNotFound(String),

    #[error("no feature builder found for kind '{kind}' (feature {fqn})")]
    BuilderNotFound { fqn: String, kind: String },

    #[error("invalid descriptor: {0}")]
    InvalidDescriptor(String),

    #[error("type mismatch on {fqn}: expected {expected}, found {found}")]
    TypeMismatch {
        fqn: String,
        expected: PrimitiveType,
        found: PrimitiveType,
    },

    /// The value cannot be used with this feature for reasons other than
    /// its type (a map, a missing value, `incr` on a string feature).
    #[error("invalid value for {fqn}: {reason}")]
    InvalidValue { fqn: String, reason: String },

    /// The feature's builder rejected its spec.
    #[error("builder '{kind}' failed for {fqn}: {source}")]
    Builder {
        fqn: String,
        kind: String,
        #[source]
        source: PluginError,
    },

    /// A hook attached by the feature's builder failed.
    #[error("hook failed on {fqn}: {source}")]
    Hook {
        fqn: String,
        #[source]
        source: PluginError,
    },

    /// The state backend failed. Passed through untouched.
    #[error("{op} on {fqn} failed: {source}")]
    Backend {
        fqn: String,
        op: Operation,
        #[source]
        source: PluginError,
    },

    #[error(transparent)]
    Context(#[from] ContextError),

    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Plugin(#[from] PluginError),
}

/// Backend operation named in [`EngineError::Backend`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Get,
    Write(WriteOperation),
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Get => f.write_str("get"),
            Self::Write(op) => op.fmt(f),
        }
    }
}

impl EngineError {
    /// Lifts a type-system error raised while checking a value for `fqn`.
    pub(crate) fn from_type(fqn: &str, err: fenrir_types::Error) -> Self {
        match err {
            fenrir_types::Error::TypeMismatch { expected, found } => Self::TypeMismatch {
                fqn: fqn.to_string(),
                expected,
                found,
            },
            other => Self::InvalidValue {
                fqn: fqn.to_string(),
                reason: other.to_string(),
            },
        }
    }
}

impl From<EngineError> for PluginError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::Plugin(inner) => inner,
            EngineError::Context(inner) => PluginError::Context(inner),
            other => PluginError::Other(anyhow::Error::new(other)),
        }
    }
}
