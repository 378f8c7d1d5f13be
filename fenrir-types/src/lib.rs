//! Core type definitions for the Fenrir feature engine.
//!
//! This crate defines the plugin-agnostic types every other crate depends on:
//! - [`PrimitiveType`]: the closed set of scalar and list value types
//! - [`Value`] and [`Dynamic`]: the typed value and the untyped boundary it is
//!   normalized from
//! - [`Fqn`] and [`AggrFn`]: fully-qualified feature names and aggregations
//! - [`FeatureDescriptor`], [`Metadata`], [`DataSource`], [`DataConnector`]:
//!   declarative inputs and their validated form
//! - [`CollectNotification`] and [`WriteNotification`]: engine events
//! - [`Context`]: cancellation and deadline propagation for backend calls
//!
//! Nothing here knows about storage backends or plugins.

mod context;
mod descriptor;
mod dynamic;
pub mod duration;
mod fqn;
mod notification;
mod primitive;
mod value;

pub use context::{Context, ContextError};
pub use descriptor::{BuilderSpec, DataConnector, DataSource, FeatureDescriptor, Metadata};
pub use dynamic::{Dynamic, detect_type, normalize};
pub use fqn::{AggrFn, Fqn};
pub use notification::{
    CollectNotification, HistoricalRecord, Notification, NotificationKind, WriteNotification,
    WriteOperation,
};
pub use primitive::PrimitiveType;
pub use value::{FeatureValue, Value};

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in type operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A function was called with an argument outside its contract,
    /// e.g. `scalar_string` on a list value.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch {
        expected: PrimitiveType,
        found: PrimitiveType,
    },

    /// The dynamic input has no primitive representation (maps, nested lists).
    #[error("unsupported value: {0}")]
    Unsupported(String),

    #[error("cannot parse {primitive} from {input:?}: {reason}")]
    Parse {
        primitive: PrimitiveType,
        input: String,
        reason: String,
    },

    #[error("invalid duration: {0}")]
    InvalidDuration(String),

    #[error("invalid FQN: {0}")]
    InvalidFqn(String),

    #[error("invalid descriptor: {0}")]
    InvalidDescriptor(String),
}
