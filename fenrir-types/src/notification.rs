//! Engine events offered to notifier plugins.
//!
//! Collect and write events are separate types so a notifier built for one
//! kind can never be handed the other.

use crate::{FeatureValue, Value};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Which stream a notification belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Collect,
    Write,
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Collect => f.write_str("collect"),
            Self::Write => f.write_str("write"),
        }
    }
}

/// Common surface of every notification type.
pub trait Notification: Clone + fmt::Debug + Send + Sync + 'static {
    const KIND: NotificationKind;

    fn fqn(&self) -> &str;
    fn entity_id(&self) -> &str;
    fn timestamp(&self) -> DateTime<Utc>;
}

/// A feature value was found absent or not fresh and should be recollected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectNotification {
    pub fqn: String,
    pub entity_id: String,
    /// The value currently held, if any.
    pub value: Option<FeatureValue>,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latency: Option<Duration>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CollectNotification {
    pub fn new(fqn: impl Into<String>, entity_id: impl Into<String>, value: Option<FeatureValue>) -> Self {
        Self {
            fqn: fqn.into(),
            entity_id: entity_id.into(),
            value,
            timestamp: Utc::now(),
            latency: None,
            error: None,
        }
    }
}

impl Notification for CollectNotification {
    const KIND: NotificationKind = NotificationKind::Collect;

    fn fqn(&self) -> &str {
        &self.fqn
    }

    fn entity_id(&self) -> &str {
        &self.entity_id
    }

    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

/// The value-mutating operation that produced a write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WriteOperation {
    Set,
    Append,
    Incr,
    Update,
}

impl fmt::Display for WriteOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Set => "set",
            Self::Append => "append",
            Self::Incr => "incr",
            Self::Update => "update",
        })
    }
}

/// A value was written to the state backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WriteNotification {
    pub fqn: String,
    pub entity_id: String,
    /// The operand of the write: the new value for set/update, the appended
    /// item for append, the delta for incr.
    pub value: Value,
    pub timestamp: DateTime<Utc>,
    pub operation: WriteOperation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latency: Option<Duration>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Notification for WriteNotification {
    const KIND: NotificationKind = NotificationKind::Write;

    fn fqn(&self) -> &str {
        &self.fqn
    }

    fn entity_id(&self) -> &str {
        &self.entity_id
    }

    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

/// A write handed to the historical writer for cold storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalRecord {
    pub fqn: String,
    pub entity_id: String,
    pub value: Value,
    pub timestamp: DateTime<Utc>,
    pub operation: WriteOperation,
}

impl From<&WriteNotification> for HistoricalRecord {
    fn from(n: &WriteNotification) -> Self {
        Self {
            fqn: n.fqn.clone(),
            entity_id: n.entity_id.clone(),
            value: n.value.clone(),
            timestamp: n.timestamp,
            operation: n.operation,
        }
    }
}
