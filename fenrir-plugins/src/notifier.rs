//! Notifier and historical-writer contracts.
//!
//! `Notifier` is generic over the notification type, so a sink built for
//! collect events cannot be handed write events.

use crate::PluginResult;
use async_trait::async_trait;
use fenrir_types::{Context, HistoricalRecord, Notification};
use tokio::sync::broadcast;

/// A sink for one kind of engine notification.
#[async_trait]
pub trait Notifier<T: Notification>: Send + Sync {
    /// Offers a notification. Delivery is at most once; a notifier that
    /// needs durability implements it itself.
    async fn notify(&self, notification: T) -> PluginResult<()>;

    /// In-process subscription, for notifiers that support one.
    fn subscribe(&self) -> Option<broadcast::Receiver<T>> {
        None
    }
}

/// Cold-storage sink for written values.
#[async_trait]
pub trait HistoricalWriter: Send + Sync {
    async fn commit(&self, ctx: &Context, record: HistoricalRecord) -> PluginResult<()>;

    async fn flush(&self, _ctx: &Context) -> PluginResult<()> {
        Ok(())
    }
}
