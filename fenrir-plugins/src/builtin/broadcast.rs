use crate::{Notifier, PluginConfig, PluginResult};
use async_trait::async_trait;
use fenrir_types::Notification;
use tokio::sync::broadcast;

const DEFAULT_CAPACITY: usize = 1024;

/// Fans notifications out to in-process subscribers.
///
/// Notifications sent while nobody is subscribed are dropped, and slow
/// subscribers see `Lagged` rather than blocking the engine.
#[derive(Debug)]
pub struct BroadcastNotifier<T> {
    sender: broadcast::Sender<T>,
}

impl<T: Notification> BroadcastNotifier<T> {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Reads `broadcast-capacity`.
    pub fn from_config(cfg: &PluginConfig) -> PluginResult<Self> {
        Ok(Self::new(cfg.get_or("broadcast-capacity", DEFAULT_CAPACITY)?))
    }

    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

#[async_trait]
impl<T: Notification> Notifier<T> for BroadcastNotifier<T> {
    async fn notify(&self, notification: T) -> PluginResult<()> {
        // No receivers is not a failure.
        let _ = self.sender.send(notification);
        Ok(())
    }

    fn subscribe(&self) -> Option<broadcast::Receiver<T>> {
        Some(self.sender.subscribe())
    }
}
