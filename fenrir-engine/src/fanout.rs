//! Delivery of engine notifications to notifier plugins.
//!
//! Delivery is at most once. A failing notifier is logged and skipped; it
//! never fails the operation that produced the event.

use fenrir_plugins::{HistoricalWriter, Notifier};
use fenrir_types::{
    CollectNotification, Context, HistoricalRecord, Notification, WriteNotification,
};
use futures::future::join_all;
use std::sync::Arc;
use tracing::warn;

#[derive(Default, Clone)]
pub(crate) struct Fanout {
    pub(crate) collect: Vec<Arc<dyn Notifier<CollectNotification>>>,
    pub(crate) write: Vec<Arc<dyn Notifier<WriteNotification>>>,
    pub(crate) historical: Option<Arc<dyn HistoricalWriter>>,
}

impl Fanout {
    pub(crate) async fn collect(&self, notification: CollectNotification) {
        deliver(&self.collect, notification).await;
    }

    pub(crate) async fn write(&self, ctx: &Context, notification: WriteNotification) {
        let record = self
            .historical
            .as_ref()
            .map(|writer| (writer, HistoricalRecord::from(&notification)));
        let fqn = notification.fqn.clone();

        deliver(&self.write, notification).await;

        if let Some((writer, record)) = record {
            if let Err(e) = writer.commit(ctx, record).await {
                warn!(fqn = %fqn, error = %e, "historical write dropped");
            }
        }
    }
}

async fn deliver<T: Notification>(notifiers: &[Arc<dyn Notifier<T>>], notification: T) {
    if notifiers.is_empty() {
        return;
    }
    let results = join_all(notifiers.iter().map(|n| n.notify(notification.clone()))).await;
    for err in results.into_iter().filter_map(Result::err) {
        warn!(
            kind = %T::KIND,
            fqn = %notification.fqn(),
            entity_id = %notification.entity_id(),
            error = %err,
            "notification dropped"
        );
    }
}
