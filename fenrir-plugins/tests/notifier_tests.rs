use fenrir_plugins::builtin::{BROADCAST, BroadcastNotifier};
use fenrir_plugins::{Notifier, PluginConfig, Plugins};
use fenrir_types::{CollectNotification, Value, WriteNotification, WriteOperation};
use chrono::Utc;

fn write(fqn: &str) -> WriteNotification {
    WriteNotification {
        fqn: fqn.into(),
        entity_id: "e".into(),
        value: Value::Integer(1),
        timestamp: Utc::now(),
        operation: WriteOperation::Set,
        latency: None,
        error: None,
    }
}

#[tokio::test]
async fn subscribers_receive_notifications() {
    let notifier = BroadcastNotifier::<WriteNotification>::new(8);
    let mut rx = notifier.subscribe().unwrap();
    notifier.notify(write("a")).await.unwrap();
    notifier.notify(write("b")).await.unwrap();

    assert_eq!(rx.recv().await.unwrap().fqn, "a");
    assert_eq!(rx.recv().await.unwrap().fqn, "b");
}

#[tokio::test]
async fn notify_without_subscribers_succeeds() {
    let notifier = BroadcastNotifier::<CollectNotification>::new(8);
    assert_eq!(notifier.receiver_count(), 0);
    notifier
        .notify(CollectNotification::new("f", "e", None))
        .await
        .unwrap();
}

#[tokio::test]
async fn factories_build_kind_specific_notifiers() {
    let plugins = Plugins::with_builtins().unwrap();
    let cfg = PluginConfig::new().with("broadcast-capacity", 4);

    let collect = plugins.new_collect_notifier(BROADCAST, &cfg).unwrap();
    let mut rx = collect.subscribe().unwrap();
    collect
        .notify(CollectNotification::new("f", "e", None))
        .await
        .unwrap();
    assert_eq!(rx.recv().await.unwrap().entity_id, "e");

    let writes = plugins.new_write_notifier(BROADCAST, &cfg).unwrap();
    assert!(writes.subscribe().is_some());
}
