use clap::{Arg, ArgAction, Command};
use fenrir_plugins::builtin::memory_config_binder;
use fenrir_plugins::{PluginConfig, PluginError};
use std::time::Duration;

#[test]
fn typed_getters() {
    let cfg = PluginConfig::new()
        .with("addr", "localhost:6379")
        .with("pool", 8)
        .with("ttl", "1m30s");

    assert_eq!(cfg.get_str("addr"), Some("localhost:6379"));
    assert_eq!(cfg.get::<u32>("pool").unwrap(), Some(8));
    assert_eq!(cfg.get::<u32>("absent").unwrap(), None);
    assert_eq!(cfg.get_or("absent", 3u32).unwrap(), 3);
    assert_eq!(cfg.get_duration("ttl").unwrap(), Some(Duration::from_secs(90)));
}

#[test]
fn wrong_shape_is_a_config_error() {
    let cfg = PluginConfig::new().with("pool", "many").with("ttl", 5);
    assert!(matches!(cfg.get::<u32>("pool"), Err(PluginError::Config(_))));
    assert!(matches!(cfg.get_duration("ttl"), Err(PluginError::Config(_))));
}

#[test]
fn merge_overlays() {
    let mut base = PluginConfig::new().with("a", 1).with("b", 2);
    base.merge(PluginConfig::new().with("b", 3));
    assert_eq!(base.get::<i64>("a").unwrap(), Some(1));
    assert_eq!(base.get::<i64>("b").unwrap(), Some(3));
}

#[test]
fn deserializes_from_toml_table() {
    let cfg: PluginConfig = toml::from_str(
        r#"
        memory-max-entries = 10
        redis-addr = "localhost"
        "#,
    )
    .unwrap();
    assert_eq!(cfg.get::<usize>("memory-max-entries").unwrap(), Some(10));
    assert_eq!(cfg.get_str("redis-addr"), Some("localhost"));
}

// ── Command-line overlay ─────────────────────────────────────────

fn command() -> Command {
    memory_config_binder(Command::new("fenrir"))
        .unwrap()
        .arg(Arg::new("endpoint").long("endpoint").default_value("local"))
        .arg(Arg::new("retries").long("retries"))
        .arg(Arg::new("dry-run").long("dry-run").action(ArgAction::SetTrue))
}

#[test]
fn merge_matches_lifts_explicit_flags() {
    let matches = command()
        .try_get_matches_from(["fenrir", "--memory-max-entries", "100", "--retries", "3", "--dry-run"])
        .unwrap();
    let mut cfg = PluginConfig::new();
    cfg.merge_matches(&matches);

    assert_eq!(cfg.get::<usize>("memory-max-entries").unwrap(), Some(100));
    assert_eq!(cfg.get::<u32>("retries").unwrap(), Some(3));
    assert_eq!(cfg.get::<bool>("dry-run").unwrap(), Some(true));
}

#[test]
fn merge_matches_skips_defaults() {
    let matches = command().try_get_matches_from(["fenrir"]).unwrap();
    let mut cfg = PluginConfig::new().with("endpoint", "from-file");
    cfg.merge_matches(&matches);

    assert_eq!(cfg.get_str("endpoint"), Some("from-file"));
    assert!(!cfg.contains("dry-run"));
    assert!(!cfg.contains("memory-max-entries"));
}
