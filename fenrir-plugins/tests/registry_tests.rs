//! Registration and lookup across plugin kinds.

use clap::{Arg, Command};
use fenrir_plugins::builtin::{self, MemoryState};
use fenrir_plugins::{PluginConfig, PluginError, PluginKind, Plugins, State};
use std::sync::Arc;

fn memory_factory(_cfg: &PluginConfig) -> fenrir_plugins::PluginResult<Arc<dyn State>> {
    Ok(Arc::new(MemoryState::new()))
}

// ── Register / get ───────────────────────────────────────────────

#[test]
fn lookup_of_unregistered_name_is_not_found() {
    let plugins = Plugins::new();
    let err = plugins.new_state("redis", &PluginConfig::new()).err().unwrap();
    match err {
        PluginError::NotFound { kind, name } => {
            assert_eq!(kind, PluginKind::State);
            assert_eq!(name, "redis");
        }
        other => panic!("expected NotFound, got {other:?}"),
    }
}

#[test]
fn not_found_message_names_kind_and_plugin() {
    let plugins = Plugins::new();
    let err = plugins.feature_appliers.get("expression").err().unwrap();
    assert_eq!(err.to_string(), "no feature applier plugin registered as 'expression'");
}

#[test]
fn duplicate_registration_is_rejected() {
    let plugins = Plugins::new();
    plugins.register_state("mem", memory_factory).unwrap();
    let err = plugins.register_state("mem", memory_factory).unwrap_err();
    assert!(matches!(
        err,
        PluginError::AlreadyRegistered { kind: PluginKind::State, .. }
    ));
    assert_eq!(plugins.states.names(), vec!["mem".to_string()]);
}

#[test]
fn kinds_are_independent_namespaces() {
    let plugins = Plugins::new();
    plugins.register_state("x", memory_factory).unwrap();
    assert!(plugins.states.contains("x"));
    assert!(!plugins.historical_writers.contains("x"));
    assert!(!plugins.collect_notifiers.contains("x"));
}

#[test]
fn builtins_are_registered() {
    let plugins = Plugins::with_builtins().unwrap();
    assert!(plugins.states.contains(builtin::MEMORY));
    assert!(plugins.collect_notifiers.contains(builtin::BROADCAST));
    assert!(plugins.write_notifiers.contains(builtin::BROADCAST));
    assert!(plugins.feature_appliers.contains(builtin::HEADLESS));
    assert!(plugins.config_binders.contains(builtin::MEMORY));
}

#[test]
fn builtins_cannot_be_registered_twice() {
    let plugins = Plugins::with_builtins().unwrap();
    assert!(builtin::register(&plugins).is_err());
}

#[test]
fn concurrent_registration_of_distinct_names() {
    let plugins = Arc::new(Plugins::new());
    let handles: Vec<_> = (0..16)
        .map(|i| {
            let plugins = Arc::clone(&plugins);
            std::thread::spawn(move || plugins.register_state(format!("s{i}"), memory_factory))
        })
        .collect();
    for h in handles {
        h.join().unwrap().unwrap();
    }
    assert_eq!(plugins.states.names().len(), 16);
}

// ── Config binders ───────────────────────────────────────────────

#[test]
fn bind_config_folds_every_binder() {
    let plugins = Plugins::new();
    plugins
        .register_config_binder("a", |cmd: Command| Ok(cmd.arg(Arg::new("alpha").long("alpha"))))
        .unwrap();
    plugins
        .register_config_binder("b", |cmd: Command| Ok(cmd.arg(Arg::new("beta").long("beta"))))
        .unwrap();

    let cmd = plugins.bind_config(Command::new("fenrir")).unwrap();
    let matches = cmd
        .try_get_matches_from(["fenrir", "--alpha", "1", "--beta", "two"])
        .unwrap();
    assert_eq!(matches.get_one::<String>("alpha").map(String::as_str), Some("1"));
    assert_eq!(matches.get_one::<String>("beta").map(String::as_str), Some("two"));
}

#[test]
fn failing_binder_aborts_binding() {
    let plugins = Plugins::new();
    plugins
        .register_config_binder("broken", |_cmd: Command| {
            Err(PluginError::Config("cannot bind".into()))
        })
        .unwrap();
    assert!(plugins.bind_config(Command::new("fenrir")).is_err());
}
