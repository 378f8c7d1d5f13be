use chrono::Utc;
use fenrir_plugins::{Hook, HookArgs, HookChain, PluginError, PluginResult};
use fenrir_types::Value;
use std::sync::{Arc, Mutex};

fn recorder(log: &Arc<Mutex<Vec<i32>>>, tag: i32) -> Hook {
    let log = Arc::clone(log);
    Arc::new(move |_args: &mut HookArgs| -> PluginResult<()> {
        log.lock().unwrap().push(tag);
        Ok(())
    })
}

#[test]
fn hooks_run_in_ascending_priority() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let mut chain = HookChain::new();
    chain.add(10, recorder(&log, 10));
    chain.add(-5, recorder(&log, -5));
    chain.add(0, recorder(&log, 0));

    chain.run(&mut HookArgs::new("f", "e", Utc::now())).unwrap();
    assert_eq!(*log.lock().unwrap(), vec![-5, 0, 10]);
}

#[test]
fn equal_priorities_keep_insertion_order() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let mut chain = HookChain::new();
    chain.add(1, recorder(&log, 1));
    chain.add(1, recorder(&log, 2));
    chain.add(1, recorder(&log, 3));

    chain.run(&mut HookArgs::new("f", "e", Utc::now())).unwrap();
    assert_eq!(*log.lock().unwrap(), vec![1, 2, 3]);
}

#[test]
fn hooks_can_rewrite_value() {
    let mut chain = HookChain::new();
    chain.add(
        0,
        Arc::new(|args: &mut HookArgs| -> PluginResult<()> {
            if let Some(Value::String(s)) = &mut args.value {
                *s = s.to_uppercase();
            }
            Ok(())
        }),
    );

    let mut args = HookArgs::new("f", "e", Utc::now());
    args.value = Some(Value::from("hi"));
    chain.run(&mut args).unwrap();
    assert_eq!(args.value, Some(Value::from("HI")));
}

#[test]
fn failing_hook_stops_the_chain() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let mut chain = HookChain::new();
    chain.add(
        0,
        Arc::new(|_: &mut HookArgs| -> PluginResult<()> { Err(PluginError::Rejected("no".into())) }),
    );
    chain.add(1, recorder(&log, 1));

    let err = chain.run(&mut HookArgs::new("f", "e", Utc::now())).unwrap_err();
    assert!(matches!(err, PluginError::Rejected(_)));
    assert!(log.lock().unwrap().is_empty());
    assert_eq!(chain.len(), 2);
}
