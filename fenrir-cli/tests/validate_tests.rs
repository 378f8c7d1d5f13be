use fenrir_cli::{DescriptorFile, command, describe_types, validate_files};
use fenrir_engine::{Engine, EngineConfig};
use fenrir_plugins::Plugins;
use pretty_assertions::assert_eq;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::{Builder, NamedTempFile, TempDir};

const FEATURES_TOML: &str = r#"
[[data_source]]
fqn = "web.events"
kind = "kafka"

[[feature]]
name = "hello_world"
primitive = "string"

[feature.builder]
kind = "headless"

[[feature]]
name = "clicks"
namespace = "web"
primitive = "int64"
freshness = "1m"
aggr = ["sum"]
data_source = "web.events"

[feature.builder]
kind = "headless"
"#;

fn engine() -> Engine {
    let plugins = Arc::new(Plugins::with_builtins().unwrap());
    Engine::from_config(plugins, &EngineConfig::default()).unwrap()
}

fn write_file(suffix: &str, contents: &str) -> NamedTempFile {
    let mut file = Builder::new().suffix(suffix).tempfile().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

// ── Descriptor files ─────────────────────────────────────────────

#[test]
fn loads_toml_descriptor_file() {
    let file = write_file(".toml", FEATURES_TOML);
    let parsed = DescriptorFile::load(file.path()).unwrap();
    assert_eq!(parsed.features.len(), 2);
    assert_eq!(parsed.data_sources.len(), 1);
    assert_eq!(parsed.data_sources[0].fqn, "web.events");
}

#[test]
fn loads_json_descriptor_file() {
    let file = write_file(
        ".json",
        r#"{"feature": [{"name": "score", "primitive": "float", "builder": {"kind": "headless"}}]}"#,
    );
    let parsed = DescriptorFile::load(file.path()).unwrap();
    assert_eq!(parsed.features[0].name, "score");
    assert!(parsed.data_sources.is_empty());
}

#[test]
fn missing_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    assert!(DescriptorFile::load(&dir.path().join("absent.toml")).is_err());
}

// ── validate ─────────────────────────────────────────────────────

#[test]
fn validate_binds_everything_in_a_file() {
    let engine = engine();
    let file = write_file(".toml", FEATURES_TOML);
    let report = validate_files(&engine, &[file.path().to_path_buf()]);

    assert_eq!(
        report.lines,
        vec!["ok web.events", "ok hello_world", "ok web.clicks"]
    );
    assert_eq!(report.bound, 3);
    assert!(report.success());
    assert!(engine.has_feature("web.clicks"));
    assert!(engine.has_data_source("web.events"));
}

#[test]
fn validate_reports_bad_files_and_keeps_going() {
    let engine = engine();
    let broken = write_file(".toml", "[[feature]]\nname = ");
    let good = write_file(
        ".json",
        r#"{"feature": [{"name": "score", "primitive": "float", "builder": {"kind": "headless"}}]}"#,
    );
    let report = validate_files(
        &engine,
        &[broken.path().to_path_buf(), good.path().to_path_buf()],
    );

    assert_eq!(report.failed, 1);
    assert_eq!(report.bound, 1);
    assert!(report.lines[0].starts_with("error "));
    assert_eq!(report.lines[1], "ok score");
    assert!(!report.success());
}

#[test]
fn duplicate_across_files_fails_second_bind() {
    let engine = engine();
    let first = write_file(".toml", FEATURES_TOML);
    let second = write_file(
        ".toml",
        "[[feature]]\nname = \"hello_world\"\nprimitive = \"int\"\n\n[feature.builder]\nkind = \"headless\"\n",
    );
    let paths: Vec<PathBuf> = vec![first.path().to_path_buf(), second.path().to_path_buf()];
    let report = validate_files(&engine, &paths);

    assert_eq!(report.failed, 1);
    let last = report.lines.last().unwrap();
    assert!(last.contains("feature already exists: hello_world"), "{last}");
    // the first binding wins
    assert_eq!(
        engine.metadata("hello_world").unwrap().primitive,
        fenrir_types::PrimitiveType::String
    );
}

#[test]
fn unknown_builder_is_reported() {
    let engine = engine();
    let file = write_file(
        ".toml",
        "[[feature]]\nname = \"x\"\nprimitive = \"int\"\n\n[feature.builder]\nkind = \"python\"\n",
    );
    let report = validate_files(&engine, &[file.path().to_path_buf()]);
    assert_eq!(report.failed, 1);
    assert!(report.lines[0].contains("no feature builder found for kind 'python'"));
    assert!(!engine.has_feature("x"));
}

// ── types ────────────────────────────────────────────────────────

#[test]
fn describe_types_shows_canonical_names() {
    let aliases = ["int32", "[]datetime", "json"].map(String::from);
    assert_eq!(
        describe_types(&aliases),
        vec![
            "int32 -> int (scalar)",
            "[]datetime -> []timestamp (list)",
            "json -> (unknown)",
        ]
    );
}

// ── Command line ─────────────────────────────────────────────────

#[test]
fn command_includes_plugin_flags() {
    let plugins = Plugins::with_builtins().unwrap();
    let cmd = command(&plugins).unwrap();
    assert!(
        cmd.get_arguments()
            .any(|arg| arg.get_id() == "memory-max-entries")
    );
}

#[test]
fn plugin_flags_reach_engine_config() {
    let plugins = Plugins::with_builtins().unwrap();
    let matches = command(&plugins)
        .unwrap()
        .try_get_matches_from(["fenrir", "--memory-max-entries", "10", "types", "int"])
        .unwrap();

    let mut config = EngineConfig::default();
    config.plugins.merge_matches(&matches);
    assert_eq!(config.plugins.get::<usize>("memory-max-entries").unwrap(), Some(10));
}
