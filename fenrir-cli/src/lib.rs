//! Shared pieces of the `fenrir` command-line tool.

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use fenrir_engine::Engine;
use fenrir_plugins::Plugins;
use fenrir_types::{DataSource, FeatureDescriptor, PrimitiveType};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::Level;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser, Debug)]
#[command(name = "fenrir")]
#[command(about = "Fenrir online feature engine tools", version)]
pub struct Args {
    /// Engine config file
    #[arg(short, long, global = true, default_value = "fenrir.toml")]
    pub config: PathBuf,

    /// Enable verbose debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Bind descriptor files into an engine and report each result
    Validate {
        /// TOML or JSON files holding `feature` and `data_source` entries
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Show how primitive type aliases parse
    Types {
        #[arg(required = true)]
        aliases: Vec<String>,
    },
}

/// The full command line: the static arguments plus every flag
/// contributed by a registered config binder.
pub fn command(plugins: &Plugins) -> Result<clap::Command> {
    Ok(plugins.bind_config(Args::command())?)
}

/// Installs the log subscriber. `RUST_LOG` wins over `--verbose`.
/// Logs go to stderr so stdout carries only the report.
pub fn init_tracing(verbose: bool) {
    let builder = FmtSubscriber::builder()
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact();
    match EnvFilter::try_from_default_env() {
        Ok(filter) => builder.with_env_filter(filter).init(),
        Err(_) => {
            let level = if verbose { Level::DEBUG } else { Level::INFO };
            builder.with_max_level(level).init();
        }
    }
}

/// Contents of a descriptor file.
#[derive(Debug, Default, Deserialize)]
pub struct DescriptorFile {
    #[serde(default, rename = "feature")]
    pub features: Vec<FeatureDescriptor>,
    #[serde(default, rename = "data_source")]
    pub data_sources: Vec<DataSource>,
}

impl DescriptorFile {
    /// Reads a `.json` file as JSON and anything else as TOML.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if is_json {
            serde_json::from_str(&contents).with_context(|| format!("parsing {}", path.display()))
        } else {
            toml::from_str(&contents).with_context(|| format!("parsing {}", path.display()))
        }
    }
}

/// Outcome of `validate`: one line per descriptor or unreadable file.
#[derive(Debug, Default, PartialEq)]
pub struct Report {
    pub lines: Vec<String>,
    pub bound: usize,
    pub failed: usize,
}

impl Report {
    fn ok(&mut self, fqn: &str) {
        self.bound += 1;
        self.lines.push(format!("ok {fqn}"));
    }

    fn error(&mut self, path: &Path, err: impl std::fmt::Display) {
        self.failed += 1;
        self.lines.push(format!("error {}: {err}", path.display()));
    }

    pub fn success(&self) -> bool {
        self.failed == 0
    }
}

/// Binds every data source, then every feature, of each file in order.
///
/// Files share one engine, so a feature bound by an earlier file makes a
/// later duplicate fail.
pub fn validate_files(engine: &Engine, paths: &[PathBuf]) -> Report {
    let mut report = Report::default();
    for path in paths {
        let file = match DescriptorFile::load(path) {
            Ok(file) => file,
            Err(e) => {
                report.error(path, format!("{e:#}"));
                continue;
            }
        };

        for ds in file.data_sources {
            let fqn = ds.fqn.clone();
            match engine.bind_data_source(ds) {
                Ok(()) => report.ok(&fqn),
                Err(e) => report.error(path, e),
            }
        }
        for feature in &file.features {
            match engine.bind_feature(feature) {
                Ok(()) => match feature.fqn() {
                    Ok(fqn) => report.ok(&fqn.to_string()),
                    Err(e) => report.error(path, e),
                },
                Err(e) => report.error(path, e),
            }
        }
    }
    report
}

/// `alias -> canonical type` for each alias.
pub fn describe_types(aliases: &[String]) -> Vec<String> {
    aliases
        .iter()
        .map(|alias| {
            let parsed = PrimitiveType::parse(alias);
            let shape = if parsed.is_unknown() {
                ""
            } else if parsed.is_scalar() {
                " (scalar)"
            } else {
                " (list)"
            };
            format!("{alias} -> {parsed}{shape}")
        })
        .collect()
}
