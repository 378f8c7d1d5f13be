//! Fenrir command-line tool.
//!
//! Usage:
//!   fenrir --config fenrir.toml validate features/*.toml
//!   fenrir types int32 '[]datetime'

use anyhow::Result;
use clap::FromArgMatches;
use fenrir_cli::{Args, Commands, command, describe_types, init_tracing, validate_files};
use fenrir_engine::{Engine, EngineConfig};
use fenrir_plugins::Plugins;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{debug, info};

fn main() -> Result<ExitCode> {
    let plugins = Arc::new(Plugins::with_builtins()?);
    let matches = command(&plugins)?.get_matches();
    let args = Args::from_arg_matches(&matches)?;
    init_tracing(args.verbose);

    match &args.command {
        Commands::Types { aliases } => {
            for line in describe_types(aliases) {
                println!("{line}");
            }
            Ok(ExitCode::SUCCESS)
        }
        Commands::Validate { files } => {
            let mut config = EngineConfig::load_from(&args.config)?;
            config.plugins.merge_matches(&matches);
            debug!(?config, "engine config");

            let engine = Engine::from_config(plugins, &config)?;
            let report = validate_files(&engine, files);
            for line in &report.lines {
                println!("{line}");
            }
            info!(bound = report.bound, failed = report.failed, "validation finished");

            Ok(if report.success() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
    }
}
