pub mod acquire;
pub mod assemble;
pub mod cli;
pub mod config;
pub mod data;
pub mod discount;
pub mod error;
pub mod frame;
pub mod io_utils;
pub mod join;
pub mod pipeline;
pub mod preview;
pub mod provinces;
pub mod reader;
pub mod report;
pub mod schema;
pub mod table;
pub mod training;

use std::{env, sync::OnceLock};

use anyhow::{Context, Result};
use clap::Parser;
use log::{LevelFilter, info};

use crate::{
    cli::{Cli, Commands, SourceArgs},
    config::{PipelineConfig, RemoteConfig, default_fetch_args},
};

pub use crate::error::{AcquisitionError, UnreadableSourceError};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("promo_dataset", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    match cli.command {
        Commands::Build(args) => handle_build(&args),
        Commands::Acquire(args) => handle_acquire(&args),
        Commands::Preview(args) => preview::execute(&args),
    }
}

fn handle_build(args: &cli::BuildArgs) -> Result<()> {
    let mut config = resolve_config(&args.sources)?;
    if let Some(output) = &args.output {
        config.output = output.clone();
    }
    info!(
        "Building dataset from {:?} -> {:?}",
        config.work_dir, config.output
    );
    let outcome = pipeline::run(&config)?;
    if let Some(path) = &args.report {
        report::RunReport::from_outcome(&outcome)?
            .save(path)
            .with_context(|| format!("Writing run report to {path:?}"))?;
    }
    let status = if outcome.degraded { "degraded" } else { "ok" };
    println!(
        "{status}: {} row(s) written to {}",
        outcome.rows,
        outcome.output.display()
    );
    Ok(())
}

fn handle_acquire(args: &cli::AcquireArgs) -> Result<()> {
    let config = resolve_config(&args.sources)?;
    let remote = config.remote.as_ref().map(acquire::remote_from_config);
    let sources = acquire::acquire_sources(&config.work_dir, remote.as_deref(), &config.retry)?;
    for canonical in acquire::CANONICAL_SOURCES {
        match sources.get(canonical.kind) {
            Some(path) => println!("{}: {}", canonical.file_name, path.display()),
            None => println!("{}: missing", canonical.file_name),
        }
    }
    Ok(())
}

/// Loads the optional config file and layers command-line overrides on top.
pub fn resolve_config(args: &SourceArgs) -> Result<PipelineConfig> {
    let mut config = match &args.config {
        Some(path) => PipelineConfig::load(path)
            .with_context(|| format!("Loading configuration from {path:?}"))?,
        None => PipelineConfig::default(),
    };
    if let Some(dir) = &args.work_dir {
        config.work_dir = dir.clone();
    }
    if let Some(folder) = &args.folder {
        config.remote = Some(RemoteConfig::Command {
            folder: folder.clone(),
            program: None,
            args: default_fetch_args(),
        });
    }
    if let Some(mirror) = &args.mirror {
        config.remote = Some(RemoteConfig::Mirror {
            path: mirror.clone(),
        });
    }
    if let Some(attempts) = args.attempts {
        config.retry.attempts = attempts;
    }
    config.validate()?;
    Ok(config)
}
