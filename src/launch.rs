//! End-to-end orchestration: bootstrap, locate, assemble, run.
//!
//! The stages form a straight line and each one consumes the previous
//! stage's value, so the order cannot be rearranged by callers: an
//! [`EnvironmentState`] only comes out of [`bootstrap`], an engine handle
//! only out of [`EngineCommand::locate`], and the engine only accepts a
//! finished [`RunConfig`].

use std::path::PathBuf;

use tracing::info;

use crate::assemble::assemble;
use crate::bootstrap::{EnvironmentState, bootstrap};
use crate::core::config::{RunConfig, RunRequest};
use crate::error::LaunchError;
use crate::io::engine::{Engine, EngineCommand};
use crate::io::env::{EnvVars, ProcessEnv};
use crate::io::preload::PreloadStatus;

/// Result of a completed run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutcome {
    /// Artifact the engine was asked to write.
    pub outfile: PathBuf,
}

/// Facts gathered by `check`: context, install, and preload state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckReport {
    pub prefix: PathBuf,
    pub install_base: PathBuf,
    pub binary: PathBuf,
    pub preload: PreloadStatus,
}

/// Run the full pipeline against the real environment and engine.
pub fn launch(request: &RunRequest) -> Result<RunOutcome, LaunchError> {
    let mut vars = ProcessEnv;
    let (_env, engine) = open(&mut vars)?;
    launch_with(&engine, request, &mut vars)
}

/// Assemble only; used by `config` to show what a run would receive.
pub fn prepare(request: &RunRequest) -> Result<RunConfig, LaunchError> {
    let mut vars = ProcessEnv;
    let (_env, engine) = open(&mut vars)?;
    assemble(engine.base_config()?, request, engine.install_base(), &mut vars)
}

/// Bootstrap and locate only; nothing is assembled or run.
pub fn check() -> Result<CheckReport, LaunchError> {
    let mut vars = ProcessEnv;
    let (env, engine) = open(&mut vars)?;
    Ok(CheckReport {
        prefix: env.prefix,
        install_base: engine.install_base().to_path_buf(),
        binary: engine.binary().to_path_buf(),
        preload: env.preload,
    })
}

/// Assemble and run against an already-located engine.
pub fn launch_with(
    engine: &dyn Engine,
    request: &RunRequest,
    vars: &mut dyn EnvVars,
) -> Result<RunOutcome, LaunchError> {
    let base = engine.base_config()?;
    let config = assemble(base, request, engine.install_base(), vars)?;
    let outfile = config.run.storage_prefix.join(&config.run.outfile);
    engine.run(&config)?;
    info!(outfile = %outfile.display(), "run complete");
    Ok(RunOutcome { outfile })
}

fn open(vars: &mut dyn EnvVars) -> Result<(EnvironmentState, EngineCommand), LaunchError> {
    let env = bootstrap(vars)?;
    let engine = EngineCommand::locate(&env)?;
    Ok((env, engine))
}
