//! Run-configuration assembly over a discovered install.
//!
//! Steps run in a fixed order: derive the layout, create the output
//! directory, publish the earth-params directory to the environment, then
//! compose the configuration tree. The environment write must precede
//! engine startup because the native earth-model loader reads it once, at
//! its own construction time.

use std::fs;
use std::path::Path;

use anyhow::Context;
use tracing::{debug, info};

use crate::core::config::{BaseConfig, RunConfig, RunRequest, compose};
use crate::core::layout::InstallLayout;
use crate::error::LaunchError;
use crate::io::env::EnvVars;

/// Read by the native earth-model loader; set unconditionally each run.
pub const EARTH_PARAMS_VAR: &str = "EARTH_PARAMS";

/// Build the complete run configuration for `install_base`.
///
/// Creating the output directory is idempotent; a pre-existing directory is
/// not an error. Section requirements and injector selection are enforced by
/// [`compose`].
pub fn assemble(
    base: BaseConfig,
    request: &RunRequest,
    install_base: &Path,
    vars: &mut dyn EnvVars,
) -> Result<RunConfig, LaunchError> {
    let layout = InstallLayout::new(install_base);

    let output_dir = layout.output_dir();
    fs::create_dir_all(&output_dir)
        .with_context(|| format!("create output directory {}", output_dir.display()))?;

    let earth_params = layout.earth_params_dir();
    vars.set(EARTH_PARAMS_VAR, &earth_params.display().to_string());
    debug!(dir = %earth_params.display(), "published earth-params directory");

    let config = compose(base, request, &layout)?;
    info!(
        run_number = config.run.run_number,
        nevents = config.run.nevents,
        outfile = %config.run.outfile,
        "configuration assembled"
    );
    Ok(config)
}
