//! Pre-start environment preparation.
//!
//! Everything here must complete before the engine is located or started:
//! the dynamic linker reads `LD_LIBRARY_PATH` when the engine loads its
//! native libraries, and the module search list decides where the engine
//! package is looked up. [`EnvironmentState`] is the proof of completion:
//! every later stage takes it by reference, so none can run first.

use std::path::PathBuf;

use tracing::{debug, info, warn};

use crate::error::LaunchError;
use crate::io::env::{EnvVars, parse_path_list, prepend_path_entry};
use crate::io::preload::{PreloadStatus, preload_library};

/// Marker for an active, provisioned runtime context. Required.
pub const RUNTIME_PREFIX_VAR: &str = "CONDA_PREFIX";
/// Dynamic-linker search path, augmented with the prefix's `lib/`.
pub const LIBRARY_PATH_VAR: &str = "LD_LIBRARY_PATH";
/// Optional extra package roots for engine discovery, `:`-separated.
pub const SEARCH_PATH_VAR: &str = "PROMETHEUS_SEARCH_PATH";
/// Library force-loaded ahead of engine startup. Missing is fine.
pub const PRELOAD_LIBRARY: &str = "libLeptonInjector.so";

/// Prepared environment, produced by [`bootstrap`].
///
/// After bootstrap the process environment is read-only; this value carries
/// the derived facts later stages consume.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvironmentState {
    /// Root of the provisioned runtime context.
    pub prefix: PathBuf,
    /// Native-library directory made visible to the dynamic linker.
    pub lib_dir: PathBuf,
    /// Package roots consulted, in order, when locating the engine.
    pub search_paths: Vec<PathBuf>,
    /// Outcome of the best-effort shared-library preload.
    pub preload: PreloadStatus,
}

/// Prepare the process environment for the engine.
///
/// Fails fast with a configuration error when [`RUNTIME_PREFIX_VAR`] is
/// unset, before any mutation. Both the `LD_LIBRARY_PATH` prepend and the
/// search-list insertion are idempotent: running bootstrap twice in one
/// process leaves each target directory listed exactly once.
pub fn bootstrap(vars: &mut dyn EnvVars) -> Result<EnvironmentState, LaunchError> {
    let prefix = vars.get(RUNTIME_PREFIX_VAR).ok_or_else(|| {
        LaunchError::Config(format!(
            "{RUNTIME_PREFIX_VAR} is not set; activate the environment that provides the engine"
        ))
    })?;
    let prefix = PathBuf::from(prefix);
    let lib_dir = prefix.join("lib");
    let packages_dir = prefix.join("share");

    let current = vars.get(LIBRARY_PATH_VAR).unwrap_or_default();
    if let Some(updated) = prepend_path_entry(&current, &lib_dir) {
        debug!(dir = %lib_dir.display(), "prepending native-library directory to linker path");
        vars.set(LIBRARY_PATH_VAR, &updated);
    }

    let mut search_paths =
        parse_path_list(vars.get(SEARCH_PATH_VAR).as_deref().unwrap_or_default());
    if !search_paths.contains(&packages_dir) {
        debug!(dir = %packages_dir.display(), "adding package root to module search list");
        search_paths.insert(0, packages_dir);
    }

    let preload_path = lib_dir.join(PRELOAD_LIBRARY);
    let preload = preload_library(&preload_path);
    match &preload {
        PreloadStatus::Loaded => {}
        PreloadStatus::Missing => {
            debug!(path = %preload_path.display(), "preload library not present, skipping");
        }
        PreloadStatus::Failed(reason) => {
            warn!(path = %preload_path.display(), %reason, "could not preload shared library, continuing");
        }
    }

    info!(prefix = %prefix.display(), "environment prepared");
    Ok(EnvironmentState {
        prefix,
        lib_dir,
        search_paths,
        preload,
    })
}
