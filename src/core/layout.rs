//! Derived filesystem facts for a discovered engine install.

use std::path::{Path, PathBuf};

/// Detector geometry shipped with the engine install.
pub const GEOMETRY_FILE: &str = "demo_ice.geo";
/// Earth density profile consumed by the native injector.
pub const EARTH_MODEL_FILE: &str = "PREM_south_pole.dat";

/// Path derivations rooted at the install base.
///
/// Every accessor is a pure function of the install base, recomputed per
/// run; nothing here touches the filesystem. The install base itself varies
/// by environment and is discovered at runtime, never compiled in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallLayout {
    install_base: PathBuf,
}

impl InstallLayout {
    pub fn new(install_base: impl Into<PathBuf>) -> Self {
        Self {
            install_base: install_base.into(),
        }
    }

    pub fn install_base(&self) -> &Path {
        &self.install_base
    }

    pub fn resource_dir(&self) -> PathBuf {
        self.install_base.join("resources")
    }

    /// Where the engine writes run artifacts. Created on assembly if absent.
    pub fn output_dir(&self) -> PathBuf {
        self.install_base.join("examples").join("output")
    }

    pub fn geo_file(&self) -> PathBuf {
        self.resource_dir().join("geofiles").join(GEOMETRY_FILE)
    }

    /// Directory the native earth-model loader resolves its data files from.
    pub fn earth_params_dir(&self) -> PathBuf {
        self.resource_dir().join("earthparams")
    }

    /// Full path to the density profile the native injector consumes.
    pub fn earth_model_file(&self) -> PathBuf {
        self.earth_params_dir()
            .join("densities")
            .join(EARTH_MODEL_FILE)
    }
}
