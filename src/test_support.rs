//! Shared fakes and fixture builders for unit and integration tests.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::core::config::{BaseConfig, RunConfig};
use crate::error::LaunchError;
use crate::io::engine::Engine;
use crate::io::env::EnvVars;

/// Defaults document as the engine ships it.
pub const ENGINE_DEFAULTS_FIXTURE: &str = r#"
[run]
nevents = 10

[detector]

[injection]
name = "LeptonInjector"

[injection.LeptonInjector.paths]

[injection.LeptonInjector.simulation]
"#;

/// In-memory environment map.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryEnv {
    vars: BTreeMap<String, String>,
}

impl MemoryEnv {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current contents, for asserting the absence of mutation.
    pub fn snapshot(&self) -> BTreeMap<String, String> {
        self.vars.clone()
    }
}

impl EnvVars for MemoryEnv {
    fn get(&self, key: &str) -> Option<String> {
        self.vars.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.vars.insert(key.to_string(), value.to_string());
    }
}

/// Minimal engine install rooted in a fresh temp directory.
pub struct TestInstall {
    temp: tempfile::TempDir,
}

impl TestInstall {
    pub fn new() -> Result<Self> {
        let temp = tempfile::tempdir().context("create tempdir")?;
        install_tree(temp.path())?;
        Ok(Self { temp })
    }

    /// The install base, i.e. the package root the engine sits under.
    pub fn base(&self) -> &Path {
        self.temp.path()
    }
}

/// Lay out a minimal engine install under `root`.
pub fn install_tree(root: &Path) -> Result<()> {
    let package_dir = root.join("prometheus");
    fs::create_dir_all(package_dir.join("bin")).context("create package bin")?;
    fs::write(package_dir.join("bin/prometheus"), "").context("write engine binary")?;
    fs::write(package_dir.join("config.toml"), ENGINE_DEFAULTS_FIXTURE)
        .context("write engine defaults")?;

    fs::create_dir_all(root.join("resources/geofiles")).context("create geofiles")?;
    fs::write(root.join("resources/geofiles/demo_ice.geo"), "").context("write geofile")?;
    fs::create_dir_all(root.join("resources/earthparams/densities"))
        .context("create earthparams")?;
    fs::write(
        root.join("resources/earthparams/densities/PREM_south_pole.dat"),
        "",
    )
    .context("write density file")?;
    Ok(())
}

/// Parsed form of [`ENGINE_DEFAULTS_FIXTURE`].
pub fn default_base_config() -> BaseConfig {
    toml::from_str(ENGINE_DEFAULTS_FIXTURE).expect("parse engine defaults fixture")
}

/// Scripted engine standing in for the external process.
pub struct FakeEngine {
    install_base: PathBuf,
    base: BaseConfig,
    fail_run: Option<String>,
    ran: RefCell<Vec<RunConfig>>,
}

impl FakeEngine {
    pub fn new(install_base: impl Into<PathBuf>) -> Self {
        Self {
            install_base: install_base.into(),
            base: default_base_config(),
            fail_run: None,
            ran: RefCell::new(Vec::new()),
        }
    }

    pub fn with_base(mut self, base: BaseConfig) -> Self {
        self.base = base;
        self
    }

    /// Make every run fail with the given reason.
    pub fn failing(mut self, reason: &str) -> Self {
        self.fail_run = Some(reason.to_string());
        self
    }

    /// Configurations the engine was asked to run, in order.
    pub fn runs(&self) -> Vec<RunConfig> {
        self.ran.borrow().clone()
    }
}

impl Engine for FakeEngine {
    fn install_base(&self) -> &Path {
        &self.install_base
    }

    fn base_config(&self) -> Result<BaseConfig, LaunchError> {
        Ok(self.base.clone())
    }

    fn run(&self, config: &RunConfig) -> Result<(), LaunchError> {
        self.ran.borrow_mut().push(config.clone());
        match &self.fail_run {
            Some(reason) => Err(LaunchError::EngineRun(reason.clone())),
            None => Ok(()),
        }
    }
}
