//! Engine abstraction and the process-spawning implementation.
//!
//! The [`Engine`] trait decouples pipeline orchestration from the external
//! engine process. Tests use scripted engines that record the configuration
//! they were handed without spawning anything.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use anyhow::{Context, anyhow};
use tracing::{debug, info, instrument};

use crate::bootstrap::EnvironmentState;
use crate::core::config::{BaseConfig, RunConfig};
use crate::error::LaunchError;

/// Directory name of the engine package under a package root.
pub const ENGINE_PACKAGE: &str = "prometheus";
/// Engine executable, relative to the package directory.
const ENGINE_BINARY: &str = "bin/prometheus";
/// Engine-shipped defaults, relative to the package directory.
const ENGINE_DEFAULTS: &str = "config.toml";

/// Abstraction over the external simulation engine.
pub trait Engine {
    /// Install base the engine was discovered under.
    fn install_base(&self) -> &Path;
    /// The engine's own defaulted configuration tree.
    fn base_config(&self) -> Result<BaseConfig, LaunchError>;
    /// Execute a run with the finished configuration. Synchronous, no
    /// retries; a failed run is terminal.
    fn run(&self, config: &RunConfig) -> Result<(), LaunchError>;
}

/// The engine as an external process, located in a bootstrapped environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineCommand {
    install_base: PathBuf,
    package_dir: PathBuf,
    binary: PathBuf,
}

impl EngineCommand {
    /// Locate the engine install by scanning the module search list in order.
    ///
    /// Taking [`EnvironmentState`] by reference makes bootstrap a
    /// precondition of engine access: there is no other way to obtain one.
    pub fn locate(env: &EnvironmentState) -> Result<Self, LaunchError> {
        for root in &env.search_paths {
            let package_dir = root.join(ENGINE_PACKAGE);
            if !package_dir.is_dir() {
                continue;
            }
            let binary = package_dir.join(ENGINE_BINARY);
            if !binary.is_file() {
                return Err(LaunchError::EngineUnavailable(format!(
                    "engine package at {} has no executable at {}",
                    package_dir.display(),
                    binary.display()
                )));
            }
            debug!(install_base = %root.display(), "located engine install");
            return Ok(Self {
                install_base: root.clone(),
                package_dir,
                binary,
            });
        }
        Err(LaunchError::EngineUnavailable(format!(
            "engine package '{ENGINE_PACKAGE}' not found on the module search path"
        )))
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }
}

impl Engine for EngineCommand {
    fn install_base(&self) -> &Path {
        &self.install_base
    }

    fn base_config(&self) -> Result<BaseConfig, LaunchError> {
        let path = self.package_dir.join(ENGINE_DEFAULTS);
        let contents = fs::read_to_string(&path).map_err(|err| {
            LaunchError::EngineUnavailable(format!(
                "engine defaults unreadable at {}: {err}",
                path.display()
            ))
        })?;
        toml::from_str(&contents).map_err(|err| {
            LaunchError::Config(format!(
                "engine defaults at {} are malformed: {err}",
                path.display()
            ))
        })
    }

    #[instrument(skip_all, fields(binary = %self.binary.display()))]
    fn run(&self, config: &RunConfig) -> Result<(), LaunchError> {
        let rendered = toml::to_string_pretty(config).context("serialize run configuration")?;

        info!("starting engine run");
        let mut child = match Command::new(&self.binary)
            .arg("run")
            .arg("--config")
            .arg("-")
            .stdin(Stdio::piped())
            .spawn()
        {
            Ok(child) => child,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                return Err(LaunchError::EngineUnavailable(format!(
                    "engine executable {} could not be started",
                    self.binary.display()
                )));
            }
            Err(err) => return Err(anyhow!(err).context("spawn engine").into()),
        };

        child
            .stdin
            .take()
            .ok_or_else(|| anyhow!("stdin was not piped"))?
            .write_all(rendered.as_bytes())
            .context("write configuration to engine stdin")?;

        let status = child.wait().context("wait for engine")?;
        if !status.success() {
            return Err(LaunchError::EngineRun(format!(
                "engine exited with {status}"
            )));
        }
        debug!("engine run finished");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::preload::PreloadStatus;
    use crate::test_support::TestInstall;

    fn env_with_search_paths(search_paths: Vec<PathBuf>) -> EnvironmentState {
        EnvironmentState {
            prefix: PathBuf::from("/opt/env"),
            lib_dir: PathBuf::from("/opt/env/lib"),
            search_paths,
            preload: PreloadStatus::Missing,
        }
    }

    #[test]
    fn locate_finds_the_first_package_root_with_the_engine() {
        let install = TestInstall::new().expect("install");
        let env = env_with_search_paths(vec![
            PathBuf::from("/does/not/exist"),
            install.base().to_path_buf(),
        ]);

        let engine = EngineCommand::locate(&env).expect("locate");
        assert_eq!(engine.install_base(), install.base());
        assert_eq!(
            engine.binary(),
            install.base().join("prometheus/bin/prometheus")
        );
    }

    #[test]
    fn locate_fails_without_any_engine_package() {
        let temp = tempfile::tempdir().expect("tempdir");
        let env = env_with_search_paths(vec![temp.path().to_path_buf()]);

        let err = EngineCommand::locate(&env).unwrap_err();
        assert!(matches!(err, LaunchError::EngineUnavailable(_)));
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn locate_fails_when_the_package_lacks_an_executable() {
        let install = TestInstall::new().expect("install");
        fs::remove_file(install.base().join("prometheus/bin/prometheus")).expect("remove");
        let env = env_with_search_paths(vec![install.base().to_path_buf()]);

        let err = EngineCommand::locate(&env).unwrap_err();
        assert!(matches!(err, LaunchError::EngineUnavailable(_)));
        assert!(err.to_string().contains("no executable"));
    }

    #[test]
    fn base_config_parses_the_shipped_defaults() {
        let install = TestInstall::new().expect("install");
        let env = env_with_search_paths(vec![install.base().to_path_buf()]);
        let engine = EngineCommand::locate(&env).expect("locate");

        let base = engine.base_config().expect("defaults");
        assert!(base.run.is_some());
        assert!(base.detector.is_some());
        let injection = base.injection.expect("injection section");
        assert!(injection.injectors.contains_key("LeptonInjector"));
    }

    #[test]
    fn base_config_categorizes_malformed_defaults() {
        let install = TestInstall::new().expect("install");
        fs::write(install.base().join("prometheus/config.toml"), "run = [unclosed")
            .expect("write");
        let env = env_with_search_paths(vec![install.base().to_path_buf()]);
        let engine = EngineCommand::locate(&env).expect("locate");

        let err = engine.base_config().unwrap_err();
        assert!(matches!(err, LaunchError::Config(_)));
    }
}
