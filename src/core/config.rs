//! Run-configuration model and its composition from engine defaults.
//!
//! The engine reads a nested, string-keyed configuration document. The
//! assembled form is kept fully typed (serde renames reproduce the engine's
//! exact keys on serialization), while the engine-supplied defaults stay
//! loosely typed, since their content belongs to the engine.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::core::layout::InstallLayout;
use crate::error::LaunchError;

/// Caller-supplied parameters layered over the engine defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct RunRequest {
    /// Run identifier stamped into output names.
    pub run_number: u32,
    /// Number of events to inject.
    pub nevents: u32,
    pub injection: InjectionRequest,
}

impl Default for RunRequest {
    fn default() -> Self {
        Self {
            run_number: 925,
            nevents: 100,
            injection: InjectionRequest::default(),
        }
    }
}

/// Injection selection and its sampling bounds.
///
/// Defaults to upgoing numu charged-current events sampled on an E^-1
/// spectrum from 100 GeV to 1 PeV.
#[derive(Debug, Clone, PartialEq)]
pub struct InjectionRequest {
    /// Injection module driven by the engine.
    pub injector: String,
    /// Zenith bounds in radians. Upgoing only: `[0, pi/2]`.
    pub min_zenith: f64,
    pub max_zenith: f64,
    /// Energy bounds in GeV.
    pub minimal_energy: f64,
    pub maximal_energy: f64,
    /// Power-law spectral index for energy sampling.
    pub gamma: f64,
    /// Final-state labels for the selected interaction channel.
    pub final_state_1: String,
    pub final_state_2: String,
}

impl Default for InjectionRequest {
    fn default() -> Self {
        Self {
            injector: "LeptonInjector".to_string(),
            min_zenith: 0.0,
            max_zenith: std::f64::consts::FRAC_PI_2,
            minimal_energy: 1e2,
            maximal_energy: 1e6,
            gamma: 1.0,
            final_state_1: "MuMinus".to_string(),
            final_state_2: "Hadrons".to_string(),
        }
    }
}

/// Fully assembled configuration handed to the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    pub run: RunSection,
    pub detector: DetectorSection,
    pub injection: InjectionSection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSection {
    #[serde(rename = "run number")]
    pub run_number: u32,
    pub nevents: u32,
    #[serde(rename = "storage prefix")]
    pub storage_prefix: PathBuf,
    pub outfile: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectorSection {
    #[serde(rename = "geo file")]
    pub geo_file: PathBuf,
}

/// Injection section: the selected module name plus per-injector blocks
/// keyed by module name, as the engine expects them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InjectionSection {
    pub name: String,
    #[serde(flatten)]
    pub injectors: BTreeMap<String, InjectorConfig>,
}

impl InjectionSection {
    /// Parameter block of the selected injector, if present.
    pub fn selected(&self) -> Option<&InjectorConfig> {
        self.injectors.get(&self.name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InjectorConfig {
    pub paths: InjectorPaths,
    pub simulation: InjectorSimulation,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InjectorPaths {
    /// Full path to the earth density profile. This is the key the native
    /// injector actually resolves the model through.
    #[serde(rename = "earth model location", skip_serializing_if = "Option::is_none")]
    pub earth_model_location: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InjectorSimulation {
    /// Consulted by some engine frontends only; the native injector ignores
    /// it in favor of `paths."earth model location"`. Assembly leaves it at
    /// whatever the engine defaults carry.
    #[serde(rename = "earth model", skip_serializing_if = "Option::is_none")]
    pub earth_model: Option<String>,
    #[serde(rename = "min zenith")]
    pub min_zenith: f64,
    #[serde(rename = "max zenith")]
    pub max_zenith: f64,
    #[serde(rename = "minimal energy")]
    pub minimal_energy: f64,
    #[serde(rename = "maximal energy")]
    pub maximal_energy: f64,
    pub gamma: f64,
    #[serde(rename = "final state 1")]
    pub final_state_1: String,
    #[serde(rename = "final state 2")]
    pub final_state_2: String,
}

/// Engine-supplied defaults, as read from the install's `config.toml`.
///
/// Sections are optional here: assembly requires them and fails with a
/// configuration error when one is absent, rather than synthesizing it.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct BaseConfig {
    pub run: Option<toml::Table>,
    pub detector: Option<toml::Table>,
    pub injection: Option<BaseInjection>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct BaseInjection {
    /// Engine-default module selection; the request overrides it.
    pub name: Option<String>,
    #[serde(flatten)]
    pub injectors: BTreeMap<String, InjectorConfig>,
}

/// Layer run parameters and discovered paths over the engine defaults.
///
/// The three top-level sections must already exist in the defaults, and the
/// injector parameter block only becomes reachable once an injector has been
/// selected from the defaults by name: fields cannot be populated for a
/// module that was never selected.
pub fn compose(
    base: BaseConfig,
    request: &RunRequest,
    layout: &InstallLayout,
) -> Result<RunConfig, LaunchError> {
    require_section(base.run, "run")?;
    require_section(base.detector, "detector")?;
    let injection = require_section(base.injection, "injection")?;

    let selection = &request.injection;
    let mut injector = select_injector(injection, &selection.injector)?;

    injector.paths.earth_model_location = Some(layout.earth_model_file());

    let simulation = &mut injector.simulation;
    simulation.min_zenith = selection.min_zenith;
    simulation.max_zenith = selection.max_zenith;
    simulation.minimal_energy = selection.minimal_energy;
    simulation.maximal_energy = selection.maximal_energy;
    simulation.gamma = selection.gamma;
    simulation.final_state_1 = selection.final_state_1.clone();
    simulation.final_state_2 = selection.final_state_2.clone();

    Ok(RunConfig {
        run: RunSection {
            run_number: request.run_number,
            nevents: request.nevents,
            storage_prefix: layout.output_dir(),
            outfile: format!("{}_photons.parquet", request.run_number),
        },
        detector: DetectorSection {
            geo_file: layout.geo_file(),
        },
        injection: InjectionSection {
            name: selection.injector.clone(),
            injectors: BTreeMap::from([(selection.injector.clone(), injector)]),
        },
    })
}

fn require_section<T>(section: Option<T>, name: &str) -> Result<T, LaunchError> {
    section.ok_or_else(|| {
        LaunchError::Config(format!("engine defaults are missing the [{name}] section"))
    })
}

fn select_injector(mut injection: BaseInjection, name: &str) -> Result<InjectorConfig, LaunchError> {
    injection.injectors.remove(name).ok_or_else(|| {
        LaunchError::Config(format!(
            "engine defaults carry no parameter block for injector '{name}'"
        ))
    })
}
