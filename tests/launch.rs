//! End-to-end pipeline tests with a scripted engine.

use std::collections::BTreeMap;
use std::f64::consts::FRAC_PI_2;

use prometheus_launch::assemble::EARTH_PARAMS_VAR;
use prometheus_launch::bootstrap::{RUNTIME_PREFIX_VAR, bootstrap};
use prometheus_launch::core::config::{
    DetectorSection, InjectionSection, InjectorConfig, InjectorPaths, InjectorSimulation,
    RunConfig, RunRequest, RunSection,
};
use prometheus_launch::error::LaunchError;
use prometheus_launch::io::engine::{Engine, EngineCommand};
use prometheus_launch::io::env::EnvVars;
use prometheus_launch::launch::launch_with;
use prometheus_launch::test_support::{FakeEngine, MemoryEnv, TestInstall, install_tree};

/// The fully literal configuration expected for run 925 with 100 events
/// under the given install base.
fn expected_config(base: &std::path::Path) -> RunConfig {
    RunConfig {
        run: RunSection {
            run_number: 925,
            nevents: 100,
            storage_prefix: base.join("examples/output"),
            outfile: "925_photons.parquet".to_string(),
        },
        detector: DetectorSection {
            geo_file: base.join("resources/geofiles/demo_ice.geo"),
        },
        injection: InjectionSection {
            name: "LeptonInjector".to_string(),
            injectors: BTreeMap::from([(
                "LeptonInjector".to_string(),
                InjectorConfig {
                    paths: InjectorPaths {
                        earth_model_location: Some(
                            base.join("resources/earthparams/densities/PREM_south_pole.dat"),
                        ),
                    },
                    simulation: InjectorSimulation {
                        earth_model: None,
                        min_zenith: 0.0,
                        max_zenith: FRAC_PI_2,
                        minimal_energy: 1e2,
                        maximal_energy: 1e6,
                        gamma: 1.0,
                        final_state_1: "MuMinus".to_string(),
                        final_state_2: "Hadrons".to_string(),
                    },
                },
            )]),
        },
    }
}

#[test]
fn run_hands_the_engine_the_literal_configuration() {
    let install = TestInstall::new().expect("install");
    let engine = FakeEngine::new(install.base());
    let mut env = MemoryEnv::new();

    let outcome = launch_with(&engine, &RunRequest::default(), &mut env).expect("launch");

    assert_eq!(engine.runs(), vec![expected_config(install.base())]);
    assert_eq!(
        outcome.outfile,
        install.base().join("examples/output/925_photons.parquet")
    );
    assert_eq!(
        env.get(EARTH_PARAMS_VAR),
        Some(
            install
                .base()
                .join("resources/earthparams")
                .display()
                .to_string()
        )
    );
    assert!(install.base().join("examples/output").is_dir());
}

#[test]
fn bootstrapped_environment_locates_the_engine_install() {
    let prefix = tempfile::tempdir().expect("tempdir");
    let packages = prefix.path().join("share");
    install_tree(&packages).expect("install tree");

    let mut env = MemoryEnv::new();
    env.set(RUNTIME_PREFIX_VAR, &prefix.path().display().to_string());

    let state = bootstrap(&mut env).expect("bootstrap");
    let engine = EngineCommand::locate(&state).expect("locate");

    assert_eq!(engine.install_base(), packages);
    let base = engine.base_config().expect("defaults");
    assert!(base.injection.is_some());
}

#[test]
fn engine_cannot_be_located_without_bootstrap_facts() {
    // An empty search list is what a caller would have before bootstrap;
    // location fails loudly instead of probing ambient paths.
    let mut env = MemoryEnv::new();
    env.set(RUNTIME_PREFIX_VAR, "/nonexistent/prefix");
    let state = bootstrap(&mut env).expect("bootstrap");

    let err = EngineCommand::locate(&state).unwrap_err();
    assert!(matches!(err, LaunchError::EngineUnavailable(_)));
}

#[test]
fn missing_injection_section_aborts_before_the_engine_runs() {
    let install = TestInstall::new().expect("install");
    let mut base = prometheus_launch::test_support::default_base_config();
    base.injection = None;
    let engine = FakeEngine::new(install.base()).with_base(base);
    let mut env = MemoryEnv::new();

    let err = launch_with(&engine, &RunRequest::default(), &mut env).unwrap_err();
    assert!(matches!(err, LaunchError::Config(_)));
    assert!(engine.runs().is_empty());
}

#[test]
fn run_number_flows_into_the_outfile_name() {
    let install = TestInstall::new().expect("install");
    let engine = FakeEngine::new(install.base());
    let mut env = MemoryEnv::new();
    let request = RunRequest {
        run_number: 31,
        ..RunRequest::default()
    };

    let outcome = launch_with(&engine, &request, &mut env).expect("launch");

    assert_eq!(engine.runs()[0].run.outfile, "31_photons.parquet");
    assert_eq!(
        outcome.outfile,
        install.base().join("examples/output/31_photons.parquet")
    );
}
