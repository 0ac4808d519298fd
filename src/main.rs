//! Launcher CLI for the external particle-propagation engine.
//!
//! `run` prepares the environment, assembles the run configuration, and
//! drives the engine; `config` stops after assembly and prints the tree;
//! `check` verifies the runtime context and engine install.

use anyhow::Context;
use clap::{Args, Parser, Subcommand};

use prometheus_launch::core::config::{InjectionRequest, RunRequest};
use prometheus_launch::error::LaunchError;
use prometheus_launch::{launch, logging};

#[derive(Parser)]
#[command(
    name = "prometheus-launch",
    version,
    about = "Bootstrap the runtime environment and drive engine simulation runs"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Bootstrap the environment, assemble the configuration, run the engine.
    Run(RunArgs),
    /// Assemble and print the run configuration without starting the engine.
    Config {
        #[command(flatten)]
        args: RunArgs,
        /// Print JSON instead of TOML.
        #[arg(long)]
        json: bool,
    },
    /// Verify the runtime context and engine install.
    Check,
}

#[derive(Args)]
struct RunArgs {
    /// Run identifier stamped into output names.
    #[arg(long, default_value_t = 925)]
    run_number: u32,
    /// Number of events to inject.
    #[arg(long, default_value_t = 100)]
    nevents: u32,
    /// Injection module to drive.
    #[arg(long, default_value = "LeptonInjector")]
    injector: String,
}

impl RunArgs {
    fn request(&self) -> RunRequest {
        RunRequest {
            run_number: self.run_number,
            nevents: self.nevents,
            injection: InjectionRequest {
                injector: self.injector.clone(),
                ..InjectionRequest::default()
            },
        }
    }
}

fn main() {
    logging::init();
    if let Err(err) = run() {
        let code = err.exit_code();
        eprintln!("{:#}", anyhow::Error::new(err));
        std::process::exit(code);
    }
}

fn run() -> Result<(), LaunchError> {
    let cli = Cli::parse();
    match cli.command {
        Command::Run(args) => cmd_run(&args.request()),
        Command::Config { args, json } => cmd_config(&args.request(), json),
        Command::Check => cmd_check(),
    }
}

fn cmd_run(request: &RunRequest) -> Result<(), LaunchError> {
    let outcome = launch::launch(request)?;
    println!("{}", outcome.outfile.display());
    Ok(())
}

fn cmd_config(request: &RunRequest, json: bool) -> Result<(), LaunchError> {
    let config = launch::prepare(request)?;
    let rendered = if json {
        serde_json::to_string_pretty(&config).context("render configuration as json")?
    } else {
        toml::to_string_pretty(&config).context("render configuration as toml")?
    };
    println!("{rendered}");
    Ok(())
}

fn cmd_check() -> Result<(), LaunchError> {
    let report = launch::check()?;
    println!("prefix: {}", report.prefix.display());
    println!("install base: {}", report.install_base.display());
    println!("engine: {}", report.binary.display());
    println!("preload: {}", report.preload);
    Ok(())
}
