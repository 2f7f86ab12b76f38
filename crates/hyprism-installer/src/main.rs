// SPDX-License-Identifier: CC-BY-NC-ND-4.0

//! HyPrism installer entry point

use anyhow::Context;
use hyprism_installer::config::{default_settings_path, load_settings};
use hyprism_installer::elevation::PkexecElevator;
use hyprism_installer::prompt::ConsolePrompter;
use hyprism_installer::release::ReleaseClient;
use hyprism_installer::{HostEnvironment, InstallConfig, InstallerError, Orchestrator, interrupt};
use std::process::ExitCode;
use tracing::{debug, info, warn};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    if let Err(e) = interrupt::install_handlers() {
        eprintln!("Failed to install signal handlers: {e}");
    }

    // Diagnostics go to stderr, stdout is for progress
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("hyprism_installer=info")),
        )
        .init();

    let host = match host_environment() {
        Ok(host) => host,
        Err(e) => {
            println!("Error occurred: {e:#}");
            return ExitCode::FAILURE;
        }
    };
    debug!("{host:?}");

    match run(&host).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            println!("Error occurred: {e}");
            ExitCode::from(e.exit_code())
        }
    }
}

fn host_environment() -> anyhow::Result<HostEnvironment> {
    let home = dirs::home_dir().context("Could not determine the home directory")?;
    let cwd = std::env::current_dir().context("Could not read the working directory")?;
    let program = std::env::current_exe().context("Could not locate the installer executable")?;

    Ok(HostEnvironment {
        home,
        cwd,
        program,
        args: std::env::args().skip(1).collect(),
        is_root: nix::unistd::geteuid().is_root(),
    })
}

async fn run(host: &HostEnvironment) -> Result<(), InstallerError> {
    let config = InstallConfig::parse(&host.args, &host.home, &host.cwd)?;

    let settings = match dirs::config_dir() {
        Some(config_dir) => load_settings(&default_settings_path(&config_dir))?,
        None => {
            warn!("No config directory, using default settings");
            hyprism_installer::InstallerSettings::default()
        }
    };

    let client = ReleaseClient::new(&settings)?;
    let mut prompter = ConsolePrompter::stdio();
    let elevator = PkexecElevator;

    let report = Orchestrator {
        settings: &settings,
        host,
        client: &client,
        prompter: &mut prompter,
        elevator: &elevator,
    }
    .run(&config)
    .await?;

    info!(
        "Finished {:?} of {}",
        report.kind,
        report.executable.display()
    );
    Ok(())
}
