// SPDX-License-Identifier: CC-BY-NC-ND-4.0

//! HyPrism installer
//!
//! Installs or updates the HyPrism AppImage from the latest GitHub release,
//! optionally backing up the game data first and creating desktop shortcuts
//! afterwards.

pub mod backup;
pub mod cli;
pub mod config;
pub mod downloader;
pub mod elevation;
pub mod error;
pub mod host;
pub mod installer;
pub mod interrupt;
pub mod orchestrator;
pub mod paths;
pub mod prompt;
pub mod release;
pub mod shortcut;

pub use cli::InstallConfig;
pub use config::InstallerSettings;
pub use error::{InstallerError, Result};
pub use host::HostEnvironment;
pub use orchestrator::{Orchestrator, RunReport};
