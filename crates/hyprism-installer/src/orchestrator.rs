// SPDX-License-Identifier: CC-BY-NC-ND-4.0

//! One installer run: backup, install, shortcuts

use crate::backup::{BackupOutcome, BackupRequest, run_backup_step};
use crate::cli::InstallConfig;
use crate::config::InstallerSettings;
use crate::elevation::Elevator;
use crate::error::Result;
use crate::host::HostEnvironment;
use crate::installer::{executable_path, install_latest};
use crate::interrupt::ExitCodeScope;
use crate::prompt::Prompter;
use crate::release::ReleaseClient;
use crate::shortcut::{ShortcutRequest, install_shortcuts};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::info;

const SUPPORT_MESSAGE: &str =
    "Enjoying HyPrism? Consider supporting its developers on the project's GitHub page.";

/// Whether the install directory already holds an executable
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunKind {
    FreshInstall,
    Update,
}

impl RunKind {
    pub fn detect(install_dir: &Path) -> Self {
        if executable_path(install_dir).exists() {
            Self::Update
        } else {
            Self::FreshInstall
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// `--no-shortcut`
    Disabled,
    /// Routine update without `--yes`
    Update,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortcutPlan {
    Skip(SkipReason),
    Install,
    Ask,
}

/// Decide what the shortcut step does
pub fn plan_shortcuts(no_shortcut: bool, assume_yes: bool, kind: RunKind) -> ShortcutPlan {
    if no_shortcut {
        ShortcutPlan::Skip(SkipReason::Disabled)
    } else if assume_yes {
        ShortcutPlan::Install
    } else if kind == RunKind::Update {
        ShortcutPlan::Skip(SkipReason::Update)
    } else {
        ShortcutPlan::Ask
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShortcutOutcome {
    Skipped(SkipReason),
    Declined,
    Installed(Vec<PathBuf>),
}

/// What a completed run did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub kind: RunKind,
    pub install_dir: PathBuf,
    /// `None` on a fresh install
    pub backup: Option<BackupOutcome>,
    pub executable: PathBuf,
    pub shortcuts: ShortcutOutcome,
}

pub struct Orchestrator<'a> {
    pub settings: &'a InstallerSettings,
    pub host: &'a HostEnvironment,
    pub client: &'a ReleaseClient,
    pub prompter: &'a mut dyn Prompter,
    pub elevator: &'a dyn Elevator,
}

impl fmt::Debug for Orchestrator<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Orchestrator")
            .field("settings", &self.settings)
            .field("host", &self.host)
            .finish_non_exhaustive()
    }
}

impl Orchestrator<'_> {
    pub async fn run(&mut self, config: &InstallConfig) -> Result<RunReport> {
        if config.show_support {
            println!("{SUPPORT_MESSAGE}");
        }

        let install_dir = config.install_dir_or_default(&self.host.home);
        let kind = RunKind::detect(&install_dir);
        info!("Install directory {} ({kind:?})", install_dir.display());

        let backup = match kind {
            RunKind::FreshInstall => None,
            RunKind::Update => {
                println!("Update detected in {}", install_dir.display());
                Some(self.backup(config, &install_dir)?)
            }
        };

        let executable = install_latest(&install_dir, self.client, &self.settings.asset).await?;

        let shortcuts = self
            .shortcuts(config, kind, &executable, &install_dir)
            .await?;

        Ok(RunReport {
            kind,
            install_dir,
            backup,
            executable,
            shortcuts,
        })
    }

    fn backup(&mut self, config: &InstallConfig, install_dir: &Path) -> Result<BackupOutcome> {
        if config.no_backup {
            println!("Skipping backup (--no-backup)");
            return Ok(BackupOutcome::Disabled);
        }

        // Ctrl-C while backing up exits cleanly
        let _scope = ExitCodeScope::enter(0);
        run_backup_step(
            &BackupRequest {
                install_dir,
                host: self.host,
                elevated: config.elevated,
            },
            &mut *self.prompter,
            self.elevator,
        )
    }

    async fn shortcuts(
        &mut self,
        config: &InstallConfig,
        kind: RunKind,
        executable: &Path,
        install_dir: &Path,
    ) -> Result<ShortcutOutcome> {
        match plan_shortcuts(config.no_shortcut, config.assume_yes, kind) {
            ShortcutPlan::Skip(reason) => {
                match reason {
                    SkipReason::Disabled => println!("Skipping shortcuts."),
                    SkipReason::Update => println!("Skipping shortcuts on update."),
                }
                return Ok(ShortcutOutcome::Skipped(reason));
            }
            ShortcutPlan::Ask => {
                if !self
                    .prompter
                    .confirm("Do you want to create a desktop shortcut?")?
                {
                    println!("Ok, skipping shortcuts.");
                    return Ok(ShortcutOutcome::Declined);
                }
            }
            ShortcutPlan::Install => {}
        }

        let paths = install_shortcuts(
            &ShortcutRequest {
                executable,
                install_dir,
                host: self.host,
                icon: &self.settings.icon,
            },
            self.client,
        )
        .await?;
        Ok(ShortcutOutcome::Installed(paths))
    }
}
