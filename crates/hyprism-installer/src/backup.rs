// SPDX-License-Identifier: CC-BY-NC-ND-4.0

//! Pre-update backup of the game data directory

use crate::elevation::{ElevationRequest, Elevator, ensure_writable};
use crate::error::{InstallerError, Result};
use crate::host::HostEnvironment;
use crate::paths::resolve_user_path;
use crate::prompt::Prompter;
use chrono::{DateTime, Local};
use std::fs;
use std::io::{self, Seek, Write};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

const BACKUP_PREFIX: &str = "HyPrism_backup_";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackupOutcome {
    /// `--no-backup`
    Disabled,
    /// Operator did not confirm
    Declined,
    /// The given source directory does not exist
    SourceMissing(PathBuf),
    /// Archive written
    Created(PathBuf),
}

/// `<install_dir>/HyPrism_backup_<YYYYMMDD_HHMMSS>.zip`
pub fn backup_archive_path(install_dir: &Path, timestamp: DateTime<Local>) -> PathBuf {
    install_dir.join(format!(
        "{BACKUP_PREFIX}{}.zip",
        timestamp.format("%Y%m%d_%H%M%S")
    ))
}

/// Everything the backup step needs besides the operator
#[derive(Debug)]
pub struct BackupRequest<'a> {
    pub install_dir: &'a Path,
    pub host: &'a HostEnvironment,
    /// This process is already the elevated re-run
    pub elevated: bool,
}

/// Ask for confirmation and a source directory, then archive it.
///
/// Declining and a missing source are not errors.
pub fn run_backup_step(
    request: &BackupRequest<'_>,
    prompter: &mut dyn Prompter,
    elevator: &dyn Elevator,
) -> Result<BackupOutcome> {
    println!("Backup Hytale");

    if !prompter.confirm("Do you want a backup (just in case)?")? {
        println!("Skipping backup");
        return Ok(BackupOutcome::Declined);
    }

    let raw = prompter.read_path("Path to your current HyPrism/game_version (not HyPrism folder)")?;
    let source = resolve_user_path(&raw, &request.host.home, &request.host.cwd);

    if !source.exists() {
        println!("Path {} does not exist. Skipping backup.", source.display());
        info!("{}", InstallerError::PathNotFound(source.clone()));
        return Ok(BackupOutcome::SourceMissing(source));
    }

    let elevation = ElevationRequest::new(
        &request.host.program,
        &request.host.args,
        request.install_dir,
    );
    ensure_writable(
        &source,
        request.host.is_root,
        request.elevated,
        &elevation,
        elevator,
    )?;

    let archive = backup_archive_path(request.install_dir, Local::now());
    println!(
        "Creating backup: {} from {}",
        archive.display(),
        source.display()
    );
    create_backup_archive(&source, &archive)?;
    println!("Backup created successfully.");

    Ok(BackupOutcome::Created(archive))
}

/// Zip the contents of `source` into `archive`.
///
/// Entry names are relative to `source`. A partial archive is removed on failure.
pub fn create_backup_archive(source: &Path, archive: &Path) -> Result<()> {
    if let Some(parent) = archive.parent() {
        fs::create_dir_all(parent)?;
    }

    let result = write_archive(source, archive);
    if result.is_err() && archive.exists() {
        if let Err(e) = fs::remove_file(archive) {
            warn!("Failed to remove partial backup {}: {e}", archive.display());
        }
    }
    result
}

fn write_archive(source: &Path, archive: &Path) -> Result<()> {
    let file = fs::File::create(archive)?;
    let mut zip = ZipWriter::new(file);

    add_dir(&mut zip, source, "", archive)?;

    zip.finish()?;
    info!("Created backup at {}", archive.display());
    Ok(())
}

fn add_dir<W: Write + Seek>(
    zip: &mut ZipWriter<W>,
    dir: &Path,
    prefix: &str,
    archive: &Path,
) -> Result<()> {
    let mut entries = fs::read_dir(dir)?.collect::<io::Result<Vec<_>>>()?;
    entries.sort_by_key(fs::DirEntry::file_name);

    for entry in entries {
        let path = entry.path();
        if path == archive {
            continue;
        }

        let name = format!("{prefix}{}", entry.file_name().to_string_lossy());
        let file_type = entry.file_type()?;
        let metadata = match fs::metadata(&path) {
            Ok(metadata) => metadata,
            Err(e) if file_type.is_symlink() => {
                warn!("Skipping broken link {}: {e}", path.display());
                continue;
            }
            Err(e) => return Err(e.into()),
        };
        let options = entry_options(&metadata);

        if file_type.is_dir() {
            zip.add_directory(format!("{name}/"), options)?;
            add_dir(zip, &path, &format!("{name}/"), archive)?;
        } else if metadata.is_file() {
            zip.start_file(name, options)?;
            let mut src = fs::File::open(&path)?;
            io::copy(&mut src, zip)?;
        } else {
            // symlinked directories and special files
            warn!("Not archiving {}", path.display());
        }
    }

    Ok(())
}

fn entry_options(metadata: &fs::Metadata) -> SimpleFileOptions {
    use std::os::unix::fs::PermissionsExt;

    SimpleFileOptions::default()
        .compression_method(zip::CompressionMethod::Deflated)
        .unix_permissions(metadata.permissions().mode() & 0o7777)
        .large_file(metadata.len() >= u64::from(u32::MAX))
}
