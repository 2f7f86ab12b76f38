// SPDX-License-Identifier: CC-BY-NC-ND-4.0

//! Privilege elevation through pkexec
//!
//! The installer never elevates more than once: the re-run carries
//! `--elevated`, and a process that has the marker but still is not root
//! gives up with `PermissionDenied`.

use crate::cli::{ELEVATED_FLAG, dir_arg};
use crate::error::{InstallerError, Result};
use nix::unistd::{AccessFlags, access, execvp};
use std::convert::Infallible;
use std::ffi::{CString, OsStr};
use std::os::unix::ffi::OsStrExt;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElevationDecision {
    /// We can already write; carry on
    Proceed,
    /// Re-run the installer through the elevation wrapper
    Reexec,
    /// Already re-ran once and still lack rights
    Deny,
}

pub fn decide(writable: bool, is_root: bool, already_elevated: bool) -> ElevationDecision {
    if writable || is_root {
        ElevationDecision::Proceed
    } else if already_elevated {
        ElevationDecision::Deny
    } else {
        ElevationDecision::Reexec
    }
}

pub fn is_writable(path: &Path) -> bool {
    access(path, AccessFlags::W_OK).is_ok()
}

/// Command line for the elevated re-run
///
/// The re-run sees root's environment, so anything derived from `$HOME`
/// (default install dir, shortcut locations) resolves against root's home.
/// Only the install dir is pinned through `--dir=`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElevationRequest {
    pub program: PathBuf,
    pub args: Vec<String>,
}

impl ElevationRequest {
    /// Original args, then the resolved install dir, then the marker.
    ///
    /// The explicit `--dir=` keeps the root re-run installing into the
    /// caller's directory instead of root's home.
    pub fn new(program: &Path, original_args: &[String], install_dir: &Path) -> Self {
        let mut args = original_args.to_vec();
        args.push(dir_arg(install_dir));
        args.push(ELEVATED_FLAG.to_owned());

        Self {
            program: program.to_path_buf(),
            args,
        }
    }
}

pub trait Elevator {
    /// Whether this process may write `path` without elevating
    fn can_write(&self, path: &Path) -> bool {
        is_writable(path)
    }

    /// Replace the current process with an elevated copy. Returns only on failure.
    fn reexec(&self, request: &ElevationRequest) -> Result<Infallible>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct PkexecElevator;

fn c_string(value: &OsStr) -> Result<CString> {
    CString::new(value.as_bytes()).map_err(|_| {
        InstallerError::PermissionDenied(format!(
            "cannot pass {} to pkexec: contains a NUL byte",
            value.to_string_lossy()
        ))
    })
}

impl Elevator for PkexecElevator {
    fn reexec(&self, request: &ElevationRequest) -> Result<Infallible> {
        let mut argv = vec![c_string(OsStr::new("pkexec"))?, c_string(request.program.as_os_str())?];
        for arg in &request.args {
            argv.push(c_string(OsStr::new(arg))?);
        }

        info!("Re-running installer through pkexec");
        match execvp(&argv[0], &argv) {
            Ok(never) => match never {},
            Err(errno) => Err(InstallerError::PermissionDenied(format!(
                "pkexec failed or was cancelled: {errno}"
            ))),
        }
    }
}

/// Make sure `path` can be written, elevating once if needed.
pub fn ensure_writable(
    path: &Path,
    is_root: bool,
    already_elevated: bool,
    request: &ElevationRequest,
    elevator: &dyn Elevator,
) -> Result<()> {
    match decide(elevator.can_write(path), is_root, already_elevated) {
        ElevationDecision::Proceed => Ok(()),
        ElevationDecision::Reexec => {
            warn!("{} is not writable, requesting elevation", path.display());
            match elevator.reexec(request)? {}
        }
        ElevationDecision::Deny => Err(InstallerError::PermissionDenied(
            "pkexec failed or was cancelled".to_owned(),
        )),
    }
}
