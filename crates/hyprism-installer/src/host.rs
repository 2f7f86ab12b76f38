// SPDX-License-Identifier: CC-BY-NC-ND-4.0

//! Process-level facts the steps depend on, gathered once by the binary

use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostEnvironment {
    /// Home directory of the invoking user
    pub home: PathBuf,
    /// Working directory, used to resolve relative paths
    pub cwd: PathBuf,
    /// Path of the running installer executable
    pub program: PathBuf,
    /// Command line arguments without the program name
    pub args: Vec<String>,
    /// Effective uid is 0
    pub is_root: bool,
}

impl HostEnvironment {
    /// Directory holding the installer executable (bundled assets live here)
    pub fn program_dir(&self) -> &Path {
        self.program.parent().unwrap_or(&self.cwd)
    }
}
