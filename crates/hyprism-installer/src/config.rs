// SPDX-License-Identifier: CC-BY-NC-ND-4.0

//! Installer settings
//!
//! Settings are optional. When the file is absent every field takes its
//! default, which installs the upstream HyPrism release.

use crate::error::{InstallerError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Fixed name of the installed executable
pub const EXECUTABLE_NAME: &str = "HyPrism.AppImage";

/// Fixed name of the cached icon inside the install directory
pub const ICON_FILE_NAME: &str = "HyPrism_icon.png";

pub const USER_AGENT: &str = "HyPrism-installer";

const DEFAULT_API_BASE_URL: &str = "https://api.github.com";
const DEFAULT_ICON_URL: &str =
    "https://raw.githubusercontent.com/yyyumeniku/HyPrism/main/assets/Hyprism.png";

fn default_owner() -> String {
    "yyyumeniku".to_owned()
}

fn default_repo() -> String {
    "HyPrism".to_owned()
}

fn default_suffix() -> String {
    ".AppImage".to_owned()
}

fn default_30() -> u64 {
    30
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct InstallerSettings {
    /// GitHub owner of the upstream project
    #[serde(default = "default_owner")]
    pub repo_owner: String,

    /// GitHub repository of the upstream project
    #[serde(default = "default_repo")]
    pub repo_name: String,

    /// Custom API base URL (overrides the public GitHub API)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_base_url: Option<String>,

    /// Which release asset to install
    #[serde(default)]
    pub asset: AssetMatcher,

    /// Where the desktop icon comes from
    #[serde(default)]
    pub icon: IconSource,

    /// Timeout for release metadata and icon requests (seconds)
    #[serde(default = "default_30")]
    pub http_timeout_secs: u64,
}

impl Default for InstallerSettings {
    fn default() -> Self {
        Self {
            repo_owner: default_owner(),
            repo_name: default_repo(),
            api_base_url: None,
            asset: AssetMatcher::default(),
            icon: IconSource::default(),
            http_timeout_secs: 30,
        }
    }
}

impl InstallerSettings {
    pub fn latest_release_url(&self) -> String {
        let base = self
            .api_base_url
            .as_deref()
            .unwrap_or(DEFAULT_API_BASE_URL)
            .trim_end_matches('/');
        format!(
            "{base}/repos/{}/{}/releases/latest",
            self.repo_owner, self.repo_name
        )
    }
}

/// Release asset selection: name suffix plus an optional architecture marker
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AssetMatcher {
    #[serde(default = "default_suffix")]
    pub suffix: String,

    /// e.g. "x64"; `None` accepts any architecture
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arch_marker: Option<String>,
}

impl Default for AssetMatcher {
    fn default() -> Self {
        Self {
            suffix: default_suffix(),
            arch_marker: None,
        }
    }
}

impl AssetMatcher {
    pub fn matches(&self, name: &str) -> bool {
        name.ends_with(&self.suffix)
            && self
                .arch_marker
                .as_deref()
                .is_none_or(|marker| name.contains(marker))
    }

    /// Human-readable pattern, used in `AssetNotFound`
    pub fn describe(&self) -> String {
        match &self.arch_marker {
            Some(marker) => format!("asset matching *{marker}*{}", self.suffix),
            None => format!("asset matching *{}", self.suffix),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum IconSource {
    /// Download from a URL
    Remote { url: String },
    /// Copy a file shipped with the installer. Relative paths are resolved
    /// against the installer executable's directory.
    Bundled { path: PathBuf },
}

impl Default for IconSource {
    fn default() -> Self {
        Self::Remote {
            url: DEFAULT_ICON_URL.to_owned(),
        }
    }
}

/// Default settings location: `<config_dir>/hyprism-installer/settings.json`
pub fn default_settings_path(config_dir: &Path) -> PathBuf {
    config_dir.join("hyprism-installer").join("settings.json")
}

/// Load settings, falling back to defaults when the file does not exist
pub fn load_settings(path: &Path) -> Result<InstallerSettings> {
    if !path.exists() {
        return Ok(InstallerSettings::default());
    }

    let content = std::fs::read_to_string(path)?;
    serde_json::from_str(&content).map_err(|e| {
        InstallerError::Settings(format!("Failed to parse {}: {e}", path.display()))
    })
}
