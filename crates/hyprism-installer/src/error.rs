// SPDX-License-Identifier: CC-BY-NC-ND-4.0

//! Error types for the installer crate

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum InstallerError {
    #[error("Unknown argument: {0}")]
    InvalidArgument(String),

    #[error("path {} does not exist", .0.display())]
    PathNotFound(PathBuf),

    #[error("permission denied: {0}")]
    PermissionDenied(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("{0} not found in latest release")]
    AssetNotFound(String),

    #[error("filesystem error: {0}")]
    Filesystem(#[from] std::io::Error),

    #[error("archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("settings error: {0}")]
    Settings(String),
}

impl InstallerError {
    /// Process exit status used when this error ends the run
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::InvalidArgument(_) => 2,
            Self::PathNotFound(_)
            | Self::PermissionDenied(_)
            | Self::Network(_)
            | Self::AssetNotFound(_)
            | Self::Filesystem(_)
            | Self::Archive(_)
            | Self::Settings(_) => 1,
        }
    }
}

impl From<reqwest::Error> for InstallerError {
    fn from(err: reqwest::Error) -> Self {
        Self::Network(err.to_string())
    }
}

impl From<serde_json::Error> for InstallerError {
    fn from(err: serde_json::Error) -> Self {
        Self::Settings(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, InstallerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_argument_names_token() {
        let err = InstallerError::InvalidArgument("-d".to_owned());
        assert_eq!(err.to_string(), "Unknown argument: -d");
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_fatal_errors_exit_with_one() {
        assert_eq!(InstallerError::Network("timeout".to_owned()).exit_code(), 1);
        assert_eq!(
            InstallerError::AssetNotFound("*.AppImage".to_owned()).exit_code(),
            1
        );
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk full");
        assert_eq!(InstallerError::from(io).exit_code(), 1);
    }

    #[test]
    fn test_asset_not_found_message() {
        let err = InstallerError::AssetNotFound("AppImage".to_owned());
        assert_eq!(err.to_string(), "AppImage not found in latest release");
    }
}
