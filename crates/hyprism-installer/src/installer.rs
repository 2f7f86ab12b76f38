// SPDX-License-Identifier: CC-BY-NC-ND-4.0

//! Install or update the HyPrism AppImage from the latest release

use crate::config::{AssetMatcher, EXECUTABLE_NAME};
use crate::downloader::download_to;
use crate::error::Result;
use crate::release::ReleaseClient;
use std::path::{Path, PathBuf};
use tracing::info;

/// Path of the installed executable inside `install_dir`
pub fn executable_path(install_dir: &Path) -> PathBuf {
    install_dir.join(EXECUTABLE_NAME)
}

/// Fetch the latest release and put its AppImage at `<install_dir>/HyPrism.AppImage`.
///
/// Returns the path of the installed executable.
pub async fn install_latest(
    install_dir: &Path,
    client: &ReleaseClient,
    matcher: &AssetMatcher,
) -> Result<PathBuf> {
    tokio::fs::create_dir_all(install_dir).await?;

    let release = client.latest_release().await?;
    info!(
        "Latest release: {}",
        release.tag_name.as_deref().unwrap_or("(untagged)")
    );

    let asset = release.select_asset(matcher)?;
    info!("Selected asset {}", asset.name);

    let target = executable_path(install_dir);
    println!("Downloading latest HyPrism...");
    download_to(client, &asset.download_url, &target).await?;

    println!("HyPrism installed/updated successfully at: {}", target.display());
    Ok(target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::InstallerSettings;
    use crate::downloader::staging_path;
    use crate::error::InstallerError;
    use mockito::Server;
    use serde_json::json;
    use tempfile::TempDir;

    const LATEST_PATH: &str = "/repos/yyyumeniku/HyPrism/releases/latest";

    #[tokio::test]
    async fn test_install_creates_dir_and_executable() {
        let mut server = Server::new_async().await;
        let release = json!({
            "tag_name": "v2.0.0",
            "assets": [
                { "name": "HyPrism-2.0.0.zip", "browser_download_url": format!("{}/zip", server.url()) },
                { "name": "HyPrism-2.0.0.AppImage", "browser_download_url": format!("{}/appimage", server.url()) }
            ]
        });
        let _api = server
            .mock("GET", LATEST_PATH)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(release.to_string())
            .create_async()
            .await;
        let download = server
            .mock("GET", "/appimage")
            .with_status(200)
            .with_body("ELF...")
            .expect(1)
            .create_async()
            .await;
        let zip = server
            .mock("GET", "/zip")
            .expect(0)
            .create_async()
            .await;

        let root = TempDir::new().unwrap();
        let install_dir = root.path().join("Applications").join("HyPrism");
        let settings = InstallerSettings {
            api_base_url: Some(server.url()),
            ..InstallerSettings::default()
        };
        let client = ReleaseClient::new(&settings).unwrap();

        let path = install_latest(&install_dir, &client, &settings.asset)
            .await
            .unwrap();

        assert_eq!(path, install_dir.join("HyPrism.AppImage"));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "ELF...");
        assert!(!staging_path(&path).exists());

        download.assert_async().await;
        zip.assert_async().await;
    }

    #[tokio::test]
    async fn test_no_matching_asset_writes_nothing() {
        let mut server = Server::new_async().await;
        let _api = server
            .mock("GET", LATEST_PATH)
            .with_status(200)
            .with_body(json!({ "assets": [{ "name": "HyPrism.exe", "browser_download_url": "x" }] }).to_string())
            .create_async()
            .await;

        let dir = TempDir::new().unwrap();
        let settings = InstallerSettings {
            api_base_url: Some(server.url()),
            ..InstallerSettings::default()
        };
        let client = ReleaseClient::new(&settings).unwrap();

        let err = install_latest(dir.path(), &client, &settings.asset)
            .await
            .unwrap_err();

        assert!(matches!(err, InstallerError::AssetNotFound(_)));
        assert!(!executable_path(dir.path()).exists());
        assert!(!staging_path(&executable_path(dir.path())).exists());
    }
}
