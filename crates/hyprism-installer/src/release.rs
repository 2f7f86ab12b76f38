// SPDX-License-Identifier: CC-BY-NC-ND-4.0

//! GitHub release API client

use crate::config::{AssetMatcher, InstallerSettings, USER_AGENT};
use crate::error::{InstallerError, Result};
use reqwest::header::ACCEPT;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(15);

/// GitHub release asset
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReleaseAsset {
    /// Asset name (e.g., "HyPrism-1.4.0-x86_64.AppImage")
    pub name: String,
    /// Download URL
    #[serde(rename = "browser_download_url")]
    pub download_url: String,
}

/// The parts of a GitHub release the installer reads
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Release {
    #[serde(default)]
    pub tag_name: Option<String>,
    #[serde(default)]
    pub assets: Vec<ReleaseAsset>,
}

impl Release {
    /// First asset accepted by `matcher`
    pub fn find_asset(&self, matcher: &AssetMatcher) -> Option<&ReleaseAsset> {
        self.assets.iter().find(|a| matcher.matches(&a.name))
    }

    pub fn select_asset(&self, matcher: &AssetMatcher) -> Result<&ReleaseAsset> {
        self.find_asset(matcher)
            .ok_or_else(|| InstallerError::AssetNotFound(matcher.describe()))
    }
}

/// HTTP client for release metadata and downloads
#[derive(Debug, Clone)]
pub struct ReleaseClient {
    client: reqwest::Client,
    latest_url: String,
    request_timeout: Duration,
}

impl ReleaseClient {
    pub fn new(settings: &InstallerSettings) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(|e| InstallerError::Network(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            latest_url: settings.latest_release_url(),
            request_timeout: Duration::from_secs(settings.http_timeout_secs),
        })
    }

    /// Fetch the latest published release
    pub async fn latest_release(&self) -> Result<Release> {
        debug!("GET {}", self.latest_url);

        let response = self
            .client
            .get(&self.latest_url)
            .header(ACCEPT, "application/vnd.github+json")
            .timeout(self.request_timeout)
            .send()
            .await
            .map_err(|e| InstallerError::Network(format!("Request failed: {e}")))?;

        if let Some(remaining) = response.headers().get("x-ratelimit-remaining")
            && let Ok(remaining_str) = remaining.to_str()
            && let Ok(remaining_int) = remaining_str.parse::<u32>()
            && remaining_int < 10
        {
            warn!("GitHub rate limit low: {remaining_int} remaining");
        }

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error body".to_owned());
            return Err(InstallerError::Network(format!(
                "GitHub API error {status}: {body}"
            )));
        }

        response
            .json()
            .await
            .map_err(|e| InstallerError::Network(format!("Failed to parse release: {e}")))
    }

    /// Start a download; the body is consumed by the caller as a stream
    pub async fn open_download(&self, url: &str) -> Result<reqwest::Response> {
        debug!("GET {url}");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| InstallerError::Network(format!("Download request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(InstallerError::Network(format!(
                "Download failed with status: {}",
                response.status()
            )));
        }

        Ok(response)
    }

    /// Fetch a small file into memory (the icon)
    pub async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>> {
        let response = self
            .client
            .get(url)
            .timeout(self.request_timeout)
            .send()
            .await
            .map_err(|e| InstallerError::Network(format!("Request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(InstallerError::Network(format!(
                "GET {url} failed with status: {}",
                response.status()
            )));
        }

        let bytes = response.bytes().await?;
        Ok(bytes.to_vec())
    }
}
