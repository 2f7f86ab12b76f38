// SPDX-License-Identifier: CC-BY-NC-ND-4.0

//! Staged binary download
//!
//! The body is streamed into `<dest>.tmp`. The destination is only touched
//! once the whole body has been written, so an interrupted download never
//! leaves a truncated executable behind.

use crate::error::{InstallerError, Result};
use crate::release::ReleaseClient;
use futures_util::{Stream, StreamExt};
use std::ffi::OsString;
use std::fmt::Display;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

/// Write granularity for the staging file
pub const DOWNLOAD_CHUNK_SIZE: usize = 8 * 1024;

/// `<dest>.tmp`, next to the destination
pub fn staging_path(dest: &Path) -> PathBuf {
    let mut name = dest
        .file_name()
        .map_or_else(OsString::new, ToOwned::to_owned);
    name.push(".tmp");
    dest.with_file_name(name)
}

/// Write a byte stream to `staging`, returning the number of bytes written.
///
/// On a stream error the partial staging file is left in place.
pub async fn write_staged<S, B, E>(stream: S, staging: &Path) -> Result<u64>
where
    S: Stream<Item = std::result::Result<B, E>>,
    B: AsRef<[u8]>,
    E: Display,
{
    let mut stream = std::pin::pin!(stream);
    let mut file = tokio::fs::File::create(staging).await?;
    let mut written = 0u64;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| InstallerError::Network(format!("Download interrupted: {e}")))?;
        for piece in chunk.as_ref().chunks(DOWNLOAD_CHUNK_SIZE) {
            file.write_all(piece).await?;
            written += piece.len() as u64;
        }
    }

    file.flush().await?;
    file.sync_all().await?;
    Ok(written)
}

/// Move a finished staging file over `dest` and make it executable.
///
/// The old file is removed first; rename-over-existing is not relied on.
pub async fn promote(staging: &Path, dest: &Path) -> Result<()> {
    if tokio::fs::try_exists(dest).await? {
        debug!("Removing previous {}", dest.display());
        tokio::fs::remove_file(dest).await?;
    }
    tokio::fs::rename(staging, dest).await?;
    set_mode(dest, 0o755).await
}

/// chmod
pub async fn set_mode(path: &Path, mode: u32) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    tokio::fs::set_permissions(path, std::fs::Permissions::from_mode(mode)).await?;
    Ok(())
}

/// Download `url` into `dest` through a staging file
pub async fn download_to(client: &ReleaseClient, url: &str, dest: &Path) -> Result<u64> {
    let staging = staging_path(dest);
    let response = client.open_download(url).await?;

    let written = write_staged(response.bytes_stream(), &staging).await?;
    info!("Downloaded {written} bytes to {}", staging.display());

    promote(&staging, dest).await?;
    Ok(written)
}
