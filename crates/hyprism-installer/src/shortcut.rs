// SPDX-License-Identifier: CC-BY-NC-ND-4.0

//! Desktop shortcuts
//!
//! Writes the same `.desktop` entry to the user's desktop and to the
//! applications menu, and caches the icon next to the executable.

use crate::config::{ICON_FILE_NAME, IconSource};
use crate::downloader::set_mode;
use crate::error::Result;
use crate::host::HostEnvironment;
use crate::release::ReleaseClient;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

pub const DESKTOP_FILE_NAME: &str = "HyPrism.desktop";

const ICON_MODE: u32 = 0o644;
const DESKTOP_FILE_MODE: u32 = 0o755;

/// `~/Desktop/HyPrism.desktop` and `~/.local/share/applications/HyPrism.desktop`
pub fn shortcut_paths(home: &Path) -> [PathBuf; 2] {
    [
        home.join("Desktop").join(DESKTOP_FILE_NAME),
        home.join(".local")
            .join("share")
            .join("applications")
            .join(DESKTOP_FILE_NAME),
    ]
}

/// Value for the `Exec` key.
///
/// `%` is doubled so it is not read as a field code. Paths with spaces or
/// quotes are quoted, and the string-level escaping doubles every backslash
/// on top of the quoting.
fn exec_value(executable: &Path) -> String {
    let raw = executable.display().to_string().replace('%', "%%");
    let needs_quotes = raw
        .chars()
        .any(|c| c.is_whitespace() || matches!(c, '"' | '\'' | '`' | '$' | '\\'));
    if !needs_quotes {
        return raw;
    }

    let mut quoted = String::with_capacity(raw.len() + 2);
    quoted.push('"');
    for c in raw.chars() {
        if matches!(c, '"' | '`' | '$' | '\\') {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('"');
    quoted.replace('\\', "\\\\")
}

/// The desktop entry text for `executable`
pub fn desktop_entry(executable: &Path, install_dir: &Path) -> String {
    format!(
        "[Desktop Entry]\n\
         Name=HyPrism\n\
         Comment=Hytale Launcher\n\
         Exec={exec}\n\
         TryExec={try_exec}\n\
         Icon={icon}\n\
         Terminal=false\n\
         Type=Application\n\
         Categories=Game;\n\
         StartupWMClass=HyPrism\n",
        exec = exec_value(executable),
        try_exec = executable.display(),
        icon = install_dir.join(ICON_FILE_NAME).display(),
    )
}

/// Put the icon at `<install_dir>/HyPrism_icon.png` unless it is already there.
///
/// Relative bundled paths are resolved against `program_dir`. A missing
/// bundled icon is skipped and `None` is returned.
pub async fn install_icon(
    install_dir: &Path,
    source: &IconSource,
    program_dir: &Path,
    client: &ReleaseClient,
) -> Result<Option<PathBuf>> {
    let icon_path = install_dir.join(ICON_FILE_NAME);
    if tokio::fs::try_exists(&icon_path).await? {
        println!("Icon already exists, skipping download.");
        return Ok(Some(icon_path));
    }

    match source {
        IconSource::Remote { url } => {
            let bytes = client.fetch_bytes(url).await?;
            tokio::fs::write(&icon_path, bytes).await?;
            println!("Icon downloaded.");
        }
        IconSource::Bundled { path } => {
            let bundled = program_dir.join(path);
            if !tokio::fs::try_exists(&bundled).await? {
                warn!("Bundled icon {} not found, skipping", bundled.display());
                return Ok(None);
            }
            debug!("Copying bundled icon {}", bundled.display());
            tokio::fs::copy(&bundled, &icon_path).await?;
            println!("Icon copied.");
        }
    }

    set_mode(&icon_path, ICON_MODE).await?;
    Ok(Some(icon_path))
}

/// Overwrite every path in `paths` with `entry`
pub async fn write_desktop_entries(entry: &str, paths: &[PathBuf]) -> Result<()> {
    for path in paths {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(path, entry).await?;
        set_mode(path, DESKTOP_FILE_MODE).await?;
        info!("Wrote {}", path.display());
    }
    Ok(())
}

#[derive(Debug)]
pub struct ShortcutRequest<'a> {
    /// Installed executable
    pub executable: &'a Path,
    pub install_dir: &'a Path,
    pub host: &'a HostEnvironment,
    pub icon: &'a IconSource,
}

/// Install the icon and both desktop entries. Returns the entry paths.
pub async fn install_shortcuts(
    request: &ShortcutRequest<'_>,
    client: &ReleaseClient,
) -> Result<Vec<PathBuf>> {
    install_icon(
        request.install_dir,
        request.icon,
        request.host.program_dir(),
        client,
    )
    .await?;

    let entry = desktop_entry(request.executable, request.install_dir);
    let paths = shortcut_paths(&request.host.home).to_vec();
    write_desktop_entries(&entry, &paths).await?;

    println!("Shortcuts created/updated.");
    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::InstallerSettings;
    use crate::error::InstallerError;
    use mockito::Server;
    use std::os::unix::fs::PermissionsExt;
    use tempfile::TempDir;

    fn host(home: &Path, program_dir: &Path) -> HostEnvironment {
        HostEnvironment {
            home: home.to_path_buf(),
            cwd: home.to_path_buf(),
            program: program_dir.join("hyprism-installer"),
            args: Vec::new(),
            is_root: false,
        }
    }

    fn mode(path: &Path) -> u32 {
        std::fs::metadata(path).unwrap().permissions().mode() & 0o777
    }

    #[test]
    fn test_desktop_entry_text() {
        let entry = desktop_entry(
            Path::new("/home/alex/Applications/HyPrism/HyPrism.AppImage"),
            Path::new("/home/alex/Applications/HyPrism"),
        );
        assert_eq!(
            entry,
            "[Desktop Entry]\n\
             Name=HyPrism\n\
             Comment=Hytale Launcher\n\
             Exec=/home/alex/Applications/HyPrism/HyPrism.AppImage\n\
             TryExec=/home/alex/Applications/HyPrism/HyPrism.AppImage\n\
             Icon=/home/alex/Applications/HyPrism/HyPrism_icon.png\n\
             Terminal=false\n\
             Type=Application\n\
             Categories=Game;\n\
             StartupWMClass=HyPrism\n"
        );
    }

    #[test]
    fn test_exec_with_spaces_is_quoted() {
        let entry = desktop_entry(
            Path::new("/home/alex/My Games/HyPrism.AppImage"),
            Path::new("/home/alex/My Games"),
        );
        assert!(entry.contains("\nExec=\"/home/alex/My Games/HyPrism.AppImage\"\n"));
        assert!(entry.contains("\nTryExec=/home/alex/My Games/HyPrism.AppImage\n"));
    }

    #[test]
    fn test_exec_escaping() {
        assert_eq!(
            exec_value(Path::new("/opt/100%/HyPrism.AppImage")),
            "/opt/100%%/HyPrism.AppImage"
        );
        assert_eq!(
            exec_value(Path::new("/opt/a\"b/HyPrism.AppImage")),
            r#""/opt/a\\"b/HyPrism.AppImage""#
        );
        assert_eq!(
            exec_value(Path::new("/opt/a\\b/HyPrism.AppImage")),
            r#""/opt/a\\\\b/HyPrism.AppImage""#
        );
        assert_eq!(
            exec_value(Path::new("/opt/$HOME/HyPrism.AppImage")),
            r#""/opt/\\$HOME/HyPrism.AppImage""#
        );
    }

    #[test]
    fn test_shortcut_paths() {
        let [desktop, menu] = shortcut_paths(Path::new("/home/alex"));
        assert_eq!(desktop, PathBuf::from("/home/alex/Desktop/HyPrism.desktop"));
        assert_eq!(
            menu,
            PathBuf::from("/home/alex/.local/share/applications/HyPrism.desktop")
        );
    }

    #[tokio::test]
    async fn test_rerun_is_byte_identical_and_fetches_icon_once() {
        let mut server = Server::new_async().await;
        let icon_mock = server
            .mock("GET", "/Hyprism.png")
            .with_status(200)
            .with_body([0x89, b'P', b'N', b'G'])
            .expect(1)
            .create_async()
            .await;

        let home = TempDir::new().unwrap();
        let install_dir = home.path().join("Applications/HyPrism");
        std::fs::create_dir_all(&install_dir).unwrap();
        let executable = install_dir.join("HyPrism.AppImage");
        let host = host(home.path(), home.path());
        let icon = IconSource::Remote {
            url: format!("{}/Hyprism.png", server.url()),
        };
        let client = ReleaseClient::new(&InstallerSettings::default()).unwrap();
        let request = ShortcutRequest {
            executable: &executable,
            install_dir: &install_dir,
            host: &host,
            icon: &icon,
        };

        let first = install_shortcuts(&request, &client).await.unwrap();
        let first_bytes: Vec<_> = first.iter().map(|p| std::fs::read(p).unwrap()).collect();

        let second = install_shortcuts(&request, &client).await.unwrap();
        let second_bytes: Vec<_> = second.iter().map(|p| std::fs::read(p).unwrap()).collect();

        assert_eq!(first, second);
        assert_eq!(first_bytes, second_bytes);
        assert_eq!(first_bytes[0], first_bytes[1]);
        for path in &first {
            assert_eq!(mode(path), 0o755, "{}", path.display());
        }

        let icon_path = install_dir.join(ICON_FILE_NAME);
        assert_eq!(std::fs::read(&icon_path).unwrap(), [0x89, b'P', b'N', b'G']);
        assert_eq!(mode(&icon_path), 0o644);

        icon_mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_existing_icon_is_not_fetched() {
        let mut server = Server::new_async().await;
        let icon_mock = server
            .mock("GET", "/Hyprism.png")
            .expect(0)
            .create_async()
            .await;

        let install_dir = TempDir::new().unwrap();
        std::fs::write(install_dir.path().join(ICON_FILE_NAME), b"cached").unwrap();
        let client = ReleaseClient::new(&InstallerSettings::default()).unwrap();

        let path = install_icon(
            install_dir.path(),
            &IconSource::Remote {
                url: format!("{}/Hyprism.png", server.url()),
            },
            install_dir.path(),
            &client,
        )
        .await
        .unwrap();

        assert_eq!(std::fs::read(path.unwrap()).unwrap(), b"cached");
        icon_mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_bundled_icon_relative_to_program_dir() {
        let program_dir = TempDir::new().unwrap();
        std::fs::create_dir(program_dir.path().join("assets")).unwrap();
        std::fs::write(program_dir.path().join("assets/icon.png"), b"bundled").unwrap();
        let install_dir = TempDir::new().unwrap();
        let client = ReleaseClient::new(&InstallerSettings::default()).unwrap();

        let path = install_icon(
            install_dir.path(),
            &IconSource::Bundled {
                path: PathBuf::from("assets/icon.png"),
            },
            program_dir.path(),
            &client,
        )
        .await
        .unwrap();

        let path = path.unwrap();
        assert_eq!(path, install_dir.path().join(ICON_FILE_NAME));
        assert_eq!(std::fs::read(&path).unwrap(), b"bundled");
        assert_eq!(mode(&path), 0o644);
    }

    #[tokio::test]
    async fn test_missing_bundled_icon_still_writes_entries() {
        let home = TempDir::new().unwrap();
        let install_dir = home.path().join("HyPrism");
        std::fs::create_dir_all(&install_dir).unwrap();
        let executable = install_dir.join("HyPrism.AppImage");
        let host = host(home.path(), home.path());
        let icon = IconSource::Bundled {
            path: PathBuf::from("assets/missing.png"),
        };
        let client = ReleaseClient::new(&InstallerSettings::default()).unwrap();

        let paths = install_shortcuts(
            &ShortcutRequest {
                executable: &executable,
                install_dir: &install_dir,
                host: &host,
                icon: &icon,
            },
            &client,
        )
        .await
        .unwrap();

        assert_eq!(paths, shortcut_paths(home.path()));
        for path in &paths {
            let entry = std::fs::read_to_string(path).unwrap();
            assert_eq!(entry, desktop_entry(&executable, &install_dir));
            assert_eq!(mode(path), 0o755);
        }
        assert!(!install_dir.join(ICON_FILE_NAME).exists());
    }

    #[tokio::test]
    async fn test_icon_failure_writes_no_entries() {
        let mut server = Server::new_async().await;
        let _icon = server
            .mock("GET", "/Hyprism.png")
            .with_status(404)
            .create_async()
            .await;

        let home = TempDir::new().unwrap();
        let install_dir = home.path().join("HyPrism");
        std::fs::create_dir_all(&install_dir).unwrap();
        let executable = install_dir.join("HyPrism.AppImage");
        let host = host(home.path(), home.path());
        let icon = IconSource::Remote {
            url: format!("{}/Hyprism.png", server.url()),
        };
        let client = ReleaseClient::new(&InstallerSettings::default()).unwrap();

        let err = install_shortcuts(
            &ShortcutRequest {
                executable: &executable,
                install_dir: &install_dir,
                host: &host,
                icon: &icon,
            },
            &client,
        )
        .await
        .unwrap_err();

        assert!(matches!(err, InstallerError::Network(_)));
        for path in shortcut_paths(home.path()) {
            assert!(!path.exists());
        }
    }
}
