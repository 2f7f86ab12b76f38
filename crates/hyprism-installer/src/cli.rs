// SPDX-License-Identifier: CC-BY-NC-ND-4.0

//! Command line parsing
//!
//! Tokens are matched exactly. There are no short aliases beyond the ones
//! listed here and no `--dir <path>` form.

use crate::error::{InstallerError, Result};
use crate::paths::resolve_user_path;
use std::path::{Path, PathBuf};

/// Marker appended by the installer when it re-runs itself through pkexec
pub const ELEVATED_FLAG: &str = "--elevated";

const DIR_PREFIX: &str = "--dir=";

/// Options for one installer run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstallConfig {
    /// Absolute install directory, if `--dir=` was given
    pub install_dir: Option<PathBuf>,
    pub no_shortcut: bool,
    pub no_backup: bool,
    /// `--yes`: install shortcuts without asking (does not answer the backup prompt)
    pub assume_yes: bool,
    /// `-c` / `-coffe`
    pub show_support: bool,
    /// Set when this process is the pkexec re-run
    pub elevated: bool,
}

impl InstallConfig {
    /// Parse argv (without the program name).
    ///
    /// `home` and `cwd` are used to resolve `--dir=`.
    pub fn parse<S: AsRef<str>>(args: &[S], home: &Path, cwd: &Path) -> Result<Self> {
        let mut config = Self::default();

        for arg in args {
            let arg = arg.as_ref();
            match arg {
                "--no-shortcut" => config.no_shortcut = true,
                "--no-backup" => config.no_backup = true,
                "--yes" => config.assume_yes = true,
                "-c" | "-coffe" => config.show_support = true,
                ELEVATED_FLAG => config.elevated = true,
                _ => {
                    let Some(raw) = arg.strip_prefix(DIR_PREFIX) else {
                        return Err(InstallerError::InvalidArgument(arg.to_owned()));
                    };
                    if raw.is_empty() {
                        return Err(InstallerError::InvalidArgument(arg.to_owned()));
                    }
                    config.install_dir = Some(resolve_user_path(raw, home, cwd));
                }
            }
        }

        Ok(config)
    }

    /// `--dir=` value, or `<home>/Applications/HyPrism`
    pub fn install_dir_or_default(&self, home: &Path) -> PathBuf {
        self.install_dir
            .clone()
            .unwrap_or_else(|| home.join("Applications").join("HyPrism"))
    }
}

/// Build the `--dir=` token for a resolved install directory
pub fn dir_arg(install_dir: &Path) -> String {
    format!("{DIR_PREFIX}{}", install_dir.display())
}

#[cfg(test)]
mod tests {
    use super::*;

    const HOME: &str = "/home/alex";
    const CWD: &str = "/work";

    fn parse(args: &[&str]) -> Result<InstallConfig> {
        InstallConfig::parse(args, Path::new(HOME), Path::new(CWD))
    }

    #[test]
    fn test_no_args_gives_defaults() {
        let config = parse(&[]).unwrap();
        assert_eq!(config, InstallConfig::default());
        assert_eq!(
            config.install_dir_or_default(Path::new(HOME)),
            PathBuf::from("/home/alex/Applications/HyPrism")
        );
    }

    #[test]
    fn test_all_flags() {
        let config = parse(&["--no-shortcut", "--no-backup", "--yes", "-c", "--elevated"]).unwrap();
        assert!(config.no_shortcut);
        assert!(config.no_backup);
        assert!(config.assume_yes);
        assert!(config.show_support);
        assert!(config.elevated);
        assert!(config.install_dir.is_none());
    }

    #[test]
    fn test_each_flag_sets_only_its_field() {
        let config = parse(&["--yes"]).unwrap();
        assert_eq!(
            config,
            InstallConfig {
                assume_yes: true,
                ..InstallConfig::default()
            }
        );

        let config = parse(&["-coffe"]).unwrap();
        assert_eq!(
            config,
            InstallConfig {
                show_support: true,
                ..InstallConfig::default()
            }
        );
    }

    #[test]
    fn test_order_and_duplicates() {
        let a = parse(&["--yes", "--no-backup", "--yes"]).unwrap();
        let b = parse(&["--no-backup", "--yes"]).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_dir_last_wins() {
        let config = parse(&["--dir=/opt/a", "--no-backup", "--dir=/opt/b"]).unwrap();
        assert_eq!(config.install_dir, Some(PathBuf::from("/opt/b")));
    }

    #[test]
    fn test_dir_tilde_matches_manual_join() {
        let config = parse(&["--dir=~/x"]).unwrap();
        assert_eq!(config.install_dir, Some(Path::new(HOME).join("x")));
    }

    #[test]
    fn test_dir_relative_is_made_absolute() {
        let config = parse(&["--dir=games/../HyPrism"]).unwrap();
        assert_eq!(config.install_dir, Some(PathBuf::from("/work/HyPrism")));
    }

    #[test]
    fn test_unknown_token_is_named() {
        for token in ["-d", "--dir", "--Yes", "yes", "--no-shortcuts", "--coffe", ""] {
            let err = parse(&["--yes", token]).unwrap_err();
            match err {
                InstallerError::InvalidArgument(name) => assert_eq!(name, token),
                other => panic!("unexpected error for {token:?}: {other}"),
            }
        }
    }

    #[test]
    fn test_empty_dir_is_rejected() {
        let err = parse(&["--dir="]).unwrap_err();
        assert!(matches!(err, InstallerError::InvalidArgument(ref t) if t == "--dir="));
    }

    #[test]
    fn test_dir_arg_roundtrips_through_parser() {
        let token = dir_arg(Path::new("/opt/Hy Prism"));
        let config = parse(&[token.as_str()]).unwrap();
        assert_eq!(config.install_dir, Some(PathBuf::from("/opt/Hy Prism")));
    }
}
