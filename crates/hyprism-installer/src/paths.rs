// SPDX-License-Identifier: CC-BY-NC-ND-4.0

//! User path expansion against an explicit home and working directory

use std::path::{Component, Path, PathBuf};

/// Expand `~`, make the path absolute and normalize it lexically.
///
/// Symlinks are left alone, so `~/x` always becomes `home.join("x")`.
pub fn resolve_user_path(raw: &str, home: &Path, cwd: &Path) -> PathBuf {
    let expanded = shellexpand::tilde_with_context(raw, || home.to_str());
    let path = Path::new(expanded.as_ref());

    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        cwd.join(path)
    };

    normalize(&absolute)
}

fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            Component::Prefix(_) | Component::RootDir | Component::Normal(_) => {
                out.push(component.as_os_str());
            }
        }
    }
    out
}
