//! Maps a raw request target onto a file below the document root.
//!
//! The containment check runs on the fully decoded and normalized absolute
//! path, never on the raw target, so `..` segments and percent-encoded
//! separators cannot climb out of the root.

use std::path::{Component, Path, PathBuf};

use crate::config::home_dir;
use crate::error::SecurityError;

/// Resolves `target` against `root` and returns the path relative to `root`.
///
/// `/` maps to `default_page`. A leading `~` is replaced by the server's home
/// directory, which then lands *inside* the root once leading slashes are
/// stripped. The query string and fragment are ignored.
pub fn resolve(target: &str, root: &Path, default_page: &str) -> Result<PathBuf, SecurityError> {
    let path = target.split(['?', '#']).next().unwrap_or_default();

    let mut requested = if path == "/" {
        default_page.to_string()
    } else {
        path.to_string()
    };

    if let (Some(rest), Some(home)) = (requested.strip_prefix('~'), home_dir()) {
        let expanded = format!("{}{}", home.display(), rest);
        requested = expanded;
    }

    let decoded = urlencoding::decode(&requested)
        .map_err(|_| SecurityError::MalformedTarget(target.to_string()))?;
    let relative = Path::new(decoded.trim_start_matches('/'));

    let root = normalize(root);
    let resolved = normalize(&root.join(relative));

    match resolved.strip_prefix(&root) {
        Ok(inside) => Ok(inside.to_path_buf()),
        Err(_) => Err(SecurityError::Traversal(target.to_string())),
    }
}

/// Collapses `.` and `..` without touching the filesystem.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                // `..` at the root stays at the root
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(".."),
            },
            other => out.push(other.as_os_str()),
        }
    }

    out
}
