//! Path-safety checks for names and paths that come from remote documents.

use crate::error::{LauncherError, LauncherResult};
use std::path::{Component, Path, PathBuf};

/// Join a remote-supplied relative path onto `base`, rejecting anything that
/// could escape it (absolute paths, drive prefixes, `..`).
pub fn safe_join(base: &Path, relative: &str) -> LauncherResult<PathBuf> {
    let rel = Path::new(relative);
    if relative.trim().is_empty() {
        return Err(LauncherError::InvalidPath("empty relative path".to_string()));
    }

    let mut clean = PathBuf::new();
    for component in rel.components() {
        match component {
            Component::Normal(part) => clean.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(LauncherError::InvalidPath(relative.to_string()));
            }
        }
    }

    if clean.as_os_str().is_empty() {
        return Err(LauncherError::InvalidPath(relative.to_string()));
    }
    Ok(base.join(clean))
}

/// Reduce a remote-supplied file name to a plain single component.
pub fn safe_file_name(name: &str) -> LauncherResult<&str> {
    let trimmed = name.trim();
    let is_plain = !trimmed.is_empty()
        && trimmed != "."
        && trimmed != ".."
        && !trimmed.contains(['/', '\\'])
        && !trimmed.contains(':');
    if is_plain {
        Ok(trimmed)
    } else {
        Err(LauncherError::InvalidPath(name.to_string()))
    }
}

/// Asset object hashes are used as directory and file names, so they must be
/// plain hex of at least two characters.
pub fn validate_object_hash(hash: &str) -> LauncherResult<()> {
    if hash.len() >= 2 && hash.bytes().all(|b| b.is_ascii_hexdigit()) {
        Ok(())
    } else {
        Err(LauncherError::InvalidPath(format!("asset hash '{}'", hash)))
    }
}
