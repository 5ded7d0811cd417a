//! Path handling for template references

use std::path::{Component, Path, PathBuf};

use directories::BaseDirs;

/// Expands a leading `~` to the user's home directory
///
/// Paths without the shorthand, or when no home directory can be determined,
/// are returned unchanged.
pub fn expand_home(path: impl AsRef<Path>) -> PathBuf {
    let path = path.as_ref();
    let Ok(rest) = path.strip_prefix("~") else {
        return path.to_path_buf();
    };

    match BaseDirs::new() {
        Some(dirs) => dirs.home_dir().join(rest),
        None => path.to_path_buf(),
    }
}

/// Canonical identity of a template reference
///
/// Joins `reference` onto `base` after home expansion of both, then removes
/// `.` and `..` components lexically. An absolute reference ignores `base`.
pub fn canonical_path(base: &Path, reference: &str) -> PathBuf {
    let joined = expand_home(base).join(expand_home(reference));
    normalize(&joined)
}

fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                // Never pop past the root or a prefix
                let popped = matches!(out.components().next_back(), Some(Component::Normal(_)))
                    && out.pop();
                if !popped && !out.has_root() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}
