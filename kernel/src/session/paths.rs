//! Path resolution for diff sides.

use std::path::{Component, Path, PathBuf};

/// Resolves `raw` against `base` into the absolute form used as the watch
/// and registry key.
///
/// Existing files are canonicalized. For a file that does not exist yet the
/// parent directory is canonicalized instead, so the key still matches the
/// paths reported by the watcher once the file appears.
#[must_use]
pub fn resolve_path(raw: &str, base: &Path) -> PathBuf {
    let joined = if Path::new(raw).is_absolute() {
        PathBuf::from(raw)
    } else {
        base.join(raw)
    };

    if let Ok(canonical) = dunce::canonicalize(&joined) {
        return canonical;
    }

    let lexical = normalize_lexically(&joined);
    match (lexical.parent(), lexical.file_name()) {
        (Some(parent), Some(name)) => dunce::canonicalize(parent)
            .map(|p| p.join(name))
            .unwrap_or(lexical),
        _ => lexical,
    }
}

/// Removes `.` and `..` components without touching the filesystem.
fn normalize_lexically(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// The working directory used when a request carries no hint.
#[must_use]
pub fn process_cwd() -> PathBuf {
    std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}
