//! Import resolver: turn a script path into the specifier used by the
//! generated program's `from ... import ...` line.
//!
//! The first search-path entry containing the script wins. When none does,
//! the script's own directory is handed back as an extra search entry and the
//! bare module name is used.

use std::path::{Component, Path, PathBuf};

use crate::env::SearchPath;

/// How the generated program imports the target module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportTarget {
    /// Dotted module specifier, e.g. `b.c.helpers`
    pub specifier: String,
    /// Directory that must be appended to the child's search path
    pub extra_path: Option<PathBuf>,
}

/// Resolve `script` against `search_path`. Always succeeds; existence of the
/// file is checked by the invoker.
pub fn resolve_import(script: &Path, search_path: &SearchPath) -> ImportTarget {
    if let Some(specifier) = relative_import(script, search_path) {
        tracing::debug!(script = %script.display(), %specifier, "Resolved import via search path");
        return ImportTarget {
            specifier,
            extra_path: None,
        };
    }
    let target = absolute_import(script);
    tracing::debug!(
        script = %script.display(),
        specifier = %target.specifier,
        extra_path = ?target.extra_path,
        "Script not under any search path entry, injecting its directory"
    );
    target
}

fn relative_import(script: &Path, search_path: &SearchPath) -> Option<String> {
    search_path
        .entries()
        .iter()
        .find_map(|dir| relative_to(dir, script))
        .map(|rel| specifier_from_relative(&rel))
}

fn absolute_import(script: &Path) -> ImportTarget {
    let abs = absolutize(script);
    let specifier = abs
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    ImportTarget {
        specifier,
        extra_path: abs.parent().map(Path::to_path_buf),
    }
}

/// Path of `sub` relative to `dir` when `sub` lies strictly inside `dir`.
pub(crate) fn relative_to(dir: &Path, sub: &Path) -> Option<PathBuf> {
    let dir = absolutize(dir);
    let sub = absolutize(sub);
    let rel = sub.strip_prefix(&dir).ok()?;
    if rel.as_os_str().is_empty() {
        return None;
    }
    Some(rel.to_path_buf())
}

/// Dotted specifier for a relative path: separators become `.`, the file
/// extension is dropped, and parent-directory segments become leading dots.
pub(crate) fn specifier_from_relative(rel: &Path) -> String {
    let mut leading = String::new();
    let mut parts: Vec<String> = Vec::new();
    let components: Vec<Component> = rel.components().collect();
    let last = components.len().saturating_sub(1);
    for (i, component) in components.into_iter().enumerate() {
        match component {
            Component::ParentDir => leading.push('.'),
            Component::Normal(name) if i == last => {
                let stem = Path::new(name)
                    .file_stem()
                    .unwrap_or(name)
                    .to_string_lossy()
                    .into_owned();
                parts.push(stem);
            }
            Component::Normal(name) => parts.push(name.to_string_lossy().into_owned()),
            _ => {}
        }
    }
    format!("{}{}", leading, parts.join("."))
}

/// Absolute, lexically normalised form of `path` (no symlink resolution,
/// so the file need not exist).
pub(crate) fn absolutize(path: &Path) -> PathBuf {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map(|cwd| cwd.join(path))
            .unwrap_or_else(|_| path.to_path_buf())
    };
    let mut out = PathBuf::new();
    for component in joined.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push(component);
                }
            }
            other => out.push(other),
        }
    }
    out
}
