//! Search-path index: the ordered directories the interpreter would consult.

use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

use pyfunc_core::config::env_keys::interpreter::PYTHONPATH;

/// Ordered module search directories, read from `PYTHONPATH`-style values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchPath {
    raw: Option<OsString>,
    entries: Vec<PathBuf>,
}

impl SearchPath {
    /// Read from the inherited process environment.
    pub fn from_env() -> Self {
        Self::from_value(std::env::var_os(PYTHONPATH))
    }

    /// Build from an explicit value. Blank entries are skipped: they would
    /// otherwise match every script under the working directory.
    pub fn from_value(raw: Option<OsString>) -> Self {
        let entries = raw
            .as_deref()
            .map(|v| {
                std::env::split_paths(v)
                    .filter(|p| !p.to_string_lossy().trim().is_empty())
                    .collect()
            })
            .unwrap_or_default();
        Self { raw, entries }
    }

    pub fn entries(&self) -> &[PathBuf] {
        &self.entries
    }

    /// The variable's value as read, blank entries included. An unset or
    /// empty variable gives `None`.
    pub fn raw(&self) -> Option<&OsStr> {
        self.raw.as_deref().filter(|v| !v.is_empty())
    }

    /// Value with `extra` appended after the existing entries, joined with
    /// the platform path-list separator.
    pub fn appended(&self, extra: &Path) -> Result<OsString, std::env::JoinPathsError> {
        match self.raw() {
            Some(existing) => {
                let mut parts: Vec<PathBuf> = std::env::split_paths(existing).collect();
                parts.push(extra.to_path_buf());
                std::env::join_paths(parts)
            }
            None => std::env::join_paths([extra]),
        }
    }
}
