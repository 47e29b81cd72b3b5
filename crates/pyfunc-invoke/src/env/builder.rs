//! Compute the search-path value handed to the spawned interpreter.

use std::ffi::OsString;
use std::path::Path;

use super::SearchPath;
use crate::error::InvokeError;

/// What the child process's `PYTHONPATH` should be.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChildSearchPath {
    /// Leave the inherited variable alone.
    Inherit,
    /// Set the variable to this value before spawning.
    Set(OsString),
}

impl ChildSearchPath {
    /// Display form recorded in the invocation result.
    pub fn display_value(&self, base: &SearchPath) -> Option<String> {
        match self {
            Self::Set(v) => Some(v.to_string_lossy().into_owned()),
            Self::Inherit => base.raw().map(|v| v.to_string_lossy().into_owned()),
        }
    }
}

/// Decide the child's search path.
///
/// `overridden` is true when `base` did not come from the inherited
/// environment, in which case the child must see it explicitly even without
/// an extra entry.
pub fn child_search_path(
    base: &SearchPath,
    extra: Option<&Path>,
    overridden: bool,
) -> Result<ChildSearchPath, InvokeError> {
    match extra {
        Some(dir) => base
            .appended(dir)
            .map(ChildSearchPath::Set)
            .map_err(|e| InvokeError::process("build PYTHONPATH", e)),
        None if overridden => Ok(ChildSearchPath::Set(
            base.raw().map(OsString::from).unwrap_or_default(),
        )),
        None => Ok(ChildSearchPath::Inherit),
    }
}
