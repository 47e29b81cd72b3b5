//! Process-wide invocation settings: the five template tokens framing the
//! generated program, and the interpreter executable.
//!
//! These are global. Configure them once at startup, before any concurrent
//! use; invocations snapshot them when an `Invoker` is created, so a change
//! never affects a call already in flight, but concurrent mutation still makes
//! the snapshot order-dependent.

use serde::{Deserialize, Serialize};
use std::sync::{OnceLock, RwLock};

use crate::config::InterpreterConfig;

pub const DEFAULT_PYTHON_EXECUTABLE: &str = "python3";

pub const INJECT_VAR_NAME_PREFIX_DEFAULT: &str = "__pyfunc_inject_";
pub const RETURN_VALUE_START_DEFAULT: &str = "__pyfunc_return_start__";
pub const RETURN_VALUE_END_DEFAULT: &str = "__pyfunc_return_end__";
pub const EXCEPTION_START_DEFAULT: &str = "__pyfunc_exception_start__";
pub const EXCEPTION_END_DEFAULT: &str = "__pyfunc_exception_end__";

/// Markers used by the generated program.
///
/// `inject_prefix` names the injected variables; the four delimiters frame the
/// result and exception payloads in the interpreter's standard output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateTokens {
    pub inject_prefix: String,
    pub return_start: String,
    pub return_end: String,
    pub exception_start: String,
    pub exception_end: String,
}

impl Default for TemplateTokens {
    fn default() -> Self {
        Self {
            inject_prefix: INJECT_VAR_NAME_PREFIX_DEFAULT.to_string(),
            return_start: RETURN_VALUE_START_DEFAULT.to_string(),
            return_end: RETURN_VALUE_END_DEFAULT.to_string(),
            exception_start: EXCEPTION_START_DEFAULT.to_string(),
            exception_end: EXCEPTION_END_DEFAULT.to_string(),
        }
    }
}

impl TemplateTokens {
    /// Prepend `prefix` to all five tokens.
    pub fn with_prefix(mut self, prefix: &str) -> Self {
        for token in [
            &mut self.inject_prefix,
            &mut self.return_start,
            &mut self.return_end,
            &mut self.exception_start,
            &mut self.exception_end,
        ] {
            token.insert_str(0, prefix);
        }
        self
    }
}

#[derive(Debug, Clone)]
struct Settings {
    tokens: TemplateTokens,
    executable: String,
}

impl Settings {
    fn initial() -> Self {
        let cfg = InterpreterConfig::from_env();
        let tokens = match cfg.token_prefix.as_deref() {
            Some(prefix) => TemplateTokens::default().with_prefix(prefix),
            None => TemplateTokens::default(),
        };
        Self {
            tokens,
            executable: cfg.executable,
        }
    }
}

fn settings() -> &'static RwLock<Settings> {
    static SETTINGS: OnceLock<RwLock<Settings>> = OnceLock::new();
    SETTINGS.get_or_init(|| RwLock::new(Settings::initial()))
}

fn read<T>(f: impl FnOnce(&Settings) -> T) -> T {
    let guard = settings().read().unwrap_or_else(|e| e.into_inner());
    f(&guard)
}

fn write(f: impl FnOnce(&mut Settings)) {
    let mut guard = settings().write().unwrap_or_else(|e| e.into_inner());
    f(&mut guard);
}

/// Snapshot of the current tokens.
pub fn tokens() -> TemplateTokens {
    read(|s| s.tokens.clone())
}

/// Replace all five tokens at once.
pub fn set_tokens(tokens: TemplateTokens) {
    write(|s| s.tokens = tokens);
}

pub fn inject_var_name_prefix() -> String {
    read(|s| s.tokens.inject_prefix.clone())
}

pub fn set_inject_var_name_prefix(value: impl Into<String>) {
    let value = value.into();
    write(|s| s.tokens.inject_prefix = value);
}

pub fn return_value_start() -> String {
    read(|s| s.tokens.return_start.clone())
}

pub fn set_return_value_start(value: impl Into<String>) {
    let value = value.into();
    write(|s| s.tokens.return_start = value);
}

pub fn return_value_end() -> String {
    read(|s| s.tokens.return_end.clone())
}

pub fn set_return_value_end(value: impl Into<String>) {
    let value = value.into();
    write(|s| s.tokens.return_end = value);
}

pub fn exception_start() -> String {
    read(|s| s.tokens.exception_start.clone())
}

pub fn set_exception_start(value: impl Into<String>) {
    let value = value.into();
    write(|s| s.tokens.exception_start = value);
}

pub fn exception_end() -> String {
    read(|s| s.tokens.exception_end.clone())
}

pub fn set_exception_end(value: impl Into<String>) {
    let value = value.into();
    write(|s| s.tokens.exception_end = value);
}

/// Prepend `prefix` to every current token.
pub fn add_tokens_prefix(prefix: &str) {
    write(|s| s.tokens = s.tokens.clone().with_prefix(prefix));
}

/// Restore the five tokens to their documented defaults. The executable is
/// left untouched.
pub fn reset_tokens() {
    write(|s| s.tokens = TemplateTokens::default());
}

pub fn python_executable() -> String {
    read(|s| s.executable.clone())
}

pub fn set_python_executable(value: impl Into<String>) {
    let value = value.into();
    write(|s| s.executable = value);
}
