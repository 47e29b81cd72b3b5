//! Config structs grouped by concern, loaded from the environment.

use super::env_keys::{interpreter as interp_keys, observability as obv_keys};
use super::loader::{env_bool, env_optional, env_or};
use std::time::Duration;

/// Interpreter selection and per-call limits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterpreterConfig {
    /// Executable name or path (default `python3`)
    pub executable: String,
    /// Bounded wait per call; `None` waits until the interpreter exits
    pub timeout: Option<Duration>,
    /// Prefix prepended to every template token, if configured
    pub token_prefix: Option<String>,
}

impl InterpreterConfig {
    /// Load from the current process environment.
    pub fn from_env() -> Self {
        let executable = env_or(
            interp_keys::PYFUNC_PYTHON,
            interp_keys::PYTHON_ALIASES,
            || crate::settings::DEFAULT_PYTHON_EXECUTABLE.to_string(),
        );
        let timeout = env_optional(interp_keys::PYFUNC_TIMEOUT_SECS, &[])
            .and_then(|s| s.parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs);
        let token_prefix = env_optional(interp_keys::PYFUNC_TOKEN_PREFIX, &[]);
        Self {
            executable,
            timeout,
            token_prefix,
        }
    }
}

/// Observability config: quiet, log_level, log_json, audit_log
#[derive(Debug, Clone)]
pub struct ObservabilityConfig {
    pub quiet: bool,
    pub log_level: String,
    pub log_json: bool,
    pub audit_log: Option<String>,
}

impl ObservabilityConfig {
    pub fn from_env() -> &'static Self {
        use std::sync::OnceLock;
        static CACHE: OnceLock<ObservabilityConfig> = OnceLock::new();
        CACHE.get_or_init(|| Self {
            quiet: env_bool(obv_keys::PYFUNC_QUIET, &[], false),
            log_level: env_or(obv_keys::PYFUNC_LOG_LEVEL, &[], || "pyfunc=info".to_string()),
            log_json: env_bool(obv_keys::PYFUNC_LOG_JSON, &[], false),
            audit_log: env_optional(obv_keys::PYFUNC_AUDIT_LOG, &[]),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::loader::dotenv_loaded;

    #[test]
    fn test_reading_config_leaves_process_env_alone() {
        let interp = InterpreterConfig::from_env();
        assert!(!interp.executable.is_empty());
        let _ = ObservabilityConfig::from_env();
        let _ = crate::settings::tokens();
        assert!(!dotenv_loaded());
    }
}
