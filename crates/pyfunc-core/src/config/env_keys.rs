//! Environment variable key constants.
//!
//! Primary variables use the `PYFUNC_*` prefix; a few interpreter-level aliases
//! are honoured for convenience.

/// Interpreter selection and invocation limits
pub mod interpreter {
    /// Executable used to run generated scripts (default `python3`)
    pub const PYFUNC_PYTHON: &str = "PYFUNC_PYTHON";
    pub const PYTHON_ALIASES: &[&str] = &["PYTHON"];

    /// Bounded wait per call, in seconds. Unset or `0` waits forever.
    pub const PYFUNC_TIMEOUT_SECS: &str = "PYFUNC_TIMEOUT_SECS";

    /// Prefix prepended to all template tokens at startup
    pub const PYFUNC_TOKEN_PREFIX: &str = "PYFUNC_TOKEN_PREFIX";

    /// Module search path variable read by the interpreter
    pub const PYTHONPATH: &str = "PYTHONPATH";
}

/// Observability and logging
pub mod observability {
    pub const PYFUNC_QUIET: &str = "PYFUNC_QUIET";
    pub const PYFUNC_LOG_LEVEL: &str = "PYFUNC_LOG_LEVEL";
    pub const PYFUNC_LOG_JSON: &str = "PYFUNC_LOG_JSON";
    pub const PYFUNC_AUDIT_LOG: &str = "PYFUNC_AUDIT_LOG";
}
