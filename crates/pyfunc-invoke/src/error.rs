use std::time::Duration;

use thiserror::Error;

/// Every way a call can fail. Errors are values carried in the
/// `InvocationResult`; nothing in the pipeline retries.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvokeError {
    #[error("python script not exists: {0}")]
    ScriptNotFound(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("can not serialize {what} to json value: {message}")]
    Encoding { what: String, message: String },

    #[error("invoke python function error: {stage}: {message}")]
    Process { stage: &'static str, message: String },

    /// Exception raised by the target function; holds the formatted trace.
    #[error("{0}")]
    Runtime(String),

    /// Anything on the interpreter's standard error, e.g. a syntax error in
    /// the generated program or an unimportable module.
    #[error("{0}")]
    Crash(String),

    #[error("python process killed: exceeded timeout of {}s", .0.as_secs_f64())]
    Timeout(Duration),

    #[error("can not decode result {payload:?} into {target}: {message}")]
    Decode {
        target: &'static str,
        payload: String,
        message: String,
    },

    #[error("varargs is not of sequence type: got {0}")]
    ArgumentShape(String),

    #[error("return type is not set")]
    MissingReturnType,
}

impl InvokeError {
    pub(crate) fn process(stage: &'static str, err: impl std::fmt::Display) -> Self {
        Self::Process {
            stage,
            message: err.to_string(),
        }
    }

    pub(crate) fn encoding(what: impl Into<String>, err: impl std::fmt::Display) -> Self {
        Self::Encoding {
            what: what.into(),
            message: err.to_string(),
        }
    }

    /// True when the target function itself raised, as opposed to the call
    /// never reaching it.
    pub fn is_runtime(&self) -> bool {
        matches!(self, Self::Runtime(_))
    }
}
