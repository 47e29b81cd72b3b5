//! Call pipeline: resolve, assemble, spawn, parse.

use std::ffi::{OsStr, OsString};
use std::time::{Duration, Instant};

use pyfunc_core::config::env_keys::interpreter::PYTHONPATH;
use pyfunc_core::config::InterpreterConfig;
use pyfunc_core::{observability, settings, TemplateTokens, DEFAULT_PYTHON_EXECUTABLE};
use serde::Serialize;
use serde_json::Value;

use crate::env::{child_search_path, ChildSearchPath, SearchPath};
use crate::error::InvokeError;
use crate::func::Func;
use crate::info_log;
use crate::output::parse_output;
use crate::request::{expand_sequence, InvocationRequest};
use crate::result::InvocationResult;
use crate::runner::{run_interpreter, ProcessSpec};
use crate::script::{generate_script, GeneratedScript};

/// Everything a call reads from configuration, captured up front.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvokeConfig {
    pub tokens: TemplateTokens,
    pub executable: String,
    /// `None` waits until the interpreter exits
    pub timeout: Option<Duration>,
    /// Replaces the inherited `PYTHONPATH` when set
    pub search_path: Option<OsString>,
}

impl Default for InvokeConfig {
    fn default() -> Self {
        Self {
            tokens: TemplateTokens::default(),
            executable: DEFAULT_PYTHON_EXECUTABLE.to_string(),
            timeout: None,
            search_path: None,
        }
    }
}

impl InvokeConfig {
    /// Snapshot of the process-wide settings plus the configured timeout.
    pub fn current() -> Self {
        Self {
            tokens: settings::tokens(),
            executable: settings::python_executable(),
            timeout: InterpreterConfig::from_env().timeout,
            search_path: None,
        }
    }

    pub fn with_tokens(mut self, tokens: TemplateTokens) -> Self {
        self.tokens = tokens;
        self
    }

    pub fn with_executable(mut self, executable: impl Into<String>) -> Self {
        self.executable = executable.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_search_path(mut self, search_path: impl Into<OsString>) -> Self {
        self.search_path = Some(search_path.into());
        self
    }

    fn base_search_path(&self) -> SearchPath {
        match &self.search_path {
            Some(raw) => SearchPath::from_value(Some(raw.clone())),
            None => SearchPath::from_env(),
        }
    }
}

/// Runs requests against one fixed configuration. Holds no mutable state, so
/// a shared `Invoker` can serve several threads.
#[derive(Debug, Clone, Default)]
pub struct Invoker {
    config: InvokeConfig,
}

impl Invoker {
    pub fn new(config: InvokeConfig) -> Self {
        Self { config }
    }

    pub fn from_settings() -> Self {
        Self::new(InvokeConfig::current())
    }

    pub fn config(&self) -> &InvokeConfig {
        &self.config
    }

    /// Program text for `request`, without running it.
    pub fn generate(&self, request: &InvocationRequest) -> Result<GeneratedScript, InvokeError> {
        generate_script(request, &self.config.tokens, &self.config.base_search_path())
    }

    /// Typed builder bound to this invoker.
    pub fn func<R>(&self, script: impl Into<std::path::PathBuf>, function: impl Into<String>) -> Func<R> {
        Func::new(script, function).with_invoker(self.clone())
    }

    /// Run one request to completion. Never panics on a failing call; the
    /// failure is in the returned result.
    pub fn invoke(&self, request: &InvocationRequest) -> InvocationResult {
        let script_display = request.script.display().to_string();
        if !request.script.is_file() {
            tracing::warn!(script = %script_display, "Script not found");
            return InvocationResult::failed(InvokeError::ScriptNotFound(script_display));
        }

        let base = self.config.base_search_path();
        let generated = match generate_script(request, &self.config.tokens, &base) {
            Ok(g) => g,
            Err(e) => return InvocationResult::failed(e),
        };
        tracing::debug!(
            specifier = %generated.specifier,
            extra_path = ?generated.extra_path,
            "Resolved import"
        );
        tracing::debug!(script = %generated.text, "Generated program");

        let mut result = InvocationResult {
            script: generated.text.clone(),
            ..InvocationResult::default()
        };

        let child = match child_search_path(
            &base,
            generated.extra_path.as_deref(),
            self.config.search_path.is_some(),
        ) {
            Ok(c) => c,
            Err(e) => {
                result.error = Some(e);
                return result;
            }
        };
        result.python_path = child.display_value(&base);

        let mut env = Vec::new();
        if let ChildSearchPath::Set(value) = child {
            env.push((OsStr::new(PYTHONPATH), value));
        }

        let arg_count = request.effective_args().len();
        observability::audit_invocation_started(
            &script_display,
            &request.function,
            &self.config.executable,
            arg_count,
        );
        info_log!(
            "Invoking {}.{} with {} ({} args)",
            generated.specifier,
            request.function,
            self.config.executable,
            arg_count
        );

        let started = Instant::now();
        let spec = ProcessSpec {
            executable: &self.config.executable,
            program: &generated.text,
            env,
            timeout: self.config.timeout,
        };
        let outcome = run_interpreter(&spec);
        let duration_ms = started.elapsed().as_millis() as u64;

        match outcome {
            Ok(out) => {
                let (payload, error) = parse_output(&out.stdout, &out.stderr, &self.config.tokens);
                result.output = format!("{}{}", out.stdout, out.stderr);
                result.exit_code = out.exit_code;
                result.payload = payload;
                result.error = error;
            }
            Err(failure) => {
                result.output = format!("{}{}", failure.output.stdout, failure.output.stderr);
                result.exit_code = failure.output.exit_code;
                result.error = Some(failure.error);
            }
        }

        observability::audit_invocation_completed(
            &script_display,
            &request.function,
            result.is_success(),
            duration_ms,
            result.output.len(),
        );
        match &result.error {
            None => tracing::info!(
                function = %request.function,
                exit_code = ?result.exit_code,
                duration_ms,
                "Interpreter exited"
            ),
            Some(e) => tracing::warn!(
                function = %request.function,
                exit_code = ?result.exit_code,
                duration_ms,
                "Invocation failed: {}",
                e
            ),
        }
        result
    }
}

/// Call `function` in `script` with positional JSON values, using the
/// current process-wide settings.
pub fn invoke(script: impl AsRef<std::path::Path>, function: &str, args: &[Value]) -> InvocationResult {
    let request = InvocationRequest::new(script.as_ref(), function).with_args(args.to_vec());
    Invoker::from_settings().invoke(&request)
}

/// Like [`invoke`], but takes any serializable sequence as the argument list:
/// a tuple, array, `Vec` or `()` for none.
pub fn call<T: Serialize + ?Sized>(
    script: impl AsRef<std::path::Path>,
    function: &str,
    args: &T,
) -> InvocationResult {
    match expand_sequence(args) {
        Ok(args) => invoke(script, function, &args),
        Err(e) => InvocationResult::failed(e),
    }
}
