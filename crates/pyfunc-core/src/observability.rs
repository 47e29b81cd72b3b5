//! Observability: tracing init and the JSONL audit log.
//!
//! Uses `config::ObservabilityConfig` for PYFUNC_QUIET, PYFUNC_LOG_LEVEL,
//! PYFUNC_LOG_JSON and PYFUNC_AUDIT_LOG.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;

use chrono::Utc;
use serde_json::json;
use tracing_subscriber::{prelude::*, EnvFilter};

static AUDIT_PATH: Mutex<Option<String>> = Mutex::new(None);

/// Initialize tracing. Call at process startup.
/// When PYFUNC_QUIET=1 only WARN and above are logged.
pub fn init_tracing() {
    let cfg = crate::config::ObservabilityConfig::from_env();
    let level = if cfg.quiet {
        "pyfunc=warn".to_string()
    } else {
        cfg.log_level.clone()
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&level));

    let _ = if cfg.log_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_writer(std::io::stderr),
            )
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_writer(std::io::stderr),
            )
            .try_init()
    };
}

fn get_audit_path() -> Option<String> {
    {
        let guard = AUDIT_PATH.lock().ok()?;
        if let Some(ref p) = *guard {
            return Some(p.clone());
        }
    }
    let path = crate::config::ObservabilityConfig::from_env().audit_log.clone()?;
    if path.is_empty() {
        return None;
    }
    if let Some(parent) = Path::new(&path).parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    {
        let mut guard = AUDIT_PATH.lock().ok()?;
        *guard = Some(path.clone());
    }
    Some(path)
}

fn append_jsonl(path: &str, record: &serde_json::Value) {
    if let Ok(mut f) = OpenOptions::new().create(true).append(true).open(path) {
        if let Ok(line) = serde_json::to_string(record) {
            let _ = writeln!(f, "{}", line);
        }
    }
}

fn now() -> String {
    Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

fn invocation_started_record(script: &str, function: &str, executable: &str, arg_count: usize) -> serde_json::Value {
    json!({
        "ts": now(),
        "event": "invocation_started",
        "script": script,
        "function": function,
        "executable": executable,
        "arg_count": arg_count,
    })
}

fn invocation_completed_record(
    script: &str,
    function: &str,
    success: bool,
    duration_ms: u64,
    output_len: usize,
) -> serde_json::Value {
    json!({
        "ts": now(),
        "event": "invocation_completed",
        "script": script,
        "function": function,
        "success": success,
        "duration_ms": duration_ms,
        "output_len": output_len,
    })
}

/// Audit: invocation_started (right before spawn)
pub fn audit_invocation_started(script: &str, function: &str, executable: &str, arg_count: usize) {
    if let Some(path) = get_audit_path() {
        append_jsonl(&path, &invocation_started_record(script, function, executable, arg_count));
    }
}

/// Audit: invocation_completed
pub fn audit_invocation_completed(
    script: &str,
    function: &str,
    success: bool,
    duration_ms: u64,
    output_len: usize,
) {
    if let Some(path) = get_audit_path() {
        append_jsonl(
            &path,
            &invocation_completed_record(script, function, success, duration_ms, output_len),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_jsonl_writes_one_line_per_record() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("audit.jsonl");
        let path = path.to_string_lossy().to_string();
        append_jsonl(&path, &invocation_started_record("m.py", "add", "python3", 2));
        append_jsonl(&path, &invocation_completed_record("m.py", "add", true, 12, 40));

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["event"], "invocation_started");
        assert_eq!(first["arg_count"], 2);
        let second: serde_json::Value = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(second["event"], "invocation_completed");
        assert_eq!(second["success"], true);
    }
}
