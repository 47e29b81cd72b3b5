//! Process invoker: spawn the interpreter, feed the program on stdin, drain
//! stdout and stderr to completion.
//!
//! Both output pipes are read on background threads while the process runs.
//! Without this, a child writing more than the pipe buffer would block on
//! write and we'd deadlock waiting for it to exit. The threads append to a
//! shared buffer, so whatever was written before a kill is still reported.

use std::ffi::{OsStr, OsString};
use std::io::{ErrorKind, Read, Write};
use std::process::{Child, Command, Stdio};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::error::InvokeError;

/// Poll interval while waiting on a bounded call
pub const WAIT_POLL_INTERVAL_MS: u64 = 20;

/// How long a reader may take to hit EOF once the child has been killed
pub const KILL_DRAIN_GRACE_MS: u64 = 500;

/// Raw result of one interpreter run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: Option<i32>,
}

/// A run that did not complete, with the output captured up to that point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessFailure {
    pub error: InvokeError,
    pub output: ProcessOutput,
}

impl ProcessFailure {
    fn bare(error: InvokeError) -> Self {
        Self {
            error,
            output: ProcessOutput::default(),
        }
    }
}

/// How to launch the interpreter for one call.
#[derive(Debug, Clone)]
pub struct ProcessSpec<'a> {
    pub executable: &'a str,
    pub program: &'a str,
    /// Extra environment on top of the inherited one
    pub env: Vec<(&'a OsStr, OsString)>,
    pub timeout: Option<Duration>,
}

struct Reader {
    buf: Arc<Mutex<Vec<u8>>>,
    handle: JoinHandle<std::io::Result<()>>,
}

fn spawn_reader<R: Read + Send + 'static>(mut stream: R) -> Reader {
    let buf = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&buf);
    let handle = thread::spawn(move || {
        let mut chunk = [0u8; 8192];
        loop {
            match stream.read(&mut chunk) {
                Ok(0) => return Ok(()),
                Ok(n) => sink
                    .lock()
                    .unwrap_or_else(|e| e.into_inner())
                    .extend_from_slice(&chunk[..n]),
                Err(e) if e.kind() == ErrorKind::Interrupted => {}
                Err(e) => return Err(e),
            }
        }
    });
    Reader { buf, handle }
}

fn buffered_text(buf: &Mutex<Vec<u8>>) -> String {
    let bytes = buf.lock().unwrap_or_else(|e| e.into_inner());
    String::from_utf8_lossy(&bytes).into_owned()
}

impl Reader {
    /// Wait for EOF. A read error is fatal for the call.
    fn finish(self, stage: &'static str) -> Result<String, InvokeError> {
        let Reader { buf, handle } = self;
        handle
            .join()
            .map_err(|_| InvokeError::process(stage, "reader thread panicked"))?
            .map_err(|e| InvokeError::process(stage, e))?;
        Ok(buffered_text(&buf))
    }

    /// Whatever was read once the thread reaches EOF or `grace` runs out.
    /// A grandchild still holding the pipe must not hang the caller.
    fn salvage(self, grace: Duration) -> String {
        let deadline = Instant::now() + grace;
        let interval = Duration::from_millis(WAIT_POLL_INTERVAL_MS);
        while !self.handle.is_finished() && Instant::now() < deadline {
            thread::sleep(interval);
        }
        buffered_text(&self.buf)
    }
}

fn salvage(stdout: Reader, stderr: Reader, exit_code: Option<i32>) -> ProcessOutput {
    let grace = Duration::from_millis(KILL_DRAIN_GRACE_MS);
    ProcessOutput {
        stdout: stdout.salvage(grace),
        stderr: stderr.salvage(grace),
        exit_code,
    }
}

/// Run the interpreter once. Any spawn or pipe failure is fatal for the call;
/// the failure still carries the output read so far.
pub fn run_interpreter(spec: &ProcessSpec<'_>) -> Result<ProcessOutput, ProcessFailure> {
    // `-` makes the interpreter read the program from stdin.
    let mut cmd = Command::new(spec.executable);
    cmd.arg("-")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    for (key, value) in &spec.env {
        cmd.env(key, value);
    }

    let mut child = cmd.spawn().map_err(|e| {
        ProcessFailure::bare(InvokeError::process(
            "spawn python",
            format!("{}: {}", spec.executable, e),
        ))
    })?;

    let (Some(stdout), Some(stderr)) = (child.stdout.take(), child.stderr.take()) else {
        let _ = child.kill();
        let _ = child.wait();
        return Err(ProcessFailure::bare(InvokeError::process(
            "get python output",
            "stream not captured",
        )));
    };
    let stdout = spawn_reader(stdout);
    let stderr = spawn_reader(stderr);

    let write_result = match child.stdin.take() {
        Some(mut stdin) => stdin
            .write_all(spec.program.as_bytes())
            .map_err(|e| InvokeError::process("input python script to python", e)),
        None => Err(InvokeError::process("pipe stdin of python", "stream not captured")),
    };
    // stdin is dropped (closed) here so the interpreter sees EOF.
    if let Err(error) = write_result {
        let _ = child.kill();
        let exit_code = child.wait().ok().and_then(|s| s.code());
        return Err(ProcessFailure {
            error,
            output: salvage(stdout, stderr, exit_code),
        });
    }

    let waited = match spec.timeout {
        Some(timeout) => wait_with_timeout(&mut child, timeout),
        None => child
            .wait()
            .map(|status| status.code())
            .map_err(|e| InvokeError::process("wait for python", e)),
    };
    let exit_code = match waited {
        Ok(code) => code,
        Err(error) => {
            return Err(ProcessFailure {
                error,
                output: salvage(stdout, stderr, None),
            })
        }
    };

    let stdout = stdout
        .finish("get python output")
        .map_err(ProcessFailure::bare)?;
    let stderr = stderr
        .finish("get python error output")
        .map_err(ProcessFailure::bare)?;

    Ok(ProcessOutput {
        stdout,
        stderr,
        exit_code,
    })
}

/// Wait for `child`, killing it once `timeout` has elapsed.
fn wait_with_timeout(child: &mut Child, timeout: Duration) -> Result<Option<i32>, InvokeError> {
    let start = Instant::now();
    let interval = Duration::from_millis(WAIT_POLL_INTERVAL_MS);
    loop {
        match child.try_wait() {
            Ok(Some(status)) => return Ok(status.code()),
            Ok(None) => {}
            Err(e) => return Err(InvokeError::process("wait for python", e)),
        }
        if start.elapsed() > timeout {
            let _ = child.kill();
            let _ = child.wait();
            tracing::warn!(timeout_secs = timeout.as_secs_f64(), "Interpreter killed after timeout");
            return Err(InvokeError::Timeout(timeout));
        }
        thread::sleep(interval);
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn spec<'a>(executable: &'a str, program: &'a str) -> ProcessSpec<'a> {
        ProcessSpec {
            executable,
            program,
            env: Vec::new(),
            timeout: None,
        }
    }

    #[test]
    fn test_missing_executable_is_process_error() {
        let failure = run_interpreter(&spec("pyfunc-definitely-not-an-interpreter", "")).unwrap_err();
        assert!(matches!(failure.error, InvokeError::Process { stage: "spawn python", .. }));
        assert_eq!(failure.output, ProcessOutput::default());
    }

    #[test]
    fn test_stdin_is_fed_and_outputs_are_drained() {
        // `sh -` reads its program from stdin just like the interpreter.
        let out = run_interpreter(&spec("sh", "echo out; echo err 1>&2\n")).unwrap();
        assert_eq!(out.stdout, "out\n");
        assert_eq!(out.stderr, "err\n");
        assert_eq!(out.exit_code, Some(0));
    }

    #[test]
    fn test_env_is_passed_to_child() {
        let key = OsStr::new("PYFUNC_RUNNER_TEST_VAR");
        let mut s = spec("sh", "printf '%s' \"$PYFUNC_RUNNER_TEST_VAR\"\n");
        s.env.push((key, OsString::from("hello")));
        let out = run_interpreter(&s).unwrap();
        assert_eq!(out.stdout, "hello");
    }

    #[test]
    fn test_large_output_does_not_deadlock() {
        let mut s = spec("sh", "i=0; while [ $i -lt 20000 ]; do echo 0123456789; i=$((i+1)); done\n");
        s.timeout = Some(Duration::from_secs(30));
        let out = run_interpreter(&s).unwrap();
        assert_eq!(out.stdout.len(), 20000 * 11);
    }

    #[test]
    fn test_timeout_kills_child_and_keeps_output() {
        let mut s = spec("sh", "printf 'progress marker\\n'; printf 'warn\\n' 1>&2; exec sleep 5\n");
        s.timeout = Some(Duration::from_millis(300));
        let start = Instant::now();
        let failure = run_interpreter(&s).unwrap_err();
        assert_eq!(failure.error, InvokeError::Timeout(Duration::from_millis(300)));
        assert_eq!(failure.output.stdout, "progress marker\n");
        assert_eq!(failure.output.stderr, "warn\n");
        assert!(start.elapsed() < Duration::from_secs(5));
    }

    #[test]
    fn test_lingering_grandchild_does_not_block_timeout() {
        // The backgrounded sleep keeps the pipes open after `sh` is killed.
        let mut s = spec("sh", "printf 'started\\n'; sleep 5 & wait\n");
        s.timeout = Some(Duration::from_millis(300));
        let start = Instant::now();
        let failure = run_interpreter(&s).unwrap_err();
        assert_eq!(failure.error, InvokeError::Timeout(Duration::from_millis(300)));
        assert_eq!(failure.output.stdout, "started\n");
        assert!(start.elapsed() < Duration::from_secs(4));
    }
}
