//! Output parser: pull the delimited payloads out of the interpreter output
//! and decide success.

use pyfunc_core::TemplateTokens;

use crate::error::InvokeError;

/// Text strictly between the first `start` and the first `end`, when both
/// occur, `start` comes first and something lies between them.
pub fn substring_between<'a>(text: &'a str, start: &str, end: &str) -> Option<&'a str> {
    let s = text.find(start)?;
    let e = text.find(end)?;
    let from = s + start.len();
    if from < e {
        Some(&text[from..e])
    } else {
        None
    }
}

/// Payloads extracted from one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedOutput {
    pub payload: Option<String>,
    pub exception: Option<String>,
}

pub fn extract(stdout: &str, tokens: &TemplateTokens) -> ParsedOutput {
    ParsedOutput {
        payload: substring_between(stdout, &tokens.return_start, &tokens.return_end)
            .map(str::to_string),
        exception: substring_between(stdout, &tokens.exception_start, &tokens.exception_end)
            .map(str::to_string),
    }
}

/// Decide the outcome. Standard error wins over everything, then a
/// delimited exception; only when both are empty is the call a success.
pub fn parse_output(
    stdout: &str,
    stderr: &str,
    tokens: &TemplateTokens,
) -> (Option<String>, Option<InvokeError>) {
    let parsed = extract(stdout, tokens);
    if !stderr.is_empty() {
        return (parsed.payload, Some(InvokeError::Crash(stderr.to_string())));
    }
    match parsed.exception {
        Some(trace) => (parsed.payload, Some(InvokeError::Runtime(trace))),
        None => (parsed.payload, None),
    }
}
