//! Script assembler: the program text sent to the interpreter's stdin.
//!
//! Layout, in order: the import line, helper imports, then a `try` block
//! holding the variable definitions and the call. Success writes
//! `<return-start><json><return-end>` on one line; failure writes
//! `<exception-start><trace><exception-end>`.

use std::path::PathBuf;

use pyfunc_core::TemplateTokens;

use crate::env::SearchPath;
use crate::error::InvokeError;
use crate::marshal::{marshal_args, py_string_literal, MarshalledArgs};
use crate::request::InvocationRequest;
use crate::resolver::resolve_import;

const INDENT: &str = "    ";

/// Program text for exactly one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedScript {
    pub text: String,
    pub specifier: String,
    /// Directory the child's search path must include for the import to work
    pub extra_path: Option<PathBuf>,
}

/// Names the generated program binds its helpers to; all carry the inject
/// prefix so they cannot shadow user names.
struct Helpers {
    json: String,
    sys: String,
    traceback: String,
    result: String,
}

impl Helpers {
    fn new(prefix: &str) -> Self {
        Self {
            json: format!("{}json", prefix),
            sys: format!("{}sys", prefix),
            traceback: format!("{}traceback", prefix),
            result: format!("{}result", prefix),
        }
    }
}

pub fn generate_script(
    request: &InvocationRequest,
    tokens: &TemplateTokens,
    search_path: &SearchPath,
) -> Result<GeneratedScript, InvokeError> {
    request.validate()?;
    let target = resolve_import(&request.script, search_path);
    let helpers = Helpers::new(&tokens.inject_prefix);
    let args = marshal_args(
        &tokens.inject_prefix,
        &helpers.json,
        &request.effective_args(),
        &request.keywords,
    )?;
    let text = assemble(&target.specifier, &request.function, &args, tokens, &helpers);
    Ok(GeneratedScript {
        text,
        specifier: target.specifier,
        extra_path: target.extra_path,
    })
}

fn assemble(
    specifier: &str,
    function: &str,
    args: &MarshalledArgs,
    tokens: &TemplateTokens,
    h: &Helpers,
) -> String {
    let mut lines = vec![
        format!("from {} import {}", specifier, function),
        format!("import json as {}", h.json),
        format!("import sys as {}", h.sys),
        format!("import traceback as {}", h.traceback),
        "try:".to_string(),
    ];
    lines.extend(args.definitions.iter().map(|d| format!("{}{}", INDENT, d)));
    lines.push(format!(
        "{}{} = {}({})",
        INDENT,
        h.result,
        function,
        args.call_args.join(", ")
    ));
    lines.push(format!(
        "{}{}.stdout.write({} + {}.dumps({}) + {} + \"\\n\")",
        INDENT,
        h.sys,
        py_string_literal(&tokens.return_start),
        h.json,
        h.result,
        py_string_literal(&tokens.return_end),
    ));
    lines.push("except BaseException:".to_string());
    lines.push(format!(
        "{}{}.stdout.write({} + {}.format_exc() + {} + \"\\n\")",
        INDENT,
        h.sys,
        py_string_literal(&tokens.exception_start),
        h.traceback,
        py_string_literal(&tokens.exception_end),
    ));
    lines.push(format!("{}.stdout.flush()", h.sys));
    let mut text = lines.join("\n");
    text.push('\n');
    text
}
