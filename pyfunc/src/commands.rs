//! Subcommand implementations.

use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use pyfunc_core::settings;
use pyfunc_invoke::env::SearchPath;
use pyfunc_invoke::resolver::resolve_import;
use pyfunc_invoke::{InvocationRequest, InvokeConfig, Invoker};
use serde_json::{json, Value};

use crate::cli::CallTarget;

fn parse_json(text: &str, what: &str) -> Result<Value> {
    serde_json::from_str(text).with_context(|| format!("{} is not valid JSON: {}", what, text))
}

/// Turn the command-line target into a request.
pub fn build_request(target: &CallTarget) -> Result<InvocationRequest> {
    let mut args = Vec::with_capacity(target.args.len());
    for (i, raw) in target.args.iter().enumerate() {
        args.push(parse_json(raw, &format!("argument {}", i + 1))?);
    }
    let mut request = InvocationRequest::new(&target.script, &target.function).with_args(args);
    for raw in &target.kwargs {
        let Some((name, value)) = raw.split_once('=') else {
            bail!("keyword argument must be NAME=JSON, got {:?}", raw);
        };
        let value = parse_json(value, &format!("keyword {}", name))?;
        request = request.with_keyword(name.trim(), value);
    }
    Ok(request)
}

fn config_for(target: &CallTarget) -> InvokeConfig {
    let config = InvokeConfig::current();
    match &target.token_prefix {
        Some(prefix) => {
            let tokens = config.tokens.clone().with_prefix(prefix);
            config.with_tokens(tokens)
        }
        None => config,
    }
}

pub fn call(
    target: &CallTarget,
    python: Option<String>,
    timeout: Option<u64>,
    inspect: bool,
) -> Result<()> {
    let request = build_request(target)?;
    let mut config = config_for(target);
    if let Some(exe) = python {
        config = config.with_executable(exe);
    }
    if let Some(secs) = timeout {
        config = config.with_timeout((secs > 0).then(|| Duration::from_secs(secs)));
    }

    let result = Invoker::new(config).invoke(&request);
    if inspect {
        print!("{}", result.inspect());
    }
    match result.into_result() {
        Ok(payload) => {
            if !inspect {
                println!("{}", payload.unwrap_or_else(|| "null".to_string()));
            }
            Ok(())
        }
        Err(e) => Err(e).with_context(|| format!("{}.{} failed", target.script, target.function)),
    }
}

pub fn script(target: &CallTarget) -> Result<()> {
    let request = build_request(target)?;
    let generated = Invoker::new(config_for(target)).generate(&request)?;
    print!("{}", generated.text);
    if let Some(extra) = &generated.extra_path {
        eprintln!("# extra search path: {}", extra.display());
    }
    Ok(())
}

pub fn resolve(script: &str) -> Result<()> {
    let target = resolve_import(Path::new(script), &SearchPath::from_env());
    let report = json!({
        "specifier": target.specifier,
        "extra_path": target.extra_path.map(|p| p.display().to_string()),
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

pub fn tokens() -> Result<()> {
    let report = json!({
        "tokens": settings::tokens(),
        "python": settings::python_executable(),
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
