use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Serialize;
use serde_json::Value;

use crate::error::InvokeError;

/// One call: which function in which script, with which arguments.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InvocationRequest {
    pub script: PathBuf,
    pub function: String,
    pub args: Vec<Value>,
    /// Sorted for reproducible program text; callers must not rely on order.
    pub keywords: BTreeMap<String, Value>,
    /// Consumed left-to-right to fill positions the caller did not supply.
    pub defaults: Vec<Value>,
}

impl InvocationRequest {
    pub fn new(script: impl Into<PathBuf>, function: impl Into<String>) -> Self {
        Self {
            script: script.into(),
            function: function.into(),
            ..Self::default()
        }
    }

    pub fn with_args(mut self, args: Vec<Value>) -> Self {
        self.args = args;
        self
    }

    pub fn with_keyword(mut self, name: impl Into<String>, value: Value) -> Self {
        self.keywords.insert(name.into(), value);
        self
    }

    pub fn with_defaults(mut self, defaults: Vec<Value>) -> Self {
        self.defaults = defaults;
        self
    }

    /// Positional arguments after padding: default `i` is used only when the
    /// caller supplied fewer than `i + 1` arguments.
    pub fn effective_args(&self) -> Vec<Value> {
        let mut args = self.args.clone();
        if self.defaults.len() > args.len() {
            args.extend(self.defaults[args.len()..].iter().cloned());
        }
        args
    }

    /// Function and keyword names end up verbatim in the program text, so
    /// they must be identifiers.
    pub fn validate(&self) -> Result<(), InvokeError> {
        if !is_identifier(&self.function) {
            return Err(InvokeError::InvalidRequest(format!(
                "function name {:?} is not an identifier",
                self.function
            )));
        }
        if let Some(bad) = self.keywords.keys().find(|k| !is_identifier(k)) {
            return Err(InvokeError::InvalidRequest(format!(
                "keyword {:?} is not an identifier",
                bad
            )));
        }
        Ok(())
    }
}

/// Serialize `value` into an argument value.
pub fn to_arg<T: Serialize + ?Sized>(value: &T, what: &str) -> Result<Value, InvokeError> {
    serde_json::to_value(value).map_err(|e| InvokeError::encoding(what, e))
}

/// Expand a value serializing to a sequence into its elements. `()` (null)
/// expands to nothing.
pub fn expand_sequence<T: Serialize + ?Sized>(value: &T) -> Result<Vec<Value>, InvokeError> {
    match to_arg(value, "varargs")? {
        Value::Array(items) => Ok(items),
        Value::Null => Ok(Vec::new()),
        other => Err(InvokeError::ArgumentShape(value_kind(&other).to_string())),
    }
}

pub(crate) fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c == '_' || c.is_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c == '_' || c.is_alphanumeric())
}
