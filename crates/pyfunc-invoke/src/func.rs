//! Typed call builder.
//!
//! ```no_run
//! use pyfunc_invoke::Func;
//!
//! let sum = Func::new("scripts/calc.py", "add")
//!     .params(&(1, 2))
//!     .returns(0i64)
//!     .call();
//! assert_eq!(sum.value, Some(3));
//! ```

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::InvokeError;
use crate::invoker::Invoker;
use crate::request::{expand_sequence, to_arg, InvocationRequest};
use crate::result::InvocationResult;

/// Builder for one call whose result decodes into `R`.
///
/// Setters never fail; problems found while building are kept and reported
/// by [`Func::call`].
#[derive(Debug, Clone)]
pub struct Func<R> {
    invoker: Option<Invoker>,
    script: PathBuf,
    function: String,
    params: Vec<Value>,
    defaults: Vec<Value>,
    keywords: BTreeMap<String, Value>,
    returns: Option<R>,
    errors: Vec<InvokeError>,
}

/// What [`Func::call`] produced.
#[derive(Debug, Clone)]
pub struct TypedResult<R> {
    /// Decoded value on success, the declared sample on failure
    pub value: Option<R>,
    pub error: Option<InvokeError>,
    /// Present whenever the interpreter was reached
    pub invocation: Option<InvocationResult>,
}

impl<R> TypedResult<R> {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    pub fn into_parts(self) -> (Option<R>, Option<InvokeError>) {
        (self.value, self.error)
    }

    pub fn into_result(self) -> Result<R, InvokeError> {
        match (self.value, self.error) {
            (_, Some(err)) => Err(err),
            (Some(value), None) => Ok(value),
            (None, None) => Err(InvokeError::MissingReturnType),
        }
    }
}

impl<R> Func<R> {
    pub fn new(script: impl Into<PathBuf>, function: impl Into<String>) -> Self {
        Self {
            invoker: None,
            script: script.into(),
            function: function.into(),
            params: Vec::new(),
            defaults: Vec::new(),
            keywords: BTreeMap::new(),
            returns: None,
            errors: Vec::new(),
        }
    }

    /// Run with this invoker instead of one built from the current settings.
    pub fn with_invoker(mut self, invoker: Invoker) -> Self {
        self.invoker = Some(invoker);
        self
    }

    fn record<T>(&mut self, outcome: Result<T, InvokeError>) -> Option<T> {
        match outcome {
            Ok(v) => Some(v),
            Err(e) => {
                self.errors.push(e);
                None
            }
        }
    }

    /// Replace the positional arguments with the elements of `values`.
    pub fn params<T: Serialize + ?Sized>(mut self, values: &T) -> Self {
        if let Some(values) = self.record(expand_sequence(values)) {
            self.params = values;
        }
        self
    }

    /// Append one positional argument.
    pub fn arg<T: Serialize + ?Sized>(mut self, value: &T) -> Self {
        if let Some(value) = self.record(to_arg(value, "argument")) {
            self.params.push(value);
        }
        self
    }

    /// Spread a sequence into the positional arguments. A non-sequence is
    /// recorded as an `ArgumentShape` error and the arguments are left as
    /// they were.
    pub fn var_args<T: Serialize + ?Sized>(mut self, values: &T) -> Self {
        if let Some(values) = self.record(expand_sequence(values)) {
            self.params = values;
        }
        self
    }

    /// Values filling trailing positions the caller did not supply.
    pub fn param_defaults<T: Serialize + ?Sized>(mut self, values: &T) -> Self {
        if let Some(values) = self.record(expand_sequence(values)) {
            self.defaults = values;
        }
        self
    }

    /// Add a keyword argument; repeating a name replaces its value.
    pub fn keyword<T: Serialize + ?Sized>(mut self, name: impl Into<String>, value: &T) -> Self {
        let name = name.into();
        let what = format!("keyword {}", name);
        if let Some(value) = self.record(to_arg(value, &what)) {
            self.keywords.insert(name, value);
        }
        self
    }

    /// Declare the result type with a sample returned unchanged on failure.
    pub fn returns(mut self, sample: R) -> Self {
        self.returns = Some(sample);
        self
    }

    pub fn request(&self) -> InvocationRequest {
        InvocationRequest {
            script: self.script.clone(),
            function: self.function.clone(),
            args: self.params.clone(),
            keywords: self.keywords.clone(),
            defaults: self.defaults.clone(),
        }
    }
}

impl<R: DeserializeOwned + Clone> Func<R> {
    pub fn call(&self) -> TypedResult<R> {
        let Some(sample) = self.returns.clone() else {
            return TypedResult {
                value: None,
                error: Some(InvokeError::MissingReturnType),
                invocation: None,
            };
        };
        if let Some(err) = self.errors.first() {
            return TypedResult {
                value: Some(sample),
                error: Some(err.clone()),
                invocation: None,
            };
        }

        let invocation = match &self.invoker {
            Some(invoker) => invoker.invoke(&self.request()),
            None => Invoker::from_settings().invoke(&self.request()),
        };
        let (value, error) = match invocation.decode::<R>() {
            Ok(v) => (Some(v), None),
            Err(e) => (Some(sample), Some(e)),
        };
        TypedResult {
            value,
            error,
            invocation: Some(invocation),
        }
    }
}
