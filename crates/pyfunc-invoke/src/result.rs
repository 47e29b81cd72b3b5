//! Outcome of one invocation and typed decoding of its payload.

use std::fmt;

use serde::de::DeserializeOwned;

use crate::error::InvokeError;

/// Everything one call produced. Failures are carried here as values, so a
/// caller can always inspect the program text and the raw output.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InvocationResult {
    /// JSON text between the return delimiters; `None` when absent
    pub payload: Option<String>,
    pub error: Option<InvokeError>,
    /// Generated program text
    pub script: String,
    /// Search path the child saw
    pub python_path: Option<String>,
    /// Combined stdout and stderr
    pub output: String,
    pub exit_code: Option<i32>,
}

impl InvocationResult {
    pub(crate) fn failed(error: InvokeError) -> Self {
        Self {
            error: Some(error),
            ..Self::default()
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    pub fn failure(&self) -> Option<&InvokeError> {
        self.error.as_ref()
    }

    fn checked_payload(&self, target: &'static str) -> Result<&str, InvokeError> {
        if let Some(err) = &self.error {
            return Err(err.clone());
        }
        self.payload.as_deref().ok_or_else(|| InvokeError::Decode {
            target,
            payload: String::new(),
            message: "no return value in output".to_string(),
        })
    }

    /// Decode the payload into any deserializable type.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, InvokeError> {
        let target = std::any::type_name::<T>();
        let payload = self.checked_payload(target)?;
        serde_json::from_str(payload).map_err(|e| InvokeError::Decode {
            target,
            payload: payload.to_string(),
            message: e.to_string(),
        })
    }

    pub fn as_i64(&self) -> Result<i64, InvokeError> {
        self.decode()
    }

    pub fn as_f64(&self) -> Result<f64, InvokeError> {
        self.decode()
    }

    pub fn as_string(&self) -> Result<String, InvokeError> {
        self.decode()
    }

    /// True when the function returned `None`.
    pub fn is_none(&self) -> bool {
        self.is_success() && self.payload.as_deref().map(str::trim) == Some("null")
    }

    /// Turn the outcome into a plain `Result` over the raw payload.
    pub fn into_result(self) -> Result<Option<String>, InvokeError> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(self.payload),
        }
    }

    /// Human readable dump of everything the call produced.
    pub fn inspect(&self) -> String {
        let mut out = String::new();
        push_block(&mut out, "script", &self.script);
        push_block(&mut out, "python path", self.python_path.as_deref().unwrap_or(""));
        push_block(&mut out, "output", &self.output);
        push_block(&mut out, "payload", self.payload.as_deref().unwrap_or(""));
        let error = self.error.as_ref().map(ToString::to_string).unwrap_or_default();
        push_block(&mut out, "error", &error);
        out
    }
}

fn push_block(out: &mut String, title: &str, body: &str) {
    out.push_str(title);
    out.push_str(":\n");
    for line in body.lines() {
        out.push_str("    ");
        out.push_str(line);
        out.push('\n');
    }
}

impl fmt::Display for InvocationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.error, &self.payload) {
            (Some(err), _) => write!(f, "error: {}", err),
            (None, Some(payload)) => f.write_str(payload),
            (None, None) => f.write_str("<no value>"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    fn ok(payload: &str) -> InvocationResult {
        InvocationResult {
            payload: Some(payload.to_string()),
            ..Default::default()
        }
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct Person {
        name: String,
        age: u32,
        hobby: Vec<String>,
    }

    #[test]
    fn test_scalar_decoders() {
        assert_eq!(ok("3").as_i64().unwrap(), 3);
        assert_eq!(ok("2.5").as_f64().unwrap(), 2.5);
        assert_eq!(ok("\"hi\"").as_string().unwrap(), "hi");
    }

    #[test]
    fn test_decode_record() {
        let r = ok(r#"{"name": "Tom", "age": 30, "hobby": ["chess"]}"#);
        let p: Person = r.decode().unwrap();
        assert_eq!(p.name, "Tom");
        assert_eq!(p.age, 30);
        assert_eq!(p.hobby, vec!["chess".to_string()]);
    }

    #[test]
    fn test_decode_mismatch() {
        let err = ok("\"abc\"").as_i64().unwrap_err();
        assert!(matches!(err, InvokeError::Decode { .. }));
    }

    #[test]
    fn test_absent_payload_fails_decode() {
        let r = InvocationResult::default();
        assert!(r.is_success());
        assert!(matches!(r.as_i64(), Err(InvokeError::Decode { .. })));
        assert!(!r.is_none());
    }

    #[test]
    fn test_failure_propagates_through_decoders() {
        let r = InvocationResult::failed(InvokeError::Runtime("boom".into()));
        assert_eq!(r.as_i64(), Err(InvokeError::Runtime("boom".into())));
        assert_eq!(r.to_string(), "error: boom");
    }

    #[test]
    fn test_null_payload() {
        let r = ok("null");
        assert!(r.is_none());
        assert_eq!(r.decode::<Option<i64>>().unwrap(), None);
    }

    #[test]
    fn test_inspect_lists_sections() {
        let r = InvocationResult {
            payload: Some("1".into()),
            script: "from m import f\nprint(1)".into(),
            ..Default::default()
        };
        let text = r.inspect();
        assert!(text.starts_with("script:\n    from m import f\n    print(1)\n"));
        assert!(text.contains("payload:\n    1\n"));
    }
}
