//! Argument marshaller: one variable definition per argument, each holding
//! the interpreter-side decoding of the argument's JSON text.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use serde_json::Value;

use crate::error::InvokeError;

/// Variable definitions plus the argument list for the call expression.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MarshalledArgs {
    /// One `name = json.loads("...")` line per argument, positional first
    pub definitions: Vec<String>,
    /// `name` for positional arguments, `keyword=name` for keyword ones
    pub call_args: Vec<String>,
}

pub fn positional_var(prefix: &str, index: usize) -> String {
    format!("{}{}", prefix, index)
}

pub fn keyword_var(prefix: &str, keyword: &str) -> String {
    format!("{}_{}", prefix, keyword)
}

/// Marshal `positional` and `keywords`. `json_module` is the name the
/// generated program binds the `json` module to.
pub fn marshal_args(
    prefix: &str,
    json_module: &str,
    positional: &[Value],
    keywords: &BTreeMap<String, Value>,
) -> Result<MarshalledArgs, InvokeError> {
    let mut out = MarshalledArgs::default();

    for (i, value) in positional.iter().enumerate() {
        let var = positional_var(prefix, i);
        let json = serde_json::to_string(value)
            .map_err(|e| InvokeError::encoding(format!("param {}", i), e))?;
        out.definitions
            .push(format!("{} = {}.loads({})", var, json_module, py_string_literal(&json)));
        out.call_args.push(var);
    }

    for (keyword, value) in keywords {
        let var = keyword_var(prefix, keyword);
        let json = serde_json::to_string(value)
            .map_err(|e| InvokeError::encoding(format!("keyword param {}", keyword), e))?;
        out.definitions
            .push(format!("{} = {}.loads({})", var, json_module, py_string_literal(&json)));
        out.call_args.push(format!("{}={}", keyword, var));
    }

    Ok(out)
}

/// Double-quoted, ASCII-only string literal for `s`. Non-ASCII characters
/// use `\u`/`\U` escapes so the program text is encoding-independent.
pub fn py_string_literal(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 || c as u32 == 0x7f => {
                let _ = write!(out, "\\x{:02x}", c as u32);
            }
            c if c.is_ascii() => out.push(c),
            c if (c as u32) <= 0xffff => {
                let _ = write!(out, "\\u{:04x}", c as u32);
            }
            c => {
                let _ = write!(out, "\\U{:08x}", c as u32);
            }
        }
    }
    out.push('"');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_positional_then_keyword_definitions() {
        let mut kw = BTreeMap::new();
        kw.insert("name".to_string(), json!("Ming"));
        let out = marshal_args("p_", "p_json", &[json!(1), json!({"a": [true, null]})], &kw).unwrap();

        assert_eq!(out.definitions.len(), 3);
        assert_eq!(out.definitions[0], r#"p_0 = p_json.loads("1")"#);
        assert_eq!(
            out.definitions[1],
            r#"p_1 = p_json.loads("{\"a\":[true,null]}")"#
        );
        assert_eq!(out.definitions[2], r#"p__name = p_json.loads("\"Ming\"")"#);
        assert_eq!(out.call_args, vec!["p_0", "p_1", "name=p__name"]);
        assert!(out.definitions.iter().all(|d| !d.contains('\n')));
    }

    #[test]
    fn test_no_arguments() {
        let out = marshal_args("p_", "p_json", &[], &BTreeMap::new()).unwrap();
        assert!(out.definitions.is_empty());
        assert!(out.call_args.is_empty());
    }

    #[test]
    fn test_literal_escapes_quotes_controls_and_non_ascii() {
        assert_eq!(py_string_literal(r#"a"b\c"#), r#""a\"b\\c""#);
        assert_eq!(py_string_literal("x\ny\u{1}"), r#""x\ny\x01""#);
        assert_eq!(py_string_literal("é"), r#""\u00e9""#);
        assert_eq!(py_string_literal("😀"), r#""\U0001f600""#);
        assert!(py_string_literal("中文").is_ascii());
    }
}
