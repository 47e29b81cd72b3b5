// End-to-end calls against a real interpreter. Every test returns early when
// `python3` is not on PATH.
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

use pyfunc_invoke::{Func, InvocationRequest, InvokeConfig, InvokeError, Invoker};
use serde::Deserialize;
use serde_json::{json, Value};

const FIXTURE: &str = r#"
import sys
import time


def add(a, b):
    return a + b


def divide(a, b):
    return a // b


def nothing():
    pass


def noisy(x):
    print("working on", x)
    return x * 2


def echo(value):
    return value


def func_return_struct(name, age, hobby1, hobby2):
    return {"name": name, "age": age, "hobby": [hobby1, hobby2]}


def names_of_three_people(p1, p2, p3):
    return " and ".join(p["name"] for p in (p1, p2, p3))


def first_param_and_other_params(first, name=None, age=None, hobby=None):
    return {"first": first, "name": name, "age": age, "hobby": hobby}


def sleepy(secs):
    print("progress marker", flush=True)
    time.sleep(secs)
    return secs


def quits():
    sys.exit(0)
"#;

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
struct Person {
    name: String,
    age: u32,
    hobby: Vec<String>,
}

fn python_available() -> bool {
    Command::new("python3")
        .arg("--version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

/// Lay out `<tmp>/dirs/a/b/c/pfunc_test.py` and return (tmp, search root, script).
fn fixture() -> (tempfile::TempDir, PathBuf, PathBuf) {
    let tmp = tempfile::tempdir().expect("tempdir");
    let root = tmp.path().join("dirs").join("a");
    let pkg = root.join("b").join("c");
    std::fs::create_dir_all(&pkg).expect("mkdir");
    let script = pkg.join("pfunc_test.py");
    std::fs::write(&script, FIXTURE).expect("write fixture");
    (tmp, root, script)
}

fn invoker(search_root: &Path) -> Invoker {
    Invoker::new(InvokeConfig::default().with_search_path(search_root.as_os_str()))
}

#[test]
fn add_returns_sum() {
    if !python_available() {
        return;
    }
    let (_tmp, root, script) = fixture();
    let req = InvocationRequest::new(&script, "add").with_args(vec![json!(1), json!(2)]);
    let result = invoker(&root).invoke(&req);
    assert!(result.is_success(), "{}", result.inspect());
    assert_eq!(result.as_i64().unwrap(), 3);
    assert!(result.script.starts_with("from b.c.pfunc_test import add\n"));
}

#[test]
fn raised_exception_is_runtime_failure() {
    if !python_available() {
        return;
    }
    let (_tmp, root, script) = fixture();
    let out = Func::new(&script, "divide")
        .with_invoker(invoker(&root))
        .params(&(6, 0))
        .returns(0i64)
        .call();
    assert_eq!(out.value, Some(0));
    match out.error {
        Some(InvokeError::Runtime(trace)) => assert!(trace.contains("by zero"), "{}", trace),
        other => panic!("unexpected: {:?}", other),
    }

    let ok = Func::new(&script, "divide")
        .with_invoker(invoker(&root))
        .params(&(6, 3))
        .returns(0i64)
        .call();
    assert_eq!(ok.into_result(), Ok(2));
}

#[test]
fn no_return_value_is_null() {
    if !python_available() {
        return;
    }
    let (_tmp, root, script) = fixture();
    let result = invoker(&root).invoke(&InvocationRequest::new(&script, "nothing"));
    assert!(result.is_success(), "{}", result.inspect());
    assert_eq!(result.payload.as_deref(), Some("null"));
    assert!(result.is_none());
}

#[test]
fn ordinary_output_does_not_disturb_payload() {
    if !python_available() {
        return;
    }
    let (_tmp, root, script) = fixture();
    let req = InvocationRequest::new(&script, "noisy").with_args(vec![json!(21)]);
    let result = invoker(&root).invoke(&req);
    assert_eq!(result.as_i64().unwrap(), 42);
    assert!(result.output.contains("working on 21"));
}

#[test]
fn values_round_trip_exactly() {
    if !python_available() {
        return;
    }
    let (_tmp, root, script) = fixture();
    let value = json!({
        "flag": true,
        "missing": null,
        "text": "héllo \"quoted\" \\ ✓ 😀",
        "nums": [1, -2, 3.5],
    });
    let req = InvocationRequest::new(&script, "echo").with_args(vec![value.clone()]);
    let result = invoker(&root).invoke(&req);
    assert_eq!(result.decode::<Value>().unwrap(), value);
}

#[test]
fn record_decodes_into_struct() {
    if !python_available() {
        return;
    }
    let (_tmp, root, script) = fixture();
    let person = Func::new(&script, "func_return_struct")
        .with_invoker(invoker(&root))
        .params(&("Tom", 33, "Football", "Shopping"))
        .returns(Person::default())
        .call()
        .into_result()
        .unwrap();
    assert_eq!(
        person,
        Person {
            name: "Tom".into(),
            age: 33,
            hobby: vec!["Football".into(), "Shopping".into()],
        }
    );
}

#[test]
fn defaults_fill_missing_positions() {
    if !python_available() {
        return;
    }
    let (_tmp, root, script) = fixture();
    let names = |given: Vec<Value>| {
        Func::new(&script, "names_of_three_people")
            .with_invoker(invoker(&root))
            .param_defaults(&[
                json!({"name": "SomeOne"}),
                json!({"name": "OtherOne"}),
                json!({"name": "AnotherOne"}),
            ])
            .var_args(&given)
            .returns(String::new())
            .call()
            .into_result()
            .unwrap()
    };
    assert_eq!(names(vec![]), "SomeOne and OtherOne and AnotherOne");
    assert_eq!(names(vec![json!({"name": "Tom"})]), "Tom and OtherOne and AnotherOne");
    assert_eq!(
        names(vec![json!({"name": "Tom"}), json!({"name": "Jack"})]),
        "Tom and Jack and AnotherOne"
    );
}

#[test]
fn keyword_arguments_bind_by_name() {
    if !python_available() {
        return;
    }
    let (_tmp, root, script) = fixture();
    let out = Func::new(&script, "first_param_and_other_params")
        .with_invoker(invoker(&root))
        .params(&["Lee"])
        .keyword("name", &"Ming")
        .keyword("age", &33)
        .keyword("hobby", &["Video Game", "Programing"])
        .returns(Value::Null)
        .call()
        .into_result()
        .unwrap();
    assert_eq!(
        out,
        json!({
            "first": "Lee",
            "name": "Ming",
            "age": 33,
            "hobby": ["Video Game", "Programing"],
        })
    );
}

#[test]
fn specifier_follows_search_path_entry() {
    if !python_available() {
        return;
    }
    let (tmp, _root, script) = fixture();
    let deeper = tmp.path().join("dirs").join("a").join("b");
    let result = invoker(&deeper).invoke(
        &InvocationRequest::new(&script, "add").with_args(vec![json!(2), json!(3)]),
    );
    assert!(result.script.starts_with("from c.pfunc_test import add\n"));
    assert_eq!(result.as_i64().unwrap(), 5);
}

#[test]
fn script_outside_search_path_uses_its_directory() {
    if !python_available() {
        return;
    }
    let (_tmp, _root, script) = fixture();
    let unrelated = tempfile::tempdir().expect("tempdir");
    let result = invoker(unrelated.path()).invoke(
        &InvocationRequest::new(&script, "add").with_args(vec![json!(1), json!(1)]),
    );
    assert!(result.script.starts_with("from pfunc_test import add\n"));
    let python_path = result.python_path.clone().unwrap_or_default();
    assert!(python_path.ends_with("c"), "{}", python_path);
    assert_eq!(result.as_i64().unwrap(), 2);
}

#[test]
fn missing_function_is_crash() {
    if !python_available() {
        return;
    }
    let (_tmp, root, script) = fixture();
    let result = invoker(&root).invoke(&InvocationRequest::new(&script, "no_such_function"));
    match result.error {
        Some(InvokeError::Crash(stderr)) => assert!(stderr.contains("ImportError"), "{}", stderr),
        other => panic!("unexpected: {:?}", other),
    }
}

#[test]
fn system_exit_is_runtime_failure() {
    if !python_available() {
        return;
    }
    let (_tmp, root, script) = fixture();
    let result = invoker(&root).invoke(&InvocationRequest::new(&script, "quits"));
    assert!(!result.is_success(), "{}", result.inspect());
    assert!(result.payload.is_none());
    match result.error {
        Some(InvokeError::Runtime(trace)) => assert!(trace.contains("SystemExit"), "{}", trace),
        other => panic!("unexpected: {:?}", other),
    }
}

#[test]
fn slow_call_is_killed_after_timeout() {
    if !python_available() {
        return;
    }
    let (_tmp, root, script) = fixture();
    let invoker = Invoker::new(
        InvokeConfig::default()
            .with_search_path(root.as_os_str())
            .with_timeout(Some(Duration::from_millis(500))),
    );
    let req = InvocationRequest::new(&script, "sleepy").with_args(vec![json!(30)]);
    let result = invoker.invoke(&req);
    assert_eq!(result.error, Some(InvokeError::Timeout(Duration::from_millis(500))));
    assert!(result.output.contains("progress marker"), "{}", result.inspect());
    assert!(result.script.starts_with("from b.c.pfunc_test import sleepy\n"));
}
