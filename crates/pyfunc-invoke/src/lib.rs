//! Call functions defined in Python scripts from Rust.
//!
//! Each call generates a small program that imports the target function,
//! runs it in a fresh interpreter, and reads the JSON-encoded result back
//! from standard output.

pub mod env;
pub mod error;
pub mod func;
pub mod invoker;
pub mod log;
pub mod marshal;
pub mod output;
pub mod request;
pub mod resolver;
pub mod result;
pub mod runner;
pub mod script;

pub use error::InvokeError;
pub use func::{Func, TypedResult};
pub use invoker::{call, invoke, InvokeConfig, Invoker};
pub use request::InvocationRequest;
pub use result::InvocationResult;
pub use script::GeneratedScript;
