//! Interpreter environment: which directories the interpreter searches for
//! modules, and how the spawned process's search path is extended.
//!
//! Callers never touch `PYTHONPATH` directly; the invoker asks `SearchPath`
//! for the entries and for the augmented value to hand to the child.

pub mod builder;
pub mod search_path;

pub use builder::{child_search_path, ChildSearchPath};
pub use search_path::SearchPath;
