//! Unified configuration layer.
//!
//! All environment variable reads live here; the pipeline accesses structured
//! config instead of calling `std::env::var` directly.
//!
//! - `loader`: `env_or`, `env_optional`, `env_bool` helpers
//! - `schema`: `InterpreterConfig`, `ObservabilityConfig`
//! - `env_keys`: key constants

pub mod env_keys;
pub mod loader;
pub mod schema;

pub use loader::{dotenv_loaded, env_bool, env_optional, env_or, load_dotenv, load_dotenv_from_dir};
pub use schema::{InterpreterConfig, ObservabilityConfig};
