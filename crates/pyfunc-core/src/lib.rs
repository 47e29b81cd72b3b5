pub mod config;
pub mod observability;
pub mod settings;

pub use settings::{TemplateTokens, DEFAULT_PYTHON_EXECUTABLE};
