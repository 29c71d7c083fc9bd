//! Settings for the `cogwheel` tool
//!
//! Settings come from built-in defaults, an optional YAML file and
//! `COGWHEEL_` prefixed environment variables, in that order.

pub mod loader;
pub mod schema;

pub use loader::SettingsLoader;
pub use schema::*;

use thiserror::Error;

/// Settings rejected by validation
#[derive(Debug, Error, PartialEq)]
pub enum SettingsError {
    #[error("Invalid setting {field}: {message}")]
    Invalid { field: String, message: String },
}
