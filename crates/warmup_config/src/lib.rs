//! Parsing and validation of `warmup.toml` pipeline configuration files.
//!
//! The configuration is an explicit value handed to the pipeline at
//! invocation. Nothing in the pipeline reads ambient global state; a missing
//! `warmup.toml` simply yields [`WarmupConfig::default`].

#![warn(missing_docs)]

pub mod error;
pub mod loader;
pub mod types;

pub use error::ConfigError;
pub use loader::{load_config, load_config_file, load_config_from_str, CONFIG_FILE};
pub use types::*;
