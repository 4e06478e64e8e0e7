//! Configuration file loading and validation.

use crate::error::ConfigError;
use crate::types::WarmupConfig;
use std::path::Path;

/// Name of the configuration file looked up in the project root.
pub const CONFIG_FILE: &str = "warmup.toml";

/// Loads `<project_dir>/warmup.toml`, or the defaults if the file does not exist.
pub fn load_config(project_dir: &Path) -> Result<WarmupConfig, ConfigError> {
    let config_path = project_dir.join(CONFIG_FILE);
    if !config_path.exists() {
        return Ok(WarmupConfig::default());
    }
    load_config_file(&config_path)
}

/// Loads and validates a configuration from an explicit file path.
pub fn load_config_file(path: &Path) -> Result<WarmupConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    load_config_from_str(&content)
}

/// Parses and validates a configuration from a string.
///
/// Useful for testing without filesystem dependencies.
pub fn load_config_from_str(content: &str) -> Result<WarmupConfig, ConfigError> {
    let config: WarmupConfig =
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
    validate_config(&config)?;
    Ok(config)
}

/// Validates that configuration values are consistent.
fn validate_config(config: &WarmupConfig) -> Result<(), ConfigError> {
    if config.fingerprint.sample_window == 0 {
        return Err(ConfigError::ValidationError(
            "fingerprint.sample_window must be positive".to_string(),
        ));
    }
    if config.scan.max_header_bytes < 64 {
        return Err(ConfigError::ValidationError(
            "scan.max_header_bytes must be at least 64".to_string(),
        ));
    }
    if let Some(name) = &config.project.name {
        if name.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "project.name must not be empty".to_string(),
            ));
        }
    }
    if let Some(entry) = config.startup.entries.iter().find(|e| e.trim().is_empty()) {
        return Err(ConfigError::ValidationError(format!(
            "startup.entries contains an empty path ({entry:?})"
        )));
    }
    Ok(())
}
