//! Configuration loading from files (std only).

use std::fs;
use std::path::Path;

use tracing::{info, warn};

use crate::error::{ConfigError, Error, Result};

use super::StageConfig;

/// Environment variable naming the configuration file.
pub const CONFIG_PATH_ENV: &str = "STAGE_CONFIG";

/// Load configuration from a TOML file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
///
/// # Example
///
/// ```rust,ignore
/// use stage_motion::load_config;
///
/// let config = load_config("stage.toml")?;
/// ```
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<StageConfig> {
    let content = fs::read_to_string(path.as_ref()).map_err(|e| {
        let msg = heapless::String::try_from(truncate(&e.to_string(), 128)).unwrap_or_default();
        Error::Config(ConfigError::IoError(msg))
    })?;

    parse_config(&content)
}

/// Parse configuration from a TOML string.
///
/// # Errors
///
/// Returns an error if the TOML is invalid or fails validation.
pub fn parse_config(content: &str) -> Result<StageConfig> {
    let config: StageConfig = toml::from_str(content).map_err(|e| {
        let msg = heapless::String::try_from(truncate(e.message(), 128)).unwrap_or_default();
        Error::Config(ConfigError::ParseError(msg))
    })?;

    super::validation::validate_config(&config)?;

    Ok(config)
}

/// Load the file named by `STAGE_CONFIG`, or the stock configuration when
/// the variable is unset.
///
/// # Errors
///
/// Returns an error if the variable names a file that cannot be loaded.
pub fn load_config_from_env() -> Result<StageConfig> {
    match std::env::var(CONFIG_PATH_ENV) {
        Ok(path) => {
            info!(path = %path, "Loading stage configuration");
            load_config(path)
        }
        Err(_) => {
            warn!("{} is not set, using the stock stage configuration", CONFIG_PATH_ENV);
            Ok(StageConfig::default())
        }
    }
}

fn truncate(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}
