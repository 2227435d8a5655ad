//! Configuration loading from disk and environment.

use std::fs;
use std::path::Path;

use crate::config::schema::AppConfig;
use crate::config::validation::{validate_config, ValidationError};

pub const ENV_PORT: &str = "PORT";
pub const ENV_ALLOWED_ORIGINS: &str = "ALLOWED_ORIGINS";
pub const ENV_ENVIRONMENT: &str = "APP_ENV";
/// Alias for `ALLOWED_ORIGINS`; the primary name wins when both are set.
pub const ENV_FRONTEND_URL: &str = "FRONTEND_URL";
/// Alias for `APP_ENV`; the primary name wins when both are set.
pub const ENV_NODE_ENV: &str = "NODE_ENV";

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Env { key: &'static str, reason: String },
    Validation(Vec<ValidationError>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Env { key, reason } => write!(f, "Invalid {}: {}", key, reason),
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 { write!(f, ", ")?; }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Parse configuration from a TOML file.
pub fn read_config_file(path: &Path) -> Result<AppConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
    toml::from_str(&content).map_err(ConfigError::Parse)
}

/// Overlay `PORT`, `ALLOWED_ORIGINS` (or `FRONTEND_URL`) and `APP_ENV`
/// (or `NODE_ENV`) onto `config`.
///
/// `lookup` abstracts the environment so callers can supply a fixed map.
pub fn apply_env_overrides<F>(config: &mut AppConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(port) = lookup(ENV_PORT) {
        config.server.port = port.trim().parse().map_err(|e| ConfigError::Env {
            key: ENV_PORT,
            reason: format!("{e}"),
        })?;
    }
    if let Some(origins) = first_set(&lookup, &[ENV_ALLOWED_ORIGINS, ENV_FRONTEND_URL]) {
        config.cors.allowed_origins = origins;
    }
    if let Some(environment) = first_set(&lookup, &[ENV_ENVIRONMENT, ENV_NODE_ENV]) {
        config.environment = environment;
    }
    Ok(())
}

fn first_set<F>(lookup: &F, keys: &[&str]) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    keys.iter().find_map(|key| lookup(key))
}

/// Load, overlay the process environment, and validate.
///
/// Without a path the built-in defaults are the base layer.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let mut config = match path {
        Some(path) => read_config_file(path)?,
        None => AppConfig::default(),
    };

    apply_env_overrides(&mut config, |key| std::env::var(key).ok())?;
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}
