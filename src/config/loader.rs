//! Configuration loading from disk and the environment.

use std::fs;
use std::path::Path;

use crate::config::schema::ProxyConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Validation(Vec<ValidationError>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
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

/// Values that take precedence over the config file, usually taken from
/// `PROXY_DOMAIN` / `LISTEN_PORT` or the command line.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub proxy_domain: Option<String>,
    pub listen_port: Option<String>,
}

impl Overrides {
    /// Apply non-empty override values to `config`.
    pub fn apply(&self, config: &mut ProxyConfig) {
        if let Some(domain) = non_empty(&self.proxy_domain) {
            config.proxy_domain = domain.to_string();
        }
        if let Some(port) = non_empty(&self.listen_port) {
            config.listener.port = port.to_string();
        }
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Parse a configuration file without validating it.
pub fn read_config(path: &Path) -> Result<ProxyConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
    toml::from_str(&content).map_err(ConfigError::Parse)
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<ProxyConfig, ConfigError> {
    resolve_config(Some(path), &Overrides::default())
}

/// Build the effective configuration: defaults, then the optional file,
/// then overrides, then normalization and validation.
pub fn resolve_config(path: Option<&Path>, overrides: &Overrides) -> Result<ProxyConfig, ConfigError> {
    let mut config = match path {
        Some(path) => read_config(path)?,
        None => ProxyConfig::default(),
    };

    overrides.apply(&mut config);
    config.normalize();

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}
