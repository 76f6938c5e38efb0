//! Runtime configuration for the catalog service.
//!
//! Values are layered: built-in defaults, then `catalog.toml` (with `${VAR}`
//! interpolation), then `CATALOG_*` environment variables, then programmatic
//! overrides. The merged result is validated before anything starts.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_CONFIG_FILES: [&str; 2] = ["catalog.toml", "config/catalog.toml"];

/// Dotted config key paired with the environment variable that overrides it.
pub const ENV_OVERRIDES: [(&str, &str); 6] = [
    ("server.bind_address", "CATALOG_SERVER_BIND_ADDRESS"),
    ("server.port", "CATALOG_SERVER_PORT"),
    ("server.graceful_shutdown_secs", "CATALOG_SERVER_GRACEFUL_SHUTDOWN_SECS"),
    ("catalog.seed_products", "CATALOG_SEED_PRODUCTS"),
    ("logging.level", "CATALOG_LOGGING_LEVEL"),
    ("logging.format", "CATALOG_LOGGING_FORMAT"),
];

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub catalog: CatalogConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_address: String,
    pub port: u16,
    pub graceful_shutdown_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { bind_address: "127.0.0.1".to_string(), port: 9090, graceful_shutdown_secs: 15 }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Start with the Latte and Espresso fixtures instead of an empty catalog.
    pub seed_products: bool,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self { seed_products: true }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_string(), format: LogFormat::Compact }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Compact,
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

/// Values supplied by the embedding program; these win over every other layer.
#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub bind_address: Option<String>,
    pub port: Option<u16>,
    pub seed_products: Option<bool>,
    pub log_level: Option<String>,
    pub log_format: Option<LogFormat>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = match resolve_config_path(options.config_path.as_deref()) {
            Some(path) => Self::from_file(&path)?,
            None if options.require_file => {
                let expected =
                    options.config_path.unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILES[0]));
                return Err(ConfigError::MissingConfigFile(expected));
            }
            None => Self::default(),
        };

        config.apply_env()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    pub fn listen_address(&self) -> String {
        format!("{}:{}", self.server.bind_address, self.server.port)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let failure = if self.server.bind_address.trim().is_empty() {
            Some("server.bind_address must not be empty")
        } else if self.server.port == 0 {
            Some("server.port must be greater than zero")
        } else if self.server.graceful_shutdown_secs == 0 {
            Some("server.graceful_shutdown_secs must be greater than zero")
        } else if !LOG_LEVELS.contains(&self.logging.level.trim().to_ascii_lowercase().as_str()) {
            Some("logging.level must be one of trace|debug|info|warn|error")
        } else {
            None
        };

        match failure {
            Some(message) => Err(ConfigError::Validation(message.to_string())),
            None => Ok(()),
        }
    }

    fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path)
            .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

        toml::from_str(&interpolate_env_vars(&raw)?)
            .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
    }

    fn apply_env(&mut self) -> Result<(), ConfigError> {
        for (key_path, var) in ENV_OVERRIDES {
            let Some(raw) = env::var(var).ok().filter(|value| !value.trim().is_empty()) else {
                continue;
            };
            let invalid =
                || ConfigError::InvalidEnvOverride { key: var.to_string(), value: raw.clone() };

            match key_path {
                "server.bind_address" => self.server.bind_address = raw.clone(),
                "server.port" => self.server.port = raw.parse().map_err(|_| invalid())?,
                "server.graceful_shutdown_secs" => {
                    self.server.graceful_shutdown_secs = raw.parse().map_err(|_| invalid())?
                }
                "catalog.seed_products" => {
                    self.catalog.seed_products = raw.parse().map_err(|_| invalid())?
                }
                "logging.level" => self.logging.level = raw.clone(),
                "logging.format" => self.logging.format = raw.parse().map_err(|_| invalid())?,
                _ => {}
            }
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        let ConfigOverrides { bind_address, port, seed_products, log_level, log_format } = overrides;

        self.server.bind_address =
            bind_address.unwrap_or_else(|| self.server.bind_address.clone());
        self.server.port = port.unwrap_or(self.server.port);
        self.catalog.seed_products = seed_products.unwrap_or(self.catalog.seed_products);
        self.logging.level = log_level.unwrap_or_else(|| self.logging.level.clone());
        self.logging.format = log_format.unwrap_or(self.logging.format);
    }
}

/// An explicit path is used only when it exists; otherwise the default
/// locations are searched in order.
pub fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    match explicit_path {
        Some(path) => path.exists().then(|| path.to_path_buf()),
        None => DEFAULT_CONFIG_FILES.iter().map(PathBuf::from).find(|path| path.exists()),
    }
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(start) = rest.find("${") {
        output.push_str(&rest[..start]);
        let expression = &rest[start + 2..];
        let end = expression.find('}').ok_or(ConfigError::UnterminatedInterpolation)?;
        let var = &expression[..end];

        let value = env::var(var)
            .map_err(|_| ConfigError::MissingEnvInterpolation { var: var.to_string() })?;
        output.push_str(&value);
        rest = &expression[end + 1..];
    }

    output.push_str(rest);
    Ok(output)
}
