use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use std::path::Path;
use thiserror::Error;

use crate::domain::models::config::Config;

/// Project-local configuration file created by the user
pub const PROJECT_CONFIG_PATH: &str = ".simsync/config.yaml";

/// Optional local overrides, not meant to be committed
pub const LOCAL_CONFIG_PATH: &str = ".simsync/local.yaml";

/// Prefix of environment variable overrides
pub const ENV_PREFIX: &str = "SIMSYNC_";

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid base_url: {0}. Must start with http:// or https://")]
    InvalidBaseUrl(String),

    #[error("Invalid timeout_secs: {0}. Must be at least 1")]
    InvalidTimeout(u64),

    #[error("Invalid poll interval_ms: {0}. Must be at least 1")]
    InvalidPollInterval(u64),

    #[error(
        "Invalid poller backoff: max_backoff_ms ({1}) must be >= interval_ms ({0})"
    )]
    InvalidBackoff(u64, u64),

    #[error("Invalid cache ttl_secs: {0}. Must be at least 1 when set")]
    InvalidCacheTtl(u64),

    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Invalid log format: {0}. Must be one of: json, pretty")]
    InvalidLogFormat(String),

    #[error("Invalid log rotation: {0}. Must be one of: daily, hourly, never")]
    InvalidLogRotation(String),
}

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with hierarchical merging
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. .simsync/config.yaml (project config)
    /// 3. .simsync/local.yaml (project local overrides, optional)
    /// 4. Environment variables (SIMSYNC_* prefix, `__` for nesting)
    pub fn load() -> Result<Config> {
        Self::load_with(None)
    }

    /// Load configuration, replacing the project files with `path` when given
    ///
    /// Environment variables still take precedence over the file.
    pub fn load_with(path: Option<&Path>) -> Result<Config> {
        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));

        figment = match path {
            Some(path) => figment.merge(Yaml::file(path)),
            None => figment
                .merge(Yaml::file(PROJECT_CONFIG_PATH))
                .merge(Yaml::file(LOCAL_CONFIG_PATH)),
        };

        let config: Config = figment
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .context("Failed to extract configuration from figment")?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific file, without environment overrides
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(path.as_ref()))
            .extract()
            .context(format!(
                "Failed to load config from {}",
                path.as_ref().display()
            ))?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Validate configuration after loading
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        let base_url = config.api.base_url.trim();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ConfigError::InvalidBaseUrl(config.api.base_url.clone()));
        }

        if config.api.timeout_secs == 0 {
            return Err(ConfigError::InvalidTimeout(config.api.timeout_secs));
        }

        if config.poller.interval_ms == 0 {
            return Err(ConfigError::InvalidPollInterval(config.poller.interval_ms));
        }

        if config.poller.max_backoff_ms < config.poller.interval_ms {
            return Err(ConfigError::InvalidBackoff(
                config.poller.interval_ms,
                config.poller.max_backoff_ms,
            ));
        }

        if config.cache.ttl_secs == Some(0) {
            return Err(ConfigError::InvalidCacheTtl(0));
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&config.logging.level.as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }

        let valid_log_formats = ["json", "pretty"];
        if !valid_log_formats.contains(&config.logging.format.as_str()) {
            return Err(ConfigError::InvalidLogFormat(config.logging.format.clone()));
        }

        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&config.logging.rotation.as_str()) {
            return Err(ConfigError::InvalidLogRotation(
                config.logging.rotation.clone(),
            ));
        }

        Ok(())
    }
}
