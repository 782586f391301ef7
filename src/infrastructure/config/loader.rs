//! Hierarchical configuration loading and validation.

use std::path::Path;

use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use thiserror::Error;

use crate::domain::models::config::Config;

const PROJECT_CONFIG: &str = ".kube-triage/config.yaml";
const PROJECT_LOCAL_CONFIG: &str = ".kube-triage/local.yaml";
const ENV_PREFIX: &str = "KUBE_TRIAGE_";

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid monitor.{field}: must be at least 1")]
    ZeroThreshold { field: &'static str },

    #[error("{section}.api_url cannot be empty")]
    EmptyApiUrl { section: &'static str },

    #[error("{section}.{field} cannot be 0")]
    ZeroTimeout {
        section: &'static str,
        field: &'static str,
    },

    #[error("Invalid github.repository: {0}. Must be of the form owner/name")]
    InvalidRepository(String),

    #[error("Invalid llm.max_tokens: must be at least 1")]
    ZeroMaxTokens,

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
    /// 2. .kube-triage/config.yaml
    /// 3. .kube-triage/local.yaml (optional overrides)
    /// 4. Environment variables (`KUBE_TRIAGE_*`, `__` separates sections)
    pub fn load() -> Result<Config> {
        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(PROJECT_CONFIG))
            .merge(Yaml::file(PROJECT_LOCAL_CONFIG))
            .merge(Env::prefixed(ENV_PREFIX).split("__"));
        Self::extract(&figment).context("Failed to extract configuration from figment")
    }

    /// Load configuration from a specific file instead of the project files.
    ///
    /// Environment variables still take precedence.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Config> {
        let path = path.as_ref();
        if !path.exists() {
            anyhow::bail!("Config file not found: {}", path.display());
        }
        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"));
        Self::extract(&figment).context(format!("Failed to load config from {}", path.display()))
    }

    /// Either of the above, depending on whether a file was given.
    pub fn resolve(path: Option<&Path>) -> Result<Config> {
        match path {
            Some(path) => Self::load_from_file(path),
            None => Self::load(),
        }
    }

    fn extract(figment: &Figment) -> Result<Config> {
        let config: Config = figment.extract()?;
        Self::validate(&config)?;
        Ok(config)
    }

    /// Validate configuration after loading
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        let monitor = &config.monitor;
        for (field, value) in [
            ("log_tail_lines", u64::from(monitor.log_tail_lines)),
            ("interval_secs", monitor.interval_secs),
            ("concurrency", monitor.concurrency as u64),
        ] {
            if value == 0 {
                return Err(ConfigError::ZeroThreshold { field });
            }
        }

        for (section, url) in [
            ("cluster", &config.cluster.api_url),
            ("github", &config.github.api_url),
            ("llm", &config.llm.api_url),
        ] {
            if url.trim().is_empty() {
                return Err(ConfigError::EmptyApiUrl { section });
            }
        }

        for (section, field, secs) in [
            ("cluster", "request_timeout_secs", config.cluster.request_timeout_secs),
            ("github", "timeout_secs", config.github.timeout_secs),
            ("llm", "timeout_secs", config.llm.timeout_secs),
        ] {
            if secs == 0 {
                return Err(ConfigError::ZeroTimeout { section, field });
            }
        }

        let repository = &config.github.repository;
        match repository.split_once('/') {
            Some((owner, name)) if !owner.is_empty() && !name.is_empty() && !name.contains('/') => {}
            _ => return Err(ConfigError::InvalidRepository(repository.clone())),
        }

        if config.llm.max_tokens == 0 {
            return Err(ConfigError::ZeroMaxTokens);
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
