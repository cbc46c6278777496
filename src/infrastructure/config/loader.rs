use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use std::path::Path;
use thiserror::Error;

use crate::domain::models::config::Config;

/// Upper bound for `quick_fix.provider_timeout_ms`
pub const MAX_PROVIDER_TIMEOUT_MS: u64 = 60_000;

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid provider_timeout_ms: {0}. Must be between 1 and {MAX_PROVIDER_TIMEOUT_MS}")]
    InvalidProviderTimeout(u64),

    #[error("Invalid max_output_lines: {0}. Must be at least 1")]
    InvalidMaxOutputLines(usize),

    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Invalid log format: {0}. Must be one of: json, pretty")]
    InvalidLogFormat(String),

    #[error("Disabled provider ids cannot be empty")]
    EmptyDisabledProviderId,

    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),
}

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with hierarchical merging
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. .termfix/config.yaml (project config)
    /// 3. .termfix/local.yaml (project local overrides, optional)
    /// 4. Environment variables (TERMFIX_* prefix, highest priority)
    pub fn load() -> Result<Config> {
        Self::load_in(".")
    }

    /// Load configuration rooted at `root` instead of the working directory.
    pub fn load_in(root: impl AsRef<Path>) -> Result<Config> {
        let root = root.as_ref();
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(root.join(".termfix/config.yaml")))
            .merge(Yaml::file(root.join(".termfix/local.yaml")))
            .merge(Env::prefixed("TERMFIX_").split("__"))
            .extract()
            .context("Failed to extract configuration from figment")?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific file, still honoring env overrides
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Config> {
        let path = path.as_ref();
        if !path.exists() {
            anyhow::bail!("Config file not found: {}", path.display());
        }

        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(path))
            .merge(Env::prefixed("TERMFIX_").split("__"))
            .extract()
            .with_context(|| format!("Failed to load config from {}", path.display()))?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Validate configuration after loading
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        let quick_fix = &config.quick_fix;
        if quick_fix.provider_timeout_ms == 0 || quick_fix.provider_timeout_ms > MAX_PROVIDER_TIMEOUT_MS
        {
            return Err(ConfigError::InvalidProviderTimeout(
                quick_fix.provider_timeout_ms,
            ));
        }

        if quick_fix.max_output_lines == 0 {
            return Err(ConfigError::InvalidMaxOutputLines(quick_fix.max_output_lines));
        }

        if quick_fix.disabled_providers.iter().any(|id| id.trim().is_empty()) {
            return Err(ConfigError::EmptyDisabledProviderId);
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&config.logging.level.as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }

        let valid_log_formats = ["json", "pretty"];
        if !valid_log_formats.contains(&config.logging.format.as_str()) {
            return Err(ConfigError::InvalidLogFormat(config.logging.format.clone()));
        }

        for path in &config.contributions {
            if path.as_os_str().is_empty() {
                return Err(ConfigError::ValidationFailed(
                    "contribution path cannot be empty".to_string(),
                ));
            }
        }

        Ok(())
    }
}
