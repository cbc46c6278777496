use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration structure for termfix
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// Quick fix engine settings
    #[serde(default)]
    pub quick_fix: QuickFixConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Contribution files with declarative selectors
    #[serde(default)]
    pub contributions: Vec<PathBuf>,
}

/// Quick fix engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct QuickFixConfig {
    /// Master switch; when off every evaluation yields no fixes
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Upper bound for a single provider call
    #[serde(default = "default_provider_timeout_ms")]
    pub provider_timeout_ms: u64,

    /// Only the last N captured output lines are considered
    #[serde(default = "default_max_output_lines")]
    pub max_output_lines: usize,

    /// Register the built-in git and port providers
    #[serde(default = "default_true")]
    pub builtin_providers: bool,

    /// Selector ids that are never evaluated
    #[serde(default)]
    pub disabled_providers: Vec<String>,
}

const fn default_true() -> bool {
    true
}

const fn default_provider_timeout_ms() -> u64 {
    5000
}

const fn default_max_output_lines() -> usize {
    500
}

impl QuickFixConfig {
    pub const fn provider_timeout(&self) -> Duration {
        Duration::from_millis(self.provider_timeout_ms)
    }

    pub fn is_disabled(&self, id: &str) -> bool {
        self.disabled_providers.iter().any(|d| d == id)
    }
}

impl Default for QuickFixConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            provider_timeout_ms: default_provider_timeout_ms(),
            max_output_lines: default_max_output_lines(),
            builtin_providers: true,
            disabled_providers: Vec::new(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: json or pretty
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Directory for log files; console only when unset
    #[serde(default)]
    pub log_dir: Option<PathBuf>,

    /// Log to stderr
    #[serde(default = "default_true")]
    pub enable_console: bool,

    /// Rotation of log files in `log_dir`
    #[serde(default)]
    pub rotation: RotationPolicy,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RotationPolicy {
    #[default]
    Daily,
    Hourly,
    Never,
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            log_dir: None,
            enable_console: true,
            rotation: RotationPolicy::default(),
        }
    }
}
