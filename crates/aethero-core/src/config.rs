//! # Runtime Configuration
//!
//! Configuration is layered: defaults, then an optional TOML file, then
//! environment variables. Durations in TOML are humantime strings
//! (`"5s"`, `"1m 30s"`).
//!
//! ```toml
//! pipeline_id = "nightly-batch"
//!
//! [bus]
//! history_limit = 1000
//!
//! [monitor]
//! interval = "60s"
//! error_backoff = "5s"
//!
//! [monitor.thresholds]
//! cpu_percent = 80.0
//! memory_percent = 80.0
//! disk_percent = 90.0
//!
//! [retry_policies.reflection-agent]
//! max_retries = 3
//! base_delay = "1s"
//!
//! [logging]
//! level = "info"
//! json = false
//! ```
//!
//! ## Environment Variables
//!
//! - `AETHERO_PIPELINE_ID` - Correlation id for log units (default: "default")
//! - `AETHERO_LOG_LEVEL` - Fallback tracing filter (default: "info")
//! - `AETHERO_LOG_JSON` - Emit JSON log lines (default: false)
//! - `AETHERO_MONITOR_INTERVAL` - Sampling interval, humantime (default: 60s)
//! - `AETHERO_MONITOR_ERROR_BACKOFF` - Pause after a failed sample, humantime (default: 5s)
//! - `AETHERO_ALERT_CPU_PERCENT` - CPU alert threshold (default: 80)
//! - `AETHERO_ALERT_MEMORY_PERCENT` - Memory alert threshold (default: 80)
//! - `AETHERO_ALERT_DISK_PERCENT` - Disk alert threshold (default: 90)
//! - `AETHERO_BUS_HISTORY_LIMIT` - Per-topic history cap, 0 for unbounded (default: unbounded)

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::{env, time::Duration};

use crate::identifiers::{AgentId, PipelineId};
use crate::recovery::RetryPolicy;

/// Error type for configuration loading
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid environment variable '{key}': {message}")]
    InvalidEnvVar { key: String, message: String },

    #[error("Failed to read configuration file '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

/// Serde adapter for humantime duration strings
pub mod duration_str {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&humantime::format_duration(*value).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let raw = String::deserialize(deserializer)?;
        humantime::parse_duration(&raw).map_err(serde::de::Error::custom)
    }
}

/// Message bus settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BusConfig {
    /// Maximum messages retained per topic; `None` keeps everything
    pub history_limit: Option<usize>,
}

/// Alert limits; a sample fires when strictly greater than the limit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertThresholds {
    pub cpu_percent: f64,
    pub memory_percent: f64,
    pub disk_percent: f64,
}

impl Default for AlertThresholds {
    fn default() -> Self {
        Self {
            cpu_percent: 80.0,
            memory_percent: 80.0,
            disk_percent: 90.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    #[serde(with = "duration_str")]
    pub interval: Duration,
    #[serde(with = "duration_str")]
    pub error_backoff: Duration,
    pub thresholds: AlertThresholds,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(60),
            error_backoff: Duration::from_secs(5),
            thresholds: AlertThresholds::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter used when `RUST_LOG` is not set
    pub level: String,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

/// Validated runtime configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    pub pipeline_id: PipelineId,
    pub bus: BusConfig,
    pub monitor: MonitorConfig,
    /// Retry policies keyed by agent id
    pub retry_policies: HashMap<String, RetryPolicy>,
    pub logging: LoggingConfig,
}

impl RuntimeConfig {
    pub fn retry_policy_for(&self, agent_id: &AgentId) -> Option<RetryPolicy> {
        self.retry_policies.get(agent_id.as_str()).copied()
    }

    /// Retry policies with their agent ids parsed
    pub fn agent_retry_policies(&self) -> Vec<(AgentId, RetryPolicy)> {
        self.retry_policies
            .iter()
            .filter_map(|(id, policy)| AgentId::parse(id).ok().map(|id| (id, *policy)))
            .collect()
    }
}

/// Builder for [`RuntimeConfig`] with file and environment support
#[derive(Debug, Clone, Default)]
pub struct RuntimeConfigBuilder {
    config: RuntimeConfig,
}

impl RuntimeConfigBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from a TOML document; missing sections take defaults.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: RuntimeConfig = toml::from_str(source)?;
        Ok(Self { config })
    }

    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&source)
    }

    /// Load configuration from environment variables on top of the defaults
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if any environment variable has an invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().with_env_overrides()
    }

    /// Apply environment variables on top of the current values
    pub fn with_env_overrides(mut self) -> Result<Self, ConfigError> {
        if let Some(id) = get_env_string("AETHERO_PIPELINE_ID") {
            let id = PipelineId::parse(&id).map_err(|e| ConfigError::InvalidEnvVar {
                key: "AETHERO_PIPELINE_ID".to_string(),
                message: e.to_string(),
            })?;
            self = self.pipeline_id(id);
        }

        // Logging
        if let Some(level) = get_env_string("AETHERO_LOG_LEVEL") {
            self.config.logging.level = level;
        }
        if let Some(json) = get_env_bool("AETHERO_LOG_JSON")? {
            self.config.logging.json = json;
        }

        // Monitor
        if let Some(interval) = get_env_duration("AETHERO_MONITOR_INTERVAL")? {
            self.config.monitor.interval = interval;
        }
        if let Some(backoff) = get_env_duration("AETHERO_MONITOR_ERROR_BACKOFF")? {
            self.config.monitor.error_backoff = backoff;
        }
        if let Some(cpu) = get_env_f64("AETHERO_ALERT_CPU_PERCENT")? {
            self.config.monitor.thresholds.cpu_percent = cpu;
        }
        if let Some(memory) = get_env_f64("AETHERO_ALERT_MEMORY_PERCENT")? {
            self.config.monitor.thresholds.memory_percent = memory;
        }
        if let Some(disk) = get_env_f64("AETHERO_ALERT_DISK_PERCENT")? {
            self.config.monitor.thresholds.disk_percent = disk;
        }

        // Bus
        if let Some(limit) = get_env_usize("AETHERO_BUS_HISTORY_LIMIT")? {
            self.config.bus.history_limit = (limit > 0).then_some(limit);
        }

        Ok(self)
    }

    #[must_use]
    pub fn pipeline_id(mut self, pipeline_id: PipelineId) -> Self {
        self.config.pipeline_id = pipeline_id;
        self
    }

    #[must_use]
    pub fn bus(mut self, bus: BusConfig) -> Self {
        self.config.bus = bus;
        self
    }

    #[must_use]
    pub fn monitor(mut self, monitor: MonitorConfig) -> Self {
        self.config.monitor = monitor;
        self
    }

    #[must_use]
    pub fn thresholds(mut self, thresholds: AlertThresholds) -> Self {
        self.config.monitor.thresholds = thresholds;
        self
    }

    #[must_use]
    pub fn retry_policy(mut self, agent_id: &AgentId, policy: RetryPolicy) -> Self {
        self.config
            .retry_policies
            .insert(agent_id.as_str().to_string(), policy);
        self
    }

    #[must_use]
    pub fn logging(mut self, logging: LoggingConfig) -> Self {
        self.config.logging = logging;
        self
    }

    /// Validate configuration and build [`RuntimeConfig`]
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ValidationError` if the configuration is invalid.
    pub fn build(self) -> Result<RuntimeConfig, ConfigError> {
        self.validate()?;
        Ok(self.config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let config = &self.config;

        if config.pipeline_id.as_str().trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "pipeline_id cannot be empty".to_string(),
            ));
        }

        if config.monitor.interval.is_zero() {
            return Err(ConfigError::ValidationError(
                "monitor.interval must be greater than 0".to_string(),
            ));
        }

        if config.monitor.error_backoff.is_zero() {
            return Err(ConfigError::ValidationError(
                "monitor.error_backoff must be greater than 0".to_string(),
            ));
        }

        let thresholds = [
            ("cpu_percent", config.monitor.thresholds.cpu_percent),
            ("memory_percent", config.monitor.thresholds.memory_percent),
            ("disk_percent", config.monitor.thresholds.disk_percent),
        ];
        for (name, value) in thresholds {
            if !(0.0..=100.0).contains(&value) {
                return Err(ConfigError::ValidationError(format!(
                    "monitor.thresholds.{name} must be between 0 and 100"
                )));
            }
        }

        if config.bus.history_limit == Some(0) {
            return Err(ConfigError::ValidationError(
                "bus.history_limit must be greater than 0 when set".to_string(),
            ));
        }

        for agent_id in config.retry_policies.keys() {
            AgentId::parse(agent_id).map_err(|e| {
                ConfigError::ValidationError(format!(
                    "retry_policies key '{agent_id}' is not a valid agent id: {e}"
                ))
            })?;
        }

        if config.logging.level.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "logging.level cannot be empty".to_string(),
            ));
        }

        Ok(())
    }
}

// Environment variable helper functions

fn get_env_string(key: &str) -> Option<String> {
    env::var(key).ok()
}

fn get_env_bool(key: &str) -> Result<Option<bool>, ConfigError> {
    match env::var(key) {
        Ok(val) => match val.to_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Ok(Some(true)),
            "false" | "0" | "no" | "off" => Ok(Some(false)),
            _ => Err(ConfigError::InvalidEnvVar {
                key: key.to_string(),
                message: format!(
                    "invalid boolean value '{val}', expected true/false/1/0/yes/no/on/off"
                ),
            }),
        },
        Err(_) => Ok(None),
    }
}

fn get_env_usize(key: &str) -> Result<Option<usize>, ConfigError> {
    match env::var(key) {
        Ok(val) => val
            .parse::<usize>()
            .map(Some)
            .map_err(|e| ConfigError::InvalidEnvVar {
                key: key.to_string(),
                message: format!("invalid usize value '{val}': {e}"),
            }),
        Err(_) => Ok(None),
    }
}

fn get_env_f64(key: &str) -> Result<Option<f64>, ConfigError> {
    match env::var(key) {
        Ok(val) => val
            .parse::<f64>()
            .map(Some)
            .map_err(|e| ConfigError::InvalidEnvVar {
                key: key.to_string(),
                message: format!("invalid f64 value '{val}': {e}"),
            }),
        Err(_) => Ok(None),
    }
}

fn get_env_duration(key: &str) -> Result<Option<Duration>, ConfigError> {
    match env::var(key) {
        Ok(val) => humantime::parse_duration(&val)
            .map(Some)
            .map_err(|e| ConfigError::InvalidEnvVar {
                key: key.to_string(),
                message: format!("invalid duration '{val}': {e}"),
            }),
        Err(_) => Ok(None),
    }
}
