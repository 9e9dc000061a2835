//! Configuration management for Argus
//!
//! This module handles loading, validation, and management of the application
//! configuration from YAML files.

use crate::error::{ArgusError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

fn default_true() -> bool {
    true
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Charging feed WebSocket configuration
    pub feed: FeedConfig,

    /// Reservation REST API configuration
    pub api: ApiConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Charging feed WebSocket parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    /// WebSocket endpoint URL
    pub url: String,

    /// Drop all reconciled sessions when the connection is lost.
    /// Off by default: stale cards stay visible until a reconnect.
    #[serde(default)]
    pub clear_on_disconnect: bool,

    /// Reconnect policy (explicit opt-in, no automatic reconnect by default)
    #[serde(default)]
    pub reconnect: ReconnectPolicy,
}

/// Explicit reconnect policy for the charging feed.
///
/// Unconditional auto-reconnect risks connection storms against a shared
/// feed, so reconnection is off unless configured.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconnectPolicy {
    /// Whether to reconnect automatically after a drop
    pub enabled: bool,

    /// Maximum reconnect attempts before giving up (0 = unlimited)
    pub max_attempts: u32,

    /// Initial backoff delay in milliseconds
    pub initial_delay_ms: u64,

    /// Backoff delay ceiling in milliseconds
    pub max_delay_ms: u64,

    /// Random jitter added to each delay, in milliseconds
    pub jitter_ms: u64,
}

/// Reservation REST API parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the reservation service
    pub base_url: String,

    /// Request timeout in seconds
    pub timeout_seconds: u64,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    pub level: String,

    /// Path to log file (or directory for rotated files)
    pub file: String,

    /// Number of rotated files to keep
    pub backup_count: u32,

    /// Whether to log to console
    #[serde(default = "default_true")]
    pub console_output: bool,

    /// Whether to use JSON format
    #[serde(default)]
    pub json_format: bool,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            url: "ws://localhost:8080/ws/charging".to_string(),
            clear_on_disconnect: false,
            reconnect: ReconnectPolicy::default(),
        }
    }
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            enabled: false,
            max_attempts: 10,
            initial_delay_ms: 500,
            max_delay_ms: 30_000,
            jitter_ms: 250,
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            timeout_seconds: 10,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "INFO".to_string(),
            file: "/tmp/argus.log".to_string(),
            backup_count: 5,
            console_output: true,
            json_format: false,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            feed: FeedConfig::default(),
            api: ApiConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration with validation
    pub fn load() -> Result<Self> {
        // Try to load from default locations
        let default_paths = [
            "argus_config.yaml",
            "/data/argus_config.yaml",
            "/etc/argus/config.yaml",
        ];

        for path in &default_paths {
            if Path::new(path).exists() {
                return Self::from_file(path);
            }
        }

        // Fall back to default configuration
        Ok(Config::default())
    }

    /// Save configuration to a YAML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(path, yaml)?;
        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.feed.url.is_empty() {
            return Err(ArgusError::validation(
                "feed.url",
                "WebSocket URL cannot be empty",
            ));
        }

        if !self.feed.url.starts_with("ws://") && !self.feed.url.starts_with("wss://") {
            return Err(ArgusError::validation(
                "feed.url",
                "WebSocket URL must use the ws:// or wss:// scheme",
            ));
        }

        if self.feed.reconnect.enabled
            && self.feed.reconnect.initial_delay_ms > self.feed.reconnect.max_delay_ms
        {
            return Err(ArgusError::validation(
                "feed.reconnect.initial_delay_ms",
                "Initial delay cannot exceed the delay ceiling",
            ));
        }

        if self.api.base_url.is_empty() {
            return Err(ArgusError::validation(
                "api.base_url",
                "API base URL cannot be empty",
            ));
        }

        if self.api.timeout_seconds == 0 {
            return Err(ArgusError::validation(
                "api.timeout_seconds",
                "Must be greater than 0",
            ));
        }

        Ok(())
    }
}
