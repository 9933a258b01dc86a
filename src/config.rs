//! # Configuration Module
//!
//! Handles loading and validating configuration from TOML files.
//!
//! Every field has a default, so the bridge runs with no file at all; the
//! defaults mirror the conventional deployment (UDP port 10000, InfluxDB at
//! `http://localhost:8086/`, database `test`).

use serde::Deserialize;
use serde::de::Error;
use std::fs;
use std::path::Path;

use crate::error::Result;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default)]
    pub udp: UdpConfig,

    #[serde(default)]
    pub influx: InfluxConfig,
}

/// UDP listener configuration
#[derive(Debug, Deserialize, Clone)]
pub struct UdpConfig {
    #[serde(default = "default_udp_port")]
    pub port: u16,
}

/// InfluxDB backend configuration
#[derive(Debug, Deserialize, Clone)]
pub struct InfluxConfig {
    #[serde(default = "default_influx_url")]
    pub url: String,

    #[serde(default = "default_database")]
    pub database: String,

    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    #[serde(default = "default_flush_interval_ms")]
    pub flush_interval_ms: u64,

    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,
}

// Default value functions
fn default_udp_port() -> u16 { 10000 }

fn default_influx_url() -> String { "http://localhost:8086/".to_string() }
fn default_database() -> String { "test".to_string() }
fn default_batch_size() -> usize { 64 }
fn default_flush_interval_ms() -> u64 { 1000 }
fn default_max_retries() -> u32 { 3 }
fn default_retry_backoff_ms() -> u64 { 250 }

impl Default for UdpConfig {
    fn default() -> Self {
        Self {
            port: default_udp_port(),
        }
    }
}

impl Default for InfluxConfig {
    fn default() -> Self {
        Self {
            url: default_influx_url(),
            database: default_database(),
            batch_size: default_batch_size(),
            flush_interval_ms: default_flush_interval_ms(),
            max_retries: default_max_retries(),
            retry_backoff_ms: default_retry_backoff_ms(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            udp: UdpConfig::default(),
            influx: InfluxConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the configuration file
    ///
    /// # Returns
    ///
    /// * `Result<Config>` - Loaded and validated configuration
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - File cannot be read
    /// - TOML parsing fails
    /// - Validation fails
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns error if any configuration value is out of valid range
    pub fn validate(&self) -> Result<()> {
        if self.udp.port == 0 {
            return Err(crate::error::InfluxBridgeError::Config(
                toml::de::Error::custom("udp port must be non-zero")
            ));
        }

        if !self.influx.url.starts_with("http://") && !self.influx.url.starts_with("https://") {
            return Err(crate::error::InfluxBridgeError::Config(
                toml::de::Error::custom("influx url must start with http:// or https://")
            ));
        }

        if self.influx.database.is_empty() {
            return Err(crate::error::InfluxBridgeError::Config(
                toml::de::Error::custom("influx database cannot be empty")
            ));
        }

        if self.influx.batch_size == 0 || self.influx.batch_size > 10000 {
            return Err(crate::error::InfluxBridgeError::Config(
                toml::de::Error::custom("batch_size must be between 1 and 10000")
            ));
        }

        if self.influx.flush_interval_ms == 0 || self.influx.flush_interval_ms > 60000 {
            return Err(crate::error::InfluxBridgeError::Config(
                toml::de::Error::custom("flush_interval_ms must be between 1 and 60000")
            ));
        }

        if self.influx.max_retries == 0 || self.influx.max_retries > 10 {
            return Err(crate::error::InfluxBridgeError::Config(
                toml::de::Error::custom("max_retries must be between 1 and 10")
            ));
        }

        if self.influx.retry_backoff_ms == 0 || self.influx.retry_backoff_ms > 10000 {
            return Err(crate::error::InfluxBridgeError::Config(
                toml::de::Error::custom("retry_backoff_ms must be between 1 and 10000")
            ));
        }

        Ok(())
    }
}
