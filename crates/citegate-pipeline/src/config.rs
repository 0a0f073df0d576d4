//! Configuration for the verification pipeline

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Concurrency, batching and timeout settings for one pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Citations per authority lookup request
    pub batch_size: usize,

    /// Lookup requests in flight at once
    pub max_concurrent_batches: usize,

    /// Deadline for one lookup request (milliseconds)
    pub lookup_timeout_ms: u64,

    /// Deadline for one holding verification (milliseconds)
    pub holding_timeout_ms: u64,

    /// Holding verifications in flight at once
    pub max_concurrent_holdings: usize,

    /// Whether unfound citations are retried against the secondary source
    pub secondary_lookups: bool,

    /// Secondary lookups allowed per run; every call counts toward session cost
    pub max_secondary_lookups: usize,
}

impl PipelineConfig {
    /// Lookup deadline as a Duration
    pub fn lookup_timeout(&self) -> Duration {
        Duration::from_millis(self.lookup_timeout_ms)
    }

    /// Holding verification deadline as a Duration
    pub fn holding_timeout(&self) -> Duration {
        Duration::from_millis(self.holding_timeout_ms)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.batch_size == 0 {
            return Err("batch_size must be greater than 0".to_string());
        }
        if self.max_concurrent_batches == 0 {
            return Err("max_concurrent_batches must be greater than 0".to_string());
        }
        if self.max_concurrent_holdings == 0 {
            return Err("max_concurrent_holdings must be greater than 0".to_string());
        }
        if self.lookup_timeout_ms == 0 {
            return Err("lookup_timeout_ms must be greater than 0".to_string());
        }
        if self.holding_timeout_ms == 0 {
            return Err("holding_timeout_ms must be greater than 0".to_string());
        }
        Ok(())
    }

    /// Aggressive preset: small batches, short deadlines, no paid fallback
    ///
    /// Suited to interactive drafting where a fast answer matters more than
    /// recovering every citation.
    ///
    /// # Examples
    ///
    /// ```
    /// use citegate_pipeline::PipelineConfig;
    ///
    /// let config = PipelineConfig::aggressive();
    /// assert_eq!(config.batch_size, 25);
    /// assert!(!config.secondary_lookups);
    /// assert!(config.validate().is_ok());
    /// ```
    pub fn aggressive() -> Self {
        Self {
            batch_size: 25,
            max_concurrent_batches: 8,
            lookup_timeout_ms: 10_000,
            holding_timeout_ms: 20_000,
            max_concurrent_holdings: 8,
            secondary_lookups: false,
            max_secondary_lookups: 0,
        }
    }

    /// Lenient preset: long deadlines, generous secondary fallback
    ///
    /// Suited to final filing checks run in the background.
    pub fn lenient() -> Self {
        Self {
            batch_size: 100,
            max_concurrent_batches: 2,
            lookup_timeout_ms: 120_000,
            holding_timeout_ms: 180_000,
            max_concurrent_holdings: 2,
            secondary_lookups: true,
            max_secondary_lookups: 50,
        }
    }

    /// Load configuration from a TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))
    }

    /// Serialize configuration to a TOML string
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize TOML: {}", e))
    }
}

impl Default for PipelineConfig {
    /// Balanced defaults for a single motion
    fn default() -> Self {
        Self {
            batch_size: 50,
            max_concurrent_batches: 4,
            lookup_timeout_ms: 30_000,
            holding_timeout_ms: 60_000,
            max_concurrent_holdings: 4,
            secondary_lookups: true,
            max_secondary_lookups: 10,
        }
    }
}
