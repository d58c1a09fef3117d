//! Configuration Loader
//!
//! Loads and validates configuration from TOML files matching config.toml structure.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::adapters::report_cache::CacheSettings;
use crate::adapters::rugcheck::RugcheckConfig;
use crate::application::ServiceSettings;
use crate::domain::{InsiderGraphAnalyzer, RiskAggregator};

/// Main configuration structure matching config.toml
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub provider: ProviderSection,
    pub cache: CacheSection,
    pub analyzer: AnalyzerSection,
    pub scoring: ScoringSection,
    #[serde(default)]
    pub logging: LoggingSection,
}

/// Report/graph provider configuration section
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderSection {
    /// Provider API base URL, without trailing slash
    pub api_url: String,
    /// Optional bearer token for authenticated endpoints
    #[serde(default)]
    pub api_key: Option<String>,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl ProviderSection {
    /// Get API key with environment variable fallback
    /// Checks RUGCHECK_API_KEY env var if config value is empty/None
    pub fn get_api_key(&self) -> Option<String> {
        if let Some(ref key) = self.api_key {
            if !key.is_empty() {
                return Some(key.clone());
            }
        }
        std::env::var("RUGCHECK_API_KEY").ok()
    }
}

/// Report cache configuration section
#[derive(Debug, Clone, Deserialize)]
pub struct CacheSection {
    /// Freshness window in seconds (default policy: 5 minutes)
    pub freshness_secs: u64,
    /// Bound on a combined report+graph fetch, in seconds
    pub fetch_timeout_secs: u64,
    /// Maximum cached tokens before eviction
    pub max_entries: usize,
}

/// Insider graph analyzer configuration section
#[derive(Debug, Clone, Deserialize)]
pub struct AnalyzerSection {
    /// Hop distance from the creator that still counts as insider
    pub insider_hop_limit: usize,
    /// Fraction of supply an edge must carry to count for clustering
    pub cluster_edge_fraction: f64,
}

/// Risk scoring configuration section
#[derive(Debug, Clone, Deserialize)]
pub struct ScoringSection {
    /// Reject reports containing a signal with |weight| above this bound
    pub max_signal_weight: f64,
    /// How many top signals to surface on a score
    pub top_signals: usize,
}

/// Logging configuration section
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSection {
    /// Log level: "trace", "debug", "info", "warn", "error"
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Validation failed: {0}")]
    ValidationError(String),
}

/// Load configuration from a TOML file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&content)?;
    config.validate()?;
    Ok(config)
}

impl Config {
    /// Validate all configuration parameters
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.provider.api_url.is_empty() {
            return Err(ConfigError::ValidationError(
                "api_url cannot be empty".to_string(),
            ));
        }

        if self.provider.timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "timeout_secs must be > 0".to_string(),
            ));
        }

        if self.cache.freshness_secs == 0 {
            return Err(ConfigError::ValidationError(
                "freshness_secs must be > 0".to_string(),
            ));
        }

        if self.cache.max_entries == 0 {
            return Err(ConfigError::ValidationError(
                "max_entries must be > 0".to_string(),
            ));
        }

        if self.analyzer.insider_hop_limit == 0 {
            return Err(ConfigError::ValidationError(
                "insider_hop_limit must be > 0".to_string(),
            ));
        }

        if self.analyzer.cluster_edge_fraction <= 0.0 || self.analyzer.cluster_edge_fraction > 1.0 {
            return Err(ConfigError::ValidationError(format!(
                "cluster_edge_fraction must be in (0, 1], got {}",
                self.analyzer.cluster_edge_fraction
            )));
        }

        if self.scoring.max_signal_weight <= 0.0 {
            return Err(ConfigError::ValidationError(format!(
                "max_signal_weight must be > 0, got {}",
                self.scoring.max_signal_weight
            )));
        }

        if self.scoring.top_signals == 0 {
            return Err(ConfigError::ValidationError(
                "top_signals must be > 0".to_string(),
            ));
        }

        Ok(())
    }
}

// Conversion from Config to the service component settings
impl From<&Config> for ServiceSettings {
    fn from(config: &Config) -> Self {
        ServiceSettings {
            cache: CacheSettings {
                freshness_window: Duration::from_secs(config.cache.freshness_secs),
                fetch_timeout: Duration::from_secs(config.cache.fetch_timeout_secs),
                max_entries: config.cache.max_entries,
            },
            aggregator: RiskAggregator {
                max_signal_weight: config.scoring.max_signal_weight,
                top_signals: config.scoring.top_signals,
            },
            analyzer: InsiderGraphAnalyzer {
                insider_hop_limit: config.analyzer.insider_hop_limit,
                cluster_edge_fraction: config.analyzer.cluster_edge_fraction,
            },
        }
    }
}

impl From<&Config> for RugcheckConfig {
    fn from(config: &Config) -> Self {
        RugcheckConfig {
            base_url: config.provider.api_url.clone(),
            api_key: config.provider.get_api_key(),
            timeout: Duration::from_secs(config.provider.timeout_secs),
        }
    }
}
