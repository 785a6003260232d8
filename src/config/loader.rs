//! Configuration Loader
//!
//! Loads and validates configuration from TOML files matching radar.toml structure.
//! Every section and key is optional; missing values take the built-in defaults.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::adapters::dexscreener::{DEFAULT_COHORT_URL, DEFAULT_SEARCH_URL, DEFAULT_USER_AGENT};
use crate::application::aggregator::{AggregatorSettings, DEFAULT_MAX_RESULTS};
use crate::application::poller::DEFAULT_POLL_INTERVAL;
use crate::domain::normalizer::{
    DEFAULT_CHART_BASE_URL, DEFAULT_NATIVE_ALIASES, DEFAULT_NATIVE_PRICE, DEFAULT_NATIVE_USD_PRICE,
};
use crate::domain::{NormalizerConfig, DEFAULT_COHORT_KEYWORD, DEFAULT_MOCK_COUNT};

/// Overrides `feed.cohort_url`
pub const COHORT_URL_ENV: &str = "MAYHEM_RADAR_COHORT_URL";
/// Overrides `feed.search_url`
pub const SEARCH_URL_ENV: &str = "MAYHEM_RADAR_SEARCH_URL";

/// Main configuration structure matching radar.toml
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RadarConfig {
    pub feed: FeedSection,
    pub pipeline: PipelineSection,
    pub poller: PollerSection,
    pub logging: LoggingSection,
}

/// Upstream DexScreener endpoints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedSection {
    /// Pump.fun cohort listing
    pub cohort_url: String,
    /// Keyword search endpoint
    pub search_url: String,
    /// Per-request timeout
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for FeedSection {
    fn default() -> Self {
        Self {
            cohort_url: DEFAULT_COHORT_URL.to_string(),
            search_url: DEFAULT_SEARCH_URL.to_string(),
            timeout_secs: 10,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl FeedSection {
    /// Get cohort URL with environment variable override
    /// Checks MAYHEM_RADAR_COHORT_URL env var first, falls back to config value
    pub fn get_cohort_url(&self) -> String {
        env_override(COHORT_URL_ENV).unwrap_or_else(|| self.cohort_url.clone())
    }

    /// Get search URL with environment variable override
    /// Checks MAYHEM_RADAR_SEARCH_URL env var first, falls back to config value
    pub fn get_search_url(&self) -> String {
        env_override(SEARCH_URL_ENV).unwrap_or_else(|| self.search_url.clone())
    }
}

fn env_override(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Normalization and ranking settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineSection {
    /// Cohort keyword matched against tags and text
    pub keyword: String,
    /// USD per SOL used when a listing has no usable prices
    pub default_native_usd_price: f64,
    /// Native price assumed when a listing omits it
    pub default_native_price: f64,
    /// Quote symbols treated as the native currency
    pub native_aliases: Vec<String>,
    /// Live batch size cap
    pub max_results: usize,
    /// Size of the synthetic fallback batch
    pub mock_count: usize,
    pub chart_base_url: String,
    /// Fixed seed for reproducible fallback values
    pub rng_seed: Option<u64>,
}

impl Default for PipelineSection {
    fn default() -> Self {
        Self {
            keyword: DEFAULT_COHORT_KEYWORD.to_string(),
            default_native_usd_price: DEFAULT_NATIVE_USD_PRICE,
            default_native_price: DEFAULT_NATIVE_PRICE,
            native_aliases: DEFAULT_NATIVE_ALIASES.iter().map(|s| s.to_string()).collect(),
            max_results: DEFAULT_MAX_RESULTS,
            mock_count: DEFAULT_MOCK_COUNT,
            chart_base_url: DEFAULT_CHART_BASE_URL.to_string(),
            rng_seed: None,
        }
    }
}

impl PipelineSection {
    pub fn normalizer_config(&self) -> NormalizerConfig {
        NormalizerConfig {
            native_usd_price: self.default_native_usd_price,
            default_native_price: self.default_native_price,
            native_aliases: self
                .native_aliases
                .iter()
                .map(|alias| alias.trim())
                .filter(|alias| !alias.is_empty())
                .map(str::to_string)
                .collect(),
            chart_base_url: self.chart_base_url.clone(),
        }
    }

    pub fn aggregator_settings(&self) -> AggregatorSettings {
        AggregatorSettings {
            max_results: self.max_results,
            mock_count: self.mock_count,
            rng_seed: self.rng_seed,
        }
    }
}

/// Poll loop settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollerSection {
    pub interval_secs: u64,
}

impl Default for PollerSection {
    fn default() -> Self {
        Self {
            interval_secs: DEFAULT_POLL_INTERVAL.as_secs(),
        }
    }
}

/// Logging configuration section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Log level: "trace", "debug", "info", "warn", "error"
    pub level: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
        }
    }
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

/// Expand `~` and environment variables in a user-supplied path
pub fn expand_path(path: &str) -> PathBuf {
    match shellexpand::full(path) {
        Ok(expanded) => PathBuf::from(expanded.as_ref()),
        Err(_) => PathBuf::from(shellexpand::tilde(path).as_ref()),
    }
}

/// Load configuration from a TOML file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<RadarConfig, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config: RadarConfig = toml::from_str(&content)?;
    config.validate()?;
    Ok(config)
}

/// Load from `path` when given, else the validated defaults
pub fn load_config_or_default(path: Option<&str>) -> Result<RadarConfig, ConfigError> {
    match path {
        Some(path) => load_config(expand_path(path)),
        None => {
            let config = RadarConfig::default();
            config.validate()?;
            Ok(config)
        }
    }
}

fn invalid(message: impl Into<String>) -> ConfigError {
    ConfigError::ValidationError(message.into())
}

impl RadarConfig {
    /// Validate all configuration parameters
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.feed.cohort_url.trim().is_empty() {
            return Err(invalid("feed.cohort_url cannot be empty"));
        }
        if self.feed.search_url.trim().is_empty() {
            return Err(invalid("feed.search_url cannot be empty"));
        }
        if self.feed.timeout_secs == 0 {
            return Err(invalid("feed.timeout_secs must be > 0"));
        }

        let pipeline = &self.pipeline;
        if pipeline.keyword.trim().is_empty() {
            return Err(invalid("pipeline.keyword cannot be empty"));
        }
        if !(pipeline.default_native_usd_price.is_finite() && pipeline.default_native_usd_price > 0.0) {
            return Err(invalid(format!(
                "pipeline.default_native_usd_price must be > 0, got {}",
                pipeline.default_native_usd_price
            )));
        }
        if !(pipeline.default_native_price.is_finite() && pipeline.default_native_price > 0.0) {
            return Err(invalid(format!(
                "pipeline.default_native_price must be > 0, got {}",
                pipeline.default_native_price
            )));
        }
        if pipeline.native_aliases.iter().all(|a| a.trim().is_empty()) {
            return Err(invalid("pipeline.native_aliases needs at least one symbol"));
        }
        if pipeline.max_results == 0 {
            return Err(invalid("pipeline.max_results must be > 0"));
        }
        if pipeline.mock_count == 0 {
            return Err(invalid("pipeline.mock_count must be > 0"));
        }

        if self.poller.interval_secs == 0 {
            return Err(invalid("poller.interval_secs must be > 0"));
        }

        Ok(())
    }
}
