//! Configuration for market-data fetching and AI analysis

use crate::error::{Result, StockError};
use finance_utils::env_var;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// History ranges accepted by the market-data fetcher
pub const SUPPORTED_RANGES: &[&str] = &[
    "5d", "1mo", "3mo", "6mo", "1y", "2y", "5y", "10y", "ytd", "max",
];

/// Market-data settings shared by every fetch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockConfig {
    /// Window of daily closes fetched per ticker, one of [`SUPPORTED_RANGES`]
    pub history_range: String,

    /// Retries after the first failed attempt
    pub max_retries: u32,

    pub retry_backoff_base: Duration,

    pub request_timeout: Duration,

    /// Enables company fundamentals when set
    pub alpha_vantage_api_key: Option<String>,
}

impl Default for StockConfig {
    fn default() -> Self {
        Self {
            history_range: "1y".to_string(),
            max_retries: 2,
            retry_backoff_base: Duration::from_millis(500),
            request_timeout: Duration::from_secs(30),
            alpha_vantage_api_key: None,
        }
    }
}

impl StockConfig {
    pub fn builder() -> StockConfigBuilder {
        StockConfigBuilder {
            config: Self::default(),
        }
    }

    /// Take the Alpha Vantage key from `ALPHA_VANTAGE_API_KEY`, if set
    pub fn with_env_api_key(mut self) -> Self {
        if let Some(key) = env_var("ALPHA_VANTAGE_API_KEY") {
            self.alpha_vantage_api_key = Some(key);
        }
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !SUPPORTED_RANGES.contains(&self.history_range.as_str()) {
            return Err(StockError::ConfigError(format!(
                "Unsupported history range '{}', expected one of: {}",
                self.history_range,
                SUPPORTED_RANGES.join(", ")
            )));
        }
        if self.request_timeout.is_zero() {
            return Err(StockError::ConfigError(
                "request_timeout must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Delay before retry `attempt` (0-based): base * 2^attempt
    pub fn retry_backoff(&self, attempt: u32) -> Duration {
        self.retry_backoff_base
            .saturating_mul(2_u32.saturating_pow(attempt))
    }
}

/// Builds a validated [`StockConfig`], starting from the defaults
#[derive(Debug)]
pub struct StockConfigBuilder {
    config: StockConfig,
}

impl StockConfigBuilder {
    pub fn history_range(mut self, range: impl Into<String>) -> Self {
        self.config.history_range = range.into();
        self
    }

    pub fn max_retries(mut self, retries: u32) -> Self {
        self.config.max_retries = retries;
        self
    }

    pub fn retry_backoff_base(mut self, base: Duration) -> Self {
        self.config.retry_backoff_base = base;
        self
    }

    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.config.request_timeout = timeout;
        self
    }

    pub fn alpha_vantage_api_key(mut self, key: impl Into<String>) -> Self {
        self.config.alpha_vantage_api_key = Some(key.into());
        self
    }

    pub fn with_env_api_key(mut self) -> Self {
        self.config = self.config.with_env_api_key();
        self
    }

    pub fn build(self) -> Result<StockConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

/// Default Groq model
pub const DEFAULT_MODEL: &str = "llama3-70b-8192";

/// Settings for the language-model request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Model identifier sent to the provider
    pub model: String,

    /// Sampling temperature
    pub temperature: f32,

    /// Maximum tokens to generate
    pub max_tokens: usize,

    /// Prompts longer than this are rejected rather than truncated
    pub max_prompt_chars: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            temperature: 0.2,
            max_tokens: 2048,
            max_prompt_chars: 24_000,
        }
    }
}

impl AnalysisConfig {
    /// Defaults, with the model overridden by `GROQ_MODEL` when set
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(model) = env_var("GROQ_MODEL") {
            config.model = model;
        }
        config
    }

    /// Set the model
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the prompt length limit
    pub fn with_max_prompt_chars(mut self, limit: usize) -> Self {
        self.max_prompt_chars = limit;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_one_year_window() {
        let config = StockConfig::default();
        assert_eq!(config.history_range, "1y");
        assert!(config.alpha_vantage_api_key.is_none());
        config.validate().unwrap();
    }

    #[test]
    fn test_builder_overrides() {
        let config = StockConfig::builder()
            .history_range("ytd")
            .max_retries(0)
            .request_timeout(Duration::from_secs(5))
            .alpha_vantage_api_key("demo")
            .build()
            .unwrap();

        assert_eq!(config.history_range, "ytd");
        assert_eq!(config.max_retries, 0);
        assert_eq!(config.request_timeout, Duration::from_secs(5));
        assert_eq!(config.alpha_vantage_api_key.as_deref(), Some("demo"));
    }

    #[test]
    fn test_unknown_range_rejected() {
        let result = StockConfig::builder().history_range("7w").build();
        assert!(matches!(result, Err(StockError::ConfigError(msg)) if msg.contains("7w")));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let result = StockConfig::builder().request_timeout(Duration::ZERO).build();
        assert!(matches!(result, Err(StockError::ConfigError(_))));
    }

    #[test]
    fn test_backoff_doubles() {
        let config = StockConfig::default();
        assert_eq!(config.retry_backoff(0), Duration::from_millis(500));
        assert_eq!(config.retry_backoff(3), Duration::from_millis(4000));
    }

    #[test]
    fn test_analysis_defaults() {
        let config = AnalysisConfig::default();
        assert_eq!(config.model, DEFAULT_MODEL);
        assert!((config.temperature - 0.2).abs() < f32::EPSILON);
        assert_eq!(config.max_tokens, 2048);
        assert_eq!(config.max_prompt_chars, 24_000);

        let config = config.with_model("llama-3.3-70b-versatile");
        assert_eq!(config.model, "llama-3.3-70b-versatile");
    }
}
