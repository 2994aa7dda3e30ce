//! Configuration for data retrieval and prediction

use crate::error::{Result, StockError};
use crate::forecast::{DEFAULT_HORIZON, MAX_HORIZON, WINDOW_SIZE};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Configuration for stock data and prediction operations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockConfig {
    /// Cache TTL for price history
    pub cache_ttl_history: Duration,

    /// Maximum number of attempts for API calls
    pub max_retries: u32,

    /// Initial backoff duration for retries
    pub retry_backoff_base: Duration,

    /// Request timeout duration
    pub request_timeout: Duration,

    /// Requests per minute allowed against the quote API
    pub rate_limit_per_minute: u32,

    /// Years of history fetched for predictions when no start date is given
    pub history_years: u32,

    /// Business days to forecast
    pub horizon: usize,

    /// Model window length the loaded model must match
    pub window_size: usize,

    /// Exported LSTM weights
    pub model_path: Option<PathBuf>,

    /// Saved training-time scaler; when unset the scaler is fitted on the
    /// fetched history
    pub scaler_path: Option<PathBuf>,
}

impl Default for StockConfig {
    fn default() -> Self {
        Self {
            cache_ttl_history: Duration::from_secs(300),        // 5 minutes
            max_retries: 3,
            retry_backoff_base: Duration::from_secs(1),
            request_timeout: Duration::from_secs(30),
            rate_limit_per_minute: 60,
            history_years: 10,
            horizon: DEFAULT_HORIZON,
            window_size: WINDOW_SIZE,
            model_path: None,
            scaler_path: None,
        }
    }
}

impl StockConfig {
    /// Create a new configuration builder
    pub fn builder() -> StockConfigBuilder {
        StockConfigBuilder::default()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.max_retries == 0 {
            return Err(StockError::ConfigError(
                "max_retries must be greater than 0".to_string(),
            ));
        }

        if self.rate_limit_per_minute == 0 {
            return Err(StockError::ConfigError(
                "rate_limit_per_minute must be greater than 0".to_string(),
            ));
        }

        if self.horizon == 0 || self.horizon > MAX_HORIZON {
            return Err(StockError::ConfigError(format!(
                "horizon must be between 1 and {MAX_HORIZON}"
            )));
        }

        if self.window_size == 0 {
            return Err(StockError::ConfigError(
                "window_size must be greater than 0".to_string(),
            ));
        }

        if self.history_years == 0 {
            return Err(StockError::ConfigError(
                "history_years must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Get retry backoff duration for attempt number
    ///
    /// Doubles per attempt and saturates instead of overflowing.
    pub fn retry_backoff(&self, attempt: u32) -> Duration {
        self.retry_backoff_base.saturating_mul(2_u32.saturating_pow(attempt))
    }
}

/// Builder for StockConfig
#[derive(Debug, Default)]
pub struct StockConfigBuilder {
    cache_ttl_history: Option<Duration>,
    max_retries: Option<u32>,
    retry_backoff_base: Option<Duration>,
    request_timeout: Option<Duration>,
    rate_limit_per_minute: Option<u32>,
    history_years: Option<u32>,
    horizon: Option<usize>,
    window_size: Option<usize>,
    model_path: Option<PathBuf>,
    scaler_path: Option<PathBuf>,
}

impl StockConfigBuilder {
    /// Set cache TTL for price history
    pub fn cache_ttl_history(mut self, duration: Duration) -> Self {
        self.cache_ttl_history = Some(duration);
        self
    }

    /// Set maximum retries
    pub fn max_retries(mut self, retries: u32) -> Self {
        self.max_retries = Some(retries);
        self
    }

    /// Set retry backoff base duration
    pub fn retry_backoff_base(mut self, duration: Duration) -> Self {
        self.retry_backoff_base = Some(duration);
        self
    }

    /// Set request timeout
    pub fn request_timeout(mut self, duration: Duration) -> Self {
        self.request_timeout = Some(duration);
        self
    }

    /// Set the quote API rate limit
    pub fn rate_limit_per_minute(mut self, limit: u32) -> Self {
        self.rate_limit_per_minute = Some(limit);
        self
    }

    /// Set default history length for predictions
    pub fn history_years(mut self, years: u32) -> Self {
        self.history_years = Some(years);
        self
    }

    /// Set forecast horizon
    pub fn horizon(mut self, horizon: usize) -> Self {
        self.horizon = Some(horizon);
        self
    }

    /// Set model window length
    pub fn window_size(mut self, window_size: usize) -> Self {
        self.window_size = Some(window_size);
        self
    }

    /// Set model weights path
    pub fn model_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.model_path = Some(path.into());
        self
    }

    /// Set saved scaler path
    pub fn scaler_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.scaler_path = Some(path.into());
        self
    }

    /// Fill unset paths from `STOCK_VISION_MODEL_PATH` / `STOCK_VISION_SCALER_PATH`
    pub fn with_env_paths(mut self) -> Self {
        if self.model_path.is_none() {
            if let Ok(path) = std::env::var("STOCK_VISION_MODEL_PATH") {
                self.model_path = Some(path.into());
            }
        }
        if self.scaler_path.is_none() {
            if let Ok(path) = std::env::var("STOCK_VISION_SCALER_PATH") {
                self.scaler_path = Some(path.into());
            }
        }
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<StockConfig> {
        let defaults = StockConfig::default();

        let config = StockConfig {
            cache_ttl_history: self.cache_ttl_history.unwrap_or(defaults.cache_ttl_history),
            max_retries: self.max_retries.unwrap_or(defaults.max_retries),
            retry_backoff_base: self.retry_backoff_base.unwrap_or(defaults.retry_backoff_base),
            request_timeout: self.request_timeout.unwrap_or(defaults.request_timeout),
            rate_limit_per_minute: self
                .rate_limit_per_minute
                .unwrap_or(defaults.rate_limit_per_minute),
            history_years: self.history_years.unwrap_or(defaults.history_years),
            horizon: self.horizon.unwrap_or(defaults.horizon),
            window_size: self.window_size.unwrap_or(defaults.window_size),
            model_path: self.model_path,
            scaler_path: self.scaler_path,
        };

        config.validate()?;
        Ok(config)
    }
}
