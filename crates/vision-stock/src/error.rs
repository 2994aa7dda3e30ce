//! Error types for stock data and prediction operations

use crate::forecast::{ForecastError, ModelError};
use thiserror::Error;

/// Stock dashboard specific errors
#[derive(Debug, Error)]
pub enum StockError {
    /// Invalid stock symbol provided
    #[error("Invalid symbol: {0}")]
    InvalidSymbol(String),

    /// Unknown history range or chart period
    #[error("Invalid range: {0}")]
    InvalidRange(String),

    /// Data not available for the requested symbol
    #[error("Data not available for {symbol}: {reason}")]
    DataUnavailable {
        symbol: String,
        reason: String,
    },

    /// Request did not complete in time
    #[error("Request for {0} timed out")]
    Timeout(String),

    /// Yahoo Finance API error
    #[error("Yahoo Finance error: {0}")]
    YahooFinanceError(String),

    /// Technical indicator calculation error
    #[error("Technical indicator error: {0}")]
    IndicatorError(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Forecasting failed
    #[error(transparent)]
    Forecast(#[from] ForecastError),

    /// Model could not be loaded
    #[error("Model error: {0}")]
    Model(#[from] ModelError),
}

/// Result type alias for stock operations
pub type Result<T> = std::result::Result<T, StockError>;

impl StockError {
    /// Whether retrying the same request may succeed
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            StockError::Timeout(_) | StockError::YahooFinanceError(_)
        )
    }
}
