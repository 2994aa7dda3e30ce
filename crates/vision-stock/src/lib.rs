//! Stock data, analysis and closing-price forecasting
//!
//! This crate backs the `stock-vision` dashboard:
//!
//! - Daily price history from Yahoo Finance, rate limited, retried and cached
//! - Company profile, market metrics and financial ratios
//! - Technical indicators (RSI, MACD, SMA) and chart-ready series
//! - A recursive sliding-window forecaster driven by a one-step model,
//!   with an inference-only LSTM loaded from exported weights
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use vision_stock::{PredictionRequest, PredictionService, StockConfig, YahooFinanceClient};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Arc::new(StockConfig::builder().model_path("lstm.json").build()?);
//!     let provider = Arc::new(YahooFinanceClient::new(Arc::clone(&config)));
//!     let service = PredictionService::from_config(provider, config)?;
//!
//!     let report = service.predict(&PredictionRequest::new("AAPL")).await?;
//!     for point in &report.forecast {
//!         println!("{} {:.2}", point.date, point.price);
//!     }
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod cache;
pub mod chart;
pub mod config;
pub mod currency;
pub mod error;
pub mod forecast;
pub mod indicators;
pub mod overview;
pub mod service;
pub mod summary;

pub use api::{OverviewProvider, PriceHistoryProvider, Quote, YahooFinanceClient};
pub use cache::{CachedHistoryProvider, StockCache};
pub use chart::{ChartData, ChartPeriod, ForecastOverlay, IndicatorSeries};
pub use config::StockConfig;
pub use error::{Result, StockError};
pub use forecast::{
    ForecastError, ForecastPoint, Forecaster, LstmModel, MeanModel, MinMaxScaler, OneStepModel,
};
pub use indicators::IndicatorKind;
pub use overview::CompanyOverview;
pub use service::{
    AnalysisReport, AnalysisRequest, PredictionReport, PredictionRequest, PredictionService,
    analyze,
};
pub use summary::StockSummary;
