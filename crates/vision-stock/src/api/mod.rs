//! Price history providers

pub mod yahoo;

use crate::error::{Result, StockError};
use crate::overview::CompanyOverview;
use async_trait::async_trait;
use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

pub use yahoo::{ConnectorSource, YahooFinanceClient, YahooSource};

/// One daily bar
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub symbol: String,
    /// Bar time as reported, usually the session open
    pub timestamp: DateTime<Utc>,
    /// Exchange offset from UTC in seconds
    #[serde(default)]
    pub gmt_offset: i32,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
    pub adjclose: f64,
}

impl Quote {
    /// Trading date of the bar in the exchange's local time
    pub fn date(&self) -> NaiveDate {
        match FixedOffset::east_opt(self.gmt_offset) {
            Some(offset) => self.timestamp.with_timezone(&offset).date_naive(),
            None => self.timestamp.date_naive(),
        }
    }
}

/// Source of chronologically ordered daily quotes
///
/// An empty result means "no data" for the symbol and range; callers treat
/// it as terminal.
#[async_trait]
pub trait PriceHistoryProvider: Send + Sync {
    /// Daily quotes between `start` and `end`, oldest first
    async fn historical_quotes(
        &self,
        symbol: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Quote>>;

    /// Daily quotes for a named range ending now
    async fn historical_range(&self, symbol: &str, range: &str) -> Result<Vec<Quote>> {
        let end = Utc::now();
        let start = range_start(range, end)?;
        self.historical_quotes(symbol, start, end).await
    }
}

/// Source of company profiles and fundamentals
#[async_trait]
pub trait OverviewProvider: Send + Sync {
    async fn company_overview(&self, symbol: &str) -> Result<CompanyOverview>;
}

/// Start of a named range (`5d`, `1mo`, `ytd`, `max`, ...) ending at `end`
pub fn range_start(range: &str, end: DateTime<Utc>) -> Result<DateTime<Utc>> {
    let start = match range.to_ascii_lowercase().as_str() {
        "1d" => end - Duration::days(1),
        "5d" => end - Duration::days(5),
        "1mo" => end - Duration::days(30),
        "3mo" => end - Duration::days(90),
        "6mo" => end - Duration::days(180),
        "1y" => end - Duration::days(365),
        "2y" => end - Duration::days(730),
        "5y" => end - Duration::days(1825),
        "10y" => end - Duration::days(3650),
        "ytd" => NaiveDate::from_ymd_opt(end.year(), 1, 1)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|d| d.and_utc())
            .ok_or_else(|| StockError::InvalidRange(range.to_string()))?,
        "max" => end - Duration::days(36500), // ~100 years
        _ => return Err(StockError::InvalidRange(range.to_string())),
    };
    Ok(start)
}

/// Upper-case and sanity-check a ticker symbol
pub fn normalize_symbol(symbol: &str) -> Result<String> {
    let symbol = symbol.trim().to_uppercase();
    let valid = !symbol.is_empty()
        && symbol.len() <= 20
        && symbol
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '^' | '=' | '&'));

    if valid {
        Ok(symbol)
    } else {
        Err(StockError::InvalidSymbol(symbol))
    }
}
