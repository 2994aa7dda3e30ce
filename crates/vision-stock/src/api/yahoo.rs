//! Yahoo Finance API client

use super::{OverviewProvider, PriceHistoryProvider, Quote, normalize_symbol};
use crate::config::StockConfig;
use crate::error::{Result, StockError};
use crate::overview::CompanyOverview;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use std::future::Future;
use std::num::NonZeroU32;
use std::sync::Arc;
use time::OffsetDateTime;
use tracing::{debug, instrument, warn};
use yahoo_finance_api as yahoo;

type SharedRateLimiter = Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>;

/// Single, unretried calls against Yahoo Finance
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait YahooSource: Send + Sync {
    /// Daily bars between `start` and `end` in whatever order Yahoo returns
    async fn quote_history(
        &self,
        symbol: &str,
        start: OffsetDateTime,
        end: OffsetDateTime,
    ) -> Result<Vec<Quote>>;

    /// Profile and fundamentals from the quote summary endpoint
    async fn ticker_info(&self, symbol: &str) -> Result<CompanyOverview>;
}

/// [`YahooSource`] backed by `yahoo_finance_api`
#[derive(Debug, Default, Clone, Copy)]
pub struct ConnectorSource;

fn yahoo_error(e: impl std::fmt::Display) -> StockError {
    StockError::YahooFinanceError(e.to_string())
}

#[async_trait]
impl YahooSource for ConnectorSource {
    async fn quote_history(
        &self,
        symbol: &str,
        start: OffsetDateTime,
        end: OffsetDateTime,
    ) -> Result<Vec<Quote>> {
        let provider = yahoo::YahooConnector::new().map_err(yahoo_error)?;
        let response = provider
            .get_quote_history(symbol, start, end)
            .await
            .map_err(yahoo_error)?;

        let gmt_offset = response.metadata().map_err(yahoo_error)?.gmtoffset;
        let quotes = response.quotes().map_err(yahoo_error)?;

        quotes
            .iter()
            .map(|q| {
                let timestamp = DateTime::from_timestamp(q.timestamp, 0)
                    .ok_or_else(|| {
                        yahoo_error(format!("unrepresentable bar timestamp {}", q.timestamp))
                    })?;
                Ok(Quote {
                    symbol: symbol.to_string(),
                    timestamp,
                    gmt_offset,
                    open: q.open,
                    high: q.high,
                    low: q.low,
                    close: q.close,
                    volume: q.volume,
                    adjclose: q.adjclose,
                })
            })
            .collect()
    }

    async fn ticker_info(&self, symbol: &str) -> Result<CompanyOverview> {
        let mut provider = yahoo::YahooConnector::new().map_err(yahoo_error)?;
        let summary = provider.get_ticker_info(symbol).await.map_err(yahoo_error)?;
        overview_from_summary(symbol, summary)
    }
}

/// Flatten a quote summary response into a [`CompanyOverview`]
fn overview_from_summary(symbol: &str, summary: yahoo::YQuoteSummary) -> Result<CompanyOverview> {
    if let Some(error) = summary.finance.and_then(|finance| finance.error) {
        return Err(yahoo_error(
            error
                .description
                .or(error.code)
                .unwrap_or_else(|| "quote summary error".to_string()),
        ));
    }

    let data = summary
        .quote_summary
        .and_then(|s| s.result)
        .and_then(|results| results.into_iter().next())
        .ok_or_else(|| StockError::DataUnavailable {
            symbol: symbol.to_string(),
            reason: "No company information found".to_string(),
        })?;

    let mut overview = CompanyOverview::new(symbol);

    if let Some(quote_type) = data.quote_type {
        overview.name = quote_type.long_name.or(quote_type.short_name);
    }
    if let Some(profile) = data.asset_profile {
        overview.sector = profile.sector;
        overview.industry = profile.industry;
        overview.website = profile.website;
        overview.employees = profile.full_time_employees;
        overview.business_summary = profile.long_business_summary;
    }
    if let Some(detail) = data.summary_detail {
        overview.currency = detail.currency;
        overview.market_cap = detail.market_cap;
        overview.beta = detail.beta;
        overview.pe_ratio = detail.trailing_pe;
        overview.dividend_yield = detail.dividend_yield;
        overview.previous_close = detail.previous_close;
        overview.open = detail.open;
        overview.high_52w = detail.fifty_two_week_high;
        overview.low_52w = detail.fifty_two_week_low;
    }
    if let Some(stats) = data.default_key_statistics {
        overview.eps = stats.trailing_eps;
        overview.beta = overview.beta.or(stats.beta);
    }
    if let Some(financials) = data.financial_data {
        overview.quick_ratio = financials.quick_ratio;
        overview.revenue_per_share = financials.revenue_per_share;
        overview.profit_margin = financials.profit_margins;
        overview.debt_to_equity = financials.debt_to_equity;
        overview.return_on_equity = financials.return_on_equity;
        if overview.currency.is_none() {
            overview.currency = financials.financial_currency;
        }
    }

    Ok(overview)
}

/// Yahoo Finance API client
///
/// Requests are rate limited, bounded by the configured timeout and retried
/// with exponential backoff on transient failures.
#[derive(Clone)]
pub struct YahooFinanceClient {
    config: Arc<StockConfig>,
    rate_limiter: SharedRateLimiter,
    source: Arc<dyn YahooSource>,
}

impl YahooFinanceClient {
    /// Create a new Yahoo Finance client
    pub fn new(config: Arc<StockConfig>) -> Self {
        Self::with_source(config, Arc::new(ConnectorSource))
    }

    /// Create a client over a custom source
    pub fn with_source(config: Arc<StockConfig>, source: Arc<dyn YahooSource>) -> Self {
        let per_minute = NonZeroU32::new(config.rate_limit_per_minute).unwrap_or(NonZeroU32::MIN);
        let rate_limiter = Arc::new(RateLimiter::direct(Quota::per_minute(per_minute)));

        Self {
            config,
            rate_limiter,
            source,
        }
    }

    async fn with_retry<T, F, Fut>(&self, symbol: &str, mut call: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut attempt = 0;
        loop {
            self.rate_limiter.until_ready().await;

            let outcome = match tokio::time::timeout(self.config.request_timeout, call()).await {
                Ok(result) => result,
                Err(_) => Err(StockError::Timeout(symbol.to_string())),
            };

            match outcome {
                Err(e) if e.is_transient() && attempt + 1 < self.config.max_retries => {
                    let backoff = self.config.retry_backoff(attempt);
                    warn!(attempt, ?backoff, error = %e, "Yahoo request failed, retrying");
                    tokio::time::sleep(backoff).await;
                    attempt += 1;
                }
                other => return other,
            }
        }
    }
}

#[async_trait]
impl PriceHistoryProvider for YahooFinanceClient {
    #[instrument(skip(self), fields(provider = "yahoo"))]
    async fn historical_quotes(
        &self,
        symbol: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Quote>> {
        let symbol = normalize_symbol(symbol)?;

        // Convert chrono DateTime to time OffsetDateTime
        let start_odt = OffsetDateTime::from_unix_timestamp(start.timestamp())
            .map_err(|e| StockError::InvalidRange(format!("Invalid start timestamp: {e}")))?;
        let end_odt = OffsetDateTime::from_unix_timestamp(end.timestamp())
            .map_err(|e| StockError::InvalidRange(format!("Invalid end timestamp: {e}")))?;
        if start_odt >= end_odt {
            return Err(StockError::InvalidRange(format!(
                "start {start} is not before end {end}"
            )));
        }

        let mut quotes = self
            .with_retry(&symbol, || {
                self.source.quote_history(&symbol, start_odt, end_odt)
            })
            .await?;
        quotes.sort_by_key(|q| q.timestamp);
        debug!(count = quotes.len(), "Fetched quote history");
        Ok(quotes)
    }
}

#[async_trait]
impl OverviewProvider for YahooFinanceClient {
    #[instrument(skip(self), fields(provider = "yahoo"))]
    async fn company_overview(&self, symbol: &str) -> Result<CompanyOverview> {
        let symbol = normalize_symbol(symbol)?;
        self.with_retry(&symbol, || self.source.ticker_info(&symbol))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration as StdDuration;

    fn client() -> YahooFinanceClient {
        YahooFinanceClient::new(Arc::new(StockConfig::default()))
    }

    fn fast_retry_config() -> Arc<StockConfig> {
        Arc::new(
            StockConfig::builder()
                .max_retries(3)
                .retry_backoff_base(StdDuration::from_millis(1))
                .build()
                .unwrap(),
        )
    }

    fn bar(day: u32, close: f64) -> Quote {
        Quote {
            symbol: "AAPL".to_string(),
            timestamp: Utc.with_ymd_and_hms(2024, 6, day, 13, 30, 0).unwrap(),
            gmt_offset: -14_400,
            open: close,
            high: close,
            low: close,
            close,
            volume: 100,
            adjclose: close,
        }
    }

    fn week() -> (DateTime<Utc>, DateTime<Utc>) {
        let end = Utc.with_ymd_and_hms(2024, 6, 8, 0, 0, 0).unwrap();
        (end - Duration::days(7), end)
    }

    #[tokio::test]
    async fn test_rejects_inverted_range() {
        let now = Utc::now();
        let result = client()
            .historical_quotes("AAPL", now, now - Duration::days(1))
            .await;
        assert!(matches!(result, Err(StockError::InvalidRange(_))));
    }

    #[tokio::test]
    async fn test_rejects_bad_symbol() {
        let now = Utc::now();
        let result = client()
            .historical_quotes("NOT A SYMBOL", now - Duration::days(5), now)
            .await;
        assert!(matches!(result, Err(StockError::InvalidSymbol(_))));
    }

    #[tokio::test]
    async fn test_transient_errors_are_retried() {
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&calls);

        let mut source = MockYahooSource::new();
        source
            .expect_quote_history()
            .times(3)
            .returning(move |_, _, _| match seen.fetch_add(1, Ordering::SeqCst) {
                0 => Err(StockError::Timeout("AAPL".to_string())),
                1 => Err(StockError::YahooFinanceError("502 Bad Gateway".to_string())),
                _ => Ok(vec![bar(7, 2.0), bar(6, 1.0)]),
            });

        let client = YahooFinanceClient::with_source(fast_retry_config(), Arc::new(source));
        let (start, end) = week();
        let quotes = client.historical_quotes("aapl", start, end).await.unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 3);
        // Sorted oldest first
        assert_eq!(quotes[0].close, 1.0);
        assert_eq!(quotes[1].close, 2.0);
    }

    #[tokio::test]
    async fn test_retries_stop_at_max_attempts() {
        let mut source = MockYahooSource::new();
        source
            .expect_quote_history()
            .times(3)
            .returning(|_, _, _| Err(StockError::Timeout("AAPL".to_string())));

        let client = YahooFinanceClient::with_source(fast_retry_config(), Arc::new(source));
        let (start, end) = week();
        let result = client.historical_quotes("AAPL", start, end).await;

        assert!(matches!(result, Err(StockError::Timeout(_))));
    }

    #[tokio::test]
    async fn test_permanent_errors_are_not_retried() {
        let mut source = MockYahooSource::new();
        source.expect_quote_history().times(1).returning(|_, _, _| {
            Err(StockError::DataUnavailable {
                symbol: "AAPL".to_string(),
                reason: "delisted".to_string(),
            })
        });

        let client = YahooFinanceClient::with_source(fast_retry_config(), Arc::new(source));
        let (start, end) = week();
        let result = client.historical_quotes("AAPL", start, end).await;

        assert!(matches!(result, Err(StockError::DataUnavailable { .. })));
    }

    #[tokio::test]
    async fn test_overview_goes_through_retry() {
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&calls);

        let mut source = MockYahooSource::new();
        source
            .expect_ticker_info()
            .times(2)
            .returning(move |symbol| {
                if seen.fetch_add(1, Ordering::SeqCst) == 0 {
                    Err(StockError::YahooFinanceError("Invalid Crumb".to_string()))
                } else {
                    Ok(CompanyOverview::new(symbol))
                }
            });

        let client = YahooFinanceClient::with_source(fast_retry_config(), Arc::new(source));
        let overview = client.company_overview("tcs.ns").await.unwrap();

        assert_eq!(overview.symbol, "TCS.NS");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_overview_from_summary() {
        let summary = yahoo::YQuoteSummary::from_json(serde_json::json!({
            "quoteSummary": {
                "result": [{
                    "assetProfile": {
                        "sector": "Technology",
                        "industry": "Consumer Electronics",
                        "website": "https://www.apple.com",
                        "longBusinessSummary": "Apple Inc. designs smartphones.",
                        "fullTimeEmployees": 161000,
                        "companyOfficers": []
                    },
                    "summaryDetail": {
                        "previousClose": 189.5,
                        "open": 190.1,
                        "marketCap": 2950000000000u64,
                        "beta": 1.29,
                        "trailingPE": 29.4,
                        "dividendYield": 0.0051,
                        "fiftyTwoWeekLow": 164.08,
                        "fiftyTwoWeekHigh": 199.62,
                        "currency": "USD"
                    },
                    "defaultKeyStatistics": { "trailingEps": 6.43 },
                    "quoteType": { "symbol": "AAPL", "longName": "Apple Inc." },
                    "financialData": {
                        "quickRatio": 0.84,
                        "revenuePerShare": 24.5,
                        "profitMargins": 0.26,
                        "debtToEquity": 145.8,
                        "returnOnEquity": 1.47
                    }
                }],
                "error": null
            }
        }))
        .unwrap();

        let overview = overview_from_summary("AAPL", summary).unwrap();
        assert_eq!(overview.display_name(), "Apple Inc.");
        assert_eq!(overview.sector.as_deref(), Some("Technology"));
        assert_eq!(overview.employees, Some(161_000));
        assert_eq!(overview.currency.as_deref(), Some("USD"));
        assert_eq!(overview.market_cap, Some(2_950_000_000_000));
        assert_eq!(overview.eps, Some(6.43));
        assert_eq!(overview.pe_ratio, Some(29.4));
        assert_eq!(overview.high_52w, Some(199.62));
        assert_eq!(overview.quick_ratio, Some(0.84));
        assert_eq!(overview.return_on_equity, Some(1.47));
    }

    #[test]
    fn test_overview_from_empty_summary() {
        let summary = yahoo::YQuoteSummary::from_json(serde_json::json!({
            "quoteSummary": { "result": [], "error": null }
        }))
        .unwrap();
        assert!(matches!(
            overview_from_summary("ZZZZ", summary),
            Err(StockError::DataUnavailable { .. })
        ));

        let summary = yahoo::YQuoteSummary::from_json(serde_json::json!({
            "finance": {
                "result": null,
                "error": { "code": "Unauthorized", "description": "Invalid Crumb" }
            }
        }))
        .unwrap();
        assert!(matches!(
            overview_from_summary("AAPL", summary),
            Err(StockError::YahooFinanceError(msg)) if msg == "Invalid Crumb"
        ));
    }

    #[tokio::test]
    #[ignore] // Requires network access
    async fn test_get_historical_range() {
        let quotes = client().historical_range("aapl", "1mo").await.unwrap();
        assert!(!quotes.is_empty());
        assert_eq!(quotes[0].symbol, "AAPL");
        assert!(quotes.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
    }

    #[tokio::test]
    #[ignore] // Requires network access
    async fn test_asx_bars_land_on_weekdays() {
        let quotes = client().historical_range("BHP.AX", "1mo").await.unwrap();
        assert!(quotes.iter().all(|q| crate::forecast::calendar::is_business_day(q.date())));
    }

    #[tokio::test]
    #[ignore] // Requires network access
    async fn test_get_company_overview() {
        let overview = client().company_overview("AAPL").await.unwrap();
        assert!(overview.display_name().contains("Apple"));
    }
}
