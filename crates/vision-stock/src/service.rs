//! End-to-end analysis and prediction over a price history provider

use chrono::{DateTime, Days, Months, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument, warn};

use crate::api::{OverviewProvider, PriceHistoryProvider, Quote, normalize_symbol};
use crate::chart::{ChartData, ChartPeriod, ForecastOverlay};
use crate::config::StockConfig;
use crate::currency::currency_for_symbol;
use crate::error::{Result, StockError};
use crate::forecast::{
    FittedPoint, ForecastPoint, Forecaster, LstmModel, MeanModel, MinMaxScaler, OneStepModel,
};
use crate::indicators::IndicatorKind;
use crate::overview::CompanyOverview;
use crate::summary::StockSummary;

/// Quotes listed in the "recent history" table
pub const RECENT_QUOTES: usize = 10;

/// Days of history summarized by the analysis view when no start is given
pub const ANALYSIS_LOOKBACK_DAYS: u64 = 365;

/// Inputs of one prediction run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredictionRequest {
    pub symbol: String,
    /// Defaults to `history_years` before `end`
    pub start: Option<NaiveDate>,
    /// Defaults to today
    pub end: Option<NaiveDate>,
    /// Defaults to the configured horizon
    pub horizon: Option<usize>,
}

impl PredictionRequest {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            start: None,
            end: None,
            horizon: None,
        }
    }

    pub fn with_range(mut self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        self.start = start;
        self.end = end;
        self
    }

    pub fn with_horizon(mut self, horizon: usize) -> Self {
        self.horizon = Some(horizon);
        self
    }
}

/// Inputs of the analysis view
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    pub symbol: String,
    /// Defaults to a year before `end`
    pub start: Option<NaiveDate>,
    /// Defaults to today
    pub end: Option<NaiveDate>,
    /// Window of the chart series, fetched independently of `start..end`
    pub period: ChartPeriod,
    pub indicator: Option<IndicatorKind>,
}

impl AnalysisRequest {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            start: None,
            end: None,
            period: ChartPeriod::default(),
            indicator: None,
        }
    }

    pub fn with_range(mut self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        self.start = start;
        self.end = end;
        self
    }

    pub fn with_period(mut self, period: ChartPeriod) -> Self {
        self.period = period;
        self
    }

    pub fn with_indicator(mut self, indicator: Option<IndicatorKind>) -> Self {
        self.indicator = indicator;
        self
    }
}

/// Result of a prediction run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionReport {
    pub symbol: String,
    pub currency: String,
    pub model: String,
    pub scaler: MinMaxScaler,
    pub history_points: usize,
    pub last_date: NaiveDate,
    pub last_close: f64,
    pub overview: Option<CompanyOverview>,
    /// In-sample predictions; empty when the history is exactly one window
    pub fitted: Vec<FittedPoint>,
    pub forecast: Vec<ForecastPoint>,
    pub overlay: ForecastOverlay,
    pub recent: Vec<Quote>,
}

/// Result of the analysis view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub summary: StockSummary,
    pub overview: Option<CompanyOverview>,
    pub chart: ChartData,
    pub recent: Vec<Quote>,
}

/// Fetches history and runs the forecaster on it
pub struct PredictionService {
    provider: Arc<dyn PriceHistoryProvider>,
    overview: Option<Arc<dyn OverviewProvider>>,
    forecaster: Forecaster,
    model_name: &'static str,
    scaler: Option<MinMaxScaler>,
    config: Arc<StockConfig>,
}

impl PredictionService {
    /// Build a service around an already loaded model
    pub fn new(
        provider: Arc<dyn PriceHistoryProvider>,
        model: Arc<dyn OneStepModel>,
        config: Arc<StockConfig>,
    ) -> Result<Self> {
        config.validate()?;
        if model.window_size() != config.window_size {
            return Err(StockError::ConfigError(format!(
                "model '{}' expects a window of {} but the configured window is {}",
                model.name(),
                model.window_size(),
                config.window_size
            )));
        }

        Ok(Self {
            provider,
            overview: None,
            model_name: model.name(),
            forecaster: Forecaster::new(model),
            scaler: None,
            config,
        })
    }

    /// Build a service from the model and scaler paths in `config`
    ///
    /// Without a model path the mean baseline is used.
    pub fn from_config(
        provider: Arc<dyn PriceHistoryProvider>,
        config: Arc<StockConfig>,
    ) -> Result<Self> {
        let model: Arc<dyn OneStepModel> = match &config.model_path {
            Some(path) => Arc::new(LstmModel::load(path)?),
            None => {
                warn!("No model weights configured, falling back to the mean baseline");
                Arc::new(MeanModel::new(config.window_size))
            }
        };

        let scaler = config
            .scaler_path
            .as_ref()
            .map(MinMaxScaler::load)
            .transpose()?;

        let mut service = Self::new(provider, model, config)?;
        service.scaler = scaler;
        Ok(service)
    }

    /// Use a fixed scaler instead of fitting one per request
    pub fn with_scaler(mut self, scaler: MinMaxScaler) -> Self {
        self.scaler = Some(scaler);
        self
    }

    /// Attach company details to prediction reports
    pub fn with_overview(mut self, overview: Arc<dyn OverviewProvider>) -> Self {
        self.overview = Some(overview);
        self
    }

    pub fn forecaster(&self) -> &Forecaster {
        &self.forecaster
    }

    /// Fetch history, then forecast the next business days
    ///
    /// An empty history is reported as [`StockError::DataUnavailable`]; a
    /// history shorter than the model window fails before any model call.
    #[instrument(skip(self), fields(model = self.model_name))]
    pub async fn predict(&self, request: &PredictionRequest) -> Result<PredictionReport> {
        let symbol = normalize_symbol(&request.symbol)?;
        let horizon = request.horizon.unwrap_or(self.config.horizon);
        let (start, end) = resolve_range(request.start, request.end, |end| {
            end.checked_sub_months(Months::new(self.config.history_years.saturating_mul(12)))
        })?;

        let quotes = self.provider.historical_quotes(&symbol, start, end).await?;
        let Some(last) = quotes.last() else {
            return Err(StockError::DataUnavailable {
                symbol,
                reason: "No data found for the ticker and date range".to_string(),
            });
        };
        let last_date = last.date();
        let last_close = last.close;

        let closes: Vec<f64> = quotes.iter().map(|q| q.close).collect();
        let dates: Vec<NaiveDate> = quotes.iter().map(Quote::date).collect();

        let scaler = match self.scaler {
            Some(scaler) => scaler,
            None => MinMaxScaler::fit(&closes)?,
        };

        let forecast = self
            .forecaster
            .forecast(&closes, last_date, horizon, &scaler)?;
        let fitted = if closes.len() > self.forecaster.window_size() {
            self.forecaster.fitted(&closes, &dates, &scaler)?
        } else {
            Vec::new()
        };

        let overview = fetch_overview(self.overview.as_deref(), &symbol).await;

        info!(
            symbol = %symbol,
            points = quotes.len(),
            horizon,
            "Prediction complete"
        );

        Ok(PredictionReport {
            currency: listing_currency(&symbol, overview.as_ref()),
            overview,
            model: self.model_name.to_string(),
            scaler,
            history_points: quotes.len(),
            last_date,
            last_close,
            fitted,
            overlay: ForecastOverlay::new(&quotes, &forecast),
            forecast,
            recent: tail(&quotes, RECENT_QUOTES),
            symbol,
        })
    }

    /// Predict a close from one day's prices without fetching anything
    pub fn predict_manual(&self, open: f64, high: f64, low: f64, volume: f64) -> Result<f64> {
        Ok(self.forecaster.predict_manual(open, high, low, volume)?)
    }
}

impl std::fmt::Debug for PredictionService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PredictionService")
            .field("forecaster", &self.forecaster)
            .field("scaler", &self.scaler)
            .finish_non_exhaustive()
    }
}

/// Named history range that covers a chart period
fn fetch_range(period: ChartPeriod) -> &'static str {
    match period {
        ChartPeriod::FiveYears => "5y",
        ChartPeriod::Max => "max",
        _ => "1y",
    }
}

/// Summary, company overview, chart series and recent quotes for one symbol
///
/// The summary and recent quotes cover `start..end`; the chart covers the
/// requested period ending at the latest available quote.
#[instrument(skip(provider, overview))]
pub async fn analyze(
    provider: &dyn PriceHistoryProvider,
    overview: Option<&dyn OverviewProvider>,
    request: &AnalysisRequest,
) -> Result<AnalysisReport> {
    let symbol = normalize_symbol(&request.symbol)?;
    let (start, end) = resolve_range(request.start, request.end, |end| {
        end.checked_sub_days(Days::new(ANALYSIS_LOOKBACK_DAYS))
    })?;

    let quotes = provider.historical_quotes(&symbol, start, end).await?;
    let Some(mut summary) = StockSummary::from_quotes(&symbol, &quotes) else {
        return Err(StockError::DataUnavailable {
            symbol,
            reason: "No data found. Please check the stock ticker and date range".to_string(),
        });
    };

    let overview = fetch_overview(overview, &symbol).await;
    summary.currency = listing_currency(&symbol, overview.as_ref());

    let chart_quotes = provider
        .historical_range(&symbol, fetch_range(request.period))
        .await?;
    let chart = ChartData::build(&symbol, &chart_quotes, request.period, request.indicator)?;

    Ok(AnalysisReport {
        summary,
        overview,
        chart,
        recent: tail(&quotes, RECENT_QUOTES),
    })
}

/// Best-effort company details; failures only cost the overview
async fn fetch_overview(
    provider: Option<&dyn OverviewProvider>,
    symbol: &str,
) -> Option<CompanyOverview> {
    match provider?.company_overview(symbol).await {
        Ok(overview) => Some(overview),
        Err(e) => {
            warn!(symbol, error = %e, "Company overview unavailable");
            None
        }
    }
}

/// Listing currency from the overview, else inferred from the symbol suffix
fn listing_currency(symbol: &str, overview: Option<&CompanyOverview>) -> String {
    overview
        .and_then(|o| o.currency.clone())
        .unwrap_or_else(|| currency_for_symbol(symbol).to_string())
}

/// `start..end` as UTC midnights, with `default_start` applied to `end`
/// when no start is given
fn resolve_range(
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    default_start: impl FnOnce(NaiveDate) -> Option<NaiveDate>,
) -> Result<(DateTime<Utc>, DateTime<Utc>)> {
    let end = end.unwrap_or_else(|| Utc::now().date_naive());
    let start = match start {
        Some(start) => start,
        None => default_start(end)
            .ok_or_else(|| StockError::InvalidRange(format!("no default start before {end}")))?,
    };
    if start >= end {
        return Err(StockError::InvalidRange(format!(
            "start {start} is not before end {end}"
        )));
    }
    Ok((midnight(start), midnight(end)))
}

fn tail(quotes: &[Quote], n: usize) -> Vec<Quote> {
    quotes[quotes.len().saturating_sub(n)..].to_vec()
}

fn midnight(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(chrono::NaiveTime::MIN).and_utc()
}
