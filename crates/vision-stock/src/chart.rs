//! Chart-ready series built from daily quotes

use chrono::{Datelike, Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::api::Quote;
use crate::error::{Result, StockError};
use crate::forecast::ForecastPoint;
use crate::indicators::{
    self, IndicatorKind, MACD_FAST, MACD_SIGNAL, MACD_SLOW, MacdValue, RSI_PERIOD, SMA_PERIOD,
};

/// Number of actual closes shown before the forecast
pub const OVERLAY_HISTORY: usize = 15;

/// Display window, relative to the most recent quote
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ChartPeriod {
    #[serde(rename = "5d")]
    FiveDays,
    #[serde(rename = "1mo")]
    OneMonth,
    #[serde(rename = "6mo")]
    SixMonths,
    #[serde(rename = "ytd")]
    YearToDate,
    #[default]
    #[serde(rename = "1y")]
    OneYear,
    #[serde(rename = "5y")]
    FiveYears,
    #[serde(rename = "max")]
    Max,
}

impl ChartPeriod {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::FiveDays => "5d",
            Self::OneMonth => "1mo",
            Self::SixMonths => "6mo",
            Self::YearToDate => "ytd",
            Self::OneYear => "1y",
            Self::FiveYears => "5y",
            Self::Max => "max",
        }
    }

    /// Quotes must be strictly after this date to be shown; `None` keeps all
    pub fn cutoff(self, last: NaiveDate) -> Option<NaiveDate> {
        match self {
            Self::FiveDays => last.checked_sub_days(Days::new(5)),
            Self::OneMonth => last.checked_sub_months(Months::new(1)),
            Self::SixMonths => last.checked_sub_months(Months::new(6)),
            Self::YearToDate => NaiveDate::from_ymd_opt(last.year(), 1, 1),
            Self::OneYear => last.checked_sub_months(Months::new(12)),
            Self::FiveYears => last.checked_sub_months(Months::new(60)),
            Self::Max => None,
        }
    }

    /// Keep the quotes that fall inside the period
    pub fn filter<'a>(self, quotes: &'a [Quote]) -> &'a [Quote] {
        let Some(last) = quotes.last() else {
            return quotes;
        };
        let Some(cutoff) = self.cutoff(last.date()) else {
            return quotes;
        };
        // Quotes are chronological, so the kept ones form a suffix
        let first = quotes.partition_point(|q| q.date() <= cutoff);
        &quotes[first..]
    }
}

impl fmt::Display for ChartPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChartPeriod {
    type Err = StockError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "5d" => Ok(Self::FiveDays),
            "1mo" => Ok(Self::OneMonth),
            "6mo" => Ok(Self::SixMonths),
            "ytd" => Ok(Self::YearToDate),
            "1y" => Ok(Self::OneYear),
            "5y" => Ok(Self::FiveYears),
            "max" => Ok(Self::Max),
            _ => Err(StockError::InvalidRange(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinePoint {
    pub date: NaiveDate,
    pub value: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IndicatorPoint {
    pub date: NaiveDate,
    pub value: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MacdPoint {
    pub date: NaiveDate,
    #[serde(flatten)]
    pub value: MacdValue,
}

/// Indicator series aligned with the chart dates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "indicator", content = "values", rename_all = "lowercase")]
pub enum IndicatorSeries {
    Rsi(Vec<IndicatorPoint>),
    Macd(Vec<MacdPoint>),
    Sma(Vec<IndicatorPoint>),
}

impl IndicatorSeries {
    /// Compute `kind` over the closes of `quotes`
    pub fn compute(kind: IndicatorKind, quotes: &[Quote]) -> Result<Self> {
        let closes: Vec<f64> = quotes.iter().map(|q| q.close).collect();
        let attach = |values: Vec<Option<f64>>| {
            quotes
                .iter()
                .zip(values)
                .map(|(q, value)| IndicatorPoint {
                    date: q.date(),
                    value,
                })
                .collect()
        };

        Ok(match kind {
            IndicatorKind::Rsi => Self::Rsi(attach(indicators::rsi(&closes, RSI_PERIOD)?)),
            IndicatorKind::Sma => Self::Sma(attach(indicators::sma(&closes, SMA_PERIOD)?)),
            IndicatorKind::Macd => {
                let values = indicators::macd(&closes, MACD_FAST, MACD_SLOW, MACD_SIGNAL)?;
                Self::Macd(
                    quotes
                        .iter()
                        .zip(values)
                        .map(|(q, value)| MacdPoint {
                            date: q.date(),
                            value,
                        })
                        .collect(),
                )
            }
        })
    }

    pub fn kind(&self) -> IndicatorKind {
        match self {
            Self::Rsi(_) => IndicatorKind::Rsi,
            Self::Macd(_) => IndicatorKind::Macd,
            Self::Sma(_) => IndicatorKind::Sma,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Rsi(points) | Self::Sma(points) => points.len(),
            Self::Macd(points) => points.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Everything needed to draw the analysis view for one symbol
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartData {
    pub symbol: String,
    pub period: ChartPeriod,
    pub line: Vec<LinePoint>,
    pub candlestick: Vec<Candle>,
    pub indicator: Option<IndicatorSeries>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
}

impl ChartData {
    /// Filter `quotes` to `period` and derive the series
    ///
    /// The indicator is computed on the filtered quotes, so short periods
    /// may be entirely inside its warm-up window.
    pub fn build(
        symbol: &str,
        quotes: &[Quote],
        period: ChartPeriod,
        indicator: Option<IndicatorKind>,
    ) -> Result<Self> {
        let quotes = period.filter(quotes);

        let line = quotes
            .iter()
            .map(|q| LinePoint {
                date: q.date(),
                value: q.close,
            })
            .collect();
        let candlestick = quotes
            .iter()
            .map(|q| Candle {
                date: q.date(),
                open: q.open,
                high: q.high,
                low: q.low,
                close: q.close,
                volume: q.volume,
            })
            .collect();
        let indicator = indicator
            .map(|kind| IndicatorSeries::compute(kind, quotes))
            .transpose()?;

        Ok(Self {
            symbol: symbol.to_string(),
            period,
            line,
            candlestick,
            indicator,
            min_price: quotes.iter().map(|q| q.low).reduce(f64::min),
            max_price: quotes.iter().map(|q| q.high).reduce(f64::max),
        })
    }
}

/// Recent actual closes followed by the forecast
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastOverlay {
    pub actual: Vec<LinePoint>,
    pub predicted: Vec<LinePoint>,
}

impl ForecastOverlay {
    pub fn new(quotes: &[Quote], forecast: &[ForecastPoint]) -> Self {
        let start = quotes.len().saturating_sub(OVERLAY_HISTORY);
        Self {
            actual: quotes[start..]
                .iter()
                .map(|q| LinePoint {
                    date: q.date(),
                    value: q.close,
                })
                .collect(),
            predicted: forecast
                .iter()
                .map(|p| LinePoint {
                    date: p.date,
                    value: p.price,
                })
                .collect(),
        }
    }

    /// Connector between the last actual close and the first prediction
    pub fn bridge(&self) -> Option<(LinePoint, LinePoint)> {
        Some((*self.actual.last()?, *self.predicted.first()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn quote_on(date: NaiveDate, close: f64) -> Quote {
        Quote {
            symbol: "AAPL".to_string(),
            timestamp: Utc.from_utc_datetime(&date.and_hms_opt(14, 30, 0).unwrap()),
            gmt_offset: 0,
            open: close - 1.0,
            high: close + 2.0,
            low: close - 2.0,
            close,
            volume: 1_000,
            adjclose: close,
        }
    }

    /// One quote per calendar day ending on `last`
    fn daily(last: NaiveDate, days: u64) -> Vec<Quote> {
        (0..days)
            .rev()
            .map(|back| {
                let date = last.checked_sub_days(Days::new(back)).unwrap();
                quote_on(date, 100.0 + back as f64)
            })
            .collect()
    }

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_period_parse() {
        assert_eq!("YTD".parse::<ChartPeriod>().unwrap(), ChartPeriod::YearToDate);
        assert_eq!("5d".parse::<ChartPeriod>().unwrap(), ChartPeriod::FiveDays);
        assert_eq!(ChartPeriod::default(), ChartPeriod::OneYear);
        assert!("2w".parse::<ChartPeriod>().is_err());
    }

    #[test]
    fn test_period_cutoffs() {
        let last = ymd(2024, 3, 31);
        assert_eq!(ChartPeriod::FiveDays.cutoff(last), Some(ymd(2024, 3, 26)));
        // Month arithmetic clamps to the end of shorter months
        assert_eq!(ChartPeriod::OneMonth.cutoff(last), Some(ymd(2024, 2, 29)));
        assert_eq!(ChartPeriod::YearToDate.cutoff(last), Some(ymd(2024, 1, 1)));
        assert_eq!(ChartPeriod::OneYear.cutoff(last), Some(ymd(2023, 3, 31)));
        assert_eq!(ChartPeriod::Max.cutoff(last), None);
    }

    #[test]
    fn test_filter_is_strictly_after_cutoff() {
        let quotes = daily(ymd(2024, 6, 10), 30);
        let kept = ChartPeriod::FiveDays.filter(&quotes);
        assert_eq!(kept.len(), 5);
        assert_eq!(kept[0].date(), ymd(2024, 6, 6));
        assert_eq!(kept.last().unwrap().date(), ymd(2024, 6, 10));

        assert_eq!(ChartPeriod::Max.filter(&quotes).len(), 30);
        assert!(ChartPeriod::OneYear.filter(&[]).is_empty());
    }

    #[test]
    fn test_build_chart_with_indicator() {
        let quotes = daily(ymd(2024, 6, 10), 90);
        let chart =
            ChartData::build("AAPL", &quotes, ChartPeriod::OneMonth, Some(IndicatorKind::Rsi))
                .unwrap();

        assert_eq!(chart.line.len(), 31);
        assert_eq!(chart.candlestick.len(), chart.line.len());
        let indicator = chart.indicator.unwrap();
        assert_eq!(indicator.kind(), IndicatorKind::Rsi);
        assert_eq!(indicator.len(), 31);
        let low = chart.min_price.unwrap();
        let high = chart.max_price.unwrap();
        assert!(low < high);
    }

    #[test]
    fn test_build_chart_empty() {
        let chart = ChartData::build("AAPL", &[], ChartPeriod::Max, Some(IndicatorKind::Macd)).unwrap();
        assert!(chart.line.is_empty());
        assert!(chart.indicator.unwrap().is_empty());
        assert_eq!(chart.min_price, None);
    }

    #[test]
    fn test_indicator_series_serializes_tagged() {
        let quotes = daily(ymd(2024, 6, 10), 3);
        let series = IndicatorSeries::compute(IndicatorKind::Sma, &quotes).unwrap();
        let json = serde_json::to_value(&series).unwrap();
        assert_eq!(json["indicator"], "sma");
        assert_eq!(json["values"].as_array().unwrap().len(), 3);
        assert!(json["values"][0]["value"].is_null());
    }

    #[test]
    fn test_forecast_overlay() {
        let quotes = daily(ymd(2024, 6, 7), 40);
        let forecast = vec![
            ForecastPoint {
                date: ymd(2024, 6, 10),
                price: 99.0,
            },
            ForecastPoint {
                date: ymd(2024, 6, 11),
                price: 98.5,
            },
        ];
        let overlay = ForecastOverlay::new(&quotes, &forecast);

        assert_eq!(overlay.actual.len(), OVERLAY_HISTORY);
        assert_eq!(overlay.predicted.len(), 2);
        let (from, to) = overlay.bridge().unwrap();
        assert_eq!(from.date, ymd(2024, 6, 7));
        assert_eq!(to.date, ymd(2024, 6, 10));
    }

    #[test]
    fn test_overlay_with_short_history() {
        let quotes = daily(ymd(2024, 6, 7), 3);
        let overlay = ForecastOverlay::new(&quotes, &[]);
        assert_eq!(overlay.actual.len(), 3);
        assert!(overlay.bridge().is_none());
    }
}
