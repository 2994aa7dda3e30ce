//! Headline numbers for a symbol derived from its daily quotes

use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::api::Quote;
use crate::currency::{currency_for_symbol, format_price};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockSummary {
    pub symbol: String,
    pub currency: String,
    pub as_of: NaiveDate,
    pub last_close: f64,
    pub previous_close: Option<f64>,
    /// Absolute change against the previous close
    pub daily_change: Option<f64>,
    pub daily_change_pct: Option<f64>,
    pub high_52w: f64,
    pub low_52w: f64,
    pub average_volume: f64,
}

impl StockSummary {
    /// Summarize chronologically ordered quotes; `None` when there are none
    ///
    /// The daily change needs at least two quotes.
    pub fn from_quotes(symbol: &str, quotes: &[Quote]) -> Option<Self> {
        let last = quotes.last()?;
        let previous_close = quotes.len().checked_sub(2).map(|i| quotes[i].close);
        let daily_change = previous_close.map(|prev| last.close - prev);
        let daily_change_pct = previous_close
            .zip(daily_change)
            .filter(|(prev, _)| *prev != 0.0)
            .map(|(prev, change)| change / prev * 100.0);

        let as_of = last.date();
        let year = as_of
            .checked_sub_months(Months::new(12))
            .map_or(quotes, |cutoff| {
                &quotes[quotes.partition_point(|q| q.date() <= cutoff)..]
            });
        let high_52w = year.iter().map(|q| q.high).fold(f64::NEG_INFINITY, f64::max);
        let low_52w = year.iter().map(|q| q.low).fold(f64::INFINITY, f64::min);
        let average_volume =
            year.iter().map(|q| q.volume as f64).sum::<f64>() / year.len() as f64;

        Some(Self {
            symbol: symbol.to_uppercase(),
            currency: currency_for_symbol(symbol).to_string(),
            as_of,
            last_close: last.close,
            previous_close,
            daily_change,
            daily_change_pct,
            high_52w,
            low_52w,
            average_volume,
        })
    }

    /// Last close with its currency sign
    pub fn display_price(&self) -> String {
        format_price(&self.currency, self.last_close)
    }
}
