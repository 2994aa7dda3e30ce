//! Technical indicators over closing prices
//!
//! Every series has one entry per input close. Entries inside the warm-up
//! window of an indicator are `None`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ta::Next;
use ta::indicators::{MovingAverageConvergenceDivergence, RelativeStrengthIndex, SimpleMovingAverage};

use crate::error::{Result, StockError};

pub const RSI_PERIOD: usize = 14;
pub const SMA_PERIOD: usize = 50;
pub const MACD_FAST: usize = 12;
pub const MACD_SLOW: usize = 26;
pub const MACD_SIGNAL: usize = 9;

/// Indicator selectable for the analysis view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndicatorKind {
    Rsi,
    Macd,
    Sma,
}

impl IndicatorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Rsi => "rsi",
            Self::Macd => "macd",
            Self::Sma => "sma",
        }
    }
}

impl fmt::Display for IndicatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IndicatorKind {
    type Err = StockError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rsi" => Ok(Self::Rsi),
            "macd" => Ok(Self::Macd),
            "sma" | "moving average" | "moving-average" => Ok(Self::Sma),
            _ => Err(StockError::IndicatorError(format!(
                "Unsupported indicator: {s}. Supported: RSI, MACD, SMA"
            ))),
        }
    }
}

/// One MACD sample
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MacdValue {
    pub macd: Option<f64>,
    pub signal: Option<f64>,
    pub histogram: Option<f64>,
}

/// Relative strength index
pub fn rsi(closes: &[f64], period: usize) -> Result<Vec<Option<f64>>> {
    let mut indicator =
        RelativeStrengthIndex::new(period).map_err(|e| StockError::IndicatorError(e.to_string()))?;

    Ok(closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let value = indicator.next(close);
            (i >= period).then_some(value)
        })
        .collect())
}

/// Simple moving average
pub fn sma(closes: &[f64], period: usize) -> Result<Vec<Option<f64>>> {
    let mut indicator =
        SimpleMovingAverage::new(period).map_err(|e| StockError::IndicatorError(e.to_string()))?;

    Ok(closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let value = indicator.next(close);
            (i + 1 >= period).then_some(value)
        })
        .collect())
}

/// MACD line, signal line and histogram
pub fn macd(closes: &[f64], fast: usize, slow: usize, signal: usize) -> Result<Vec<MacdValue>> {
    if fast >= slow {
        return Err(StockError::IndicatorError(format!(
            "MACD fast period ({fast}) must be shorter than slow period ({slow})"
        )));
    }
    let mut indicator = MovingAverageConvergenceDivergence::new(fast, slow, signal)
        .map_err(|e| StockError::IndicatorError(e.to_string()))?;

    let line_ready = slow - 1;
    let signal_ready = slow + signal - 2;

    Ok(closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let out = indicator.next(close);
            MacdValue {
                macd: (i >= line_ready).then_some(out.macd),
                signal: (i >= signal_ready).then_some(out.signal),
                histogram: (i >= signal_ready).then_some(out.histogram),
            }
        })
        .collect())
}

/// Interpret RSI value
pub fn interpret_rsi(rsi: f64) -> &'static str {
    if rsi > 70.0 {
        "Overbought - potential sell signal"
    } else if rsi < 30.0 {
        "Oversold - potential buy signal"
    } else {
        "Neutral"
    }
}
