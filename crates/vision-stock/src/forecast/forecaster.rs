//! Recursive multi-step forecasting on top of a one-step model

use super::calendar::next_business_day;
use super::error::{ForecastError, ModelError, Result};
use super::model::OneStepModel;
use super::scaler::MinMaxScaler;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Default number of business days to forecast
pub const DEFAULT_HORIZON: usize = 5;

/// Longest forecast accepted, roughly one year of business days
pub const MAX_HORIZON: usize = 260;

/// One forecast step
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub date: NaiveDate,
    pub price: f64,
}

/// In-sample one-step prediction next to the observed close
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FittedPoint {
    pub date: NaiveDate,
    pub actual: f64,
    pub predicted: f64,
}

/// Drives a [`OneStepModel`] to produce multi-step forecasts
///
/// The forecaster holds no mutable state; every call works on its own
/// rolling window, so one instance can serve concurrent callers.
#[derive(Clone)]
pub struct Forecaster {
    model: Arc<dyn OneStepModel>,
}

impl Forecaster {
    /// Wrap a shared model
    pub fn new(model: Arc<dyn OneStepModel>) -> Self {
        Self { model }
    }

    /// Window length consumed per model call
    pub fn window_size(&self) -> usize {
        self.model.window_size()
    }

    fn step(&self, window: &[f64]) -> Result<f64> {
        let value = self.model.predict(window)?;
        if value.is_finite() {
            Ok(value)
        } else {
            Err(ModelError::NonFinite(value).into())
        }
    }

    /// Forecast `horizon` business days past `last_date`
    ///
    /// The last `window_size` values of `history` seed the window. Each
    /// prediction is denormalized, recorded against the next business day,
    /// then re-normalized and pushed onto the window in place of the oldest
    /// value. Any model failure aborts the whole forecast.
    #[instrument(skip(self, history, scaler), fields(model = self.model.name(), history = history.len()))]
    pub fn forecast(
        &self,
        history: &[f64],
        last_date: NaiveDate,
        horizon: usize,
        scaler: &MinMaxScaler,
    ) -> Result<Vec<ForecastPoint>> {
        let window_size = self.window_size();
        if horizon == 0 || horizon > MAX_HORIZON {
            return Err(ForecastError::InvalidHorizon {
                horizon,
                max: MAX_HORIZON,
            });
        }
        if history.len() < window_size {
            return Err(ForecastError::InsufficientHistory {
                required: window_size,
                actual: history.len(),
            });
        }

        let seed = &history[history.len() - window_size..];
        let mut window: VecDeque<f64> = seed.iter().map(|&v| scaler.transform(v)).collect();
        let mut date = last_date;
        let mut points = Vec::new();

        for step in 0..horizon {
            let normalized = self.step(window.make_contiguous())?;
            let price = scaler.inverse_transform(normalized);
            date = next_business_day(date)?;
            debug!(step, %date, price, "Forecast step");
            points.push(ForecastPoint { date, price });

            window.pop_front();
            window.push_back(scaler.transform(price));
        }

        Ok(points)
    }

    /// One-step predictions for every close that has a full window behind it
    ///
    /// Entry `k` predicts `closes[window_size + k]` from the preceding
    /// `window_size` closes.
    #[instrument(skip_all, fields(model = self.model.name(), points = closes.len()))]
    pub fn fitted(
        &self,
        closes: &[f64],
        dates: &[NaiveDate],
        scaler: &MinMaxScaler,
    ) -> Result<Vec<FittedPoint>> {
        let window_size = self.window_size();
        if closes.len() != dates.len() {
            return Err(ForecastError::InvalidInput(format!(
                "{} closes but {} dates",
                closes.len(),
                dates.len()
            )));
        }
        if closes.len() <= window_size {
            return Err(ForecastError::InsufficientHistory {
                required: window_size + 1,
                actual: closes.len(),
            });
        }

        let normalized = scaler.transform_all(closes);
        normalized
            .windows(window_size)
            .zip(closes.iter().zip(dates).skip(window_size))
            .map(|(window, (&actual, &date))| {
                let predicted = scaler.inverse_transform(self.step(window)?);
                Ok(FittedPoint {
                    date,
                    actual,
                    predicted,
                })
            })
            .collect()
    }

    /// Predict a close from a single day's open/high/low
    ///
    /// The window is filled with the mean of the three prices; the scaler is
    /// fitted on that constant window. Volume is accepted for parity with
    /// the input form but does not influence the result.
    #[instrument(skip(self), fields(model = self.model.name()))]
    pub fn predict_manual(&self, open: f64, high: f64, low: f64, volume: f64) -> Result<f64> {
        for (name, value) in [("open", open), ("high", high), ("low", low), ("volume", volume)] {
            if !value.is_finite() || value < 0.0 {
                return Err(ForecastError::InvalidInput(format!(
                    "{name} must be a non-negative number, got {value}"
                )));
            }
        }
        if low > high {
            return Err(ForecastError::InvalidInput(format!(
                "low ({low}) is above high ({high})"
            )));
        }

        let synthetic_close = (open + high + low) / 3.0;
        let window = vec![synthetic_close; self.window_size()];
        let scaler = MinMaxScaler::fit(&window)?;

        let normalized = self.step(&scaler.transform_all(&window))?;
        Ok(scaler.inverse_transform(normalized))
    }
}

impl std::fmt::Debug for Forecaster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Forecaster")
            .field("model", &self.model.name())
            .field("window_size", &self.window_size())
            .finish()
    }
}
