//! Closing-price forecasting
//!
//! - [`scaler`]: min-max normalization and its inverse
//! - [`calendar`]: business-day stepping for forecast dates
//! - [`model`]: the [`OneStepModel`] seam and a mean baseline
//! - [`lstm`]: an inference-only LSTM loaded from exported weights
//! - [`forecaster`]: the recursive 60-step sliding-window forecast

pub mod calendar;
pub mod error;
pub mod forecaster;
pub mod lstm;
pub mod model;
pub mod scaler;

pub use error::{ForecastError, ModelError};
pub use forecaster::{DEFAULT_HORIZON, FittedPoint, ForecastPoint, Forecaster, MAX_HORIZON};
pub use lstm::LstmModel;
pub use model::{MeanModel, OneStepModel, WINDOW_SIZE};
pub use scaler::MinMaxScaler;
