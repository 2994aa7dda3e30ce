//! Error types for the forecasting path

use thiserror::Error;

/// Errors raised by a one-step model
#[derive(Debug, Error)]
pub enum ModelError {
    /// The input window does not have the length the model was trained on
    #[error("Model expects a window of {expected} values, got {actual}")]
    WindowSize { expected: usize, actual: usize },

    /// The model produced NaN or infinity
    #[error("Model produced a non-finite output: {0}")]
    NonFinite(f64),

    /// Weight file is structurally invalid
    #[error("Invalid model weights: {0}")]
    Weights(String),

    /// Weight file could not be read
    #[error("Failed to read model file: {0}")]
    Io(#[from] std::io::Error),

    /// Weight file is not valid JSON
    #[error("Failed to parse model file: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors raised by the forecast loop and its helpers
///
/// Every variant is terminal: the loop never returns partial results.
#[derive(Debug, Error)]
pub enum ForecastError {
    /// Fewer prices than the model window were supplied
    #[error("Insufficient history: need {required} prices, got {actual}")]
    InsufficientHistory { required: usize, actual: usize },

    /// Horizon outside `1..=max`
    #[error("Forecast horizon must be between 1 and {max}, got {horizon}")]
    InvalidHorizon { horizon: usize, max: usize },

    /// The one-step model failed or returned malformed output
    #[error("Model failure: {0}")]
    ModelFailure(#[from] ModelError),

    /// Normalization could not be fitted, loaded or saved
    #[error("Scaler error: {0}")]
    Scaler(String),

    /// Manual inputs were out of range
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The business calendar ran past the representable date range
    #[error("Date out of range after {0}")]
    DateOverflow(chrono::NaiveDate),
}

/// Result type alias for forecast operations
pub type Result<T> = std::result::Result<T, ForecastError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ForecastError::InsufficientHistory {
            required: 60,
            actual: 12,
        };
        assert_eq!(err.to_string(), "Insufficient history: need 60 prices, got 12");

        let err: ForecastError = ModelError::NonFinite(f64::NAN).into();
        assert!(err.to_string().starts_with("Model failure: Model produced a non-finite output"));
    }
}
