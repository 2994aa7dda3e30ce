//! One-step predictive models
//!
//! A one-step model maps a fixed-length window of normalized prices to a
//! single normalized estimate of the next value. Models are immutable once
//! built and are shared between callers through `Arc<dyn OneStepModel>`.

use super::error::ModelError;

/// Window length used by the shipped models
pub const WINDOW_SIZE: usize = 60;

/// A model producing the next value of a normalized series
///
/// Implementations must be reentrant: `predict` takes `&self` and may be
/// called concurrently from independent forecasts.
#[cfg_attr(test, mockall::automock)]
pub trait OneStepModel: Send + Sync {
    /// Predict the next normalized value from `window`
    fn predict(&self, window: &[f64]) -> Result<f64, ModelError>;

    /// Number of values the model consumes per prediction
    fn window_size(&self) -> usize;

    /// Short identifier for logs
    fn name(&self) -> &'static str;
}

/// Predicts the arithmetic mean of the window
///
/// Useful as a baseline and for exercising the forecast loop without a
/// trained network.
#[derive(Debug, Clone, Copy)]
pub struct MeanModel {
    window_size: usize,
}

impl MeanModel {
    /// Create a mean model over `window_size` values
    pub fn new(window_size: usize) -> Self {
        Self { window_size }
    }
}

impl Default for MeanModel {
    fn default() -> Self {
        Self::new(WINDOW_SIZE)
    }
}

impl OneStepModel for MeanModel {
    fn predict(&self, window: &[f64]) -> Result<f64, ModelError> {
        check_window(window, self.window_size)?;
        Ok(window.iter().sum::<f64>() / window.len() as f64)
    }

    fn window_size(&self) -> usize {
        self.window_size
    }

    fn name(&self) -> &'static str {
        "mean"
    }
}

/// Reject windows whose length differs from what the model expects
pub(crate) fn check_window(window: &[f64], expected: usize) -> Result<(), ModelError> {
    if window.len() == expected && expected > 0 {
        Ok(())
    } else {
        Err(ModelError::WindowSize {
            expected,
            actual: window.len(),
        })
    }
}
