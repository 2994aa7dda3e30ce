//! Min-max normalization into the [0, 1] feature range

use super::error::{ForecastError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Fitted min/max bounds mapping prices into [0, 1] and back
///
/// A zero-width range (all fitted values equal) is treated as a range of one,
/// so the constant maps to 0 and back to itself.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MinMaxScaler {
    min: f64,
    max: f64,
}

impl MinMaxScaler {
    /// Fit the bounds to `values`
    pub fn fit(values: &[f64]) -> Result<Self> {
        if values.is_empty() {
            return Err(ForecastError::Scaler(
                "cannot fit on an empty series".to_string(),
            ));
        }
        if let Some(bad) = values.iter().find(|v| !v.is_finite()) {
            return Err(ForecastError::Scaler(format!(
                "cannot fit on non-finite value {bad}"
            )));
        }

        let (min, max) = values
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            });

        Ok(Self { min, max })
    }

    /// Build a scaler from known bounds, e.g. those saved at training time
    pub fn from_bounds(min: f64, max: f64) -> Result<Self> {
        if !min.is_finite() || !max.is_finite() || min > max {
            return Err(ForecastError::Scaler(format!(
                "invalid bounds [{min}, {max}]"
            )));
        }
        Ok(Self { min, max })
    }

    /// Lower bound
    pub fn min(&self) -> f64 {
        self.min
    }

    /// Upper bound
    pub fn max(&self) -> f64 {
        self.max
    }

    fn range(&self) -> f64 {
        let range = self.max - self.min;
        if range == 0.0 { 1.0 } else { range }
    }

    /// Map a price into the normalized range
    pub fn transform(&self, value: f64) -> f64 {
        (value - self.min) / self.range()
    }

    /// Map a normalized value back to price units
    pub fn inverse_transform(&self, value: f64) -> f64 {
        value * self.range() + self.min
    }

    /// Normalize a whole series
    pub fn transform_all(&self, values: &[f64]) -> Vec<f64> {
        values.iter().map(|&v| self.transform(v)).collect()
    }

    /// Load bounds saved with [`MinMaxScaler::save`]
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            ForecastError::Scaler(format!("failed to read {}: {e}", path.display()))
        })?;
        let scaler: Self = serde_json::from_str(&raw).map_err(|e| {
            ForecastError::Scaler(format!("failed to parse {}: {e}", path.display()))
        })?;
        Self::from_bounds(scaler.min, scaler.max)
    }

    /// Persist bounds as JSON
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| ForecastError::Scaler(e.to_string()))?;
        std::fs::write(path, json).map_err(|e| {
            ForecastError::Scaler(format!("failed to write {}: {e}", path.display()))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_bounds() {
        let scaler = MinMaxScaler::fit(&[12.0, 10.0, 15.0, 11.0]).unwrap();
        assert_eq!(scaler.min(), 10.0);
        assert_eq!(scaler.max(), 15.0);
        assert_eq!(scaler.transform(10.0), 0.0);
        assert_eq!(scaler.transform(15.0), 1.0);
        assert!((scaler.transform(12.5) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_round_trip_within_bounds() {
        let prices = [101.25, 99.8, 130.4, 87.15, 112.0, 95.55];
        let scaler = MinMaxScaler::fit(&prices).unwrap();

        let mut value = scaler.min();
        while value <= scaler.max() {
            let back = scaler.inverse_transform(scaler.transform(value));
            assert!((back - value).abs() < 1e-9, "{value} -> {back}");
            value += 0.37;
        }
    }

    #[test]
    fn test_constant_series() {
        let scaler = MinMaxScaler::fit(&[100.0; 60]).unwrap();
        assert_eq!(scaler.transform(100.0), 0.0);
        assert_eq!(scaler.inverse_transform(0.0), 100.0);
    }

    #[test]
    fn test_values_outside_bounds_extrapolate() {
        let scaler = MinMaxScaler::fit(&[0.0, 10.0]).unwrap();
        assert!((scaler.transform(15.0) - 1.5).abs() < 1e-12);
        assert!((scaler.inverse_transform(-0.5) + 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_fit_rejects_bad_input() {
        assert!(MinMaxScaler::fit(&[]).is_err());
        assert!(MinMaxScaler::fit(&[1.0, f64::NAN]).is_err());
        assert!(MinMaxScaler::from_bounds(5.0, 1.0).is_err());
    }

    #[test]
    fn test_save_and_load() {
        let path = std::env::temp_dir().join(format!("vision-scaler-{}.json", std::process::id()));
        let scaler = MinMaxScaler::from_bounds(42.5, 198.25).unwrap();

        scaler.save(&path).unwrap();
        let loaded = MinMaxScaler::load(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(loaded, scaler);
    }

    #[test]
    fn test_load_missing_file() {
        let err = MinMaxScaler::load("/nonexistent/scaler.json").unwrap_err();
        assert!(matches!(err, ForecastError::Scaler(_)));
    }
}
