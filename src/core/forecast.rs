//! Forecast result structure for holding predictions.

use crate::core::TimeSeries;
use crate::error::{ForecastError, Result};
use chrono::{DateTime, Utc};

/// A dated forecast with optional lower and upper bands.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Forecast {
    timestamps: Vec<DateTime<Utc>>,
    point: Vec<f64>,
    lower: Option<Vec<f64>>,
    upper: Option<Vec<f64>>,
}

impl Forecast {
    /// Create an empty forecast.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a forecast from point predictions on a future index.
    pub fn from_values(timestamps: Vec<DateTime<Utc>>, values: Vec<f64>) -> Result<Self> {
        if timestamps.len() != values.len() {
            return Err(ForecastError::DimensionMismatch {
                expected: timestamps.len(),
                got: values.len(),
            });
        }

        Ok(Self {
            timestamps,
            point: values,
            lower: None,
            upper: None,
        })
    }

    /// Attach prediction bounds.
    pub fn with_intervals(mut self, lower: Vec<f64>, upper: Vec<f64>) -> Result<Self> {
        for bound in [&lower, &upper] {
            if bound.len() != self.point.len() {
                return Err(ForecastError::DimensionMismatch {
                    expected: self.point.len(),
                    got: bound.len(),
                });
            }
        }
        self.lower = Some(lower);
        self.upper = Some(upper);
        Ok(self)
    }

    /// Attach a band scaling each point by `lower` and `upper`.
    ///
    /// The multipliers are applied as given, so for a negative point the
    /// `lower` value lies above the `upper` one.
    pub fn with_band(self, lower: f64, upper: f64) -> Self {
        let lo = self.point.iter().map(|v| v * lower).collect();
        let hi = self.point.iter().map(|v| v * upper).collect();
        Self {
            lower: Some(lo),
            upper: Some(hi),
            ..self
        }
    }

    /// Get the forecast horizon (number of steps).
    pub fn horizon(&self) -> usize {
        self.point.len()
    }

    pub fn is_empty(&self) -> bool {
        self.point.is_empty()
    }

    pub fn timestamps(&self) -> &[DateTime<Utc>] {
        &self.timestamps
    }

    /// Point predictions.
    pub fn values(&self) -> &[f64] {
        &self.point
    }

    pub fn lower(&self) -> Option<&[f64]> {
        self.lower.as_deref()
    }

    pub fn upper(&self) -> Option<&[f64]> {
        self.upper.as_deref()
    }

    /// Iterate over `(timestamp, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (DateTime<Utc>, f64)> + '_ {
        self.timestamps.iter().copied().zip(self.point.iter().copied())
    }

    /// Point predictions as a time series.
    pub fn to_series(&self) -> Result<TimeSeries> {
        Ok(TimeSeries::new(self.timestamps.clone(), self.point.clone())?.with_name("forecast"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::{Duration, TimeZone};

    fn make_timestamps(n: usize) -> Vec<DateTime<Utc>> {
        let base = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        (0..n).map(|i| base + Duration::days(i as i64)).collect()
    }

    #[test]
    fn forecast_from_values() {
        let fc = Forecast::from_values(make_timestamps(3), vec![1.0, 2.0, 3.0]).unwrap();
        assert_eq!(fc.horizon(), 3);
        assert!(!fc.is_empty());
        assert!(fc.lower().is_none());
        assert!(fc.upper().is_none());
    }

    #[test]
    fn forecast_rejects_misaligned_values() {
        let result = Forecast::from_values(make_timestamps(3), vec![1.0]);
        assert!(matches!(
            result,
            Err(ForecastError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn band_scales_points() {
        let fc = Forecast::from_values(make_timestamps(2), vec![100.0, -50.0])
            .unwrap()
            .with_band(0.9, 1.1);

        let lower = fc.lower().unwrap();
        let upper = fc.upper().unwrap();
        assert_relative_eq!(lower[0], 90.0, epsilon = 1e-10);
        assert_relative_eq!(upper[0], 110.0, epsilon = 1e-10);
        assert_relative_eq!(lower[1], -45.0, epsilon = 1e-10);
        assert_relative_eq!(upper[1], -55.0, epsilon = 1e-10);
    }

    #[test]
    fn intervals_must_match_horizon() {
        let fc = Forecast::from_values(make_timestamps(2), vec![1.0, 2.0]).unwrap();
        assert!(fc.clone().with_intervals(vec![0.0], vec![3.0]).is_err());
        let fc = fc.with_intervals(vec![0.0, 1.0], vec![2.0, 3.0]).unwrap();
        assert_eq!(fc.upper().unwrap(), &[2.0, 3.0]);
    }

    #[test]
    fn converts_to_series() {
        let fc = Forecast::from_values(make_timestamps(2), vec![5.0, 6.0]).unwrap();
        let series = fc.to_series().unwrap();
        assert_eq!(series.values(), &[5.0, 6.0]);
        assert_eq!(series.name(), Some("forecast"));
    }

    #[test]
    fn empty_forecast() {
        let fc = Forecast::new();
        assert_eq!(fc.horizon(), 0);
        assert!(fc.is_empty());
    }
}
