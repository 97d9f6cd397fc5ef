//! Forecaster trait defining the common interface for all models.

use crate::core::{Forecast, TimeSeries};
use crate::error::{ForecastError, Result};

/// Common interface for forecasting models.
///
/// This trait is object-safe and can be used with `Box<dyn Forecaster>`.
pub trait Forecaster {
    /// Fit the model to the time series data.
    fn fit(&mut self, series: &TimeSeries) -> Result<()>;

    /// Generate predictions for the specified horizon, dated after the
    /// last fitted observation.
    fn predict(&self, horizon: usize) -> Result<Forecast>;

    /// Generate predictions with prediction intervals at `level`.
    ///
    /// Models without an error model return `InvalidParameter`.
    fn predict_with_intervals(&self, _horizon: usize, level: f64) -> Result<Forecast> {
        Err(ForecastError::InvalidParameter(format!(
            "{} does not produce prediction intervals (level {level})",
            self.name()
        )))
    }

    /// In-sample predictions on the original scale.
    fn fitted_values(&self) -> Option<&[f64]>;

    /// In-sample residuals (actual - fitted).
    fn residuals(&self) -> Option<&[f64]>;

    /// Get the model name.
    fn name(&self) -> &str;

    /// Check if the model has been fitted.
    fn is_fitted(&self) -> bool {
        self.fitted_values().is_some()
    }
}

/// Type alias for boxed forecaster trait objects.
///
/// # Example
///
/// ```
/// use demand_forecast::models::{BoxedForecaster, Forecaster, SeasonalReplay};
///
/// let model: BoxedForecaster = Box::new(SeasonalReplay::new(12));
/// assert_eq!(model.name(), "SeasonalReplay");
/// assert!(!model.is_fitted());
/// ```
pub type BoxedForecaster = Box<dyn Forecaster>;
