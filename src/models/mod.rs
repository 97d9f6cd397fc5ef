//! Forecasting models.

mod seasonal_replay;
mod traits;

pub mod arima;

pub use arima::{SARIMASpec, SARIMA};
pub use seasonal_replay::{seasonal_replay, SeasonalReplay};
pub use traits::{BoxedForecaster, Forecaster};
