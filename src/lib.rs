//! # demand-forecast
//!
//! Demand forecasting for dated value series.
//!
//! Provides centered moving-average smoothing, classical additive seasonal
//! decomposition, seasonal-replay forecasting, a seasonal ARIMA model fitted
//! by conditional sum of squares, and forecast accuracy scoring, tied
//! together by [`engine::ForecastEngine`].

// Allow some clippy warnings for cleaner code in specific cases
#![allow(clippy::upper_case_acronyms)]
#![allow(clippy::type_complexity)]
#![allow(clippy::needless_range_loop)]

pub mod config;
pub mod core;
pub mod engine;
pub mod error;
pub mod io;
pub mod models;
pub mod seasonality;
pub mod transform;
pub mod utils;

pub use error::{ErrorKind, FitFailure, ForecastError, Result};

pub mod prelude {
    pub use crate::config::{ConfidenceBand, EngineConfig};
    pub use crate::core::{Forecast, Frequency, TimeSeries};
    pub use crate::engine::{Backtest, ForecastEngine};
    pub use crate::error::{ErrorKind, FitFailure, ForecastError, Result};
    pub use crate::models::{Forecaster, SeasonalReplay, SARIMASpec, SARIMA};
    pub use crate::seasonality::{ClassicalDecomposition, Decomposition, SeasonalPattern};
    pub use crate::utils::{calculate_metrics, mape, AccuracyMetrics};
}
