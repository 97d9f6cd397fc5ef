//! The demand forecasting engine.
//!
//! [`ForecastEngine`] ties smoothing, classical decomposition, seasonal
//! replay, the SARIMA path and accuracy scoring together. It remembers the
//! most recent decomposition so that [`ForecastEngine::forecast`] can
//! replay its seasonal pattern.
//!
//! # Example
//!
//! ```
//! use demand_forecast::prelude::*;
//!
//! let values: Vec<f64> = (0..36)
//!     .map(|i| 100.0 + [8.0, -2.0, -6.0, 0.0][i % 4])
//!     .collect();
//! let series = TimeSeries::monthly(2021, 1, values).unwrap();
//!
//! let mut engine = ForecastEngine::new(EngineConfig::default().with_period(4));
//! engine.decompose_default(&series).unwrap();
//!
//! let forecast = engine.forecast(&series, 6).unwrap();
//! assert_eq!(forecast.horizon(), 6);
//! assert!((forecast.values()[0] - 8.0).abs() < 1e-9);
//! ```

use crate::config::EngineConfig;
use crate::core::{Forecast, TimeSeries};
use crate::error::{ForecastError, Result};
use crate::models::{seasonal_replay, Forecaster, SARIMA};
use crate::seasonality::{ClassicalDecomposition, Decomposition, SeasonalPattern};
use crate::transform::centered_mean;
use crate::utils::metrics::mape;
use tracing::debug;

/// Outcome of a holdout evaluation.
#[derive(Debug, Clone, PartialEq)]
pub struct Backtest {
    /// MAPE of the forecast against the held-out observations.
    pub mape: f64,
    /// Replayed forecast over the holdout index.
    pub forecast: Forecast,
    /// The held-out observations.
    pub actual: TimeSeries,
}

/// Stateful forecasting engine.
#[derive(Debug, Clone, Default)]
pub struct ForecastEngine {
    config: EngineConfig,
    last_decomposition: Option<Decomposition>,
    seasonal_pattern: Option<SeasonalPattern>,
}

impl ForecastEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            last_decomposition: None,
            seasonal_pattern: None,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The decomposition stored by the last successful [`decompose`](Self::decompose).
    pub fn last_decomposition(&self) -> Option<&Decomposition> {
        self.last_decomposition.as_ref()
    }

    pub fn seasonal_pattern(&self) -> Option<&SeasonalPattern> {
        self.seasonal_pattern.as_ref()
    }

    /// Centered moving average of width `window` on the series' index.
    pub fn smooth(&self, series: &TimeSeries, window: usize) -> Result<TimeSeries> {
        let smoothed = centered_mean(series.values(), window)?;
        debug!(window, observations = series.len(), "smoothed series");
        series.with_values(smoothed)
    }

    pub fn smooth_default(&self, series: &TimeSeries) -> Result<TimeSeries> {
        self.smooth(series, self.config.window)
    }

    /// Additively decompose the series and remember the result.
    ///
    /// On error the previously stored decomposition is kept.
    pub fn decompose(&mut self, series: &TimeSeries, period: usize) -> Result<Decomposition> {
        let decomposition = ClassicalDecomposition::new(period).decompose(series)?;

        self.seasonal_pattern = Some(decomposition.seasonal_pattern());
        self.last_decomposition = Some(decomposition.clone());
        Ok(decomposition)
    }

    pub fn decompose_default(&mut self, series: &TimeSeries) -> Result<Decomposition> {
        self.decompose(series, self.config.period)
    }

    /// Replay the stored seasonal pattern for `periods` steps after the
    /// end of `series`, with the configured band attached.
    ///
    /// The trend is not projected.
    pub fn forecast(&self, series: &TimeSeries, periods: usize) -> Result<Forecast> {
        let pattern = self
            .seasonal_pattern
            .as_ref()
            .ok_or(ForecastError::DecompositionRequired)?;
        self.replay(pattern, series, periods)
    }

    /// Replay the seasonal pattern of an explicit decomposition.
    pub fn forecast_from(
        &self,
        decomposition: &Decomposition,
        series: &TimeSeries,
        periods: usize,
    ) -> Result<Forecast> {
        self.replay(&decomposition.seasonal_pattern(), series, periods)
    }

    fn replay(
        &self,
        pattern: &SeasonalPattern,
        series: &TimeSeries,
        periods: usize,
    ) -> Result<Forecast> {
        let forecast = seasonal_replay(pattern, series, periods)?;
        debug!(periods, pattern_len = pattern.len(), "seasonal replay forecast");
        Ok(forecast.with_band(self.config.band.lower, self.config.band.upper))
    }

    /// Fit SARIMA(1,1,1)(1,1,1)\[period\] and forecast `periods` steps.
    pub fn parametric_forecast(&self, series: &TimeSeries, periods: usize) -> Result<Forecast> {
        let mut model = SARIMA::airline(self.config.period);
        model.fit(series)?;
        model.predict(periods)
    }

    /// MAPE in percent.
    pub fn accuracy(&self, actual: &[f64], forecast: &[f64]) -> Result<f64> {
        mape(actual, forecast)
    }

    /// MAPE of a dated forecast against dated observations on the same index.
    pub fn accuracy_series(&self, actual: &TimeSeries, forecast: &Forecast) -> Result<f64> {
        if actual.len() != forecast.horizon() {
            return Err(ForecastError::DimensionMismatch {
                expected: actual.len(),
                got: forecast.horizon(),
            });
        }
        if actual.timestamps() != forecast.timestamps() {
            return Err(ForecastError::TimestampError(
                "forecast and actual timestamps differ".to_string(),
            ));
        }
        self.accuracy(actual.values(), forecast.values())
    }

    /// Hold out the last `holdout` observations, replay a decomposition of
    /// the rest over them and score the result.
    ///
    /// The engine's stored decomposition is left untouched.
    pub fn backtest(&self, series: &TimeSeries, holdout: usize) -> Result<Backtest> {
        let (train, test) = series.split_holdout(holdout)?;
        let decomposition = ClassicalDecomposition::new(self.config.period).decompose(&train)?;
        let forecast = self.forecast_from(&decomposition, &train, holdout)?;
        let mape = self.accuracy_series(&test, &forecast)?;

        debug!(holdout, mape, "backtest complete");
        Ok(Backtest {
            mape,
            forecast,
            actual: test,
        })
    }
}
