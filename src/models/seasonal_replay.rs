//! Seasonal replay forecasting.
//!
//! Projects the last seasonal cycle of a classical decomposition forward.
//! The trend is not extrapolated, so forecasts oscillate around zero.

use crate::core::{Forecast, TimeSeries};
use crate::error::{ForecastError, Result};
use crate::models::Forecaster;
use crate::seasonality::{ClassicalDecomposition, Decomposition, SeasonalPattern};
use tracing::debug;

/// Replay `pattern` over `periods` steps following the end of `series`.
pub fn seasonal_replay(
    pattern: &SeasonalPattern,
    series: &TimeSeries,
    periods: usize,
) -> Result<Forecast> {
    let timestamps = series.future_timestamps(periods)?;
    Forecast::from_values(timestamps, pattern.replay(periods))
}

/// Forecaster that decomposes on `fit` and replays the seasonal cycle.
#[derive(Debug, Clone)]
pub struct SeasonalReplay {
    period: usize,
    decomposition: Option<Decomposition>,
    pattern: Option<SeasonalPattern>,
    history: Option<TimeSeries>,
    residuals: Option<Vec<f64>>,
}

impl SeasonalReplay {
    pub fn new(period: usize) -> Self {
        Self {
            period,
            decomposition: None,
            pattern: None,
            history: None,
            residuals: None,
        }
    }

    /// Build an already-fitted model from an existing decomposition of
    /// `series`.
    pub fn from_decomposition(decomposition: Decomposition, series: &TimeSeries) -> Result<Self> {
        if decomposition.len() != series.len() {
            return Err(ForecastError::DimensionMismatch {
                expected: series.len(),
                got: decomposition.len(),
            });
        }

        let mut model = Self::new(decomposition.period());
        model.store(decomposition, series);
        Ok(model)
    }

    pub fn period(&self) -> usize {
        self.period
    }

    pub fn decomposition(&self) -> Option<&Decomposition> {
        self.decomposition.as_ref()
    }

    pub fn pattern(&self) -> Option<&SeasonalPattern> {
        self.pattern.as_ref()
    }

    fn store(&mut self, decomposition: Decomposition, series: &TimeSeries) {
        let residuals = decomposition
            .observed()
            .iter()
            .zip(decomposition.seasonal())
            .map(|(y, s)| y - s)
            .collect();

        self.pattern = Some(decomposition.seasonal_pattern());
        self.residuals = Some(residuals);
        self.decomposition = Some(decomposition);
        self.history = Some(series.clone());
    }
}

impl Default for SeasonalReplay {
    fn default() -> Self {
        Self::new(12)
    }
}

impl Forecaster for SeasonalReplay {
    fn fit(&mut self, series: &TimeSeries) -> Result<()> {
        let decomposition = ClassicalDecomposition::new(self.period).decompose(series)?;
        self.store(decomposition, series);
        Ok(())
    }

    fn predict(&self, horizon: usize) -> Result<Forecast> {
        let pattern = self.pattern.as_ref().ok_or(ForecastError::FitRequired)?;
        let series = self.history.as_ref().ok_or(ForecastError::FitRequired)?;

        debug!(horizon, period = pattern.len(), "replaying seasonal pattern");
        seasonal_replay(pattern, series, horizon)
    }

    fn fitted_values(&self) -> Option<&[f64]> {
        self.decomposition.as_ref().map(|d| d.seasonal())
    }

    fn residuals(&self) -> Option<&[f64]> {
        self.residuals.as_deref()
    }

    fn name(&self) -> &str {
        "SeasonalReplay"
    }
}
