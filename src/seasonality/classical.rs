//! Classical additive decomposition by centered moving averages.
//!
//! The series is split into three components:
//! - Trend: a centered moving average spanning one full season
//! - Seasonal: per-phase means of the detrended series, tiled
//! - Residual: what remains after removing trend and seasonal

use crate::core::TimeSeries;
use crate::error::{ForecastError, Result};
use crate::transform::centered_filter;
use chrono::{DateTime, Utc};
use tracing::debug;

/// Result of an additive decomposition, aligned on the input index.
#[derive(Debug, Clone, PartialEq)]
pub struct Decomposition {
    timestamps: Vec<DateTime<Utc>>,
    observed: Vec<f64>,
    trend: Vec<f64>,
    seasonal: Vec<f64>,
    residual: Vec<f64>,
    period: usize,
}

impl Decomposition {
    pub fn period(&self) -> usize {
        self.period
    }

    pub fn len(&self) -> usize {
        self.observed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observed.is_empty()
    }

    pub fn timestamps(&self) -> &[DateTime<Utc>] {
        &self.timestamps
    }

    pub fn observed(&self) -> &[f64] {
        &self.observed
    }

    /// Trend component; `NaN` within `period / 2` of either edge.
    pub fn trend(&self) -> &[f64] {
        &self.trend
    }

    /// Seasonal component; fully defined and exactly periodic.
    pub fn seasonal(&self) -> &[f64] {
        &self.seasonal
    }

    /// Residual component; `NaN` wherever the trend is.
    pub fn residual(&self) -> &[f64] {
        &self.residual
    }

    pub fn trend_series(&self) -> Result<TimeSeries> {
        self.component_series(&self.trend, "trend")
    }

    pub fn seasonal_series(&self) -> Result<TimeSeries> {
        self.component_series(&self.seasonal, "seasonal")
    }

    pub fn residual_series(&self) -> Result<TimeSeries> {
        self.component_series(&self.residual, "residual")
    }

    fn component_series(&self, values: &[f64], name: &str) -> Result<TimeSeries> {
        Ok(TimeSeries::new(self.timestamps.clone(), values.to_vec())?.with_name(name))
    }

    /// The last full seasonal cycle, phase-aligned so that replay continues
    /// directly after the final observation.
    pub fn seasonal_pattern(&self) -> SeasonalPattern {
        let start = self.seasonal.len().saturating_sub(self.period);
        SeasonalPattern {
            values: self.seasonal[start..].to_vec(),
        }
    }

    /// Seasonal strength in `[0, 1]` over the defined residuals.
    pub fn seasonal_strength(&self) -> f64 {
        strength(&self.seasonal, &self.residual)
    }

    /// Trend strength in `[0, 1]` over the defined residuals.
    pub fn trend_strength(&self) -> f64 {
        strength(&self.trend, &self.residual)
    }
}

/// One seasonal cycle, replayed cyclically to forecast.
#[derive(Debug, Clone, PartialEq)]
pub struct SeasonalPattern {
    values: Vec<f64>,
}

impl SeasonalPattern {
    /// Build a pattern from an explicit cycle.
    pub fn new(values: Vec<f64>) -> Result<Self> {
        if values.is_empty() {
            return Err(ForecastError::EmptyData);
        }
        if values.iter().any(|v| !v.is_finite()) {
            return Err(ForecastError::MissingValues);
        }
        Ok(Self { values })
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Value at forecast offset `i` (0-based), wrapping at the cycle length.
    pub fn at(&self, i: usize) -> f64 {
        self.values[i % self.values.len()]
    }

    /// The first `horizon` values of the repeated cycle.
    pub fn replay(&self, horizon: usize) -> Vec<f64> {
        (0..horizon).map(|i| self.at(i)).collect()
    }
}

/// Classical additive decomposition with a fixed seasonal period.
#[derive(Debug, Clone, Copy)]
pub struct ClassicalDecomposition {
    period: usize,
}

impl ClassicalDecomposition {
    /// Create a decomposer for the given seasonal period.
    pub fn new(period: usize) -> Self {
        Self { period }
    }

    pub fn period(&self) -> usize {
        self.period
    }

    /// Minimum number of observations for a stable decomposition.
    pub fn min_length(&self) -> usize {
        2 * self.period
    }

    /// Moving-average weights spanning one season. Even periods use a
    /// `2 x period` average of width `period + 1` with half end weights.
    pub fn trend_weights(&self) -> Vec<f64> {
        let p = self.period as f64;
        if self.period % 2 == 1 {
            vec![1.0 / p; self.period]
        } else {
            let mut weights = vec![1.0 / p; self.period + 1];
            weights[0] = 0.5 / p;
            weights[self.period] = 0.5 / p;
            weights
        }
    }

    /// Decompose the series.
    pub fn decompose(&self, series: &TimeSeries) -> Result<Decomposition> {
        if self.period == 0 {
            return Err(ForecastError::InvalidParameter(
                "seasonal period must be positive".to_string(),
            ));
        }

        let observed = series.values();
        let n = observed.len();
        if n < self.min_length() {
            return Err(ForecastError::InsufficientData {
                needed: self.min_length(),
                got: n,
            });
        }
        if series.has_missing_values() {
            return Err(ForecastError::MissingValues);
        }

        let trend = centered_filter(observed, &self.trend_weights());
        let phase_means = self.phase_means(observed, &trend);

        let seasonal: Vec<f64> = (0..n).map(|i| phase_means[i % self.period]).collect();
        let residual: Vec<f64> = observed
            .iter()
            .zip(&trend)
            .zip(&seasonal)
            .map(|((y, t), s)| y - t - s)
            .collect();

        debug!(
            period = self.period,
            observations = n,
            "classical decomposition complete"
        );

        Ok(Decomposition {
            timestamps: series.timestamps().to_vec(),
            observed: observed.to_vec(),
            trend,
            seasonal,
            residual,
            period: self.period,
        })
    }

    /// Mean detrended value per phase, centered to sum to zero.
    fn phase_means(&self, observed: &[f64], trend: &[f64]) -> Vec<f64> {
        let mut sums = vec![0.0; self.period];
        let mut counts = vec![0usize; self.period];

        for (i, (y, t)) in observed.iter().zip(trend).enumerate() {
            if t.is_finite() {
                sums[i % self.period] += y - t;
                counts[i % self.period] += 1;
            }
        }

        // Two full periods guarantee every phase has a defined trend point.
        let means: Vec<f64> = sums
            .iter()
            .zip(&counts)
            .map(|(s, &c)| s / c as f64)
            .collect();

        let offset = means.iter().sum::<f64>() / self.period as f64;
        means.iter().map(|m| m - offset).collect()
    }
}

impl Default for ClassicalDecomposition {
    fn default() -> Self {
        Self::new(12)
    }
}

fn strength(component: &[f64], residual: &[f64]) -> f64 {
    let (with_component, remainder): (Vec<f64>, Vec<f64>) = component
        .iter()
        .zip(residual)
        .filter(|(c, r)| c.is_finite() && r.is_finite())
        .map(|(c, r)| (c + r, *r))
        .unzip();

    let var_total = variance(&with_component);
    if var_total < 1e-10 {
        return 0.0;
    }
    (1.0 - variance(&remainder) / var_total).max(0.0)
}

fn variance(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 2 {
        return 0.0;
    }
    let mean: f64 = values.iter().sum::<f64>() / n as f64;
    values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1) as f64
}
