//! Engine configuration.
//!
//! Every field has a default, so a TOML document only needs to name the
//! values it overrides:
//!
//! ```
//! use demand_forecast::config::EngineConfig;
//!
//! let config = EngineConfig::from_toml_str("period = 4\n[band]\nupper = 1.2\n").unwrap();
//! assert_eq!(config.period, 4);
//! assert_eq!(config.window, 3);
//! assert_eq!(config.band.lower, 0.9);
//! assert_eq!(config.band.upper, 1.2);
//! ```

use crate::error::{ForecastError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Multiplicative band attached to seasonal-replay forecasts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfidenceBand {
    /// Lower bound multiplier.
    pub lower: f64,
    /// Upper bound multiplier.
    pub upper: f64,
}

impl Default for ConfidenceBand {
    fn default() -> Self {
        Self {
            lower: 0.9,
            upper: 1.1,
        }
    }
}

/// Defaults for the engine operations.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Moving average window for `smooth_default`.
    pub window: usize,
    /// Seasonal period for decomposition and the SARIMA path.
    pub period: usize,
    /// Default forecast horizon.
    pub horizon: usize,
    /// Band attached to replayed forecasts.
    pub band: ConfidenceBand,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            window: 3,
            period: 12,
            horizon: 12,
            band: ConfidenceBand::default(),
        }
    }
}

impl EngineConfig {
    pub fn with_window(mut self, window: usize) -> Self {
        self.window = window;
        self
    }

    pub fn with_period(mut self, period: usize) -> Self {
        self.period = period;
        self
    }

    pub fn with_horizon(mut self, horizon: usize) -> Self {
        self.horizon = horizon;
        self
    }

    pub fn with_band(mut self, lower: f64, upper: f64) -> Self {
        self.band = ConfidenceBand { lower, upper };
        self
    }

    /// Check that every value is usable.
    pub fn validate(&self) -> Result<()> {
        if self.window == 0 {
            return Err(ForecastError::InvalidParameter(
                "window must be positive".to_string(),
            ));
        }
        if self.period == 0 {
            return Err(ForecastError::InvalidParameter(
                "period must be positive".to_string(),
            ));
        }
        let ConfidenceBand { lower, upper } = self.band;
        if !lower.is_finite() || !upper.is_finite() || lower < 0.0 || lower > upper {
            return Err(ForecastError::InvalidParameter(format!(
                "band must satisfy 0 <= lower <= upper, got [{lower}, {upper}]"
            )));
        }
        Ok(())
    }

    /// Parse and validate a TOML document.
    pub fn from_toml_str(toml: &str) -> Result<Self> {
        let config: EngineConfig = toml::from_str(toml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| ForecastError::Config(e.to_string()))
    }
}
