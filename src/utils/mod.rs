//! Utility functions for forecasting models.

pub mod metrics;
pub mod optimization;

pub use metrics::{calculate_metrics, mape, AccuracyMetrics};
pub use optimization::{nelder_mead, NelderMeadConfig, NelderMeadResult};
