//! Seasonal ARIMA models.
//!
//! This module provides:
//! - SARIMA models with (p, d, q)(P, D, Q)\[s\] specifications
//! - Differencing and lag-polynomial helpers

mod diff;
mod model;

pub use diff::{difference, differencing_polynomial, integrate, seasonal_difference};
pub use model::{SARIMASpec, SARIMA};
