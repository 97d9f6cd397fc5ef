//! Seasonal decomposition.
//!
//! Classical additive decomposition splits a series into trend, seasonal
//! and residual components; its last seasonal cycle drives seasonal-replay
//! forecasting.

mod classical;

pub use classical::{ClassicalDecomposition, Decomposition, SeasonalPattern};
