//! Data transformations for time series.
//!
//! # Example
//!
//! ```
//! use demand_forecast::transform::{centered_filter, centered_mean};
//!
//! let series = vec![1.0, 2.0, 3.0, 4.0, 5.0];
//!
//! let mean = centered_mean(&series, 3).unwrap();
//! let filtered = centered_filter(&series, &[1.0 / 3.0; 3]);
//! assert!(mean[0].is_nan() && filtered[0].is_nan());
//! assert!((mean[2] - filtered[2]).abs() < 1e-12);
//! ```

pub mod window;

pub use window::{centered_filter, centered_mean};
