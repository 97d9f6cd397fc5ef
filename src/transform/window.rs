//! Rolling window functions.
//!
//! Windows never shrink at the edges: positions without full support are
//! `NaN`, and any `NaN` inside a window propagates to the output.

use crate::error::{ForecastError, Result};

/// Centered simple moving average.
///
/// Entry `i` is the mean of `series[i - window/2 .. i - window/2 + window]`.
/// The first and last `window / 2` entries are `NaN`.
///
/// # Example
/// ```
/// use demand_forecast::transform::centered_mean;
///
/// let smoothed = centered_mean(&[1.0, 2.0, 3.0, 4.0, 5.0], 3).unwrap();
/// assert!(smoothed[0].is_nan());
/// assert_eq!(&smoothed[1..4], &[2.0, 3.0, 4.0]);
/// assert!(smoothed[4].is_nan());
/// ```
pub fn centered_mean(series: &[f64], window: usize) -> Result<Vec<f64>> {
    if window == 0 {
        return Err(ForecastError::InvalidParameter(
            "window must be positive".to_string(),
        ));
    }
    if window > series.len() {
        return Err(ForecastError::InvalidParameter(format!(
            "window {} exceeds series length {}",
            window,
            series.len()
        )));
    }

    let n = series.len();
    let half = window / 2;
    let mut result = vec![f64::NAN; n];

    for i in half..n - half {
        let start = i - half;
        let sum: f64 = series[start..start + window].iter().sum();
        result[i] = sum / window as f64;
    }

    Ok(result)
}

/// Symmetric weighted filter (two-sided convolution).
///
/// `weights` must have odd length; the first and last `weights.len() / 2`
/// outputs are `NaN`.
pub fn centered_filter(series: &[f64], weights: &[f64]) -> Vec<f64> {
    let n = series.len();
    let width = weights.len();
    let mut result = vec![f64::NAN; n];
    if width == 0 || width % 2 == 0 || width > n {
        return result;
    }

    let half = width / 2;
    for i in half..n - half {
        let start = i - half;
        result[i] = series[start..start + width]
            .iter()
            .zip(weights)
            .map(|(x, w)| x * w)
            .sum();
    }
    result
}
