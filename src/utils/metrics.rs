//! Accuracy metrics for forecast evaluation.

use crate::error::{ForecastError, Result};

/// Accuracy metrics for evaluating forecast performance.
#[derive(Debug, Clone, PartialEq)]
pub struct AccuracyMetrics {
    /// Mean Absolute Error
    pub mae: f64,
    /// Mean Squared Error
    pub mse: f64,
    /// Root Mean Squared Error
    pub rmse: f64,
    /// Mean Absolute Percentage Error; non-finite when an actual is zero.
    pub mape: f64,
    /// Symmetric Mean Absolute Percentage Error
    pub smape: f64,
}

fn check_aligned(actual: &[f64], predicted: &[f64]) -> Result<()> {
    if actual.is_empty() || predicted.is_empty() {
        return Err(ForecastError::EmptyData);
    }
    if actual.len() != predicted.len() {
        return Err(ForecastError::DimensionMismatch {
            expected: actual.len(),
            got: predicted.len(),
        });
    }
    Ok(())
}

/// Mean absolute percentage error, in percent.
///
/// A zero actual makes the score non-finite (`inf`, or `NaN` when the
/// prediction is zero too); that is surfaced rather than skipped.
///
/// # Example
/// ```
/// use demand_forecast::utils::mape;
///
/// let score = mape(&[100.0, 200.0], &[110.0, 190.0]).unwrap();
/// assert!((score - 7.5).abs() < 1e-12);
/// ```
pub fn mape(actual: &[f64], predicted: &[f64]) -> Result<f64> {
    check_aligned(actual, predicted)?;
    let sum: f64 = actual
        .iter()
        .zip(predicted)
        .map(|(a, p)| (a - p).abs() / a.abs())
        .sum();
    Ok(100.0 * sum / actual.len() as f64)
}

/// Calculate all accuracy metrics between actual and predicted values.
pub fn calculate_metrics(actual: &[f64], predicted: &[f64]) -> Result<AccuracyMetrics> {
    check_aligned(actual, predicted)?;
    let n = actual.len() as f64;

    let mae = actual
        .iter()
        .zip(predicted)
        .map(|(a, p)| (a - p).abs())
        .sum::<f64>()
        / n;
    let mse = actual
        .iter()
        .zip(predicted)
        .map(|(a, p)| (a - p).powi(2))
        .sum::<f64>()
        / n;
    let smape = actual
        .iter()
        .zip(predicted)
        .map(|(a, p)| {
            let denom = a.abs() + p.abs();
            if denom == 0.0 {
                0.0
            } else {
                2.0 * (a - p).abs() / denom
            }
        })
        .sum::<f64>()
        * 100.0
        / n;

    Ok(AccuracyMetrics {
        mae,
        mse,
        rmse: mse.sqrt(),
        mape: mape(actual, predicted)?,
        smape,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn mape_known_value() {
        let score = mape(&[100.0, 200.0], &[110.0, 190.0]).unwrap();
        assert_relative_eq!(score, 7.5, epsilon = 1e-12);
    }

    #[test]
    fn mape_perfect_forecast_is_zero() {
        let score = mape(&[3.0, 4.0, 5.0], &[3.0, 4.0, 5.0]).unwrap();
        assert_eq!(score, 0.0);
    }

    #[test]
    fn mape_uses_absolute_actuals() {
        let score = mape(&[-100.0], &[-90.0]).unwrap();
        assert_relative_eq!(score, 10.0, epsilon = 1e-12);
    }

    #[test]
    fn mape_zero_actual_is_not_suppressed() {
        let score = mape(&[0.0, 100.0], &[5.0, 100.0]).unwrap();
        assert!(score.is_infinite());

        let score = mape(&[0.0, 100.0], &[0.0, 100.0]).unwrap();
        assert!(score.is_nan());
    }

    #[test]
    fn mape_dimension_mismatch() {
        assert!(matches!(
            mape(&[1.0, 2.0, 3.0], &[1.0, 2.0]),
            Err(ForecastError::DimensionMismatch {
                expected: 3,
                got: 2
            })
        ));
    }

    #[test]
    fn mape_empty_data() {
        assert!(matches!(mape(&[], &[]), Err(ForecastError::EmptyData)));
    }

    #[test]
    fn calculate_metrics_known_values() {
        let actual = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let predicted = vec![1.5, 2.5, 2.5, 4.5, 4.5];

        let metrics = calculate_metrics(&actual, &predicted).unwrap();

        assert_relative_eq!(metrics.mae, 0.5, epsilon = 1e-10);
        assert_relative_eq!(metrics.mse, 0.25, epsilon = 1e-10);
        assert_relative_eq!(metrics.rmse, 0.5, epsilon = 1e-10);
        assert!(metrics.smape > 0.0);
    }

    #[test]
    fn calculate_metrics_carries_non_finite_mape() {
        let metrics = calculate_metrics(&[0.0, 1.0, 2.0], &[0.1, 1.1, 2.1]).unwrap();
        assert!(metrics.mape.is_infinite());
        assert!(metrics.smape.is_finite());
    }
}
