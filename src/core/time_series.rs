//! TimeSeries data structure for representing dated demand observations.

use crate::core::Frequency;
use crate::error::{ForecastError, Result};
use chrono::{DateTime, NaiveDate, TimeZone, Utc};

/// An ordered univariate series of `(timestamp, value)` pairs.
///
/// Timestamps are strictly increasing. Undefined entries (for example the
/// edges of a centered moving average) are stored as `NaN`.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeries {
    timestamps: Vec<DateTime<Utc>>,
    values: Vec<f64>,
    name: Option<String>,
    frequency: Option<Frequency>,
}

/// Builder for constructing TimeSeries.
#[derive(Debug, Clone, Default)]
pub struct TimeSeriesBuilder {
    timestamps: Vec<DateTime<Utc>>,
    values: Vec<f64>,
    name: Option<String>,
    frequency: Option<Frequency>,
}

impl TimeSeriesBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn timestamps(mut self, timestamps: Vec<DateTime<Utc>>) -> Self {
        self.timestamps = timestamps;
        self
    }

    /// Use calendar dates (midnight UTC) as the index.
    pub fn dates(mut self, dates: &[NaiveDate]) -> Self {
        self.timestamps = dates.iter().map(|d| midnight(*d)).collect();
        self
    }

    pub fn values(mut self, values: Vec<f64>) -> Self {
        self.values = values;
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn frequency(mut self, freq: Frequency) -> Self {
        self.frequency = Some(freq);
        self
    }

    pub fn build(self) -> Result<TimeSeries> {
        let mut series = TimeSeries::new(self.timestamps, self.values)?;
        series.name = self.name;
        series.frequency = self.frequency;
        Ok(series)
    }
}

impl TimeSeries {
    /// Create a series, validating the index.
    pub fn new(timestamps: Vec<DateTime<Utc>>, values: Vec<f64>) -> Result<Self> {
        if values.len() != timestamps.len() {
            return Err(ForecastError::DimensionMismatch {
                expected: timestamps.len(),
                got: values.len(),
            });
        }

        if timestamps.windows(2).any(|w| w[1] <= w[0]) {
            return Err(ForecastError::TimestampError(
                "timestamps must be strictly increasing".to_string(),
            ));
        }

        Ok(Self {
            timestamps,
            values,
            name: None,
            frequency: None,
        })
    }

    pub fn builder() -> TimeSeriesBuilder {
        TimeSeriesBuilder::new()
    }

    /// A regular series of `values` starting at `start`.
    pub fn regular(start: DateTime<Utc>, frequency: Frequency, values: Vec<f64>) -> Result<Self> {
        let timestamps = (0..values.len() as u32)
            .map(|i| frequency.advance(start, i))
            .collect::<Result<Vec<_>>>()?;

        let mut series = Self::new(timestamps, values)?;
        series.frequency = Some(frequency);
        Ok(series)
    }

    /// A month-start series beginning at `year`/`month`.
    pub fn monthly(year: i32, month: u32, values: Vec<f64>) -> Result<Self> {
        let start = Utc
            .with_ymd_and_hms(year, month, 1, 0, 0, 0)
            .single()
            .ok_or_else(|| {
                ForecastError::InvalidParameter(format!("invalid start month {year}-{month}"))
            })?;
        Self::regular(start, Frequency::monthly(), values)
    }

    /// Get the number of observations.
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    /// Check if the series is empty.
    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    pub fn timestamps(&self) -> &[DateTime<Utc>] {
        &self.timestamps
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Iterate over `(timestamp, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (DateTime<Utc>, f64)> + '_ {
        self.timestamps
            .iter()
            .copied()
            .zip(self.values.iter().copied())
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn first_timestamp(&self) -> Option<DateTime<Utc>> {
        self.timestamps.first().copied()
    }

    pub fn last_timestamp(&self) -> Option<DateTime<Utc>> {
        self.timestamps.last().copied()
    }

    /// Explicitly set frequency, if any.
    pub fn frequency(&self) -> Option<Frequency> {
        self.frequency
    }

    pub fn set_frequency(&mut self, freq: Frequency) {
        self.frequency = Some(freq);
    }

    /// The explicit frequency, or one inferred from the index.
    pub fn resolved_frequency(&self) -> Result<Frequency> {
        match self.frequency {
            Some(freq) => Ok(freq),
            None => Frequency::infer(&self.timestamps),
        }
    }

    /// `horizon` timestamps continuing after the last observation.
    pub fn future_timestamps(&self, horizon: usize) -> Result<Vec<DateTime<Utc>>> {
        if horizon == 0 {
            return Ok(Vec::new());
        }
        let last = self.last_timestamp().ok_or(ForecastError::EmptyData)?;
        let freq = self.resolved_frequency()?;

        (1..=horizon as u32)
            .map(|step| freq.advance(last, step))
            .collect()
    }

    /// A derived series with new values on the same index.
    pub fn with_values(&self, values: Vec<f64>) -> Result<TimeSeries> {
        if values.len() != self.len() {
            return Err(ForecastError::DimensionMismatch {
                expected: self.len(),
                got: values.len(),
            });
        }

        Ok(TimeSeries {
            timestamps: self.timestamps.clone(),
            values,
            name: self.name.clone(),
            frequency: self.frequency,
        })
    }

    /// Extract a slice of the time series.
    pub fn slice(&self, start: usize, end: usize) -> Result<TimeSeries> {
        if start > end {
            return Err(ForecastError::InvalidParameter(
                "start must be <= end".to_string(),
            ));
        }
        if end > self.len() {
            return Err(ForecastError::InvalidParameter(format!(
                "slice end {} exceeds series length {}",
                end,
                self.len()
            )));
        }

        Ok(TimeSeries {
            timestamps: self.timestamps[start..end].to_vec(),
            values: self.values[start..end].to_vec(),
            name: self.name.clone(),
            frequency: self.frequency,
        })
    }

    /// Split into history and the last `holdout` observations.
    pub fn split_holdout(&self, holdout: usize) -> Result<(TimeSeries, TimeSeries)> {
        if holdout == 0 || holdout >= self.len() {
            return Err(ForecastError::InvalidParameter(format!(
                "holdout must be in 1..{}, got {}",
                self.len(),
                holdout
            )));
        }

        let cut = self.len() - holdout;
        let mut train = self.slice(0, cut)?;
        let mut test = self.slice(cut, self.len())?;

        // Short tails cannot always infer their own spacing.
        if let Ok(freq) = self.resolved_frequency() {
            train.frequency = Some(freq);
            test.frequency = Some(freq);
        }
        Ok((train, test))
    }

    /// Check if series has missing values (NaN or Inf).
    pub fn has_missing_values(&self) -> bool {
        self.values.iter().any(|v| !v.is_finite())
    }

    /// Number of finite entries.
    pub fn defined_len(&self) -> usize {
        self.values.iter().filter(|v| v.is_finite()).count()
    }
}

fn midnight(date: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_time(chrono::NaiveTime::MIN))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn make_timestamps(n: usize) -> Vec<DateTime<Utc>> {
        let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        (0..n).map(|i| base + Duration::days(i as i64)).collect()
    }

    #[test]
    fn constructs_series() {
        let timestamps = make_timestamps(5);
        let values = vec![1.0, 2.0, 3.0, 4.0, 5.0];

        let ts = TimeSeries::new(timestamps.clone(), values.clone()).unwrap();

        assert_eq!(ts.len(), 5);
        assert!(!ts.is_empty());
        assert_eq!(ts.values(), &values);
        assert_eq!(ts.timestamps(), &timestamps);
        assert!(ts.frequency().is_none());
        assert_eq!(ts.resolved_frequency().unwrap(), Frequency::daily());
    }

    #[test]
    fn rejects_non_increasing_timestamps() {
        let mut timestamps = make_timestamps(3);
        timestamps.swap(1, 2);
        let result = TimeSeries::new(timestamps, vec![1.0, 2.0, 3.0]);
        assert!(matches!(result, Err(ForecastError::TimestampError(_))));

        let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let duplicated = vec![base, base + Duration::days(1), base + Duration::days(1)];
        let result = TimeSeries::new(duplicated, vec![1.0, 2.0, 3.0]);
        assert!(matches!(result, Err(ForecastError::TimestampError(_))));
    }

    #[test]
    fn rejects_length_mismatch() {
        let result = TimeSeries::new(make_timestamps(3), vec![1.0, 2.0]);
        assert!(matches!(
            result,
            Err(ForecastError::DimensionMismatch {
                expected: 3,
                got: 2
            })
        ));
    }

    #[test]
    fn monthly_constructor_sets_frequency() {
        let ts = TimeSeries::monthly(2023, 11, vec![1.0, 2.0, 3.0]).unwrap();
        assert_eq!(ts.frequency(), Some(Frequency::monthly()));
        assert_eq!(
            ts.last_timestamp().unwrap(),
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn builder_with_dates() {
        let dates = [
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
        ];
        let ts = TimeSeries::builder()
            .dates(&dates)
            .values(vec![10.0, 12.0])
            .name("sales")
            .build()
            .unwrap();

        assert_eq!(ts.name(), Some("sales"));
        assert_eq!(ts.resolved_frequency().unwrap(), Frequency::monthly());
    }

    #[test]
    fn future_timestamps_continue_the_index() {
        let ts = TimeSeries::monthly(2024, 10, vec![1.0, 2.0, 3.0]).unwrap();
        let future = ts.future_timestamps(2).unwrap();
        assert_eq!(
            future,
            vec![
                Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
                Utc.with_ymd_and_hms(2025, 2, 1, 0, 0, 0).unwrap(),
            ]
        );
        assert!(ts.future_timestamps(0).unwrap().is_empty());
    }

    #[test]
    fn split_holdout_keeps_frequency() {
        let ts = TimeSeries::monthly(2020, 1, (0..10).map(|i| i as f64).collect()).unwrap();
        let (train, test) = ts.split_holdout(1).unwrap();
        assert_eq!(train.len(), 9);
        assert_eq!(test.len(), 1);
        assert_eq!(test.frequency(), Some(Frequency::monthly()));

        assert!(ts.split_holdout(0).is_err());
        assert!(ts.split_holdout(10).is_err());
    }

    #[test]
    fn detects_missing_values() {
        let ts = TimeSeries::new(make_timestamps(3), vec![1.0, f64::NAN, 3.0]).unwrap();
        assert!(ts.has_missing_values());
        assert_eq!(ts.defined_len(), 2);
    }

    #[test]
    fn with_values_preserves_index() {
        let ts = TimeSeries::new(make_timestamps(3), vec![1.0, 2.0, 3.0]).unwrap();
        let derived = ts.with_values(vec![0.0, 0.0, 0.0]).unwrap();
        assert_eq!(derived.timestamps(), ts.timestamps());
        assert!(ts.with_values(vec![0.0]).is_err());
    }
}
