//! Sampling frequency of a regular time index.

use crate::error::{ForecastError, Result};
use chrono::{DateTime, Datelike, Duration, Months, NaiveDate, TimeZone, Utc};

/// Spacing between consecutive observations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Frequency {
    /// A fixed wall-clock step (hourly, daily, weekly, ...).
    Fixed(Duration),
    /// A calendar step of whole months. Month-end anchored indices stay
    /// on month ends.
    Months(u32),
}

impl Frequency {
    /// Monthly sampling, the convention for demand data.
    pub fn monthly() -> Self {
        Frequency::Months(1)
    }

    /// Daily sampling.
    pub fn daily() -> Self {
        Frequency::Fixed(Duration::days(1))
    }

    /// Timestamp `steps` periods after `from`.
    pub fn advance(&self, from: DateTime<Utc>, steps: u32) -> Result<DateTime<Utc>> {
        let next = match *self {
            Frequency::Fixed(step) => step
                .checked_mul(steps as i32)
                .and_then(|offset| from.checked_add_signed(offset)),
            Frequency::Months(months) => months
                .checked_mul(steps)
                .and_then(|total| add_months(from, total)),
        };

        next.ok_or_else(|| {
            ForecastError::TimestampError(format!(
                "cannot advance {} by {} steps of {:?}",
                from, steps, self
            ))
        })
    }

    /// Infer the frequency of a regular index.
    ///
    /// Every gap must be identical; calendar-month spacing is recognised
    /// before falling back to a fixed duration.
    pub fn infer(timestamps: &[DateTime<Utc>]) -> Result<Self> {
        if timestamps.len() < 2 {
            return Err(ForecastError::InsufficientData {
                needed: 2,
                got: timestamps.len(),
            });
        }

        let first = timestamps[0];
        let second = timestamps[1];
        let month_gap = month_index(second) - month_index(first);
        if month_gap >= 1 {
            let months = month_gap as u32;
            let regular = timestamps
                .windows(2)
                .all(|w| add_months(w[0], months) == Some(w[1]));
            if regular {
                return Ok(Frequency::Months(months));
            }
        }

        let step = second - first;
        if timestamps.windows(2).all(|w| w[1] - w[0] == step) {
            return Ok(Frequency::Fixed(step));
        }

        Err(ForecastError::FrequencyInference(
            "timestamps are not regularly spaced".to_string(),
        ))
    }
}

fn month_index(ts: DateTime<Utc>) -> i64 {
    ts.year() as i64 * 12 + ts.month0() as i64
}

fn add_months(from: DateTime<Utc>, months: u32) -> Option<DateTime<Utc>> {
    let shifted = from.checked_add_months(Months::new(months))?;
    if !is_month_end(from.date_naive()) {
        return Some(shifted);
    }

    let date = last_day_of_month(shifted.date_naive())?;
    Some(Utc.from_utc_datetime(&date.and_time(from.time())))
}

fn is_month_end(date: NaiveDate) -> bool {
    date.succ_opt()
        .map_or(true, |next| next.month() != date.month())
}

fn last_day_of_month(date: NaiveDate) -> Option<NaiveDate> {
    date.with_day(1)?
        .checked_add_months(Months::new(1))?
        .pred_opt()
}
