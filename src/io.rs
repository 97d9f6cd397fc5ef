//! CSV input and output.
//!
//! Input tables need a `date` and a `value` column; other columns are
//! ignored. Forecasts are written as `date,forecast_value` rows.

use crate::core::{Forecast, TimeSeries};
use crate::error::{ForecastError, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use csv::{ReaderBuilder, Writer};
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use tracing::debug;

pub const DATE_COLUMN: &str = "date";
pub const VALUE_COLUMN: &str = "value";
pub const FORECAST_COLUMN: &str = "forecast_value";

/// Parse a date in `%Y-%m-%d`, `%Y-%m-%d %H:%M:%S` or RFC 3339 form.
pub fn parse_date(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return Some(Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN)));
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S") {
        return Some(Utc.from_utc_datetime(&dt));
    }
    DateTime::parse_from_rfc3339(text)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

fn format_date(ts: DateTime<Utc>) -> String {
    if ts.time() == NaiveTime::MIN {
        ts.format("%Y-%m-%d").to_string()
    } else {
        ts.to_rfc3339()
    }
}

/// `Ok(None)` for an empty or `NaN` cell, an error for text that is not a
/// finite number.
fn parse_value(text: &str) -> Result<Option<f64>> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(None);
    }
    match text.parse::<f64>() {
        Ok(v) if v.is_nan() => Ok(None),
        Ok(v) if v.is_finite() => Ok(Some(v)),
        _ => Err(ForecastError::DataFormat(format!(
            "column '{VALUE_COLUMN}' must be numeric, got '{text}'"
        ))),
    }
}

/// Read a `date,value` table into a series sorted by date.
///
/// Rows with an unparseable date or an empty value are dropped. A value
/// that is present but not numeric is a format error, as are duplicate
/// dates.
pub fn read_series_csv<R: Read>(reader: R) -> Result<TimeSeries> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    let column = |name: &str| {
        headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| ForecastError::DataFormat(format!("missing required column '{name}'")))
    };
    let date_idx = column(DATE_COLUMN)?;
    let value_idx = column(VALUE_COLUMN)?;

    let mut rows = Vec::new();
    let mut dropped = 0usize;
    for record in rdr.records() {
        let record = record?;
        let date = record.get(date_idx).and_then(parse_date);
        let value = match record.get(value_idx) {
            Some(cell) => parse_value(cell)?,
            None => None,
        };
        match (date, value) {
            (Some(date), Some(value)) => rows.push((date, value)),
            _ => dropped += 1,
        }
    }

    if rows.is_empty() {
        return Err(ForecastError::EmptyData);
    }

    rows.sort_by_key(|(date, _)| *date);
    if let Some(pair) = rows.windows(2).find(|w| w[0].0 == w[1].0) {
        return Err(ForecastError::TimestampError(format!(
            "duplicate date {}",
            format_date(pair[0].0)
        )));
    }

    debug!(rows = rows.len(), dropped, "loaded series from csv");
    let (timestamps, values): (Vec<_>, Vec<_>) = rows.into_iter().unzip();
    TimeSeries::new(timestamps, values)
}

/// Load a `date,value` CSV file.
pub fn load_series<P: AsRef<Path>>(path: P) -> Result<TimeSeries> {
    let file = File::open(path.as_ref())?;
    read_series_csv(file).map(|series| match path.as_ref().file_stem() {
        Some(stem) => series.with_name(stem.to_string_lossy()),
        None => series,
    })
}

/// Write forecast points as `date,forecast_value` rows.
pub fn write_forecast_csv<W: Write>(writer: W, forecast: &Forecast) -> Result<()> {
    let mut wtr = Writer::from_writer(writer);
    wtr.write_record([DATE_COLUMN, FORECAST_COLUMN])?;
    for (ts, value) in forecast.iter() {
        wtr.write_record([format_date(ts), value.to_string()])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Save a forecast to a CSV file.
pub fn save_forecast<P: AsRef<Path>>(path: P, forecast: &Forecast) -> Result<()> {
    let file = File::create(path)?;
    write_forecast_csv(file, forecast)
}
