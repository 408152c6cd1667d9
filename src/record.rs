//! Daily weather observation records.
//!
//! A `Record` is built from one row of the dataset file, in column order
//! `date, precipitation, temp_max, temp_min, wind, weather`.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of columns a dataset row must carry
pub const COLUMN_COUNT: usize = 6;

/// Canonical on-the-wire date format
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Why a dataset row was rejected during load
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RowError {
    #[error("expected {expected} columns, found {found}")]
    FieldCount { expected: usize, found: usize },

    #[error("invalid {column} column: '{value}'")]
    InvalidNumber { column: &'static str, value: String },

    #[error("non-finite {column} column: '{value}'")]
    NonFiniteNumber { column: &'static str, value: String },

    #[error("invalid date column: '{value}', expected YYYY-MM-DD")]
    InvalidDate { value: String },
}

/// One validated weather observation for a single calendar date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Observation date
    pub date: NaiveDate,
    /// Precipitation
    pub precipitation: f64,
    /// Maximum temperature
    pub temp_max: f64,
    /// Minimum temperature
    pub temp_min: f64,
    /// Wind speed
    pub wind: f64,
    /// Free-form weather category label (e.g. "rain", "sun")
    pub weather: String,
}

impl Record {
    /// Validate a raw row and build a record from it
    pub fn from_row<S: AsRef<str>>(row: &[S]) -> Result<Self, RowError> {
        if row.len() != COLUMN_COUNT {
            return Err(RowError::FieldCount {
                expected: COLUMN_COUNT,
                found: row.len(),
            });
        }

        let date_str = row[0].as_ref();
        let date = parse_date(date_str).ok_or_else(|| RowError::InvalidDate {
            value: date_str.to_string(),
        })?;

        Ok(Self {
            date,
            precipitation: parse_measurement("precipitation", row[1].as_ref())?,
            temp_max: parse_measurement("temp_max", row[2].as_ref())?,
            temp_min: parse_measurement("temp_min", row[3].as_ref())?,
            wind: parse_measurement("wind", row[4].as_ref())?,
            weather: row[5].as_ref().to_string(),
        })
    }

    /// Date in its canonical `YYYY-MM-DD` form
    pub fn date_string(&self) -> String {
        self.date.format(DATE_FORMAT).to_string()
    }
}

fn parse_measurement(column: &'static str, value: &str) -> Result<f64, RowError> {
    let parsed = value
        .parse::<f64>()
        .map_err(|_| RowError::InvalidNumber {
            column,
            value: value.to_string(),
        })?;

    if !parsed.is_finite() {
        return Err(RowError::NonFiniteNumber {
            column,
            value: value.to_string(),
        });
    }

    Ok(parsed)
}

/// Parse a strict, zero-padded `YYYY-MM-DD` calendar date.
///
/// chrono alone accepts unpadded fields such as `2012-1-5`; those are refused
/// here so that only the canonical form matches.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let bytes = value.as_bytes();
    if bytes.len() != 10 || bytes[4] != b'-' || bytes[7] != b'-' {
        return None;
    }
    let digits_ok = bytes
        .iter()
        .enumerate()
        .all(|(i, b)| i == 4 || i == 7 || b.is_ascii_digit());
    if !digits_ok {
        return None;
    }

    NaiveDate::parse_from_str(value, DATE_FORMAT).ok()
}
