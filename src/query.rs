//! Query string parsing and validation.
//!
//! A raw query string is a list of `&`-separated tokens, each of the form
//! `key<op>value`. Values are taken verbatim; no URL decoding is performed.
//!
//! | token               | effect                                          |
//! |---------------------|-------------------------------------------------|
//! | `date=YYYY-MM-DD`   | exact date filter                               |
//! | `date<=YYYY-MM-DD`  | inclusive upper bound                           |
//! | `date>=YYYY-MM-DD`  | inclusive lower bound                           |
//! | `date<YYYY-MM-DD`   | exclusive upper bound, stored as the day before |
//! | `date>YYYY-MM-DD`   | exclusive lower bound, stored as the day after  |
//! | `weather=VALUE`     | weather category filter                         |
//! | `limit=N`           | caps the result count (N > 0)                   |
//!
//! Tokens are evaluated left to right and parsing stops at the first error.

use chrono::{Days, NaiveDate};
use serde::Serialize;
use std::fmt;
use thiserror::Error;

use crate::record::parse_date;

/// Comparison operator in a query token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Eq,
    Lt,
    Le,
    Gt,
    Ge,
}

impl Operator {
    fn as_str(self) -> &'static str {
        match self {
            Operator::Eq => "=",
            Operator::Lt => "<",
            Operator::Le => "<=",
            Operator::Gt => ">",
            Operator::Ge => ">=",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validation failures for a query string
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    #[error("Duplicate {param} parameter supplied, only 1 {param} parameter allowed")]
    DuplicateParameter { param: &'static str },

    #[error("Date range parameter supplied, when single date filter parameter already supplied")]
    RangeAfterSingleDate,

    #[error("Single date constraint supplied, when range date parameters already supplied")]
    SingleDateAfterRange,

    #[error("Invalid date parameter supplied: '{value}', parameter must be in format date{op}YYYY-MM-DD")]
    InvalidDate { op: &'static str, value: String },

    #[error("Invalid date parameter, valid operators for date parameter are =, <=, <, >=, >")]
    InvalidOperator,

    #[error("Invalid {param} parameter supplied, parameter must be in format {param}=value")]
    UnsupportedOperator { param: &'static str },

    #[error("Invalid weather parameter supplied, parameter must be in format weather=value")]
    InvalidWeather,

    #[error("Invalid limit parameter supplied: '{value}', parameter must be a positive and non-zero integer")]
    InvalidLimit { value: String },

    #[error("Unknown query parameter '{token}', supported parameters are date, weather and limit")]
    UnknownParameter { token: String },

    #[error("Query parameter '{token}' is not valid percent-encoded UTF-8")]
    InvalidEncoding { token: String },
}

/// The primary selector of a query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum DateFilter {
    /// No date constraint
    #[default]
    None,
    /// Exactly one calendar date
    Single { date: NaiveDate },
    /// Inclusive range; a missing side is open
    Range {
        lower: Option<NaiveDate>,
        upper: Option<NaiveDate>,
    },
}

/// Validated, structured form of a query string
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct QueryRequest {
    /// Date selector
    pub date: DateFilter,
    /// Weather category filter; applied alone or on top of a date selector
    pub weather: Option<String>,
    /// Maximum number of results; `None` is unbounded
    pub limit: Option<usize>,
}

impl QueryRequest {
    /// Parse and validate a raw, undecoded query string
    pub fn parse(raw: &str) -> Result<Self, QueryError> {
        Self::parse_tokens(raw.split('&'))
    }

    /// Parse and validate already split `key<op>value` tokens, left to right
    pub fn parse_tokens<'a, I>(tokens: I) -> Result<Self, QueryError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut request = Self::default();

        for token in tokens.into_iter().filter(|t| !t.is_empty()) {
            let (key, op, value) = split_token(token);
            match key {
                "date" => request.apply_date(op, value)?,
                "weather" => request.apply_weather(op, value)?,
                "limit" => request.apply_limit(op, value)?,
                _ => {
                    return Err(QueryError::UnknownParameter {
                        token: token.to_string(),
                    })
                }
            }
        }

        Ok(request)
    }

    /// Short name of the resolution mode this request selects
    pub fn mode(&self) -> &'static str {
        match (&self.date, &self.weather) {
            (DateFilter::Single { .. }, _) => "date",
            (DateFilter::Range { .. }, _) => "date_range",
            (DateFilter::None, Some(_)) => "weather",
            (DateFilter::None, None) => "all",
        }
    }

    fn apply_date(&mut self, op: Option<Operator>, value: &str) -> Result<(), QueryError> {
        let op = op.ok_or(QueryError::InvalidOperator)?;

        if op == Operator::Eq {
            return match self.date {
                DateFilter::Single { .. } => Err(QueryError::DuplicateParameter { param: "date" }),
                DateFilter::Range { .. } => Err(QueryError::SingleDateAfterRange),
                DateFilter::None => {
                    self.date = DateFilter::Single {
                        date: parse_date_value(op, value)?,
                    };
                    Ok(())
                }
            };
        }

        let (mut lower, mut upper) = match self.date {
            DateFilter::Single { .. } => return Err(QueryError::RangeAfterSingleDate),
            DateFilter::Range { lower, upper } => (lower, upper),
            DateFilter::None => (None, None),
        };

        let (slot, param) = match op {
            Operator::Le | Operator::Lt => (&mut upper, "date upper range"),
            _ => (&mut lower, "date lower range"),
        };
        if slot.is_some() {
            return Err(QueryError::DuplicateParameter { param });
        }

        let date = parse_date_value(op, value)?;
        let bound = match op {
            Operator::Lt => date.checked_sub_days(Days::new(1)),
            Operator::Gt => date.checked_add_days(Days::new(1)),
            _ => Some(date),
        };
        *slot = Some(bound.ok_or_else(|| QueryError::InvalidDate {
            op: op.as_str(),
            value: value.to_string(),
        })?);

        self.date = DateFilter::Range { lower, upper };
        Ok(())
    }

    fn apply_weather(&mut self, op: Option<Operator>, value: &str) -> Result<(), QueryError> {
        if self.weather.is_some() {
            return Err(QueryError::DuplicateParameter { param: "weather" });
        }
        if op != Some(Operator::Eq) {
            return Err(QueryError::UnsupportedOperator { param: "weather" });
        }
        if value.is_empty() {
            return Err(QueryError::InvalidWeather);
        }

        self.weather = Some(value.to_string());
        Ok(())
    }

    fn apply_limit(&mut self, op: Option<Operator>, value: &str) -> Result<(), QueryError> {
        if op != Some(Operator::Eq) {
            return Err(QueryError::UnsupportedOperator { param: "limit" });
        }
        if self.limit.is_some() {
            return Err(QueryError::DuplicateParameter { param: "limit" });
        }

        let limit = parse_integer_literal(value)
            .filter(|&n| n > 0)
            .and_then(|n| usize::try_from(n).ok())
            .ok_or_else(|| QueryError::InvalidLimit {
                value: value.to_string(),
            })?;

        self.limit = Some(limit);
        Ok(())
    }
}

fn parse_date_value(op: Operator, value: &str) -> Result<NaiveDate, QueryError> {
    parse_date(value).ok_or_else(|| QueryError::InvalidDate {
        op: op.as_str(),
        value: value.to_string(),
    })
}

/// Parse an integer literal with an optional base prefix.
///
/// Accepts `0x`/`0X` hex, `0o`/`0O` and leading-zero octal, `0b`/`0B` binary
/// and plain decimal, with an optional sign. Underscores may separate digits.
fn parse_integer_literal(value: &str) -> Option<i64> {
    let (negative, unsigned) = match value.as_bytes().first() {
        Some(b'-') => (true, &value[1..]),
        Some(b'+') => (false, &value[1..]),
        _ => (false, value),
    };

    let lower = unsigned.to_ascii_lowercase();
    let (radix, digits, prefixed) = if let Some(rest) = lower.strip_prefix("0x") {
        (16, rest, true)
    } else if let Some(rest) = lower.strip_prefix("0o") {
        (8, rest, true)
    } else if let Some(rest) = lower.strip_prefix("0b") {
        (2, rest, true)
    } else if lower.len() > 1 && lower.starts_with('0') {
        (8, &lower[1..], true)
    } else {
        (10, lower.as_str(), false)
    };

    if digits.contains("__") || digits.ends_with('_') || (!prefixed && digits.starts_with('_')) {
        return None;
    }
    let digits: String = digits.chars().filter(|&c| c != '_').collect();
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }

    let magnitude = i64::from_str_radix(&digits, radix).ok()?;
    Some(if negative { -magnitude } else { magnitude })
}

/// Split a token into key, operator and verbatim value.
///
/// The key ends at the first `=`, `<` or `>`. Two-character operators win
/// over their one-character prefixes.
fn split_token(token: &str) -> (&str, Option<Operator>, &str) {
    let Some(pos) = token.find(['=', '<', '>']) else {
        return (token, None, "");
    };

    let (key, rest) = token.split_at(pos);
    let (op, len) = if rest.starts_with("<=") {
        (Operator::Le, 2)
    } else if rest.starts_with(">=") {
        (Operator::Ge, 2)
    } else if rest.starts_with('<') {
        (Operator::Lt, 1)
    } else if rest.starts_with('>') {
        (Operator::Gt, 1)
    } else {
        (Operator::Eq, 1)
    };

    (key, Some(op), &rest[len..])
}
