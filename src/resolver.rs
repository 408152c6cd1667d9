//! Filter resolution against the store indexes.
//!
//! Modes are selected in priority order: single date, date range, weather
//! only, then everything. Every mode preserves its natural ordering (file
//! order, or ascending date for ranges) and honours the limit, except the
//! single-date mode which yields at most one record anyway.

use chrono::NaiveDate;

use crate::query::{DateFilter, QueryError, QueryRequest};
use crate::record::Record;
use crate::store::Store;

/// Outcome of a valid query
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution<'a> {
    /// At least one record matched
    Found(Vec<&'a Record>),
    /// The query was valid but nothing matched
    Empty,
}

impl<'a> Resolution<'a> {
    fn from_records(records: Vec<&'a Record>) -> Self {
        if records.is_empty() {
            Resolution::Empty
        } else {
            Resolution::Found(records)
        }
    }

    /// Matched records; empty for [`Resolution::Empty`]
    pub fn records(&self) -> &[&'a Record] {
        match self {
            Resolution::Found(records) => records,
            Resolution::Empty => &[],
        }
    }

    pub fn len(&self) -> usize {
        self.records().len()
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Resolution::Empty)
    }
}

impl Store {
    /// Parse a raw query string and resolve it
    pub fn query(&self, raw: &str) -> Result<Resolution<'_>, QueryError> {
        let request = QueryRequest::parse(raw)?;
        Ok(self.resolve(&request))
    }

    /// Resolve a validated request
    pub fn resolve(&self, request: &QueryRequest) -> Resolution<'_> {
        let weather = request.weather.as_deref();
        let limit = request.limit.unwrap_or(usize::MAX);

        let records: Vec<&Record> = match request.date {
            DateFilter::Single { date } => self
                .get_by_date(date)
                .filter(|record| matches_weather(record, weather))
                .into_iter()
                .collect(),
            DateFilter::Range { lower, upper } => self.resolve_range(lower, upper, weather, limit),
            DateFilter::None => match weather {
                Some(weather) => self.by_weather(weather).take(limit).collect(),
                None => self.records().iter().take(limit).collect(),
            },
        };

        Resolution::from_records(records)
    }

    /// Walk the clamped range one day at a time, consulting the date index
    fn resolve_range(
        &self,
        lower: Option<NaiveDate>,
        upper: Option<NaiveDate>,
        weather: Option<&str>,
        limit: usize,
    ) -> Vec<&Record> {
        let Some(span) = self.date_span() else {
            return Vec::new();
        };

        let start = lower.map_or(span.min, |lower| lower.max(span.min));
        let end = upper.map_or(span.max, |upper| upper.min(span.max));
        if start > end {
            return Vec::new();
        }

        start
            .iter_days()
            .take_while(|day| *day <= end)
            .filter_map(|day| self.get_by_date(day))
            .filter(|record| matches_weather(record, weather))
            .take(limit)
            .collect()
    }
}

fn matches_weather(record: &Record, weather: Option<&str>) -> bool {
    weather.map_or(true, |weather| record.weather == weather)
}
