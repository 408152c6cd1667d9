//! The in-memory, read-only observation store.
//!
//! A `Store` holds every accepted record in file order together with two
//! indexes built at load time:
//!
//! - a date index mapping each calendar date to exactly one record (the first
//!   one seen for that date), and
//! - a weather index mapping each category label to its records in file order.
//!
//! The store also tracks the earliest and latest accepted dates, which bound
//! every date-range walk. Stores are built once through [`StoreBuilder`] and
//! never mutated afterwards.

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::HashMap;
use tracing::{debug, warn};

use crate::record::{Record, RowError};

/// Inclusive span of dates covered by the accepted records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateSpan {
    pub min: NaiveDate,
    pub max: NaiveDate,
}

impl DateSpan {
    fn include(span: Option<Self>, date: NaiveDate) -> Self {
        match span {
            None => Self {
                min: date,
                max: date,
            },
            Some(span) => Self {
                min: span.min.min(date),
                max: span.max.max(date),
            },
        }
    }
}

/// Counters reported when a load completes
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LoadStats {
    /// Rows turned into records
    pub accepted: usize,
    /// Rows skipped because they failed validation
    pub rejected: usize,
    /// Accepted rows whose date was already indexed
    pub duplicate_dates: usize,
}

/// Immutable, fully indexed dataset
#[derive(Debug, Clone, Default)]
pub struct Store {
    primary: Vec<Record>,
    by_date: HashMap<NaiveDate, usize>,
    by_weather: HashMap<String, Vec<usize>>,
    span: Option<DateSpan>,
}

impl Store {
    /// Build a store from raw rows; the first row is a header and is discarded
    pub fn from_rows<I, R, S>(rows: I) -> (Self, LoadStats)
    where
        I: IntoIterator<Item = R>,
        R: AsRef<[S]>,
        S: AsRef<str>,
    {
        let mut builder = StoreBuilder::new();
        for row in rows {
            builder.push_row(row.as_ref());
        }
        builder.finish()
    }

    /// All records in file order
    pub fn records(&self) -> &[Record] {
        &self.primary
    }

    /// Number of accepted records
    pub fn len(&self) -> usize {
        self.primary.len()
    }

    /// Whether the store holds no records
    pub fn is_empty(&self) -> bool {
        self.primary.is_empty()
    }

    /// Look up the record indexed for a date
    pub fn get_by_date(&self, date: NaiveDate) -> Option<&Record> {
        self.by_date.get(&date).map(|&idx| &self.primary[idx])
    }

    /// Records with the given weather label, in file order
    pub fn by_weather<'a>(&'a self, weather: &str) -> impl Iterator<Item = &'a Record> + 'a {
        self.by_weather
            .get(weather)
            .map(|indices| indices.as_slice())
            .unwrap_or_default()
            .iter()
            .map(move |&idx| &self.primary[idx])
    }

    /// Known weather labels with their record counts, sorted by label
    pub fn weather_counts(&self) -> Vec<(String, usize)> {
        let mut counts: Vec<(String, usize)> = self
            .by_weather
            .iter()
            .map(|(label, indices)| (label.clone(), indices.len()))
            .collect();
        counts.sort();
        counts
    }

    /// Earliest and latest accepted dates, if any records were accepted
    pub fn date_span(&self) -> Option<DateSpan> {
        self.span
    }
}

/// What happened to a row handed to [`StoreBuilder::push_row`]
#[derive(Debug, Clone, PartialEq)]
pub enum RowOutcome {
    /// The header row was consumed
    Header,
    /// The row became a record and was indexed by date
    Accepted,
    /// The row became a record but its date was already indexed
    DuplicateDate,
    /// The row failed validation and was skipped
    Rejected(RowError),
}

/// Single-pass builder turning dataset rows into a [`Store`]
#[derive(Debug, Default)]
pub struct StoreBuilder {
    store: Store,
    stats: LoadStats,
    line: usize,
}

impl StoreBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed the next row of the file. The first row fed is the header.
    pub fn push_row<S: AsRef<str>>(&mut self, row: &[S]) -> RowOutcome {
        let line = self.line;
        self.line += 1;

        if line == 0 {
            return RowOutcome::Header;
        }

        let record = match Record::from_row(row) {
            Ok(record) => record,
            Err(e) => {
                warn!(line = line, reason = %e, "Skipping invalid row");
                self.stats.rejected += 1;
                return RowOutcome::Rejected(e);
            }
        };

        self.stats.accepted += 1;
        Self::insert(&mut self.store, &mut self.stats, line, record)
    }

    fn insert(store: &mut Store, stats: &mut LoadStats, line: usize, record: Record) -> RowOutcome {
        let idx = store.primary.len();
        let date = record.date;

        store.span = Some(DateSpan::include(store.span, date));
        store
            .by_weather
            .entry(record.weather.clone())
            .or_default()
            .push(idx);
        store.primary.push(record);

        if let Some(&first) = store.by_date.get(&date) {
            warn!(
                line = line,
                date = %date,
                first_record = ?store.primary[first],
                "Duplicate date found, keeping first record in date index"
            );
            stats.duplicate_dates += 1;
            return RowOutcome::DuplicateDate;
        }

        store.by_date.insert(date, idx);
        RowOutcome::Accepted
    }

    /// Freeze the store and report the load counters
    pub fn finish(self) -> (Store, LoadStats) {
        debug!(
            rows = self.line,
            accepted = self.stats.accepted,
            rejected = self.stats.rejected,
            "Store build finished"
        );
        let mut store = self.store;
        store.primary.shrink_to_fit();
        (store, self.stats)
    }
}
