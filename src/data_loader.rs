//! Dataset loading functionality.
//!
//! This module reads the delimited observation file and feeds its rows to a
//! [`StoreBuilder`]. Row-level problems are skipped by the builder; failing to
//! open or decode the file at all is fatal.

use csv::{ReaderBuilder, StringRecord, Trim};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info};

use crate::config::Config;
use crate::error::{Result, StratusError};
use crate::logging::{log_data_load_stats, log_operation_end};
use crate::state::AppState;
use crate::store::{LoadStats, Store, StoreBuilder};

/// Load an observation file into memory and create the application state
pub fn load_dataset(path: &Path, config: Config) -> Result<AppState> {
    let start_time = Instant::now();

    // Check if the file exists
    if !path.exists() {
        return Err(StratusError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("File not found: {}", path.display()),
        )));
    }

    let file = File::open(path)?;
    info!("Opened data file: {}", path.display());

    let (store, stats) = load_rows(file, config.delimiter_byte()?)?;

    log_data_load_stats(&path.display().to_string(), &stats, &store);
    log_operation_end("data_load", start_time, stats.rejected == 0);

    Ok(AppState::new(config, path.to_path_buf(), store, stats))
}

/// Decode delimited rows from any reader and build a store from them
pub fn load_rows<R: Read>(reader: R, delimiter: u8) -> Result<(Store, LoadStats)> {
    // The header is handed to the builder as an ordinary row; short and long
    // rows must reach the builder so they are counted as rejected.
    let mut csv_reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .delimiter(delimiter)
        .from_reader(reader);

    let mut builder = StoreBuilder::new();
    let mut row = StringRecord::new();

    while csv_reader.read_record(&mut row)? {
        let fields: Vec<&str> = row.iter().collect();
        builder.push_row(&fields);
    }

    let (store, stats) = builder.finish();
    debug!(
        records = store.len(),
        weather_labels = ?store.weather_counts(),
        "Rows decoded"
    );

    Ok((store, stats))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const SAMPLE: &str = "\
date,precipitation,temp_max,temp_min,wind,weather
2012-01-01,0.0,12.8,5.0,4.7,drizzle
2012-01-02,10.9,10.6,2.8,4.5,rain
2012-01-03,0.8,11.7,7.2,2.3,rain
2012-01-04,bad,5.6,2.8,4.7,rain
2012-01-05,1.3,8.9
2012-01-06,2.5,4.4,2.2,2.2,sun
";

    #[test]
    fn test_file_not_found() {
        let result = load_dataset(Path::new("does/not/exist.csv"), Config::default());
        assert!(matches!(result, Err(StratusError::Io(_))));
    }

    #[test]
    fn test_load_rows() -> Result<()> {
        let (store, stats) = load_rows(SAMPLE.as_bytes(), b',')?;

        assert_eq!(stats.accepted, 4);
        assert_eq!(stats.rejected, 2);
        assert_eq!(store.len(), 4);
        assert_eq!(store.by_weather("rain").count(), 2);

        let date = NaiveDate::from_ymd_opt(2012, 1, 2).unwrap();
        let record = store.get_by_date(date).unwrap();
        assert_eq!(record.precipitation, 10.9);
        assert_eq!(record.wind, 4.5);

        Ok(())
    }

    #[test]
    fn test_load_rows_custom_delimiter_and_whitespace() -> Result<()> {
        let data = "date;precipitation;temp_max;temp_min;wind;weather\n2012-01-01; 0.0 ;12.8;5.0;4.7; sun\n";
        let (store, stats) = load_rows(data.as_bytes(), b';')?;

        assert_eq!(stats.accepted, 1);
        assert_eq!(store.records()[0].weather, "sun");
        Ok(())
    }

    #[test]
    fn test_invalid_utf8_is_fatal() {
        let data: &[u8] = b"date,precipitation,temp_max,temp_min,wind,weather\n2012-01-01,0,1,0,1,\xff\xfe\n";
        assert!(matches!(load_rows(data, b','), Err(StratusError::Csv(_))));
    }

    #[test]
    fn test_load_dataset() -> Result<()> {
        let mut file = NamedTempFile::new()?;
        file.write_all(SAMPLE.as_bytes())?;

        let state = load_dataset(file.path(), Config::default())?;
        state.validate()?;

        assert_eq!(state.store.len(), 4);
        assert_eq!(state.load_stats.rejected, 2);
        assert_eq!(state.source, file.path());
        Ok(())
    }
}
