//! Assertion utilities for testing.
//!
//! Helpers for checking the JSON arrays returned by `/query`.

use serde_json::Value;

/// Dates of a result array, in response order
pub fn result_dates(results: &Value) -> Vec<String> {
    results
        .as_array()
        .expect("Expected a JSON array of records")
        .iter()
        .map(|record| {
            record["date"]
                .as_str()
                .expect("Record without a date")
                .to_string()
        })
        .collect()
}

/// Assert that dates are strictly ascending (so also free of duplicates)
pub fn assert_strictly_ascending(dates: &[String]) {
    for pair in dates.windows(2) {
        assert!(
            pair[0] < pair[1],
            "Dates not strictly ascending: {} then {}",
            pair[0],
            pair[1]
        );
    }
}

/// Assert that every record in a result array carries the given weather label
pub fn assert_all_weather(results: &Value, weather: &str) {
    for record in results.as_array().expect("Expected a JSON array of records") {
        assert_eq!(
            record["weather"], weather,
            "Unexpected weather in record {}",
            record
        );
    }
}

/// Assert that every date lies inside the inclusive range
pub fn assert_dates_within(dates: &[String], lower: &str, upper: &str) {
    for date in dates {
        assert!(
            date.as_str() >= lower && date.as_str() <= upper,
            "Date {} outside [{}, {}]",
            date,
            lower,
            upper
        );
    }
}
