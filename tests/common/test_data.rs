//! Test data generation utilities.
//!
//! This module writes observation files with known contents for testing the
//! stratus server.

use std::io::Write;
use std::path::{Path, PathBuf};

/// Header row of every observation file
pub const HEADER: &str = "date,precipitation,temp_max,temp_min,wind,weather";

/// Path of the bundled January/February 2012 fixture
pub fn fixture_path() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/seattle-weather.csv")
}

/// Writes an observation file from the given data rows, prefixed by the header
pub fn write_observations(path: &Path, rows: &[&str]) -> std::io::Result<()> {
    let mut file = std::fs::File::create(path)?;
    writeln!(file, "{}", HEADER)?;
    for row in rows {
        writeln!(file, "{}", row)?;
    }
    Ok(())
}

/// A small file mixing valid rows, a duplicate date and malformed rows.
///
/// Accepted: 5 records (one of them a duplicate date), rejected: 2.
pub fn create_messy_observations(path: &Path) -> std::io::Result<()> {
    write_observations(
        path,
        &[
            "2020-01-01,0,10,5,2,rain",
            "2020-01-02,0,12,6,1,sun",
            "2020-01-02,3.1,9,4,2,fog",
            "2020-01-03,oops,9,4,2,rain",
            "2020-01-05,1.5,8,3,4,rain",
            "2020-01-06,0,7",
            "2020-01-07,0,11,2,3,sun",
        ],
    )
}
