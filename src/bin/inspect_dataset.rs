use std::error::Error;
use std::fs::File;
use std::path::PathBuf;

use stratus::data_loader::load_rows;

fn main() -> Result<(), Box<dyn Error>> {
    // Path to the observation file, defaulting to the bundled fixture
    let file_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("tests/fixtures/seattle-weather.csv"));

    println!("Inspecting data file: {}", file_path.display());

    let (store, stats) = load_rows(File::open(&file_path)?, b',')?;

    println!("\n=== LOAD SUMMARY ===");
    println!("  accepted rows:   {}", stats.accepted);
    println!("  rejected rows:   {}", stats.rejected);
    println!("  duplicate dates: {}", stats.duplicate_dates);

    match store.date_span() {
        Some(span) => println!("  date span:       {} to {}", span.min, span.max),
        None => println!("  date span:       (no records)"),
    }

    println!("\nWeather labels:");
    for (label, count) in store.weather_counts() {
        println!("  {:<12} {}", label, count);
    }

    println!("\nFirst records:");
    for record in store.records().iter().take(5) {
        println!(
            "  {} precip={} max={} min={} wind={} {}",
            record.date_string(),
            record.precipitation,
            record.temp_max,
            record.temp_min,
            record.wind,
            record.weather
        );
    }

    Ok(())
}
