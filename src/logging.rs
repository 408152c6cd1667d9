//! Logging utilities for the stratus server.
//!
//! This module provides structured logging functionality to make logs more
//! searchable, analyzable, and useful for production deployments.

use std::time::Instant;
use tracing::{error, info, warn, Level};

use tower_http::trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tower_http::LatencyUnit;
use uuid::Uuid;

use crate::store::{LoadStats, Store};

/// Creates the tracing layer for HTTP request/response logging
pub fn create_http_trace_layer() -> TraceLayer<
    tower_http::classify::SharedClassifier<tower_http::classify::ServerErrorsAsFailures>,
    DefaultMakeSpan,
    DefaultOnRequest,
    DefaultOnResponse,
> {
    let response_formatter = DefaultOnResponse::new()
        .level(Level::DEBUG)
        .latency_unit(LatencyUnit::Micros);

    TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_request(DefaultOnRequest::new().level(Level::DEBUG))
        .on_response(response_formatter)
}

/// Initialize the tracing subscriber with the given log level
pub fn init_tracing(log_level: &str) {
    let filter = match std::env::var("RUST_LOG") {
        Ok(val) => val,
        Err(_) => log_level.to_string(),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .init();
}

/// Log the completion of a significant operation
pub fn log_operation_end(operation: &str, start_time: Instant, success: bool) {
    let duration_ms = start_time.elapsed().as_secs_f64() * 1000.0;

    if success {
        info!(
            operation = operation,
            duration_ms = duration_ms,
            "Operation completed successfully"
        );
    } else {
        warn!(
            operation = operation,
            duration_ms = duration_ms,
            "Operation completed with warnings"
        );
    }
}

/// Log detailed information about the data loaded
pub fn log_data_load_stats(file_path: &str, stats: &LoadStats, store: &Store) {
    let span = store
        .date_span()
        .map(|span| format!("{}..={}", span.min, span.max))
        .unwrap_or_else(|| "none".to_string());

    info!(
        operation = "data_load",
        file_path = file_path,
        accepted = stats.accepted,
        rejected = stats.rejected,
        duplicate_dates = stats.duplicate_dates,
        weather_count = store.weather_counts().len(),
        date_span = %span,
        "Backing store initialized"
    );
}

/// Log an error with context
pub fn log_error(error: &crate::error::StratusError, context: &str) {
    error!(
        error = %error,
        context = context,
        "Error occurred"
    );
}

/// Log an error that occurred during request processing
pub fn log_request_error(
    error: &dyn std::error::Error,
    endpoint: &str,
    request_id: &str,
    params: Option<&str>,
) {
    warn!(
        error = %error,
        endpoint = endpoint,
        request_id = request_id,
        params = params.unwrap_or("none"),
        "Request processing error"
    );
}

/// Generate a unique request ID
pub fn generate_request_id() -> String {
    Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_request_id() {
        let id1 = generate_request_id();
        let id2 = generate_request_id();

        assert!(!id1.is_empty());
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_log_helpers_do_not_panic() {
        let (store, stats) = Store::from_rows([
            ["date", "precipitation", "temp_max", "temp_min", "wind", "weather"],
            ["2012-01-01", "0", "1", "0", "1", "sun"],
        ]);
        log_data_load_stats("memory", &stats, &store);
        log_data_load_stats("empty", &LoadStats::default(), &Store::default());
        log_operation_end("test_operation", Instant::now(), true);

        let error = crate::query::QueryError::InvalidOperator;
        log_request_error(&error, "/query", &generate_request_id(), Some("date"));
    }
}
