//! Query endpoint handler.
//!
//! Returns the observations matching the filters in the query string as a
//! JSON array. Validation errors are reported as 400 and valid queries with no
//! matches as 404, both with a `{"message": ...}` body.

use axum::{
    extract::{RawQuery, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

use crate::logging::{generate_request_id, log_request_error};
use crate::query::{QueryError, QueryRequest};
use crate::resolver::Resolution;
use crate::state::AppState;

/// Message returned when a valid query matches nothing
pub const NO_RESULTS_MESSAGE: &str = "No results found";

/// Handle GET /query requests
pub async fn query_handler(
    State(state): State<Arc<AppState>>,
    RawQuery(raw): RawQuery,
) -> Response {
    let request_id = generate_request_id();
    let start_time = Instant::now();
    let raw = raw.unwrap_or_default();

    let request = match parse_raw_query(&raw) {
        Ok(request) => request,
        Err(error) => return handle_query_error(error, &request_id, &raw),
    };

    debug!(
        endpoint = "/query",
        request_id = %request_id,
        date = ?request.date,
        weather = ?request.weather,
        limit = ?request.limit,
        "Processing query"
    );

    let resolution = state.store.resolve(&request);
    let duration = start_time.elapsed();

    info!(
        endpoint = "/query",
        request_id = %request_id,
        mode = request.mode(),
        result_count = resolution.len(),
        duration_us = duration.as_micros() as u64,
        "Query resolved"
    );

    match resolution {
        Resolution::Found(records) => (StatusCode::OK, Json(records)).into_response(),
        Resolution::Empty => message_response(StatusCode::NOT_FOUND, NO_RESULTS_MESSAGE, &request_id),
    }
}

/// Split the raw query on `&` and percent-decode each token on its own.
///
/// HTTP clients encode `<` and `>`, so tokens arrive as e.g. `date%3E%3D...`.
/// Decoding after the split keeps an encoded `%26` inside a value.
fn parse_raw_query(raw: &str) -> Result<QueryRequest, QueryError> {
    let tokens = raw
        .split('&')
        .map(|token| {
            urlencoding::decode(token).map_err(|_| QueryError::InvalidEncoding {
                token: token.to_string(),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    QueryRequest::parse_tokens(tokens.iter().map(|token| &**token))
}

/// Handle error responses for invalid queries
fn handle_query_error(error: QueryError, request_id: &str, raw: &str) -> Response {
    log_request_error(&error, "/query", request_id, Some(raw));
    message_response(StatusCode::BAD_REQUEST, &error.to_string(), request_id)
}

fn message_response(status: StatusCode, message: &str, request_id: &str) -> Response {
    (
        status,
        Json(serde_json::json!({
            "message": message,
            "request_id": request_id
        })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::store::Store;
    use axum::body::to_bytes;
    use std::path::PathBuf;

    fn create_test_state() -> Arc<AppState> {
        let (store, stats) = Store::from_rows([
            ["date", "precipitation", "temp_max", "temp_min", "wind", "weather"],
            ["2020-01-01", "0", "10", "5", "2", "rain"],
            ["2020-01-02", "0", "12", "6", "1", "sun"],
        ]);
        AppState::new_shared(Config::default(), PathBuf::from("test.csv"), store, stats)
    }

    async fn call(raw: Option<&str>) -> (StatusCode, serde_json::Value) {
        let response =
            query_handler(State(create_test_state()), RawQuery(raw.map(str::to_string))).await;
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn test_all_records() {
        let (status, json) = call(None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json.as_array().unwrap().len(), 2);
        assert_eq!(json[0]["date"], "2020-01-01");
        assert_eq!(json[1]["weather"], "sun");
    }

    #[tokio::test]
    async fn test_not_found() {
        let (status, json) = call(Some("date=2020-01-03")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["message"], NO_RESULTS_MESSAGE);
        assert!(json["request_id"].is_string());
    }

    #[tokio::test]
    async fn test_bad_request() {
        let (status, json) = call(Some("limit=0")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json["message"]
            .as_str()
            .unwrap()
            .contains("positive and non-zero integer"));
    }

    #[tokio::test]
    async fn test_encoded_operators_are_decoded() {
        let (status, json) = call(Some("date%3E%3D2020-01-02")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json.as_array().unwrap().len(), 1);
        assert_eq!(json[0]["date"], "2020-01-02");

        let (status, json) = call(Some("date%3E2020-01-01&date%3C2020-01-02")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["message"], NO_RESULTS_MESSAGE);
    }

    #[test]
    fn test_encoded_ampersand_stays_in_value() {
        let request = parse_raw_query("weather=rain%26sun&limit=1").unwrap();
        assert_eq!(request.weather.as_deref(), Some("rain&sun"));
        assert_eq!(
            parse_raw_query("weather=%FF").unwrap_err(),
            QueryError::InvalidEncoding {
                token: "weather=%FF".to_string()
            }
        );
    }
}
