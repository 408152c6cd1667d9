//! HTTP request handlers for the stratus API.
//!
//! This module contains all the endpoint handlers for the web server.

pub mod heartbeat;
pub mod query;

pub use heartbeat::heartbeat_handler;
pub use query::query_handler;

use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use crate::logging::create_http_trace_layer;
use crate::state::AppState;

/// Build the application router over a loaded state
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/query", get(query_handler))
        .route("/heartbeat", get(heartbeat_handler))
        .layer(create_http_trace_layer())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
