//! # stratus
//!
//! A small, in-memory, read-only query server for daily weather observations.
//!
//! A delimited observation file is loaded once at startup into an immutable
//! [`Store`] and served through a single `/query` endpoint.
//!
//! ## Architecture
//!
//! - **Data Layer**: decodes the file and builds the store with its date and
//!   weather indexes
//! - **Query Layer**: validates raw query strings into a [`QueryRequest`] and
//!   resolves them against the indexes
//! - **API Layer**: exposes the query engine over HTTP with JSON responses
//!
//! ```
//! use stratus::{Resolution, Store};
//!
//! let (store, _stats) = Store::from_rows([
//!     ["date", "precipitation", "temp_max", "temp_min", "wind", "weather"],
//!     ["2020-01-01", "0", "10", "5", "2", "rain"],
//!     ["2020-01-02", "0", "12", "6", "1", "sun"],
//! ]);
//!
//! let result = store.query("weather=rain&limit=1").unwrap();
//! assert_eq!(result.len(), 1);
//! assert_eq!(store.query("date=2020-01-03").unwrap(), Resolution::Empty);
//! ```

pub mod config;
pub mod data_loader;
pub mod error;
pub mod handlers;
pub mod logging;
pub mod query;
pub mod record;
pub mod resolver;
pub mod state;
pub mod store;

pub use config::Config;
pub use error::{Result, StratusError};
pub use logging::{
    create_http_trace_layer, generate_request_id, init_tracing, log_data_load_stats, log_error,
    log_operation_end, log_request_error,
};
pub use query::{DateFilter, QueryError, QueryRequest};
pub use record::{Record, RowError};
pub use resolver::Resolution;
pub use state::AppState;
pub use store::{DateSpan, LoadStats, Store, StoreBuilder};
