//! Application state management for stratus.
//!
//! This module defines the shared state that is passed to all handlers,
//! containing the loaded observation store and its load report.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::SystemTime;

use crate::config::Config;
use crate::error::{Result, StratusError};
use crate::store::{LoadStats, Store};

/// The main application state shared across all handlers
#[derive(Debug, Clone)]
pub struct AppState {
    /// Configuration
    pub config: Config,
    /// File the store was loaded from
    pub source: PathBuf,
    /// Indexed observations
    pub store: Store,
    /// Counters from the load
    pub load_stats: LoadStats,
    /// When the state was built, before the server starts accepting requests
    pub started_at: SystemTime,
}

impl AppState {
    /// Create a new AppState
    pub fn new(config: Config, source: PathBuf, store: Store, load_stats: LoadStats) -> Self {
        Self {
            config,
            source,
            store,
            load_stats,
            started_at: SystemTime::now(),
        }
    }

    /// Create a new AppState wrapped in an Arc for shared ownership
    pub fn new_shared(
        config: Config,
        source: PathBuf,
        store: Store,
        load_stats: LoadStats,
    ) -> Arc<Self> {
        Arc::new(Self::new(config, source, store, load_stats))
    }

    /// Validate that the application state is ready to serve queries
    pub fn validate(&self) -> Result<()> {
        if self.store.is_empty() {
            return Err(StratusError::DataNotFound {
                message: format!(
                    "No valid observations found in {} ({} rows rejected)",
                    self.source.display(),
                    self.load_stats.rejected
                ),
            });
        }

        Ok(())
    }
}
