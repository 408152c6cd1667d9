//! stratus - A small, in-memory, read-only query server for daily weather observations
//!
//! This is the main entry point for the stratus application.

use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info};

use stratus::data_loader::load_dataset;
use stratus::handlers::router;
use stratus::{init_tracing, log_error, Config, Result, StratusError};

fn main() -> Result<()> {
    // Load configuration
    let (config, data_path) = Config::load()?;

    init_tracing(&config.log_level);
    info!("Starting stratus v{}", env!("CARGO_PKG_VERSION"));

    // Validate configuration
    config.validate().map_err(|e| {
        error!("Invalid configuration: {}", e);
        e
    })?;

    info!("Loading data file: {:?}", data_path);

    // Load the dataset and create application state
    let app_state = load_dataset(&data_path, config.clone()).map_err(|e| {
        log_error(&e, "data_load");
        e
    })?;

    app_state.validate().map_err(|e| {
        error!("Invalid application state: {}", e);
        e
    })?;

    info!("Serving {} records", app_state.store.len());

    let mut runtime = tokio::runtime::Builder::new_multi_thread();
    runtime.enable_all();
    if let Some(workers) = config.server.workers {
        runtime.worker_threads(workers);
    }
    let runtime = runtime.build()?;

    runtime.block_on(serve(config, Arc::new(app_state)))
}

async fn serve(config: Config, state: Arc<stratus::AppState>) -> Result<()> {
    let app = router(state);

    // Create the server address
    let addr = SocketAddr::from((
        config
            .server
            .host
            .parse::<std::net::IpAddr>()
            .map_err(|e| StratusError::Config {
                message: format!("Invalid host address: {}", e),
            })?,
        config.server.port,
    ));

    info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| StratusError::Server {
            message: format!("Failed to bind to address: {}", e),
        })?;

    info!("Server is ready to accept connections");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| StratusError::Server {
            message: format!("Server error: {}", e),
        })?;

    info!("Server has been gracefully shut down");
    Ok(())
}

/// Wait for a shutdown signal
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, starting graceful shutdown");
        },
        _ = terminate => {
            info!("Received SIGTERM, starting graceful shutdown");
        },
    }
}
