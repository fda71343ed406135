mod config;
mod delivery;
mod handler;
mod http;
mod logger;
mod server;

use std::sync::Arc;
use thiserror::Error;

/// Startup failures
#[derive(Debug, Error)]
enum StartupError {
    #[error("configuration error: {0}")]
    Config(#[from] ::config::ConfigError),

    #[error("failed to initialize logging: {0}")]
    Logger(Box<dyn std::error::Error + Send + Sync>),

    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: std::net::SocketAddr,
        source: std::io::Error,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cfg = config::Config::load().map_err(StartupError::from)?;
    logger::init(&cfg.logging).map_err(StartupError::Logger)?;

    // Build the Tokio runtime with the configured worker thread count
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();

    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
    }

    let runtime = runtime_builder.build().map_err(StartupError::from)?;

    runtime.block_on(async_main(cfg))?;
    Ok(())
}

async fn async_main(cfg: config::Config) -> Result<(), StartupError> {
    let addr = cfg.get_socket_addr()?;
    let listener = server::create_listener(addr, cfg.performance.listen_backlog)
        .map_err(|source| StartupError::Bind { addr, source })?;

    logger::log_server_start(&addr, &cfg);

    let state = Arc::new(config::AppState::new(cfg));
    server::serve(listener, state, server::shutdown_signal()).await;

    tracing::info!("Server stopped");
    Ok(())
}
