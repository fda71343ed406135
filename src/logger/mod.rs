//! Logger module
//!
//! Provides logging utilities for the file delivery server including:
//! - `tracing` subscriber setup (stderr or a log file)
//! - Server lifecycle logging
//! - Access logging with multiple formats

mod format;

pub use format::AccessLogEntry;

use crate::config::{Config, LoggingConfig};
use std::fs::{File, OpenOptions};
use std::io;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

/// Target used for access log lines, filterable as `access=info`
pub const ACCESS_TARGET: &str = "access";

/// Initialize the global `tracing` subscriber
///
/// Should be called once at application startup. `RUST_LOG` takes precedence
/// over `logging.level`.
pub fn init(config: &LoggingConfig) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    match config.log_file.as_deref() {
        Some(path) => {
            let file = open_log_file(path)?;
            builder
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()?;
        }
        None => builder.with_writer(io::stderr).try_init()?,
    }
    Ok(())
}

/// Open or create a log file for appending
fn open_log_file(path: &str) -> io::Result<File> {
    // Create parent directories if they don't exist
    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    OpenOptions::new().create(true).append(true).open(path)
}

pub fn log_server_start(addr: &SocketAddr, config: &Config) {
    tracing::info!("File delivery server listening on http://{addr}");
    tracing::info!(
        root = %config.delivery.root,
        chunk_delay_ms = config.delivery.chunk_delay_ms,
        default_chunks = config.delivery.default_chunks,
        "Delivery settings"
    );
    if let Some(workers) = config.server.workers {
        tracing::info!("Worker threads: {workers}");
    }
    if let Some(max) = config.performance.max_connections {
        tracing::info!("Max connections: {max}");
    }
    if let Some(ref path) = config.logging.log_file {
        tracing::info!("Log file: {path}");
    }
}

pub fn log_connection_accepted(peer_addr: &SocketAddr) {
    tracing::debug!("Connection accepted from {peer_addr}");
}

pub fn log_connection_error(err: &impl std::fmt::Debug) {
    tracing::warn!("Failed to serve connection: {err:?}");
}

/// Log formatted access log entry
pub fn log_access(entry: &AccessLogEntry, format: &str) {
    tracing::info!(target: ACCESS_TARGET, "{}", entry.format(format));
}
