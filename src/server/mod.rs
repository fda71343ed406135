// Server module entry point
// Accept loop, per-connection tasks and graceful shutdown

pub mod connection;
pub mod listener;
pub mod signal;

pub use listener::create_listener;
pub use signal::shutdown_signal;

use hyper_util::server::graceful::GracefulShutdown;
use std::future::Future;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

use connection::accept_connection;
use crate::config::AppState;

/// Accept connections until `shutdown` resolves, then give open
/// connections the configured grace period to finish.
pub async fn serve<F>(listener: TcpListener, state: Arc<AppState>, shutdown: F)
where
    F: Future<Output = ()>,
{
    let graceful = GracefulShutdown::new();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => {
                        accept_connection(stream, peer_addr, &state, &graceful);
                    }
                    Err(e) => tracing::error!("Failed to accept connection: {e}"),
                }
            }

            () = &mut shutdown => break,
        }
    }

    // Stop accepting before draining
    drop(listener);

    let grace = Duration::from_secs(state.config.performance.shutdown_grace_period);
    tracing::info!(
        "Waiting up to {}s for {} open connection(s)",
        grace.as_secs(),
        state.active_connections.load(Ordering::SeqCst)
    );

    tokio::select! {
        () = graceful.shutdown() => tracing::info!("All connections closed"),
        () = tokio::time::sleep(grace) => tracing::warn!(
            "Grace period elapsed, dropping {} connection(s)",
            state.active_connections.load(Ordering::SeqCst)
        ),
    }
}
