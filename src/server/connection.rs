// Connection handling module
// Accepts single TCP connections and serves them on their own task

use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use hyper_util::server::graceful::GracefulShutdown;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use crate::config::AppState;
use crate::handler;
use crate::logger;

/// Accept and process a connection, checking limits and logging.
///
/// # Arguments
///
/// * `stream` - The TCP stream to handle
/// * `peer_addr` - The peer's socket address
/// * `state` - Shared application state
/// * `graceful` - Tracks the connection so shutdown can wait for it
pub fn accept_connection(
    stream: tokio::net::TcpStream,
    peer_addr: std::net::SocketAddr,
    state: &Arc<AppState>,
    graceful: &GracefulShutdown,
) {
    // Increment counter first, then check limit (prevents race condition)
    let prev_count = state.active_connections.fetch_add(1, Ordering::SeqCst);

    if let Some(max_conn) = state.config.performance.max_connections {
        if prev_count >= usize::try_from(max_conn).unwrap_or(usize::MAX) {
            // Exceeded limit: rollback counter and reject
            state.active_connections.fetch_sub(1, Ordering::SeqCst);
            tracing::warn!(
                "Max connections reached: {prev_count}/{max_conn}. Connection from {peer_addr} rejected."
            );
            drop(stream);
            return;
        }
    }

    logger::log_connection_accepted(&peer_addr);
    handle_connection(stream, peer_addr, Arc::clone(state), graceful);
}

/// Handle a single connection in a spawned task.
///
/// No read or write timeout is applied: paced deliveries legitimately keep
/// a response open for as long as their delays add up to. When the client
/// goes away hyper drops the response body, which closes the file being
/// streamed.
fn handle_connection(
    stream: tokio::net::TcpStream,
    peer_addr: std::net::SocketAddr,
    state: Arc<AppState>,
    graceful: &GracefulShutdown,
) {
    let io = TokioIo::new(stream);

    let mut builder = http1::Builder::new();
    builder.keep_alive(state.config.performance.keep_alive);

    let service_state = Arc::clone(&state);
    let conn = builder.serve_connection(
        io,
        service_fn(move |req| {
            handler::handle_request(req, Arc::clone(&service_state), peer_addr)
        }),
    );
    let conn = graceful.watch(conn);

    tokio::spawn(async move {
        if let Err(err) = conn.await {
            logger::log_connection_error(&err);
        }
        state.active_connections.fetch_sub(1, Ordering::SeqCst);
    });
}
