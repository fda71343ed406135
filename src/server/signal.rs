// Signal handling module
//
// Supported signals:
// - SIGTERM: Graceful shutdown
// - SIGINT:  Graceful shutdown (Ctrl+C)

/// Resolves once the process is asked to stop
///
/// | Signal  | Action        |
/// |---------|---------------|
/// | SIGTERM | Graceful stop |
/// | SIGINT  | Graceful stop |
#[cfg(unix)]
pub async fn shutdown_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigterm = match signal(SignalKind::terminate()) {
        Ok(s) => Some(s),
        Err(e) => {
            tracing::error!("Failed to register SIGTERM handler: {e}");
            None
        }
    };

    let terminate = async {
        match sigterm.as_mut() {
            Some(s) => {
                s.recv().await;
            }
            None => std::future::pending::<()>().await,
        }
    };

    tokio::select! {
        () = terminate => tracing::info!("SIGTERM received, initiating graceful shutdown"),
        () = ctrl_c() => tracing::info!("SIGINT received, initiating graceful shutdown"),
    }
}

/// Windows fallback - only handles Ctrl+C
#[cfg(not(unix))]
pub async fn shutdown_signal() {
    ctrl_c().await;
    tracing::info!("Ctrl+C received, initiating graceful shutdown");
}

async fn ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl+C: {e}");
        std::future::pending::<()>().await;
    }
}
