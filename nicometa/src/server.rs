use std::future::Future;

use anyhow::{Context, Result};
use tracing::{error, info};

use nicometa_api::{create_router, AppState};

/// Bind `address` and serve the API with graceful shutdown
pub async fn serve(address: &str, state: AppState) -> Result<()> {
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(address)
        .await
        .with_context(|| format!("Failed to bind HTTP address {address}"))?;
    info!("HTTP server listening on {}", address);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    info!("HTTP server shut down gracefully");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = on_signal("Ctrl+C", tokio::signal::ctrl_c());

    #[cfg(unix)]
    let terminate = on_signal("SIGTERM", async {
        let mut signal =
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())?;
        signal.recv().await;
        Ok(())
    });

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!("Shutdown signal received, starting graceful shutdown...");
}

/// Resolves when `signal` fires. A handler that failed to install never
/// resolves, so it cannot trigger a shutdown on its own.
async fn on_signal<F>(name: &str, signal: F)
where
    F: Future<Output = std::io::Result<()>>,
{
    match signal.await {
        Ok(()) => info!("Received {} signal", name),
        Err(e) => {
            error!("Failed to install {} handler: {}", name, e);
            std::future::pending::<()>().await;
        }
    }
}
