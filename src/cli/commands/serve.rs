use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tracing::{error, info};

use crate::config::{DashboardConfig, initialize_app_state};
use crate::router::create_router;

pub async fn serve(config: &DashboardConfig, bind_address: &str) -> Result<()> {
    serve_until(config, bind_address, shutdown_signal()).await
}

async fn serve_until<F>(config: &DashboardConfig, bind_address: &str, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let state = initialize_app_state(config)
        .await
        .context("Failed to initialize application state")?;
    let app = create_router(state);

    let listener = TcpListener::bind(bind_address)
        .await
        .with_context(|| format!("Failed to bind to address {}", bind_address))?;
    info!(
        preload = config.preload,
        "Dashboard running on http://{}, Swagger UI at /swagger-ui",
        listener.local_addr()?
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .context("Server error")?;

    info!("Server shutdown gracefully");
    Ok(())
}

/// Resolves on Ctrl+C. If the handler cannot be installed the server runs
/// until killed.
async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(e) => {
            error!("Failed to listen for shutdown signal: {}", e);
            std::future::pending::<()>().await;
        }
    }
}
