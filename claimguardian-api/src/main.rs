use anyhow::Context;
use claimguardian_api::{
    build_router, config::get_configuration, services::metrics::init_metrics, AppState,
};
use service_core::observability::init_tracing;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio::signal;

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Load configuration - fail fast if invalid
    let settings = get_configuration().context("Failed to load configuration")?;

    init_tracing(
        "claimguardian-api",
        &settings.telemetry.log_level,
        settings.telemetry.otlp_endpoint.as_deref(),
    );

    // Must run before any metric is recorded
    init_metrics()?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        environment = settings.server.environment.as_str(),
        "Starting ClaimGuardian API"
    );

    let addr: SocketAddr = format!("{}:{}", settings.server.host, settings.server.port)
        .parse()
        .context("Invalid server host/port")?;

    let state = AppState::from_settings(settings).await?;
    let app = build_router(state);

    let listener = TcpListener::bind(addr).await.map_err(|e| {
        tracing::error!("Failed to bind TCP listener to {}: {}", addr, e);
        e
    })?;
    tracing::info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}
