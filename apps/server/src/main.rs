//! # Bistro Server
//!
//! Binary entry point: configuration, database, HTTP listener.

use std::net::SocketAddr;

use bistro_core::Catalog;
use bistro_db::{Database, DbConfig};
use bistro_server::{build_router, init_tracing, AppState, ServerConfig};
use tokio::net::TcpListener;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    info!("Starting Bistro server...");

    // Load configuration
    let config = ServerConfig::load()?;
    info!(
        port = config.port,
        db_path = %config.db_path.display(),
        tax_bps = config.tax_rate.bps(),
        delivery_fee_cents = config.delivery_fee.cents(),
        "Configuration loaded"
    );

    if let Some(dir) = config.db_path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)?;
    }

    // Connect to database (runs migrations)
    let db = Database::new(
        DbConfig::new(config.db_path.clone()).max_connections(config.db_max_connections),
    )
    .await?;
    info!("Database ready");

    let catalog = Catalog::builtin().with_default_locale(config.default_locale);
    let state = AppState::new(db.clone(), config.pricing_policy(), catalog);
    let app = build_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    db.close().await;
    info!("Server stopped");
    Ok(())
}

/// Graceful shutdown signal handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, starting graceful shutdown...");
}
