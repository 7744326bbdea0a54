// Finance Tracker - Web Server

use anyhow::Context;
use finance_tracker::api::{app_router, AppState};
use finance_tracker::logging::init_tracing;
use finance_tracker::{Config, TransactionStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    init_tracing("info", true);

    let store = TransactionStore::open(&config.db_path)
        .with_context(|| format!("Failed to open database at {}", config.db_path))?;
    tracing::info!(
        db_path = %config.db_path,
        transactions = store.count()?,
        "database ready"
    );

    let app = app_router(AppState::new(store), &config);

    let listener = tokio::net::TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", config.listen_addr))?;
    tracing::info!("Listening on {}", config.listen_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {}", e);
    }
    tracing::info!("shutting down");
}
