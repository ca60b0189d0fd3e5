use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;

use carebridge_server::{AppState, CarebridgeConfig, router, telemetry};
use carebridge_store::InMemoryStore;

#[derive(Parser)]
#[command(name = "carebridge", about = "Community healthcare resource listings")]
struct Args {
    /// Path to the TOML config file
    #[arg(short, long, default_value = "carebridge.toml", env = "CAREBRIDGE_CONFIG")]
    config: PathBuf,

    /// Override the bind address from the config file
    #[arg(long, env = "CAREBRIDGE_BIND")]
    bind: Option<String>,

    /// Emit logs as JSON lines
    #[arg(long)]
    json_logs: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = CarebridgeConfig::load(&args.config)?.with_env_overrides();
    if let Some(bind) = args.bind {
        config.bind = bind;
    }
    telemetry::init_tracing(args.json_logs || config.json_logs);

    let store = match &config.snapshot_path {
        Some(path) => Arc::new(InMemoryStore::open(path).await?),
        None => {
            tracing::warn!("no snapshot_path configured; listings are kept in memory only");
            Arc::new(InMemoryStore::new())
        }
    };

    let state = AppState::from_config(&config, store.clone())?;
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind)
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind))?;
    tracing::info!(bind = %config.bind, model = %config.gateway.model, "carebridge listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    store.flush().await.context("Failed to write final store snapshot")?;

    tracing::info!("shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
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
    tracing::info!("shutdown signal received");
}
