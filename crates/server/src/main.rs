//! quizvault server binary.

use anyhow::{Context, Result};
use clap::Parser;
use figment::Figment;
use figment::providers::{Env, Format, Toml};
use quizvault_core::SystemClock;
use quizvault_core::config::AppConfig;
use quizvault_server::{AppState, create_router};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// quizvault - quiz archive artifact storage
#[derive(Parser, Debug)]
#[command(name = "quizvaultd")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(
        short,
        long,
        env = "QUIZVAULT_CONFIG",
        default_value = "config/server.toml"
    )]
    config: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("quizvault v{}", env!("CARGO_PKG_VERSION"));

    // The file is optional; QUIZVAULT_ env vars override or replace it
    let config_path = std::path::Path::new(&args.config);
    let mut figment = Figment::new();
    if config_path.exists() {
        tracing::info!(config_path = %args.config, "Loading configuration from file");
        figment = figment.merge(Toml::file(&args.config));
    } else {
        tracing::info!(
            config_path = %args.config,
            "No config file found, using defaults and environment"
        );
    }

    let config: AppConfig = figment
        .merge(Env::prefixed("QUIZVAULT_").split("__"))
        .extract()
        .context("failed to load configuration")?;
    config
        .validate()
        .map_err(anyhow::Error::msg)
        .context("invalid configuration")?;

    let storage = quizvault_storage::from_config(&config.storage)
        .await
        .context("failed to initialize storage")?;
    storage
        .health_check()
        .await
        .context("storage health check failed")?;
    tracing::info!(backend = storage.backend_name(), "Storage backend initialized");

    let metadata = quizvault_metadata::from_config(&config.metadata)
        .await
        .context("failed to initialize metadata store")?;
    tracing::info!("Metadata store initialized");

    let state = AppState::new(config.clone(), storage, metadata, Arc::new(SystemClock));

    if config.server.metrics_enabled {
        quizvault_server::metrics::register_metrics();
        tracing::info!("Prometheus metrics registered");
    }

    if config.janitor.enabled {
        let janitor = state.janitor.clone();
        let interval = config.janitor.interval();
        tokio::spawn(async move {
            tracing::info!(
                interval_secs = interval.as_secs(),
                "Temp file janitor scheduled"
            );
            let mut ticker = tokio::time::interval(interval);
            // The first tick completes immediately; skip it so startup stays quick
            ticker.tick().await;
            loop {
                ticker.tick().await;
                if let Err(e) = janitor.sweep().await {
                    tracing::error!(error = %e, "Scheduled temp file sweep failed");
                }
            }
        });
    } else {
        tracing::info!("Scheduled temp file janitor disabled");
    }

    let app = create_router(state);

    let addr: SocketAddr = config.server.bind.parse().context("invalid bind address")?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind to {}", addr))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
