use anyhow::{Context, Result};
use axum::Router;
use chrono::Utc;
use std::{io::ErrorKind, sync::Arc};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

mod config;
mod errors;
mod handlers;
mod models;
mod routes;
mod services;
mod state;

use handlers::general_handlers::format_uptime_whole_seconds;

#[tokio::main]
async fn main() -> Result<()> {
    // --- Parse config ---
    let cfg = Arc::new(config::AppConfig::from_env_and_args()?);

    // --- Logging setup (RUST_LOG wins over LOG_LEVEL) ---
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&cfg.log_level))
        .with_context(|| format!("invalid log level `{}`", cfg.log_level))?;
    tracing_subscriber::fmt().with_env_filter(filter).init();

    tracing::info!("Starting picture service with config: {:?}", cfg);
    if !cfg.mongo.is_configured() {
        tracing::debug!("No metadata database configured; picture metadata is not persisted");
    }

    // --- Initialize storage backend (one instance shared by all requests) ---
    let storage = services::storage_service::build_storage_service(&cfg).await?;
    let pictures = services::picture_service::PictureService::new(storage);

    // --- Start listener ---
    let addr = cfg.addr();
    let listener = match TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(err)
            if err.kind() == ErrorKind::PermissionDenied
                && matches!(cfg.host.as_str(), "0.0.0.0" | "::") =>
        {
            let fallback_addr = format!("127.0.0.1:{}", cfg.port);
            tracing::warn!(
                "Permission denied binding to {} ({}). Falling back to {}",
                addr,
                err,
                fallback_addr
            );
            TcpListener::bind(&fallback_addr).await?
        }
        Err(err) => return Err(err.into()),
    };

    // --- Build router ---
    let started_at = Utc::now();
    let app_state = state::AppState::new(cfg.clone(), pictures).started(started_at);
    let app: Router = routes::routes::routes(cfg.max_upload_bytes).with_state(app_state);

    tracing::info!(
        "'{}' ({}) version '{}', API {}, listening on http://{} (started at {})",
        cfg.name,
        cfg.description,
        cfg.version,
        cfg.api_version,
        listener.local_addr()?,
        started_at
    );
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!(
        "'{}' shutting down. Total uptime: {}",
        cfg.name,
        format_uptime_whole_seconds(Some(started_at), Utc::now())
    );

    Ok(())
}

/// Resolve on Ctrl-C, or SIGTERM on Unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::warn!("Failed to listen for Ctrl-C: {}", err);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::warn!("Failed to listen for SIGTERM: {}", err);
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
}
