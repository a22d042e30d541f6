//! # icv6d: ICV6 lighting daemon
//!
//! Composition root that wires all adapters together and starts the server.
//!
//! ## Responsibilities
//! - Parse configuration (env vars, config file)
//! - Initialize the `SQLite` connection pool and run migrations
//! - Construct repository implementations and the TCP controller (adapters)
//! - Construct application services, injecting adapters via port traits
//! - Start the reconciliation loop when configured to
//! - Build the axum router, bind to a TCP port and serve
//! - Handle graceful shutdown (SIGTERM/SIGINT), stopping the loop last
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer; no domain logic belongs here.

mod config;

use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use icv6_adapter_http_axum::router;
use icv6_adapter_http_axum::state::AppState;
use icv6_adapter_storage_sqlite_sqlx::{
    SqliteActiveTargetRepository, SqlitePollingConfigRepository, SqlitePresetRepository,
    SqliteReconciliationLog,
};
use icv6_adapter_wire_tcp::TcpController;
use icv6_app::engine::ReconciliationEngine;
use icv6_app::reconciler::Reconciler;
use icv6_app::services::device_service::DeviceService;
use icv6_app::services::preset_service::PresetService;
use icv6_app::services::reconciliation_service::ReconciliationService;

use crate::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load().context("failed to load configuration")?;
    init_tracing(&config.logging.filter);

    // Database
    let db = icv6_adapter_storage_sqlite_sqlx::Config {
        database_url: config.database_url().to_string(),
    }
    .build()
    .await
    .context("failed to initialise database")?;
    let pool = db.pool().clone();

    // Repositories
    let targets = SqliteActiveTargetRepository::new(pool.clone());
    let log = SqliteReconciliationLog::new(pool.clone());
    let polling =
        SqlitePollingConfigRepository::new(pool.clone(), config.reconciliation.defaults());
    let presets = SqlitePresetRepository::new(pool);

    // Device
    let controller =
        TcpController::from_config(&config.device).context("invalid device configuration")?;
    tracing::info!(addr = controller.addr(), "lighting controller configured");

    // Services
    let device_service = Arc::new(DeviceService::new(controller.clone(), targets.clone()));
    let preset_service = PresetService::new(presets, Arc::clone(&device_service));
    let engine = Arc::new(ReconciliationEngine::new(
        Reconciler::new(controller, targets, log),
        polling,
    ));
    if config.reconciliation.autostart {
        engine.start().await;
    }
    let reconciliation_service = ReconciliationService::new(Arc::clone(&engine));

    // HTTP
    let app = router::build(AppState::new(
        device_service,
        reconciliation_service,
        preset_service,
    ));

    let bind_addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {bind_addr}"))?;
    tracing::info!(%bind_addr, "icv6d listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("http server failed")?;

    engine.stop().await;
    db.close().await;
    tracing::info!("icv6d stopped");

    Ok(())
}

fn init_tracing(filter: &str) {
    let filter = EnvFilter::try_new(filter).unwrap_or_else(|err| {
        eprintln!("invalid log filter {filter:?} ({err}), falling back to info");
        EnvFilter::new("info")
    });
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Resolve on SIGINT or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
    tracing::info!("shutdown signal received, draining requests");
}
