//! Quokka API server entry point.
//!
//! Loads configuration from the environment, initialises tracing, opens the
//! `PostgreSQL` pool, registers provisioning plugins once, and serves the
//! project API until SIGINT or SIGTERM. On shutdown the server stops
//! accepting requests, then waits for in-flight provisioning to finish or
//! hit its deadline.

use std::sync::Arc;

use anyhow::{Context, Result};
use diesel::pg::PgConnection;
use diesel::r2d2::{ConnectionManager, Pool};
use mockable::DefaultClock;
use quokka::{
    config::AppConfig,
    http::{AppState, router},
    plugin::{adapters::ProxmoxCliPlugin, services::PluginRegistry},
    project::{
        adapters::postgres::{PostgresProjectRepository, ProjectPgPool},
        services::ProjectService,
    },
    telemetry::init_tracing,
};

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::from_env().context("failed to load configuration")?;
    init_tracing(config.effective_log_level(), config.log_format())?;
    let policy = config.provisioning_policy();
    tracing::info!(
        listen_addr = %config.listen_addr(),
        provisioning_plugin = policy.plugin(),
        "quokka-api starting"
    );

    let pool = connect(&config).await?;

    let registry = Arc::new(PluginRegistry::new());
    let proxmox = ProxmoxCliPlugin::new(config.proxmox_cli_path())
        .context("failed to build proxmox plugin")?;
    registry
        .register(Arc::new(proxmox))
        .context("failed to register proxmox plugin")?;

    let service = Arc::new(
        ProjectService::new(
            Arc::new(PostgresProjectRepository::new(pool)),
            Arc::clone(&registry),
            Arc::new(DefaultClock),
        )
        .with_provisioning_policy(policy),
    );
    let app = router(AppState::new(Arc::clone(&service)));

    let listener = tokio::net::TcpListener::bind(config.listen_addr())
        .await
        .context("failed to bind TCP listener")?;
    tracing::info!(listen_addr = %config.listen_addr(), "server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    tracing::info!("waiting for in-flight provisioning");
    service.drain_provisioning().await;
    tracing::info!("quokka-api stopped");
    Ok(())
}

/// Builds the connection pool off the async runtime; r2d2 opens the idle
/// connections eagerly.
async fn connect(config: &AppConfig) -> Result<ProjectPgPool> {
    let manager = ConnectionManager::<PgConnection>::new(config.database_url()?);
    let max_size = config.database_max_connections();
    let min_idle = config.database_min_idle();
    tokio::task::spawn_blocking(move || {
        Pool::builder()
            .max_size(max_size)
            .min_idle(Some(min_idle))
            .build(manager)
    })
    .await
    .context("database pool task failed")?
    .context("failed to create database pool")
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
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
        () = ctrl_c => {}
        () = terminate => {}
    }
    tracing::info!("received shutdown signal");
}
