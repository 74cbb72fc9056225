//! OAuthBroker — multi-tenant OAuth integration broker.
//!
//! Server entry point: loads configuration, wires the concrete adapters
//! behind the core's ports, starts the monitoring eviction scheduler, and
//! serves the `axum` router.

use std::net::SocketAddr;
use std::sync::Arc;

use oauthbroker_core::{CallbackSecurityService, SecurityMonitoringService};
use oauthbroker_infra::{
    AesGcmSecretCipher, DbManager, MonitoringEvictionScheduler, ReqwestOAuthProtocolService,
    SqliteIntegrationStore, SqliteProviderCatalog,
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = oauthbroker_infra::config::load()?;
    tracing::info!("OAuthBroker starting...");

    let db = Arc::new(DbManager::new(
        &config.database.path,
        config.database.pool_size,
        config.encryption_key.as_deref(),
    )?);
    db.run_migrations()?;

    let repository = Arc::new(SqliteIntegrationStore::new(db.clone()));
    let catalog = Arc::new(SqliteProviderCatalog::new(db.clone()));
    let protocol = Arc::new(ReqwestOAuthProtocolService::new()?);
    let cipher = Arc::new(AesGcmSecretCipher::from_env()?);
    let security = Arc::new(CallbackSecurityService::new(config.broker.redirect_policy.clone()));
    let monitoring = Arc::new(SecurityMonitoringService::new(config.broker.monitoring.clone()));

    let mut scheduler = MonitoringEvictionScheduler::new(monitoring.clone()).await?;
    scheduler.start().await?;

    let state = oauthbroker_api::AppState {
        repository,
        catalog,
        protocol,
        cipher,
        security,
        monitoring,
        config: Arc::new(config.broker),
    };

    let app = oauthbroker_api::router::build(state);
    let addr: SocketAddr = std::env::var("OAUTHBROKER_LISTEN_ADDR")
        .unwrap_or_else(|_| "0.0.0.0:8080".to_string())
        .parse()?;

    tracing::info!(%addr, "OAuthBroker listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    scheduler.stop().await?;
    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("shutdown signal received");
}
