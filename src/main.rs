//! Catalog Editor - local product catalog service

use anyhow::{Context, Result};
use catalog_editor::api::{router, AppState};
use catalog_editor::config::AppConfig;
use catalog_editor::storage::FileStorage;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;
    let storage = FileStorage::open(config.storage.data_dir.clone(), config.storage.quota_bytes)
        .with_context(|| format!("opening data directory {}", config.storage.data_dir.display()))?;
    tracing::info!(dir = %storage.dir().display(), quota = ?config.storage.quota_bytes, "storage ready");

    let app = router(AppState::new(Arc::new(storage)));
    let addr = config.server_address();
    tracing::info!("Catalog editor listening on {}", addr);
    axum::serve(tokio::net::TcpListener::bind(&addr).await?, app).await?;
    Ok(())
}
