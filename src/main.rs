use std::sync::Arc;

use dotenvy::dotenv;
use tracing::info;

use crate::config::AppConfig;
use crate::logger::setup_logger;
use crate::remote::TelegramClient;
use crate::router::AppState;
use crate::services::{IngestService, ProbeService};
use crate::store::SqliteSignalStore;

mod config;
mod db;
mod error;
mod logger;
mod models;
mod parser;
mod remote;
mod repositories;
mod router;
mod services;
mod store;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    setup_logger();

    info!("System starting up...");
    dotenv().ok();
    let config = AppConfig::from_env();

    let pool = db::connect(&config.database_url).await?;
    info!("Signal store ready at {}", config.database_url);

    let store = Arc::new(SqliteSignalStore::new(pool));
    let telegram = TelegramClient::new(config.telegram_api_base.clone(), config.probe_timeout)?;

    let state = AppState {
        store: store.clone(),
        ingest: IngestService::new(store),
        probe: ProbeService::new(Arc::new(telegram)),
    };

    let app = router::build_router(state);
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    info!("Server listening on {}", config.bind_addr);
    axum::serve(listener, app).await?;

    Ok(())
}
