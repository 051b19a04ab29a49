// Main entry point - Dependency injection and server setup
mod application;
mod domain;
mod infrastructure;
mod presentation;

use std::{net::SocketAddr, sync::Arc, time::Duration};

use anyhow::Context;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::sync::Mutex;
use tracing_subscriber::EnvFilter;

use crate::application::bird_dashboard::BirdDashboard;
use crate::application::refresh_ticker::spawn_refresh_ticker;
use crate::application::session::DashboardSession;
use crate::application::snapshot_store::{InMemorySnapshotStore, SnapshotStore};
use crate::application::stock_dashboard::StockDashboard;
use crate::domain::selection::{BirdSelection, StockSelection};
use crate::infrastructure::config::{SnapshotMode, SnapshotSettings, load_app_config};
use crate::infrastructure::csv_snapshot_store::CsvSnapshotStore;
use crate::infrastructure::ebird_client::EbirdClient;
use crate::infrastructure::twelvedata_client::TwelveDataClient;
use crate::presentation::app_state::{AppState, DashboardOptions};
use crate::presentation::routes::router;

fn snapshot_store<R>(settings: &SnapshotSettings) -> Arc<dyn SnapshotStore<R>>
where
    R: Serialize + DeserializeOwned + Clone + Send + Sync + 'static,
{
    match settings.mode {
        SnapshotMode::File => Arc::new(CsvSnapshotStore::new(&settings.path)),
        SnapshotMode::Memory => Arc::new(InMemorySnapshotStore::new()),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Load configuration
    let config = load_app_config("config/dashboards").context("failed to load dashboard configuration")?;
    let options = DashboardOptions::from_config(&config)?;

    // Create providers (infrastructure layer)
    let http_client = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.http.timeout_seconds))
        .build()?;
    let birds = Arc::new(EbirdClient::new(http_client.clone(), &config.ebird));
    let prices = Arc::new(TwelveDataClient::new(http_client, &config.twelvedata));

    // Create sessions (application layer)
    let bird_session = DashboardSession::new(
        BirdDashboard::new(birds),
        snapshot_store(&config.ebird.snapshot),
        BirdSelection {
            region: options.default_region.clone(),
            max_results: options.results.default,
        },
    );
    let stock_session = DashboardSession::new(
        StockDashboard::new(prices, config.twelvedata.windows),
        snapshot_store(&config.twelvedata.snapshot),
        StockSelection {
            symbol: options.default_symbol.clone(),
        },
    );

    let state = AppState {
        birds: Arc::new(Mutex::new(bird_session)),
        stocks: Arc::new(Mutex::new(stock_session)),
        options,
    };

    let _ticker = spawn_refresh_ticker(
        state.stocks.clone(),
        Duration::from_secs(config.twelvedata.refresh_seconds),
    );

    // Build router (presentation layer)
    let app = router(Arc::new(state));

    // Start server
    let addr: SocketAddr = config
        .server
        .bind
        .parse()
        .with_context(|| format!("invalid bind address {}", config.server.bind))?;
    tracing::info!("Starting observation dashboards on {}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, app).await?;

    Ok(())
}
