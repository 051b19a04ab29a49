// Application state for HTTP handlers
use crate::application::bird_dashboard::BirdDashboard;
use crate::application::session::DashboardSession;
use crate::application::stock_dashboard::StockDashboard;
use crate::domain::selection::{Choice, ResultsSlider};
use crate::infrastructure::config::AppConfig;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Dropdown and slider contents served to the page.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardOptions {
    pub regions: Vec<Choice>,
    pub default_region: Choice,
    pub results: ResultsSlider,
    pub symbols: Vec<Choice>,
    pub default_symbol: Choice,
    pub refresh_seconds: u64,
}

impl DashboardOptions {
    pub fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        Ok(Self {
            regions: config.ebird.regions.clone(),
            default_region: config.default_region()?,
            results: config.ebird.results,
            symbols: config.twelvedata.symbols.clone(),
            default_symbol: config.default_symbol()?,
            refresh_seconds: config.twelvedata.refresh_seconds,
        })
    }
}

/// Each session sits behind its own lock, so a refresh on one dashboard
/// never waits for the other.
#[derive(Clone)]
pub struct AppState {
    pub birds: Arc<Mutex<DashboardSession<BirdDashboard>>>,
    pub stocks: Arc<Mutex<DashboardSession<StockDashboard>>>,
    pub options: DashboardOptions,
}
