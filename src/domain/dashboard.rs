// Dashboard domain model
use super::telemetry::{ChartData, TileData};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Everything the presentation layer needs to render one dashboard.
#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub title: String,
    pub status: String,
    pub captured_at: DateTime<Utc>,
    pub row_count: usize,
    pub tiles: Vec<TileData>,
    pub charts: Vec<ChartData>,
}

impl Dashboard {
    pub fn new(
        title: String,
        status: String,
        captured_at: DateTime<Utc>,
        row_count: usize,
        tiles: Vec<TileData>,
        charts: Vec<ChartData>,
    ) -> Self {
        Self {
            title,
            status,
            captured_at,
            row_count,
            tiles,
            charts,
        }
    }
}
