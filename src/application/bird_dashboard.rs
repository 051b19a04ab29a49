// Bird observation dashboard
use crate::application::chart_shaper::{bar_series, observation_trend, pie_series};
use crate::application::metric_deriver::categorical_summary;
use crate::application::providers::{BirdObservationSource, FetchError};
use crate::application::session::DashboardKind;
use crate::domain::metrics::CategoricalSummary;
use crate::domain::observation::{BirdObservation, Snapshot};
use crate::domain::selection::BirdSelection;
use crate::domain::telemetry::{ChartData, ChartKind, TileData};
use async_trait::async_trait;
use std::sync::Arc;

#[derive(Clone)]
pub struct BirdDashboard {
    source: Arc<dyn BirdObservationSource>,
}

impl BirdDashboard {
    pub fn new(source: Arc<dyn BirdObservationSource>) -> Self {
        Self { source }
    }
}

#[async_trait]
impl DashboardKind for BirdDashboard {
    type Row = BirdObservation;
    type Selection = BirdSelection;
    type Metrics = CategoricalSummary;

    fn title(&self, selection: &BirdSelection) -> String {
        format!(
            "E-Bird USA: {} (last {} observations)",
            selection.region.label(),
            selection.max_results
        )
    }

    async fn fetch(&self, selection: &BirdSelection) -> Result<Snapshot<BirdObservation>, FetchError> {
        self.source
            .fetch_recent(&selection.region.code, selection.max_results)
            .await
    }

    fn derive(&self, snapshot: &Snapshot<BirdObservation>) -> CategoricalSummary {
        categorical_summary(snapshot)
    }

    fn tiles(&self, summary: &CategoricalSummary) -> Vec<TileData> {
        vec![
            TileData::new(
                "total-species",
                "Total Unique Species",
                Some(summary.unique_categories as f64),
                0,
            ),
            TileData::new("avg-count", "Average Count per Observation", Some(summary.mean), 2),
            TileData::new("max-count", "Max Count per Observation", Some(summary.max), 0),
            TileData::new("min-count", "Min Count per Observation", Some(summary.min), 0),
        ]
    }

    fn charts(
        &self,
        _selection: &BirdSelection,
        snapshot: &Snapshot<BirdObservation>,
        _summary: &CategoricalSummary,
    ) -> Vec<ChartData> {
        vec![
            ChartData::new(
                "bar-chart",
                "Bird Count by Species".to_string(),
                ChartKind::Bar,
                vec![bar_series(snapshot)],
            )
            .with_axes("Common Name of Birds", "Total Count"),
            ChartData::new(
                "pie-chart",
                "Bird Count Distribution by Species".to_string(),
                ChartKind::Pie,
                vec![pie_series(snapshot)],
            ),
            ChartData::new(
                "line-chart",
                "Trend of Bird Observations Over Time".to_string(),
                ChartKind::Line,
                vec![observation_trend(snapshot)],
            )
            .with_axes("Observation Date", "Count"),
        ]
    }
}
