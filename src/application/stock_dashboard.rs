// Stock market dashboard
use crate::application::chart_shaper::{price_series, return_series, volatility_series};
use crate::application::metric_deriver::price_metrics;
use crate::application::providers::{FetchError, PriceHistorySource};
use crate::application::session::DashboardKind;
use crate::domain::metrics::{PriceMetrics, WindowConfig};
use crate::domain::observation::{PriceBar, Snapshot};
use crate::domain::selection::StockSelection;
use crate::domain::telemetry::{ChartData, ChartKind, TileData};
use async_trait::async_trait;
use std::sync::Arc;

#[derive(Clone)]
pub struct StockDashboard {
    source: Arc<dyn PriceHistorySource>,
    windows: WindowConfig,
}

impl StockDashboard {
    pub fn new(source: Arc<dyn PriceHistorySource>, windows: WindowConfig) -> Self {
        Self { source, windows }
    }
}

#[async_trait]
impl DashboardKind for StockDashboard {
    type Row = PriceBar;
    type Selection = StockSelection;
    type Metrics = PriceMetrics;

    fn title(&self, selection: &StockSelection) -> String {
        format!("Stock Market Dashboard: {}", selection.symbol.label())
    }

    async fn fetch(&self, selection: &StockSelection) -> Result<Snapshot<PriceBar>, FetchError> {
        self.source.fetch_daily(&selection.symbol.code).await
    }

    fn derive(&self, snapshot: &Snapshot<PriceBar>) -> PriceMetrics {
        price_metrics(snapshot, &self.windows)
    }

    fn tiles(&self, metrics: &PriceMetrics) -> Vec<TileData> {
        vec![
            TileData::new("last-close", "Last Close (USD)", metrics.last_close(), 2),
            TileData::new(
                "last-return",
                "Daily Return (%)",
                metrics.last_return().map(|r| r * 100.0),
                2,
            ),
            TileData::new(
                "volatility",
                &format!("{}-Day Volatility", self.windows.volatility),
                metrics.last_volatility(),
                4,
            ),
        ]
    }

    fn charts(
        &self,
        selection: &StockSelection,
        _snapshot: &Snapshot<PriceBar>,
        metrics: &PriceMetrics,
    ) -> Vec<ChartData> {
        let symbol = &selection.symbol.code;
        let short_label = format!("{}-Day MA", self.windows.short_ma);
        let long_label = format!("{}-Day MA", self.windows.long_ma);

        vec![
            ChartData::new(
                "stock-price-chart",
                format!("{} Stock Price Trends", symbol),
                ChartKind::Line,
                price_series(metrics, &short_label, &long_label),
            )
            .with_axes("Date", "Stock Price (USD)"),
            ChartData::new(
                "daily-return-chart",
                format!("{} Daily Returns", symbol),
                ChartKind::Bar,
                vec![return_series(metrics)],
            )
            .with_axes("Date", "Return"),
            ChartData::new(
                "volatility-chart",
                format!("{} Volatility", symbol),
                ChartKind::Line,
                vec![volatility_series(metrics)],
            )
            .with_axes("Date", "Volatility"),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::session::DashboardSession;
    use crate::application::snapshot_store::InMemorySnapshotStore;
    use crate::domain::selection::Choice;
    use chrono::{Duration, NaiveDate};

    struct FixedPrices(Result<Vec<f64>, FetchError>);

    #[async_trait]
    impl PriceHistorySource for FixedPrices {
        async fn fetch_daily(&self, symbol: &str) -> Result<Snapshot<PriceBar>, FetchError> {
            let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
            let closes = self.0.clone()?;
            Ok(Snapshot::new(
                closes
                    .into_iter()
                    .enumerate()
                    .map(|(i, close)| PriceBar {
                        symbol: symbol.to_string(),
                        date: start + Duration::days(i as i64),
                        open: close,
                        high: close,
                        low: close,
                        close,
                        volume: None,
                    })
                    .collect(),
            ))
        }
    }

    fn selection() -> StockSelection {
        StockSelection {
            symbol: Choice::new("AAPL", "Apple"),
        }
    }

    fn session(result: Result<Vec<f64>, FetchError>) -> DashboardSession<StockDashboard> {
        DashboardSession::new(
            StockDashboard::new(Arc::new(FixedPrices(result)), WindowConfig::default()),
            Arc::new(InMemorySnapshotStore::new()),
            selection(),
        )
    }

    #[tokio::test]
    async fn test_stock_dashboard_charts() {
        let closes: Vec<f64> = (0..60).map(|i| 100.0 + i as f64).collect();
        let mut session = session(Ok(closes));
        let view = session.refresh(selection()).await;

        assert_eq!(view.charts.len(), 3);
        let price = &view.charts[0];
        assert_eq!(price.title, "AAPL Stock Price Trends");
        assert_eq!(price.series[1].name, "50-Day MA");
        assert_eq!(price.series[1].points.iter().filter(|p| p.y.is_some()).count(), 11);
        assert!(price.series[2].points.iter().all(|p| p.y.is_none()));
        assert_eq!(price.series[0].points[0].x, "2024-01-01");

        assert_eq!(view.tiles[0].text, "Last Close (USD): 159.00");
        assert_eq!(view.tiles[2].title, "20-Day Volatility");
    }

    #[tokio::test]
    async fn test_stock_dashboard_provider_error() {
        let mut session = session(Err(FetchError::ProviderError(429)));
        let view = session.refresh(selection()).await;

        assert_eq!(view.row_count, 0);
        assert_eq!(view.tiles[0].text, "Last Close (USD): n/a");
        assert!(view.charts.iter().all(ChartData::is_empty));
    }
}
