// Dashboard session - Runs the fetch/persist/derive/shape pipeline for one dashboard
use crate::application::providers::FetchError;
use crate::application::snapshot_store::SnapshotStore;
use crate::domain::dashboard::Dashboard;
use crate::domain::observation::Snapshot;
use crate::domain::telemetry::{ChartData, TileData};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Instant;

/// What differs between dashboards: where rows come from, which metrics are
/// derived and how they are charted. The pipeline around it lives in
/// [`DashboardSession`].
#[async_trait]
pub trait DashboardKind: Send + Sync {
    type Row: Clone + Send + Sync + 'static;
    type Selection: Clone + Send + Sync + 'static;
    type Metrics: Default + Clone + Send + Sync + 'static;

    fn title(&self, selection: &Self::Selection) -> String;

    async fn fetch(&self, selection: &Self::Selection) -> Result<Snapshot<Self::Row>, FetchError>;

    fn derive(&self, snapshot: &Snapshot<Self::Row>) -> Self::Metrics;

    fn tiles(&self, metrics: &Self::Metrics) -> Vec<TileData>;

    fn charts(
        &self,
        selection: &Self::Selection,
        snapshot: &Snapshot<Self::Row>,
        metrics: &Self::Metrics,
    ) -> Vec<ChartData>;
}

/// One dashboard instance. Owns the current snapshot and everything derived from
/// it; nothing carries over between refreshes except the last selection.
pub struct DashboardSession<K: DashboardKind> {
    kind: K,
    store: Arc<dyn SnapshotStore<K::Row>>,
    selection: K::Selection,
    snapshot: Snapshot<K::Row>,
    metrics: K::Metrics,
    charts: Vec<ChartData>,
    status: String,
}

impl<K: DashboardKind> DashboardSession<K> {
    pub fn new(kind: K, store: Arc<dyn SnapshotStore<K::Row>>, selection: K::Selection) -> Self {
        let snapshot = Snapshot::empty();
        let metrics = K::Metrics::default();
        let charts = kind.charts(&selection, &snapshot, &metrics);
        Self {
            kind,
            store,
            selection,
            snapshot,
            metrics,
            charts,
            status: "Waiting for first refresh".to_string(),
        }
    }

    /// Run one full pipeline pass for `selection` and publish the result.
    /// Failures never escape: they produce an empty snapshot and a status line.
    pub async fn refresh(&mut self, selection: K::Selection) -> Dashboard {
        let started = Instant::now();

        let (snapshot, status) = match self.kind.fetch(&selection).await {
            Ok(fetched) => self.persist(fetched),
            Err(e) => {
                tracing::warn!("Fetch failed for {}: {}", self.kind.title(&selection), e);
                (Snapshot::empty(), e.to_string())
            }
        };

        self.metrics = self.kind.derive(&snapshot);
        self.charts = self.kind.charts(&selection, &snapshot, &self.metrics);
        self.snapshot = snapshot;
        self.selection = selection;
        self.status = status;

        let title = self.kind.title(&self.selection);
        if self.snapshot.is_empty() {
            tracing::info!("Refreshed {} without data: {}", title, self.status);
        } else {
            tracing::info!(
                "Refreshed {} ({} rows, {} ms)",
                title,
                self.snapshot.len(),
                started.elapsed().as_millis()
            );
        }

        self.view()
    }

    /// Re-run the pipeline with the last selection (timer ticks).
    pub async fn refresh_current(&mut self) -> Dashboard {
        let selection = self.selection.clone();
        self.refresh(selection).await
    }

    /// The last published dashboard, without fetching.
    pub fn view(&self) -> Dashboard {
        Dashboard::new(
            self.kind.title(&self.selection),
            self.status.clone(),
            self.snapshot.captured_at,
            self.snapshot.len(),
            self.kind.tiles(&self.metrics),
            self.charts.clone(),
        )
    }

    /// Save then reload through the store. A failed save falls back to the
    /// fetched snapshot; a failed load yields the empty placeholder.
    fn persist(&self, fetched: Snapshot<K::Row>) -> (Snapshot<K::Row>, String) {
        if let Err(e) = self.store.save(&fetched) {
            tracing::warn!("Could not save snapshot: {}", e);
            let status = format!("{} rows (not persisted: {})", fetched.len(), e);
            return (fetched, status);
        }

        match self.store.load() {
            Ok(snapshot) => {
                let status = format!(
                    "{} rows captured at {}",
                    snapshot.len(),
                    snapshot.captured_at.format("%Y-%m-%d %H:%M:%S UTC")
                );
                (snapshot, status)
            }
            Err(e) => {
                tracing::warn!("Could not reload snapshot: {}", e);
                (Snapshot::empty(), format!("Snapshot unavailable: {}", e))
            }
        }
    }
}

#[cfg(test)]
impl<K: DashboardKind> DashboardSession<K> {
    pub fn kind(&self) -> &K {
        &self.kind
    }

    pub fn selection(&self) -> &K::Selection {
        &self.selection
    }

    pub fn snapshot(&self) -> &Snapshot<K::Row> {
        &self.snapshot
    }

    pub fn metrics(&self) -> &K::Metrics {
        &self.metrics
    }
}
