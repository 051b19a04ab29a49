// Fixed-interval refresh of a dashboard session
use crate::application::session::{DashboardKind, DashboardSession};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Re-run the session's pipeline with its last selection every `period`.
/// The first tick fires immediately so the dashboard has data on startup.
/// Ticks wait on the session lock, so they never overlap a user refresh.
pub fn spawn_refresh_ticker<K>(
    session: Arc<Mutex<DashboardSession<K>>>,
    period: Duration,
) -> JoinHandle<()>
where
    K: DashboardKind + 'static,
{
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            interval.tick().await;
            let mut session = session.lock().await;
            let view = session.refresh_current().await;
            tracing::debug!("Timer refresh of {}: {}", view.title, view.status);
        }
    })
}
