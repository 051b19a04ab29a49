// Application layer - Dashboard pipeline and use cases
pub mod bird_dashboard;
pub mod chart_shaper;
pub mod metric_deriver;
pub mod providers;
pub mod refresh_ticker;
pub mod session;
pub mod snapshot_store;
pub mod stock_dashboard;
