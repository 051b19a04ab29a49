// Router wiring
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{
    bird_dashboard, current_stock_dashboard, health_check, index, options, stock_dashboard,
};
use axum::{Router, routing::get};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Responses are compressed by the handlers themselves, so no
/// `CompressionLayer` here.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/healthz", get(health_check))
        .route("/api/options", get(options))
        .route("/api/birds", get(bird_dashboard))
        .route("/api/stocks", get(stock_dashboard))
        .route("/api/stocks/current", get(current_stock_dashboard))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
