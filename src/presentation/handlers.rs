// HTTP request handlers
use crate::domain::selection::{BirdSelection, Choice, StockSelection};
use crate::infrastructure::http_response::{accepts_brotli, json_response};
use crate::presentation::app_state::AppState;
use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::{Html, IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub struct BirdQuery {
    pub region: Option<String>,
    pub max_results: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct StockQuery {
    pub symbol: Option<String>,
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

pub async fn index() -> Html<&'static str> {
    Html(include_str!("../../assets/index.html"))
}

pub async fn options(headers: HeaderMap, State(state): State<Arc<AppState>>) -> Response {
    respond(&state.options, accepts_brotli(&headers)).await
}

/// Refresh the bird dashboard for the requested region and size.
pub async fn bird_dashboard(
    Query(query): Query<BirdQuery>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Response {
    let region = match pick(&state.options.regions, query.region.as_deref(), &state.options.default_region) {
        Ok(region) => region,
        Err(rejection) => return rejection,
    };
    let selection = BirdSelection {
        region,
        max_results: state.options.results.clamp(query.max_results),
    };

    let view = {
        let mut session = state.birds.lock().await;
        session.refresh(selection).await
    };
    respond(&view, accepts_brotli(&headers)).await
}

/// Refresh the stock dashboard for the requested symbol.
pub async fn stock_dashboard(
    Query(query): Query<StockQuery>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Response {
    let symbol = match pick(&state.options.symbols, query.symbol.as_deref(), &state.options.default_symbol) {
        Ok(symbol) => symbol,
        Err(rejection) => return rejection,
    };

    let view = {
        let mut session = state.stocks.lock().await;
        session.refresh(StockSelection { symbol }).await
    };
    respond(&view, accepts_brotli(&headers)).await
}

/// Latest stock view as published by the timer, without refetching.
pub async fn current_stock_dashboard(
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Response {
    let view = state.stocks.lock().await.view();
    respond(&view, accepts_brotli(&headers)).await
}

fn pick(choices: &[Choice], requested: Option<&str>, default: &Choice) -> Result<Choice, Response> {
    match requested {
        None => Ok(default.clone()),
        Some(code) => Choice::find(choices, code).cloned().ok_or_else(|| {
            tracing::warn!("Rejected unknown selection {:?}", code);
            (StatusCode::BAD_REQUEST, format!("Unknown option: {}", code)).into_response()
        }),
    }
}

async fn respond<T: Serialize>(value: &T, compress: bool) -> Response {
    match json_response(value, compress).await {
        Ok(response) => response,
        Err(status) => status.into_response(),
    }
}
