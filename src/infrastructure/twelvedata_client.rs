// Twelve Data-style daily price provider
use crate::application::providers::{FetchError, PriceHistorySource};
use crate::domain::observation::{PriceBar, Snapshot};
use crate::infrastructure::config::TwelveDataSettings;
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Debug, Clone)]
pub struct TwelveDataClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    interval: String,
    output_size: u32,
}

/// The provider reports most errors in-body with HTTP 200:
/// `{"status": "error", "code": 429, "message": "..."}`.
#[derive(Debug, Deserialize)]
struct TimeSeriesResponse {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    code: Option<u16>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    values: Option<Vec<Map<String, Value>>>,
}

impl TwelveDataClient {
    pub fn new(client: reqwest::Client, settings: &TwelveDataSettings) -> Self {
        Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            api_key: settings.api_key.clone(),
            interval: settings.interval.clone(),
            output_size: settings.output_size,
        }
    }

    /// Convert the newest-first `values` array into ascending daily bars.
    fn parse_series(symbol: &str, response: TimeSeriesResponse) -> Result<Vec<PriceBar>, FetchError> {
        if response.status.as_deref() == Some("error") {
            tracing::warn!(
                "Provider error for {}: {}",
                symbol,
                response.message.as_deref().unwrap_or("no message")
            );
            return Err(FetchError::ProviderError(response.code.unwrap_or(500)));
        }

        let values = response.values.ok_or(FetchError::EmptyResult)?;
        let total = values.len();
        let mut bars: Vec<PriceBar> = values
            .iter()
            .filter_map(|entry| parse_bar(symbol, entry))
            .collect();

        if bars.len() < total {
            tracing::warn!(
                "Dropped {} of {} malformed bars for {}",
                total - bars.len(),
                total,
                symbol
            );
        }
        if bars.is_empty() {
            return Err(FetchError::EmptyResult);
        }

        bars.sort_by_key(|bar| bar.date);
        Ok(bars)
    }
}

fn field_f64(entry: &Map<String, Value>, key: &str) -> Option<f64> {
    let parsed = match entry.get(key)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|v| v.is_finite())
}

fn parse_bar(symbol: &str, entry: &Map<String, Value>) -> Option<PriceBar> {
    let raw_date = entry.get("datetime")?.as_str()?;
    let date = NaiveDate::parse_from_str(raw_date.get(..10)?, "%Y-%m-%d").ok()?;

    Some(PriceBar {
        symbol: symbol.to_string(),
        date,
        open: field_f64(entry, "open")?,
        high: field_f64(entry, "high")?,
        low: field_f64(entry, "low")?,
        close: field_f64(entry, "close")?,
        volume: field_f64(entry, "volume"),
    })
}

#[async_trait]
impl PriceHistorySource for TwelveDataClient {
    async fn fetch_daily(&self, symbol: &str) -> Result<Snapshot<PriceBar>, FetchError> {
        let url = format!("{}/time_series", self.base_url);
        let output_size = self.output_size.to_string();
        tracing::debug!("Fetching {} daily series for {}", output_size, symbol);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("symbol", symbol),
                ("interval", self.interval.as_str()),
                ("outputsize", output_size.as_str()),
                ("apikey", self.api_key.as_str()),
            ])
            .send()
            .await
            .map_err(|e| FetchError::NetworkFailure(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::ProviderError(status.as_u16()));
        }

        let body = response
            .text()
            .await
            .map_err(|e| FetchError::NetworkFailure(e.to_string()))?;
        let parsed: TimeSeriesResponse = serde_json::from_str(&body).map_err(|e| {
            tracing::warn!("Time series response for {} is not valid JSON: {}", symbol, e);
            FetchError::EmptyResult
        })?;

        let bars = Self::parse_series(symbol, parsed)?;
        Ok(Snapshot::new(bars))
    }
}
