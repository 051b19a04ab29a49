// eBird-style observation provider
use crate::application::providers::{BirdObservationSource, FetchError};
use crate::domain::observation::{BirdObservation, Snapshot};
use crate::infrastructure::config::{BirdFieldMap, EbirdSettings, prepare_query};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::{Map, Value};
use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct EbirdClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    token_header: String,
    path_template: String,
    fields: BirdFieldMap,
}

impl EbirdClient {
    pub fn new(client: reqwest::Client, settings: &EbirdSettings) -> Self {
        Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            api_key: settings.api_key.clone(),
            token_header: settings.token_header.clone(),
            path_template: settings.path_template.clone(),
            fields: settings.fields.clone(),
        }
    }

    fn build_url(&self, region_code: &str) -> String {
        let mut vars = HashMap::new();
        vars.insert(
            "region".to_string(),
            urlencoding::encode(region_code).into_owned(),
        );
        let path = prepare_query(&self.path_template, &vars);
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Normalize the provider's flat observation list. Items without a category
    /// are dropped; if nothing survives the result counts as empty.
    fn parse_observations(&self, body: &Value) -> Result<Vec<BirdObservation>, FetchError> {
        let items = body.as_array().ok_or(FetchError::EmptyResult)?;

        let observations: Vec<BirdObservation> = items
            .iter()
            .filter_map(Value::as_object)
            .filter_map(|item| self.parse_observation(item))
            .collect();

        let dropped = items.len() - observations.len();
        if dropped > 0 {
            tracing::warn!(
                "Dropped {} of {} observations without a '{}' field",
                dropped,
                items.len(),
                self.fields.common_name
            );
        }

        if observations.is_empty() {
            return Err(FetchError::EmptyResult);
        }
        Ok(observations)
    }

    fn parse_observation(&self, item: &Map<String, Value>) -> Option<BirdObservation> {
        let text = |field: &str| {
            item.get(field)
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };
        let number = |field: &str| item.get(field).and_then(number_value);

        let row = BirdObservation {
            species_code: text(&self.fields.species_code),
            scientific_name: text(&self.fields.scientific_name),
            location_name: text(&self.fields.location_name),
            lat: number(&self.fields.lat),
            lng: number(&self.fields.lng),
            ..BirdObservation::new(
                text(&self.fields.common_name)?,
                number(&self.fields.how_many),
            )
        };

        match text(&self.fields.observed_at).and_then(|s| parse_timestamp(&s)) {
            Some(at) => Some(row.observed_at(at)),
            None => Some(row),
        }
    }
}

fn number_value(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|v| v.is_finite())
}

/// Accepts "2024-05-01 08:30", "2024-05-01 08:30:15", RFC 3339, or a bare date.
fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S"))
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.naive_local()))
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

#[async_trait]
impl BirdObservationSource for EbirdClient {
    async fn fetch_recent(
        &self,
        region_code: &str,
        max_results: u32,
    ) -> Result<Snapshot<BirdObservation>, FetchError> {
        let url = self.build_url(region_code);
        tracing::debug!("Fetching observations from {} (maxResults={})", url, max_results);

        let response = self
            .client
            .get(&url)
            .header(self.token_header.as_str(), self.api_key.as_str())
            .query(&[("maxResults", max_results)])
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
        let json: Value = serde_json::from_str(&body).map_err(|e| {
            tracing::warn!("Observation response is not valid JSON: {}", e);
            FetchError::EmptyResult
        })?;

        let observations = self.parse_observations(&json)?;
        tracing::debug!("Fetched {} observations for {}", observations.len(), region_code);
        Ok(Snapshot::new(observations))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::test_support::{serve, unreachable_base_url};
    use axum::{
        Json, Router,
        extract::{Path, Query},
        http::{HeaderMap, StatusCode},
        routing::get,
    };
    use serde_json::json;

    fn client(base_url: &str) -> EbirdClient {
        let settings = EbirdSettings {
            base_url: base_url.to_string(),
            api_key: "test-key".to_string(),
            ..EbirdSettings::default()
        };
        EbirdClient::new(reqwest::Client::new(), &settings)
    }

    #[test]
    fn test_build_url_encodes_region() {
        let client = client("https://api.ebird.org/v2/data/obs/");
        assert_eq!(
            client.build_url("US-NY"),
            "https://api.ebird.org/v2/data/obs/US-NY/recent"
        );
        assert_eq!(
            client.build_url("US/NY"),
            "https://api.ebird.org/v2/data/obs/US%2FNY/recent"
        );
    }

    #[test]
    fn test_parse_observations_maps_fields() {
        let client = client("http://localhost");
        let body = json!([
            {
                "speciesCode": "amerob",
                "comName": "American Robin",
                "sciName": "Turdus migratorius",
                "locName": "Central Park",
                "obsDt": "2024-05-01 08:30",
                "howMany": 3,
                "lat": 40.78,
                "lng": -73.96
            },
            { "speciesCode": "blujay", "comName": "Blue Jay", "obsDt": "2024-05-02" },
            { "speciesCode": "nocomname", "howMany": 1 }
        ]);

        let rows = client.parse_observations(&body).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].common_name, "American Robin");
        assert_eq!(rows[0].how_many, Some(3.0));
        assert_eq!(
            rows[0].observed_at.unwrap().to_string(),
            "2024-05-01 08:30:00"
        );
        assert_eq!(rows[1].how_many, None);
        assert_eq!(
            rows[1].observed_at.unwrap().to_string(),
            "2024-05-02 00:00:00"
        );
    }

    #[test]
    fn test_parse_non_array_is_empty_result() {
        let client = client("http://localhost");
        assert_eq!(
            client.parse_observations(&json!({"errors": []})),
            Err(FetchError::EmptyResult)
        );
        assert_eq!(client.parse_observations(&json!([])), Err(FetchError::EmptyResult));
    }

    #[test]
    fn test_parse_timestamp_formats() {
        assert!(parse_timestamp("2024-05-01 08:30").is_some());
        assert!(parse_timestamp("2024-05-01 08:30:15").is_some());
        assert!(parse_timestamp("2024-05-01T08:30:00Z").is_some());
        assert!(parse_timestamp("yesterday").is_none());
    }

    async fn recent(
        Path(region): Path<String>,
        Query(params): Query<HashMap<String, String>>,
        headers: HeaderMap,
    ) -> Result<Json<Value>, StatusCode> {
        if headers.get("x-ebirdapitoken").and_then(|v| v.to_str().ok()) != Some("test-key") {
            return Err(StatusCode::FORBIDDEN);
        }
        match region.as_str() {
            "US-NY" => Ok(Json(json!([
                { "comName": "Robin", "howMany": 10, "obsDt": "2024-05-01 07:00" },
                { "comName": "Robin", "howMany": 5, "obsDt": "2024-05-01 09:00" },
                { "comName": "Jay", "howMany": params.get("maxResults").map(|m| m.len()).unwrap_or(0) }
            ]))),
            "US-TX" => Ok(Json(json!([]))),
            _ => Err(StatusCode::TOO_MANY_REQUESTS),
        }
    }

    fn provider() -> Router {
        Router::new().route("/:region/recent", get(recent))
    }

    #[tokio::test]
    async fn test_fetch_recent_success() {
        let base_url = serve(provider()).await;
        let snapshot = client(&base_url).fetch_recent("US-NY", 60).await.unwrap();

        assert_eq!(snapshot.len(), 3);
        assert_eq!(snapshot.rows[0].common_name, "Robin");
        // "60" has two characters, echoed back by the fake provider
        assert_eq!(snapshot.rows[2].how_many, Some(2.0));
    }

    #[tokio::test]
    async fn test_fetch_recent_rate_limited() {
        let base_url = serve(provider()).await;
        let result = client(&base_url).fetch_recent("US-CA", 60).await;

        assert_eq!(result, Err(FetchError::ProviderError(429)));
    }

    #[tokio::test]
    async fn test_fetch_recent_empty_list() {
        let base_url = serve(provider()).await;
        let result = client(&base_url).fetch_recent("US-TX", 60).await;

        assert_eq!(result, Err(FetchError::EmptyResult));
    }

    #[tokio::test]
    async fn test_fetch_recent_non_json_body() {
        let maintenance = Router::new().route(
            "/:region/recent",
            get(|| async { "<html>Down for maintenance</html>" }),
        );
        let base_url = serve(maintenance).await;
        let result = client(&base_url).fetch_recent("US-NY", 60).await;

        assert_eq!(result, Err(FetchError::EmptyResult));
    }

    #[tokio::test]
    async fn test_fetch_recent_wrong_key() {
        let base_url = serve(provider()).await;
        let settings = EbirdSettings {
            base_url: base_url.clone(),
            api_key: "wrong".to_string(),
            ..EbirdSettings::default()
        };
        let client = EbirdClient::new(reqwest::Client::new(), &settings);

        assert_eq!(
            client.fetch_recent("US-NY", 10).await,
            Err(FetchError::ProviderError(403))
        );
    }

    #[tokio::test]
    async fn test_fetch_recent_unreachable() {
        let base_url = unreachable_base_url().await;
        let result = client(&base_url).fetch_recent("US-NY", 60).await;

        assert!(matches!(result, Err(FetchError::NetworkFailure(_))));
    }
}
