// Observation rows and snapshots
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// Common view over a fetched row: a category label, a numeric measure and an
/// optional timestamp. Chart shaping is written against this trait so it works
/// for both provider schemas.
pub trait ObservationRow {
    fn category(&self) -> &str;
    fn measure(&self) -> Option<f64>;
    fn timestamp(&self) -> Option<NaiveDateTime>;
}

/// One bird sighting, normalized from the provider's observation list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BirdObservation {
    pub species_code: Option<String>,
    pub common_name: String,
    pub scientific_name: Option<String>,
    pub location_name: Option<String>,
    pub observed_at: Option<NaiveDateTime>,
    pub how_many: Option<f64>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

impl BirdObservation {
    pub fn new(common_name: impl Into<String>, how_many: Option<f64>) -> Self {
        Self {
            species_code: None,
            common_name: common_name.into(),
            scientific_name: None,
            location_name: None,
            observed_at: None,
            how_many,
            lat: None,
            lng: None,
        }
    }

    pub fn observed_at(mut self, at: NaiveDateTime) -> Self {
        self.observed_at = Some(at);
        self
    }
}

impl ObservationRow for BirdObservation {
    fn category(&self) -> &str {
        &self.common_name
    }

    fn measure(&self) -> Option<f64> {
        self.how_many
    }

    fn timestamp(&self) -> Option<NaiveDateTime> {
        self.observed_at
    }
}

/// One trading day of a symbol's daily series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub symbol: String,
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: Option<f64>,
}

impl ObservationRow for PriceBar {
    fn category(&self) -> &str {
        &self.symbol
    }

    fn measure(&self) -> Option<f64> {
        Some(self.close)
    }

    fn timestamp(&self) -> Option<NaiveDateTime> {
        self.date.and_hms_opt(0, 0, 0)
    }
}

/// The complete result of one successful fetch. A new fetch replaces it whole.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot<R> {
    pub captured_at: DateTime<Utc>,
    pub rows: Vec<R>,
}

impl<R> Snapshot<R> {
    pub fn new(rows: Vec<R>) -> Self {
        Self {
            captured_at: Utc::now(),
            rows,
        }
    }

    pub fn with_capture_time(captured_at: DateTime<Utc>, rows: Vec<R>) -> Self {
        Self { captured_at, rows }
    }

    /// Placeholder used when a fetch or load fails.
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_price_bar_timestamp_is_midnight() {
        let bar = PriceBar {
            symbol: "AAPL".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            open: 1.0,
            high: 2.0,
            low: 0.5,
            close: 1.5,
            volume: None,
        };

        assert_eq!(bar.category(), "AAPL");
        assert_eq!(bar.measure(), Some(1.5));
        assert_eq!(
            bar.timestamp().unwrap().to_string(),
            "2024-03-01 00:00:00"
        );
    }

    #[test]
    fn test_empty_snapshot() {
        let snapshot: Snapshot<BirdObservation> = Snapshot::empty();
        assert!(snapshot.is_empty());
        assert_eq!(snapshot.len(), 0);
    }
}
