// Derived metric sets
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Summary over a categorical snapshot. All fields are zero when there is no data.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CategoricalSummary {
    pub unique_categories: usize,
    pub mean: f64,
    pub max: f64,
    pub min: f64,
}

/// Trailing window sizes used by the time-series analytics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub short_ma: usize,
    pub long_ma: usize,
    pub volatility: usize,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            short_ma: 50,
            long_ma: 200,
            volatility: 20,
        }
    }
}

/// Per-day analytics aligned with the snapshot rows. `None` marks a value that is
/// undefined for that day (window not yet filled, no previous close).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PriceMetrics {
    pub dates: Vec<NaiveDate>,
    pub close: Vec<f64>,
    pub short_ma: Vec<Option<f64>>,
    pub long_ma: Vec<Option<f64>>,
    pub daily_return: Vec<Option<f64>>,
    pub volatility: Vec<Option<f64>>,
}

impl PriceMetrics {
    pub fn last_close(&self) -> Option<f64> {
        self.close.last().copied()
    }

    pub fn last_return(&self) -> Option<f64> {
        self.daily_return.last().copied().flatten()
    }

    pub fn last_volatility(&self) -> Option<f64> {
        self.volatility.last().copied().flatten()
    }
}
