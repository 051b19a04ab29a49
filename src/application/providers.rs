// Provider traits for upstream data access
use crate::domain::observation::{BirdObservation, PriceBar, Snapshot};
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// The provider answered with a non-success status (HTTP or in-body error code).
    #[error("Unable to fetch data ({0})")]
    ProviderError(u16),

    /// Success status, but the expected data key/array was absent or empty.
    #[error("No data found for the selected parameters")]
    EmptyResult,

    #[error("Network failure: {0}")]
    NetworkFailure(String),
}

#[async_trait]
pub trait BirdObservationSource: Send + Sync {
    /// Most recent observations for a region, bounded by `max_results`.
    async fn fetch_recent(
        &self,
        region_code: &str,
        max_results: u32,
    ) -> Result<Snapshot<BirdObservation>, FetchError>;
}

#[async_trait]
pub trait PriceHistorySource: Send + Sync {
    /// Daily bars for a symbol, sorted ascending by date.
    async fn fetch_daily(&self, symbol: &str) -> Result<Snapshot<PriceBar>, FetchError>;
}
