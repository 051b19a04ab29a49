// Infrastructure layer - External dependencies and adapters
pub mod config;
pub mod csv_snapshot_store;
pub mod ebird_client;
pub mod http_response;
pub mod twelvedata_client;

#[cfg(test)]
pub mod test_support;
