// Domain layer - Rows, snapshots, metrics and chart models
pub mod dashboard;
pub mod metrics;
pub mod observation;
pub mod selection;
pub mod telemetry;
