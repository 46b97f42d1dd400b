//! Request-facing services: event ingestion and billing stats.

mod ingest;
mod stats;

pub use ingest::{IngestError, IngestService};
pub use stats::{StatsError, StatsService};
