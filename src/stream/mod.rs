//! Durable stream sink abstraction.
//!
//! The ingestion path appends opaque byte records to an external append-only
//! delivery stream. The trait keeps the HTTP layer testable and lets the
//! AWS client be injected rather than held as a global.

mod firehose;

use async_trait::async_trait;
pub use firehose::FirehoseStream;

/// An external append-only ingestion stream.
#[async_trait]
pub trait DurableStream: Send + Sync {
    /// Durably append one record to the named delivery stream.
    async fn append(&self, record: &[u8], stream_name: &str) -> Result<(), StreamError>;

    /// Sink name for logging.
    fn name(&self) -> &'static str;
}

/// Errors from durable stream sinks.
#[derive(Debug, thiserror::Error)]
pub enum StreamError {
    #[error("invalid record: {0}")]
    InvalidRecord(String),

    #[error("stream append failed: {0}")]
    Append(String),
}
