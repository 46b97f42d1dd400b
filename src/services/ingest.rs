//! Usage event ingestion: validate, encode, append to the delivery stream.

use std::sync::Arc;

use crate::{
    models::{InvalidEvent, UsageEvent},
    stream::{DurableStream, StreamError},
};

/// Errors from the ingestion path.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("invalid usage event: {0}")]
    Invalid(#[from] InvalidEvent),

    #[error("failed to encode usage event: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("ingestion failed: {0}")]
    Stream(#[from] StreamError),
}

/// Forwards validated usage events to the durable stream.
///
/// Fire-and-forget: a query immediately following an ingest call has no
/// guarantee of seeing the event, since the downstream pipeline's delivery
/// latency is outside this service's control.
pub struct IngestService {
    stream: Arc<dyn DurableStream>,
    stream_name: String,
}

impl IngestService {
    pub fn new(stream: Arc<dyn DurableStream>, stream_name: impl Into<String>) -> Self {
        Self {
            stream,
            stream_name: stream_name.into(),
        }
    }

    /// Validate and append one usage event. No retry or backoff is applied;
    /// a stream failure surfaces verbatim.
    pub async fn ingest(&self, event: &UsageEvent) -> Result<(), IngestError> {
        event.validate()?;

        let record = event.encode_record()?;
        self.stream.append(&record, &self.stream_name).await?;

        tracing::debug!(
            subject_id = %event.subject_id,
            quantity = event.quantity,
            sink = self.stream.name(),
            "usage event appended"
        );
        Ok(())
    }
}
