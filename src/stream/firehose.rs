//! Kinesis Data Firehose implementation of the durable stream sink.
//!
//! Uses the AWS SDK for Rust with the standard credential chain
//! (environment, instance profile, etc.).

use async_trait::async_trait;
use aws_sdk_firehose::{Client, primitives::Blob, types::Record};

use super::{DurableStream, StreamError};

/// Firehose-backed durable stream.
pub struct FirehoseStream {
    client: Client,
}

impl FirehoseStream {
    /// Create a Firehose client from the shared SDK config.
    ///
    /// An endpoint URL override is supported for localstack testing.
    pub fn new(sdk_config: &aws_config::SdkConfig, endpoint_url: Option<&str>) -> Self {
        let mut builder = aws_sdk_firehose::config::Builder::from(sdk_config);
        if let Some(url) = endpoint_url {
            builder = builder.endpoint_url(url);
        }
        Self {
            client: Client::from_conf(builder.build()),
        }
    }
}

#[async_trait]
impl DurableStream for FirehoseStream {
    async fn append(&self, record: &[u8], stream_name: &str) -> Result<(), StreamError> {
        if record.is_empty() {
            return Err(StreamError::InvalidRecord(
                "record must not be empty".to_string(),
            ));
        }
        if stream_name.is_empty() {
            return Err(StreamError::InvalidRecord(
                "stream name must not be empty".to_string(),
            ));
        }

        let data = Record::builder()
            .data(Blob::new(record))
            .build()
            .map_err(|e| StreamError::InvalidRecord(e.to_string()))?;

        // No retry or batching here: a transient put failure surfaces to the
        // caller verbatim.
        self.client
            .put_record()
            .delivery_stream_name(stream_name)
            .record(data)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, stream = stream_name, "Firehose put_record failed");
                StreamError::Append(e.to_string())
            })?;

        Ok(())
    }

    fn name(&self) -> &'static str {
        "firehose"
    }
}
