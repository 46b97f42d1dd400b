use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Stream, database, and query settings for the metering pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MeteringConfig {
    /// Firehose delivery stream that receives usage event records.
    #[serde(default = "default_stream_name")]
    pub stream_name: String,

    /// Logical database (Glue catalog) billing queries run against.
    #[serde(default = "default_database")]
    pub database: String,

    /// Table holding the ingested usage events.
    #[serde(default = "default_table")]
    pub table: String,

    /// S3 location where the query engine writes its output.
    #[serde(default = "default_output_location")]
    pub output_location: String,

    /// Overall deadline for one billing query (submission + polling).
    #[serde(default = "default_query_timeout_secs")]
    pub query_timeout_secs: u64,

    /// Interval between query status polls.
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,

    /// Consecutive status-unknown polls tolerated before giving up.
    #[serde(default = "default_max_unknown_polls")]
    pub max_unknown_polls: u32,
}

impl MeteringConfig {
    pub fn query_timeout(&self) -> Duration {
        Duration::from_secs(self.query_timeout_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }
}

impl Default for MeteringConfig {
    fn default() -> Self {
        Self {
            stream_name: default_stream_name(),
            database: default_database(),
            table: default_table(),
            output_location: default_output_location(),
            query_timeout_secs: default_query_timeout_secs(),
            poll_interval_secs: default_poll_interval_secs(),
            max_unknown_polls: default_max_unknown_polls(),
        }
    }
}

fn default_stream_name() -> String {
    "usage-events".to_string()
}

fn default_database() -> String {
    "default".to_string()
}

fn default_table() -> String {
    "usage_events".to_string()
}

fn default_output_location() -> String {
    "s3://meterd-query-output".to_string()
}

fn default_query_timeout_secs() -> u64 {
    60
}

fn default_poll_interval_secs() -> u64 {
    2
}

fn default_max_unknown_polls() -> u32 {
    30
}
