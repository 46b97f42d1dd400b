//! Interactive query engine client and the synchronous query orchestrator.
//!
//! Billing queries run against an external SQL engine whose executions are
//! asynchronous: a statement is submitted, its status is polled until it
//! reaches a terminal state, and the result set is fetched once. The
//! [`QueryEngine`] trait abstracts the engine; [`QueryRunner`] wraps it in a
//! bounded-time synchronous call.

mod athena;
mod runner;

use std::fmt;

use async_trait::async_trait;
pub use athena::AthenaEngine;
pub use runner::QueryRunner;

/// One result row: nullable varchar cells as returned by the engine.
pub type ResultRow = Vec<Option<String>>;

/// Lifecycle states of one query execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryState {
    Queued,
    Running,
    Succeeded,
    Failed,
    Cancelled,
}

impl QueryState {
    /// Whether no further progress will occur from this state.
    pub fn is_terminal(self) -> bool {
        !matches!(self, QueryState::Queued | QueryState::Running)
    }

    /// The literal engine status string.
    pub fn as_str(self) -> &'static str {
        match self {
            QueryState::Queued => "QUEUED",
            QueryState::Running => "RUNNING",
            QueryState::Succeeded => "SUCCEEDED",
            QueryState::Failed => "FAILED",
            QueryState::Cancelled => "CANCELLED",
        }
    }
}

impl fmt::Display for QueryState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors from raw engine calls.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("engine call failed: {0}")]
    Service(String),

    #[error("engine returned no execution id")]
    MissingExecutionId,
}

/// Errors from the orchestrated query workflow.
#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    #[error("query submission failed: {0}")]
    Submit(#[source] EngineError),

    /// A status poll call itself errored. Fatal for the whole operation;
    /// there is no retry-on-poll-error policy.
    #[error("query status poll failed: {0}")]
    Poll(#[source] EngineError),

    /// The execution reached a terminal state other than SUCCEEDED.
    #[error("query failed with status {status}")]
    Failed { status: String },

    /// The engine kept omitting status information past the configured cap.
    #[error("query status unknown after {0} consecutive polls")]
    StatusUnknown(u32),

    /// The overall deadline elapsed before a terminal state was observed.
    #[error("query timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("fetching query results failed: {0}")]
    Fetch(#[source] EngineError),
}

/// An interactive SQL query engine.
///
/// `status` returning `Ok(None)` means the engine answered but omitted
/// status information; the orchestrator treats that as "unknown, keep
/// polling" rather than an error.
#[async_trait]
pub trait QueryEngine: Send + Sync {
    /// Submit a SQL statement. Returns the engine-assigned execution id.
    async fn submit(
        &self,
        database: &str,
        sql: &str,
        output_location: &str,
    ) -> Result<String, EngineError>;

    /// Fetch the current execution status.
    async fn status(&self, execution_id: &str) -> Result<Option<QueryState>, EngineError>;

    /// Retrieve the result set of a terminal execution.
    async fn fetch_results(&self, execution_id: &str) -> Result<Vec<ResultRow>, EngineError>;
}
