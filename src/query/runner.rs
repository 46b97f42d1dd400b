//! Bounded-time synchronous query execution over an asynchronous engine.

use std::{sync::Arc, time::Duration};

use tokio::time;

use super::{QueryEngine, QueryError, QueryState, ResultRow};

/// Interval between status polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Consecutive status-unknown polls tolerated before giving up.
pub const DEFAULT_MAX_UNKNOWN_POLLS: u32 = 30;

/// Runs a SQL statement synchronously: submit, poll until terminal, fetch.
///
/// The engine client is injected at construction; the runner holds no
/// ambient global state. Each call executes independently — there is no
/// de-duplication or result caching across calls with identical SQL.
pub struct QueryRunner {
    engine: Arc<dyn QueryEngine>,
    poll_interval: Duration,
    max_unknown_polls: u32,
}

impl QueryRunner {
    pub fn new(engine: Arc<dyn QueryEngine>) -> Self {
        Self {
            engine,
            poll_interval: DEFAULT_POLL_INTERVAL,
            max_unknown_polls: DEFAULT_MAX_UNKNOWN_POLLS,
        }
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_max_unknown_polls(mut self, cap: u32) -> Self {
        self.max_unknown_polls = cap;
        self
    }

    /// Execute `sql` against `database` and return the full result set.
    ///
    /// `timeout` bounds submission and polling as one operation; elapsing it
    /// drops any in-flight engine call and returns [`QueryError::Timeout`]
    /// without issuing a result fetch. The single result fetch after a
    /// successful terminal state runs outside the deadline, so worst-case
    /// latency is `timeout` plus one fetch round-trip.
    pub async fn run(
        &self,
        database: &str,
        sql: &str,
        output_location: &str,
        timeout: Duration,
    ) -> Result<Vec<ResultRow>, QueryError> {
        let execution_id = time::timeout(
            timeout,
            self.submit_and_poll(database, sql, output_location),
        )
        .await
        .map_err(|_| QueryError::Timeout(timeout))??;

        self.engine
            .fetch_results(&execution_id)
            .await
            .map_err(QueryError::Fetch)
    }

    /// Submit the statement and poll until SUCCEEDED, returning the
    /// execution id. Any other terminal state is an error carrying the
    /// literal status string.
    async fn submit_and_poll(
        &self,
        database: &str,
        sql: &str,
        output_location: &str,
    ) -> Result<String, QueryError> {
        let execution_id = self
            .engine
            .submit(database, sql, output_location)
            .await
            .map_err(QueryError::Submit)?;

        tracing::debug!(execution_id = %execution_id, database, "query submitted");

        let mut unknown_polls = 0u32;
        loop {
            // A poll failure aborts the whole operation.
            match self
                .engine
                .status(&execution_id)
                .await
                .map_err(QueryError::Poll)?
            {
                Some(state) if state.is_terminal() => {
                    tracing::debug!(execution_id = %execution_id, status = %state, "query terminal");
                    return if state == QueryState::Succeeded {
                        Ok(execution_id)
                    } else {
                        Err(QueryError::Failed {
                            status: state.as_str().to_owned(),
                        })
                    };
                }
                Some(_) => {
                    unknown_polls = 0;
                }
                None => {
                    // Status unknown: keep polling, but not forever.
                    unknown_polls += 1;
                    if unknown_polls >= self.max_unknown_polls {
                        return Err(QueryError::StatusUnknown(unknown_polls));
                    }
                }
            }

            time::sleep(self.poll_interval).await;
        }
    }
}
