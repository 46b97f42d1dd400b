//! Aggregate billing stats: build the SUM query and extract the scalar.

use std::time::Duration;

use crate::query::{QueryError, QueryRunner, ResultRow};

/// Errors from the stats extraction path.
#[derive(Debug, thiserror::Error)]
pub enum StatsError {
    #[error(transparent)]
    Query(#[from] QueryError),

    #[error("expected exactly 2 result rows (header + aggregate), got {0}")]
    ResultShape(usize),

    #[error("aggregate cell is not numeric: {0:?}")]
    Parse(String),
}

/// Answers aggregate billing queries over the metered usage table.
pub struct StatsService {
    runner: QueryRunner,
    database: String,
    table: String,
    output_location: String,
    query_timeout: Duration,
}

impl StatsService {
    pub fn new(
        runner: QueryRunner,
        database: impl Into<String>,
        table: impl Into<String>,
        output_location: impl Into<String>,
        query_timeout: Duration,
    ) -> Self {
        Self {
            runner,
            database: database.into(),
            table: table.into(),
            output_location: output_location.into(),
            query_timeout,
        }
    }

    /// Total metered quantity for the given subject and inclusive time
    /// window. All filters are optional; absent filters are omitted from the
    /// generated SQL entirely.
    pub async fn total_quantity(
        &self,
        subject_id: Option<&str>,
        since_epoch: Option<i64>,
        until_epoch: Option<i64>,
    ) -> Result<i64, StatsError> {
        let sql = build_stats_query(&self.table, subject_id, since_epoch, until_epoch);
        tracing::debug!(sql = %sql, database = %self.database, "running billing stats query");

        let rows = self
            .runner
            .run(&self.database, &sql, &self.output_location, self.query_timeout)
            .await?;

        extract_total(&rows)
    }
}

/// Build the aggregation statement. A WHERE clause is present iff at least
/// one filter is, with conditions AND-joined in subject, lower-bound,
/// upper-bound order. Empty subjects and non-positive epochs count as absent.
fn build_stats_query(
    table: &str,
    subject_id: Option<&str>,
    since_epoch: Option<i64>,
    until_epoch: Option<i64>,
) -> String {
    let mut filters = Vec::new();
    if let Some(subject) = subject_id.filter(|s| !s.is_empty()) {
        // Athena string literals use doubled single quotes for escaping.
        filters.push(format!("subject_id = '{}'", subject.replace('\'', "''")));
    }
    if let Some(since) = since_epoch.filter(|&epoch| epoch > 0) {
        filters.push(format!("event_time_epoch >= {since}"));
    }
    if let Some(until) = until_epoch.filter(|&epoch| epoch > 0) {
        filters.push(format!("event_time_epoch <= {until}"));
    }

    let mut sql = format!("SELECT SUM(quantity) FROM {table}");
    if !filters.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&filters.join(" AND "));
    }
    sql
}

/// Parse the scalar aggregate out of the engine's result set: row 0 is the
/// column header, row 1 holds the single SUM value. A null or missing cell
/// means no rows matched and yields zero.
fn extract_total(rows: &[ResultRow]) -> Result<i64, StatsError> {
    if rows.len() != 2 {
        return Err(StatsError::ResultShape(rows.len()));
    }

    match rows[1].first().and_then(|cell| cell.as_deref()) {
        None => Ok(0),
        Some(value) => value
            .parse::<i64>()
            .map_err(|_| StatsError::Parse(value.to_owned())),
    }
}
