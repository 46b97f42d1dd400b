//! Athena implementation of the query engine.
//!
//! Amazon Athena is an interactive query service running standard SQL over
//! data in S3. Executions are asynchronous: `start_query_execution` returns
//! an execution id, `get_query_execution` reports status, and
//! `get_query_results` returns the tabular output once terminal.

use async_trait::async_trait;
use aws_sdk_athena::{
    Client,
    types::{QueryExecutionContext, QueryExecutionState, ResultConfiguration},
};

use super::{EngineError, QueryEngine, QueryState, ResultRow};

/// Athena-backed query engine.
pub struct AthenaEngine {
    client: Client,
}

impl AthenaEngine {
    /// Create an Athena client from the shared SDK config.
    ///
    /// An endpoint URL override is supported for localstack testing.
    pub fn new(sdk_config: &aws_config::SdkConfig, endpoint_url: Option<&str>) -> Self {
        let mut builder = aws_sdk_athena::config::Builder::from(sdk_config);
        if let Some(url) = endpoint_url {
            builder = builder.endpoint_url(url);
        }
        Self {
            client: Client::from_conf(builder.build()),
        }
    }
}

#[async_trait]
impl QueryEngine for AthenaEngine {
    async fn submit(
        &self,
        database: &str,
        sql: &str,
        output_location: &str,
    ) -> Result<String, EngineError> {
        let context = QueryExecutionContext::builder().database(database).build();
        let result_config = ResultConfiguration::builder()
            .output_location(output_location)
            .build();

        let output = self
            .client
            .start_query_execution()
            .query_string(sql)
            .query_execution_context(context)
            .result_configuration(result_config)
            .send()
            .await
            .map_err(|e| EngineError::Service(e.to_string()))?;

        output
            .query_execution_id()
            .map(str::to_owned)
            .ok_or(EngineError::MissingExecutionId)
    }

    async fn status(&self, execution_id: &str) -> Result<Option<QueryState>, EngineError> {
        let output = self
            .client
            .get_query_execution()
            .query_execution_id(execution_id)
            .send()
            .await
            .map_err(|e| EngineError::Service(e.to_string()))?;

        // Athena may answer without status information; that is "unknown,
        // keep polling" for the orchestrator, not an error.
        let state = output
            .query_execution()
            .and_then(|execution| execution.status())
            .and_then(|status| status.state());

        match state {
            None => Ok(None),
            Some(state) => map_state(state).map(Some),
        }
    }

    async fn fetch_results(&self, execution_id: &str) -> Result<Vec<ResultRow>, EngineError> {
        let output = self
            .client
            .get_query_results()
            .query_execution_id(execution_id)
            .send()
            .await
            .map_err(|e| EngineError::Service(e.to_string()))?;

        let rows = output
            .result_set()
            .map(|result_set| result_set.rows())
            .unwrap_or_default();

        Ok(rows
            .iter()
            .map(|row| {
                row.data()
                    .iter()
                    .map(|datum| datum.var_char_value().map(str::to_owned))
                    .collect()
            })
            .collect())
    }
}

fn map_state(state: &QueryExecutionState) -> Result<QueryState, EngineError> {
    match state {
        QueryExecutionState::Queued => Ok(QueryState::Queued),
        QueryExecutionState::Running => Ok(QueryState::Running),
        QueryExecutionState::Succeeded => Ok(QueryState::Succeeded),
        QueryExecutionState::Failed => Ok(QueryState::Failed),
        QueryExecutionState::Cancelled => Ok(QueryState::Cancelled),
        other => Err(EngineError::Service(format!(
            "unrecognized query execution state: {}",
            other.as_str()
        ))),
    }
}
