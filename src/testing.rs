//! Trait-level mocks shared across unit tests.

use std::sync::{
    Mutex,
    atomic::{AtomicUsize, Ordering},
};

use async_trait::async_trait;

use crate::{
    query::{EngineError, QueryEngine, QueryState, ResultRow},
    stream::{DurableStream, StreamError},
};

/// Scripted query engine: returns a fixed sequence of status answers, then
/// sticks on the last one. Call counts are exposed for assertions.
pub struct MockEngine {
    submit_error: Option<String>,
    status_error: Option<String>,
    statuses: Mutex<Vec<Option<QueryState>>>,
    rows: Vec<ResultRow>,
    pub status_calls: AtomicUsize,
    pub fetch_calls: AtomicUsize,
}

impl MockEngine {
    pub fn with_status_sequence(statuses: Vec<Option<QueryState>>, rows: Vec<ResultRow>) -> Self {
        Self {
            submit_error: None,
            status_error: None,
            statuses: Mutex::new(statuses),
            rows,
            status_calls: AtomicUsize::new(0),
            fetch_calls: AtomicUsize::new(0),
        }
    }

    /// Immediately reports SUCCEEDED and serves `rows`.
    pub fn succeeding(rows: Vec<ResultRow>) -> Self {
        Self::with_status_sequence(vec![Some(QueryState::Succeeded)], rows)
    }

    /// Reports `state` on every poll, forever.
    pub fn stuck(state: QueryState) -> Self {
        Self::with_status_sequence(vec![Some(state)], Vec::new())
    }

    /// Reports "no status information" on every poll.
    pub fn status_unknown() -> Self {
        Self::with_status_sequence(vec![None], Vec::new())
    }

    pub fn submit_fails(message: &str) -> Self {
        let mut mock = Self::with_status_sequence(Vec::new(), Vec::new());
        mock.submit_error = Some(message.to_string());
        mock
    }

    pub fn status_fails(message: &str) -> Self {
        let mut mock = Self::with_status_sequence(Vec::new(), Vec::new());
        mock.status_error = Some(message.to_string());
        mock
    }

    fn next_status(&self) -> Option<QueryState> {
        let mut statuses = self.statuses.lock().unwrap();
        if statuses.len() > 1 {
            statuses.remove(0)
        } else {
            statuses.first().copied().flatten()
        }
    }
}

#[async_trait]
impl QueryEngine for MockEngine {
    async fn submit(
        &self,
        _database: &str,
        _sql: &str,
        _output_location: &str,
    ) -> Result<String, EngineError> {
        match &self.submit_error {
            Some(message) => Err(EngineError::Service(message.clone())),
            None => Ok("execution-1".to_string()),
        }
    }

    async fn status(&self, _execution_id: &str) -> Result<Option<QueryState>, EngineError> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        match &self.status_error {
            Some(message) => Err(EngineError::Service(message.clone())),
            None => Ok(self.next_status()),
        }
    }

    async fn fetch_results(&self, _execution_id: &str) -> Result<Vec<ResultRow>, EngineError> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.rows.clone())
    }
}

/// Recording durable stream: captures appended records for assertions.
#[derive(Default)]
pub struct MockStream {
    fail_with: Option<String>,
    pub records: Mutex<Vec<(Vec<u8>, String)>>,
}

impl MockStream {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(message: &str) -> Self {
        Self {
            fail_with: Some(message.to_string()),
            records: Mutex::new(Vec::new()),
        }
    }

    pub fn append_count(&self) -> usize {
        self.records.lock().unwrap().len()
    }
}

#[async_trait]
impl DurableStream for MockStream {
    async fn append(&self, record: &[u8], stream_name: &str) -> Result<(), StreamError> {
        if let Some(message) = &self.fail_with {
            return Err(StreamError::Append(message.clone()));
        }
        self.records
            .lock()
            .unwrap()
            .push((record.to_vec(), stream_name.to_string()));
        Ok(())
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}
