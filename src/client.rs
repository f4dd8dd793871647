//! Cache-aware, deadline-aware query client.
//!
//! A [`GraphClient`] fronts one [`QueryBackend`]. Clients for different transports can
//! share a [`ResultCache`] and a [`BoundedDispatcher`], in which case a query cached
//! through one transport is served to the other as well.
//!
//! # Example
//!
//! ```ignore
//! use rdfgate::client::GraphClient;
//! use rdfgate::config::ClientConfig;
//! use rdfgate::querying::HttpAdapter;
//! use std::sync::Arc;
//!
//! let config = ClientConfig { timeout_ms: 500, ..ClientConfig::default() };
//! let client = GraphClient::from_config(&config, Arc::new(HttpAdapter::new("http://localhost:8890/sparql")?))?;
//!
//! let answers = client.run("SELECT DISTINCT ?x WHERE { fb:m.017nt fb:location.location.containedby ?x }");
//! println!("{:?}", answers.get("x"));
//! ```

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, trace};

use crate::cache::ResultCache;
use crate::config::ClientConfig;
use crate::core::{aggregate, AggregatedResult, Row};
use crate::error::Result;
use crate::execution::{BoundedDispatcher, Execution, TimedExecution};
use crate::mutation::{delete_statement, insert_statement};
use crate::querying::runner::QueryBackend;

/// Query client over one backend, with shared cache and dispatcher.
pub struct GraphClient {
    backend: Arc<dyn QueryBackend>,
    cache: Arc<ResultCache>,
    executor: TimedExecution,
    timeout: Option<Duration>,
}

impl GraphClient {
    /// Creates a client from explicitly owned collaborators.
    ///
    /// # Arguments
    ///
    /// * `backend` - Transport used for queries and updates
    /// * `cache` - Result cache, possibly shared with other clients
    /// * `dispatcher` - Worker pool, possibly shared with other clients
    /// * `timeout` - Per-query deadline; `None` waits until completion
    pub fn new(
        backend: Arc<dyn QueryBackend>,
        cache: Arc<ResultCache>,
        dispatcher: Arc<BoundedDispatcher>,
        timeout: Option<Duration>,
    ) -> Self {
        Self { backend, cache, executor: TimedExecution::new(dispatcher), timeout }
    }

    /// Creates a client with its own cache and dispatcher sized from `config`.
    pub fn from_config(config: &ClientConfig, backend: Arc<dyn QueryBackend>) -> Result<Self> {
        config.validate()?;
        let cache = Arc::new(ResultCache::new(config.cache_capacity));
        let dispatcher = Arc::new(BoundedDispatcher::new(config.workers, config.queue_capacity)?);
        Ok(Self::new(backend, cache, dispatcher, config.timeout()))
    }

    /// A client for another backend sharing this client's cache, dispatcher and timeout.
    pub fn with_backend(&self, backend: Arc<dyn QueryBackend>) -> Self {
        Self {
            backend,
            cache: Arc::clone(&self.cache),
            executor: self.executor.clone(),
            timeout: self.timeout,
        }
    }

    pub fn cache(&self) -> &Arc<ResultCache> {
        &self.cache
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    /// Runs the query without consulting or filling the cache, exposing the outcome.
    pub fn execute(&self, query: &str) -> Execution {
        let runner = self.backend.runner(query);
        let execution = self.executor.run(runner, self.timeout);
        debug!(
            backend = self.backend.name(),
            outcome = ?execution.outcome,
            rows = execution.rows.len(),
            elapsed_ms = execution.elapsed.as_millis() as u64,
            "Query executed"
        );
        execution
    }

    /// Ordered rows for `query`, served from the row cache when present.
    ///
    /// Failed and timed-out executions yield no rows and are cached like any other.
    pub fn run_solutions(&self, query: &str) -> Arc<Vec<Row>> {
        if let Some(rows) = self.cache.get_rows(query) {
            trace!(query, "Row cache hit");
            return rows;
        }

        let rows = Arc::new(self.execute(query).rows);
        self.cache.put_rows(query, Arc::clone(&rows));
        rows
    }

    /// Distinct values per variable for `query`, served from the aggregate cache when
    /// present and otherwise derived from [`GraphClient::run_solutions`].
    pub fn run(&self, query: &str) -> Arc<AggregatedResult> {
        if let Some(result) = self.cache.get_aggregated(query) {
            trace!(query, "Aggregate cache hit");
            return result;
        }

        let result = Arc::new(aggregate(&self.run_solutions(query)));
        self.cache.put_aggregated(query, Arc::clone(&result));
        result
    }

    /// Inserts the triple into `graph` unless it is already there.
    pub fn insert_into_graph(
        &self,
        graph: &str,
        subject: &str,
        predicate: &str,
        object: &str,
    ) -> Result<()> {
        self.backend.update(&insert_statement(graph, subject, predicate, object))
    }

    /// Deletes the triple from `graph` if it is there.
    pub fn delete_from_graph(
        &self,
        graph: &str,
        subject: &str,
        predicate: &str,
        object: &str,
    ) -> Result<()> {
        self.backend.update(&delete_statement(graph, subject, predicate, object))
    }
}
