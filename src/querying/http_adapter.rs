//! HTTP backend for SPARQL protocol endpoints (Virtuoso, Jena Fuseki, Oxigraph server).
//!
//! Each query is one GET request carrying `query`, `format` and `timeout=0`
//! parameters. The whole body is read and decoded as SPARQL JSON results; a document
//! without a `results.bindings` array yields no rows.
//!
//! Requests are driven by a small tokio runtime owned by the adapter, so runners can
//! be executed from plain dispatcher threads. Closing a runner drops its in-flight
//! request future, which closes the response stream. The runtime is shut down in the
//! background when the last adapter clone goes away, so adapters and clients may be
//! dropped from inside another runtime.

use std::sync::Arc;

use reqwest::{Client, RequestBuilder, StatusCode, Url};
use serde_json::Value;
use crossbeam_channel::bounded;
use tokio::runtime::{Handle, Runtime};
use tokio::sync::watch;
use tracing::debug;

use crate::config::SPARQL_RESULTS_JSON;
use crate::core::{decorate_query, format_blank_node, format_literal, Row};
use crate::error::{Error, Result};
use crate::querying::runner::{QueryBackend, QueryRunner};

/// Connection settings for one SPARQL protocol endpoint. Cloning shares the
/// HTTP client and runtime.
#[derive(Clone)]
pub struct HttpAdapter {
    endpoint: Url,
    update_endpoint: Url,
    result_format: String,
    client: Client,
    runtime: Arc<HttpRuntime>,
}

/// Owns the adapter's runtime and releases it without blocking on drop.
struct HttpRuntime {
    handle: Handle,
    runtime: Option<Runtime>,
}

impl HttpRuntime {
    fn new() -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .thread_name("rdfgate-http")
            .enable_all()
            .build()?;
        Ok(Self { handle: runtime.handle().clone(), runtime: Some(runtime) })
    }
}

impl Drop for HttpRuntime {
    fn drop(&mut self) {
        if let Some(runtime) = self.runtime.take() {
            runtime.shutdown_background();
        }
    }
}

impl HttpAdapter {
    /// Creates an adapter requesting SPARQL JSON results.
    pub fn new(endpoint: &str) -> Result<Self> {
        Self::with_format(endpoint, SPARQL_RESULTS_JSON)
    }

    /// Creates an adapter with a custom `format` parameter value.
    ///
    /// # Arguments
    ///
    /// * `endpoint` - Query endpoint URL, also used for updates unless overridden
    /// * `result_format` - Sent as the `format` parameter and the `Accept` header
    pub fn with_format(endpoint: &str, result_format: &str) -> Result<Self> {
        let endpoint = Url::parse(endpoint)
            .map_err(|e| Error::Config(format!("invalid endpoint '{}': {}", endpoint, e)))?;
        let client = Client::builder().build().map_err(|e| Error::Transport(e.to_string()))?;
        let runtime = HttpRuntime::new()?;

        Ok(Self {
            update_endpoint: endpoint.clone(),
            endpoint,
            result_format: result_format.to_string(),
            client,
            runtime: Arc::new(runtime),
        })
    }

    /// Sends updates to a different URL than queries, e.g. Oxigraph's `/update`.
    pub fn with_update_endpoint(mut self, update_endpoint: &str) -> Result<Self> {
        self.update_endpoint = Url::parse(update_endpoint).map_err(|e| {
            Error::Config(format!("invalid update endpoint '{}': {}", update_endpoint, e))
        })?;
        Ok(self)
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    fn query_request(&self, query: &str) -> RequestBuilder {
        self.client
            .get(self.endpoint.clone())
            .header("Accept", self.result_format.as_str())
            .query(&[
                ("query", query),
                ("format", self.result_format.as_str()),
                ("timeout", "0"),
            ])
    }
}

impl QueryBackend for HttpAdapter {
    fn name(&self) -> &'static str {
        "http"
    }

    fn runner(&self, query: &str) -> Arc<dyn QueryRunner> {
        Arc::new(HttpQueryRunner::new(self.clone(), query))
    }

    /// Posts the update as an `update` form field.
    ///
    /// The request runs as a task on the adapter's runtime and this call waits for it,
    /// so it may also be made from inside another runtime.
    fn update(&self, update: &str) -> Result<()> {
        let request = self.client.post(self.update_endpoint.clone()).form(&[("update", update)]);
        let (done_tx, done_rx) = bounded(1);

        self.runtime.handle.spawn(async move {
            let _ = done_tx.send(send_update(request).await);
        });
        done_rx
            .recv()
            .map_err(|_| Error::Transport("Update task ended without a result".to_string()))?
    }
}

async fn send_update(request: RequestBuilder) -> Result<()> {
    let response = request.send().await?;
    if !response.status().is_success() {
        let status = response.status();
        let error_body = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());
        return Err(Error::Transport(format!(
            "Update failed with status {}: {}",
            status, error_body
        )));
    }
    Ok(())
}

/// Runs one query as a single HTTP request.
pub struct HttpQueryRunner {
    adapter: HttpAdapter,
    query: String,
    closed: watch::Sender<bool>,
}

impl HttpQueryRunner {
    pub fn new(adapter: HttpAdapter, query: &str) -> Self {
        let (closed, _) = watch::channel(false);
        Self { adapter, query: query.to_string(), closed }
    }
}

impl QueryRunner for HttpQueryRunner {
    fn query(&self) -> &str {
        &self.query
    }

    fn execute(&self) -> Result<Vec<Row>> {
        let mut closed = self.closed.subscribe();
        if *closed.borrow() {
            return Err(Error::Cancelled);
        }

        let request = self.adapter.query_request(&decorate_query(&self.query));
        let body = self.adapter.runtime.handle.block_on(async move {
            tokio::select! {
                body = fetch_body(request) => body,
                _ = closed.wait_for(|closed| *closed) => Err(Error::Cancelled),
            }
        })?;

        parse_bindings(&body)
    }

    fn close(&self) {
        if !self.closed.send_replace(true) {
            debug!(query = %self.query, "Closed HTTP query execution");
        }
    }

    fn interruptible(&self) -> bool {
        true
    }
}

async fn fetch_body(request: RequestBuilder) -> Result<String> {
    let response = request.send().await?;
    let status = response.status();
    if status == StatusCode::BAD_REQUEST {
        let message = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());
        return Err(Error::MalformedQuery(message));
    }
    if !status.is_success() {
        return Err(Error::Transport(format!("Query failed with status {}", status)));
    }
    Ok(response.text().await?)
}

/// Decodes a SPARQL JSON results document into rows.
///
/// Returns no rows when the document lacks a `results.bindings` array; fails only
/// when the body is not JSON at all.
pub fn parse_bindings(body: &str) -> Result<Vec<Row>> {
    let document: Value = serde_json::from_str(body.trim())?;

    let Some(bindings) = document
        .get("results")
        .and_then(|results| results.get("bindings"))
        .and_then(Value::as_array)
    else {
        debug!("Response has no results.bindings array");
        return Ok(Vec::new());
    };

    let rows = bindings
        .iter()
        .filter_map(Value::as_object)
        .map(|binding| {
            binding
                .iter()
                .filter_map(|(var, term)| term_value(term).map(|value| (var.clone(), value)))
                .collect::<Row>()
        })
        .filter(|row| !row.is_empty())
        .collect();
    Ok(rows)
}

fn term_value(term: &Value) -> Option<String> {
    let value = term.get("value")?.as_str()?;
    let field = |name: &str| term.get(name).and_then(Value::as_str);

    Some(match field("type") {
        Some("uri") => value.to_string(),
        Some("bnode") => format_blank_node(value),
        _ => format_literal(value, field("xml:lang"), field("datatype")),
    })
}
