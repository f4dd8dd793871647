//! Two-tier query result cache
//!
//! One tier memoizes the ordered rows of a query, the other its per-variable
//! aggregate. Both are keyed by the exact query string and bounded by entry count;
//! moka evicts with a TinyLFU/LRU policy, so a previously cached entry may be gone
//! on the next lookup.
//!
//! Entries are `Arc`s and never mutated: a later write for the same key replaces the
//! whole entry (last write wins).
//!
//! # Example
//!
//! ```
//! use rdfgate::cache::ResultCache;
//! use std::sync::Arc;
//!
//! let cache = ResultCache::new(1_000);
//! cache.put_rows("SELECT * WHERE { ?s ?p ?o }", Arc::new(Vec::new()));
//! assert!(cache.get_rows("SELECT * WHERE { ?s ?p ?o }").is_some());
//! assert!(cache.get_aggregated("SELECT * WHERE { ?s ?p ?o }").is_none());
//! ```

use std::sync::Arc;

use moka::sync::Cache;
use tracing::debug;

use crate::core::{AggregatedResult, Row};

/// Shared row-list and aggregate caches. Construct once and pass by `Arc`.
pub struct ResultCache {
    rows: Cache<String, Arc<Vec<Row>>>,
    aggregated: Cache<String, Arc<AggregatedResult>>,
    capacity: u64,
}

impl ResultCache {
    /// Creates both tiers, each holding at most `capacity` entries.
    pub fn new(capacity: u64) -> Self {
        debug!(capacity, "Initializing result cache");
        Self {
            rows: Cache::builder().max_capacity(capacity).build(),
            aggregated: Cache::builder().max_capacity(capacity).build(),
            capacity,
        }
    }

    pub fn capacity(&self) -> u64 {
        self.capacity
    }

    pub fn get_rows(&self, query: &str) -> Option<Arc<Vec<Row>>> {
        self.rows.get(query)
    }

    pub fn put_rows(&self, query: &str, rows: Arc<Vec<Row>>) {
        self.rows.insert(query.to_string(), rows);
    }

    pub fn get_aggregated(&self, query: &str) -> Option<Arc<AggregatedResult>> {
        self.aggregated.get(query)
    }

    pub fn put_aggregated(&self, query: &str, result: Arc<AggregatedResult>) {
        self.aggregated.insert(query.to_string(), result);
    }

    /// Drops the row-list entry only; the aggregate, if any, stays.
    pub fn invalidate_rows(&self, query: &str) {
        self.rows.invalidate(query);
    }

    /// Drops the aggregate entry only; the row list, if any, stays.
    pub fn invalidate_aggregated(&self, query: &str) {
        self.aggregated.invalidate(query);
    }

    /// Drops both tiers' entries for `query`.
    pub fn invalidate(&self, query: &str) {
        self.invalidate_rows(query);
        self.invalidate_aggregated(query);
    }

    pub fn clear(&self) {
        self.rows.invalidate_all();
        self.aggregated.invalidate_all();
    }

    /// Entry counts of the (rows, aggregated) tiers after pending maintenance has run.
    pub fn entry_counts(&self) -> (u64, u64) {
        self.rows.run_pending_tasks();
        self.aggregated.run_pending_tasks();
        (self.rows.entry_count(), self.aggregated.entry_count())
    }
}

impl Default for ResultCache {
    fn default() -> Self {
        Self::new(100_000)
    }
}
