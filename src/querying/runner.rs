//! Units of work executed by the dispatcher, and the backends that create them.

use std::sync::Arc;

use crate::core::Row;
use crate::error::Result;

/// One query's execution against one backend resource.
///
/// `execute` runs on a dispatcher worker. `close` may be called from any thread, any
/// number of times, before, during or after `execute`; the resource is released once.
pub trait QueryRunner: Send + Sync {
    /// The caller's query text, without the fixed preamble.
    fn query(&self) -> &str;

    /// Runs the query to completion and returns its rows in backend order.
    fn execute(&self) -> Result<Vec<Row>>;

    /// Releases the execution resource. Safe to call repeatedly and concurrently.
    fn close(&self);

    /// Whether `close` also stops an `execute` that is still in progress. When false,
    /// the backend may keep working after the caller has moved on.
    fn interruptible(&self) -> bool {
        false
    }
}

/// A transport able to run queries and updates against a graph store.
pub trait QueryBackend: Send + Sync {
    /// Short transport name used in log fields.
    fn name(&self) -> &'static str;

    /// Creates the unit of work for a single query.
    fn runner(&self, query: &str) -> Arc<dyn QueryRunner>;

    /// Executes an update synchronously.
    fn update(&self, update: &str) -> Result<()>;
}
