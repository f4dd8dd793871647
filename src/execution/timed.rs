//! Deadline-bounded execution of a single query runner.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::core::Row;
use crate::error::Error;
use crate::execution::dispatcher::{BoundedDispatcher, WaitError};
use crate::querying::runner::QueryRunner;

/// How a query's execution ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Completed,
    TimedOut,
    Failed,
}

/// Rows produced by one execution, tagged with its outcome.
///
/// `rows` is empty unless the outcome is `Completed`.
#[derive(Debug, Clone, PartialEq)]
pub struct Execution {
    pub rows: Vec<Row>,
    pub outcome: Outcome,
    pub elapsed: Duration,
}

impl Execution {
    fn empty(outcome: Outcome, elapsed: Duration) -> Self {
        Self { rows: Vec::new(), outcome, elapsed }
    }

    pub fn is_completed(&self) -> bool {
        self.outcome == Outcome::Completed
    }
}

/// Submits runners to a dispatcher and waits for them up to a deadline.
///
/// Errors from the backend are logged here and turned into `Outcome::Failed`; nothing
/// propagates to the caller. The runner's `close` hook is invoked once on every path.
#[derive(Clone)]
pub struct TimedExecution {
    dispatcher: Arc<BoundedDispatcher>,
}

impl TimedExecution {
    pub fn new(dispatcher: Arc<BoundedDispatcher>) -> Self {
        Self { dispatcher }
    }

    pub fn dispatcher(&self) -> &Arc<BoundedDispatcher> {
        &self.dispatcher
    }

    /// Runs `runner` on the dispatcher and waits for its rows.
    ///
    /// # Arguments
    ///
    /// * `runner` - The unit of work; it may keep running after a timeout and must
    ///   tolerate being abandoned
    /// * `deadline` - Maximum wait; `None` or zero waits until completion
    pub fn run(&self, runner: Arc<dyn QueryRunner>, deadline: Option<Duration>) -> Execution {
        let started = Instant::now();
        let worker_runner = Arc::clone(&runner);
        let handle = self.dispatcher.submit(move || worker_runner.execute());

        let waited = match deadline.filter(|d| !d.is_zero()) {
            Some(deadline) => handle.wait_timeout(deadline),
            None => handle.wait(),
        };
        let elapsed = started.elapsed();

        let execution = match waited {
            Ok(Ok(rows)) => Execution { rows, outcome: Outcome::Completed, elapsed },
            Ok(Err(Error::MalformedQuery(message))) => {
                debug!(query = %runner.query(), error = %message, "Backend rejected query");
                Execution::empty(Outcome::Failed, elapsed)
            }
            Ok(Err(e)) => {
                warn!(query = %runner.query(), error = %e, "Query execution failed");
                Execution::empty(Outcome::Failed, elapsed)
            }
            Err(WaitError::TimedOut) => {
                warn!(
                    timeout_ms = deadline.map_or(0, |d| d.as_millis() as u64),
                    query = %runner.query(),
                    "Timeout query"
                );
                if !runner.interruptible() {
                    debug!(query = %runner.query(), "Backend work continues after abandonment");
                }
                Execution::empty(Outcome::TimedOut, elapsed)
            }
            Err(WaitError::Disconnected) => {
                warn!(query = %runner.query(), "Query worker ended without a result");
                Execution::empty(Outcome::Failed, elapsed)
            }
        };

        runner.close();
        execution
    }
}
