//! Query Execution Module
//!
//! Concurrency layer between callers and the backend runners.
//!
//! # Components
//!
//! - **BoundedDispatcher** - Fixed worker pool with a bounded admission queue; `submit`
//!   blocks the producer when both are saturated
//! - **TimedExecution** - Waits for one runner up to a deadline, releases its resource
//!   on every path and reports an [`Outcome`]
//!
//! # Example
//!
//! ```ignore
//! use rdfgate::execution::{BoundedDispatcher, TimedExecution};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! let dispatcher = Arc::new(BoundedDispatcher::new(50, 50)?);
//! let timed = TimedExecution::new(dispatcher);
//!
//! let execution = timed.run(adapter.runner(query), Some(Duration::from_millis(500)));
//! println!("{:?}: {} rows", execution.outcome, execution.rows.len());
//! ```

pub mod dispatcher;
pub mod timed;

pub use dispatcher::{BoundedDispatcher, JobHandle, WaitError};
pub use timed::{Execution, Outcome, TimedExecution};
