//! # rdfgate
//!
//! rdfgate is a client-side query layer in front of a remote graph store. It submits
//! SPARQL queries over a direct store connection or a SPARQL protocol endpoint, bounds
//! concurrency and per-query latency, caches results, and normalizes answer sets so
//! predicted answers can be scored against gold answers in question-answering
//! evaluations.
//!
//! ## Features
//!
//! - Fixed worker pool with blocking admission (backpressure instead of drops)
//! - Per-query deadlines that release the caller and the backend resource
//! - Two-tier result cache keyed by exact query text
//! - Answer normalization with target-value, subset and exact comparison modes
//!
//! ## Example
//!
//! ```rust
//! use rdfgate::evaluation::answers_equal;
//! use rdfgate::AggregatedResult;
//!
//! fn example() -> rdfgate::Result<()> {
//!     let mut gold = AggregatedResult::new();
//!     gold.insert("answerSubset".to_string(), ["B".to_string()].into_iter().collect());
//!
//!     let mut predicted = AggregatedResult::new();
//!     predicted.insert(
//!         "x".to_string(),
//!         ["http://ns/A".to_string(), "http://ns/B".to_string()].into_iter().collect(),
//!     );
//!
//!     assert!(answers_equal(&gold, &predicted)?);
//!     Ok(())
//! }
//! # example().unwrap();
//! ```

#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::redundant_closure_for_method_calls)]
#![allow(clippy::new_without_default)]

/// Rows, aggregated results and canonical value rendering
pub mod core;

/// Two-tier result cache
pub mod cache;

/// Client configuration
pub mod config;

/// Worker pool and deadline-bounded execution
pub mod execution;

/// Direct-protocol and HTTP query runners
pub mod querying;

/// Templated graph updates
pub mod mutation;

/// Gold/predicted answer comparison
pub mod evaluation;

pub mod client;
pub mod error;

// Re-export commonly used types
pub use client::GraphClient;
pub use config::ClientConfig;
pub use crate::core::{AggregatedResult, Row};
pub use error::{Error, Result};
pub use execution::{Execution, Outcome};
