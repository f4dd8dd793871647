//! Query runners for the two transports
//!
//! Both variants turn backend-native solutions into [`crate::core::Row`]s and release
//! their execution resource through [`QueryRunner::close`]:
//!
//! - [`oxigraph_adapter`] - direct connection to an Oxigraph store
//! - [`http_adapter`] - SPARQL protocol endpoint over HTTP

pub mod http_adapter;
pub mod oxigraph_adapter;
pub mod runner;

pub use http_adapter::{HttpAdapter, HttpQueryRunner};
pub use oxigraph_adapter::{OxigraphAdapter, OxigraphQueryRunner};
pub use runner::{QueryBackend, QueryRunner};
