//! Direct-protocol backend over an Oxigraph store.
//!
//! Queries run in-process against a [`Store`] handle, streaming solutions row by row.
//! Closing the runner from another thread stops the stream at the next solution and
//! drops the solution iterator on the worker.
//!
//! # Example
//!
//! ```ignore
//! use rdfgate::querying::oxigraph_adapter::OxigraphAdapter;
//! use rdfgate::querying::QueryBackend;
//!
//! let adapter = OxigraphAdapter::from_file("data/freebase-sample.nt")?;
//! let runner = adapter.runner("SELECT ?s WHERE { ?s ?p ?o } LIMIT 10");
//! for row in runner.execute()? {
//!     println!("{:?}", row.get("s"));
//! }
//! ```

use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use oxigraph::io::RdfFormat;
use oxigraph::model::Term;
use oxigraph::sparql::{QueryResults, SparqlEvaluator};
use oxigraph::store::Store;
use tracing::debug;

use crate::core::{decorate_query, format_blank_node, format_literal, Row};
use crate::error::{Error, Result};
use crate::querying::runner::{QueryBackend, QueryRunner};

/// Connection to an Oxigraph store. Cloning shares the underlying store.
#[derive(Clone)]
pub struct OxigraphAdapter {
    store: Store,
}

impl OxigraphAdapter {
    /// Opens an empty in-memory store.
    pub fn new() -> Result<Self> {
        let store = Store::new().map_err(|e| Error::Store(e.to_string()))?;
        Ok(Self { store })
    }

    pub fn with_store(store: Store) -> Self {
        Self { store }
    }

    /// Opens an in-memory store and loads an RDF file into it. The syntax is
    /// picked from the file extension (`nt`, `nq`, `ttl`, `trig`, `rdf`, ...).
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let format = path
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(RdfFormat::from_extension)
            .ok_or_else(|| {
                Error::Config(format!("unrecognized RDF file extension: {}", path.display()))
            })?;

        let adapter = Self::new()?;
        let reader = BufReader::new(File::open(path)?);
        adapter
            .store
            .load_from_reader(format, reader)
            .map_err(|e| Error::Store(e.to_string()))?;
        debug!(path = %path.display(), "Loaded RDF data into embedded store");
        Ok(adapter)
    }

    pub fn store(&self) -> &Store {
        &self.store
    }
}

impl QueryBackend for OxigraphAdapter {
    fn name(&self) -> &'static str {
        "direct"
    }

    fn runner(&self, query: &str) -> Arc<dyn QueryRunner> {
        Arc::new(OxigraphQueryRunner::new(self.store.clone(), query))
    }

    fn update(&self, update: &str) -> Result<()> {
        SparqlEvaluator::new()
            .parse_update(update)
            .map_err(|e| Error::MalformedQuery(e.to_string()))?
            .on_store(&self.store)
            .execute()
            .map_err(|e| Error::Store(e.to_string()))
    }
}

/// Runs one SELECT query against the store.
pub struct OxigraphQueryRunner {
    store: Store,
    query: String,
    closed: AtomicBool,
}

impl OxigraphQueryRunner {
    pub fn new(store: Store, query: &str) -> Self {
        Self { store, query: query.to_string(), closed: AtomicBool::new(false) }
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}

impl QueryRunner for OxigraphQueryRunner {
    fn query(&self) -> &str {
        &self.query
    }

    fn execute(&self) -> Result<Vec<Row>> {
        if self.is_closed() {
            return Err(Error::Cancelled);
        }

        let prepared = SparqlEvaluator::new()
            .parse_query(&decorate_query(&self.query))
            .map_err(|e| Error::MalformedQuery(e.to_string()))?;
        let results =
            prepared.on_store(&self.store).execute().map_err(|e| Error::Store(e.to_string()))?;

        // ASK and CONSTRUCT queries have no variable bindings.
        let QueryResults::Solutions(solutions) = results else {
            return Ok(Vec::new());
        };

        let mut rows = Vec::new();
        for solution in solutions {
            if self.is_closed() {
                return Err(Error::Cancelled);
            }
            let solution = solution.map_err(|e| Error::Store(e.to_string()))?;

            // Unbound variables are not yielded by the solution iterator.
            let row: Row = solution
                .iter()
                .map(|(var, term)| (var.as_str().to_string(), term_to_value(term)))
                .collect();
            if !row.is_empty() {
                rows.push(row);
            }
        }
        Ok(rows)
    }

    fn close(&self) {
        if !self.closed.swap(true, Ordering::AcqRel) {
            debug!(query = %self.query, "Closed direct query execution");
        }
    }

    fn interruptible(&self) -> bool {
        true
    }
}

/// Renders a term in the crate's canonical value form.
pub fn term_to_value(term: &Term) -> String {
    match term {
        Term::NamedNode(node) => node.as_str().to_string(),
        Term::BlankNode(node) => format_blank_node(node.as_str()),
        Term::Literal(literal) => {
            format_literal(literal.value(), literal.language(), Some(literal.datatype().as_str()))
        }
        #[allow(unreachable_patterns)]
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oxigraph::model::{BlankNode, Literal, NamedNode};

    #[test]
    fn test_term_to_value() {
        let iri = Term::from(NamedNode::new("http://rdf.freebase.com/ns/m.017nt").unwrap());
        assert_eq!(term_to_value(&iri), "http://rdf.freebase.com/ns/m.017nt");

        let tagged = Term::from(Literal::new_language_tagged_literal("Paris", "fr").unwrap());
        assert_eq!(term_to_value(&tagged), "Paris@fr");

        let plain = Term::from(Literal::new_simple_literal("Paris"));
        assert_eq!(term_to_value(&plain), "Paris");

        let typed = Term::from(Literal::new_typed_literal(
            "2008-12-31",
            NamedNode::new("http://www.w3.org/2001/XMLSchema#date").unwrap(),
        ));
        assert_eq!(term_to_value(&typed), "2008-12-31^^<http://www.w3.org/2001/XMLSchema#date>");

        let blank = Term::from(BlankNode::new("b0").unwrap());
        assert_eq!(term_to_value(&blank), "_:b0");
    }

    #[test]
    fn test_closed_runner_does_not_execute() {
        let adapter = OxigraphAdapter::new().unwrap();
        let runner = adapter.runner("SELECT ?s WHERE { ?s ?p ?o }");
        runner.close();
        runner.close();
        assert!(matches!(runner.execute(), Err(Error::Cancelled)));
    }

    #[test]
    fn test_close_stops_streaming_solutions() {
        use oxigraph::model::{GraphName, Quad};
        use std::time::{Duration, Instant};

        let adapter = OxigraphAdapter::new().unwrap();
        let p = NamedNode::new("http://example.org/p").unwrap();
        for i in 0..1500 {
            let s = NamedNode::new(format!("http://example.org/s{}", i)).unwrap();
            let quad = Quad::new(s, p.clone(), Literal::from(i), GraphName::DefaultGraph);
            adapter.store().insert(&quad).unwrap();
        }

        // cross product of 1500 triples with itself yields 2.25M solutions
        let runner = adapter.runner("SELECT ?a ?b WHERE { ?a ?p ?x . ?b ?q ?y }");
        let started = Instant::now();
        let worker = {
            let runner = Arc::clone(&runner);
            std::thread::spawn(move || runner.execute())
        };
        std::thread::sleep(Duration::from_millis(20));
        runner.close();

        assert!(matches!(worker.join().unwrap(), Err(Error::Cancelled)));
        assert!(started.elapsed() < Duration::from_secs(10));
    }

    #[test]
    fn test_unknown_extension_is_config_error() {
        let result = OxigraphAdapter::from_file("data.unknown");
        assert!(matches!(result, Err(Error::Config(_))));
    }
}
