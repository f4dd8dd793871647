//! rdfgate - connectivity and timing check for a graph store
//!
//! Issues one diagnostic query through the direct and the HTTP transport, in the
//! order solutions / aggregated / aggregated / solutions, then once more with a
//! trailing space to show that whitespace variants are distinct cache entries.
//!
//! Usage:
//!   rdfgate --data ./data/sample.nt --endpoint http://localhost:7878/query --timeout-ms 10

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use clap::Parser;
use rdfgate::querying::{HttpAdapter, OxigraphAdapter};
use rdfgate::{ClientConfig, GraphClient};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const DIAGNOSTIC_QUERY: &str = "PREFIX fb: <http://rdf.freebase.com/ns/> \
PREFIX rdf: <http://www.w3.org/1999/02/22-rdf-syntax-ns#> \
SELECT DISTINCT ?rel1 ?rel2 FROM <http://rdf.freebase.com> WHERE { \
fb:m.017nt ?rel1 ?m . ?m fb:type.object.type ?z . \
?z fb:freebase.type_hints.mediator true . ?m ?rel2 fb:m.04sv4 . }";

#[derive(Parser, Debug)]
#[command(name = "rdfgate")]
#[command(about = "Smoke-test graph store connectivity and query timing", long_about = None)]
struct Args {
    /// RDF file loaded into an embedded store used as the direct transport
    #[arg(short, long)]
    data: Option<PathBuf>,

    /// SPARQL protocol endpoint used as the HTTP transport
    #[arg(short, long)]
    endpoint: Option<String>,

    /// Per-query deadline in milliseconds, 0 waits without bound
    #[arg(short, long)]
    timeout_ms: Option<u64>,

    /// Dispatcher worker threads
    #[arg(short, long)]
    workers: Option<usize>,

    /// JSON config file; command-line flags override its values
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Query to run instead of the built-in diagnostic query
    #[arg(short, long)]
    query: Option<String>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => ClientConfig::from_json_file(path)?,
        None => ClientConfig { timeout_ms: 10, ..ClientConfig::default() },
    };
    if let Some(timeout_ms) = args.timeout_ms {
        config.timeout_ms = timeout_ms;
    }
    if let Some(workers) = args.workers {
        config.workers = workers;
        config.queue_capacity = workers;
    }
    if args.endpoint.is_some() {
        config.http_endpoint = args.endpoint.clone();
    }
    config.validate()?;

    let query = args.query.as_deref().unwrap_or(DIAGNOSTIC_QUERY);

    let direct = match &args.data {
        Some(path) => OxigraphAdapter::from_file(path)?,
        None => {
            warn!("No --data given, the direct transport queries an empty store");
            OxigraphAdapter::new()?
        }
    };
    let direct = GraphClient::from_config(&config, Arc::new(direct))?;

    let http = match &config.http_endpoint {
        Some(endpoint) => Some(direct.with_backend(Arc::new(HttpAdapter::with_format(
            endpoint,
            &config.result_format,
        )?))),
        None => {
            warn!("No HTTP endpoint configured, skipping the HTTP transport");
            None
        }
    };

    info!(workers = config.workers, timeout_ms = config.timeout_ms, "Running diagnostic query");
    let started = Instant::now();

    if let Some(http) = &http {
        println!("{:?}", http.run_solutions(query));
    }
    println!("{:?}", direct.run(query));
    if let Some(http) = &http {
        println!("{:?}", http.run(query));
    }
    println!("{:?}", direct.run_solutions(query));

    println!("{:?}", direct.run_solutions(&format!("{} ", query)));

    let (rows, aggregated) = direct.cache().entry_counts();
    info!(rows, aggregated, "Cache entries");
    println!("{}", started.elapsed().as_millis());
    Ok(())
}
