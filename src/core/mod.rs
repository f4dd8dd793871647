//! Core data structures shared by the query runners, the cache and the evaluator

use indexmap::{IndexMap, IndexSet};

/// A query in the store's query language. Used verbatim as a cache key, so two
/// queries that differ only in whitespace are distinct entries.
pub type Query = String;

/// One result tuple: variable name to string-encoded value, in backend emission order.
/// Unbound variables are absent rather than mapped to an empty string.
pub type Row = IndexMap<String, String>;

/// Distinct values per variable, first-seen order preserved.
pub type AggregatedResult = IndexMap<String, IndexSet<String>>;

/// Namespace declaration prepended to every query before it reaches a backend.
pub const XSD_PREFIX: &str = "PREFIX xsd: <http://www.w3.org/2001/XMLSchema#>";

/// Prepends the fixed preamble to the caller's query text.
pub fn decorate_query(query: &str) -> String {
    format!("{} {}", XSD_PREFIX, query)
}

/// Folds ordered rows into per-variable value sets.
///
/// For each row, each bound variable contributes its value to that variable's set.
/// Duplicates collapse; the first occurrence fixes the position.
pub fn aggregate(rows: &[Row]) -> AggregatedResult {
    let mut result = AggregatedResult::new();
    for row in rows {
        for (var, value) in row {
            result.entry(var.clone()).or_default().insert(value.clone());
        }
    }
    result
}

pub mod value;
pub use value::*;

#[cfg(test)]
mod tests {
    use super::*;

    fn row(pairs: &[(&str, &str)]) -> Row {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn test_aggregate_collapses_duplicates() {
        let rows = vec![row(&[("x", "a")]), row(&[("x", "b")]), row(&[("x", "a")])];
        let aggregated = aggregate(&rows);

        let xs: Vec<&str> = aggregated["x"].iter().map(String::as_str).collect();
        assert_eq!(xs, vec!["a", "b"]);
    }

    #[test]
    fn test_aggregate_handles_sparse_rows() {
        let rows = vec![row(&[("x", "a"), ("y", "1")]), row(&[("x", "b")])];
        let aggregated = aggregate(&rows);

        assert_eq!(aggregated.len(), 2);
        assert_eq!(aggregated["x"].len(), 2);
        assert_eq!(aggregated["y"].len(), 1);
    }

    #[test]
    fn test_aggregate_empty() {
        assert!(aggregate(&[]).is_empty());
    }

    #[test]
    fn test_decorate_query() {
        let decorated = decorate_query("SELECT ?s WHERE { ?s ?p ?o }");
        assert!(decorated.starts_with("PREFIX xsd: <http://www.w3.org/2001/XMLSchema#> SELECT"));
    }
}
