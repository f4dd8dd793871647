//! Templated graph updates
//!
//! Terms are passed in SPARQL syntax (`<http://ex.org/a>`, `"label"@en`, `fb:m.01`) and
//! trimmed before substitution. Inserts only happen when the triple is absent from the
//! named graph, deletes only when it is present.

/// `INSERT` guarded by `FILTER NOT EXISTS` on the same triple.
pub fn insert_statement(graph: &str, subject: &str, predicate: &str, object: &str) -> String {
    let (s, p, o) = (subject.trim(), predicate.trim(), object.trim());
    format!(
        "INSERT {{ GRAPH <{g}> {{ {s} {p} {o} . }} }} WHERE {{ FILTER NOT EXISTS {{ GRAPH <{g}> {{ {s} {p} {o} . }} }} }}",
        g = graph,
        s = s,
        p = p,
        o = o
    )
}

/// `DELETE` guarded by `FILTER EXISTS` on the same triple.
pub fn delete_statement(graph: &str, subject: &str, predicate: &str, object: &str) -> String {
    let (s, p, o) = (subject.trim(), predicate.trim(), object.trim());
    format!(
        "DELETE {{ GRAPH <{g}> {{ {s} {p} {o} . }} }} WHERE {{ FILTER EXISTS {{ GRAPH <{g}> {{ {s} {p} {o} . }} }} }}",
        g = graph,
        s = s,
        p = p,
        o = o
    )
}
