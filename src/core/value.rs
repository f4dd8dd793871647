//! Canonical string form of RDF terms
//!
//! Both transports render bound values the same way so that cached results and
//! the answer normalizer do not depend on which backend produced them:
//!
//! | Term                       | Rendering                  |
//! |----------------------------|----------------------------|
//! | IRI                        | `http://ex.org/a`          |
//! | Blank node                 | `_:b0`                     |
//! | Language-tagged literal    | `chat@fr`                  |
//! | Typed literal              | `2008-12-31^^<http://www.w3.org/2001/XMLSchema#date>` |
//! | Plain / `xsd:string`       | `hello`                    |

/// Separator between a literal's lexical form and its datatype.
pub const DATATYPE_SEPARATOR: &str = "^^";

const XSD_STRING: &str = "http://www.w3.org/2001/XMLSchema#string";

/// Renders a literal from its parts.
pub fn format_literal(lexical: &str, language: Option<&str>, datatype: Option<&str>) -> String {
    match (language, datatype) {
        (Some(lang), _) if !lang.is_empty() => format!("{}@{}", lexical, lang),
        (_, Some(dt)) if dt != XSD_STRING => format!("{}{}<{}>", lexical, DATATYPE_SEPARATOR, dt),
        _ => lexical.to_string(),
    }
}

/// Renders a blank node label.
pub fn format_blank_node(id: &str) -> String {
    format!("_:{}", id)
}

/// Returns the value without its `^^datatype` suffix.
pub fn strip_datatype(value: &str) -> &str {
    value.split(DATATYPE_SEPARATOR).next().unwrap_or(value)
}

/// Returns the datatype suffix, if any, with surrounding angle brackets removed.
pub fn datatype_of(value: &str) -> Option<&str> {
    value
        .split_once(DATATYPE_SEPARATOR)
        .map(|(_, dt)| dt.trim_start_matches('<').trim_end_matches('>'))
}

/// True when the value carries an `xsd:date` or `xsd:dateTime` datatype.
///
/// Matching is case-insensitive: some stores emit `XMLSchema#datetime`.
pub fn is_date_value(value: &str) -> bool {
    datatype_of(value).is_some_and(|dt| {
        let dt = dt.to_ascii_lowercase();
        dt.ends_with("xmlschema#date") || dt.ends_with("xmlschema#datetime")
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const XSD_DATE_TIME: &str = "http://www.w3.org/2001/XMLSchema#dateTime";

    #[test]
    fn test_format_typed_literal() {
        assert_eq!(
            format_literal("2008-12-31", None, Some(XSD_DATE_TIME)),
            "2008-12-31^^<http://www.w3.org/2001/XMLSchema#dateTime>"
        );
    }

    #[test]
    fn test_format_string_literals_are_bare() {
        assert_eq!(format_literal("hello", None, Some(XSD_STRING)), "hello");
        assert_eq!(format_literal("hello", None, None), "hello");
        assert_eq!(format_literal("chat", Some("fr"), None), "chat@fr");
    }

    #[test]
    fn test_strip_and_read_datatype() {
        let value = format_literal("42", None, Some("http://www.w3.org/2001/XMLSchema#integer"));
        assert_eq!(strip_datatype(&value), "42");
        assert_eq!(datatype_of(&value), Some("http://www.w3.org/2001/XMLSchema#integer"));
        assert_eq!(datatype_of("plain"), None);
    }

    #[test]
    fn test_date_detection() {
        assert!(is_date_value("2008-12-31^^<http://www.w3.org/2001/XMLSchema#dateTime>"));
        assert!(is_date_value("2008-12-31^^http://www.w3.org/2001/XMLSchema#datetime"));
        assert!(is_date_value("2008-12-31^^<http://www.w3.org/2001/XMLSchema#date>"));
        assert!(!is_date_value("2008^^<http://www.w3.org/2001/XMLSchema#gYear>"));
        assert!(!is_date_value("2008-12-31"));
    }
}
