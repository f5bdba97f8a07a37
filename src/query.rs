//! Query classification, parsing, and evaluation.
//!
//! Each query type has its own evaluator consuming the shared
//! [`IndexPackage`]; [`process_query`] is the single routed entry point:
//! detect the type, convert natural language to a boolean disjunction,
//! dispatch to the matching processor, return the candidate set.

pub mod boolean;
pub mod detector;
pub mod proximity;
pub mod wildcard;

use ahash::AHashSet;

use crate::document::DocId;
use crate::error::Result;
use crate::index::package::IndexPackage;

pub use boolean::{BooleanExpr, parse_boolean_query, process_boolean_query};
pub use detector::{QueryType, detect_query_type};
pub use proximity::{ProximityQuery, parse_proximity_query, process_proximity_query};
pub use wildcard::process_wildcard_query;

/// Convert a natural-language query into a boolean disjunction.
///
/// Whitespace tokens are joined with `OR`; empty input yields an empty
/// string (which evaluates to an empty candidate set).
pub fn convert_natural_language(query: &str) -> String {
    query.split_whitespace().collect::<Vec<_>>().join(" OR ")
}

/// Detect the query type and evaluate the query to its candidate set.
///
/// Natural-language queries are not a distinct execution path: they are
/// converted and handed to the boolean processor.
pub fn process_query(query: &str, package: &IndexPackage) -> Result<AHashSet<DocId>> {
    match detect_query_type(query)? {
        QueryType::Boolean => process_boolean_query(query, package),
        QueryType::Wildcard => process_wildcard_query(query, package),
        QueryType::Proximity => process_proximity_query(query, package),
        QueryType::NaturalLanguage => {
            let converted = convert_natural_language(query);
            if converted.is_empty() {
                return Ok(AHashSet::new());
            }
            process_boolean_query(&converted, package)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;
    use crate::index::builder::IndexBuilder;

    fn sample_package() -> IndexPackage {
        let mut builder = IndexBuilder::default();
        builder.add_document(&Document::new(10, ["climate", "change", "effects"]));
        builder.add_document(&Document::new(20, ["machine", "learning", "algorithms"]));
        builder.add_document(&Document::new(30, ["climate", "science", "research"]));
        builder.add_document(&Document::new(40, ["renewable", "energy", "transition"]));
        builder.build().unwrap()
    }

    #[test]
    fn test_convert_natural_language() {
        assert_eq!(convert_natural_language("climate change"), "climate OR change");
        assert_eq!(convert_natural_language("a b c"), "a OR b OR c");
        assert_eq!(convert_natural_language(""), "");
        assert_eq!(convert_natural_language("   "), "");
    }

    #[test]
    fn test_router_boolean() {
        let docs = process_query("climate AND change", &sample_package()).unwrap();
        assert_eq!(docs, AHashSet::from_iter([10]));
    }

    #[test]
    fn test_router_wildcard() {
        let docs = process_query("climat*", &sample_package()).unwrap();
        assert_eq!(docs, AHashSet::from_iter([10, 30]));
    }

    #[test]
    fn test_router_proximity() {
        let docs = process_query("climate NEAR/1 change", &sample_package()).unwrap();
        assert_eq!(docs, AHashSet::from_iter([10]));
    }

    #[test]
    fn test_router_natural_language() {
        let docs = process_query("climate change", &sample_package()).unwrap();
        assert_eq!(docs, AHashSet::from_iter([10, 30]));
    }

    #[test]
    fn test_router_empty_natural_language() {
        let docs = process_query("   ", &sample_package()).unwrap();
        assert!(docs.is_empty());
    }
}
