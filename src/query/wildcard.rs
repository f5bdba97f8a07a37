//! Wildcard query evaluation.
//!
//! A `*` pattern is expanded against the vocabulary through the package's
//! character n-gram index, then the postings of every matched term are
//! unioned. Expansion first, evaluation second — the same rewrite shape a
//! multi-term query takes in any inverted index.

use ahash::AHashSet;

use crate::document::DocId;
use crate::error::Result;
use crate::index::package::{IndexPackage, TermKey};

/// Evaluate a wildcard pattern to its candidate document set.
///
/// A pattern matching zero vocabulary terms yields an empty set, not an
/// error.
pub fn process_wildcard_query(pattern: &str, package: &IndexPackage) -> Result<AHashSet<DocId>> {
    let terms = package.find_wildcard_matches(pattern)?;
    let mut docs = AHashSet::new();
    for term in terms {
        docs.extend(package.posting_list(&TermKey::term(term)).iter().copied());
    }
    Ok(docs)
}
