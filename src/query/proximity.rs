//! Proximity query evaluation (`A NEAR/k B`).
//!
//! Operands are terms or quoted phrases; `k` is a non-negative edge-to-edge
//! distance. The distance between two occurrence spans is the number of
//! tokens strictly between them: overlapping and immediately adjacent spans
//! are both distance 0, so `a NEAR/0 b` matches exactly the documents where
//! the occurrences touch. The check is order-insensitive, and one token
//! span can never satisfy both operands.

use ahash::AHashSet;
use lazy_static::lazy_static;
use regex::Regex;

use crate::document::DocId;
use crate::error::{CallunaError, Result};
use crate::index::package::{IndexPackage, TermKey};

lazy_static! {
    static ref RE_NEAR: Regex = Regex::new(r"\bNEAR/(\d+)\b").unwrap();
}

/// A parsed proximity query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProximityQuery {
    /// Left operand.
    pub left: TermKey,
    /// Maximum allowed tokens strictly between the operand spans.
    pub distance: u32,
    /// Right operand.
    pub right: TermKey,
}

/// Parse a strict `A NEAR/k B` query.
pub fn parse_proximity_query(query: &str) -> Result<ProximityQuery> {
    let m = RE_NEAR
        .captures(query)
        .ok_or_else(|| CallunaError::parse("malformed NEAR: expected strict NEAR/<int>"))?;
    let full = m.get(0).expect("capture group 0 always present");
    let distance: u32 = m[1]
        .parse()
        .map_err(|_| CallunaError::parse("malformed NEAR: distance out of range"))?;

    let left = query[..full.start()].trim();
    let right = query[full.end()..].trim();
    if left.is_empty() || right.is_empty() {
        return Err(CallunaError::parse("malformed NEAR: missing operand"));
    }

    Ok(ProximityQuery {
        left: operand_key(left)?,
        distance,
        right: operand_key(right)?,
    })
}

/// Convert an operand string into a dictionary key: a quoted phrase becomes
/// a token n-gram key, anything else a single term.
fn operand_key(operand: &str) -> Result<TermKey> {
    if operand.starts_with('"') && operand.ends_with('"') && operand.len() >= 2 {
        let inside = operand[1..operand.len() - 1].trim();
        let words: Vec<&str> = inside.split_whitespace().collect();
        if words.is_empty() {
            return Err(CallunaError::parse("empty quoted phrase in NEAR operand"));
        }
        if words.len() == 1 {
            return Ok(TermKey::term(words[0]));
        }
        return Ok(TermKey::phrase(words));
    }
    if operand.contains(char::is_whitespace) || operand.contains('"') {
        return Err(CallunaError::parse(format!(
            "malformed NEAR operand: {operand:?}"
        )));
    }
    Ok(TermKey::term(operand))
}

/// Occurrence spans of an operand in one document: `(start, end)` token
/// offsets, inclusive. A term span has `start == end`; a phrase of m tokens
/// spans `start..start + m - 1`.
fn operand_spans(key: &TermKey, doc_id: DocId, package: &IndexPackage) -> Vec<(u32, u32)> {
    let width = key.len() as u32 - 1;
    package
        .term_positions(key, doc_id)
        .iter()
        .map(|&start| (start, start + width))
        .collect()
}

/// Tokens strictly between two spans; 0 when they overlap or touch.
fn edge_distance(a: (u32, u32), b: (u32, u32)) -> u32 {
    let (a_start, a_end) = a;
    let (b_start, b_end) = b;
    if a_end < b_start {
        b_start - a_end - 1
    } else if b_end < a_start {
        a_start - b_end - 1
    } else {
        // Overlapping spans.
        0
    }
}

/// Evaluate a proximity query to its qualifying document set.
pub fn process_proximity_query(query: &str, package: &IndexPackage) -> Result<AHashSet<DocId>> {
    let parsed = parse_proximity_query(query)?;

    let left_docs: AHashSet<DocId> =
        package.posting_list(&parsed.left).iter().copied().collect();
    let right_docs: AHashSet<DocId> =
        package.posting_list(&parsed.right).iter().copied().collect();

    let mut hits = AHashSet::new();
    for &doc_id in left_docs.intersection(&right_docs) {
        let left_spans = operand_spans(&parsed.left, doc_id, package);
        let right_spans = operand_spans(&parsed.right, doc_id, package);

        let qualifies = left_spans.iter().any(|&a| {
            right_spans.iter().any(|&b| {
                // The same token span cannot satisfy both operands.
                a != b && edge_distance(a, b) <= parsed.distance
            })
        });
        if qualifies {
            hits.insert(doc_id);
        }
    }
    Ok(hits)
}
