//! Query type detection.
//!
//! Classification is purely structural and case-sensitive. Precedence,
//! first match wins: a strict `NEAR/<int>` marks a proximity query, `*` a
//! wildcard, boolean operator tokens / parentheses / quoted phrases a
//! boolean query, anything else natural language. Structural markers with
//! higher specificity are checked first because proximity and wildcard
//! syntax can co-occur incidentally with boolean-looking tokens.

use lazy_static::lazy_static;
use regex::Regex;

use crate::error::{CallunaError, Result};

/// Maximum number of tokens in a quoted phrase. Matches the default token
/// n-gram depth of the index, so every accepted phrase resolves with a
/// single dictionary lookup.
pub const MAX_PHRASE_LEN: usize = 3;

lazy_static! {
    static ref RE_NEAR: Regex = Regex::new(r"NEAR/(\d+)").unwrap();
    static ref RE_BOOL_OP: Regex = Regex::new(r"\b(?:AND|OR|NOT)\b").unwrap();
    static ref RE_QUOTED: Regex = Regex::new(r#""[^"]*""#).unwrap();
    static ref RE_UPPER_OPLIKE: Regex = Regex::new(r"^[A-Z]{2,}$").unwrap();
}

/// The closed set of query types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryType {
    /// `AND`/`OR`/`NOT` expression with parentheses and quoted phrases.
    Boolean,
    /// A `*`-containing term pattern.
    Wildcard,
    /// `A NEAR/k B` distance constraint.
    Proximity,
    /// Free text, converted to a disjunction before evaluation.
    NaturalLanguage,
}

/// Classify a raw query string, rejecting malformed input.
///
/// All rejections are [`CallunaError::Parse`] and are terminal for the
/// single query only; the orchestrator records them and continues.
pub fn detect_query_type(query: &str) -> Result<QueryType> {
    if has_unmatched_quotes(query) {
        return Err(CallunaError::parse("unmatched quotes"));
    }
    if !balanced_parens(query) {
        return Err(CallunaError::parse("unbalanced parentheses"));
    }
    if bad_phrase_lengths(query) {
        return Err(CallunaError::parse(format!(
            "quoted phrase empty or longer than {MAX_PHRASE_LEN} tokens"
        )));
    }

    // Unknown ALL-CAPS operator-like tokens (XOR, ANDAND, ...), even when
    // no recognized operator is present. A bare NEAR token without /k is
    // diagnosed by the proximity check below.
    for tok in query.split_whitespace() {
        if RE_UPPER_OPLIKE.is_match(tok)
            && !matches!(tok, "AND" | "OR" | "NOT")
            && !tok.starts_with("NEAR/")
        {
            return Err(CallunaError::parse(format!("unknown operator token: {tok}")));
        }
    }

    if has_mixed_types(query) {
        return Err(CallunaError::parse(
            "mixed query types (wildcard/boolean/proximity) are not supported",
        ));
    }

    if query.contains("NEAR") {
        validate_near(query)?;
        return Ok(QueryType::Proximity);
    }

    if query.contains('*') {
        validate_wildcard(query)?;
        return Ok(QueryType::Wildcard);
    }

    if RE_BOOL_OP.is_match(query) || query.contains('"') || query.contains('(') {
        validate_boolean_structure(query)?;
        return Ok(QueryType::Boolean);
    }

    Ok(QueryType::NaturalLanguage)
}

fn has_unmatched_quotes(s: &str) -> bool {
    s.matches('"').count() % 2 == 1
}

fn balanced_parens(s: &str) -> bool {
    let mut depth: i32 = 0;
    for ch in s.chars() {
        match ch {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth < 0 {
                    return false;
                }
            }
            _ => {}
        }
    }
    depth == 0
}

fn bad_phrase_lengths(s: &str) -> bool {
    for m in RE_QUOTED.find_iter(s) {
        let inside = &m.as_str()[1..m.as_str().len() - 1];
        let token_count = inside.split_whitespace().count();
        if token_count == 0 || token_count > MAX_PHRASE_LEN {
            return true;
        }
    }
    false
}

/// Mixing wildcard with any other structured form is malformed, as is
/// mixing proximity with boolean operators. Quoted phrases are legitimate
/// `NEAR/k` operands and do not count as boolean here.
fn has_mixed_types(query: &str) -> bool {
    let has_star = query.contains('*');
    let has_near = query.contains("NEAR");
    let has_bool_ops = RE_BOOL_OP.is_match(query);
    let has_quotes = query.contains('"');

    if has_star && (has_near || has_bool_ops || has_quotes) {
        return true;
    }
    has_near && has_bool_ops
}

fn validate_near(query: &str) -> Result<()> {
    let matches: Vec<_> = RE_NEAR.find_iter(query).collect();
    if matches.is_empty() {
        return Err(CallunaError::parse("malformed NEAR: expected strict NEAR/<int>"));
    }
    if matches.len() > 1 {
        return Err(CallunaError::parse("malformed NEAR: multiple NEAR/k operators"));
    }
    let m = matches[0];
    let left = query[..m.start()].trim();
    let right = query[m.end()..].trim();
    if left.is_empty() || right.is_empty() {
        return Err(CallunaError::parse("malformed NEAR: missing operand"));
    }
    Ok(())
}

fn validate_wildcard(query: &str) -> Result<()> {
    if query.contains('"') {
        return Err(CallunaError::parse("malformed wildcard: quotes in pattern"));
    }
    if query.chars().any(char::is_whitespace) {
        return Err(CallunaError::parse("malformed wildcard: whitespace in pattern"));
    }
    if query.chars().all(|ch| ch == '*') {
        return Err(CallunaError::parse("malformed wildcard: pattern has no literal"));
    }
    Ok(())
}

fn validate_boolean_structure(query: &str) -> Result<()> {
    let toks: Vec<&str> = query.split_whitespace().collect();
    if toks.is_empty() {
        return Ok(());
    }

    if matches!(*toks.last().unwrap(), "AND" | "OR" | "NOT") {
        return Err(CallunaError::parse("malformed boolean: trailing operator"));
    }
    if matches!(toks[0], "AND" | "OR") {
        return Err(CallunaError::parse("malformed boolean: leading binary operator"));
    }

    // Adjacency rules: AND/OR may be followed by NOT (unary) but not by
    // another binary operator; NOT must be followed by an operand.
    for pair in toks.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        if matches!(a, "AND" | "OR") && matches!(b, "AND" | "OR") {
            return Err(CallunaError::parse(format!(
                "malformed boolean: operator {a} followed by {b}"
            )));
        }
        if a == "NOT" && matches!(b, "AND" | "OR" | "NOT") {
            return Err(CallunaError::parse(format!(
                "malformed boolean: NOT followed by {b}"
            )));
        }
    }
    Ok(())
}
