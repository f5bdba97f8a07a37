//! The immutable index package and its read-only access operations.
//!
//! An [`IndexPackage`] bundles everything query evaluation needs: the
//! unified postings dictionary (terms and token n-grams), per-document
//! position lists, the character n-gram index backing wildcard expansion,
//! and corpus statistics for scoring. It is produced once by the builder
//! and never mutated afterwards, so it can be shared across concurrent
//! query evaluations without locking.

use ahash::{AHashMap, AHashSet};
use regex::Regex;

use crate::document::DocId;
use crate::error::{CallunaError, Result};

/// A lookup key in the unified dictionary: a single term or a token n-gram.
///
/// Phrases of up to the builder's `token_ngram_max` tokens are indexed
/// directly under their n-gram key, so phrase postings and positions
/// resolve with one dictionary lookup.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TermKey(Box<[String]>);

impl TermKey {
    /// Create a key for a single term.
    pub fn term<S: Into<String>>(term: S) -> Self {
        TermKey(Box::new([term.into()]))
    }

    /// Create a key for a token n-gram (phrase).
    pub fn phrase<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        TermKey(tokens.into_iter().map(Into::into).collect())
    }

    /// The tokens making up this key.
    pub fn tokens(&self) -> &[String] {
        &self.0
    }

    /// The number of tokens in this key.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether this key holds no tokens.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Display for TermKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.join(" "))
    }
}

/// The immutable bundle produced by the index builder.
#[derive(Debug)]
pub struct IndexPackage {
    /// Term/n-gram -> ascending, deduplicated document ids.
    pub(crate) postings: AHashMap<TermKey, Vec<DocId>>,
    /// Term/n-gram -> per-document ascending token offsets.
    pub(crate) positions: AHashMap<TermKey, AHashMap<DocId, Vec<u32>>>,
    /// Character n-gram (boundary-wrapped) -> lexicographically sorted terms.
    pub(crate) ngram_terms: AHashMap<String, Vec<String>>,
    /// All indexed document ids, ascending. The NOT universe.
    pub(crate) doc_ids: Vec<DocId>,
    /// Per-document token counts.
    pub(crate) doc_lengths: AHashMap<DocId, u32>,
    /// Average document length over the corpus.
    pub(crate) avg_doc_len: f64,
    /// Maximum token n-gram length indexed.
    pub(crate) token_ngram_max: usize,
    /// Maximum character n-gram length indexed.
    pub(crate) char_ngram_max: usize,
}

impl IndexPackage {
    /// Return the ascending document ids containing `key`.
    ///
    /// Absent keys yield an empty slice, never an error.
    pub fn posting_list(&self, key: &TermKey) -> &[DocId] {
        self.postings.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Return the ascending token offsets of `key` in document `doc_id`.
    ///
    /// Empty when the key does not occur in that document.
    pub fn term_positions(&self, key: &TermKey, doc_id: DocId) -> &[u32] {
        self.positions
            .get(key)
            .and_then(|docmap| docmap.get(&doc_id))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Return the lexicographically sorted terms containing the raw
    /// character n-gram `gram` (boundary-wrapped form, e.g. `"$cl"`).
    pub fn ngram_terms(&self, gram: &str) -> &[String] {
        self.ngram_terms
            .get(gram)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// The number of indexed documents.
    pub fn doc_count(&self) -> usize {
        self.doc_ids.len()
    }

    /// All indexed document ids, ascending. The universe for NOT.
    pub fn all_doc_ids(&self) -> &[DocId] {
        &self.doc_ids
    }

    /// The token count of `doc_id`, or 0 if unknown.
    pub fn doc_length(&self, doc_id: DocId) -> u32 {
        self.doc_lengths.get(&doc_id).copied().unwrap_or(0)
    }

    /// The average document length over the corpus.
    pub fn avg_doc_len(&self) -> f64 {
        self.avg_doc_len
    }

    /// The maximum token n-gram length this package indexes.
    pub fn token_ngram_max(&self) -> usize {
        self.token_ngram_max
    }

    /// Iterate over the single-term vocabulary.
    pub fn vocabulary(&self) -> impl Iterator<Item = &str> {
        self.postings
            .keys()
            .filter(|key| key.len() == 1)
            .map(|key| key.tokens()[0].as_str())
    }

    /// Resolve a `*`-containing pattern to the vocabulary terms it matches.
    ///
    /// The literal fragments around each `*` are turned into boundary-aware
    /// character n-grams whose term sets are intersected as a pre-filter;
    /// survivors are confirmed against the compiled regex equivalent of the
    /// whole pattern. The result is sorted lexicographically. A pattern
    /// without `*` degenerates to an exact vocabulary lookup.
    pub fn find_wildcard_matches(&self, pattern: &str) -> Result<Vec<String>> {
        if pattern.is_empty() {
            return Err(CallunaError::invalid_argument("empty wildcard pattern"));
        }

        if !pattern.contains('*') {
            let key = TermKey::term(pattern);
            if self.postings.contains_key(&key) {
                return Ok(vec![pattern.to_string()]);
            }
            return Ok(Vec::new());
        }

        let regex = compile_wildcard_regex(pattern)?;
        let grams = fragment_ngrams(pattern, self.char_ngram_max);

        let mut matches: Vec<String> = if grams.is_empty() {
            // Nothing selective to pre-filter on (e.g. "a*"): scan the
            // vocabulary directly so resolution stays complete.
            log::debug!("wildcard pattern {pattern:?} has no usable n-grams, scanning vocabulary");
            self.vocabulary()
                .filter(|term| regex.is_match(term))
                .map(str::to_string)
                .collect()
        } else {
            let mut candidates: Option<AHashSet<&str>> = None;
            for gram in &grams {
                let terms: AHashSet<&str> =
                    self.ngram_terms(gram).iter().map(String::as_str).collect();
                candidates = Some(match candidates {
                    None => terms,
                    Some(prev) => prev.intersection(&terms).copied().collect(),
                });
                if candidates.as_ref().is_some_and(|c| c.is_empty()) {
                    return Ok(Vec::new());
                }
            }
            candidates
                .unwrap_or_default()
                .into_iter()
                .filter(|term| regex.is_match(term))
                .map(str::to_string)
                .collect()
        };

        matches.sort_unstable();
        Ok(matches)
    }
}

/// Compile a `*` wildcard pattern into an anchored regex.
pub(crate) fn compile_wildcard_regex(pattern: &str) -> Result<Regex> {
    let mut regex_pattern = String::with_capacity(pattern.len() + 2);
    regex_pattern.push('^');
    for (i, fragment) in pattern.split('*').enumerate() {
        if i > 0 {
            regex_pattern.push_str(".*");
        }
        regex_pattern.push_str(&regex::escape(fragment));
    }
    regex_pattern.push('$');
    Regex::new(&regex_pattern)
        .map_err(|e| CallunaError::invalid_argument(format!("invalid wildcard pattern: {e}")))
}

/// Derive the boundary-aware character n-grams used to pre-filter wildcard
/// candidates. Fragments adjacent to the pattern boundary keep their `$`
/// marker so prefix/suffix constraints survive the pre-filter.
fn fragment_ngrams(pattern: &str, n_max: usize) -> Vec<String> {
    let fragments: Vec<&str> = pattern.split('*').collect();
    let last = fragments.len() - 1;

    let mut grams = Vec::new();
    for (i, fragment) in fragments.iter().enumerate() {
        if fragment.is_empty() {
            continue;
        }
        let mut decorated = String::new();
        if i == 0 {
            decorated.push('$');
        }
        decorated.push_str(fragment);
        if i == last {
            decorated.push('$');
        }

        let chars: Vec<char> = decorated.chars().collect();
        let n = n_max.min(chars.len());
        for window in chars.windows(n) {
            let gram: String = window.iter().collect();
            if gram == "$" {
                continue;
            }
            grams.push(gram);
        }
    }
    grams.sort_unstable();
    grams.dedup();
    grams
}
