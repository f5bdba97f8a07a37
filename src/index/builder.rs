//! Single-pass construction of the unified index package.

use ahash::{AHashMap, AHashSet};

use crate::document::{DocId, Document};
use crate::error::{CallunaError, Result};
use crate::index::package::{IndexPackage, TermKey};

/// Configuration for the index builder.
#[derive(Debug, Clone)]
pub struct IndexBuilderConfig {
    /// Maximum token n-gram length to index (phrases up to this length
    /// resolve with a single dictionary lookup).
    pub token_ngram_max: usize,
    /// Maximum character n-gram length for the wildcard index.
    pub char_ngram_max: usize,
}

impl Default for IndexBuilderConfig {
    fn default() -> Self {
        IndexBuilderConfig {
            token_ngram_max: 3,
            char_ngram_max: 3,
        }
    }
}

/// Builds an [`IndexPackage`] from preprocessed documents in one pass.
///
/// For each document, every token n-gram (n = 1..=`token_ngram_max`)
/// contributes a postings entry and a position entry, and every distinct
/// term contributes its boundary-wrapped character n-grams to the wildcard
/// index. `build` consumes the builder and performs the deterministic
/// post-processing (sorting and deduplication), so no partially built
/// package is ever observable.
#[derive(Debug)]
pub struct IndexBuilder {
    config: IndexBuilderConfig,
    postings: AHashMap<TermKey, AHashSet<DocId>>,
    positions: AHashMap<TermKey, AHashMap<DocId, Vec<u32>>>,
    ngram_terms: AHashMap<String, AHashSet<String>>,
    doc_lengths: AHashMap<DocId, u32>,
    doc_ids: Vec<DocId>,
    total_len: u64,
}

impl IndexBuilder {
    /// Create a builder with the given configuration.
    pub fn new(config: IndexBuilderConfig) -> Self {
        IndexBuilder {
            config,
            postings: AHashMap::new(),
            positions: AHashMap::new(),
            ngram_terms: AHashMap::new(),
            doc_lengths: AHashMap::new(),
            doc_ids: Vec::new(),
            total_len: 0,
        }
    }

    /// Add one document. A document with zero tokens is recorded in the
    /// corpus statistics but contributes no postings.
    pub fn add_document(&mut self, doc: &Document) {
        let tokens = &doc.tokens;
        self.doc_ids.push(doc.id);
        self.doc_lengths.insert(doc.id, tokens.len() as u32);
        self.total_len += tokens.len() as u64;

        // Token n-grams: postings and positions.
        for n in 1..=self.config.token_ngram_max {
            if tokens.len() < n {
                break;
            }
            for start in 0..=(tokens.len() - n) {
                let key = TermKey::phrase(tokens[start..start + n].iter().cloned());
                self.postings.entry(key.clone()).or_default().insert(doc.id);
                self.positions
                    .entry(key)
                    .or_default()
                    .entry(doc.id)
                    .or_default()
                    .push(start as u32);
            }
        }

        // Character n-grams for distinct terms only.
        let distinct: AHashSet<&String> = tokens.iter().collect();
        for term in distinct {
            for gram in char_ngrams(term, self.config.char_ngram_max) {
                self.ngram_terms
                    .entry(gram)
                    .or_default()
                    .insert(term.clone());
            }
        }
    }

    /// Finalize the package. Fails if no documents were added — an empty
    /// corpus is the one run-fatal condition.
    pub fn build(self) -> Result<IndexPackage> {
        if self.doc_ids.is_empty() {
            return Err(CallunaError::index("cannot build an index from an empty corpus"));
        }

        let doc_count = self.doc_ids.len();
        let avg_doc_len = self.total_len as f64 / doc_count as f64;

        let mut doc_ids = self.doc_ids;
        doc_ids.sort_unstable();
        doc_ids.dedup();

        // Deterministic post-processing: postings ascending and deduplicated,
        // positions ascending, wildcard term lists lexicographic.
        let postings: AHashMap<TermKey, Vec<DocId>> = self
            .postings
            .into_iter()
            .map(|(key, docs)| {
                let mut docs: Vec<DocId> = docs.into_iter().collect();
                docs.sort_unstable();
                (key, docs)
            })
            .collect();

        let mut positions = self.positions;
        for docmap in positions.values_mut() {
            for offsets in docmap.values_mut() {
                offsets.sort_unstable();
            }
        }

        let ngram_terms: AHashMap<String, Vec<String>> = self
            .ngram_terms
            .into_iter()
            .map(|(gram, terms)| {
                let mut terms: Vec<String> = terms.into_iter().collect();
                terms.sort_unstable();
                (gram, terms)
            })
            .collect();

        log::debug!(
            "built index package: {doc_count} documents, {} dictionary entries, {} char n-grams",
            postings.len(),
            ngram_terms.len()
        );

        Ok(IndexPackage {
            postings,
            positions,
            ngram_terms,
            doc_ids,
            doc_lengths: self.doc_lengths,
            avg_doc_len,
            token_ngram_max: self.config.token_ngram_max,
            char_ngram_max: self.config.char_ngram_max,
        })
    }
}

impl Default for IndexBuilder {
    fn default() -> Self {
        Self::new(IndexBuilderConfig::default())
    }
}

/// Character n-grams (length 1..=`n_max`) of the boundary-wrapped term
/// `$term$`, excluding the bare `$` unigram.
fn char_ngrams(term: &str, n_max: usize) -> Vec<String> {
    let wrapped: Vec<char> = std::iter::once('$')
        .chain(term.chars())
        .chain(std::iter::once('$'))
        .collect();

    let mut grams = Vec::new();
    for n in 1..=n_max {
        if wrapped.len() < n {
            break;
        }
        for window in wrapped.windows(n) {
            let gram: String = window.iter().collect();
            if gram == "$" {
                continue;
            }
            grams.push(gram);
        }
    }
    grams
}
