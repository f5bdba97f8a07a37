//! Candidate ranking with a bounded semantic refinement.

use crate::document::DocId;
use crate::index::package::IndexPackage;
use crate::rank::lexical::{Bm25Params, RankMethod, lexical_score};
use crate::rank::semantic::{SemanticProvider, cosine_similarity};

/// Ranking configuration.
#[derive(Debug, Clone, Copy)]
pub struct RankerConfig {
    /// Lexical scoring method.
    pub method: RankMethod,
    /// BM25 parameters (ignored by other methods).
    pub bm25: Bm25Params,
    /// Maximum documents per query that receive the semantic refinement.
    /// The embedding similarity is the expensive step, so it is spent on
    /// the most promising candidates only.
    pub semantic_budget: usize,
    /// Weight of the cosine signal added to the lexical score.
    pub semantic_weight: f64,
}

impl Default for RankerConfig {
    fn default() -> Self {
        RankerConfig {
            method: RankMethod::default(),
            bm25: Bm25Params::default(),
            semantic_budget: 20,
            semantic_weight: 0.4,
        }
    }
}

/// The ordered outcome of ranking one candidate set: parallel ids and
/// scores, descending score, ties broken by ascending document id.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedResult {
    /// Document ids in rank order.
    pub doc_ids: Vec<DocId>,
    /// Combined scores, parallel to `doc_ids`.
    pub scores: Vec<f64>,
}

impl RankedResult {
    /// Number of ranked documents.
    pub fn len(&self) -> usize {
        self.doc_ids.len()
    }

    /// Whether nothing was ranked.
    pub fn is_empty(&self) -> bool {
        self.doc_ids.is_empty()
    }
}

/// Scores candidate sets against queries.
#[derive(Debug, Clone, Default)]
pub struct Ranker {
    config: RankerConfig,
}

impl Ranker {
    /// Create a ranker with the given configuration.
    pub fn new(config: RankerConfig) -> Self {
        Ranker { config }
    }

    /// Rank every candidate. All candidates receive a lexical score; the
    /// top `semantic_budget` by lexical score (ties by ascending id, so
    /// budget membership is deterministic) additionally receive the
    /// weighted cosine refinement when a provider supplies both a query
    /// vector and a document vector. The final order is total and
    /// reproducible: descending combined score, then ascending id.
    pub fn rank_documents(
        &self,
        candidates: &[DocId],
        query_tokens: &[String],
        package: &IndexPackage,
        provider: Option<&dyn SemanticProvider>,
    ) -> RankedResult {
        let mut scored: Vec<(DocId, f64)> = candidates
            .iter()
            .map(|&doc_id| {
                (
                    doc_id,
                    lexical_score(
                        self.config.method,
                        self.config.bm25,
                        query_tokens,
                        doc_id,
                        package,
                    ),
                )
            })
            .collect();

        // Deterministic budget selection: lexical score descending, id
        // ascending.
        scored.sort_unstable_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));

        if let Some(provider) = provider
            && let Some(query_vector) = provider.query_vector(query_tokens)
        {
            let budget = self.config.semantic_budget.min(scored.len());
            for entry in &mut scored[..budget] {
                if let Some(doc_vector) = provider.document_vector(entry.0) {
                    entry.1 += self.config.semantic_weight
                        * cosine_similarity(&query_vector, doc_vector);
                }
            }
        }

        scored.sort_unstable_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));

        let (doc_ids, scores) = scored.into_iter().unzip();
        RankedResult { doc_ids, scores }
    }
}
