//! The batch search engine facade.
//!
//! [`SearchEngine`] ties the pipeline together: build the index package
//! once, then for each query detect its type, evaluate it to a candidate
//! set, rank the candidates, and emit a [`QueryOutput`] record. A query
//! that fails to parse is logged and produces an empty record; the run
//! continues. Only an empty corpus aborts the run, before any query is
//! processed.

use std::sync::Arc;

use ahash::AHashSet;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::document::{DocId, Document};
use crate::error::Result;
use crate::index::builder::{IndexBuilder, IndexBuilderConfig};
use crate::index::package::IndexPackage;
use crate::query::process_query;
use crate::rank::ranker::{RankedResult, Ranker, RankerConfig};
use crate::rank::semantic::SemanticProvider;

/// Engine configuration: index build parameters plus ranking parameters.
#[derive(Debug, Clone, Default)]
pub struct SearchEngineConfig {
    /// Index builder configuration.
    pub index: IndexBuilderConfig,
    /// Ranker configuration.
    pub ranker: RankerConfig,
}

/// One input query record. The `qid` is threaded through unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryRecord {
    /// External query identifier.
    pub qid: String,
    /// The raw query string.
    pub query: String,
}

/// One output record: the ranked document ids for a query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryOutput {
    /// External query identifier, unchanged from the input record.
    pub qid: String,
    /// Ranked document ids, best first.
    pub doc_ids: Vec<DocId>,
}

/// The batch retrieval engine: one immutable index, sequential or
/// parallel per-query evaluation.
pub struct SearchEngine {
    package: Arc<IndexPackage>,
    ranker: Ranker,
    provider: Option<Arc<dyn SemanticProvider>>,
}

impl SearchEngine {
    /// Build the index from the full corpus and return the ready engine.
    ///
    /// Fails only when the corpus is empty; no partially built index is
    /// ever observable.
    pub fn build(documents: &[Document], config: SearchEngineConfig) -> Result<Self> {
        let mut builder = IndexBuilder::new(config.index);
        for doc in documents {
            builder.add_document(doc);
        }
        let package = builder.build()?;
        log::debug!("search engine ready: {} documents indexed", package.doc_count());

        Ok(SearchEngine {
            package: Arc::new(package),
            ranker: Ranker::new(config.ranker),
            provider: None,
        })
    }

    /// Attach a semantic provider for the ranker's embedding signal.
    pub fn with_semantic_provider(mut self, provider: Arc<dyn SemanticProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    /// The shared, immutable index package.
    pub fn package(&self) -> &Arc<IndexPackage> {
        &self.package
    }

    /// Evaluate one raw query to its candidate document set.
    pub fn process_query(&self, query: &str) -> Result<AHashSet<DocId>> {
        process_query(query, &self.package)
    }

    /// Rank a candidate set against query tokens.
    pub fn rank_documents(&self, candidates: &[DocId], query_tokens: &[String]) -> RankedResult {
        self.ranker.rank_documents(
            candidates,
            query_tokens,
            &self.package,
            self.provider.as_deref(),
        )
    }

    /// Run the full pipeline for one query record.
    ///
    /// Parse failures are terminal for this query only: they are logged
    /// and yield an empty `doc_ids` list under the same `qid`.
    pub fn search(&self, record: &QueryRecord) -> QueryOutput {
        let candidates = match self.process_query(&record.query) {
            Ok(candidates) => candidates,
            Err(err) => {
                log::warn!("query {} failed: {err}", record.qid);
                return QueryOutput {
                    qid: record.qid.clone(),
                    doc_ids: Vec::new(),
                };
            }
        };

        let mut candidates: Vec<DocId> = candidates.into_iter().collect();
        candidates.sort_unstable();

        let ranked = self.rank_documents(&candidates, &ranking_tokens(&record.query));
        QueryOutput {
            qid: record.qid.clone(),
            doc_ids: ranked.doc_ids,
        }
    }

    /// Evaluate all query records in input order.
    pub fn run_queries(&self, records: &[QueryRecord]) -> Vec<QueryOutput> {
        records.iter().map(|record| self.search(record)).collect()
    }

    /// Evaluate all query records across threads. The index package is
    /// immutable and each query is independent, so no locking is needed;
    /// outputs are gathered back in input order.
    pub fn run_queries_parallel(&self, records: &[QueryRecord]) -> Vec<QueryOutput> {
        records.par_iter().map(|record| self.search(record)).collect()
    }
}

/// The content tokens of a query, for lexical scoring: operator tokens,
/// parentheses, quotes, and wildcard markers are stripped.
fn ranking_tokens(query: &str) -> Vec<String> {
    query
        .split_whitespace()
        .filter(|tok| !matches!(*tok, "AND" | "OR" | "NOT") && !tok.starts_with("NEAR/"))
        .map(|tok| {
            tok.trim_matches(|ch| matches!(ch, '(' | ')' | '"' | '*'))
                .to_string()
        })
        .filter(|tok| !tok.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_engine() -> SearchEngine {
        let docs = vec![
            Document::new(10, vec!["climate", "change", "affects", "global", "policy"]),
            Document::new(20, vec!["machine", "learning", "algorithms", "improve", "models"]),
            Document::new(30, vec!["climate", "policy", "research", "climate", "science"]),
        ];
        SearchEngine::build(&docs, SearchEngineConfig::default()).unwrap()
    }

    #[test]
    fn test_empty_corpus_is_fatal() {
        assert!(SearchEngine::build(&[], SearchEngineConfig::default()).is_err());
    }

    #[test]
    fn test_search_threads_qid_through() {
        let engine = sample_engine();
        let out = engine.search(&QueryRecord {
            qid: "Q1".into(),
            query: "climate AND change".into(),
        });
        assert_eq!(out.qid, "Q1");
        assert_eq!(out.doc_ids, [10]);
    }

    #[test]
    fn test_malformed_query_yields_empty_record() {
        let engine = sample_engine();
        let out = engine.search(&QueryRecord {
            qid: "BAD".into(),
            query: "\"unmatched".into(),
        });
        assert_eq!(out.qid, "BAD");
        assert!(out.doc_ids.is_empty());
    }

    #[test]
    fn test_run_continues_after_failed_query() {
        let engine = sample_engine();
        let records = vec![
            QueryRecord {
                qid: "Q1".into(),
                query: "climat* AND change".into(),
            },
            QueryRecord {
                qid: "Q2".into(),
                query: "climate".into(),
            },
        ];
        let outputs = engine.run_queries(&records);
        assert_eq!(outputs.len(), 2);
        assert!(outputs[0].doc_ids.is_empty());
        assert_eq!(outputs[1].doc_ids, [30, 10]);
    }

    #[test]
    fn test_parallel_matches_sequential_order() {
        let engine = sample_engine();
        let records = vec![
            QueryRecord {
                qid: "Q1".into(),
                query: "climate AND change".into(),
            },
            QueryRecord {
                qid: "Q2".into(),
                query: "\"machine learning\"".into(),
            },
            QueryRecord {
                qid: "Q3".into(),
                query: "climat*".into(),
            },
            QueryRecord {
                qid: "Q4".into(),
                query: "climate NEAR/2 policy".into(),
            },
            QueryRecord {
                qid: "Q5".into(),
                query: "effects climate".into(),
            },
        ];
        let sequential = engine.run_queries(&records);
        let parallel = engine.run_queries_parallel(&records);
        assert_eq!(sequential, parallel);
        let qids: Vec<&str> = parallel.iter().map(|o| o.qid.as_str()).collect();
        assert_eq!(qids, ["Q1", "Q2", "Q3", "Q4", "Q5"]);
    }

    #[test]
    fn test_output_record_schema() {
        let engine = sample_engine();
        let out = engine.search(&QueryRecord {
            qid: "Q3".into(),
            query: "climat*".into(),
        });
        let json = serde_json::to_value(&out).unwrap();
        assert_eq!(json["qid"], "Q3");
        assert!(json["doc_ids"].is_array());
    }

    #[test]
    fn test_ranking_tokens() {
        assert_eq!(ranking_tokens("climate AND change"), ["climate", "change"]);
        assert_eq!(
            ranking_tokens("( climate OR policy ) AND NOT science"),
            ["climate", "policy", "science"]
        );
        assert_eq!(
            ranking_tokens("\"machine learning\" NEAR/2 algorithms"),
            ["machine", "learning", "algorithms"]
        );
        assert_eq!(ranking_tokens("climat*"), ["climat"]);
    }
}
