//! Lexical scoring from index statistics.

use crate::document::DocId;
use crate::index::package::{IndexPackage, TermKey};

/// Lexical scoring method. Unknown method names fall back to BM25.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RankMethod {
    /// Okapi BM25 with document-length normalization. The default.
    #[default]
    Bm25,
    /// Raw term frequency weighted by ln(N / df).
    TfIdf,
}

impl RankMethod {
    /// Resolve a method name; anything unrecognized is BM25.
    pub fn from_name(name: &str) -> Self {
        match name {
            "tfidf" => RankMethod::TfIdf,
            _ => RankMethod::Bm25,
        }
    }
}

/// BM25 free parameters.
#[derive(Debug, Clone, Copy)]
pub struct Bm25Params {
    /// Term-frequency saturation.
    pub k1: f64,
    /// Document-length normalization strength.
    pub b: f64,
}

impl Default for Bm25Params {
    fn default() -> Self {
        Bm25Params { k1: 1.2, b: 0.75 }
    }
}

/// Score one document against the query tokens.
///
/// Repeated query terms accumulate. Terms absent from the index or the
/// document contribute nothing, so a document sharing no terms with the
/// query scores exactly 0.
pub fn lexical_score(
    method: RankMethod,
    params: Bm25Params,
    query_tokens: &[String],
    doc_id: DocId,
    package: &IndexPackage,
) -> f64 {
    let n = package.doc_count() as f64;
    let mut score = 0.0;

    for token in query_tokens {
        let key = TermKey::term(token.clone());
        let df = package.posting_list(&key).len() as f64;
        if df == 0.0 {
            continue;
        }
        let tf = package.term_positions(&key, doc_id).len() as f64;
        if tf == 0.0 {
            continue;
        }

        score += match method {
            RankMethod::Bm25 => {
                // Non-negative idf variant: ln(1 + (N - df + 0.5) / (df + 0.5)).
                let idf = (1.0 + (n - df + 0.5) / (df + 0.5)).ln();
                let avgdl = package.avg_doc_len();
                let norm = if avgdl > 0.0 {
                    1.0 - params.b + params.b * f64::from(package.doc_length(doc_id)) / avgdl
                } else {
                    1.0
                };
                idf * tf * (params.k1 + 1.0) / (tf + params.k1 * norm)
            }
            RankMethod::TfIdf => tf * (n / df).ln(),
        };
    }
    score
}
